//! Configuration for form-field extraction.
//!
//! All thresholds used by the label resolver and the line classifier live here.
//! They are tuning knobs for a heuristic extractor; the defaults are a starting
//! point that works for typical US-letter intake forms.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Form-field extraction configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractionConfig {
    /// Half-height of the vertical band (in PDF units) searched for a label.
    pub label_band: f32,

    /// Maximum number of text items kept per candidate label row.
    pub label_max_items: usize,

    /// Upscaling factor used when rasterizing pages for recognition.
    pub render_scale: f32,

    /// Language hint passed to the recognition engine.
    pub ocr_language: String,

    /// Run the optical fallback when a document has no form widgets.
    pub ocr_fallback: bool,

    /// Shortest line (in chars) accepted as a section heading.
    pub heading_min_len: usize,

    /// Longest line (in chars) accepted as a section heading.
    pub heading_max_len: usize,

    /// Lines mentioning "signature" with more words than this are prose.
    pub signature_max_words: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self {
            label_band: 6.0,
            label_max_items: 6,
            render_scale: 2.0,
            ocr_language: "eng".to_string(),
            ocr_fallback: true,
            heading_min_len: 7,
            heading_max_len: 48,
            signature_max_words: 8,
        }
    }

    /// Load configuration from a JSON file. Missing keys keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    /// Parse configuration from a JSON string. Missing keys keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every threshold is usable.
    pub fn validate(&self) -> Result<()> {
        if !(self.label_band.is_finite() && self.label_band >= 0.0) {
            return Err(Error::Config(format!("label_band must be >= 0, got {}", self.label_band)));
        }
        if self.label_max_items == 0 {
            return Err(Error::Config("label_max_items must be at least 1".to_string()));
        }
        if !(self.render_scale.is_finite() && self.render_scale > 0.0) {
            return Err(Error::Config(format!(
                "render_scale must be > 0, got {}",
                self.render_scale
            )));
        }
        if self.heading_min_len > self.heading_max_len {
            return Err(Error::Config(format!(
                "heading_min_len ({}) exceeds heading_max_len ({})",
                self.heading_min_len, self.heading_max_len
            )));
        }
        if self.ocr_language.trim().is_empty() {
            return Err(Error::Config("ocr_language must not be empty".to_string()));
        }
        Ok(())
    }

    /// Set the label search band.
    pub fn with_label_band(mut self, band: f32) -> Self {
        self.label_band = band;
        self
    }

    /// Set how many nearby items are kept per label row.
    pub fn with_label_max_items(mut self, items: usize) -> Self {
        self.label_max_items = items;
        self
    }

    /// Set the rasterization scale.
    pub fn with_render_scale(mut self, scale: f32) -> Self {
        self.render_scale = scale;
        self
    }

    /// Set the recognition language hint.
    pub fn with_ocr_language(mut self, language: impl Into<String>) -> Self {
        self.ocr_language = language.into();
        self
    }

    /// Enable or disable the optical fallback.
    pub fn with_ocr_fallback(mut self, enable: bool) -> Self {
        self.ocr_fallback = enable;
        self
    }

    /// Set the longest line, in words, still read as a signing line.
    pub fn with_signature_max_words(mut self, words: usize) -> Self {
        self.signature_max_words = words;
        self
    }

    /// Set the accepted heading length range.
    pub fn with_heading_len(mut self, min: usize, max: usize) -> Self {
        self.heading_min_len = min;
        self.heading_max_len = max;
        self
    }
}
