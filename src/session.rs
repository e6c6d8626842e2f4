//! Extraction runs and the user-facing status boundary.
//!
//! [`FormFieldExtractor`] holds only configuration. Every call creates a fresh
//! [`ExtractionSession`] that owns the accumulators of that run (radio groups,
//! fields already emitted) and drops them when the run ends, so two runs
//! never share state.
//!
//! # Example
//!
//! ```no_run
//! use pdf_formscan::{ExtractionConfig, FormFieldExtractor};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bytes = std::fs::read("intake_form.pdf")?;
//! let extractor = FormFieldExtractor::new(ExtractionConfig::default());
//! let report = extractor.extract_bytes(&bytes)?;
//! for field in &report.fields {
//!     println!("{:<12} {}", field.field_type(), field.label);
//! }
//! # Ok(())
//! # }
//! ```

use crate::annotations::{WidgetAnnotation, WidgetOutcome};
use crate::backend::{FormDocument, LopdfDocument};
use crate::config::ExtractionConfig;
use crate::error::{Error, Result};
use crate::fields::ExtractedField;
use crate::label::LabelResolver;
use crate::layout::TextRows;
use crate::normalize::{unique_labels, SeenFields};
use crate::optical::{run_optical_fallback, OpticalBackends};
use crate::radio::RadioGroupAggregator;
use crate::text::title_case;
use serde::Serialize;

/// Which path produced the fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionSource {
    /// Native form widgets
    Annotations,
    /// Recognized page text
    Optical,
}

/// Result of a successful extraction run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionReport {
    /// Fields with unique labels, ready for review
    pub fields: Vec<ExtractedField>,
    /// Path that produced them
    pub source: ExtractionSource,
    /// Pages in the document
    pub page_count: usize,
}

/// Outcome of an extraction as shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionStatus {
    /// Fields were found
    Success(ExtractionReport),
    /// Neither path found a field
    NoFieldsDetected,
    /// The optical path could not run or failed
    OcrFailed(String),
    /// Anything else went wrong
    Failed(String),
}

impl ExtractionStatus {
    /// Classify the result of a run.
    pub fn from_result(result: Result<ExtractionReport>) -> Self {
        match result {
            Ok(report) => ExtractionStatus::Success(report),
            Err(Error::NoFieldsDetected) => ExtractionStatus::NoFieldsDetected,
            Err(e) if e.is_recognition_failure() => ExtractionStatus::OcrFailed(e.to_string()),
            Err(e) => ExtractionStatus::Failed(e.to_string()),
        }
    }

    /// Message for the user; `None` on success.
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            ExtractionStatus::Success(_) => None,
            ExtractionStatus::NoFieldsDetected => {
                Some("No fields detected, try a different document")
            },
            ExtractionStatus::OcrFailed(_) => Some("OCR failed to extract fields"),
            ExtractionStatus::Failed(_) => Some("Failed to process the document"),
        }
    }

    /// Whether fields were found.
    pub fn is_success(&self) -> bool {
        matches!(self, ExtractionStatus::Success(_))
    }

    /// The fields found; empty unless successful.
    pub fn fields(&self) -> &[ExtractedField] {
        match self {
            ExtractionStatus::Success(report) => &report.fields,
            _ => &[],
        }
    }
}

/// Accumulators for one extraction run.
#[derive(Debug)]
pub struct ExtractionSession<'c> {
    config: &'c ExtractionConfig,
    radios: RadioGroupAggregator,
    seen: SeenFields,
}

impl<'c> ExtractionSession<'c> {
    /// Start a run.
    pub fn new(config: &'c ExtractionConfig) -> Self {
        Self {
            config,
            radios: RadioGroupAggregator::new(),
            seen: SeenFields::new(),
        }
    }

    /// Fields from the native form widgets of every page.
    ///
    /// Radio groups are emitted after all pages, in first-seen order.
    pub fn annotation_pass(&mut self, doc: &dyn FormDocument) -> Result<Vec<ExtractedField>> {
        let mut fields = Vec::new();
        for page in 0..doc.page_count() {
            self.annotation_page(doc, page, &mut fields)?;
        }
        let radios = std::mem::take(&mut self.radios).finish();
        log::debug!("{} radio group(s)", radios.len());
        fields.extend(radios);
        Ok(fields)
    }

    fn annotation_page(
        &mut self,
        doc: &dyn FormDocument,
        page: usize,
        fields: &mut Vec<ExtractedField>,
    ) -> Result<()> {
        let raw = match doc.widget_annotations(page) {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("Page {}: skipping form layer: {}", page, e);
                return Ok(());
            },
        };
        if raw.is_empty() {
            return Ok(());
        }

        let widgets: Vec<WidgetAnnotation> = raw
            .iter()
            .filter_map(|w| match WidgetAnnotation::from_raw(w) {
                Ok(widget) => Some(widget),
                Err(e) => {
                    log::warn!("Page {}: skipping widget {:?}: {}", page, w.name, e);
                    None
                },
            })
            .collect();
        log::debug!("Page {}: {} of {} widget(s) usable", page, widgets.len(), raw.len());

        let rows = match doc.text_content(page) {
            Ok(runs) => TextRows::from_runs(&runs),
            Err(e) => {
                log::warn!("Page {}: no text layer ({}), labels fall back to field names", page, e);
                TextRows::default()
            },
        };
        let resolver = LabelResolver::new(&rows, self.config);

        for widget in &widgets {
            let resolved = resolver.resolve(&widget.rect);
            let label = resolved.clone().unwrap_or_else(|| title_case(&widget.name));
            match widget.classify(&label) {
                WidgetOutcome::Field(field) => fields.push(field),
                WidgetOutcome::RadioMember => self.radios.add(
                    &widget.name,
                    widget.export_value.as_deref(),
                    resolved.as_deref(),
                    widget.required,
                ),
                WidgetOutcome::Ignored => {
                    log::trace!("Page {}: push button {:?} ignored", page, widget.name)
                },
            }
        }
        Ok(())
    }

    /// Fields recovered from recognized page text.
    pub fn optical_pass(
        &mut self,
        backends: &mut OpticalBackends,
        page_count: usize,
    ) -> Result<Vec<ExtractedField>> {
        run_optical_fallback(backends, page_count, self.config, &mut self.seen)
    }
}

/// Extracts form fields from PDFs.
#[derive(Debug, Clone, Default)]
pub struct FormFieldExtractor {
    config: ExtractionConfig,
}

impl FormFieldExtractor {
    /// Create an extractor with the given configuration.
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Extract fields from a PDF buffer using lopdf and, when the native
    /// form layer is empty, the system rasterizer and recognition engine.
    pub fn extract_bytes(&self, bytes: &[u8]) -> Result<ExtractionReport> {
        let doc = LopdfDocument::load_mem(bytes)?;
        self.extract_with(&doc, || OpticalBackends::system(bytes))
    }

    /// Extract fields from a document.
    ///
    /// `backends` is only used when the document has no usable widgets;
    /// `None` then counts as an unavailable recognition engine.
    pub fn extract(
        &self,
        doc: &dyn FormDocument,
        backends: Option<OpticalBackends>,
    ) -> Result<ExtractionReport> {
        self.extract_with(doc, move || {
            backends.ok_or_else(|| {
                Error::RecognitionUnavailable("no rasterizer or recognition engine supplied".to_string())
            })
        })
    }

    /// Extract and convert any failure into a user-facing status.
    pub fn extract_with_status(&self, bytes: &[u8]) -> ExtractionStatus {
        let status = ExtractionStatus::from_result(self.extract_bytes(bytes));
        if let ExtractionStatus::OcrFailed(reason) | ExtractionStatus::Failed(reason) = &status {
            log::error!("Extraction failed: {}", reason);
        }
        status
    }

    fn extract_with<F>(&self, doc: &dyn FormDocument, backends: F) -> Result<ExtractionReport>
    where
        F: FnOnce() -> Result<OpticalBackends>,
    {
        self.config.validate()?;
        let page_count = doc.page_count();
        let mut session = ExtractionSession::new(&self.config);

        let fields = session.annotation_pass(doc)?;
        let (fields, source) = if !fields.is_empty() {
            log::info!("Found {} field(s) in the form layer", fields.len());
            (fields, ExtractionSource::Annotations)
        } else if self.config.ocr_fallback {
            log::info!("No form widgets in {} page(s), trying optical fallback", page_count);
            let mut backends = backends()?;
            (session.optical_pass(&mut backends, page_count)?, ExtractionSource::Optical)
        } else {
            log::info!("No form widgets and optical fallback disabled");
            (Vec::new(), ExtractionSource::Annotations)
        };

        if fields.is_empty() {
            return Err(Error::NoFieldsDetected);
        }

        Ok(ExtractionReport {
            fields: unique_labels(fields),
            source,
            page_count,
        })
    }
}
