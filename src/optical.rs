//! Optical fallback for documents without a form layer.
//!
//! Pages are rasterized and recognized strictly one at a time, so at most one
//! page image is alive. Any page failure aborts the whole run: a partial
//! result for a scanned form would look complete when it is not.

use crate::backend::{PageRasterizer, RecognitionEngine};
use crate::classifier::LineClassifier;
use crate::config::ExtractionConfig;
use crate::error::{Error, Result};
use crate::fields::ExtractedField;
use crate::normalize::SeenFields;

/// Rasterizer and recognition engine used by the optical fallback.
pub struct OpticalBackends {
    rasterizer: Box<dyn PageRasterizer>,
    engine: Box<dyn RecognitionEngine>,
}

impl std::fmt::Debug for OpticalBackends {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpticalBackends").finish_non_exhaustive()
    }
}

impl OpticalBackends {
    /// Pair a rasterizer with a recognition engine.
    pub fn new(
        rasterizer: impl PageRasterizer + 'static,
        engine: impl RecognitionEngine + 'static,
    ) -> Self {
        Self {
            rasterizer: Box::new(rasterizer),
            engine: Box::new(engine),
        }
    }

    /// Rasterizer and engine available on this system.
    ///
    /// Needs the `rendering` and `ocr` features; a missing PDFium library is
    /// reported as [`Error::RecognitionUnavailable`].
    #[cfg(all(feature = "rendering", feature = "ocr"))]
    pub fn system(pdf_bytes: &[u8]) -> Result<Self> {
        let rasterizer = crate::backend::pdfium::PdfiumRasterizer::new(pdf_bytes)
            .map_err(|e| Error::RecognitionUnavailable(e.to_string()))?;
        Ok(Self::new(rasterizer, crate::ocr::TesseractEngine::new()))
    }

    /// Rasterizer and engine available on this system.
    ///
    /// Built without the `rendering` and `ocr` features, so there are none.
    #[cfg(not(all(feature = "rendering", feature = "ocr")))]
    pub fn system(_pdf_bytes: &[u8]) -> Result<Self> {
        Err(Error::RecognitionUnavailable(
            "built without the `rendering` and `ocr` features".to_string(),
        ))
    }

    /// Rasterize and recognize one page.
    ///
    /// Returns the page's ordered, trimmed, non-empty lines.
    pub fn recognize_page(&mut self, page: usize, config: &ExtractionConfig) -> Result<Vec<String>> {
        let image = self.rasterizer.render_page(page, config.render_scale)?;
        log::debug!("Page {}: rendered {}x{}", page, image.width(), image.height());
        let recognition = self.engine.recognize(&image, &config.ocr_language)?;
        Ok(recognition.into_lines())
    }
}

/// Recognize every page and classify its lines.
///
/// Fields repeated across pages (same type and label, or same inline parts)
/// are kept once, in first-seen order.
pub fn run_optical_fallback(
    backends: &mut OpticalBackends,
    page_count: usize,
    config: &ExtractionConfig,
    seen: &mut SeenFields,
) -> Result<Vec<ExtractedField>> {
    let classifier = LineClassifier::new(config);
    let mut fields = Vec::new();

    for page in 0..page_count {
        let lines = backends.recognize_page(page, config).map_err(|e| {
            log::warn!("Page {}: optical recognition failed: {}", page, e);
            match e {
                Error::Render(reason) => Error::Page { page, reason },
                other => other,
            }
        })?;
        log::debug!("Page {}: {} recognized line(s)", page, lines.len());

        let page_fields = classifier.classify(&lines);
        let before = fields.len();
        fields.extend(page_fields.into_iter().filter(|f| seen.insert(f)));
        log::info!("Page {}: {} field(s) from recognized text", page, fields.len() - before);
    }

    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Recognition;
    use image::RgbaImage;

    struct BlankPages;

    impl PageRasterizer for BlankPages {
        fn render_page(&self, _page: usize, scale: f32) -> Result<RgbaImage> {
            let side = (10.0 * scale) as u32;
            Ok(RgbaImage::new(side, side))
        }
    }

    struct FixedText(Vec<&'static str>);

    impl RecognitionEngine for FixedText {
        fn recognize(&mut self, image: &RgbaImage, language: &str) -> Result<Recognition> {
            assert_eq!(language, "eng");
            assert_eq!(image.width(), 20);
            Ok(Recognition::Blob(self.0.join("\n")))
        }
    }

    #[test]
    fn test_repeated_fields_across_pages_dropped() {
        let mut backends =
            OpticalBackends::new(BlankPages, FixedText(vec!["Email: ____", "PERSONAL DETAILS"]));
        let config = ExtractionConfig::default();
        let mut seen = SeenFields::new();
        let fields = run_optical_fallback(&mut backends, 3, &config, &mut seen).unwrap();
        assert_eq!(fields.len(), 2);
    }

    struct BrokenRasterizer;

    impl PageRasterizer for BrokenRasterizer {
        fn render_page(&self, _page: usize, _scale: f32) -> Result<RgbaImage> {
            Err(Error::Render("out of memory".to_string()))
        }
    }

    #[test]
    fn test_render_failure_aborts() {
        let mut backends = OpticalBackends::new(BrokenRasterizer, FixedText(vec![]));
        let config = ExtractionConfig::default();
        let result = run_optical_fallback(&mut backends, 2, &config, &mut SeenFields::new());
        assert!(matches!(result, Err(Error::Page { page: 0, .. })));
    }
}
