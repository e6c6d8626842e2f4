//! Tesseract recognition engine via `leptess`.
//!
//! Tesseract decodes the page image itself, so each raster is encoded to PNG
//! in memory before it is handed over.

use crate::backend::{Recognition, RecognitionEngine};
use crate::error::{Error, Result};
use image::RgbaImage;
use leptess::LepTess;
use std::io::Cursor;

/// Recognition engine backed by a Tesseract installation.
///
/// The engine is initialised lazily on the first page and reused for the
/// rest of the run. A missing `tessdata` directory or language pack is
/// reported as [`Error::RecognitionUnavailable`].
pub struct TesseractEngine {
    data_path: Option<String>,
    engine: Option<(String, LepTess)>,
}

impl std::fmt::Debug for TesseractEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TesseractEngine")
            .field("data_path", &self.data_path)
            .field("loaded", &self.engine.as_ref().map(|(lang, _)| lang))
            .finish()
    }
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TesseractEngine {
    /// Use the default `tessdata` location.
    pub fn new() -> Self {
        Self {
            data_path: None,
            engine: None,
        }
    }

    /// Use an explicit `tessdata` directory.
    pub fn with_data_path(mut self, path: impl Into<String>) -> Self {
        self.data_path = Some(path.into());
        self
    }

    fn engine_for(&mut self, language: &str) -> Result<&mut LepTess> {
        let reload = match &self.engine {
            Some((loaded, _)) => loaded != language,
            None => true,
        };
        if reload {
            let lt = LepTess::new(self.data_path.as_deref(), language).map_err(|e| {
                Error::RecognitionUnavailable(format!(
                    "failed to initialize Tesseract with language '{}': {}",
                    language, e
                ))
            })?;
            log::debug!("Initialized Tesseract for language '{}'", language);
            self.engine = Some((language.to_string(), lt));
        }
        match &mut self.engine {
            Some((_, lt)) => Ok(lt),
            None => Err(Error::RecognitionUnavailable("Tesseract not initialized".to_string())),
        }
    }
}

impl RecognitionEngine for TesseractEngine {
    fn recognize(&mut self, image: &RgbaImage, language: &str) -> Result<Recognition> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(Error::Recognition(format!(
                "image dimensions must be non-zero (got {}x{})",
                width, height
            )));
        }

        let mut png = Cursor::new(Vec::new());
        image
            .write_to(&mut png, image::ImageOutputFormat::Png)
            .map_err(|e| Error::Recognition(format!("failed to encode page image: {}", e)))?;

        let lt = self.engine_for(language)?;
        lt.set_image_from_mem(png.get_ref())
            .map_err(|e| Error::Recognition(format!("failed to load page image: {}", e)))?;
        let text = lt
            .get_utf8_text()
            .map_err(|e| Error::Recognition(format!("failed to read recognized text: {}", e)))?;

        Ok(Recognition::Blob(text))
    }
}
