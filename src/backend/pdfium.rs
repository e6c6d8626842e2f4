//! Page rasterizer backed by PDFium via `pdfium-render`.
//!
//! The document bytes are kept and re-opened for each page so that only one
//! page bitmap is alive at a time.

use super::PageRasterizer;
use crate::error::{Error, Result};
use image::RgbaImage;
use pdfium_render::prelude::*;

/// Rasterizes pages of one PDF with PDFium.
pub struct PdfiumRasterizer {
    pdfium: Pdfium,
    bytes: Vec<u8>,
}

impl PdfiumRasterizer {
    /// Bind to the system PDFium library and keep a copy of the document.
    pub fn new(bytes: &[u8]) -> Result<Self> {
        let bindings = Pdfium::bind_to_system_library()
            .map_err(|e| Error::Render(format!("PDFium library not available: {e}")))?;
        Ok(Self {
            pdfium: Pdfium::new(bindings),
            bytes: bytes.to_vec(),
        })
    }
}

impl PageRasterizer for PdfiumRasterizer {
    fn render_page(&self, page: usize, scale: f32) -> Result<RgbaImage> {
        let document = self
            .pdfium
            .load_pdf_from_byte_slice(&self.bytes, None)
            .map_err(|e| Error::Render(format!("failed to load PDF: {e}")))?;

        let index = u16::try_from(page)
            .map_err(|_| Error::Render(format!("page index {page} too large")))?;
        let pdf_page = document
            .pages()
            .get(index)
            .map_err(|e| Error::Render(format!("failed to get page {page}: {e}")))?;

        let config = PdfRenderConfig::new().scale_page_by_factor(scale);
        let bitmap = pdf_page
            .render_with_config(&config)
            .map_err(|e| Error::Render(format!("failed to render page {page}: {e}")))?;

        let width = bitmap.width() as u32;
        let height = bitmap.height() as u32;
        RgbaImage::from_raw(width, height, bitmap.as_rgba_bytes()).ok_or_else(|| {
            Error::Render(format!("page {page}: bitmap size does not match {width}x{height}"))
        })
    }
}
