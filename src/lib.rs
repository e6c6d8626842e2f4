// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::type_complexity)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::should_implement_trait)]
#![allow(clippy::match_like_matches_macro)]
// Allow unused for tests
#![cfg_attr(test, allow(dead_code))]
#![cfg_attr(test, allow(unused_variables))]

//! # PDF Formscan
//!
//! Recovers the logical input fields of a PDF form for a form-building tool:
//! text boxes, dates, choices, radio groups, checkboxes, signatures and
//! section headings.
//!
//! ## How it works
//!
//! - **Form layer**: native widget annotations (ISO 32000-1:2008 §12.7) are
//!   classified by field type and flags, labelled from the nearest text to
//!   their left, and radio buttons sharing a name are merged into one group.
//! - **Optical fallback**: when a document has no usable widgets (scanned or
//!   flattened forms), each page is rasterized and recognized, and a
//!   rule-ordered line classifier infers fields from blanks, colons, Yes/No
//!   pairs, checkbox glyphs and signature lines.
//! - **Normalization**: repeated fields are dropped and labels made unique so
//!   every field can be imported as-is after review.
//!
//! Output is best effort and meant for human review before import.
//!
//! ## Features
//!
//! - `rendering`: page rasterization through PDFium (`pdfium-render`)
//! - `ocr`: text recognition through Tesseract (`leptess`)
//!
//! Without both, documents lacking a form layer report
//! [`ExtractionStatus::OcrFailed`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdf_formscan::{ExtractionConfig, FormFieldExtractor};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bytes = std::fs::read("enrollment.pdf")?;
//! let extractor = FormFieldExtractor::new(ExtractionConfig::default());
//!
//! let status = extractor.extract_with_status(&bytes);
//! match status.user_message() {
//!     None => println!("{}", serde_json::to_string_pretty(status.fields())?),
//!     Some(message) => eprintln!("{}", message),
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Error handling
pub mod error;

// Configuration
pub mod config;

// Output records
pub mod fields;

// PDF access
pub mod backend;
pub mod content;
pub mod fonts;

// Geometry and text helpers
pub mod geometry;
pub mod layout;
pub mod text;

// Form layer
pub mod annotations;
pub mod label;
pub mod radio;

// Optical fallback
pub mod classifier;
pub mod optical;

// Tesseract recognition engine (optional)
#[cfg(feature = "ocr")]
#[cfg_attr(docsrs, doc(cfg(feature = "ocr")))]
pub mod ocr;

// Normalization and orchestration
pub mod normalize;
pub mod session;

// Re-exports
pub use backend::{FormDocument, LopdfDocument, PageRasterizer, Recognition, RecognitionEngine};
pub use config::ExtractionConfig;
pub use error::{Error, Result};
pub use fields::{ExtractedField, FieldOption, FieldShape, FieldType, InlinePart, Provenance};
pub use optical::OpticalBackends;
pub use session::{
    ExtractionReport, ExtractionSession, ExtractionSource, ExtractionStatus, FormFieldExtractor,
};

// Internal utilities
pub(crate) mod utils {
    //! Internal utility functions for the library.

    use std::cmp::Ordering;

    /// Safely compare two floating point numbers, handling NaN cases.
    ///
    /// NaN values are treated as equal to each other and greater than all other values,
    /// so sorting text items by position never panics.
    #[inline]
    pub fn safe_float_cmp(a: f32, b: f32) -> Ordering {
        a.partial_cmp(&b).unwrap_or_else(|| match (a.is_nan(), b.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            _ => Ordering::Less,
        })
    }

}

// Version info
/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(VERSION.starts_with("0."));
    }

    #[test]
    fn test_name() {
        assert_eq!(NAME, "pdf_formscan");
    }
}
