//! Boundaries to the PDF library, the rasterizer and the recognition engine.
//!
//! The extraction core only sees the narrow records defined here. Each PDF
//! library reports widgets in its own shape; adapters translate into
//! [`RawWidget`] so the core never looks at provenance-specific fields.
//!
//! - [`FormDocument`]: page count, widget annotations, positioned text runs
//! - [`PageRasterizer`]: page to RGBA image at a scale factor
//! - [`RecognitionEngine`]: image to recognized lines or a text blob

pub mod lopdf_backend;

#[cfg(feature = "rendering")]
#[cfg_attr(docsrs, doc(cfg(feature = "rendering")))]
pub mod pdfium;

pub use lopdf_backend::LopdfDocument;

use crate::error::Result;
use image::RgbaImage;

/// One text run from a page's text layer.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    /// Decoded text
    pub text: String,
    /// Text rendering matrix `[a b c d e f]`; `e`/`f` are the origin
    pub transform: [f32; 6],
}

/// Form-field kind of a widget as reported by the PDF library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawFieldKind {
    /// Text field (`Tx`)
    Text,
    /// Choice field (`Ch`)
    Choice,
    /// Button field (`Btn`)
    Button,
    /// Signature field (`Sig`)
    Signature,
    /// Anything else, kept for diagnostics
    Other(String),
}

impl RawFieldKind {
    /// Parse a `/FT` name.
    pub fn from_pdf_name(name: &str) -> Self {
        match name {
            "Tx" => RawFieldKind::Text,
            "Ch" => RawFieldKind::Choice,
            "Btn" => RawFieldKind::Button,
            "Sig" => RawFieldKind::Signature,
            other => RawFieldKind::Other(other.to_string()),
        }
    }
}

/// A choice option in whichever shape the source library produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawOption {
    /// `[export, display]` pair
    Pair(String, String),
    /// Object with optional value and label
    Object {
        /// Export value
        value: Option<String>,
        /// Display label
        label: Option<String>,
    },
    /// Bare string used as both value and label
    Scalar(String),
}

/// A widget annotation as reported by the PDF library, not yet validated.
///
/// Explicit booleans win over the flag bitmask when a library provides both.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawWidget {
    /// Field kind (`/FT`), if any
    pub kind: Option<RawFieldKind>,
    /// Rectangle `[x0, y0, x1, y1]` in page coordinates
    pub rect: Option<[f32; 4]>,
    /// Fully qualified field name (`/T` of the field and its ancestors,
    /// joined with `.`)
    pub name: Option<String>,
    /// Field flag bitmask (`/Ff`)
    pub flags: u32,
    /// Explicit required flag
    pub required: Option<bool>,
    /// Explicit multiline flag
    pub multiline: Option<bool>,
    /// Explicit multi-select flag
    pub multi_select: Option<bool>,
    /// Explicit radio flag
    pub radio: Option<bool>,
    /// Explicit checkbox flag
    pub checkbox: Option<bool>,
    /// Export value of a button widget
    pub export_value: Option<String>,
    /// Choice options
    pub options: Vec<RawOption>,
}

/// Read access to a PDF's pages.
pub trait FormDocument {
    /// Number of pages.
    fn page_count(&self) -> usize;

    /// Widget annotations on a page (zero-based).
    fn widget_annotations(&self, page: usize) -> Result<Vec<RawWidget>>;

    /// Text runs on a page (zero-based), in content order.
    fn text_content(&self, page: usize) -> Result<Vec<TextRun>>;
}

/// Renders pages to raster images.
pub trait PageRasterizer {
    /// Render a page (zero-based) at `scale` times its natural size.
    fn render_page(&self, page: usize, scale: f32) -> Result<RgbaImage>;
}

/// Output of a recognition engine for one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recognition {
    /// Line-segmented text, top to bottom
    Lines(Vec<String>),
    /// One text blob; lines are recovered by splitting on newlines
    Blob(String),
}

impl Recognition {
    /// Ordered, trimmed, non-empty lines.
    pub fn into_lines(self) -> Vec<String> {
        let lines = match self {
            Recognition::Lines(lines) => lines,
            Recognition::Blob(blob) => blob.lines().map(str::to_string).collect(),
        };
        lines
            .into_iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect()
    }
}

/// Optical text recognition engine.
///
/// Implementations report a missing or unloadable engine as
/// [`Error::RecognitionUnavailable`](crate::Error::RecognitionUnavailable),
/// never as an empty result.
pub trait RecognitionEngine {
    /// Recognize text in an image using a language hint such as `"eng"`.
    fn recognize(&mut self, image: &RgbaImage, language: &str) -> Result<Recognition>;
}
