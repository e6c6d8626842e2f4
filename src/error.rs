//! Error types for form-field extraction.
//!
//! Stage-local problems that have a fallback (a malformed widget, a line no rule
//! understands) never surface here; they are logged and skipped. The variants
//! below are the failures that end an extraction run.

/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while extracting form fields.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input could not be opened as a PDF document
    #[error("Invalid PDF: {0}")]
    InvalidPdf(String),

    /// A page could not be read or processed
    #[error("Failed to process page {page}: {reason}")]
    Page {
        /// Zero-based page index
        page: usize,
        /// Reason for the failure
        reason: String,
    },

    /// A widget annotation is missing data the extractor needs
    #[error("Malformed annotation: {0}")]
    MalformedAnnotation(String),

    /// A page could not be rasterized for recognition
    #[error("Render error: {0}")]
    Render(String),

    /// The optical recognition engine could not be loaded or is missing
    #[error("Recognition engine unavailable: {0}")]
    RecognitionUnavailable(String),

    /// The recognition engine failed on a page
    #[error("Recognition error: {0}")]
    Recognition(String),

    /// Neither the annotation path nor the optical path produced a field
    #[error("No fields detected")]
    NoFieldsDetected,

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        Error::InvalidPdf(err.to_string())
    }
}

impl Error {
    /// Whether this error ends the optical path specifically.
    pub fn is_recognition_failure(&self) -> bool {
        matches!(self, Error::RecognitionUnavailable(_) | Error::Recognition(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_error() {
        let err = Error::Page {
            page: 3,
            reason: "content stream truncated".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("page 3"));
        assert!(msg.contains("truncated"));
    }

    #[test]
    fn test_recognition_unavailable_error() {
        let err = Error::RecognitionUnavailable("tessdata not found".to_string());
        assert!(format!("{}", err).contains("tessdata not found"));
        assert!(err.is_recognition_failure());
        assert!(!Error::NoFieldsDetected.is_recognition_failure());
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.pdf");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
