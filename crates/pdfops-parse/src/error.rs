//! Error types for the parsing and resolution layers.
//!
//! Uses [`thiserror`] for error derivation. [`BackendError`] converts into
//! [`PdfError`] for callers that only deal in core types.

use pdfops_core::PdfError;
use thiserror::Error;

/// Error type for content parsing and resource resolution.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Error from PDF parsing (structure, syntax, object resolution).
    #[error("PDF parse error: {0}")]
    Parse(String),

    /// Error reading PDF data.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error loading a font dictionary, CMap or program.
    #[error("font error: {0}")]
    Font(String),

    /// Malformed content stream syntax.
    #[error("interpreter error: {0}")]
    Interpreter(String),

    /// A named resource exists but could not be resolved.
    #[error("resource error: {0}")]
    Resource(String),

    /// A core library error.
    #[error(transparent)]
    Core(#[from] PdfError),
}

impl From<lopdf::Error> for BackendError {
    fn from(err: lopdf::Error) -> Self {
        BackendError::Parse(err.to_string())
    }
}

impl From<BackendError> for PdfError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Parse(msg) => PdfError::ParseError(msg),
            BackendError::Io(e) => PdfError::IoError(e.to_string()),
            BackendError::Font(msg) => PdfError::FontError(msg),
            BackendError::Interpreter(msg) => PdfError::InterpreterError(msg),
            BackendError::Resource(msg) => PdfError::ResourceError(msg),
            BackendError::Core(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_display() {
        let err = BackendError::Parse("page 4 has no /Contents".to_string());
        assert_eq!(err.to_string(), "PDF parse error: page 4 has no /Contents");
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "stream truncated");
        let err: BackendError = io_err.into();
        assert!(matches!(err, BackendError::Io(_)));
        assert!(err.to_string().contains("stream truncated"));
    }

    #[test]
    fn backend_error_from_lopdf() {
        let err: BackendError = lopdf::Error::PageNumberNotFound(3).into();
        assert!(matches!(err, BackendError::Parse(_)));
    }

    #[test]
    fn resource_error_maps_to_core() {
        let pdf_err: PdfError = BackendError::Resource("/CS0 is not an array".into()).into();
        assert_eq!(pdf_err, PdfError::ResourceError("/CS0 is not an array".into()));
    }

    #[test]
    fn core_error_passes_through() {
        let backend: BackendError = PdfError::FontError("bad metrics".to_string()).into();
        assert!(matches!(backend, BackendError::Core(_)));
        let back: PdfError = backend.into();
        assert_eq!(back, PdfError::FontError("bad metrics".to_string()));
    }
}
