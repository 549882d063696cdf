//! Error and warning types for pdfops.
//!
//! Provides [`PdfError`] for fatal errors at the container boundary and
//! [`ContentWarning`] for the recoverable issues an operator parser meets
//! while building a best-effort model of a content stream.

use std::fmt;

/// Fatal error types for content-stream analysis.
///
/// Only raised when a stream cannot be reached at all (missing page,
/// undecodable stream). Nothing inside a stream escalates to these.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfError {
    /// Error parsing PDF structure or syntax.
    ParseError(String),
    /// I/O error reading PDF data.
    IoError(String),
    /// Error loading a font dictionary or program.
    FontError(String),
    /// Error during content stream interpretation.
    InterpreterError(String),
    /// A named resource could not be loaded.
    ResourceError(String),
    /// Any other error not covered by specific variants.
    Other(String),
}

impl fmt::Display for PdfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PdfError::ParseError(msg) => write!(f, "parse error: {msg}"),
            PdfError::IoError(msg) => write!(f, "I/O error: {msg}"),
            PdfError::FontError(msg) => write!(f, "font error: {msg}"),
            PdfError::InterpreterError(msg) => write!(f, "interpreter error: {msg}"),
            PdfError::ResourceError(msg) => write!(f, "resource error: {msg}"),
            PdfError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for PdfError {}

impl From<std::io::Error> for PdfError {
    fn from(err: std::io::Error) -> Self {
        PdfError::IoError(err.to_string())
    }
}

/// Machine-readable code for a recovered content-stream issue.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "type", content = "detail")
)]
pub enum ContentWarningCode {
    /// A named resource was absent or failed to load.
    ResourceNotFound,
    /// An operand had the wrong type or count; a default was used.
    MalformedOperand,
    /// The operator mnemonic is not part of the PDF operator set.
    UnsupportedOperator,
    /// A shown string could not be split into character codes.
    GlyphDecode,
    /// A token that is neither an operand nor an operator was skipped.
    StrayToken,
    /// Any other warning not covered by specific variants.
    Other(String),
}

impl ContentWarningCode {
    /// Returns the string tag for this warning code.
    pub fn as_str(&self) -> &str {
        match self {
            ContentWarningCode::ResourceNotFound => "RESOURCE_NOT_FOUND",
            ContentWarningCode::MalformedOperand => "MALFORMED_OPERAND",
            ContentWarningCode::UnsupportedOperator => "UNSUPPORTED_OPERATOR",
            ContentWarningCode::GlyphDecode => "GLYPH_DECODE",
            ContentWarningCode::StrayToken => "STRAY_TOKEN",
            ContentWarningCode::Other(_) => "OTHER",
        }
    }
}

impl fmt::Display for ContentWarningCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-fatal issue met while parsing a content stream.
///
/// Carries the operator index and mnemonic where it happened so a report
/// can point back into the stream.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContentWarning {
    /// Machine-readable warning code.
    pub code: ContentWarningCode,
    /// Human-readable description of the warning.
    pub description: String,
    /// Index of the operator in the content stream, if applicable.
    pub operator_index: Option<usize>,
    /// Operator mnemonic, if applicable.
    pub operator: Option<String>,
}

impl ContentWarning {
    /// Create a warning with a specific code and description.
    pub fn new(code: ContentWarningCode, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
            operator_index: None,
            operator: None,
        }
    }

    /// Attach operator context (builder pattern).
    pub fn at_operator(mut self, index: usize, operator: impl Into<String>) -> Self {
        self.operator_index = Some(index);
        self.operator = Some(operator.into());
        self
    }
}

impl fmt::Display for ContentWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.description)?;
        if let Some(ref op) = self.operator {
            write!(f, " [operator {op}]")?;
        }
        if let Some(index) = self.operator_index {
            write!(f, " [#{index}]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_error_display() {
        assert_eq!(
            PdfError::ParseError("bad xref".to_string()).to_string(),
            "parse error: bad xref"
        );
        assert_eq!(
            PdfError::ResourceError("no /F1".to_string()).to_string(),
            "resource error: no /F1"
        );
        assert_eq!(PdfError::Other("plain".to_string()).to_string(), "plain");
    }

    #[test]
    fn pdf_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: PdfError = io.into();
        assert!(matches!(err, PdfError::IoError(ref m) if m.contains("gone")));
    }

    #[test]
    fn warning_code_tags() {
        assert_eq!(ContentWarningCode::ResourceNotFound.as_str(), "RESOURCE_NOT_FOUND");
        assert_eq!(ContentWarningCode::StrayToken.to_string(), "STRAY_TOKEN");
        assert_eq!(ContentWarningCode::Other("x".into()).as_str(), "OTHER");
    }

    #[test]
    fn warning_display_with_context() {
        let w = ContentWarning::new(ContentWarningCode::MalformedOperand, "Tr expects an integer")
            .at_operator(4, "Tr");
        assert_eq!(
            w.to_string(),
            "[MALFORMED_OPERAND] Tr expects an integer [operator Tr] [#4]"
        );
    }

    #[test]
    fn warning_display_without_context() {
        let w = ContentWarning::new(ContentWarningCode::StrayToken, "stray ']'");
        assert_eq!(w.to_string(), "[STRAY_TOKEN] stray ']'");
        assert!(w.operator_index.is_none());
    }
}
