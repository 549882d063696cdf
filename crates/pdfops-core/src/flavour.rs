//! PDF/A flavour tags.
//!
//! A flavour names the archival profile a document is validated against.
//! Interpretation never depends on it; it is carried through to consumers.

use std::fmt;
use std::str::FromStr;

/// Conformance level letter within a PDF/A part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Conformance {
    /// Level A (accessible).
    A,
    /// Level B (basic).
    B,
    /// Level U (Unicode).
    U,
    /// PDF/A-4e (engineering).
    E,
    /// PDF/A-4f (embedded files).
    F,
    /// Bare PDF/A-4.
    None,
}

impl Conformance {
    fn letter(self) -> &'static str {
        match self {
            Conformance::A => "A",
            Conformance::B => "B",
            Conformance::U => "U",
            Conformance::E => "E",
            Conformance::F => "F",
            Conformance::None => "",
        }
    }
}

/// A PDF/A part and conformance level, e.g. PDF/A-2B.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PdfFlavour {
    /// PDF/A part number (1 to 4).
    pub part: u8,
    /// Conformance level within the part.
    pub conformance: Conformance,
}

/// Error returned when a flavour string is not a known PDF/A profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlavourParseError(pub String);

impl fmt::Display for FlavourParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown PDF/A flavour: '{}'", self.0)
    }
}

impl std::error::Error for FlavourParseError {}

impl PdfFlavour {
    /// Create a flavour, checking the part/level combination exists.
    pub fn new(part: u8, conformance: Conformance) -> Option<Self> {
        let valid = match part {
            1 => matches!(conformance, Conformance::A | Conformance::B),
            2 | 3 => matches!(
                conformance,
                Conformance::A | Conformance::B | Conformance::U
            ),
            4 => matches!(
                conformance,
                Conformance::None | Conformance::E | Conformance::F
            ),
            _ => false,
        };
        valid.then_some(Self { part, conformance })
    }
}

impl FromStr for PdfFlavour {
    type Err = FlavourParseError;

    /// Accepts forms like `2b`, `PDF/A-2B`, `pdfa-1a`, `4`, `4f`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || FlavourParseError(s.to_string());
        let lower = s.trim().to_ascii_lowercase();
        let body = lower
            .strip_prefix("pdf/a-")
            .or_else(|| lower.strip_prefix("pdfa-"))
            .or_else(|| lower.strip_prefix("pdfa"))
            .unwrap_or(&lower);

        let mut chars = body.chars();
        let part = chars
            .next()
            .and_then(|c| c.to_digit(10))
            .ok_or_else(err)? as u8;
        let conformance = match chars.as_str() {
            "" => Conformance::None,
            "a" => Conformance::A,
            "b" => Conformance::B,
            "u" => Conformance::U,
            "e" => Conformance::E,
            "f" => Conformance::F,
            _ => return Err(err()),
        };
        PdfFlavour::new(part, conformance).ok_or_else(err)
    }
}

impl fmt::Display for PdfFlavour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PDF/A-{}{}", self.part, self.conformance.letter())
    }
}
