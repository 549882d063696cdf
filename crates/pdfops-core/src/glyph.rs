//! Per-character facts produced by text-show operators.

/// Allowed difference between a declared glyph width and the embedded
/// program's width, in 1/1000 text-space units.
pub const WIDTH_TOLERANCE: f64 = 1.0;

/// Whether a declared width agrees with the font program's width.
pub fn widths_consistent(declared: f64, program: f64) -> bool {
    (declared - program).abs() <= WIDTH_TOLERANCE
}

/// Simple glyph, or a CID glyph of a composite (Type 0) font.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GlyphKind {
    Simple,
    /// `cid` is `None` when the CMap maps codes to CIDs that are not known
    /// here (predefined non-Identity CMaps).
    Cid { cid: Option<u32> },
}

/// One shown character.
///
/// The `Option<bool>` facts are `None` when they cannot be decided,
/// typically because the font program is not embedded.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Glyph {
    /// Character code as read from the string.
    pub code: u32,
    /// Glyph name from the font's encoding (simple fonts).
    pub name: Option<String>,
    /// The glyph exists in the embedded font program.
    pub present: Option<bool>,
    /// Declared width within [`WIDTH_TOLERANCE`] of the program's width.
    pub width_consistent: Option<bool>,
    /// Best-effort Unicode text.
    pub to_unicode: Option<String>,
    pub kind: GlyphKind,
}

impl Glyph {
    pub fn cid(&self) -> Option<u32> {
        match self.kind {
            GlyphKind::Cid { cid } => cid,
            GlyphKind::Simple => None,
        }
    }
}
