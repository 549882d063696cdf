//! Declared metrics of simple fonts and the `/FontDescriptor` fields used
//! to pick an encoding and locate the embedded program.

use lopdf::{Dictionary, Document, Object};

use crate::objects;

/// FontDescriptor `/Flags` bit 3: the font uses a non-standard character set.
const FLAG_SYMBOLIC: i64 = 1 << 2;

/// `/Widths`, `/FirstChar` and `/MissingWidth` of a simple font.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimpleWidths {
    widths: Vec<f64>,
    first_char: u32,
    /// Only set when the descriptor carries an explicit `/MissingWidth`.
    missing_width: Option<f64>,
}

impl SimpleWidths {
    pub fn new(widths: Vec<f64>, first_char: u32, missing_width: Option<f64>) -> Self {
        Self {
            widths,
            first_char,
            missing_width,
        }
    }

    /// Declared width of `code`, or `None` when the font declares nothing
    /// for it.
    pub fn declared_width(&self, code: u32) -> Option<f64> {
        code.checked_sub(self.first_char)
            .and_then(|i| self.widths.get(i as usize).copied())
            .or(self.missing_width)
    }

    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }

    /// Read the widths of a simple font dictionary.
    pub fn load(doc: &Document, font: &Dictionary, descriptor: Option<&Dictionary>) -> Self {
        let first_char = objects::get_number(doc, font, b"FirstChar").map_or(0, |v| v as u32);
        let widths = objects::get_array(doc, font, b"Widths")
            .map(|arr| {
                arr.iter()
                    .map(|o| objects::number(objects::resolve(doc, o)).unwrap_or(0.0))
                    .collect()
            })
            .unwrap_or_default();
        let missing_width =
            descriptor.and_then(|d| objects::get_number(doc, d, b"MissingWidth"));
        Self::new(widths, first_char, missing_width)
    }
}

/// Which `/FontFile` key holds the embedded program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFileKind {
    /// `/FontFile`: Type 1.
    Type1,
    /// `/FontFile2`: TrueType.
    TrueType,
    /// `/FontFile3`, see [`FontDescriptor::font_file_subtype`].
    FontFile3,
}

/// The parts of a `/FontDescriptor` the glyph checks need.
#[derive(Debug, Clone, Default)]
pub struct FontDescriptor {
    pub flags: i64,
    pub missing_width: Option<f64>,
    /// Raw embedded program bytes and their kind.
    pub font_file: Option<(FontFileKind, Vec<u8>)>,
    /// `/Subtype` of a `/FontFile3` stream.
    pub font_file_subtype: Option<String>,
}

impl FontDescriptor {
    pub fn is_symbolic(&self) -> bool {
        self.flags & FLAG_SYMBOLIC != 0
    }

    pub fn is_embedded(&self) -> bool {
        self.font_file.is_some()
    }

    /// Read a descriptor dictionary. Unreadable program streams are
    /// reported as the error so callers can warn about them.
    pub fn load(doc: &Document, desc: &Dictionary) -> Result<Self, crate::BackendError> {
        let mut out = FontDescriptor {
            flags: objects::get_integer(doc, desc, b"Flags").unwrap_or(0),
            missing_width: objects::get_number(doc, desc, b"MissingWidth"),
            ..FontDescriptor::default()
        };
        for (key, kind) in [
            (&b"FontFile"[..], FontFileKind::Type1),
            (&b"FontFile2"[..], FontFileKind::TrueType),
            (&b"FontFile3"[..], FontFileKind::FontFile3),
        ] {
            if let Some(Object::Stream(stream)) = objects::get(doc, desc, key) {
                if kind == FontFileKind::FontFile3 {
                    out.font_file_subtype = objects::get_name(doc, &stream.dict, b"Subtype");
                }
                out.font_file = Some((kind, objects::stream_bytes(stream)?));
                break;
            }
        }
        Ok(out)
    }
}
