//! Embedded font programs, queried for glyph presence and advance width.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use owned_ttf_parser::{AsFaceRef as _, Face, GlyphId, OwnedFace, PlatformId};

use crate::cid_font::CidToGidMap;
use crate::error::BackendError;

/// How a shown character addresses a glyph in the program.
#[derive(Debug, Clone, PartialEq)]
pub enum GlyphRef<'a> {
    /// Simple font code with its encoding-derived name and Unicode value.
    Code {
        code: u32,
        name: Option<&'a str>,
        unicode: Option<&'a str>,
    },
    /// CID of a composite font.
    Cid(u32),
}

/// An embedded font program.
pub trait FontProgram: Send + Sync + fmt::Debug {
    /// Whether the program contains a glyph for `glyph`.
    fn is_glyph_present(&self, glyph: &GlyphRef<'_>) -> bool;

    /// Advance width in 1/1000 text-space units, when known.
    fn glyph_width(&self, glyph: &GlyphRef<'_>) -> Option<f64>;
}

/// A TrueType or OpenType program (`/FontFile2`, `/FontFile3 /OpenType`).
pub struct TrueTypeProgram {
    face: Arc<OwnedFace>,
    cid_to_gid: Option<CidToGidMap>,
}

impl fmt::Debug for TrueTypeProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrueTypeProgram")
            .field("glyphs", &self.face().number_of_glyphs())
            .field("units_per_em", &self.face().units_per_em())
            .finish()
    }
}

impl TrueTypeProgram {
    /// Parse program bytes. `cid_to_gid` is set for CIDFontType2 descendants.
    pub fn parse(data: Vec<u8>, cid_to_gid: Option<CidToGidMap>) -> Result<Self, BackendError> {
        let face = OwnedFace::from_vec(data, 0)
            .map_err(|e| BackendError::Font(format!("failed to parse TrueType program: {e}")))?;
        Ok(Self {
            face: Arc::new(face),
            cid_to_gid,
        })
    }

    fn face(&self) -> &Face<'_> {
        self.face.as_face_ref()
    }

    /// Cmap lookup for a simple-font code: the (3,0) symbol subtable with
    /// its 0xF000-page variants first, then (1,0).
    fn gid_from_code(&self, code: u32) -> Option<GlyphId> {
        let cmap = self.face().tables().cmap?;
        let lookup = |platform: PlatformId, encoding: u16, codes: &[u32]| {
            cmap.subtables
                .into_iter()
                .filter(|s| s.platform_id == platform && s.encoding_id == encoding)
                .find_map(|s| {
                    codes
                        .iter()
                        .find_map(|c| s.glyph_index(*c).filter(|g| g.0 != 0))
                })
        };
        lookup(
            PlatformId::Windows,
            0,
            &[code, 0xF000 | code, 0xF100 | code, 0xF200 | code],
        )
        .or_else(|| lookup(PlatformId::Macintosh, 0, &[code]))
    }

    fn resolve(&self, glyph: &GlyphRef<'_>) -> Option<GlyphId> {
        let face = self.face();
        match glyph {
            GlyphRef::Cid(cid) => {
                let gid = self
                    .cid_to_gid
                    .as_ref()
                    .map_or(*cid, |map| map.map(*cid));
                u16::try_from(gid)
                    .ok()
                    .filter(|g| *g < face.number_of_glyphs())
                    .map(GlyphId)
            }
            GlyphRef::Code {
                code,
                name,
                unicode,
            } => self
                .gid_from_code(*code)
                .or_else(|| name.and_then(|n| face.glyph_index_by_name(n)))
                .or_else(|| {
                    unicode
                        .and_then(|u| u.chars().next())
                        .and_then(|ch| face.glyph_index(ch))
                })
                .filter(|g| g.0 != 0),
        }
    }
}

impl FontProgram for TrueTypeProgram {
    fn is_glyph_present(&self, glyph: &GlyphRef<'_>) -> bool {
        self.resolve(glyph).is_some()
    }

    fn glyph_width(&self, glyph: &GlyphRef<'_>) -> Option<f64> {
        let face = self.face();
        let gid = self.resolve(glyph)?;
        let upem = f64::from(face.units_per_em());
        if upem <= 0.0 {
            return None;
        }
        face.glyph_hor_advance(gid)
            .map(|adv| f64::from(adv) * 1000.0 / upem)
    }
}

/// A Type 3 font: glyphs are the `/CharProcs` entries.
#[derive(Debug, Clone, Default)]
pub struct Type3Program {
    char_procs: HashSet<String>,
}

impl Type3Program {
    pub fn new(char_procs: impl IntoIterator<Item = String>) -> Self {
        Self {
            char_procs: char_procs.into_iter().collect(),
        }
    }
}

impl FontProgram for Type3Program {
    fn is_glyph_present(&self, glyph: &GlyphRef<'_>) -> bool {
        match glyph {
            GlyphRef::Code {
                name: Some(name), ..
            } => self.char_procs.contains(*name),
            _ => false,
        }
    }

    fn glyph_width(&self, _glyph: &GlyphRef<'_>) -> Option<f64> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type3_presence_by_name() {
        let program = Type3Program::new(["a".to_string(), "square".to_string()]);
        let square = GlyphRef::Code {
            code: 0x61,
            name: Some("square"),
            unicode: None,
        };
        let missing = GlyphRef::Code {
            code: 0x62,
            name: Some("b"),
            unicode: None,
        };
        assert!(program.is_glyph_present(&square));
        assert!(!program.is_glyph_present(&missing));
        assert!(!program.is_glyph_present(&GlyphRef::Cid(1)));
        assert_eq!(program.glyph_width(&square), None);
    }

    #[test]
    fn garbage_truetype_is_font_error() {
        let err = TrueTypeProgram::parse(b"not a font".to_vec(), None).unwrap_err();
        assert!(matches!(err, BackendError::Font(_)));
    }
}
