//! Decoding of show-text strings into per-character glyph facts.

use pdfops_core::{ContentWarning, ContentWarningCode, Glyph, GlyphKind, widths_consistent};
use tracing::warn;

use crate::cid_font::CharCode;
use crate::font::Font;
use crate::font_program::GlyphRef;
use crate::operator::ResolvedGlyphs;

/// Resolve every string shown by one operator.
///
/// A string that cannot be split into codes is skipped with a
/// [`ContentWarningCode::GlyphDecode`] warning; the others still resolve.
pub(crate) fn resolve(
    font: Option<&Font>,
    strings: &[Vec<u8>],
    index: usize,
    mnemonic: &str,
) -> ResolvedGlyphs {
    let mut out = ResolvedGlyphs::default();
    let Some(font) = font else {
        return out;
    };

    for (i, bytes) in strings.iter().enumerate() {
        match font.read_codes(bytes) {
            Ok(codes) => out
                .glyphs
                .extend(codes.iter().map(|code| resolve_code(font, code))),
            Err(e) => {
                warn!(operator = mnemonic, index, string = i, "skipping undecodable string: {e}");
                out.warnings.push(
                    ContentWarning::new(
                        ContentWarningCode::GlyphDecode,
                        format!("string {i} could not be decoded: {e}"),
                    )
                    .at_operator(index, mnemonic),
                );
            }
        }
    }
    out
}

fn resolve_code(font: &Font, code: &CharCode) -> Glyph {
    let to_unicode = font.unicode(code);

    if font.is_composite() {
        let cid = font.cid(code.code);
        let (present, width_consistent) = match cid {
            Some(cid) => check_program(font, code.code, &GlyphRef::Cid(cid)),
            None => (None, None),
        };
        return Glyph {
            code: code.code,
            name: None,
            present,
            width_consistent,
            to_unicode,
            kind: GlyphKind::Cid { cid },
        };
    }

    let name = font.glyph_name(code.code).map(str::to_string);
    let glyph_ref = GlyphRef::Code {
        code: code.code,
        name: name.as_deref(),
        unicode: to_unicode.as_deref(),
    };
    let (present, width_consistent) = check_program(font, code.code, &glyph_ref);
    Glyph {
        code: code.code,
        name,
        present,
        width_consistent,
        to_unicode,
        kind: GlyphKind::Simple,
    }
}

/// Presence and width consistency against the embedded program.
fn check_program(font: &Font, code: u32, glyph: &GlyphRef<'_>) -> (Option<bool>, Option<bool>) {
    let Some(program) = font.program.as_deref() else {
        return (None, None);
    };
    let present = program.is_glyph_present(glyph);
    let consistent = if present {
        match (font.declared_width(code), program.glyph_width(glyph)) {
            (Some(declared), Some(actual)) => Some(widths_consistent(declared, actual)),
            _ => None,
        }
    } else {
        None
    };
    (Some(present), consistent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;

    use pdfops_core::{BaseEncoding, SimpleEncoding};

    use crate::cid_font::CidWidths;
    use crate::font::{CidMapping, FontSubtype};
    use crate::font_metrics::SimpleWidths;
    use crate::font_program::FontProgram;

    /// Knows glyphs by name (simple) or CID, each with a width.
    #[derive(Debug)]
    struct FakeProgram {
        by_name: HashMap<&'static str, f64>,
        by_cid: HashMap<u32, f64>,
    }

    impl FontProgram for FakeProgram {
        fn is_glyph_present(&self, glyph: &GlyphRef<'_>) -> bool {
            self.glyph_width(glyph).is_some()
        }

        fn glyph_width(&self, glyph: &GlyphRef<'_>) -> Option<f64> {
            match glyph {
                GlyphRef::Code { name: Some(n), .. } => self.by_name.get(n).copied(),
                GlyphRef::Code { .. } => None,
                GlyphRef::Cid(cid) => self.by_cid.get(cid).copied(),
            }
        }
    }

    fn simple_font() -> Font {
        let program = FakeProgram {
            by_name: HashMap::from([("H", 722.0), ("i", 279.5)]),
            by_cid: HashMap::new(),
        };
        // 'H' (0x48) through 'i' (0x69)
        let mut widths = vec![500.0; 0x22];
        widths[0] = 722.0;
        widths[0x21] = 278.0;
        Font::simple(
            FontSubtype::TrueType,
            Some(SimpleEncoding::from_base(BaseEncoding::WinAnsi)),
            SimpleWidths::new(widths, 0x48, None),
        )
        .with_program(Arc::new(program))
    }

    #[test]
    fn simple_glyphs_checked_against_program() {
        let font = simple_font();
        let out = resolve(Some(&font), &[b"Hi".to_vec()], 0, "Tj");
        assert!(out.warnings.is_empty());
        assert_eq!(out.glyphs.len(), 2);

        let h = &out.glyphs[0];
        assert_eq!(h.name.as_deref(), Some("H"));
        assert_eq!(h.to_unicode.as_deref(), Some("H"));
        assert_eq!(h.present, Some(true));
        assert_eq!(h.width_consistent, Some(true));
        assert_eq!(h.kind, GlyphKind::Simple);

        // declared 278 vs program 279.5
        let i = &out.glyphs[1];
        assert_eq!(i.present, Some(true));
        assert_eq!(i.width_consistent, Some(false));
    }

    #[test]
    fn absent_glyph_has_no_width_verdict() {
        let font = simple_font();
        let out = resolve(Some(&font), &[b"J".to_vec()], 0, "Tj");
        assert_eq!(out.glyphs[0].present, Some(false));
        assert_eq!(out.glyphs[0].width_consistent, None);
    }

    #[test]
    fn no_program_leaves_facts_unknown() {
        let font = Font::simple(
            FontSubtype::Type1,
            Some(SimpleEncoding::from_base(BaseEncoding::Standard)),
            SimpleWidths::default(),
        );
        let out = resolve(Some(&font), &[b"A".to_vec()], 0, "Tj");
        assert_eq!(out.glyphs[0].present, None);
        assert_eq!(out.glyphs[0].width_consistent, None);
        assert_eq!(out.glyphs[0].to_unicode.as_deref(), Some("A"));
    }

    #[test]
    fn composite_bad_string_skipped_alone() {
        let program = FakeProgram {
            by_name: HashMap::new(),
            by_cid: HashMap::from([(0x41, 1000.0)]),
        };
        let font = Font::composite(CidMapping::Identity, CidWidths::default())
            .with_program(Arc::new(program));
        let strings = vec![vec![0x00, 0x41], vec![0x00], vec![0x00, 0x42]];
        let out = resolve(Some(&font), &strings, 7, "TJ");

        assert_eq!(out.glyphs.len(), 2);
        assert_eq!(out.glyphs[0].kind, GlyphKind::Cid { cid: Some(0x41) });
        assert_eq!(out.glyphs[0].present, Some(true));
        assert_eq!(out.glyphs[0].width_consistent, Some(true));
        assert_eq!(out.glyphs[1].present, Some(false));

        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].code, ContentWarningCode::GlyphDecode);
        assert_eq!(out.warnings[0].operator_index, Some(7));
    }

    #[test]
    fn no_font_no_glyphs() {
        let out = resolve(None, &[b"abc".to_vec()], 0, "Tj");
        assert!(out.glyphs.is_empty());
        assert!(out.warnings.is_empty());
    }
}
