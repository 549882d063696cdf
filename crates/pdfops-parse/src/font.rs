//! Font resources as seen by text-show operators.
//!
//! A [`Font`] knows how to split a string into character codes, what each
//! code declares as its width, how it maps to a glyph name or CID, and which
//! embedded program (if any) can answer presence and width queries.

use std::fmt;
use std::sync::Arc;

use lopdf::{Dictionary, Document, Object};
use pdfops_core::{BaseEncoding, SimpleEncoding, glyph_name_to_unicode};
use tracing::warn;

use crate::cid_font::{
    CharCode, CidFont, CidFontType, CidWidths, CodeReader, PredefinedCMap, descendant_font,
};
use crate::cmap::{CidCMap, ToUnicodeCMap};
use crate::error::BackendError;
use crate::font_metrics::{FontDescriptor, FontFileKind, SimpleWidths};
use crate::font_program::{FontProgram, TrueTypeProgram, Type3Program};
use crate::objects;

/// `/Subtype` of a font dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontSubtype {
    Type1,
    MMType1,
    TrueType,
    Type3,
    Type0,
}

impl FontSubtype {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Type1" => Some(FontSubtype::Type1),
            "MMType1" => Some(FontSubtype::MMType1),
            "TrueType" => Some(FontSubtype::TrueType),
            "Type3" => Some(FontSubtype::Type3),
            "Type0" => Some(FontSubtype::Type0),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FontSubtype::Type1 => "Type1",
            FontSubtype::MMType1 => "MMType1",
            FontSubtype::TrueType => "TrueType",
            FontSubtype::Type3 => "Type3",
            FontSubtype::Type0 => "Type0",
        }
    }
}

impl fmt::Display for FontSubtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a composite font turns codes into CIDs.
#[derive(Debug, Clone)]
pub enum CidMapping {
    /// `Identity-H`/`Identity-V`.
    Identity,
    /// An embedded CMap stream.
    Embedded(CidCMap),
    /// A predefined CMap whose code-to-CID table is not available here.
    Predefined(PredefinedCMap),
}

/// Declared widths, per font kind.
#[derive(Debug, Clone)]
pub enum FontWidths {
    Simple(SimpleWidths),
    Cid(CidWidths),
}

/// A resolved font resource.
#[derive(Debug, Clone)]
pub struct Font {
    pub subtype: FontSubtype,
    pub base_font: Option<String>,
    /// Simple fonts only. `None` means the program's built-in encoding.
    pub encoding: Option<SimpleEncoding>,
    pub widths: FontWidths,
    pub to_unicode: Option<ToUnicodeCMap>,
    /// Composite fonts only.
    pub cid_mapping: Option<CidMapping>,
    pub descendant_type: Option<CidFontType>,
    pub program: Option<Arc<dyn FontProgram>>,
    code_reader: CodeReader,
}

impl Font {
    /// A simple (single-byte) font.
    pub fn simple(subtype: FontSubtype, encoding: Option<SimpleEncoding>, widths: SimpleWidths) -> Self {
        Self {
            subtype,
            base_font: None,
            encoding,
            widths: FontWidths::Simple(widths),
            to_unicode: None,
            cid_mapping: None,
            descendant_type: None,
            program: None,
            code_reader: CodeReader::SingleByte,
        }
    }

    /// A Type 0 font with the given CMap and descendant widths.
    pub fn composite(mapping: CidMapping, widths: CidWidths) -> Self {
        let code_reader = match &mapping {
            CidMapping::Identity => CodeReader::TwoByte,
            CidMapping::Embedded(cmap) => CodeReader::for_embedded(cmap),
            CidMapping::Predefined(predefined) => CodeReader::for_predefined(*predefined),
        };
        Self {
            subtype: FontSubtype::Type0,
            base_font: None,
            encoding: None,
            widths: FontWidths::Cid(widths),
            to_unicode: None,
            cid_mapping: Some(mapping),
            descendant_type: None,
            program: None,
            code_reader,
        }
    }

    pub fn with_base_font(mut self, name: impl Into<String>) -> Self {
        self.base_font = Some(name.into());
        self
    }

    pub fn with_program(mut self, program: Arc<dyn FontProgram>) -> Self {
        self.program = Some(program);
        self
    }

    pub fn with_to_unicode(mut self, cmap: ToUnicodeCMap) -> Self {
        self.to_unicode = Some(cmap);
        self
    }

    pub fn is_composite(&self) -> bool {
        self.subtype == FontSubtype::Type0
    }

    pub fn is_embedded(&self) -> bool {
        self.program.is_some()
    }

    /// Split show-text bytes into character codes.
    pub fn read_codes(&self, bytes: &[u8]) -> Result<Vec<CharCode>, BackendError> {
        self.code_reader.read_codes(bytes)
    }

    /// Encoding glyph name of a simple-font code.
    pub fn glyph_name(&self, code: u32) -> Option<&str> {
        let code = u8::try_from(code).ok()?;
        self.encoding.as_ref()?.glyph_name(code)
    }

    /// CID of a composite-font code, when it can be determined.
    pub fn cid(&self, code: u32) -> Option<u32> {
        match self.cid_mapping.as_ref()? {
            CidMapping::Identity => Some(code),
            CidMapping::Embedded(cmap) => cmap.lookup(code),
            CidMapping::Predefined(_) => None,
        }
    }

    /// Width the font dictionary declares for `code`, in 1/1000 units.
    pub fn declared_width(&self, code: u32) -> Option<f64> {
        match &self.widths {
            FontWidths::Simple(widths) => widths.declared_width(code),
            FontWidths::Cid(widths) => self.cid(code).map(|cid| widths.width(cid)),
        }
    }

    /// Best-effort Unicode text for one code.
    pub fn unicode(&self, code: &CharCode) -> Option<String> {
        if let Some(text) = self.to_unicode.as_ref().and_then(|c| c.lookup(code.code)) {
            return Some(text.to_string());
        }
        if !self.is_composite() {
            return self.glyph_name(code.code).and_then(glyph_name_to_unicode);
        }
        match self.cid_mapping.as_ref()? {
            CidMapping::Predefined(PredefinedCMap::Utf16 { .. }) => {
                let units: Vec<u16> = code
                    .bytes
                    .chunks_exact(2)
                    .map(|c| u16::from_be_bytes([c[0], c[1]]))
                    .collect();
                String::from_utf16(&units).ok()
            }
            CidMapping::Predefined(PredefinedCMap::Legacy { encoding, .. }) => {
                let (text, _, had_errors) = encoding.decode(&code.bytes);
                (!had_errors).then(|| text.into_owned())
            }
            _ => None,
        }
    }

    /// Load a font dictionary.
    pub fn load(doc: &Document, dict: &Dictionary) -> Result<Self, BackendError> {
        let subtype_name = objects::get_name(doc, dict, b"Subtype")
            .ok_or_else(|| BackendError::Font("font dictionary without /Subtype".to_string()))?;
        let subtype = FontSubtype::from_name(&subtype_name)
            .ok_or_else(|| BackendError::Font(format!("unsupported font subtype /{subtype_name}")))?;

        let mut font = if subtype == FontSubtype::Type0 {
            load_composite(doc, dict)?
        } else {
            load_simple(doc, dict, subtype)?
        };
        font.base_font = objects::get_name(doc, dict, b"BaseFont");

        if let Some(Object::Stream(stream)) = objects::get(doc, dict, b"ToUnicode") {
            match objects::stream_bytes(stream).and_then(|data| ToUnicodeCMap::parse(&data)) {
                Ok(cmap) => font.to_unicode = Some(cmap),
                Err(e) => warn!(base_font = ?font.base_font, "ignoring unreadable /ToUnicode: {e}"),
            }
        }
        Ok(font)
    }
}

fn load_simple(doc: &Document, dict: &Dictionary, subtype: FontSubtype) -> Result<Font, BackendError> {
    let descriptor_dict = objects::get_dict(doc, dict, b"FontDescriptor");
    let descriptor = match descriptor_dict {
        Some(d) => FontDescriptor::load(doc, d)?,
        None => FontDescriptor::default(),
    };

    let mut encoding = match objects::get(doc, dict, b"Encoding") {
        Some(Object::Name(name)) => {
            BaseEncoding::from_name(&String::from_utf8_lossy(name)).map(SimpleEncoding::from_base)
        }
        Some(Object::Dictionary(enc)) => {
            let mut encoding = SimpleEncoding {
                base: objects::get_name(doc, enc, b"BaseEncoding")
                    .and_then(|n| BaseEncoding::from_name(&n)),
                ..SimpleEncoding::default()
            };
            if let Some(diffs) = objects::get_array(doc, enc, b"Differences") {
                encoding.apply_differences(&differences(doc, diffs));
            }
            Some(encoding)
        }
        _ => None,
    };
    if subtype != FontSubtype::Type3 && !descriptor.is_symbolic() {
        // Non-symbolic fonts fall back to StandardEncoding.
        let enc = encoding.get_or_insert_with(SimpleEncoding::default);
        enc.base.get_or_insert(BaseEncoding::Standard);
    }

    let widths = SimpleWidths::load(doc, dict, descriptor_dict);
    let mut font = Font::simple(subtype, encoding, widths);

    font.program = match (subtype, &descriptor.font_file) {
        (FontSubtype::Type3, _) => {
            let names = objects::get_dict(doc, dict, b"CharProcs")
                .map(|procs| {
                    procs
                        .iter()
                        .map(|(k, _)| String::from_utf8_lossy(k).into_owned())
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default();
            Some(Arc::new(Type3Program::new(names)) as Arc<dyn FontProgram>)
        }
        (_, Some((kind, data))) => truetype_program(&descriptor, *kind, data, None),
        _ => None,
    };
    Ok(font)
}

fn load_composite(doc: &Document, dict: &Dictionary) -> Result<Font, BackendError> {
    let mapping = match objects::get(doc, dict, b"Encoding") {
        Some(Object::Name(name)) => {
            let name = String::from_utf8_lossy(name);
            match PredefinedCMap::from_name(&name) {
                Some(PredefinedCMap::Identity { .. }) => CidMapping::Identity,
                Some(predefined) => CidMapping::Predefined(predefined),
                None => {
                    return Err(BackendError::Font(format!("unknown predefined CMap /{name}")));
                }
            }
        }
        Some(Object::Stream(stream)) => {
            CidMapping::Embedded(CidCMap::parse(&objects::stream_bytes(stream)?)?)
        }
        _ => return Err(BackendError::Font("Type0 font without /Encoding".to_string())),
    };

    let descendant = descendant_font(doc, dict)
        .ok_or_else(|| BackendError::Font("Type0 font without /DescendantFonts".to_string()))?;
    let cid_font = CidFont::load(doc, descendant)?;
    let descriptor = match objects::get_dict(doc, descendant, b"FontDescriptor") {
        Some(d) => FontDescriptor::load(doc, d)?,
        None => FontDescriptor::default(),
    };

    let mut font = Font::composite(mapping, cid_font.widths);
    font.descendant_type = Some(cid_font.font_type);
    if let Some((kind, data)) = &descriptor.font_file {
        let cid_to_gid = (cid_font.font_type == CidFontType::Type2).then_some(cid_font.cid_to_gid);
        font.program = truetype_program(&descriptor, *kind, data, cid_to_gid);
    }
    Ok(font)
}

/// Parse the embedded program when it is TrueType or OpenType.
fn truetype_program(
    descriptor: &FontDescriptor,
    kind: FontFileKind,
    data: &[u8],
    cid_to_gid: Option<crate::cid_font::CidToGidMap>,
) -> Option<Arc<dyn FontProgram>> {
    let is_sfnt = match kind {
        FontFileKind::TrueType => true,
        FontFileKind::FontFile3 => descriptor.font_file_subtype.as_deref() == Some("OpenType"),
        FontFileKind::Type1 => false,
    };
    if !is_sfnt {
        return None;
    }
    match TrueTypeProgram::parse(data.to_vec(), cid_to_gid) {
        Ok(program) => Some(Arc::new(program)),
        Err(e) => {
            warn!("embedded font program unreadable: {e}");
            None
        }
    }
}

/// Flatten a `/Differences` array into (start code, names) runs.
fn differences(doc: &Document, items: &[Object]) -> Vec<(u32, Vec<String>)> {
    let mut runs: Vec<(u32, Vec<String>)> = Vec::new();
    for item in items {
        match objects::resolve(doc, item) {
            Object::Integer(code) => runs.push((u32::try_from(*code).unwrap_or(0), Vec::new())),
            obj => {
                if let (Some(name), Some(run)) = (objects::name(obj), runs.last_mut()) {
                    run.1.push(name);
                }
            }
        }
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{Stream, dictionary};

    fn name(n: &str) -> Object {
        Object::Name(n.as_bytes().to_vec())
    }

    #[test]
    fn simple_font_default_standard_encoding() {
        let doc = Document::with_version("1.5");
        let dict = dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "FirstChar" => 72i64,
            "Widths" => vec![Object::Integer(722), Object::Integer(278)],
        };
        let font = Font::load(&doc, &dict).unwrap();
        assert_eq!(font.subtype, FontSubtype::Type1);
        assert_eq!(font.base_font.as_deref(), Some("Helvetica"));
        assert_eq!(font.glyph_name(0x48), Some("H"));
        assert_eq!(font.declared_width(0x48), Some(722.0));
        assert_eq!(font.declared_width(0x49), Some(278.0));
        assert!(!font.is_embedded());
    }

    #[test]
    fn symbolic_font_without_encoding_has_none() {
        let mut doc = Document::with_version("1.5");
        let desc = doc.add_object(dictionary! { "Type" => "FontDescriptor", "Flags" => 4i64 });
        let dict = dictionary! { "Subtype" => "TrueType", "FontDescriptor" => desc };
        let font = Font::load(&doc, &dict).unwrap();
        assert!(font.encoding.is_none());
        assert_eq!(font.glyph_name(0x41), None);
    }

    #[test]
    fn differences_override_base() {
        let doc = Document::with_version("1.5");
        let dict = dictionary! {
            "Subtype" => "Type1",
            "Encoding" => dictionary! {
                "BaseEncoding" => "WinAnsiEncoding",
                "Differences" => vec![Object::Integer(65), name("Alpha"), name("Beta")],
            },
        };
        let font = Font::load(&doc, &dict).unwrap();
        assert_eq!(font.glyph_name(65), Some("Alpha"));
        assert_eq!(font.glyph_name(66), Some("Beta"));
        assert_eq!(font.glyph_name(67), Some("C"));
    }

    #[test]
    fn type3_program_from_char_procs() {
        let mut doc = Document::with_version("1.5");
        let proc_id = doc.add_object(Stream::new(dictionary! {}, b"0 0 d0".to_vec()));
        let dict = dictionary! {
            "Subtype" => "Type3",
            "CharProcs" => dictionary! { "square" => proc_id },
            "Encoding" => dictionary! {
                "Differences" => vec![Object::Integer(97), name("square")],
            },
            "FirstChar" => 97i64,
            "Widths" => vec![Object::Integer(1000)],
        };
        let font = Font::load(&doc, &dict).unwrap();
        assert!(font.is_embedded());
        assert_eq!(font.glyph_name(97), Some("square"));
        let program = font.program.as_ref().unwrap();
        assert!(program.is_glyph_present(&crate::font_program::GlyphRef::Code {
            code: 97,
            name: Some("square"),
            unicode: None,
        }));
    }

    #[test]
    fn composite_identity_font() {
        let mut doc = Document::with_version("1.5");
        let descendant = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "CIDFontType2",
            "DW" => 1000i64,
            "W" => vec![Object::Integer(5), Object::Array(vec![Object::Integer(500)])],
        });
        let dict = dictionary! {
            "Subtype" => "Type0",
            "BaseFont" => "Custom",
            "Encoding" => "Identity-H",
            "DescendantFonts" => vec![Object::Reference(descendant)],
        };
        let font = Font::load(&doc, &dict).unwrap();
        assert!(font.is_composite());
        assert_eq!(font.descendant_type, Some(CidFontType::Type2));
        let codes = font.read_codes(&[0x00, 0x05, 0x00, 0x06]).unwrap();
        assert_eq!(font.cid(codes[0].code), Some(5));
        assert_eq!(font.declared_width(codes[0].code), Some(500.0));
        assert_eq!(font.declared_width(codes[1].code), Some(1000.0));
    }

    #[test]
    fn composite_without_descendant_is_error() {
        let doc = Document::with_version("1.5");
        let dict = dictionary! { "Subtype" => "Type0", "Encoding" => "Identity-H" };
        assert!(Font::load(&doc, &dict).is_err());
    }

    #[test]
    fn utf16_predefined_text_and_unknown_cid() {
        let font = Font::composite(
            CidMapping::Predefined(PredefinedCMap::Utf16 { vertical: false }),
            CidWidths::default(),
        );
        let codes = font.read_codes(&[0x00, 0x41]).unwrap();
        assert_eq!(font.unicode(&codes[0]).as_deref(), Some("A"));
        assert_eq!(font.cid(codes[0].code), None);
        assert_eq!(font.declared_width(codes[0].code), None);
    }

    #[test]
    fn to_unicode_wins_over_glyph_name() {
        let cmap = ToUnicodeCMap::parse(b"beginbfchar\n<41> <0042>\nendbfchar").unwrap();
        let font = Font::simple(
            FontSubtype::Type1,
            Some(SimpleEncoding::from_base(BaseEncoding::Standard)),
            SimpleWidths::default(),
        )
        .with_to_unicode(cmap);
        let code = CharCode {
            code: 0x41,
            bytes: vec![0x41],
        };
        assert_eq!(font.unicode(&code).as_deref(), Some("B"));
    }

    #[test]
    fn missing_subtype_is_error() {
        let doc = Document::with_version("1.5");
        assert!(Font::load(&doc, &dictionary! { "Type" => "Font" }).is_err());
        assert!(Font::load(&doc, &dictionary! { "Subtype" => "OpenType" }).is_err());
    }
}
