//! Composite (Type 0) font support.
//!
//! Handles the descendant CIDFont's widths (`/W`, `/DW`), its CID-to-GID
//! mapping, predefined CMap names and the byte-level reading of character
//! codes from show-text strings.

use std::collections::HashMap;

use encoding_rs::Encoding;
use lopdf::{Dictionary, Document, Object};

use tracing::warn;

use crate::cmap::{CidCMap, CodespaceRange, range_span};
use crate::error::BackendError;
use crate::objects;

/// Default CID width when /DW is absent.
const DEFAULT_CID_WIDTH: f64 = 1000.0;

/// CIDFont subtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CidFontType {
    /// CIDFontType0: CFF outlines.
    Type0,
    /// CIDFontType2: TrueType outlines.
    Type2,
}

/// CID-to-GID mapping of a CIDFontType2 font.
#[derive(Debug, Clone, PartialEq)]
pub enum CidToGidMap {
    Identity,
    /// GID for CID `n` at index `n`.
    Explicit(Vec<u16>),
}

impl CidToGidMap {
    /// Map a CID to a GID. CIDs past the end of an explicit table map to 0
    /// (`.notdef`).
    pub fn map(&self, cid: u32) -> u32 {
        match self {
            CidToGidMap::Identity => cid,
            CidToGidMap::Explicit(table) => table.get(cid as usize).copied().map_or(0, u32::from),
        }
    }

    /// Parse a CIDToGIDMap stream (big-endian u16 pairs).
    pub fn from_stream(data: &[u8]) -> Self {
        CidToGidMap::Explicit(
            data.chunks_exact(2)
                .map(|c| u16::from_be_bytes([c[0], c[1]]))
                .collect(),
        )
    }
}

/// The `/CIDSystemInfo` dictionary.
#[derive(Debug, Clone, PartialEq)]
pub struct CidSystemInfo {
    pub registry: String,
    pub ordering: String,
    pub supplement: i64,
}

/// Declared widths of a CIDFont.
#[derive(Debug, Clone, PartialEq)]
pub struct CidWidths {
    widths: HashMap<u32, f64>,
    default_width: f64,
}

impl Default for CidWidths {
    fn default() -> Self {
        Self {
            widths: HashMap::new(),
            default_width: DEFAULT_CID_WIDTH,
        }
    }
}

impl CidWidths {
    pub fn new(widths: HashMap<u32, f64>, default_width: f64) -> Self {
        Self {
            widths,
            default_width,
        }
    }

    /// Width of `cid` in glyph space (1/1000 of text space).
    pub fn width(&self, cid: u32) -> f64 {
        self.widths.get(&cid).copied().unwrap_or(self.default_width)
    }

    pub fn default_width(&self) -> f64 {
        self.default_width
    }
}

/// Parse a `/W` array:
///
/// ```text
/// [ c [w1 w2 ...]  c_first c_last w ... ]
/// ```
pub fn parse_w_array(objects: &[Object], doc: &Document) -> HashMap<u32, f64> {
    let mut widths = HashMap::new();
    let mut i = 0;

    while i < objects.len() {
        let Some(start) = objects::number(objects::resolve(doc, &objects[i])) else {
            i += 1;
            continue;
        };
        let start = start as u32;
        i += 1;
        let Some(next) = objects.get(i).map(|o| objects::resolve(doc, o)) else {
            break;
        };

        if let Ok(arr) = next.as_array() {
            for (j, obj) in arr.iter().enumerate() {
                let Some(cid) = u32::try_from(j).ok().and_then(|j| start.checked_add(j)) else {
                    break;
                };
                if let Some(w) = objects::number(objects::resolve(doc, obj)) {
                    widths.insert(cid, w);
                }
            }
            i += 1;
        } else if let Some(end) = objects::number(next) {
            let w = objects
                .get(i + 1)
                .and_then(|o| objects::number(objects::resolve(doc, o)));
            let end = end as u32;
            match (w, range_span(start, end)) {
                (Some(w), Some(_)) => {
                    for cid in start..=end {
                        widths.insert(cid, w);
                    }
                }
                (Some(_), None) => warn!(start, end, "skipping unusable /W range"),
                (None, _) => {}
            }
            i += 2;
        } else {
            i += 1;
        }
    }

    widths
}

/// Everything read from a descendant CIDFont dictionary.
#[derive(Debug, Clone)]
pub struct CidFont {
    pub font_type: CidFontType,
    pub widths: CidWidths,
    pub cid_to_gid: CidToGidMap,
    pub system_info: Option<CidSystemInfo>,
}

impl CidFont {
    /// Read a descendant CIDFont dictionary.
    pub fn load(doc: &Document, dict: &Dictionary) -> Result<Self, BackendError> {
        let font_type = match objects::get_name(doc, dict, b"Subtype").as_deref() {
            Some("CIDFontType0") => CidFontType::Type0,
            Some("CIDFontType2") | None => CidFontType::Type2,
            Some(other) => {
                return Err(BackendError::Font(format!(
                    "unknown descendant font subtype /{other}"
                )));
            }
        };

        let default_width =
            objects::get_number(doc, dict, b"DW").unwrap_or(DEFAULT_CID_WIDTH);
        let widths = objects::get_array(doc, dict, b"W")
            .map(|arr| parse_w_array(arr, doc))
            .unwrap_or_default();

        let cid_to_gid = match objects::get(doc, dict, b"CIDToGIDMap") {
            Some(Object::Stream(stream)) => CidToGidMap::from_stream(&objects::stream_bytes(stream)?),
            _ => CidToGidMap::Identity,
        };

        let system_info = objects::get_dict(doc, dict, b"CIDSystemInfo").map(|info| CidSystemInfo {
            registry: objects::get(doc, info, b"Registry")
                .and_then(objects::text)
                .unwrap_or_default(),
            ordering: objects::get(doc, info, b"Ordering")
                .and_then(objects::text)
                .unwrap_or_default(),
            supplement: objects::get_integer(doc, info, b"Supplement").unwrap_or(0),
        });

        Ok(CidFont {
            font_type,
            widths: CidWidths::new(widths, default_width),
            cid_to_gid,
            system_info,
        })
    }
}

/// The first entry of a Type 0 font's `/DescendantFonts`.
pub fn descendant_font<'a>(doc: &'a Document, type0: &'a Dictionary) -> Option<&'a Dictionary> {
    let first = objects::get_array(doc, type0, b"DescendantFonts")?.first()?;
    objects::resolve(doc, first).as_dict().ok()
}

/// What a predefined CMap name tells about code bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredefinedCMap {
    /// `Identity-H` / `Identity-V`: two-byte codes equal to CIDs.
    Identity { vertical: bool },
    /// `Uni*-UCS2-*` / `Uni*-UTF16-*`: codes are UTF-16BE units.
    Utf16 { vertical: bool },
    /// A legacy multi-byte CJK charset.
    Legacy {
        encoding: &'static Encoding,
        vertical: bool,
    },
}

impl PredefinedCMap {
    /// Classify a predefined CMap by name.
    pub fn from_name(name: &str) -> Option<Self> {
        let (base, vertical) = if let Some(b) = name.strip_suffix("-H") {
            (b, false)
        } else if let Some(b) = name.strip_suffix("-V") {
            (b, true)
        } else {
            (name, false)
        };

        if base == "Identity" {
            return Some(PredefinedCMap::Identity { vertical });
        }
        if base.starts_with("Uni") && (base.contains("-UCS2") || base.contains("-UTF16")) {
            return Some(PredefinedCMap::Utf16 { vertical });
        }

        let encoding = match base {
            "GBK-EUC" | "GB-EUC" | "GBpc-EUC" | "GBK2K" => encoding_rs::GBK,
            "B5pc" | "ETen-B5" | "HKscs-B5" | "ETenms-B5" => encoding_rs::BIG5,
            "90ms-RKSJ" | "90pv-RKSJ" | "83pv-RKSJ" | "78-RKSJ" | "Add-RKSJ" | "Ext-RKSJ"
            | "90msp-RKSJ" => encoding_rs::SHIFT_JIS,
            "EUC" | "78-EUC" => encoding_rs::EUC_JP,
            "KSC-EUC" | "KSCms-UHC" | "KSCpc-EUC" | "KSCms-UHC-HW" => encoding_rs::EUC_KR,
            _ => return None,
        };
        Some(PredefinedCMap::Legacy { encoding, vertical })
    }

    pub fn is_vertical(&self) -> bool {
        match *self {
            PredefinedCMap::Identity { vertical }
            | PredefinedCMap::Utf16 { vertical }
            | PredefinedCMap::Legacy { vertical, .. } => vertical,
        }
    }
}

fn is_lead_byte(byte: u8, encoding: &'static Encoding) -> bool {
    if encoding == encoding_rs::SHIFT_JIS {
        (0x81..=0x9F).contains(&byte) || (0xE0..=0xFC).contains(&byte)
    } else if encoding == encoding_rs::EUC_JP {
        (0xA1..=0xFE).contains(&byte) || byte == 0x8E
    } else {
        // GBK, Big5, EUC-KR
        (0x81..=0xFE).contains(&byte)
    }
}

/// One code read from a show-text string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharCode {
    pub code: u32,
    /// The bytes the code was read from.
    pub bytes: Vec<u8>,
}

/// How a font splits string bytes into character codes.
#[derive(Debug, Clone)]
pub enum CodeReader {
    /// Simple fonts: one byte per code.
    SingleByte,
    /// Identity CMaps: two bytes per code.
    TwoByte,
    /// UTF-16BE: two bytes, four for a surrogate pair.
    Utf16,
    /// Legacy charsets: lead-byte detection.
    Legacy(&'static Encoding),
    /// Embedded CMaps: codespace ranges.
    Codespace(Vec<CodespaceRange>),
}

impl CodeReader {
    pub fn for_predefined(cmap: PredefinedCMap) -> Self {
        match cmap {
            PredefinedCMap::Identity { .. } => CodeReader::TwoByte,
            PredefinedCMap::Utf16 { .. } => CodeReader::Utf16,
            PredefinedCMap::Legacy { encoding, .. } => CodeReader::Legacy(encoding),
        }
    }

    /// Use an embedded CMap's codespace, falling back to two-byte codes when
    /// none is declared.
    pub fn for_embedded(cmap: &CidCMap) -> Self {
        if cmap.codespaces().is_empty() {
            CodeReader::TwoByte
        } else {
            CodeReader::Codespace(cmap.codespaces().to_vec())
        }
    }

    /// Split `bytes` into codes. A trailing partial code is an error.
    pub fn read_codes(&self, bytes: &[u8]) -> Result<Vec<CharCode>, BackendError> {
        let mut codes = Vec::with_capacity(bytes.len());
        let mut pos = 0;
        while pos < bytes.len() {
            let len = self.code_len(&bytes[pos..]);
            let Some(chunk) = bytes.get(pos..pos + len) else {
                return Err(BackendError::Font(format!(
                    "truncated {len}-byte character code at offset {pos}"
                )));
            };
            codes.push(CharCode {
                code: chunk.iter().fold(0u32, |acc, b| (acc << 8) | u32::from(*b)),
                bytes: chunk.to_vec(),
            });
            pos += len;
        }
        Ok(codes)
    }

    fn code_len(&self, rest: &[u8]) -> usize {
        match self {
            CodeReader::SingleByte => 1,
            CodeReader::TwoByte => 2,
            CodeReader::Utf16 => {
                if rest.first().is_some_and(|b| (0xD8..=0xDB).contains(b)) {
                    4
                } else {
                    2
                }
            }
            CodeReader::Legacy(encoding) => {
                if rest.first().is_some_and(|b| is_lead_byte(*b, encoding)) {
                    2
                } else {
                    1
                }
            }
            CodeReader::Codespace(ranges) => {
                for len in 1..=4 {
                    if ranges
                        .iter()
                        .any(|r| r.byte_len() == len && r.matches(rest))
                    {
                        return len;
                    }
                }
                // No range matched: consume as many bytes as the shortest
                // range whose first byte matches, else the shortest range.
                let first = rest.first().copied().unwrap_or(0);
                ranges
                    .iter()
                    .filter(|r| (r.low[0]..=r.high[0]).contains(&first))
                    .map(CodespaceRange::byte_len)
                    .min()
                    .or_else(|| ranges.iter().map(CodespaceRange::byte_len).min())
                    .unwrap_or(1)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{Stream, dictionary};

    #[test]
    fn identity_gid_map() {
        assert_eq!(CidToGidMap::Identity.map(65535), 65535);
    }

    #[test]
    fn explicit_gid_map_from_stream() {
        let map = CidToGidMap::from_stream(&[0x00, 0x05, 0x00, 0x0A, 0x01]);
        assert_eq!(map.map(0), 5);
        assert_eq!(map.map(1), 10);
        assert_eq!(map.map(2), 0);
    }

    #[test]
    fn w_array_both_forms() {
        let doc = Document::with_version("1.5");
        let w = vec![
            Object::Integer(1),
            Object::Array(vec![Object::Integer(500), Object::Real(600.0)]),
            Object::Integer(10),
            Object::Integer(12),
            Object::Integer(250),
        ];
        let widths = parse_w_array(&w, &doc);
        assert_eq!(widths.get(&1), Some(&500.0));
        assert_eq!(widths.get(&2), Some(&600.0));
        assert_eq!(widths.get(&10), Some(&250.0));
        assert_eq!(widths.get(&12), Some(&250.0));
        assert_eq!(widths.get(&13), None);
    }

    #[test]
    fn w_array_tolerates_hostile_ranges() {
        let doc = Document::with_version("1.5");
        let w = vec![
            Object::Integer(4_294_967_295),
            Object::Array(vec![Object::Integer(500), Object::Integer(600)]),
        ];
        let widths = parse_w_array(&w, &doc);
        assert_eq!(widths.get(&u32::MAX), Some(&500.0));
        assert_eq!(widths.len(), 1);

        let w = vec![
            Object::Integer(0),
            Object::Integer(4_294_967_295),
            Object::Integer(500),
            Object::Integer(10),
            Object::Integer(12),
            Object::Integer(700),
        ];
        let widths = parse_w_array(&w, &doc);
        assert_eq!(widths.len(), 3);
        assert_eq!(widths.get(&11), Some(&700.0));
        assert_eq!(widths.get(&0), None);
    }

    #[test]
    fn load_cid_font_with_defaults() {
        let doc = Document::with_version("1.5");
        let dict = dictionary! {
            "Type" => "Font",
            "Subtype" => "CIDFontType2",
            "DW" => 800i64,
            "W" => vec![Object::Integer(3), Object::Array(vec![Object::Integer(278)])],
        };
        let font = CidFont::load(&doc, &dict).unwrap();
        assert_eq!(font.font_type, CidFontType::Type2);
        assert_eq!(font.widths.width(3), 278.0);
        assert_eq!(font.widths.width(4), 800.0);
        assert_eq!(font.cid_to_gid, CidToGidMap::Identity);
        assert!(font.system_info.is_none());
    }

    #[test]
    fn load_cid_font_with_gid_stream_and_info() {
        let mut doc = Document::with_version("1.5");
        let map_id = doc.add_object(Stream::new(dictionary! {}, vec![0x00, 0x07]));
        let dict = dictionary! {
            "Subtype" => "CIDFontType0",
            "CIDToGIDMap" => map_id,
            "CIDSystemInfo" => dictionary! {
                "Registry" => Object::string_literal("Adobe"),
                "Ordering" => Object::string_literal("Japan1"),
                "Supplement" => 6i64,
            },
        };
        let font = CidFont::load(&doc, &dict).unwrap();
        assert_eq!(font.font_type, CidFontType::Type0);
        assert_eq!(font.cid_to_gid.map(0), 7);
        let info = font.system_info.unwrap();
        assert_eq!(info.ordering, "Japan1");
        assert_eq!(info.supplement, 6);
    }

    #[test]
    fn unknown_descendant_subtype_is_error() {
        let doc = Document::with_version("1.5");
        let dict = dictionary! { "Subtype" => "Type1" };
        assert!(CidFont::load(&doc, &dict).is_err());
    }

    #[test]
    fn predefined_names() {
        assert_eq!(
            PredefinedCMap::from_name("Identity-V"),
            Some(PredefinedCMap::Identity { vertical: true })
        );
        assert_eq!(
            PredefinedCMap::from_name("UniJIS-UTF16-H"),
            Some(PredefinedCMap::Utf16 { vertical: false })
        );
        assert_eq!(
            PredefinedCMap::from_name("90ms-RKSJ-H"),
            Some(PredefinedCMap::Legacy {
                encoding: encoding_rs::SHIFT_JIS,
                vertical: false
            })
        );
        assert!(PredefinedCMap::from_name("GBK-EUC-V").unwrap().is_vertical());
        assert!(PredefinedCMap::from_name("Nonsense-H").is_none());
    }

    #[test]
    fn two_byte_reader() {
        let codes = CodeReader::TwoByte.read_codes(&[0x00, 0x41, 0x01, 0x02]).unwrap();
        assert_eq!(codes.len(), 2);
        assert_eq!(codes[0].code, 0x41);
        assert_eq!(codes[1].code, 0x0102);
    }

    #[test]
    fn two_byte_reader_truncated() {
        assert!(CodeReader::TwoByte.read_codes(&[0x00, 0x41, 0x01]).is_err());
    }

    #[test]
    fn shift_jis_lead_bytes() {
        let reader = CodeReader::Legacy(encoding_rs::SHIFT_JIS);
        let codes = reader.read_codes(&[0x41, 0x82, 0xA0, 0x42]).unwrap();
        let values: Vec<u32> = codes.iter().map(|c| c.code).collect();
        assert_eq!(values, vec![0x41, 0x82A0, 0x42]);
    }

    #[test]
    fn utf16_surrogates() {
        let codes = CodeReader::Utf16
            .read_codes(&[0x00, 0x41, 0xD8, 0x3D, 0xDE, 0x00])
            .unwrap();
        assert_eq!(codes.len(), 2);
        assert_eq!(codes[1].bytes.len(), 4);
    }

    #[test]
    fn codespace_reader_mixed_lengths() {
        let cmap = CidCMap::parse(
            b"begincodespacerange\n<00> <80>\n<8140> <FEFE>\nendcodespacerange",
        )
        .unwrap();
        let reader = CodeReader::for_embedded(&cmap);
        let codes = reader.read_codes(&[0x41, 0x81, 0x40, 0x20]).unwrap();
        let values: Vec<u32> = codes.iter().map(|c| c.code).collect();
        assert_eq!(values, vec![0x41, 0x8140, 0x20]);
    }

    #[test]
    fn codespace_reader_truncated_double_byte() {
        let cmap = CidCMap::parse(
            b"begincodespacerange\n<00> <80>\n<8140> <FEFE>\nendcodespacerange",
        )
        .unwrap();
        assert!(CodeReader::for_embedded(&cmap).read_codes(&[0x41, 0x81]).is_err());
    }
}
