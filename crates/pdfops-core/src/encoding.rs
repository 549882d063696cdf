//! Simple-font encodings: character code to glyph name, glyph name to Unicode.
//!
//! Covers the three base encodings a PDF simple font may name
//! (`StandardEncoding`, `WinAnsiEncoding`, `MacRomanEncoding`) plus
//! `/Differences` overlays.

use std::collections::HashMap;
use std::sync::OnceLock;

/// Glyph names for codes 32..=126 shared by the Latin encodings.
/// Index 7 (0x27) and 64 (0x60) differ in StandardEncoding.
const ASCII_NAMES: [&str; 95] = [
    "space", "exclam", "quotedbl", "numbersign", "dollar", "percent", "ampersand",
    "quotesingle", "parenleft", "parenright", "asterisk", "plus", "comma", "hyphen",
    "period", "slash", "zero", "one", "two", "three", "four", "five", "six", "seven",
    "eight", "nine", "colon", "semicolon", "less", "equal", "greater", "question", "at",
    "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O", "P", "Q",
    "R", "S", "T", "U", "V", "W", "X", "Y", "Z", "bracketleft", "backslash",
    "bracketright", "asciicircum", "underscore", "grave", "a", "b", "c", "d", "e", "f",
    "g", "h", "i", "j", "k", "l", "m", "n", "o", "p", "q", "r", "s", "t", "u", "v", "w",
    "x", "y", "z", "braceleft", "bar", "braceright", "asciitilde",
];

/// Glyph names for Latin-1 code points 0xA1..=0xFF, as laid out in WinAnsiEncoding.
const LATIN1_NAMES: [&str; 95] = [
    "exclamdown", "cent", "sterling", "currency", "yen", "brokenbar", "section",
    "dieresis", "copyright", "ordfeminine", "guillemotleft", "logicalnot", "hyphen",
    "registered", "macron", "degree", "plusminus", "twosuperior", "threesuperior",
    "acute", "mu", "paragraph", "periodcentered", "cedilla", "onesuperior",
    "ordmasculine", "guillemotright", "onequarter", "onehalf", "threequarters",
    "questiondown", "Agrave", "Aacute", "Acircumflex", "Atilde", "Adieresis", "Aring",
    "AE", "Ccedilla", "Egrave", "Eacute", "Ecircumflex", "Edieresis", "Igrave", "Iacute",
    "Icircumflex", "Idieresis", "Eth", "Ntilde", "Ograve", "Oacute", "Ocircumflex",
    "Otilde", "Odieresis", "multiply", "Oslash", "Ugrave", "Uacute", "Ucircumflex",
    "Udieresis", "Yacute", "Thorn", "germandbls", "agrave", "aacute", "acircumflex",
    "atilde", "adieresis", "aring", "ae", "ccedilla", "egrave", "eacute", "ecircumflex",
    "edieresis", "igrave", "iacute", "icircumflex", "idieresis", "eth", "ntilde",
    "ograve", "oacute", "ocircumflex", "otilde", "odieresis", "divide", "oslash",
    "ugrave", "uacute", "ucircumflex", "udieresis", "yacute", "thorn", "ydieresis",
];

const STANDARD_HIGH: &[(u8, &str)] = &[
    (0xA1, "exclamdown"), (0xA2, "cent"), (0xA3, "sterling"), (0xA4, "fraction"),
    (0xA5, "yen"), (0xA6, "florin"), (0xA7, "section"), (0xA8, "currency"),
    (0xA9, "quotesingle"), (0xAA, "quotedblleft"), (0xAB, "guillemotleft"),
    (0xAC, "guilsinglleft"), (0xAD, "guilsinglright"), (0xAE, "fi"), (0xAF, "fl"),
    (0xB1, "endash"), (0xB2, "dagger"), (0xB3, "daggerdbl"), (0xB4, "periodcentered"),
    (0xB6, "paragraph"), (0xB7, "bullet"), (0xB8, "quotesinglbase"),
    (0xB9, "quotedblbase"), (0xBA, "quotedblright"), (0xBB, "guillemotright"),
    (0xBC, "ellipsis"), (0xBD, "perthousand"), (0xBF, "questiondown"), (0xC1, "grave"),
    (0xC2, "acute"), (0xC3, "circumflex"), (0xC4, "tilde"), (0xC5, "macron"),
    (0xC6, "breve"), (0xC7, "dotaccent"), (0xC8, "dieresis"), (0xCA, "ring"),
    (0xCB, "cedilla"), (0xCD, "hungarumlaut"), (0xCE, "ogonek"), (0xCF, "caron"),
    (0xD0, "emdash"), (0xE1, "AE"), (0xE3, "ordfeminine"), (0xE8, "Lslash"),
    (0xE9, "Oslash"), (0xEA, "OE"), (0xEB, "ordmasculine"), (0xF1, "ae"),
    (0xF5, "dotlessi"), (0xF8, "lslash"), (0xF9, "oslash"), (0xFA, "oe"),
    (0xFB, "germandbls"),
];

const WIN_ANSI_HIGH: &[(u8, &str)] = &[
    (0x80, "Euro"), (0x82, "quotesinglbase"), (0x83, "florin"), (0x84, "quotedblbase"),
    (0x85, "ellipsis"), (0x86, "dagger"), (0x87, "daggerdbl"), (0x88, "circumflex"),
    (0x89, "perthousand"), (0x8A, "Scaron"), (0x8B, "guilsinglleft"), (0x8C, "OE"),
    (0x8E, "Zcaron"), (0x91, "quoteleft"), (0x92, "quoteright"), (0x93, "quotedblleft"),
    (0x94, "quotedblright"), (0x95, "bullet"), (0x96, "endash"), (0x97, "emdash"),
    (0x98, "tilde"), (0x99, "trademark"), (0x9A, "scaron"), (0x9B, "guilsinglright"),
    (0x9C, "oe"), (0x9E, "zcaron"), (0x9F, "Ydieresis"), (0xA0, "space"),
];

const MAC_ROMAN_HIGH: &[(u8, &str)] = &[
    (0x80, "Adieresis"), (0x81, "Aring"), (0x82, "Ccedilla"), (0x83, "Eacute"),
    (0x84, "Ntilde"), (0x85, "Odieresis"), (0x86, "Udieresis"), (0x87, "aacute"),
    (0x88, "agrave"), (0x89, "acircumflex"), (0x8A, "adieresis"), (0x8B, "atilde"),
    (0x8C, "aring"), (0x8D, "ccedilla"), (0x8E, "eacute"), (0x8F, "egrave"),
    (0x90, "ecircumflex"), (0x91, "edieresis"), (0x92, "iacute"), (0x93, "igrave"),
    (0x94, "icircumflex"), (0x95, "idieresis"), (0x96, "ntilde"), (0x97, "oacute"),
    (0x98, "ograve"), (0x99, "ocircumflex"), (0x9A, "odieresis"), (0x9B, "otilde"),
    (0x9C, "uacute"), (0x9D, "ugrave"), (0x9E, "ucircumflex"), (0x9F, "udieresis"),
    (0xA0, "dagger"), (0xA1, "degree"), (0xA2, "cent"), (0xA3, "sterling"),
    (0xA4, "section"), (0xA5, "bullet"), (0xA6, "paragraph"), (0xA7, "germandbls"),
    (0xA8, "registered"), (0xA9, "copyright"), (0xAA, "trademark"), (0xAB, "acute"),
    (0xAC, "dieresis"), (0xAE, "AE"), (0xAF, "Oslash"), (0xB1, "plusminus"),
    (0xB4, "yen"), (0xB5, "mu"), (0xBB, "ordfeminine"), (0xBC, "ordmasculine"),
    (0xBE, "ae"), (0xBF, "oslash"), (0xC0, "questiondown"), (0xC1, "exclamdown"),
    (0xC2, "logicalnot"), (0xC4, "florin"), (0xC7, "guillemotleft"),
    (0xC8, "guillemotright"), (0xC9, "ellipsis"), (0xCA, "space"), (0xCB, "Agrave"),
    (0xCC, "Atilde"), (0xCD, "Otilde"), (0xCE, "OE"), (0xCF, "oe"), (0xD0, "endash"),
    (0xD1, "emdash"), (0xD2, "quotedblleft"), (0xD3, "quotedblright"),
    (0xD4, "quoteleft"), (0xD5, "quoteright"), (0xD6, "divide"), (0xD8, "ydieresis"),
    (0xD9, "Ydieresis"), (0xDA, "fraction"), (0xDB, "currency"), (0xDC, "guilsinglleft"),
    (0xDD, "guilsinglright"), (0xDE, "fi"), (0xDF, "fl"), (0xE0, "daggerdbl"),
    (0xE1, "periodcentered"), (0xE2, "quotesinglbase"), (0xE3, "quotedblbase"),
    (0xE4, "perthousand"), (0xE5, "Acircumflex"), (0xE6, "Ecircumflex"),
    (0xE7, "Aacute"), (0xE8, "Edieresis"), (0xE9, "Egrave"), (0xEA, "Iacute"),
    (0xEB, "Icircumflex"), (0xEC, "Idieresis"), (0xED, "Igrave"), (0xEE, "Oacute"),
    (0xEF, "Ocircumflex"), (0xF1, "Ograve"), (0xF2, "Uacute"), (0xF3, "Ucircumflex"),
    (0xF4, "Ugrave"), (0xF5, "dotlessi"), (0xF6, "circumflex"), (0xF7, "tilde"),
    (0xF8, "macron"), (0xF9, "breve"), (0xFA, "dotaccent"), (0xFB, "ring"),
    (0xFC, "cedilla"), (0xFD, "hungarumlaut"), (0xFE, "ogonek"), (0xFF, "caron"),
];

/// Names outside ASCII and Latin-1 that the base encodings use.
const EXTRA_UNICODE: &[(&str, char)] = &[
    ("quoteleft", '\u{2018}'), ("quoteright", '\u{2019}'), ("quotedblleft", '\u{201C}'),
    ("quotedblright", '\u{201D}'), ("quotesinglbase", '\u{201A}'),
    ("quotedblbase", '\u{201E}'), ("guilsinglleft", '\u{2039}'),
    ("guilsinglright", '\u{203A}'), ("Euro", '\u{20AC}'), ("florin", '\u{0192}'),
    ("ellipsis", '\u{2026}'), ("dagger", '\u{2020}'), ("daggerdbl", '\u{2021}'),
    ("circumflex", '\u{02C6}'), ("perthousand", '\u{2030}'), ("Scaron", '\u{0160}'),
    ("scaron", '\u{0161}'), ("OE", '\u{0152}'), ("oe", '\u{0153}'),
    ("Zcaron", '\u{017D}'), ("zcaron", '\u{017E}'), ("Ydieresis", '\u{0178}'),
    ("bullet", '\u{2022}'), ("endash", '\u{2013}'), ("emdash", '\u{2014}'),
    ("tilde", '\u{02DC}'), ("trademark", '\u{2122}'), ("fraction", '\u{2044}'),
    ("fi", '\u{FB01}'), ("fl", '\u{FB02}'), ("dotlessi", '\u{0131}'),
    ("Lslash", '\u{0141}'), ("lslash", '\u{0142}'), ("breve", '\u{02D8}'),
    ("dotaccent", '\u{02D9}'), ("ring", '\u{02DA}'), ("hungarumlaut", '\u{02DD}'),
    ("ogonek", '\u{02DB}'), ("caron", '\u{02C7}'),
];

/// One of the predefined simple-font encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseEncoding {
    Standard,
    WinAnsi,
    MacRoman,
}

impl BaseEncoding {
    /// Parse an encoding name such as `WinAnsiEncoding`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "StandardEncoding" => Some(BaseEncoding::Standard),
            "WinAnsiEncoding" => Some(BaseEncoding::WinAnsi),
            "MacRomanEncoding" => Some(BaseEncoding::MacRoman),
            _ => None,
        }
    }

    /// Glyph name assigned to `code`, if any.
    pub fn glyph_name(self, code: u8) -> Option<&'static str> {
        if (32..=126).contains(&code) {
            if self == BaseEncoding::Standard {
                match code {
                    0x27 => return Some("quoteright"),
                    0x60 => return Some("quoteleft"),
                    _ => {}
                }
            }
            return Some(ASCII_NAMES[(code - 32) as usize]);
        }
        let high = match self {
            BaseEncoding::Standard => STANDARD_HIGH,
            BaseEncoding::WinAnsi => {
                if code >= 0xA1 {
                    return Some(LATIN1_NAMES[(code - 0xA1) as usize]);
                }
                WIN_ANSI_HIGH
            }
            BaseEncoding::MacRoman => MAC_ROMAN_HIGH,
        };
        high.iter().find(|(c, _)| *c == code).map(|(_, n)| *n)
    }
}

/// Encoding of a simple font: an optional base plus `/Differences`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimpleEncoding {
    pub base: Option<BaseEncoding>,
    pub differences: HashMap<u8, String>,
}

impl SimpleEncoding {
    pub fn from_base(base: BaseEncoding) -> Self {
        Self {
            base: Some(base),
            differences: HashMap::new(),
        }
    }

    /// Apply a `/Differences` array given as (starting code, names) runs.
    pub fn apply_differences(&mut self, runs: &[(u32, Vec<String>)]) {
        for (start, names) in runs {
            for (offset, name) in names.iter().enumerate() {
                let code = *start as usize + offset;
                if let Ok(code) = u8::try_from(code) {
                    self.differences.insert(code, name.clone());
                }
            }
        }
    }

    /// Glyph name for `code`: differences first, then the base encoding.
    pub fn glyph_name(&self, code: u8) -> Option<&str> {
        if let Some(name) = self.differences.get(&code) {
            return Some(name);
        }
        self.base.and_then(|b| b.glyph_name(code))
    }
}

fn name_table() -> &'static HashMap<&'static str, char> {
    static TABLE: OnceLock<HashMap<&'static str, char>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut map = HashMap::new();
        for (i, name) in ASCII_NAMES.iter().enumerate() {
            map.insert(*name, char::from(32 + i as u8));
        }
        for (name, ch) in EXTRA_UNICODE {
            map.insert(*name, *ch);
        }
        for (i, name) in LATIN1_NAMES.iter().enumerate() {
            map.entry(*name).or_insert(char::from(0xA1 + i as u8));
        }
        map
    })
}

/// Unicode text for a glyph name.
///
/// Knows the Latin names of the base encodings plus the `uniXXXX` and
/// `uXXXX[XX]` forms. Suffixes after a period (`a.sc`) are ignored.
pub fn glyph_name_to_unicode(name: &str) -> Option<String> {
    let base = name.split('.').next().unwrap_or(name);
    if let Some(ch) = name_table().get(base) {
        return Some(ch.to_string());
    }
    if let Some(hex) = base.strip_prefix("uni") {
        if hex.len() >= 4 && hex.len() % 4 == 0 {
            let mut out = String::new();
            for chunk in hex.as_bytes().chunks(4) {
                let s = std::str::from_utf8(chunk).ok()?;
                out.push(char::from_u32(u32::from_str_radix(s, 16).ok()?)?);
            }
            return Some(out);
        }
    }
    if let Some(hex) = base.strip_prefix('u') {
        if (4..=6).contains(&hex.len()) {
            let v = u32::from_str_radix(hex, 16).ok()?;
            return char::from_u32(v).map(|c| c.to_string());
        }
    }
    None
}
