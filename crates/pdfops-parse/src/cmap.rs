//! Embedded CMap parsing.
//!
//! Two flavours of CMap stream appear in fonts: `/ToUnicode` streams map
//! character codes to Unicode text (`bfchar`/`bfrange`), and composite-font
//! `/Encoding` streams map codes to CIDs (`cidchar`/`cidrange`) and declare
//! the codespace ranges that decide how many bytes each code takes.

use std::collections::HashMap;

use tracing::warn;

use crate::error::BackendError;

/// Most codes a single range entry may cover.
pub(crate) const MAX_RANGE_SPAN: u32 = 0xFFFF;

/// `hi - lo` for a range entry, or `None` when the range is inverted or
/// wider than [`MAX_RANGE_SPAN`].
pub(crate) fn range_span(lo: u32, hi: u32) -> Option<u32> {
    let span = hi.checked_sub(lo)?;
    (span <= MAX_RANGE_SPAN).then_some(span)
}

/// Iterate the bodies of every `begin<kw> ... end<kw>` section.
fn sections<'a>(text: &'a str, keyword: &str) -> Vec<&'a str> {
    let begin = format!("begin{keyword}");
    let end = format!("end{keyword}");
    let mut out = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find(&begin) {
        let body = &rest[start + begin.len()..];
        let Some(stop) = body.find(&end) else { break };
        out.push(&body[..stop]);
        rest = &body[stop + end.len()..];
    }
    out
}

/// All `<hex>` tokens on a line, in order.
fn hex_tokens(line: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut rest = line;
    while let Some(open) = rest.find('<') {
        let Some(close) = rest[open + 1..].find('>') else { break };
        tokens.push(rest[open + 1..open + 1 + close].trim());
        rest = &rest[open + 2 + close..];
    }
    tokens
}

/// Text after the last `>` on a line, as a decimal number.
fn trailing_decimal(line: &str) -> Option<u32> {
    line.rfind('>')
        .and_then(|pos| line[pos + 1..].trim().parse().ok())
}

fn hex_code(hex: &str) -> Result<u32, BackendError> {
    u32::from_str_radix(hex, 16)
        .map_err(|e| BackendError::Font(format!("invalid hex code '{hex}': {e}")))
}

fn hex_bytes(hex: &str) -> Result<Vec<u8>, BackendError> {
    if hex.len() % 2 != 0 {
        return Err(BackendError::Font(format!("odd-length hex code '{hex}'")));
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|e| BackendError::Font(format!("invalid hex code '{hex}': {e}")))
        })
        .collect()
}

/// Decode a destination string given as UTF-16BE hex.
fn utf16be_text(hex: &str) -> Result<String, BackendError> {
    let bytes = hex_bytes(hex)?;
    if bytes.len() == 1 {
        return Ok(char::from(bytes[0]).to_string());
    }
    let units: Vec<u16> = bytes
        .chunks(2)
        .map(|c| (u16::from(c[0]) << 8) | u16::from(*c.get(1).unwrap_or(&0)))
        .collect();
    String::from_utf16(&units)
        .map_err(|e| BackendError::Font(format!("invalid UTF-16BE in CMap: {e}")))
}

/// A parsed `/ToUnicode` CMap.
#[derive(Debug, Clone, Default)]
pub struct ToUnicodeCMap {
    mappings: HashMap<u32, String>,
}

impl ToUnicodeCMap {
    /// Parse `bfchar` and `bfrange` sections.
    pub fn parse(data: &[u8]) -> Result<Self, BackendError> {
        let text = String::from_utf8_lossy(data);
        let mut mappings = HashMap::new();

        for section in sections(&text, "bfchar") {
            for line in section.lines() {
                if let [src, dst, ..] = hex_tokens(line)[..] {
                    mappings.insert(hex_code(src)?, utf16be_text(dst)?);
                }
            }
        }

        for section in sections(&text, "bfrange") {
            for line in section.lines() {
                if let Some(bracket) = line.find('[') {
                    // <lo> <hi> [<dst0> <dst1> ...]
                    let Some(close) = line.rfind(']') else { continue };
                    let (lo, hi) = match hex_tokens(&line[..bracket])[..] {
                        [lo, hi, ..] => (hex_code(lo)?, hex_code(hi)?),
                        _ => continue,
                    };
                    for (i, dst) in hex_tokens(&line[bracket + 1..close]).iter().enumerate() {
                        let Some(code) = u32::try_from(i).ok().and_then(|i| lo.checked_add(i))
                        else {
                            break;
                        };
                        if code > hi {
                            break;
                        }
                        mappings.insert(code, utf16be_text(dst)?);
                    }
                } else if let [lo, hi, dst, ..] = hex_tokens(line)[..] {
                    // <lo> <hi> <dst>: the last UTF-16 unit increments.
                    let (lo, hi) = (hex_code(lo)?, hex_code(hi)?);
                    let Some(span) = range_span(lo, hi) else {
                        warn!(lo, hi, "skipping unusable bfrange entry");
                        continue;
                    };
                    let base = utf16be_text(dst)?;
                    let Some(last) = base.chars().last() else { continue };
                    let prefix = &base[..base.len() - last.len_utf8()];
                    for offset in 0..=span {
                        let ch = (last as u32).checked_add(offset).and_then(char::from_u32);
                        if let Some(ch) = ch {
                            mappings.insert(lo + offset, format!("{prefix}{ch}"));
                        }
                    }
                }
            }
        }

        Ok(Self { mappings })
    }

    pub fn lookup(&self, code: u32) -> Option<&str> {
        self.mappings.get(&code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

/// One `begincodespacerange` entry: codes of `low.len()` bytes whose every
/// byte lies between the matching bytes of `low` and `high`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodespaceRange {
    pub low: Vec<u8>,
    pub high: Vec<u8>,
}

impl CodespaceRange {
    pub fn byte_len(&self) -> usize {
        self.low.len()
    }

    /// Whether the first `byte_len()` bytes of `bytes` fall in this range.
    pub fn matches(&self, bytes: &[u8]) -> bool {
        bytes.len() >= self.low.len()
            && self
                .low
                .iter()
                .zip(&self.high)
                .zip(bytes)
                .all(|((lo, hi), b)| (lo..=hi).contains(&b))
    }
}

/// A parsed CID-keyed CMap (an embedded composite-font `/Encoding`).
#[derive(Debug, Clone, Default)]
pub struct CidCMap {
    cid_mappings: HashMap<u32, u32>,
    codespaces: Vec<CodespaceRange>,
    name: Option<String>,
    /// Writing mode: 0 = horizontal, 1 = vertical.
    writing_mode: u8,
    /// `usecmap` parent name, if any.
    parent: Option<String>,
}

impl CidCMap {
    /// Parse codespace, `cidchar`, `cidrange` and `notdefrange` sections.
    pub fn parse(data: &[u8]) -> Result<Self, BackendError> {
        let text = String::from_utf8_lossy(data);
        let mut cmap = CidCMap {
            name: name_after(&text, "/CMapName"),
            writing_mode: if text
                .find("/WMode")
                .is_some_and(|i| text[i + 6..].trim_start().starts_with('1'))
            {
                1
            } else {
                0
            },
            ..CidCMap::default()
        };

        for section in sections(&text, "codespacerange") {
            for line in section.lines() {
                let tokens = hex_tokens(line);
                for pair in tokens.chunks(2) {
                    if let [lo, hi] = pair {
                        let (low, high) = (hex_bytes(lo)?, hex_bytes(hi)?);
                        if low.len() == high.len() && !low.is_empty() {
                            cmap.codespaces.push(CodespaceRange { low, high });
                        }
                    }
                }
            }
        }

        for section in sections(&text, "cidchar") {
            for line in section.lines() {
                if let (Some(src), Some(cid)) = (hex_tokens(line).first(), trailing_decimal(line))
                {
                    cmap.cid_mappings.insert(hex_code(src)?, cid);
                }
            }
        }

        for section in sections(&text, "cidrange") {
            for line in section.lines() {
                if let ([lo, hi, ..], Some(start)) = (&hex_tokens(line)[..], trailing_decimal(line))
                {
                    let (lo, hi) = (hex_code(lo)?, hex_code(hi)?);
                    let Some(span) = range_span(lo, hi) else {
                        warn!(lo, hi, "skipping unusable cidrange entry");
                        continue;
                    };
                    for offset in 0..=span {
                        let Some(cid) = start.checked_add(offset) else { break };
                        cmap.cid_mappings.insert(lo + offset, cid);
                    }
                }
            }
        }

        if let Some(idx) = text.find("usecmap") {
            // "/Parent-Name usecmap": take the name just before the keyword.
            cmap.parent = text[..idx]
                .rsplit('/')
                .next()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty());
        }

        Ok(cmap)
    }

    pub fn lookup(&self, code: u32) -> Option<u32> {
        self.cid_mappings.get(&code).copied()
    }

    pub fn codespaces(&self) -> &[CodespaceRange] {
        &self.codespaces
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn writing_mode(&self) -> u8 {
        self.writing_mode
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn len(&self) -> usize {
        self.cid_mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cid_mappings.is_empty()
    }
}

/// `/Key /Value` lookup in PostScript-ish CMap text.
fn name_after(text: &str, key: &str) -> Option<String> {
    let idx = text.find(key)?;
    let rest = text[idx + key.len()..].trim_start().strip_prefix('/')?;
    let end = rest
        .find(|c: char| c.is_whitespace() || c == '/')
        .unwrap_or(rest.len());
    Some(rest[..end].to_string())
}
