//! Content stream tokenizer.
//!
//! Turns decoded content stream bytes into a flat [`Token`] sequence of
//! operands and operator keywords, the input the operator factory groups.
//! Comments are stripped. An inline image becomes `BI`, its parameter
//! dictionary, `ID`, its raw data as a string operand, and `EI`.
//! Stray closing delimiters are reported as [`Token::Unknown`] rather than
//! failing the stream.

use pdfops_core::{Operand, Token};

use crate::error::BackendError;

/// Tokenize content stream bytes.
///
/// # Errors
///
/// Returns [`BackendError::Interpreter`] for unterminated strings, arrays,
/// dictionaries and inline images.
pub fn tokenize(input: &[u8]) -> Result<Vec<Token>, BackendError> {
    let mut lexer = Lexer { input, pos: 0 };
    let mut tokens = Vec::new();

    loop {
        lexer.skip_whitespace_and_comments();
        let Some(b) = lexer.peek() else { break };

        match b {
            b']' | b'}' | b'{' | b')' => {
                lexer.pos += 1;
                tokens.push(Token::Unknown((b as char).to_string()));
            }
            b'>' => {
                let start = lexer.pos;
                lexer.pos += if lexer.peek_at(1) == Some(b'>') { 2 } else { 1 };
                tokens.push(Token::Unknown(lexer.text(start)));
            }
            b'a'..=b'z' | b'A'..=b'Z' | b'*' | b'\'' | b'"' => {
                let keyword = lexer.keyword();
                match keyword.as_str() {
                    "true" => tokens.push(Token::Operand(Operand::Boolean(true))),
                    "false" => tokens.push(Token::Operand(Operand::Boolean(false))),
                    "null" => tokens.push(Token::Operand(Operand::Null)),
                    "BI" => {
                        let (dict, data) = lexer.inline_image()?;
                        tokens.push(Token::Operator("BI".to_string()));
                        tokens.push(Token::Operand(Operand::Dictionary(dict)));
                        tokens.push(Token::Operator("ID".to_string()));
                        tokens.push(Token::Operand(Operand::LiteralString(data)));
                        tokens.push(Token::Operator("EI".to_string()));
                    }
                    _ => tokens.push(Token::Operator(keyword)),
                }
            }
            _ if is_value_start(b) => tokens.push(Token::Operand(lexer.value()?)),
            _ => {
                let start = lexer.pos;
                while lexer
                    .peek()
                    .is_some_and(|c| !is_whitespace(c) && !is_delimiter(c) && !is_keyword_start(c))
                {
                    lexer.pos += 1;
                }
                if lexer.pos == start {
                    lexer.pos += 1;
                }
                tokens.push(Token::Unknown(lexer.text(start)));
            }
        }
    }

    Ok(tokens)
}

/// Returns `true` if `b` is a PDF whitespace character.
fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n' | 0x0C | 0x00)
}

/// Returns `true` if `b` is a PDF delimiter character.
fn is_delimiter(b: u8) -> bool {
    matches!(
        b,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

fn is_keyword_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || matches!(b, b'*' | b'\'' | b'"')
}

fn is_value_start(b: u8) -> bool {
    matches!(b, b'(' | b'<' | b'[' | b'/' | b'0'..=b'9' | b'+' | b'-' | b'.')
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

fn syntax(msg: impl Into<String>) -> BackendError {
    BackendError::Interpreter(msg.into())
}

struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
}

impl Lexer<'_> {
    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    fn text(&self, start: usize) -> String {
        String::from_utf8_lossy(&self.input[start..self.pos]).into_owned()
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(b) = self.peek() {
            if is_whitespace(b) {
                self.pos += 1;
            } else if b == b'%' {
                while self.peek().is_some_and(|c| c != b'\n' && c != b'\r') {
                    self.pos += 1;
                }
            } else {
                break;
            }
        }
    }

    /// Operator or bare keyword. Runs over regular characters so `d0` and
    /// `T*` stay whole.
    fn keyword(&mut self) -> String {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|b| !is_whitespace(b) && !is_delimiter(b))
        {
            self.pos += 1;
        }
        self.text(start)
    }

    /// Any operand value: number, name, string, array or dictionary.
    fn value(&mut self) -> Result<Operand, BackendError> {
        match self.peek() {
            Some(b'(') => Ok(Operand::LiteralString(self.literal_string()?)),
            Some(b'<') if self.peek_at(1) == Some(b'<') => {
                Ok(Operand::Dictionary(self.dictionary()?))
            }
            Some(b'<') => Ok(Operand::HexString(self.hex_string()?)),
            Some(b'[') => Ok(Operand::Array(self.array()?)),
            Some(b'/') => Ok(Operand::Name(self.name())),
            Some(b'0'..=b'9' | b'+' | b'-' | b'.') => self.number(),
            Some(b) if is_keyword_start(b) => Ok(match self.keyword().as_str() {
                "true" => Operand::Boolean(true),
                "false" => Operand::Boolean(false),
                "null" => Operand::Null,
                // Bare words inside arrays and dictionaries are kept as names.
                other => Operand::Name(other.to_string()),
            }),
            Some(b) => Err(syntax(format!("unexpected byte 0x{b:02X} in operand"))),
            None => Err(syntax("unexpected end of content stream")),
        }
    }

    /// `(...)` with balanced parentheses and escapes.
    fn literal_string(&mut self) -> Result<Vec<u8>, BackendError> {
        self.pos += 1;
        let mut out = Vec::new();
        let mut depth = 1u32;

        while let Some(b) = self.peek() {
            self.pos += 1;
            match b {
                b'(' => {
                    depth += 1;
                    out.push(b);
                }
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(out);
                    }
                    out.push(b);
                }
                b'\\' => {
                    let Some(esc) = self.peek() else { break };
                    self.pos += 1;
                    match esc {
                        b'n' => out.push(b'\n'),
                        b'r' => out.push(b'\r'),
                        b't' => out.push(b'\t'),
                        b'b' => out.push(0x08),
                        b'f' => out.push(0x0C),
                        b'\r' => {
                            if self.peek() == Some(b'\n') {
                                self.pos += 1;
                            }
                        }
                        b'\n' => {}
                        b'0'..=b'7' => {
                            let mut val = u32::from(esc - b'0');
                            for _ in 0..2 {
                                match self.peek() {
                                    Some(d @ b'0'..=b'7') => {
                                        val = val * 8 + u32::from(d - b'0');
                                        self.pos += 1;
                                    }
                                    _ => break,
                                }
                            }
                            out.push((val & 0xFF) as u8);
                        }
                        other => out.push(other),
                    }
                }
                _ => out.push(b),
            }
        }

        Err(syntax("unterminated literal string"))
    }

    /// `<...>`; whitespace ignored, an odd final digit is padded with 0.
    fn hex_string(&mut self) -> Result<Vec<u8>, BackendError> {
        self.pos += 1;
        let mut out = Vec::new();
        let mut high: Option<u8> = None;

        while let Some(b) = self.peek() {
            self.pos += 1;
            if b == b'>' {
                if let Some(h) = high {
                    out.push(h << 4);
                }
                return Ok(out);
            }
            if is_whitespace(b) {
                continue;
            }
            let v = hex_value(b)
                .ok_or_else(|| syntax(format!("invalid hex digit: {:?}", b as char)))?;
            match high.take() {
                Some(h) => out.push((h << 4) | v),
                None => high = Some(v),
            }
        }

        Err(syntax("unterminated hex string"))
    }

    fn array(&mut self) -> Result<Vec<Operand>, BackendError> {
        self.pos += 1;
        let mut items = Vec::new();
        loop {
            self.skip_whitespace_and_comments();
            match self.peek() {
                None => return Err(syntax("unterminated array")),
                Some(b']') => {
                    self.pos += 1;
                    return Ok(items);
                }
                Some(_) => items.push(self.value()?),
            }
        }
    }

    /// `<< /Key value ... >>`.
    fn dictionary(&mut self) -> Result<Vec<(String, Operand)>, BackendError> {
        self.pos += 2;
        let mut entries = Vec::new();
        loop {
            self.skip_whitespace_and_comments();
            match (self.peek(), self.peek_at(1)) {
                (None, _) => return Err(syntax("unterminated dictionary")),
                (Some(b'>'), Some(b'>')) => {
                    self.pos += 2;
                    return Ok(entries);
                }
                (Some(b'/'), _) => {
                    let key = self.name();
                    self.skip_whitespace_and_comments();
                    entries.push((key, self.value()?));
                }
                _ => return Err(syntax("expected name key in dictionary")),
            }
        }
    }

    /// `/Name` with `#XX` escapes decoded. Stored without the slash.
    fn name(&mut self) -> String {
        self.pos += 1;
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|b| !is_whitespace(b) && !is_delimiter(b))
        {
            self.pos += 1;
        }
        let raw = &self.input[start..self.pos];
        let mut name = Vec::with_capacity(raw.len());
        let mut i = 0;
        while i < raw.len() {
            if raw[i] == b'#' && i + 2 < raw.len() {
                if let (Some(hi), Some(lo)) = (hex_value(raw[i + 1]), hex_value(raw[i + 2])) {
                    name.push((hi << 4) | lo);
                    i += 3;
                    continue;
                }
            }
            name.push(raw[i]);
            i += 1;
        }
        String::from_utf8_lossy(&name).into_owned()
    }

    fn number(&mut self) -> Result<Operand, BackendError> {
        let start = self.pos;
        if matches!(self.peek(), Some(b'+' | b'-')) {
            self.pos += 1;
        }
        let mut has_dot = false;
        while let Some(b) = self.peek() {
            if b == b'.' && !has_dot {
                has_dot = true;
            } else if !b.is_ascii_digit() {
                break;
            }
            self.pos += 1;
        }
        let text = self.text(start);
        let digits = text.trim_start_matches(['+', '-']).replace('.', "");
        if digits.is_empty() {
            // A lone sign or dot reads as zero.
            return Ok(Operand::Integer(0));
        }
        if has_dot {
            text.parse::<f64>()
                .map(Operand::Real)
                .map_err(|_| syntax(format!("invalid real number: {text}")))
        } else {
            match text.parse::<i64>() {
                Ok(v) => Ok(Operand::Integer(v)),
                // Out-of-range integers degrade to reals.
                Err(_) => text
                    .parse::<f64>()
                    .map(Operand::Real)
                    .map_err(|_| syntax(format!("invalid integer: {text}"))),
            }
        }
    }

    /// Parameters and data of an inline image. `BI` has been consumed.
    fn inline_image(&mut self) -> Result<(Vec<(String, Operand)>, Vec<u8>), BackendError> {
        let mut dict = Vec::new();
        loop {
            self.skip_whitespace_and_comments();
            match self.peek() {
                None => return Err(syntax("unterminated inline image (missing ID)")),
                Some(b'I')
                    if self.peek_at(1) == Some(b'D')
                        && self.peek_at(2).is_none_or(is_whitespace) =>
                {
                    self.pos += 2;
                    // Exactly one whitespace byte separates ID from the data.
                    if self.peek().is_some_and(is_whitespace) {
                        self.pos += 1;
                    }
                    break;
                }
                Some(b'/') => {
                    let key = self.name();
                    self.skip_whitespace_and_comments();
                    dict.push((key, self.value()?));
                }
                Some(_) => {
                    return Err(syntax("expected name key in inline image dictionary"));
                }
            }
        }

        let data_start = self.pos;
        while self.pos + 1 < self.input.len() {
            let at_ei = self.input[self.pos] == b'E' && self.input[self.pos + 1] == b'I';
            let preceded = self.pos == data_start || is_whitespace(self.input[self.pos - 1]);
            let followed = self
                .input
                .get(self.pos + 2)
                .is_none_or(|&b| is_whitespace(b) || is_delimiter(b));
            if at_ei && preceded && followed {
                let mut end = self.pos;
                if end > data_start && is_whitespace(self.input[end - 1]) {
                    end -= 1;
                }
                let data = self.input[data_start..end].to_vec();
                self.pos += 2;
                return Ok((dict, data));
            }
            self.pos += 1;
        }

        Err(syntax("unterminated inline image (missing EI)"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(name: &str) -> Token {
        Token::Operator(name.to_string())
    }

    fn num(v: i64) -> Token {
        Token::Operand(Operand::Integer(v))
    }

    // --- operands ---

    #[test]
    fn integers_and_reals() {
        let tokens = tokenize(b"42 -7 3.14 .5 -.002 w").unwrap();
        assert_eq!(
            tokens,
            vec![
                num(42),
                num(-7),
                Token::Operand(Operand::Real(3.14)),
                Token::Operand(Operand::Real(0.5)),
                Token::Operand(Operand::Real(-0.002)),
                op("w"),
            ]
        );
    }

    #[test]
    fn names_with_hex_escapes() {
        let tokens = tokenize(b"/F1 /A#20B /Pattern cs").unwrap();
        assert_eq!(tokens[0], Token::Operand(Operand::Name("F1".into())));
        assert_eq!(tokens[1], Token::Operand(Operand::Name("A B".into())));
        assert_eq!(tokens[3], op("cs"));
    }

    #[test]
    fn literal_string_escapes() {
        let tokens = tokenize(b"(a\\(b\\)c\\n\\101) Tj").unwrap();
        assert_eq!(
            tokens[0],
            Token::Operand(Operand::LiteralString(b"a(b)c\nA".to_vec()))
        );
    }

    #[test]
    fn nested_parentheses() {
        let tokens = tokenize(b"(x(y)z) Tj").unwrap();
        assert_eq!(
            tokens[0],
            Token::Operand(Operand::LiteralString(b"x(y)z".to_vec()))
        );
    }

    #[test]
    fn hex_strings_pad_odd_digits() {
        let tokens = tokenize(b"<48 69> <4> Tj").unwrap();
        assert_eq!(tokens[0], Token::Operand(Operand::HexString(b"Hi".to_vec())));
        assert_eq!(tokens[1], Token::Operand(Operand::HexString(vec![0x40])));
    }

    #[test]
    fn tj_array() {
        let tokens = tokenize(b"[(A) -120 (B)] TJ").unwrap();
        assert_eq!(
            tokens[0],
            Token::Operand(Operand::Array(vec![
                Operand::LiteralString(b"A".to_vec()),
                Operand::Integer(-120),
                Operand::LiteralString(b"B".to_vec()),
            ]))
        );
        assert_eq!(tokens[1], op("TJ"));
    }

    #[test]
    fn dictionary_operand() {
        let tokens = tokenize(b"/Span <</MCID 3 /Alt (x)>> BDC").unwrap();
        assert_eq!(
            tokens[1],
            Token::Operand(Operand::Dictionary(vec![
                ("MCID".to_string(), Operand::Integer(3)),
                ("Alt".to_string(), Operand::LiteralString(b"x".to_vec())),
            ]))
        );
        assert_eq!(tokens[2], op("BDC"));
    }

    #[test]
    fn booleans_and_null() {
        let tokens = tokenize(b"true false null").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Operand(Operand::Boolean(true)),
                Token::Operand(Operand::Boolean(false)),
                Token::Operand(Operand::Null),
            ]
        );
    }

    // --- operators ---

    #[test]
    fn operators_with_digits_and_quotes() {
        let tokens = tokenize(b"0 0 d0 T* (x) ' 1 2 (y) \" f*").unwrap();
        let ops: Vec<_> = tokens
            .iter()
            .filter_map(|t| match t {
                Token::Operator(n) => Some(n.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(ops, vec!["d0", "T*", "'", "\"", "f*"]);
    }

    #[test]
    fn comments_are_stripped() {
        let tokens = tokenize(b"% header\nq % save\nQ").unwrap();
        assert_eq!(tokens, vec![op("q"), op("Q")]);
    }

    #[test]
    fn example_stream() {
        let tokens = tokenize(b"100 0 0 100 0 0 cm /F1 12 Tf 1 0 0 RG (Hi) Tj").unwrap();
        assert_eq!(tokens.len(), 16);
        assert_eq!(tokens[6], op("cm"));
        assert_eq!(tokens[9], op("Tf"));
        assert_eq!(tokens[13], op("RG"));
        assert_eq!(tokens[15], op("Tj"));
    }

    // --- inline images ---

    #[test]
    fn inline_image_tokens() {
        let tokens = tokenize(b"BI /W 2 /H 1 /CS /G /BPC 8 ID \x00\xFF EI Q").unwrap();
        assert_eq!(tokens[0], op("BI"));
        match &tokens[1] {
            Token::Operand(Operand::Dictionary(d)) => {
                assert_eq!(d.len(), 4);
                assert_eq!(d[2], ("CS".to_string(), Operand::Name("G".to_string())));
            }
            other => panic!("expected dictionary, got {other:?}"),
        }
        assert_eq!(tokens[2], op("ID"));
        assert_eq!(
            tokens[3],
            Token::Operand(Operand::LiteralString(vec![0x00, 0xFF]))
        );
        assert_eq!(tokens[4], op("EI"));
        assert_eq!(tokens[5], op("Q"));
    }

    #[test]
    fn inline_image_missing_ei_is_error() {
        assert!(tokenize(b"BI /W 1 ID abc").is_err());
    }

    // --- leniency and errors ---

    #[test]
    fn stray_delimiters_become_unknown_tokens() {
        let tokens = tokenize(b"q ] >> Q").unwrap();
        assert_eq!(
            tokens,
            vec![
                op("q"),
                Token::Unknown("]".into()),
                Token::Unknown(">>".into()),
                op("Q")
            ]
        );
    }

    #[test]
    fn non_ascii_garbage_becomes_unknown() {
        let tokens = tokenize(b"q \xC3\xA9 Q").unwrap();
        assert_eq!(tokens.len(), 3);
        assert!(matches!(tokens[1], Token::Unknown(_)));
    }

    #[test]
    fn unterminated_constructs_are_errors() {
        assert!(tokenize(b"(abc Tj").is_err());
        assert!(tokenize(b"[1 2").is_err());
        assert!(tokenize(b"<</A 1").is_err());
        assert!(tokenize(b"<4G>").is_err());
    }

    #[test]
    fn empty_input() {
        assert!(tokenize(b"").unwrap().is_empty());
        assert!(tokenize(b"   % only a comment").unwrap().is_empty());
    }
}
