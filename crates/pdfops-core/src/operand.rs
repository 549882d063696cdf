//! Typed content-stream operands and the token stream they travel in.

/// A PDF content stream operand value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Operand {
    /// Integer number (e.g., `42`, `-7`).
    Integer(i64),
    /// Real (floating-point) number (e.g., `3.14`, `.5`).
    Real(f64),
    /// Name object (e.g., `/F1`, `/DeviceRGB`). Stored without the leading `/`.
    Name(String),
    /// Literal string delimited by parentheses, stored as raw bytes.
    LiteralString(Vec<u8>),
    /// Hexadecimal string delimited by angle brackets, stored as decoded bytes.
    HexString(Vec<u8>),
    /// Array of operands (e.g., `[1 2 3]`).
    Array(Vec<Operand>),
    /// Boolean value (`true` or `false`).
    Boolean(bool),
    /// The null object.
    Null,
    /// Dictionary object (`<< /Key value ... >>`).
    Dictionary(Vec<(String, Operand)>),
}

impl Operand {
    /// Numeric value of an integer or real operand.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Operand::Integer(i) => Some(*i as f64),
            Operand::Real(f) => Some(*f),
            _ => None,
        }
    }

    /// Integer value. Reals with no fractional part are accepted.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Operand::Integer(i) => Some(*i),
            Operand::Real(f) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Operand::Name(n) => Some(n),
            _ => None,
        }
    }

    /// Raw bytes of a literal or hex string.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Operand::LiteralString(b) | Operand::HexString(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Operand]> {
        match self {
            Operand::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Look up a key in a dictionary operand.
    pub fn dict_get(&self, key: &str) -> Option<&Operand> {
        match self {
            Operand::Dictionary(entries) => {
                entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
            }
            _ => None,
        }
    }
}

/// One element of a tokenized content stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// An operand waiting for its operator.
    Operand(Operand),
    /// An operator keyword, consuming the operands before it.
    Operator(String),
    /// Bytes that are neither an operand nor an operator (e.g. a stray `]`).
    Unknown(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_accessors() {
        assert_eq!(Operand::Integer(3).as_f64(), Some(3.0));
        assert_eq!(Operand::Real(2.5).as_f64(), Some(2.5));
        assert_eq!(Operand::Real(2.0).as_i64(), Some(2));
        assert_eq!(Operand::Real(2.5).as_i64(), None);
        assert_eq!(Operand::Name("F1".into()).as_f64(), None);
    }

    #[test]
    fn string_accessors() {
        assert_eq!(Operand::LiteralString(b"Hi".to_vec()).as_bytes(), Some(&b"Hi"[..]));
        assert_eq!(Operand::HexString(vec![0, 1]).as_bytes(), Some(&[0u8, 1][..]));
        assert_eq!(Operand::Integer(1).as_bytes(), None);
        assert_eq!(Operand::Name("P1".into()).as_name(), Some("P1"));
    }

    #[test]
    fn dictionary_lookup() {
        let dict = Operand::Dictionary(vec![
            ("W".to_string(), Operand::Integer(4)),
            ("CS".to_string(), Operand::Name("RGB".to_string())),
        ]);
        assert_eq!(dict.dict_get("W"), Some(&Operand::Integer(4)));
        assert_eq!(dict.dict_get("H"), None);
        assert_eq!(Operand::Null.dict_get("W"), None);
    }
}
