use crate::flavour::PdfFlavour;

/// Options controlling content-stream interpretation.
#[derive(Debug, Clone)]
pub struct InterpretOptions {
    /// Maximum nesting of Form XObjects followed when deciding whether a
    /// form's content contains transparency (default: 10).
    pub max_recursion_depth: usize,
    /// Whether to collect warnings into the stream model (default: true).
    /// Warnings are logged either way.
    pub collect_warnings: bool,
    /// Target PDF/A flavour, passed through to consumers (default: None).
    pub flavour: Option<PdfFlavour>,
}

impl Default for InterpretOptions {
    fn default() -> Self {
        Self {
            max_recursion_depth: 10,
            collect_warnings: true,
            flavour: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = InterpretOptions::default();
        assert_eq!(opts.max_recursion_depth, 10);
        assert!(opts.collect_warnings);
        assert!(opts.flavour.is_none());
    }
}
