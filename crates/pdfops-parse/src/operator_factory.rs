//! Drives a whole token stream through an [`OperatorParser`].

use pdfops_core::{ContentWarning, InterpretOptions, Token, TransparencyBehaviour};
use tracing::debug;

use crate::operator::OperatorNode;
use crate::operator_parser::OperatorParser;
use crate::resources::ResourceResolver;

/// The interpreted form of one content stream.
#[derive(Debug)]
pub struct ContentStreamModel {
    /// Operators in stream order.
    pub operators: Vec<OperatorNode>,
    /// Some painting operator ran with transparency in effect.
    pub contains_transparency: bool,
    /// Recovered failures, when collection is enabled.
    pub warnings: Vec<ContentWarning>,
    /// `q` saves left open at the end of the stream.
    pub stack_depth: usize,
}

impl ContentStreamModel {
    /// Stream warnings followed by glyph decode warnings of text-show
    /// operators. Resolves any glyphs not yet resolved.
    pub fn all_warnings(&self) -> Vec<ContentWarning> {
        let mut all = self.warnings.clone();
        for op in &self.operators {
            all.extend_from_slice(op.glyph_warnings());
        }
        all
    }

    pub fn text_operators(&self) -> impl Iterator<Item = &OperatorNode> {
        self.operators.iter().filter(|op| op.is_text_show())
    }
}

/// Builds [`ContentStreamModel`]s.
#[derive(Debug, Clone)]
pub struct OperatorFactory {
    collect_warnings: bool,
}

impl Default for OperatorFactory {
    fn default() -> Self {
        Self::new(&InterpretOptions::default())
    }
}

impl OperatorFactory {
    pub fn new(options: &InterpretOptions) -> Self {
        Self {
            collect_warnings: options.collect_warnings,
        }
    }

    /// Group operands up to each operator and interpret them in order.
    ///
    /// Never fails: stray tokens are skipped and operator-level problems
    /// end up in [`ContentStreamModel::warnings`].
    pub fn operators_from_tokens(
        &self,
        tokens: Vec<Token>,
        resources: &dyn ResourceResolver,
    ) -> ContentStreamModel {
        let mut parser = OperatorParser::new(self.collect_warnings);
        let mut operators = Vec::new();
        let mut operands = Vec::new();
        let mut contains_transparency = false;

        for token in tokens {
            match token {
                Token::Operand(operand) => operands.push(operand),
                Token::Operator(name) => {
                    let node =
                        parser.parse_operator(&name, resources, std::mem::take(&mut operands));
                    let behaviour =
                        TransparencyBehaviour::for_operator(&name, parser.state().rendering_mode());
                    if let Some(behaviour) = behaviour {
                        let state = node.state.as_deref().unwrap_or(parser.state());
                        if behaviour.contains_transparency(state) {
                            if !contains_transparency {
                                debug!(operator = %name, ?behaviour, "stream contains transparency");
                            }
                            contains_transparency = true;
                        }
                    }
                    operators.push(node);
                }
                Token::Unknown(text) => parser.skip_stray_token(&text),
            }
        }
        if !operands.is_empty() {
            debug!(count = operands.len(), "dropping operands after the last operator");
        }

        ContentStreamModel {
            operators,
            contains_transparency,
            stack_depth: parser.depth(),
            warnings: parser.take_warnings(),
        }
    }
}
