//! pdfops-parse: Content stream interpretation over lopdf documents.
//!
//! Tokenizes content streams, runs them through an [`OperatorParser`] that
//! tracks the graphics state, and resolves named resources (color spaces,
//! fonts, patterns, XObjects, ExtGStates) through a [`ResourceResolver`].
//! [`OperatorFactory`] turns a whole stream into a [`ContentStreamModel`]
//! with a rolling transparency flag. It depends on pdfops-core for shared
//! data types.

pub mod cid_font;
pub mod cmap;
pub mod error;
pub mod font;
pub mod font_metrics;
pub mod font_program;
mod glyph_resolver;
pub mod icc_profile;
pub mod lopdf_backend;
mod objects;
pub mod operator;
pub mod operator_factory;
pub mod operator_parser;
pub mod resources;
pub mod session;
pub mod tokenizer;

pub use error::BackendError;
pub use font::{Font, FontSubtype};
pub use font_program::{FontProgram, GlyphRef, TrueTypeProgram, Type3Program};
pub use lopdf_backend::{
    LopdfResources, analyze_content, analyze_form, analyze_page, page_resources,
};
pub use operator::{LINK_KEYS, LinkedObject, OperatorKind, OperatorNode};
pub use operator_factory::{ContentStreamModel, OperatorFactory};
pub use operator_parser::OperatorParser;
pub use pdfops_core;
pub use resources::{EmptyResources, MapResources, ResourceResolver};
pub use session::ValidationSession;
pub use tokenizer::tokenize;
