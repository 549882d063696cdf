//! pdfops-core: Backend-independent model for PDF content-stream analysis.
//!
//! This crate provides the graphics-state model ([`GraphicState`],
//! [`StateStack`]), resolved resource types (color spaces, patterns,
//! ExtGStates, XObjects), per-glyph facts, and the transparency policy
//! used to decide whether a content stream paints with transparency.
//! It does not read PDF files; `pdfops-parse` does.

pub mod color_space;
pub mod encoding;
pub mod error;
pub mod ext_gstate;
pub mod flavour;
pub mod glyph;
pub mod graphic_state;
pub mod operand;
pub mod options;
pub mod pattern;
pub mod transparency;
pub mod xobject;

pub use color_space::{ColorSpace, DeviceFamily, IccProfile};
pub use encoding::{BaseEncoding, SimpleEncoding, glyph_name_to_unicode};
pub use error::{ContentWarning, ContentWarningCode, PdfError};
pub use ext_gstate::{BlendMode, DashPattern, ExtGState, SoftMask};
pub use flavour::{Conformance, FlavourParseError, PdfFlavour};
pub use glyph::{Glyph, GlyphKind, WIDTH_TOLERANCE, widths_consistent};
pub use graphic_state::{GraphicState, RenderingMode, StateStack};
pub use operand::{Operand, Token};
pub use options::InterpretOptions;
pub use pattern::{Pattern, PatternKind, Shading};
pub use transparency::TransparencyBehaviour;
pub use xobject::{FormXObject, ImageXObject, XObject};
