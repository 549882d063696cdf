//! Operator nodes: one per operator occurrence in a content stream.
//!
//! Each [`OperatorNode`] carries its mnemonic, raw operands, a category
//! ([`OperatorKind`]) holding whatever was resolved for it, and, for color,
//! text-show, paint, shading, XObject and inline-image operators, a shared
//! snapshot of the graphics state it ran under.

use std::sync::{Arc, OnceLock};

use pdfops_core::{
    ColorSpace, ContentWarning, DashPattern, ExtGState, Glyph, GraphicState, Operand, Pattern,
    Shading, XObject,
};

use crate::font::Font;
use crate::glyph_resolver;

/// An inline image (`BI ... ID ... EI`).
#[derive(Debug, Clone, PartialEq)]
pub struct InlineImage {
    /// Image dictionary entries with abbreviations expanded (`W` → `Width`).
    pub parameters: Vec<(String, Operand)>,
    pub color_space: Option<Arc<ColorSpace>>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub bits_per_component: Option<i64>,
    pub image_mask: bool,
    /// Filter names with abbreviations expanded (`Fl` → `FlateDecode`).
    pub filters: Vec<String>,
    /// Length of the image data between `ID` and `EI`.
    pub data_len: usize,
}

impl InlineImage {
    pub fn parameter(&self, key: &str) -> Option<&Operand> {
        self.parameters.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

/// Glyphs of one text-show operator, resolved on first request.
#[derive(Debug, Default)]
pub struct ResolvedGlyphs {
    pub glyphs: Vec<Glyph>,
    /// Strings that could not be decoded.
    pub warnings: Vec<ContentWarning>,
}

/// Text-show payload.
#[derive(Debug)]
pub struct TextShow {
    pub font: Option<Arc<Font>>,
    /// Shown strings in order; spacing numbers of `TJ` are dropped.
    pub strings: Vec<Vec<u8>>,
    index: usize,
    mnemonic: String,
    resolved: OnceLock<ResolvedGlyphs>,
}

impl TextShow {
    pub(crate) fn new(
        font: Option<Arc<Font>>,
        strings: Vec<Vec<u8>>,
        index: usize,
        mnemonic: &str,
    ) -> Self {
        Self {
            font,
            strings,
            index,
            mnemonic: mnemonic.to_string(),
            resolved: OnceLock::new(),
        }
    }

    /// Decode the strings against the font. Runs once.
    pub fn resolved(&self) -> &ResolvedGlyphs {
        self.resolved.get_or_init(|| {
            glyph_resolver::resolve(self.font.as_deref(), &self.strings, self.index, &self.mnemonic)
        })
    }
}

/// Category of an operator plus what was resolved for it.
#[derive(Debug)]
pub enum OperatorKind {
    /// `w J j M ri i`.
    GeneralState,
    /// `d`; `None` when the operands were malformed.
    DashPattern(Option<DashPattern>),
    /// `gs`.
    ExtGState {
        name: Option<String>,
        ext_gstate: Option<Arc<ExtGState>>,
    },
    /// `q`, with the stack depth after the push.
    SaveState { depth: usize },
    /// `Q`, with the stack depth after the pop.
    RestoreState { depth: usize },
    /// `cm`.
    Transform([f64; 6]),
    /// `BMC BDC EMC MP DP`; `tag` is `None` for `EMC`.
    MarkedContent { tag: Option<String> },
    /// `W W*`.
    Clip,
    /// `G g RG rg K k CS cs SC SCN sc scn`.
    Color { stroke: bool },
    /// `BT ET`.
    TextObject,
    /// `Td TD Tm T*`.
    TextPosition,
    /// `Tc Tw Tz TL Tr Ts`.
    TextState,
    /// `Tf`.
    TextFont {
        font_name: Option<String>,
        size: f64,
        font: Option<Arc<Font>>,
    },
    /// `Tj TJ ' "`.
    TextShow(TextShow),
    /// `d0 d1`.
    Type3Glyph,
    /// `BI ID EI`; the image is attached to `EI`.
    InlineImage(Option<Arc<InlineImage>>),
    /// `BX EX`.
    Compatibility,
    /// `m l c v y h re`.
    PathConstruction,
    /// `S s f F f* B B* b b* n`.
    PathPaint,
    /// `sh`.
    Shading(Option<Arc<Shading>>),
    /// `Do`.
    XObject {
        name: Option<String>,
        xobject: Option<Arc<XObject>>,
    },
    /// Anything else, passed through.
    Generic,
}

/// Result of a string-keyed link lookup.
#[derive(Debug, Clone, Copy)]
pub enum LinkedObject<'a> {
    ColorSpace(&'a Arc<ColorSpace>),
    Pattern(&'a Arc<Pattern>),
    Font(&'a Arc<Font>),
    Glyph(&'a Glyph),
    DashPattern(&'a DashPattern),
    ExtGState(&'a Arc<ExtGState>),
    Shading(&'a Arc<Shading>),
    XObject(&'a Arc<XObject>),
    InlineImage(&'a Arc<InlineImage>),
}

/// Link keys understood by [`OperatorNode::linked`].
pub const LINK_KEYS: [&str; 10] = [
    "fillCS",
    "strokeCS",
    "font",
    "usedGlyphs",
    "dashArray",
    "extGState",
    "shading",
    "xobject",
    "pattern",
    "inlineImage",
];

/// One operator occurrence.
#[derive(Debug)]
pub struct OperatorNode {
    pub name: String,
    pub operands: Vec<Operand>,
    pub kind: OperatorKind,
    /// Graphics state in effect, for painting and color operators.
    pub state: Option<Arc<GraphicState>>,
}

impl OperatorNode {
    pub fn new(name: &str, operands: Vec<Operand>, kind: OperatorKind) -> Self {
        Self {
            name: name.to_string(),
            operands,
            kind,
            state: None,
        }
    }

    pub fn with_state(mut self, state: Arc<GraphicState>) -> Self {
        self.state = Some(state);
        self
    }

    /// The fill color space in effect, as a resource link.
    pub fn fill_color_space(&self) -> Option<&Arc<ColorSpace>> {
        self.state.as_ref().map(|s| s.fill_color_space())
    }

    pub fn stroke_color_space(&self) -> Option<&Arc<ColorSpace>> {
        self.state.as_ref().map(|s| s.stroke_color_space())
    }

    /// The font a `Tf` or text-show operator resolved.
    pub fn font(&self) -> Option<&Arc<Font>> {
        match &self.kind {
            OperatorKind::TextFont { font, .. } => font.as_ref(),
            OperatorKind::TextShow(show) => show.font.as_ref(),
            _ => None,
        }
    }

    /// Glyphs shown by a text-show operator, resolving them on first call.
    pub fn glyphs(&self) -> &[Glyph] {
        match &self.kind {
            OperatorKind::TextShow(show) => &show.resolved().glyphs,
            _ => &[],
        }
    }

    /// Decode warnings of a text-show operator (forces glyph resolution).
    pub fn glyph_warnings(&self) -> &[ContentWarning] {
        match &self.kind {
            OperatorKind::TextShow(show) => &show.resolved().warnings,
            _ => &[],
        }
    }

    pub fn is_text_show(&self) -> bool {
        matches!(self.kind, OperatorKind::TextShow(_))
    }

    /// Linked objects for a key from [`LINK_KEYS`]. Unknown keys and
    /// unresolved links give an empty list.
    pub fn linked(&self, key: &str) -> Vec<LinkedObject<'_>> {
        match key {
            "fillCS" => self
                .state
                .as_deref()
                .map(|s| color_link(s.fill_color_space(), s.fill_pattern()))
                .into_iter()
                .collect(),
            "strokeCS" => self
                .state
                .as_deref()
                .map(|s| color_link(s.stroke_color_space(), s.stroke_pattern()))
                .into_iter()
                .collect(),
            "font" => self.font().map(LinkedObject::Font).into_iter().collect(),
            "usedGlyphs" => self.glyphs().iter().map(LinkedObject::Glyph).collect(),
            "dashArray" => match &self.kind {
                OperatorKind::DashPattern(Some(dash)) => vec![LinkedObject::DashPattern(dash)],
                OperatorKind::ExtGState {
                    ext_gstate: Some(ext),
                    ..
                } => ext
                    .dash_pattern
                    .as_ref()
                    .map(LinkedObject::DashPattern)
                    .into_iter()
                    .collect(),
                _ => Vec::new(),
            },
            "extGState" => match &self.kind {
                OperatorKind::ExtGState {
                    ext_gstate: Some(ext),
                    ..
                } => vec![LinkedObject::ExtGState(ext)],
                _ => Vec::new(),
            },
            "shading" => match &self.kind {
                OperatorKind::Shading(Some(shading)) => vec![LinkedObject::Shading(shading)],
                _ => Vec::new(),
            },
            "xobject" => match &self.kind {
                OperatorKind::XObject {
                    xobject: Some(xobject),
                    ..
                } => vec![LinkedObject::XObject(xobject)],
                _ => Vec::new(),
            },
            "pattern" => self.patterns(),
            "inlineImage" => match &self.kind {
                OperatorKind::InlineImage(Some(image)) => vec![LinkedObject::InlineImage(image)],
                _ => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    /// Patterns in effect: the operator's own side for color operators,
    /// both sides otherwise.
    fn patterns(&self) -> Vec<LinkedObject<'_>> {
        let Some(state) = self.state.as_deref() else {
            return Vec::new();
        };
        match self.kind {
            OperatorKind::Color { stroke: true } => {
                state.stroke_pattern().map(LinkedObject::Pattern).into_iter().collect()
            }
            OperatorKind::Color { stroke: false } => {
                state.fill_pattern().map(LinkedObject::Pattern).into_iter().collect()
            }
            _ => state
                .fill_pattern()
                .into_iter()
                .chain(state.stroke_pattern())
                .map(LinkedObject::Pattern)
                .collect(),
        }
    }
}

/// A Pattern space with a resolved pattern links to the pattern itself.
fn color_link<'a>(cs: &'a Arc<ColorSpace>, pattern: Option<&'a Arc<Pattern>>) -> LinkedObject<'a> {
    match pattern {
        Some(p) if cs.is_pattern() => LinkedObject::Pattern(p),
        _ => LinkedObject::ColorSpace(cs),
    }
}
