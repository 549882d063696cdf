//! Transparency detection policy.
//!
//! Each painting operator category has a [`TransparencyBehaviour`] that
//! decides, from the graphics state at the time of painting, whether the
//! operation produces transparency. [`TransparencyBehaviour::for_operator`]
//! is the operator-to-strategy table.

use crate::graphic_state::{GraphicState, RenderingMode};

/// Strategy deciding whether a paint operation is transparent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransparencyBehaviour {
    /// Soft mask or non-Normal blend mode only.
    Neither,
    /// Neither, or non-stroking alpha below 1.
    Fill,
    /// Neither, or stroking alpha below 1.
    Stroke,
    /// Fill or Stroke.
    FillStroke,
    /// Fill, or the painted XObject is itself transparent.
    FillXObject,
    /// Text shown in a fill rendering mode.
    FillFont,
    /// Text shown in a stroke rendering mode.
    StrokeFont,
    /// Text shown in a fill-and-stroke rendering mode.
    FillStrokeFont,
}

impl TransparencyBehaviour {
    /// Whether painting under `gs` with this strategy produces transparency.
    pub fn contains_transparency(self, gs: &GraphicState) -> bool {
        match self {
            TransparencyBehaviour::Neither => neither(gs),
            TransparencyBehaviour::Fill | TransparencyBehaviour::FillFont => fill(gs),
            TransparencyBehaviour::Stroke | TransparencyBehaviour::StrokeFont => stroke(gs),
            TransparencyBehaviour::FillStroke | TransparencyBehaviour::FillStrokeFont => {
                fill(gs) || stroke(gs)
            }
            TransparencyBehaviour::FillXObject => {
                fill(gs) || gs.current_xobject().is_some_and(|x| x.is_transparent())
            }
        }
    }

    /// Strategy for an operator, or `None` when the operator never paints.
    ///
    /// Text-show operators are keyed by the rendering mode in effect;
    /// `Invisible` and `Clip` paint nothing.
    pub fn for_operator(name: &str, rendering_mode: RenderingMode) -> Option<Self> {
        match name {
            "S" | "s" => Some(TransparencyBehaviour::Stroke),
            "f" | "F" | "f*" => Some(TransparencyBehaviour::Fill),
            "B" | "B*" | "b" | "b*" => Some(TransparencyBehaviour::FillStroke),
            "sh" | "EI" => Some(TransparencyBehaviour::Fill),
            "Do" => Some(TransparencyBehaviour::FillXObject),
            "Tj" | "TJ" | "'" | "\"" => Self::for_rendering_mode(rendering_mode),
            _ => None,
        }
    }

    /// Text strategy for a rendering mode. Clip variants reuse the plain ones.
    pub fn for_rendering_mode(mode: RenderingMode) -> Option<Self> {
        match mode {
            RenderingMode::Fill | RenderingMode::FillClip => Some(TransparencyBehaviour::FillFont),
            RenderingMode::Stroke | RenderingMode::StrokeClip => {
                Some(TransparencyBehaviour::StrokeFont)
            }
            RenderingMode::FillStroke | RenderingMode::FillStrokeClip => {
                Some(TransparencyBehaviour::FillStrokeFont)
            }
            RenderingMode::Invisible | RenderingMode::Clip => None,
        }
    }
}

fn neither(gs: &GraphicState) -> bool {
    gs.soft_mask().is_some() || gs.blend_mode().is_some_and(|bm| !bm.is_normal())
}

fn fill(gs: &GraphicState) -> bool {
    neither(gs) || gs.fill_alpha() < 1.0
}

fn stroke(gs: &GraphicState) -> bool {
    neither(gs) || gs.stroke_alpha() < 1.0
}
