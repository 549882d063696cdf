//! Graphics state tracked while walking a content stream.
//!
//! [`GraphicState`] holds the parameters the content model reports on each
//! operator: color spaces, patterns, text rendering mode, font, and the
//! transparency parameters. [`StateStack`] implements `q`/`Q` over it.
//!
//! The live state is kept behind an [`Arc`]. Snapshots handed to operator
//! nodes are reference-count increments, and a setter call after a snapshot
//! copies the state first (`Arc::make_mut`), so emitted snapshots never change.

use std::sync::Arc;

use crate::color_space::ColorSpace;
use crate::ext_gstate::{BlendMode, ExtGState, SoftMask};
use crate::pattern::Pattern;
use crate::xobject::XObject;

/// Text rendering mode as set by `Tr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RenderingMode {
    /// Fill character glyphs (default).
    #[default]
    Fill = 0,
    /// Stroke (outline) character glyphs.
    Stroke = 1,
    /// Fill and stroke character glyphs.
    FillStroke = 2,
    /// Neither fill nor stroke (invisible text).
    Invisible = 3,
    /// Fill and add to clipping path.
    FillClip = 4,
    /// Stroke and add to clipping path.
    StrokeClip = 5,
    /// Fill, stroke, and add to clipping path.
    FillStrokeClip = 6,
    /// Add to clipping path only.
    Clip = 7,
}

impl RenderingMode {
    /// Create a RenderingMode from an integer value (0-7).
    /// Returns None for invalid values.
    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Fill),
            1 => Some(Self::Stroke),
            2 => Some(Self::FillStroke),
            3 => Some(Self::Invisible),
            4 => Some(Self::FillClip),
            5 => Some(Self::StrokeClip),
            6 => Some(Self::FillStrokeClip),
            7 => Some(Self::Clip),
            _ => None,
        }
    }
}

/// Drawing context in effect at one point of a content stream.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphicState {
    fill_color_space: Arc<ColorSpace>,
    stroke_color_space: Arc<ColorSpace>,
    fill_pattern: Option<Arc<Pattern>>,
    stroke_pattern: Option<Arc<Pattern>>,
    rendering_mode: RenderingMode,
    font_name: Option<String>,
    font_size: f64,
    blend_mode: Option<BlendMode>,
    /// Non-stroking alpha (`ca`).
    fill_alpha: f64,
    /// Stroking alpha (`CA`).
    stroke_alpha: f64,
    soft_mask: Option<SoftMask>,
    current_xobject: Option<Arc<XObject>>,
}

impl Default for GraphicState {
    fn default() -> Self {
        Self {
            fill_color_space: Arc::new(ColorSpace::DeviceGray),
            stroke_color_space: Arc::new(ColorSpace::DeviceGray),
            fill_pattern: None,
            stroke_pattern: None,
            rendering_mode: RenderingMode::Fill,
            font_name: None,
            font_size: 0.0,
            blend_mode: None,
            fill_alpha: 1.0,
            stroke_alpha: 1.0,
            soft_mask: None,
            current_xobject: None,
        }
    }
}

impl GraphicState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fill_color_space(&self) -> &Arc<ColorSpace> {
        &self.fill_color_space
    }

    pub fn set_fill_color_space(&mut self, cs: Arc<ColorSpace>) {
        self.fill_color_space = cs;
    }

    pub fn stroke_color_space(&self) -> &Arc<ColorSpace> {
        &self.stroke_color_space
    }

    pub fn set_stroke_color_space(&mut self, cs: Arc<ColorSpace>) {
        self.stroke_color_space = cs;
    }

    pub fn fill_pattern(&self) -> Option<&Arc<Pattern>> {
        self.fill_pattern.as_ref()
    }

    pub fn set_fill_pattern(&mut self, pattern: Option<Arc<Pattern>>) {
        self.fill_pattern = pattern;
    }

    pub fn stroke_pattern(&self) -> Option<&Arc<Pattern>> {
        self.stroke_pattern.as_ref()
    }

    pub fn set_stroke_pattern(&mut self, pattern: Option<Arc<Pattern>>) {
        self.stroke_pattern = pattern;
    }

    pub fn rendering_mode(&self) -> RenderingMode {
        self.rendering_mode
    }

    pub fn set_rendering_mode(&mut self, mode: RenderingMode) {
        self.rendering_mode = mode;
    }

    /// Font resource name selected by `Tf` or `/Font` in an ExtGState.
    pub fn font_name(&self) -> Option<&str> {
        self.font_name.as_deref()
    }

    pub fn set_font_name(&mut self, name: Option<String>) {
        self.font_name = name;
    }

    pub fn font_size(&self) -> f64 {
        self.font_size
    }

    pub fn set_font_size(&mut self, size: f64) {
        self.font_size = size;
    }

    pub fn blend_mode(&self) -> Option<&BlendMode> {
        self.blend_mode.as_ref()
    }

    pub fn set_blend_mode(&mut self, mode: Option<BlendMode>) {
        self.blend_mode = mode;
    }

    /// Non-stroking alpha, `ca`.
    pub fn fill_alpha(&self) -> f64 {
        self.fill_alpha
    }

    pub fn set_fill_alpha(&mut self, alpha: f64) {
        self.fill_alpha = alpha;
    }

    /// Stroking alpha, `CA`.
    pub fn stroke_alpha(&self) -> f64 {
        self.stroke_alpha
    }

    pub fn set_stroke_alpha(&mut self, alpha: f64) {
        self.stroke_alpha = alpha;
    }

    pub fn soft_mask(&self) -> Option<&SoftMask> {
        self.soft_mask.as_ref()
    }

    pub fn set_soft_mask(&mut self, mask: Option<SoftMask>) {
        self.soft_mask = mask;
    }

    /// XObject painted by the most recent `Do`.
    pub fn current_xobject(&self) -> Option<&Arc<XObject>> {
        self.current_xobject.as_ref()
    }

    pub fn set_current_xobject(&mut self, xobject: Option<Arc<XObject>>) {
        self.current_xobject = xobject;
    }

    /// Overwrite every field with `other`'s. Referenced objects are shared.
    pub fn copy_properties(&mut self, other: &GraphicState) {
        self.clone_from(other);
    }

    /// Overlay the font setting of an ExtGState. Other entries are ignored.
    pub fn copy_properties_from_ext_gstate(&mut self, ext: &ExtGState) {
        if let Some((ref name, size)) = ext.font {
            self.font_name = Some(name.clone());
            self.font_size = size;
        }
    }

    /// Apply the transparency entries of an ExtGState (`/SMask`, `/BM`, `/CA`, `/ca`).
    pub fn apply_ext_gstate_transparency(&mut self, ext: &ExtGState) {
        if let Some(ref bm) = ext.blend_mode {
            self.blend_mode = Some(bm.clone());
        }
        if let Some(ref mask) = ext.soft_mask {
            self.soft_mask = Some(mask.clone());
        } else if ext.soft_mask_cleared {
            self.soft_mask = None;
        }
        if let Some(ca) = ext.stroke_alpha {
            self.stroke_alpha = ca;
        }
        if let Some(ca) = ext.fill_alpha {
            self.fill_alpha = ca;
        }
    }
}

/// Live graphics state plus the `q`/`Q` save stack.
#[derive(Debug, Clone, Default)]
pub struct StateStack {
    current: Arc<GraphicState>,
    saved: Vec<Arc<GraphicState>>,
}

impl StateStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only view of the live state.
    pub fn current(&self) -> &GraphicState {
        &self.current
    }

    /// Mutable access to the live state; copies it first if a snapshot shares it.
    pub fn current_mut(&mut self) -> &mut GraphicState {
        Arc::make_mut(&mut self.current)
    }

    /// Immutable snapshot of the live state.
    pub fn snapshot(&self) -> Arc<GraphicState> {
        Arc::clone(&self.current)
    }

    /// Returns the current stack depth.
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    /// `q` operator: save the live state. Returns the new depth.
    pub fn save(&mut self) -> usize {
        self.saved.push(Arc::clone(&self.current));
        self.saved.len()
    }

    /// `Q` operator: restore the most recently saved state.
    ///
    /// Returns `false` if the stack was empty; the live state is unchanged.
    pub fn restore(&mut self) -> bool {
        match self.saved.pop() {
            Some(saved) => {
                self.current = saved;
                true
            }
            None => false,
        }
    }
}
