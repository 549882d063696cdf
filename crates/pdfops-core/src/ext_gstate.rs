//! Extended graphics state (`/ExtGState`) resources.

/// Blend mode from `/BM`: a single name or an array of fallbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlendMode {
    Name(String),
    Array(Vec<String>),
}

impl BlendMode {
    /// True only for `/Normal` and `[/Normal]`.
    pub fn is_normal(&self) -> bool {
        match self {
            BlendMode::Name(n) => n == "Normal",
            BlendMode::Array(names) => names.len() == 1 && names[0] == "Normal",
        }
    }
}

/// A soft mask dictionary from `/SMask`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftMask {
    /// `/S` subtype: `Alpha` or `Luminosity`.
    pub subtype: String,
    /// Whether a `/G` transparency group is attached.
    pub has_group: bool,
}

/// Dash pattern as set by `d` or `/D`.
#[derive(Debug, Clone, PartialEq)]
pub struct DashPattern {
    pub array: Vec<f64>,
    pub phase: f64,
}

impl DashPattern {
    /// Solid line: empty array, zero phase.
    pub fn solid() -> Self {
        Self {
            array: Vec::new(),
            phase: 0.0,
        }
    }
}

/// A resolved ExtGState dictionary.
///
/// Only the entries that affect the content model are kept.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExtGState {
    /// `/Font [font size]`: font resource name and size.
    pub font: Option<(String, f64)>,
    /// `/BM`.
    pub blend_mode: Option<BlendMode>,
    /// `/SMask` dictionary. `None` when absent or `/None`.
    pub soft_mask: Option<SoftMask>,
    /// `/SMask /None`: clears any soft mask in effect.
    pub soft_mask_cleared: bool,
    /// `/CA`.
    pub stroke_alpha: Option<f64>,
    /// `/ca`.
    pub fill_alpha: Option<f64>,
    /// `/LW`.
    pub line_width: Option<f64>,
    /// `/D`.
    pub dash_pattern: Option<DashPattern>,
    /// `/TR` or `/TR2` present with a value other than `/Default`.
    pub has_transfer_function: bool,
    /// `/HT` present.
    pub has_halftone: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_blend_modes() {
        assert!(BlendMode::Name("Normal".into()).is_normal());
        assert!(BlendMode::Array(vec!["Normal".into()]).is_normal());
    }

    #[test]
    fn non_normal_blend_modes() {
        assert!(!BlendMode::Name("Multiply".into()).is_normal());
        assert!(!BlendMode::Name("Compatible".into()).is_normal());
        assert!(!BlendMode::Array(vec![]).is_normal());
        assert!(!BlendMode::Array(vec!["Screen".into(), "Normal".into()]).is_normal());
    }

    #[test]
    fn solid_dash() {
        let d = DashPattern::solid();
        assert!(d.array.is_empty());
        assert_eq!(d.phase, 0.0);
    }

    #[test]
    fn default_ext_gstate_is_empty() {
        let gs = ExtGState::default();
        assert!(gs.font.is_none());
        assert!(gs.blend_mode.is_none());
        assert!(gs.soft_mask.is_none());
        assert!(!gs.has_transfer_function);
    }
}
