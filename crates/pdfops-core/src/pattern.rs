//! Pattern and shading resources.

use std::sync::Arc;

use crate::color_space::ColorSpace;

/// A shading dictionary, as used by `sh` and by shading patterns.
#[derive(Debug, Clone, PartialEq)]
pub struct Shading {
    /// `/ShadingType` (1 = function, 2 = axial, 3 = radial, 4-7 = meshes).
    pub shading_type: i64,
    /// `/ColorSpace` of the shading.
    pub color_space: Arc<ColorSpace>,
}

/// What kind of pattern a resource is.
#[derive(Debug, Clone, PartialEq)]
pub enum PatternKind {
    /// PatternType 1: a cell of content that is repeated.
    Tiling {
        /// 1 = colored, 2 = uncolored.
        paint_type: i64,
        tiling_type: i64,
    },
    /// PatternType 2: a shading painted through the pattern.
    Shading {
        shading: Option<Arc<Shading>>,
        /// Whether the pattern carries its own `/ExtGState`.
        has_ext_gstate: bool,
    },
}

/// A pattern resource, resolved by name.
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    /// Resource name the pattern was looked up under (e.g. `P1`).
    pub name: String,
    pub kind: PatternKind,
}

impl Pattern {
    pub fn is_tiling(&self) -> bool {
        matches!(self.kind, PatternKind::Tiling { .. })
    }

    /// True for uncolored tiling patterns, whose color comes from the
    /// underlying space of the Pattern color space.
    pub fn is_uncolored(&self) -> bool {
        matches!(self.kind, PatternKind::Tiling { paint_type: 2, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiling_paint_types() {
        let colored = Pattern {
            name: "P1".to_string(),
            kind: PatternKind::Tiling {
                paint_type: 1,
                tiling_type: 1,
            },
        };
        assert!(colored.is_tiling());
        assert!(!colored.is_uncolored());

        let uncolored = Pattern {
            name: "P2".to_string(),
            kind: PatternKind::Tiling {
                paint_type: 2,
                tiling_type: 3,
            },
        };
        assert!(uncolored.is_uncolored());
    }

    #[test]
    fn shading_pattern_is_not_tiling() {
        let p = Pattern {
            name: "Sh".to_string(),
            kind: PatternKind::Shading {
                shading: Some(Arc::new(Shading {
                    shading_type: 2,
                    color_space: Arc::new(ColorSpace::DeviceRGB),
                })),
                has_ext_gstate: false,
            },
        };
        assert!(!p.is_tiling());
        assert!(!p.is_uncolored());
    }
}
