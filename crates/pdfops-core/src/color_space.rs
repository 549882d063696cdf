//! Resolved PDF color spaces.
//!
//! A [`ColorSpace`] is what a `cs`/`CS` operator (or a device color
//! operator) leaves in the graphics state. Nested spaces are shared
//! through [`Arc`] so a resolved space can be cached and reused across
//! streams.

use std::sync::Arc;

/// Header facts read from an embedded ICC profile.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IccProfile {
    /// Declared profile size in bytes.
    pub size: u32,
    /// Profile version as (major, minor).
    pub version: (u8, u8),
    /// Device class signature (e.g. `mntr`, `prtr`).
    pub device_class: String,
    /// Data color space signature, trimmed (e.g. `RGB`, `CMYK`).
    pub color_space: String,
    /// Number of components implied by the data color space, if known.
    pub num_components: Option<u32>,
}

/// A resolved PDF color space.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ColorSpace {
    /// DeviceGray (1 component).
    #[default]
    DeviceGray,
    /// DeviceRGB (3 components).
    DeviceRGB,
    /// DeviceCMYK (4 components).
    DeviceCMYK,
    /// CIE-based gray.
    CalGray,
    /// CIE-based RGB.
    CalRGB,
    /// CIE L*a*b*.
    Lab,
    /// ICC profile based space.
    ICCBased {
        /// `/N` from the profile stream.
        num_components: u32,
        /// `/Alternate` space, if given.
        alternate: Option<Arc<ColorSpace>>,
        /// Decoded profile header, if the stream could be read.
        profile: Option<IccProfile>,
    },
    /// Palette over a base space.
    Indexed {
        base: Arc<ColorSpace>,
        /// Maximum valid index value.
        hival: u32,
    },
    /// Single-colorant spot space.
    Separation {
        /// Colorant name (e.g. `PANTONE 123`, `All`, `None`).
        colorant: String,
        alternate: Arc<ColorSpace>,
    },
    /// Multi-colorant space.
    DeviceN {
        colorants: Vec<String>,
        alternate: Arc<ColorSpace>,
    },
    /// Pattern space, optionally over an underlying space for uncolored patterns.
    Pattern { underlying: Option<Arc<ColorSpace>> },
}

/// Device color family selected by `g`/`rg`/`k` and friends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceFamily {
    Gray,
    Rgb,
    Cmyk,
}

impl DeviceFamily {
    /// The plain device space of this family.
    pub fn color_space(self) -> ColorSpace {
        match self {
            DeviceFamily::Gray => ColorSpace::DeviceGray,
            DeviceFamily::Rgb => ColorSpace::DeviceRGB,
            DeviceFamily::Cmyk => ColorSpace::DeviceCMYK,
        }
    }

    /// Resource name that overrides this family (`DefaultGray` etc.).
    pub fn default_resource_name(self) -> &'static str {
        match self {
            DeviceFamily::Gray => "DefaultGray",
            DeviceFamily::Rgb => "DefaultRGB",
            DeviceFamily::Cmyk => "DefaultCMYK",
        }
    }
}

impl ColorSpace {
    /// Resolve a name that denotes a color space without a resource lookup.
    ///
    /// Accepts the device names and the inline-image abbreviations.
    pub fn from_family_name(name: &str) -> Option<ColorSpace> {
        match name {
            "DeviceGray" | "G" => Some(ColorSpace::DeviceGray),
            "DeviceRGB" | "RGB" => Some(ColorSpace::DeviceRGB),
            "DeviceCMYK" | "CMYK" => Some(ColorSpace::DeviceCMYK),
            "Pattern" => Some(ColorSpace::Pattern { underlying: None }),
            _ => None,
        }
    }

    /// Device family of a plain device space.
    pub fn device_family(&self) -> Option<DeviceFamily> {
        match self {
            ColorSpace::DeviceGray => Some(DeviceFamily::Gray),
            ColorSpace::DeviceRGB => Some(DeviceFamily::Rgb),
            ColorSpace::DeviceCMYK => Some(DeviceFamily::Cmyk),
            _ => None,
        }
    }

    /// PDF family name, as it appears in a color space array.
    pub fn family(&self) -> &'static str {
        match self {
            ColorSpace::DeviceGray => "DeviceGray",
            ColorSpace::DeviceRGB => "DeviceRGB",
            ColorSpace::DeviceCMYK => "DeviceCMYK",
            ColorSpace::CalGray => "CalGray",
            ColorSpace::CalRGB => "CalRGB",
            ColorSpace::Lab => "Lab",
            ColorSpace::ICCBased { .. } => "ICCBased",
            ColorSpace::Indexed { .. } => "Indexed",
            ColorSpace::Separation { .. } => "Separation",
            ColorSpace::DeviceN { .. } => "DeviceN",
            ColorSpace::Pattern { .. } => "Pattern",
        }
    }

    /// Number of color components an `sc`/`scn` operator supplies.
    pub fn num_components(&self) -> u32 {
        match self {
            ColorSpace::DeviceGray | ColorSpace::CalGray => 1,
            ColorSpace::DeviceRGB | ColorSpace::CalRGB | ColorSpace::Lab => 3,
            ColorSpace::DeviceCMYK => 4,
            ColorSpace::ICCBased { num_components, .. } => *num_components,
            ColorSpace::Indexed { .. } | ColorSpace::Separation { .. } => 1,
            ColorSpace::DeviceN { colorants, .. } => colorants.len() as u32,
            ColorSpace::Pattern { underlying } => {
                underlying.as_ref().map_or(0, |u| u.num_components())
            }
        }
    }

    /// True for the three device spaces and anything built only on them.
    pub fn is_device_dependent(&self) -> bool {
        match self {
            ColorSpace::DeviceGray | ColorSpace::DeviceRGB | ColorSpace::DeviceCMYK => true,
            ColorSpace::Indexed { base, .. } => base.is_device_dependent(),
            ColorSpace::Pattern { underlying } => {
                underlying.as_ref().is_some_and(|u| u.is_device_dependent())
            }
            _ => false,
        }
    }

    pub fn is_pattern(&self) -> bool {
        matches!(self, ColorSpace::Pattern { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_device_gray() {
        assert_eq!(ColorSpace::default(), ColorSpace::DeviceGray);
    }

    #[test]
    fn family_names_resolve() {
        assert_eq!(ColorSpace::from_family_name("RGB"), Some(ColorSpace::DeviceRGB));
        assert_eq!(ColorSpace::from_family_name("DeviceCMYK"), Some(ColorSpace::DeviceCMYK));
        assert!(ColorSpace::from_family_name("Pattern").unwrap().is_pattern());
        assert_eq!(ColorSpace::from_family_name("CS0"), None);
    }

    #[test]
    fn component_counts() {
        let sep = ColorSpace::Separation {
            colorant: "Spot".to_string(),
            alternate: Arc::new(ColorSpace::DeviceCMYK),
        };
        assert_eq!(sep.num_components(), 1);
        let devn = ColorSpace::DeviceN {
            colorants: vec!["Cyan".into(), "Magenta".into()],
            alternate: Arc::new(ColorSpace::DeviceCMYK),
        };
        assert_eq!(devn.num_components(), 2);
        assert_eq!(ColorSpace::Lab.num_components(), 3);
        assert_eq!(ColorSpace::Pattern { underlying: None }.num_components(), 0);
        let uncolored = ColorSpace::Pattern {
            underlying: Some(Arc::new(ColorSpace::DeviceRGB)),
        };
        assert_eq!(uncolored.num_components(), 3);
    }

    #[test]
    fn device_dependence() {
        assert!(ColorSpace::DeviceRGB.is_device_dependent());
        let indexed = ColorSpace::Indexed {
            base: Arc::new(ColorSpace::DeviceRGB),
            hival: 255,
        };
        assert!(indexed.is_device_dependent());
        let icc = ColorSpace::ICCBased {
            num_components: 3,
            alternate: Some(Arc::new(ColorSpace::DeviceRGB)),
            profile: None,
        };
        assert!(!icc.is_device_dependent());
        assert_eq!(icc.family(), "ICCBased");
    }

    #[test]
    fn device_family_round_trip() {
        for family in [DeviceFamily::Gray, DeviceFamily::Rgb, DeviceFamily::Cmyk] {
            assert_eq!(family.color_space().device_family(), Some(family));
        }
        assert_eq!(DeviceFamily::Rgb.default_resource_name(), "DefaultRGB");
        assert_eq!(ColorSpace::CalRGB.device_family(), None);
    }
}
