//! Named resource lookup for a single content stream.
//!
//! Defines the [`ResourceResolver`] trait the operator parser resolves
//! `/Name` operands through. The lopdf-backed implementation lives in
//! [`crate::lopdf_backend`]; [`EmptyResources`] and [`MapResources`] serve
//! streams without a resource dictionary and tests.

use std::collections::HashMap;
use std::sync::Arc;

use pdfops_core::{ColorSpace, DeviceFamily, ExtGState, Pattern, Shading, XObject};

use crate::error::BackendError;
use crate::font::Font;

/// Lookup of named resources, scoped to the stream being interpreted.
///
/// Every method returns `Ok(None)` when the name is not present. An `Err`
/// means the resource exists but could not be resolved; the parser treats
/// both the same way after logging.
pub trait ResourceResolver {
    /// A `/ColorSpace` entry, or a family name such as `DeviceRGB` / `Pattern`.
    fn color_space(&self, name: &str) -> Result<Option<Arc<ColorSpace>>, BackendError>;

    fn font(&self, name: &str) -> Result<Option<Arc<Font>>, BackendError>;

    fn pattern(&self, name: &str) -> Result<Option<Arc<Pattern>>, BackendError>;

    fn shading(&self, name: &str) -> Result<Option<Arc<Shading>>, BackendError>;

    fn xobject(&self, name: &str) -> Result<Option<Arc<XObject>>, BackendError>;

    fn ext_gstate(&self, name: &str) -> Result<Option<Arc<ExtGState>>, BackendError>;

    /// The `/DefaultGray`, `/DefaultRGB` or `/DefaultCMYK` space that
    /// replaces `family`, if one is declared.
    fn default_color_space(
        &self,
        family: DeviceFamily,
    ) -> Result<Option<Arc<ColorSpace>>, BackendError> {
        self.color_space(family.default_resource_name())
    }
}

/// Resources of a stream without a resource dictionary.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyResources;

impl ResourceResolver for EmptyResources {
    fn color_space(&self, _name: &str) -> Result<Option<Arc<ColorSpace>>, BackendError> {
        Ok(None)
    }

    fn font(&self, _name: &str) -> Result<Option<Arc<Font>>, BackendError> {
        Ok(None)
    }

    fn pattern(&self, _name: &str) -> Result<Option<Arc<Pattern>>, BackendError> {
        Ok(None)
    }

    fn shading(&self, _name: &str) -> Result<Option<Arc<Shading>>, BackendError> {
        Ok(None)
    }

    fn xobject(&self, _name: &str) -> Result<Option<Arc<XObject>>, BackendError> {
        Ok(None)
    }

    fn ext_gstate(&self, _name: &str) -> Result<Option<Arc<ExtGState>>, BackendError> {
        Ok(None)
    }
}

/// In-memory resources, built up by name.
///
/// Names listed through [`MapResources::with_broken`] fail to resolve with
/// a [`BackendError::Resource`], for exercising recovery paths.
#[derive(Debug, Clone, Default)]
pub struct MapResources {
    color_spaces: HashMap<String, Arc<ColorSpace>>,
    fonts: HashMap<String, Arc<Font>>,
    patterns: HashMap<String, Arc<Pattern>>,
    shadings: HashMap<String, Arc<Shading>>,
    xobjects: HashMap<String, Arc<XObject>>,
    ext_gstates: HashMap<String, Arc<ExtGState>>,
    broken: Vec<String>,
}

impl MapResources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_color_space(mut self, name: &str, cs: ColorSpace) -> Self {
        self.color_spaces.insert(name.to_string(), Arc::new(cs));
        self
    }

    pub fn with_font(mut self, name: &str, font: Font) -> Self {
        self.fonts.insert(name.to_string(), Arc::new(font));
        self
    }

    pub fn with_pattern(mut self, pattern: Pattern) -> Self {
        self.patterns.insert(pattern.name.clone(), Arc::new(pattern));
        self
    }

    pub fn with_shading(mut self, name: &str, shading: Shading) -> Self {
        self.shadings.insert(name.to_string(), Arc::new(shading));
        self
    }

    pub fn with_xobject(mut self, name: &str, xobject: XObject) -> Self {
        self.xobjects.insert(name.to_string(), Arc::new(xobject));
        self
    }

    pub fn with_ext_gstate(mut self, name: &str, ext: ExtGState) -> Self {
        self.ext_gstates.insert(name.to_string(), Arc::new(ext));
        self
    }

    pub fn with_broken(mut self, name: &str) -> Self {
        self.broken.push(name.to_string());
        self
    }

    fn lookup<T>(
        &self,
        map: &HashMap<String, Arc<T>>,
        name: &str,
    ) -> Result<Option<Arc<T>>, BackendError> {
        if self.broken.iter().any(|b| b == name) {
            return Err(BackendError::Resource(format!("/{name} cannot be resolved")));
        }
        Ok(map.get(name).cloned())
    }
}

impl ResourceResolver for MapResources {
    fn color_space(&self, name: &str) -> Result<Option<Arc<ColorSpace>>, BackendError> {
        self.lookup(&self.color_spaces, name)
    }

    fn font(&self, name: &str) -> Result<Option<Arc<Font>>, BackendError> {
        self.lookup(&self.fonts, name)
    }

    fn pattern(&self, name: &str) -> Result<Option<Arc<Pattern>>, BackendError> {
        self.lookup(&self.patterns, name)
    }

    fn shading(&self, name: &str) -> Result<Option<Arc<Shading>>, BackendError> {
        self.lookup(&self.shadings, name)
    }

    fn xobject(&self, name: &str) -> Result<Option<Arc<XObject>>, BackendError> {
        self.lookup(&self.xobjects, name)
    }

    fn ext_gstate(&self, name: &str) -> Result<Option<Arc<ExtGState>>, BackendError> {
        self.lookup(&self.ext_gstates, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_resources_find_nothing() {
        let res = EmptyResources;
        assert!(res.color_space("CS0").unwrap().is_none());
        assert!(res.font("F1").unwrap().is_none());
        assert!(res.default_color_space(DeviceFamily::Rgb).unwrap().is_none());
    }

    #[test]
    fn map_resources_lookup_and_default_spaces() {
        let res = MapResources::new()
            .with_color_space("DefaultRGB", ColorSpace::CalRGB)
            .with_ext_gstate("GS0", ExtGState::default());
        assert_eq!(
            res.default_color_space(DeviceFamily::Rgb).unwrap().as_deref(),
            Some(&ColorSpace::CalRGB)
        );
        assert!(res.default_color_space(DeviceFamily::Cmyk).unwrap().is_none());
        assert!(res.ext_gstate("GS0").unwrap().is_some());
    }

    #[test]
    fn broken_names_error() {
        let res = MapResources::new().with_broken("X0");
        assert!(matches!(res.xobject("X0"), Err(BackendError::Resource(_))));
    }
}
