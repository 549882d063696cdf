//! External objects painted by `Do`.

use std::sync::Arc;

use crate::color_space::ColorSpace;

/// A form XObject, reduced to its transparency facts.
#[derive(Debug, Clone, PartialEq)]
pub struct FormXObject {
    /// `/Group` with `/S /Transparency`.
    pub transparency_group: bool,
    /// The form's own content stream contains transparency.
    pub content_transparency: bool,
}

/// An image XObject.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageXObject {
    pub width: u32,
    pub height: u32,
    pub bits_per_component: Option<u32>,
    /// `/ColorSpace`, absent for image masks and JPX images that carry their own.
    pub color_space: Option<Arc<ColorSpace>>,
    /// An `/SMask` stream is attached.
    pub has_smask: bool,
    /// `/SMaskInData` (JPX only), 0 when absent.
    pub smask_in_data: i64,
    /// `/ImageMask true`.
    pub is_image_mask: bool,
    /// `/Filter` names in order.
    pub filters: Vec<String>,
}

/// A resolved XObject.
#[derive(Debug, Clone, PartialEq)]
pub enum XObject {
    Form(FormXObject),
    Image(ImageXObject),
    /// `/Subtype /PS`. Carries no transparency.
    PostScript,
}

impl XObject {
    /// Whether painting this XObject introduces transparency.
    pub fn is_transparent(&self) -> bool {
        match self {
            XObject::Form(form) => form.transparency_group || form.content_transparency,
            XObject::Image(img) => img.has_smask || img.smask_in_data > 0,
            XObject::PostScript => false,
        }
    }

    pub fn subtype(&self) -> &'static str {
        match self {
            XObject::Form(_) => "Form",
            XObject::Image(_) => "Image",
            XObject::PostScript => "PS",
        }
    }
}
