//! lopdf-backed resource resolution and analysis entry points.
//!
//! [`LopdfResources`] resolves the names a content stream refers to against
//! a resource dictionary, caching indirect objects in the
//! [`ValidationSession`]. The `analyze_*` functions are the container
//! boundary: they fail only when the stream itself cannot be reached.

use std::cell::Cell;
use std::collections::HashSet;
use std::sync::Arc;

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use pdfops_core::{
    BlendMode, ColorSpace, DashPattern, ExtGState, FormXObject, ImageXObject, Pattern,
    PatternKind, Shading, SoftMask, XObject,
};
use tracing::{debug, warn};

use crate::error::BackendError;
use crate::font::Font;
use crate::icc_profile::parse_icc_header;
use crate::objects;
use crate::operator_factory::{ContentStreamModel, OperatorFactory};
use crate::resources::ResourceResolver;
use crate::session::{SharedCache, ValidationSession};
use crate::tokenizer::tokenize;

/// Nested color space arrays deeper than this are rejected.
const MAX_COLOR_SPACE_NESTING: usize = 8;

/// A form XObject whose content is being interpreted, linked to the form
/// that painted it.
#[derive(Debug)]
struct FormFrame<'a> {
    id: Option<ObjectId>,
    parent: Option<&'a FormFrame<'a>>,
    /// Set when this form, or one it paints, stopped at the nesting limit.
    truncated: Cell<bool>,
}

impl<'a> FormFrame<'a> {
    fn new(id: Option<ObjectId>, parent: Option<&'a FormFrame<'a>>) -> Self {
        Self {
            id,
            parent,
            truncated: Cell::new(false),
        }
    }

    fn contains(&self, id: ObjectId) -> bool {
        let mut frame = Some(self);
        while let Some(f) = frame {
            if f.id == Some(id) {
                return true;
            }
            frame = f.parent;
        }
        false
    }
}

/// Resources of one stream in a lopdf document.
#[derive(Debug, Clone, Copy)]
pub struct LopdfResources<'a> {
    doc: &'a Document,
    resources: Option<&'a Dictionary>,
    session: &'a ValidationSession,
    /// Form XObject nesting of the stream these resources belong to.
    depth: usize,
    /// The form whose content these resources serve, if any.
    form: Option<&'a FormFrame<'a>>,
}

impl<'a> LopdfResources<'a> {
    pub fn new(
        doc: &'a Document,
        resources: Option<&'a Dictionary>,
        session: &'a ValidationSession,
    ) -> Self {
        Self {
            doc,
            resources,
            session,
            depth: 0,
            form: None,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Resolved entry `name` of resource category `category`, with the
    /// object id when the entry is an indirect reference.
    fn entry(&self, category: &[u8], name: &str) -> Option<(Option<ObjectId>, &'a Object)> {
        let dict = objects::get_dict(self.doc, self.resources?, category)?;
        let raw = dict.get(name.as_bytes()).ok()?;
        Some((raw.as_reference().ok(), objects::resolve(self.doc, raw)))
    }

    fn parse_color_space(&self, obj: &Object, nesting: usize) -> Result<ColorSpace, BackendError> {
        if nesting > MAX_COLOR_SPACE_NESTING {
            return Err(BackendError::Resource(
                "color space nesting too deep".to_string(),
            ));
        }
        let doc = self.doc;
        let obj = objects::resolve(doc, obj);
        let items = match obj {
            Object::Name(_) => {
                let family = objects::name(obj).unwrap_or_default();
                return ColorSpace::from_family_name(&family).ok_or_else(|| {
                    BackendError::Resource(format!("unknown color space family /{family}"))
                });
            }
            Object::Array(items) => items,
            _ => {
                return Err(BackendError::Resource(
                    "color space is neither a name nor an array".to_string(),
                ));
            }
        };

        let family = items
            .first()
            .and_then(|o| objects::name(objects::resolve(doc, o)))
            .ok_or_else(|| BackendError::Resource("color space array without family".to_string()))?;
        let operand = |i: usize| array_item(doc, items, i, &family);

        let cs = match family.as_str() {
            "DeviceGray" | "DeviceRGB" | "DeviceCMYK" => ColorSpace::from_family_name(&family)
                .unwrap_or_default(),
            "CalGray" => ColorSpace::CalGray,
            "CalRGB" => ColorSpace::CalRGB,
            "Lab" => ColorSpace::Lab,
            "ICCBased" => {
                let stream = operand(1)?.as_stream().map_err(|_| {
                    BackendError::Resource("/ICCBased without a profile stream".to_string())
                })?;
                self.icc_based(stream, nesting)?
            }
            "Indexed" | "I" => {
                let base = self.parse_color_space(operand(1)?, nesting + 1)?;
                let hival = objects::number(operand(2)?).unwrap_or(0.0).clamp(0.0, 255.0) as u32;
                ColorSpace::Indexed {
                    base: Arc::new(base),
                    hival,
                }
            }
            "Separation" => {
                let colorant = objects::name(operand(1)?).ok_or_else(|| {
                    BackendError::Resource("/Separation without a colorant name".to_string())
                })?;
                let alternate = self.parse_color_space(operand(2)?, nesting + 1)?;
                let cs = ColorSpace::Separation {
                    colorant: colorant.clone(),
                    alternate: Arc::new(alternate),
                };
                self.session
                    .separations
                    .get_or_insert(colorant, Arc::new(cs.clone()));
                cs
            }
            "DeviceN" => {
                let colorants = operand(1)?
                    .as_array()
                    .map_err(|_| BackendError::Resource("/DeviceN without colorants".to_string()))?
                    .iter()
                    .filter_map(|o| objects::name(objects::resolve(doc, o)))
                    .collect();
                let alternate = self.parse_color_space(operand(2)?, nesting + 1)?;
                ColorSpace::DeviceN {
                    colorants,
                    alternate: Arc::new(alternate),
                }
            }
            "Pattern" => {
                let underlying = match items.get(1) {
                    Some(base) => Some(Arc::new(self.parse_color_space(base, nesting + 1)?)),
                    None => None,
                };
                ColorSpace::Pattern { underlying }
            }
            other => {
                return Err(BackendError::Resource(format!(
                    "unsupported color space family /{other}"
                )));
            }
        };
        Ok(cs)
    }

    fn icc_based(&self, stream: &Stream, nesting: usize) -> Result<ColorSpace, BackendError> {
        let alternate = match objects::get(self.doc, &stream.dict, b"Alternate") {
            Some(alt) => match self.parse_color_space(alt, nesting + 1) {
                Ok(cs) => Some(Arc::new(cs)),
                Err(e) => {
                    warn!("ignoring unusable ICC /Alternate: {e}");
                    None
                }
            },
            None => None,
        };
        let profile = match objects::stream_bytes(stream) {
            Ok(data) => parse_icc_header(&data),
            Err(e) => {
                warn!("ICC profile stream unreadable: {e}");
                None
            }
        };
        let num_components = objects::get_integer(self.doc, &stream.dict, b"N")
            .and_then(|n| u32::try_from(n).ok())
            .or_else(|| profile.as_ref().and_then(|p| p.num_components))
            .or_else(|| alternate.as_ref().map(|a| a.num_components()))
            .ok_or_else(|| BackendError::Resource("/ICCBased without /N".to_string()))?;
        Ok(ColorSpace::ICCBased {
            num_components,
            alternate,
            profile,
        })
    }

    fn load_shading(&self, obj: &Object) -> Result<Shading, BackendError> {
        let dict = as_dict(obj)
            .ok_or_else(|| BackendError::Resource("shading is not a dictionary".to_string()))?;
        let shading_type = objects::get_integer(self.doc, dict, b"ShadingType")
            .ok_or_else(|| BackendError::Resource("shading without /ShadingType".to_string()))?;
        let color_space = objects::get(self.doc, dict, b"ColorSpace")
            .ok_or_else(|| BackendError::Resource("shading without /ColorSpace".to_string()))?;
        Ok(Shading {
            shading_type,
            color_space: Arc::new(self.parse_color_space(color_space, 0)?),
        })
    }

    fn image(&self, dict: &Dictionary) -> ImageXObject {
        let doc = self.doc;
        let dimension = |key: &[u8]| {
            objects::get_integer(doc, dict, key)
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(0)
        };
        let color_space = objects::get(doc, dict, b"ColorSpace").and_then(|cs| {
            self.parse_color_space(cs, 0)
                .map_err(|e| warn!("image color space unusable: {e}"))
                .ok()
                .map(Arc::new)
        });
        ImageXObject {
            width: dimension(b"Width"),
            height: dimension(b"Height"),
            bits_per_component: objects::get_integer(doc, dict, b"BitsPerComponent")
                .and_then(|v| u32::try_from(v).ok()),
            color_space,
            has_smask: dict.has(b"SMask"),
            smask_in_data: objects::get_integer(doc, dict, b"SMaskInData").unwrap_or(0),
            is_image_mask: objects::get_bool(doc, dict, b"ImageMask").unwrap_or(false),
            filters: objects::filter_names(doc, dict),
        }
    }

    /// Form facts, from the session cache when they do not depend on the
    /// caller.
    ///
    /// A result is cached only when the form has its own `/Resources` and
    /// the analysis neither stopped at the nesting limit nor met a form
    /// that was already being analyzed further up.
    fn form(&self, id: Option<ObjectId>, stream: &Stream) -> Result<FormXObject, BackendError> {
        let transparency_group = objects::get_dict(self.doc, &stream.dict, b"Group")
            .and_then(|group| objects::get_name(self.doc, group, b"S"))
            .is_some_and(|s| s == "Transparency");

        if let Some(id) = id {
            if let Some(hit) = self.session.forms.get(&id) {
                return Ok((*hit).clone());
            }
            if self.form.is_some_and(|f| f.contains(id)) {
                // The outer analysis of this form already covers its content.
                debug!(?id, "form paints itself, content not analyzed again");
                return Ok(FormXObject {
                    transparency_group,
                    content_transparency: false,
                });
            }
        }

        let own_resources = objects::get_dict(self.doc, &stream.dict, b"Resources");
        let frame = FormFrame::new(id, self.form);
        let max_depth = self.session.options().max_recursion_depth;
        let content_transparency = if self.depth >= max_depth {
            debug!(max_depth, "form nesting limit reached, content not analyzed");
            frame.truncated.set(true);
            false
        } else {
            let nested = LopdfResources {
                doc: self.doc,
                resources: own_resources.or(self.resources),
                session: self.session,
                depth: self.depth + 1,
                form: Some(&frame),
            };
            interpret(&nested, &objects::stream_bytes(stream)?)?.contains_transparency
        };

        let form = FormXObject {
            transparency_group,
            content_transparency,
        };
        let truncated = frame.truncated.get();
        if let Some(parent) = self.form {
            if truncated {
                parent.truncated.set(true);
            }
        }
        match id {
            Some(id) if own_resources.is_some() && !truncated => {
                Ok((*self.session.forms.get_or_insert(id, Arc::new(form))).clone())
            }
            _ => {
                debug!(?id, truncated, "form result depends on its caller, not cached");
                Ok(form)
            }
        }
    }
}

impl ResourceResolver for LopdfResources<'_> {
    fn color_space(&self, name: &str) -> Result<Option<Arc<ColorSpace>>, BackendError> {
        if let Some((id, obj)) = self.entry(b"ColorSpace", name) {
            return cached(&self.session.color_spaces, id, || {
                self.parse_color_space(obj, 0)
            })
            .map(Some);
        }
        Ok(match name {
            "DeviceGray" | "DeviceRGB" | "DeviceCMYK" | "Pattern" => {
                ColorSpace::from_family_name(name).map(Arc::new)
            }
            _ => None,
        })
    }

    /// Resource names, plus `"<num> <gen> R"` for the indirect font of an
    /// ExtGState `/Font` entry.
    fn font(&self, name: &str) -> Result<Option<Arc<Font>>, BackendError> {
        let (id, obj) = match self.entry(b"Font", name) {
            Some(found) => found,
            None => match parse_reference_name(name) {
                Some(id) => match self.doc.get_object(id) {
                    Ok(obj) => (Some(id), obj),
                    Err(_) => return Ok(None),
                },
                None => return Ok(None),
            },
        };
        let dict = as_dict(obj)
            .ok_or_else(|| BackendError::Resource(format!("/{name} is not a font dictionary")))?;
        cached(&self.session.fonts, id, || Font::load(self.doc, dict)).map(Some)
    }

    fn pattern(&self, name: &str) -> Result<Option<Arc<Pattern>>, BackendError> {
        let Some((_, obj)) = self.entry(b"Pattern", name) else {
            return Ok(None);
        };
        let dict = as_dict(obj)
            .ok_or_else(|| BackendError::Resource(format!("pattern /{name} is not a dictionary")))?;
        let kind = match objects::get_integer(self.doc, dict, b"PatternType") {
            Some(1) => PatternKind::Tiling {
                paint_type: objects::get_integer(self.doc, dict, b"PaintType").unwrap_or(1),
                tiling_type: objects::get_integer(self.doc, dict, b"TilingType").unwrap_or(1),
            },
            Some(2) => {
                let shading = objects::get(self.doc, dict, b"Shading").and_then(|s| {
                    self.load_shading(s)
                        .map_err(|e| warn!(pattern = name, "pattern shading unusable: {e}"))
                        .ok()
                        .map(Arc::new)
                });
                PatternKind::Shading {
                    shading,
                    has_ext_gstate: dict.has(b"ExtGState"),
                }
            }
            other => {
                return Err(BackendError::Resource(format!(
                    "pattern /{name} has unsupported /PatternType {other:?}"
                )));
            }
        };
        Ok(Some(Arc::new(Pattern {
            name: name.to_string(),
            kind,
        })))
    }

    fn shading(&self, name: &str) -> Result<Option<Arc<Shading>>, BackendError> {
        match self.entry(b"Shading", name) {
            Some((_, obj)) => self.load_shading(obj).map(|s| Some(Arc::new(s))),
            None => Ok(None),
        }
    }

    fn xobject(&self, name: &str) -> Result<Option<Arc<XObject>>, BackendError> {
        let Some((id, obj)) = self.entry(b"XObject", name) else {
            return Ok(None);
        };
        let stream = obj
            .as_stream()
            .map_err(|_| BackendError::Resource(format!("XObject /{name} is not a stream")))?;
        let xobject = match objects::get_name(self.doc, &stream.dict, b"Subtype").as_deref() {
            Some("Image") => XObject::Image(self.image(&stream.dict)),
            Some("Form") => XObject::Form(self.form(id, stream)?),
            Some("PS") => XObject::PostScript,
            other => {
                return Err(BackendError::Resource(format!(
                    "XObject /{name} has unsupported /Subtype {other:?}"
                )));
            }
        };
        Ok(Some(Arc::new(xobject)))
    }

    fn ext_gstate(&self, name: &str) -> Result<Option<Arc<ExtGState>>, BackendError> {
        let Some((_, obj)) = self.entry(b"ExtGState", name) else {
            return Ok(None);
        };
        let dict = as_dict(obj)
            .ok_or_else(|| BackendError::Resource(format!("ExtGState /{name} is not a dictionary")))?;
        Ok(Some(Arc::new(read_ext_gstate(self.doc, dict))))
    }
}

fn read_ext_gstate(doc: &Document, dict: &Dictionary) -> ExtGState {
    let font = objects::get_array(doc, dict, b"Font").and_then(|items| {
        let font_name = match items.first()? {
            Object::Reference(id) => reference_name(*id),
            other => objects::name(other)?,
        };
        let size = objects::number(objects::resolve(doc, items.get(1)?))?;
        Some((font_name, size))
    });

    let blend_mode = match objects::get(doc, dict, b"BM") {
        Some(Object::Array(items)) => Some(BlendMode::Array(
            items
                .iter()
                .filter_map(|o| objects::name(objects::resolve(doc, o)))
                .collect(),
        )),
        Some(obj) => objects::name(obj).map(BlendMode::Name),
        None => None,
    };

    let (soft_mask, soft_mask_cleared) = match objects::get(doc, dict, b"SMask") {
        Some(obj @ Object::Name(_)) => (None, objects::name(obj).as_deref() == Some("None")),
        Some(Object::Dictionary(mask)) => (
            Some(SoftMask {
                subtype: objects::get_name(doc, mask, b"S").unwrap_or_default(),
                has_group: mask.has(b"G"),
            }),
            false,
        ),
        _ => (None, false),
    };

    let dash_pattern = objects::get_array(doc, dict, b"D").and_then(|items| {
        let array = objects::resolve(doc, items.first()?)
            .as_array()
            .ok()?
            .iter()
            .map(|o| objects::number(objects::resolve(doc, o)))
            .collect::<Option<Vec<f64>>>()?;
        let phase = objects::number(objects::resolve(doc, items.get(1)?))?;
        Some(DashPattern { array, phase })
    });

    let is_transfer = |key: &[u8]| {
        objects::get(doc, dict, key)
            .is_some_and(|tr| objects::name(tr).as_deref() != Some("Default"))
    };

    ExtGState {
        font,
        blend_mode,
        soft_mask,
        soft_mask_cleared,
        stroke_alpha: objects::get_number(doc, dict, b"CA"),
        fill_alpha: objects::get_number(doc, dict, b"ca"),
        line_width: objects::get_number(doc, dict, b"LW"),
        dash_pattern,
        has_transfer_function: is_transfer(b"TR") || is_transfer(b"TR2"),
        has_halftone: dict.has(b"HT"),
    }
}

/// Look up `id` in `cache`, loading and storing on a miss. Direct objects
/// have no identity and are loaded every time.
fn cached<V>(
    cache: &SharedCache<ObjectId, V>,
    id: Option<ObjectId>,
    load: impl FnOnce() -> Result<V, BackendError>,
) -> Result<Arc<V>, BackendError> {
    let Some(id) = id else {
        return load().map(Arc::new);
    };
    if let Some(hit) = cache.get(&id) {
        return Ok(hit);
    }
    Ok(cache.get_or_insert(id, Arc::new(load()?)))
}

fn array_item<'o>(
    doc: &'o Document,
    items: &'o [Object],
    index: usize,
    family: &str,
) -> Result<&'o Object, BackendError> {
    items
        .get(index)
        .map(|o| objects::resolve(doc, o))
        .ok_or_else(|| BackendError::Resource(format!("/{family} array is too short")))
}

fn as_dict(obj: &Object) -> Option<&Dictionary> {
    match obj {
        Object::Dictionary(d) => Some(d),
        Object::Stream(s) => Some(&s.dict),
        _ => None,
    }
}

fn reference_name(id: ObjectId) -> String {
    format!("{} {} R", id.0, id.1)
}

fn parse_reference_name(name: &str) -> Option<ObjectId> {
    let mut parts = name.split_whitespace();
    let num = parts.next()?.parse().ok()?;
    let generation = parts.next()?.parse().ok()?;
    (parts.next()? == "R" && parts.next().is_none()).then_some((num, generation))
}

fn interpret(
    resources: &LopdfResources<'_>,
    content: &[u8],
) -> Result<ContentStreamModel, BackendError> {
    let tokens = tokenize(content)?;
    Ok(OperatorFactory::new(resources.session.options()).operators_from_tokens(tokens, resources))
}

/// Look up a key in the page dictionary, walking up the page tree
/// (via /Parent) if the key is not found on the page itself.
fn resolve_inherited<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Result<Option<&'a Object>, BackendError> {
    let mut current_id = page_id;
    let mut visited = HashSet::new();
    loop {
        if !visited.insert(current_id) {
            return Err(BackendError::Parse(format!(
                "/Parent cycle in page tree at {} {} R",
                current_id.0, current_id.1
            )));
        }
        let dict = doc
            .get_object(current_id)
            .and_then(|o| o.as_dict())
            .map_err(|e| BackendError::Parse(format!("failed to get page dictionary: {e}")))?;

        if let Ok(value) = dict.get(key) {
            return Ok(Some(value));
        }

        match dict.get(b"Parent") {
            Ok(parent_obj) => {
                current_id = parent_obj
                    .as_reference()
                    .map_err(|e| BackendError::Parse(format!("invalid /Parent reference: {e}")))?;
            }
            Err(_) => return Ok(None),
        }
    }
}

/// The page's `/Resources`, inherited through the page tree.
pub fn page_resources(
    doc: &Document,
    page_id: ObjectId,
) -> Result<Option<&Dictionary>, BackendError> {
    match resolve_inherited(doc, page_id, b"Resources")? {
        Some(obj) => objects::resolve(doc, obj)
            .as_dict()
            .map(Some)
            .map_err(|_| BackendError::Parse("/Resources is not a dictionary".to_string())),
        None => Ok(None),
    }
}

/// Decoded page content. Multiple streams are joined with a space.
fn page_content_bytes(doc: &Document, page: &Dictionary) -> Result<Vec<u8>, BackendError> {
    let contents = match page.get(b"Contents") {
        Ok(obj) => objects::resolve(doc, obj),
        Err(_) => return Ok(Vec::new()),
    };

    match contents {
        Object::Stream(stream) => objects::stream_bytes(stream),
        Object::Array(items) => {
            let mut content = Vec::new();
            for item in items {
                let stream = objects::resolve(doc, item).as_stream().map_err(|e| {
                    BackendError::Parse(format!("/Contents array item is not a stream: {e}"))
                })?;
                let bytes = objects::stream_bytes(stream)?;
                if !content.is_empty() {
                    content.push(b' ');
                }
                content.extend_from_slice(&bytes);
            }
            Ok(content)
        }
        _ => Err(BackendError::Parse(
            "/Contents is not a stream or array".to_string(),
        )),
    }
}

/// Interpret a page's content stream against its resources.
pub fn analyze_page(
    doc: &Document,
    page_id: ObjectId,
    session: &ValidationSession,
) -> Result<ContentStreamModel, BackendError> {
    let page = doc
        .get_object(page_id)
        .and_then(|o| o.as_dict())
        .map_err(|e| BackendError::Parse(format!("failed to get page dictionary: {e}")))?;
    let content = page_content_bytes(doc, page)?;
    analyze_content(doc, &content, page_resources(doc, page_id)?, session)
}

/// Interpret decoded content bytes against a resource dictionary.
pub fn analyze_content(
    doc: &Document,
    content: &[u8],
    resources: Option<&Dictionary>,
    session: &ValidationSession,
) -> Result<ContentStreamModel, BackendError> {
    interpret(&LopdfResources::new(doc, resources, session), content)
}

/// Interpret a form XObject's own content. A form without `/Resources`
/// uses `parent_resources`.
pub fn analyze_form(
    doc: &Document,
    form_id: ObjectId,
    parent_resources: Option<&Dictionary>,
    session: &ValidationSession,
) -> Result<ContentStreamModel, BackendError> {
    let stream = doc
        .get_object(form_id)
        .and_then(|o| o.as_stream())
        .map_err(|e| BackendError::Parse(format!("form XObject {form_id:?}: {e}")))?;
    let resources = objects::get_dict(doc, &stream.dict, b"Resources").or(parent_resources);
    let frame = FormFrame::new(Some(form_id), None);
    let resolver = LopdfResources {
        depth: 1,
        form: Some(&frame),
        ..LopdfResources::new(doc, resources, session)
    };
    interpret(&resolver, &objects::stream_bytes(stream)?)
}
