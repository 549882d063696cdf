//! Stateful operator dispatch for one content stream.
//!
//! [`OperatorParser`] owns the live graphics state and its `q`/`Q` stack.
//! Each call to [`OperatorParser::parse_operator`] applies the operator's
//! effect on the state, resolves the resources it names, and returns an
//! immutable [`OperatorNode`]. Failures never abort the stream: they are
//! logged, recorded as [`ContentWarning`]s, and the node is emitted with
//! empty links.

use std::sync::Arc;

use pdfops_core::{
    ColorSpace, ContentWarning, ContentWarningCode, DashPattern, DeviceFamily, GraphicState,
    Operand, RenderingMode,
};
use tracing::{debug, trace, warn};

use crate::error::BackendError;
use crate::operator::{InlineImage, OperatorKind, OperatorNode, TextShow};
use crate::resources::ResourceResolver;

/// Interprets operators one at a time against a live graphics state.
#[derive(Debug)]
pub struct OperatorParser {
    stack: pdfops_core::StateStack,
    warnings: Vec<ContentWarning>,
    collect_warnings: bool,
    /// Index of the next operator.
    index: usize,
    /// Nesting of `BX`/`EX` sections, where unknown operators are expected.
    compat_depth: usize,
    /// Inline image parameters seen at `ID`, consumed by `EI`.
    pending_image: Option<Vec<(String, Operand)>>,
}

impl Default for OperatorParser {
    fn default() -> Self {
        Self::new(true)
    }
}

impl OperatorParser {
    pub fn new(collect_warnings: bool) -> Self {
        Self {
            stack: pdfops_core::StateStack::new(),
            warnings: Vec::new(),
            collect_warnings,
            index: 0,
            compat_depth: 0,
            pending_image: None,
        }
    }

    /// The live graphics state.
    pub fn state(&self) -> &GraphicState {
        self.stack.current()
    }

    /// Number of states saved by `q` and not yet restored.
    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    pub fn warnings(&self) -> &[ContentWarning] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<ContentWarning> {
        std::mem::take(&mut self.warnings)
    }

    /// Record a token that is neither an operand nor an operator.
    pub fn skip_stray_token(&mut self, text: &str) {
        warn!(token = text, index = self.index, "skipping stray token");
        if self.collect_warnings {
            self.warnings.push(ContentWarning::new(
                ContentWarningCode::StrayToken,
                format!("stray token '{text}' skipped"),
            ));
        }
    }

    fn warn(&mut self, code: ContentWarningCode, op: &str, message: String) {
        warn!(operator = op, index = self.index, code = %code, "{message}");
        if self.collect_warnings {
            self.warnings
                .push(ContentWarning::new(code, message).at_operator(self.index, op));
        }
    }

    /// Turn a lookup result into an optional resource, warning when absent.
    fn found<T>(
        &mut self,
        op: &str,
        what: &str,
        name: &str,
        result: Result<Option<Arc<T>>, BackendError>,
    ) -> Option<Arc<T>> {
        match result {
            Ok(Some(value)) => Some(value),
            Ok(None) => {
                self.warn(
                    ContentWarningCode::ResourceNotFound,
                    op,
                    format!("{what} /{name} not found"),
                );
                None
            }
            Err(e) => {
                self.warn(
                    ContentWarningCode::ResourceNotFound,
                    op,
                    format!("{what} /{name} could not be resolved: {e}"),
                );
                None
            }
        }
    }

    fn name_operand<'a>(&mut self, op: &str, operands: &'a [Operand]) -> Option<&'a str> {
        let name = operands.first().and_then(Operand::as_name);
        if name.is_none() {
            self.warn(
                ContentWarningCode::MalformedOperand,
                op,
                "expected a name operand".to_string(),
            );
        }
        name
    }

    /// Dispatch one operator.
    pub fn parse_operator(
        &mut self,
        name: &str,
        resources: &dyn ResourceResolver,
        operands: Vec<Operand>,
    ) -> OperatorNode {
        trace!(operator = name, index = self.index, operands = operands.len(), "dispatch");
        let node = self.dispatch(name, resources, operands);
        self.index += 1;
        node
    }

    fn dispatch(
        &mut self,
        name: &str,
        resources: &dyn ResourceResolver,
        operands: Vec<Operand>,
    ) -> OperatorNode {
        let kind = match name {
            // General graphics state
            "w" | "J" | "j" | "M" | "ri" | "i" => OperatorKind::GeneralState,
            "d" => OperatorKind::DashPattern(self.dash_pattern(name, &operands)),
            "gs" => self.ext_gstate(name, resources, &operands),

            // Special graphics state
            "q" => OperatorKind::SaveState {
                depth: self.stack.save(),
            },
            "Q" => {
                if !self.stack.restore() {
                    debug!(index = self.index, "Q with empty state stack ignored");
                }
                OperatorKind::RestoreState {
                    depth: self.stack.depth(),
                }
            }
            "cm" => OperatorKind::Transform(self.matrix(name, &operands)),

            // Marked content
            "BMC" | "BDC" | "MP" | "DP" => OperatorKind::MarkedContent {
                tag: operands.first().and_then(Operand::as_name).map(str::to_string),
            },
            "EMC" => OperatorKind::MarkedContent { tag: None },

            "W" | "W*" => OperatorKind::Clip,

            // Color
            "G" | "g" | "RG" | "rg" | "K" | "k" => {
                let family = match name {
                    "G" | "g" => DeviceFamily::Gray,
                    "RG" | "rg" => DeviceFamily::Rgb,
                    _ => DeviceFamily::Cmyk,
                };
                let stroke = name.chars().all(|c| c.is_ascii_uppercase());
                let cs = self.device_space(name, resources, family);
                self.set_color_space(stroke, cs);
                return self.with_snapshot(name, operands, OperatorKind::Color { stroke });
            }
            "CS" | "cs" => {
                let stroke = name == "CS";
                let cs = self.named_color_space(name, resources, &operands);
                self.set_color_space(stroke, cs);
                return self.with_snapshot(name, operands, OperatorKind::Color { stroke });
            }
            "SC" | "sc" => {
                let stroke = name == "SC";
                return self.with_snapshot(name, operands, OperatorKind::Color { stroke });
            }
            "SCN" | "scn" => {
                let stroke = name == "SCN";
                self.select_pattern(name, resources, &operands, stroke);
                return self.with_snapshot(name, operands, OperatorKind::Color { stroke });
            }

            // Text
            "BT" | "ET" => OperatorKind::TextObject,
            "Td" | "TD" | "Tm" | "T*" => OperatorKind::TextPosition,
            "Tc" | "Tw" | "Tz" | "TL" | "Ts" => OperatorKind::TextState,
            "Tr" => {
                let mode = operands
                    .first()
                    .and_then(Operand::as_i64)
                    .and_then(RenderingMode::from_i64);
                let mode = match mode {
                    Some(mode) => mode,
                    None => {
                        self.warn(
                            ContentWarningCode::MalformedOperand,
                            name,
                            "invalid rendering mode, using Fill".to_string(),
                        );
                        RenderingMode::Fill
                    }
                };
                self.stack.current_mut().set_rendering_mode(mode);
                OperatorKind::TextState
            }
            "Tf" => self.text_font(name, resources, &operands),
            "Tj" | "TJ" | "'" | "\"" => {
                let kind = self.text_show(name, resources, &operands);
                return self.with_snapshot(name, operands, kind);
            }
            "d0" | "d1" => OperatorKind::Type3Glyph,

            // Inline images
            "BI" => {
                self.pending_image = None;
                OperatorKind::InlineImage(None)
            }
            "ID" => {
                self.pending_image = match operands.first() {
                    Some(Operand::Dictionary(entries)) => Some(entries.clone()),
                    _ => Some(Vec::new()),
                };
                OperatorKind::InlineImage(None)
            }
            "EI" => {
                let image = self.inline_image(name, resources, &operands);
                return self.with_snapshot(
                    name,
                    operands,
                    OperatorKind::InlineImage(Some(Arc::new(image))),
                );
            }

            "BX" => {
                self.compat_depth += 1;
                OperatorKind::Compatibility
            }
            "EX" => {
                self.compat_depth = self.compat_depth.saturating_sub(1);
                OperatorKind::Compatibility
            }

            // Paths
            "m" | "l" | "c" | "v" | "y" | "h" | "re" => OperatorKind::PathConstruction,
            "S" | "s" | "f" | "F" | "f*" | "B" | "B*" | "b" | "b*" | "n" => {
                return self.with_snapshot(name, operands, OperatorKind::PathPaint);
            }

            "sh" => {
                let shading = self
                    .name_operand(name, &operands)
                    .map(str::to_string)
                    .and_then(|res| {
                        let result = resources.shading(&res);
                        self.found(name, "shading", &res, result)
                    });
                return self.with_snapshot(name, operands, OperatorKind::Shading(shading));
            }

            "Do" => {
                let res_name = self.name_operand(name, &operands).map(str::to_string);
                let xobject = res_name.as_deref().and_then(|res| {
                    let result = resources.xobject(res);
                    self.found(name, "XObject", res, result)
                });
                self.stack.current_mut().set_current_xobject(xobject.clone());
                return self.with_snapshot(
                    name,
                    operands,
                    OperatorKind::XObject {
                        name: res_name,
                        xobject,
                    },
                );
            }

            _ => {
                if self.compat_depth > 0 {
                    debug!(operator = name, "unknown operator inside BX/EX");
                } else {
                    self.warn(
                        ContentWarningCode::UnsupportedOperator,
                        name,
                        format!("unknown operator '{name}' passed through"),
                    );
                }
                OperatorKind::Generic
            }
        };
        OperatorNode::new(name, operands, kind)
    }

    fn with_snapshot(&self, name: &str, operands: Vec<Operand>, kind: OperatorKind) -> OperatorNode {
        OperatorNode::new(name, operands, kind).with_state(self.stack.snapshot())
    }

    fn set_color_space(&mut self, stroke: bool, cs: Arc<ColorSpace>) {
        let gs = self.stack.current_mut();
        // Selecting a space resets the color, so any pattern is dropped.
        if stroke {
            gs.set_stroke_color_space(cs);
            gs.set_stroke_pattern(None);
        } else {
            gs.set_fill_color_space(cs);
            gs.set_fill_pattern(None);
        }
    }

    /// A device space, or the `/Default*` resource replacing it.
    fn device_space(
        &mut self,
        op: &str,
        resources: &dyn ResourceResolver,
        family: DeviceFamily,
    ) -> Arc<ColorSpace> {
        match resources.default_color_space(family) {
            Ok(Some(cs)) => cs,
            Ok(None) => Arc::new(family.color_space()),
            Err(e) => {
                self.warn(
                    ContentWarningCode::ResourceNotFound,
                    op,
                    format!("/{} could not be resolved: {e}", family.default_resource_name()),
                );
                Arc::new(family.color_space())
            }
        }
    }

    /// Operand of `cs`/`CS`: a family name or a `/ColorSpace` resource.
    /// Falls back to DeviceGray when nothing resolves.
    fn named_color_space(
        &mut self,
        op: &str,
        resources: &dyn ResourceResolver,
        operands: &[Operand],
    ) -> Arc<ColorSpace> {
        let Some(cs_name) = self.name_operand(op, operands) else {
            return Arc::new(ColorSpace::DeviceGray);
        };
        match cs_name {
            "DeviceGray" => return self.device_space(op, resources, DeviceFamily::Gray),
            "DeviceRGB" => return self.device_space(op, resources, DeviceFamily::Rgb),
            "DeviceCMYK" => return self.device_space(op, resources, DeviceFamily::Cmyk),
            "Pattern" => return Arc::new(ColorSpace::Pattern { underlying: None }),
            _ => {}
        }
        let result = resources.color_space(cs_name);
        self.found(op, "color space", cs_name, result)
            .unwrap_or_else(|| Arc::new(ColorSpace::DeviceGray))
    }

    /// `scn`/`SCN` under a Pattern space: the last operand names the pattern.
    fn select_pattern(
        &mut self,
        op: &str,
        resources: &dyn ResourceResolver,
        operands: &[Operand],
        stroke: bool,
    ) {
        let gs = self.stack.current();
        let space = if stroke {
            gs.stroke_color_space()
        } else {
            gs.fill_color_space()
        };
        if !space.is_pattern() {
            return;
        }
        let Some(pattern_name) = operands.last().and_then(Operand::as_name) else {
            self.warn(
                ContentWarningCode::MalformedOperand,
                op,
                "pattern color without a pattern name".to_string(),
            );
            return;
        };
        let result = resources.pattern(pattern_name);
        let pattern = self.found(op, "pattern", pattern_name, result);
        let gs = self.stack.current_mut();
        if stroke {
            gs.set_stroke_pattern(pattern);
        } else {
            gs.set_fill_pattern(pattern);
        }
    }

    fn dash_pattern(&mut self, op: &str, operands: &[Operand]) -> Option<DashPattern> {
        let array = operands.first().and_then(Operand::as_array).and_then(|items| {
            items.iter().map(Operand::as_f64).collect::<Option<Vec<f64>>>()
        });
        let phase = operands.get(1).and_then(Operand::as_f64);
        match (array, phase) {
            (Some(array), Some(phase)) => Some(DashPattern { array, phase }),
            _ => {
                self.warn(
                    ContentWarningCode::MalformedOperand,
                    op,
                    "expected [array] phase".to_string(),
                );
                None
            }
        }
    }

    fn matrix(&mut self, op: &str, operands: &[Operand]) -> [f64; 6] {
        let values: Option<Vec<f64>> = operands.iter().map(Operand::as_f64).collect();
        match values.as_deref() {
            Some(&[a, b, c, d, e, f]) => [a, b, c, d, e, f],
            _ => {
                self.warn(
                    ContentWarningCode::MalformedOperand,
                    op,
                    "expected six numbers, using identity".to_string(),
                );
                [1.0, 0.0, 0.0, 1.0, 0.0, 0.0]
            }
        }
    }

    fn ext_gstate(
        &mut self,
        op: &str,
        resources: &dyn ResourceResolver,
        operands: &[Operand],
    ) -> OperatorKind {
        let Some(res_name) = self.name_operand(op, operands).map(str::to_string) else {
            return OperatorKind::ExtGState {
                name: None,
                ext_gstate: None,
            };
        };
        let result = resources.ext_gstate(&res_name);
        let ext = self.found(op, "ExtGState", &res_name, result);
        if let Some(ext) = &ext {
            let gs = self.stack.current_mut();
            gs.copy_properties_from_ext_gstate(ext);
            gs.apply_ext_gstate_transparency(ext);
        }
        OperatorKind::ExtGState {
            name: Some(res_name),
            ext_gstate: ext,
        }
    }

    fn text_font(
        &mut self,
        op: &str,
        resources: &dyn ResourceResolver,
        operands: &[Operand],
    ) -> OperatorKind {
        let font_name = operands.first().and_then(Operand::as_name).map(str::to_string);
        let size = operands.get(1).and_then(Operand::as_f64);
        let (Some(font_name), Some(size)) = (font_name, size) else {
            self.warn(
                ContentWarningCode::MalformedOperand,
                op,
                "expected /Font size".to_string(),
            );
            return OperatorKind::TextFont {
                font_name: None,
                size: self.state().font_size(),
                font: None,
            };
        };

        let gs = self.stack.current_mut();
        gs.set_font_name(Some(font_name.clone()));
        gs.set_font_size(size);

        let result = resources.font(&font_name);
        let font = self.found(op, "font", &font_name, result);
        OperatorKind::TextFont {
            font_name: Some(font_name),
            size,
            font,
        }
    }

    fn text_show(
        &mut self,
        op: &str,
        resources: &dyn ResourceResolver,
        operands: &[Operand],
    ) -> OperatorKind {
        let strings: Option<Vec<Vec<u8>>> = match op {
            "TJ" => operands.first().and_then(Operand::as_array).map(|items| {
                items
                    .iter()
                    .filter_map(Operand::as_bytes)
                    .map(<[u8]>::to_vec)
                    .collect()
            }),
            "\"" => operands.last().and_then(Operand::as_bytes).map(|b| vec![b.to_vec()]),
            _ => operands.first().and_then(Operand::as_bytes).map(|b| vec![b.to_vec()]),
        };
        let strings = strings.unwrap_or_else(|| {
            self.warn(
                ContentWarningCode::MalformedOperand,
                op,
                "text-show operator without a string".to_string(),
            );
            Vec::new()
        });

        let selected = self.state().font_name().map(str::to_string);
        let font = match selected {
            Some(font_name) => {
                let result = resources.font(&font_name);
                self.found(op, "font", &font_name, result)
            }
            None => {
                self.warn(
                    ContentWarningCode::ResourceNotFound,
                    op,
                    "text shown before any Tf".to_string(),
                );
                None
            }
        };
        OperatorKind::TextShow(TextShow::new(font, strings, self.index, op))
    }

    fn inline_image(
        &mut self,
        op: &str,
        resources: &dyn ResourceResolver,
        operands: &[Operand],
    ) -> InlineImage {
        let parameters: Vec<(String, Operand)> = self
            .pending_image
            .take()
            .unwrap_or_default()
            .into_iter()
            .map(|(k, v)| (expand_image_key(&k).to_string(), v))
            .collect();
        let get = |key: &str| parameters.iter().find(|(k, _)| k == key).map(|(_, v)| v);

        let filters = match get("Filter") {
            Some(Operand::Name(n)) => vec![expand_filter(n).to_string()],
            Some(Operand::Array(items)) => items
                .iter()
                .filter_map(Operand::as_name)
                .map(|n| expand_filter(n).to_string())
                .collect(),
            _ => Vec::new(),
        };
        let width = get("Width").and_then(Operand::as_i64);
        let height = get("Height").and_then(Operand::as_i64);
        let bits_per_component = get("BitsPerComponent").and_then(Operand::as_i64);
        let image_mask = matches!(get("ImageMask"), Some(Operand::Boolean(true)));
        let cs_operand = get("ColorSpace").cloned();
        let data_len = operands.first().and_then(Operand::as_bytes).map_or(0, <[u8]>::len);

        let color_space = cs_operand.and_then(|cs| self.inline_color_space(op, resources, &cs));
        InlineImage {
            parameters,
            color_space,
            width,
            height,
            bits_per_component,
            image_mask,
            filters,
            data_len,
        }
    }

    fn inline_color_space(
        &mut self,
        op: &str,
        resources: &dyn ResourceResolver,
        operand: &Operand,
    ) -> Option<Arc<ColorSpace>> {
        match operand {
            Operand::Name(n) => match ColorSpace::from_family_name(n) {
                Some(cs) => Some(match cs.device_family() {
                    Some(family) => self.device_space(op, resources, family),
                    None => Arc::new(cs),
                }),
                None => {
                    let result = resources.color_space(n);
                    self.found(op, "color space", n, result)
                }
            },
            Operand::Array(items) => match items.first().and_then(Operand::as_name) {
                Some("I" | "Indexed") => {
                    let base = items
                        .get(1)
                        .and_then(|b| self.inline_color_space(op, resources, b))?;
                    let hival = items.get(2).and_then(Operand::as_i64).unwrap_or(0);
                    Some(Arc::new(ColorSpace::Indexed {
                        base,
                        hival: u32::try_from(hival).unwrap_or(0),
                    }))
                }
                _ => {
                    self.warn(
                        ContentWarningCode::MalformedOperand,
                        op,
                        "unsupported inline image color space array".to_string(),
                    );
                    None
                }
            },
            _ => None,
        }
    }
}

fn expand_image_key(key: &str) -> &str {
    match key {
        "BPC" => "BitsPerComponent",
        "CS" => "ColorSpace",
        "D" => "Decode",
        "DP" => "DecodeParms",
        "F" => "Filter",
        "H" => "Height",
        "IM" => "ImageMask",
        "I" => "Interpolate",
        "W" => "Width",
        "L" => "Length",
        other => other,
    }
}

fn expand_filter(name: &str) -> &str {
    match name {
        "AHx" => "ASCIIHexDecode",
        "A85" => "ASCII85Decode",
        "LZW" => "LZWDecode",
        "Fl" => "FlateDecode",
        "RL" => "RunLengthDecode",
        "CCF" => "CCITTFaxDecode",
        "DCT" => "DCTDecode",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdfops_core::{BlendMode, ExtGState, Pattern, PatternKind, SoftMask};

    use crate::operator::LinkedObject;
    use crate::resources::{EmptyResources, MapResources};

    fn num(v: f64) -> Operand {
        Operand::Real(v)
    }

    fn name(n: &str) -> Operand {
        Operand::Name(n.to_string())
    }

    #[test]
    fn device_color_sets_only_its_slot() {
        let mut p = OperatorParser::default();
        let node = p.parse_operator("RG", &EmptyResources, vec![num(1.0), num(0.0), num(0.0)]);
        let state = node.state.as_ref().unwrap();
        assert_eq!(**state.stroke_color_space(), ColorSpace::DeviceRGB);
        assert_eq!(**state.fill_color_space(), ColorSpace::DeviceGray);
        assert!(matches!(node.kind, OperatorKind::Color { stroke: true }));
    }

    #[test]
    fn default_rgb_replaces_device_rgb() {
        let res = MapResources::new().with_color_space("DefaultRGB", ColorSpace::CalRGB);
        let mut p = OperatorParser::default();
        p.parse_operator("rg", &res, vec![num(0.0), num(0.0), num(0.0)]);
        assert_eq!(**p.state().fill_color_space(), ColorSpace::CalRGB);
        p.parse_operator("cs", &res, vec![name("DeviceRGB")]);
        assert_eq!(**p.state().fill_color_space(), ColorSpace::CalRGB);
    }

    #[test]
    fn missing_color_space_falls_back_to_gray() {
        let mut p = OperatorParser::default();
        p.parse_operator("rg", &EmptyResources, vec![num(1.0), num(1.0), num(1.0)]);
        let node = p.parse_operator("cs", &EmptyResources, vec![name("CS9")]);
        assert_eq!(**node.fill_color_space().unwrap(), ColorSpace::DeviceGray);
        assert_eq!(p.warnings().len(), 1);
        assert_eq!(p.warnings()[0].code, ContentWarningCode::ResourceNotFound);
        assert_eq!(p.warnings()[0].operator_index, Some(1));
    }

    #[test]
    fn pattern_selected_by_scn() {
        let res = MapResources::new().with_pattern(Pattern {
            name: "P1".to_string(),
            kind: PatternKind::Tiling {
                paint_type: 1,
                tiling_type: 1,
            },
        });
        let mut p = OperatorParser::default();
        p.parse_operator("cs", &res, vec![name("Pattern")]);
        let node = p.parse_operator("scn", &res, vec![name("P1")]);
        assert!(matches!(node.linked("pattern").as_slice(), [LinkedObject::Pattern(_)]));
        // A new space drops it again.
        p.parse_operator("g", &res, vec![num(0.5)]);
        assert!(p.state().fill_pattern().is_none());
    }

    #[test]
    fn save_restore_depths() {
        let mut p = OperatorParser::default();
        let q1 = p.parse_operator("q", &EmptyResources, vec![]);
        let q2 = p.parse_operator("q", &EmptyResources, vec![]);
        assert!(matches!(q1.kind, OperatorKind::SaveState { depth: 1 }));
        assert!(matches!(q2.kind, OperatorKind::SaveState { depth: 2 }));
        p.parse_operator("Q", &EmptyResources, vec![]);
        p.parse_operator("Q", &EmptyResources, vec![]);
        let extra = p.parse_operator("Q", &EmptyResources, vec![]);
        assert!(matches!(extra.kind, OperatorKind::RestoreState { depth: 0 }));
        assert!(p.warnings().is_empty());
    }

    #[test]
    fn gs_applies_font_and_transparency() {
        let ext = ExtGState {
            font: Some(("F2".to_string(), 9.0)),
            blend_mode: Some(BlendMode::Name("Multiply".to_string())),
            soft_mask: Some(SoftMask {
                subtype: "Luminosity".to_string(),
                has_group: true,
            }),
            fill_alpha: Some(0.5),
            ..ExtGState::default()
        };
        let res = MapResources::new().with_ext_gstate("GS1", ext);
        let mut p = OperatorParser::default();
        let node = p.parse_operator("gs", &res, vec![name("GS1")]);
        assert_eq!(node.linked("extGState").len(), 1);
        let gs = p.state();
        assert_eq!(gs.font_name(), Some("F2"));
        assert_eq!(gs.font_size(), 9.0);
        assert_eq!(gs.fill_alpha(), 0.5);
        assert!(gs.soft_mask().is_some());
        assert!(!gs.blend_mode().unwrap().is_normal());
    }

    #[test]
    fn invalid_rendering_mode_defaults_to_fill() {
        let mut p = OperatorParser::default();
        p.parse_operator("Tr", &EmptyResources, vec![Operand::Integer(3)]);
        assert_eq!(p.state().rendering_mode(), RenderingMode::Invisible);
        p.parse_operator("Tr", &EmptyResources, vec![name("x")]);
        assert_eq!(p.state().rendering_mode(), RenderingMode::Fill);
        assert_eq!(p.warnings()[0].code, ContentWarningCode::MalformedOperand);
    }

    #[test]
    fn unknown_operator_passes_through() {
        let mut p = OperatorParser::default();
        let node = p.parse_operator("ZZ", &EmptyResources, vec![Operand::Integer(1), Operand::Integer(2)]);
        assert_eq!(node.name, "ZZ");
        assert!(matches!(node.kind, OperatorKind::Generic));
        assert_eq!(node.operands.len(), 2);
        assert_eq!(p.warnings()[0].code, ContentWarningCode::UnsupportedOperator);
    }

    #[test]
    fn unknown_operator_inside_compatibility_is_quiet() {
        let mut p = OperatorParser::default();
        p.parse_operator("BX", &EmptyResources, vec![]);
        p.parse_operator("foo", &EmptyResources, vec![]);
        p.parse_operator("EX", &EmptyResources, vec![]);
        assert!(p.warnings().is_empty());
    }

    #[test]
    fn do_failure_clears_current_xobject() {
        let res = MapResources::new()
            .with_xobject("Im1", pdfops_core::XObject::PostScript)
            .with_broken("Im2");
        let mut p = OperatorParser::default();
        p.parse_operator("Do", &res, vec![name("Im1")]);
        assert!(p.state().current_xobject().is_some());
        let node = p.parse_operator("Do", &res, vec![name("Im2")]);
        assert!(p.state().current_xobject().is_none());
        assert!(node.linked("xobject").is_empty());
    }

    #[test]
    fn inline_image_collects_parameters() {
        let mut p = OperatorParser::default();
        p.parse_operator("BI", &EmptyResources, vec![]);
        p.parse_operator(
            "ID",
            &EmptyResources,
            vec![Operand::Dictionary(vec![
                ("W".to_string(), Operand::Integer(2)),
                ("H".to_string(), Operand::Integer(1)),
                ("CS".to_string(), name("RGB")),
                ("BPC".to_string(), Operand::Integer(8)),
                ("F".to_string(), name("AHx")),
            ])],
        );
        let node = p.parse_operator("EI", &EmptyResources, vec![Operand::LiteralString(vec![0; 6])]);
        let links = node.linked("inlineImage");
        let [LinkedObject::InlineImage(image)] = links.as_slice() else {
            panic!("no inline image");
        };
        assert_eq!(image.width, Some(2));
        assert_eq!(image.height, Some(1));
        assert_eq!(image.bits_per_component, Some(8));
        assert_eq!(image.filters, vec!["ASCIIHexDecode"]);
        assert_eq!(image.color_space.as_deref(), Some(&ColorSpace::DeviceRGB));
        assert_eq!(image.data_len, 6);
        assert!(node.state.is_some());
    }

    #[test]
    fn malformed_cm_uses_identity() {
        let mut p = OperatorParser::default();
        let node = p.parse_operator("cm", &EmptyResources, vec![num(1.0)]);
        let OperatorKind::Transform(matrix) = node.kind else {
            panic!("not a transform");
        };
        assert_eq!(matrix, [1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
        assert_eq!(p.warnings().len(), 1);
    }

    #[test]
    fn warnings_not_collected_when_disabled() {
        let mut p = OperatorParser::new(false);
        p.parse_operator("cs", &EmptyResources, vec![name("Nope")]);
        assert!(p.warnings().is_empty());
    }
}
