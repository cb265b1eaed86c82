//! Tree walker: visits the design tree depth-first and emits markup,
//! interning every node's appearance into the style registry.
//!
//! Each node kind is handled by one arm of a closed `match`. Positioning
//! is written inline on the element; appearance and sizing go into the
//! node's own class; layout effects are shared utility classes. Mask runs
//! are grouped with an index-based scan over each sibling list.

use crate::config::ConvertConfig;
use crate::css::{Declaration, decl, dedupe_last};
use crate::document::FontSet;
use crate::error::ConvertError;
use crate::export::{VectorAsset, VectorAssets};
use crate::geometry::{
    ContainerRef, mask_slot_declarations, position_declarations, rotated_slot_declarations,
    rotated_vector_boxes, z_index,
};
use crate::layout::{Placement, child_placement, container_utilities, resolve_sizing, text_size_utility};
use crate::markup::{Element, Markup};
use crate::model::*;
use crate::paint::{
    blur_declarations, box_declarations, layer_declarations, mask_image_value, radius_value,
    text_shadows,
};
use crate::registry::{StyleRegistry, sanitize_name};
use crate::text::{font_weight, text_content, text_declarations};

/// A zero-height, fully transparent box used only to space siblings.
///
/// These carry no visual content and are dropped entirely.
pub fn is_invisible_spacer(node: &SceneNode, _config: &ConvertConfig) -> bool {
    let boxy = matches!(
        node.kind,
        NodeKind::Frame(_) | NodeKind::Group | NodeKind::Rectangle | NodeKind::Ellipse
    );
    let transparent = (node.opacity * 100.0).round() / 100.0 < 0.01;
    boxy && node.height < 1.0
        && transparent
        && (!node.is_container() || node.children.is_empty())
}

/// Where a node is being emitted.
#[derive(Debug, Clone, Copy)]
enum Slot {
    Root,
    Child {
        container: ContainerRef,
        placement: Placement,
        index: usize,
        count: usize,
    },
}

impl Slot {
    fn placement(&self) -> Placement {
        match self {
            Slot::Root => Placement::Root,
            Slot::Child { placement, .. } => *placement,
        }
    }
}

/// Per-run emission state: the style registry, the collected fonts and
/// the prefetched vector exports.
pub struct Emitter<'a> {
    config: &'a ConvertConfig,
    assets: &'a VectorAssets,
    registry: StyleRegistry,
    fonts: FontSet,
}

impl<'a> Emitter<'a> {
    pub fn new(config: &'a ConvertConfig, assets: &'a VectorAssets) -> Self {
        Self {
            config,
            assets,
            registry: StyleRegistry::new(),
            fonts: FontSet::new(),
        }
    }

    /// Emit the whole tree under `root`. The root is emitted even when
    /// hidden, since it was selected explicitly.
    pub fn emit_root(&mut self, root: &SceneNode) -> Result<Markup, ConvertError> {
        let element = self.emit_node(root, Slot::Root)?;
        Ok(element.unwrap_or_else(|| Markup::Element(Element::new("div"))))
    }

    /// Hand back the run's registry and fonts.
    pub fn finish(self) -> (StyleRegistry, FontSet) {
        (self.registry, self.fonts)
    }

    // ─── Dispatch ────────────────────────────────────────────────────────

    fn emit_node(&mut self, node: &SceneNode, slot: Slot) -> Result<Option<Markup>, ConvertError> {
        let is_root = matches!(slot, Slot::Root);
        if !is_root && !node.visible {
            return Ok(None);
        }
        if !is_root && is_invisible_spacer(node, self.config) {
            log::debug!("dropping spacer {} ({:?})", node.id, node.name);
            return Ok(None);
        }
        if !node.has_finite_geometry() {
            return Err(ConvertError::unexpected(format!(
                "node {} has non-finite geometry",
                node.id
            )));
        }

        let element = match &node.kind {
            NodeKind::Frame(_) | NodeKind::Group => self.emit_container(node, slot)?,
            NodeKind::Text(props) => self.emit_text(node, props, slot),
            NodeKind::Rectangle => self.emit_box(node, slot),
            NodeKind::Ellipse | NodeKind::VectorLike => self.emit_vector(node, slot),
        };
        Ok(Some(Markup::Element(element)))
    }

    /// Inline positioning for a node in its slot.
    fn position(&self, node: &SceneNode, slot: Slot) -> Vec<Declaration> {
        match slot {
            Slot::Root => Vec::new(),
            Slot::Child {
                container,
                index,
                count,
                ..
            } => position_declarations(node, &container, index, count, self.config),
        }
    }

    /// Intern a node's own declarations under its layer name.
    fn own_class(&mut self, node: &SceneNode, decls: Vec<Declaration>) -> Option<String> {
        let decls = dedupe_last(decls);
        if decls.is_empty() {
            return None;
        }
        let base = sanitize_name(&node.name, node.id);
        Some(self.registry.intern_signature(&base, &decls))
    }

    // ─── Containers ──────────────────────────────────────────────────────

    fn emit_container(&mut self, node: &SceneNode, slot: Slot) -> Result<Element, ConvertError> {
        let sizing = resolve_sizing(node, slot.placement(), &mut self.registry);

        let mut decls = sizing.declarations;
        decls.extend(box_declarations(node, self.config));
        if node.frame_props().is_some_and(|f| f.clips_content) {
            decls.push(decl("overflow", "hidden"));
        }

        let mut classes: Vec<String> = self.own_class(node, decls).into_iter().collect();
        if let Some(frame) = node.frame_props() {
            classes.extend(container_utilities(frame, &mut self.registry));
        }
        classes.extend(sizing.utilities);

        let children = self.emit_children(node)?;
        let mut style = self.position(node, slot);
        if !children.is_empty() && !style.iter().any(|d| d.property == "position") {
            style.insert(0, decl("position", "relative"));
        }

        let mut element = Element::new("div")
            .with_classes(classes)
            .with_style(dedupe_last(style));
        element.children = children;
        Ok(element)
    }

    /// Emit a container's children, grouping mask runs.
    fn emit_children(&mut self, parent: &SceneNode) -> Result<Vec<Markup>, ConvertError> {
        let Some(container) = ContainerRef::for_node(parent) else {
            return Ok(Vec::new());
        };
        let children = &parent.children;
        let count = children.len();
        let mut out = Vec::with_capacity(count);

        let mut i = 0;
        while i < count {
            let child = &children[i];
            let slot = Slot::Child {
                container,
                placement: child_placement(parent, child),
                index: i,
                count,
            };
            out.extend(self.emit_node(child, slot)?);

            if !(child.is_mask && child.visible) {
                i += 1;
                continue;
            }

            // The run ends at the next mask or the end of the list.
            let end = children[i + 1..]
                .iter()
                .position(|c| c.is_mask)
                .map_or(count, |p| i + 1 + p);
            let run = &children[i + 1..end];
            if !run.is_empty() {
                out.extend(self.emit_mask_run(child, run, &container, i + 1, count)?);
            }
            i = end;
        }
        Ok(out)
    }

    /// Wrap the siblings following a mask in a clip box at the mask's slot.
    fn emit_mask_run(
        &mut self,
        mask: &SceneNode,
        run: &[SceneNode],
        parent: &ContainerRef,
        first_index: usize,
        count: usize,
    ) -> Result<Option<Markup>, ConvertError> {
        let wrapper = ContainerRef::for_mask(mask);
        let mut children = Vec::with_capacity(run.len());
        for (j, sibling) in run.iter().enumerate() {
            let slot = Slot::Child {
                container: wrapper,
                placement: Placement::Absolute,
                index: j,
                count: run.len(),
            };
            children.extend(self.emit_node(sibling, slot)?);
        }
        if children.is_empty() {
            return Ok(None);
        }

        let mut clip = Vec::new();
        if let Some(path) = clip_path(mask) {
            clip.push(decl("clip-path", path));
        }
        if let Some(image) = mask_image_value(mask, self.config) {
            clip.push(decl("-webkit-mask-image", image.clone()));
            clip.push(decl("mask-image", image));
        }
        let classes: Vec<String> = if clip.is_empty() {
            Vec::new()
        } else {
            let base = format!("{}-mask", sanitize_name(&mask.name, mask.id));
            vec![self.registry.intern_signature(&base, &clip)]
        };

        let z = z_index(parent.kind, first_index, count);
        let mut element = Element::new("div")
            .with_classes(classes)
            .with_style(mask_slot_declarations(mask, parent, z, self.config));
        element.children = children;
        Ok(Some(Markup::Element(element)))
    }

    // ─── Leaves ──────────────────────────────────────────────────────────

    fn emit_text(&mut self, node: &SceneNode, props: &TextProps, slot: Slot) -> Element {
        let sizing = resolve_sizing(node, slot.placement(), &mut self.registry);

        let mut decls = sizing.declarations;
        decls.extend(text_declarations(node, props, self.config));
        let shadows = text_shadows(node, self.config);
        if !shadows.is_empty() {
            decls.push(decl("text-shadow", shadows.join(", ")));
        }
        decls.extend(blur_declarations(node));
        decls.extend(layer_declarations(node, self.config));

        self.fonts.add(
            &props.font_name.family,
            font_weight(&props.font_name.style),
            self.config,
        );

        let mut classes: Vec<String> = self.own_class(node, decls).into_iter().collect();
        classes.extend(sizing.utilities);
        classes.push(text_size_utility(props.font_size, &mut self.registry));

        let mut element = Element::new("p")
            .with_classes(classes)
            .with_style(dedupe_last(self.position(node, slot)));
        element.children = text_content(props, &mut self.registry, self.config);
        element
    }

    fn emit_box(&mut self, node: &SceneNode, slot: Slot) -> Element {
        let sizing = resolve_sizing(node, slot.placement(), &mut self.registry);
        let mut decls = sizing.declarations;
        decls.extend(box_declarations(node, self.config));

        let mut classes: Vec<String> = self.own_class(node, decls).into_iter().collect();
        classes.extend(sizing.utilities);
        Element::new("div")
            .with_classes(classes)
            .with_style(dedupe_last(self.position(node, slot)))
    }

    fn emit_vector(&mut self, node: &SceneNode, slot: Slot) -> Element {
        let asset = self
            .assets
            .get(&node.id)
            .cloned()
            .unwrap_or(VectorAsset::Placeholder);

        // Placeholder boxes keep the shape's footprint.
        let mut paint = layer_declarations(node, self.config);
        if asset == VectorAsset::Placeholder {
            paint.insert(0, decl("background", self.config.placeholder_color.clone()));
            if node.kind == NodeKind::Ellipse {
                paint.insert(1, decl("border-radius", "50%"));
            }
        }

        if !node.is_rotated(self.config.rotation_epsilon) {
            let sizing = resolve_sizing(node, slot.placement(), &mut self.registry);
            let mut decls = sizing.declarations;
            decls.extend(paint);
            let mut classes: Vec<String> = self.own_class(node, decls).into_iter().collect();
            classes.extend(sizing.utilities);

            let mut element = Element::new("div")
                .with_classes(classes)
                .with_style(dedupe_last(self.position(node, slot)));
            if let VectorAsset::Svg(svg) = asset {
                element.inner_svg = Some(svg);
            }
            return element;
        }

        // Rotated: an unrotated outer box in the slot, a rotated inner box
        // carrying the content.
        let (outer, inner) = rotated_vector_boxes(node);
        let mut outer_style = match slot {
            Slot::Root => Vec::new(),
            Slot::Child {
                container,
                index,
                count,
                ..
            } => rotated_slot_declarations(node, &container, index, count, self.config),
        };
        // Flow children and the root stay in flow but anchor the inner box.
        if !outer_style.iter().any(|d| d.property == "position") {
            outer_style.insert(0, decl("position", "relative"));
        }
        outer_style.extend(outer);

        let mut inner_element = Element::new("div").with_style(inner);
        inner_element.classes = self.own_class(node, paint).into_iter().collect();
        if let VectorAsset::Svg(svg) = asset {
            inner_element.inner_svg = Some(svg);
        }
        Element::new("div")
            .with_style(dedupe_last(outer_style))
            .with_child(Markup::Element(inner_element))
    }
}

/// Clip shape of a mask node, or `None` when only overflow clipping
/// applies.
fn clip_path(mask: &SceneNode) -> Option<String> {
    let rounded = || match radius_value(mask.corner_radius()) {
        Some(radius) => format!("inset(0 round {radius})"),
        None => "inset(0)".to_string(),
    };
    match mask.kind {
        NodeKind::Rectangle | NodeKind::Frame(_) | NodeKind::Group => Some(rounded()),
        NodeKind::Ellipse => Some("ellipse(50% 50% at 50% 50%)".to_string()),
        NodeKind::Text(_) | NodeKind::VectorLike => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::{Dialect, render};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn node(value: serde_json::Value) -> SceneNode {
        serde_json::from_value(value).unwrap()
    }

    fn emit(root: &SceneNode) -> (String, String) {
        let config = ConvertConfig::default();
        let assets = VectorAssets::new();
        let mut emitter = Emitter::new(&config, &assets);
        let markup = emitter.emit_root(root).unwrap();
        let (registry, _) = emitter.finish();
        (render(&markup, Dialect::Html, 0), registry.to_css())
    }

    #[test]
    fn spacers_are_dropped() {
        let spacer = node(json!({
            "id": "1:1", "type": "FRAME", "height": 0.5, "opacity": 0.004
        }));
        assert!(is_invisible_spacer(&spacer, &ConvertConfig::default()));

        let visible = node(json!({ "id": "1:2", "type": "RECTANGLE", "height": 0.5 }));
        assert!(!is_invisible_spacer(&visible, &ConvertConfig::default()));

        let root = node(json!({
            "id": "1:0", "type": "FRAME", "name": "Root", "width": 10, "height": 10,
            "layoutMode": "VERTICAL",
            "children": [
                { "id": "1:1", "type": "RECTANGLE", "height": 0, "opacity": 0 },
                { "id": "1:3", "type": "RECTANGLE", "name": "Bar", "width": 10, "height": 2 }
            ]
        }));
        let (html, _) = emit(&root);
        assert_eq!(html.matches("<div").count(), 2, "{html}");
        assert!(html.contains("class=\"bar shrink-0\""));
    }

    #[test]
    fn hidden_children_are_skipped() {
        let root = node(json!({
            "id": "1:0", "type": "FRAME", "width": 10, "height": 10,
            "children": [{ "id": "1:1", "type": "TEXT", "visible": false, "characters": "x" }]
        }));
        let (html, _) = emit(&root);
        assert!(!html.contains("<p"));
    }

    #[test]
    fn identical_nodes_share_a_class() {
        let card = |id: &str| {
            json!({
                "id": id, "type": "RECTANGLE", "name": "Swatch", "width": 8, "height": 8,
                "fills": [{ "type": "SOLID", "color": { "r": 1, "g": 0, "b": 0 } }]
            })
        };
        let root = node(json!({
            "id": "1:0", "type": "FRAME", "name": "Row", "layoutMode": "HORIZONTAL",
            "width": 40, "height": 8,
            "children": [card("1:1"), card("1:2")]
        }));
        let (html, css) = emit(&root);
        assert_eq!(html.matches("class=\"swatch shrink-0\"").count(), 2);
        assert_eq!(css.matches(".swatch {").count(), 1);
    }

    #[test]
    fn free_form_children_are_absolute() {
        let root = node(json!({
            "id": "1:0", "type": "FRAME", "name": "Canvas", "width": 100, "height": 100,
            "children": [{
                "id": "1:1", "type": "RECTANGLE", "x": 10, "y": 20, "width": 5, "height": 5,
                "fills": [{ "type": "SOLID", "color": { "r": 0, "g": 0, "b": 0 } }]
            }]
        }));
        let (html, _) = emit(&root);
        assert!(html.contains("style=\"position: relative\""), "{html}");
        assert!(
            html.contains("style=\"position: absolute; left: 10px; top: 20px; z-index: 1\""),
            "{html}"
        );
    }

    #[test]
    fn mask_run_wraps_following_siblings() {
        let rect = |id: &str, mask: bool| {
            json!({
                "id": id, "type": "RECTANGLE", "name": id, "isMask": mask,
                "x": 0, "y": 0, "width": 10, "height": 10,
                "fills": [{ "type": "SOLID", "color": { "r": 0, "g": 0, "b": 0 } }]
            })
        };
        let root = node(json!({
            "id": "9:0", "type": "FRAME", "name": "Masks", "width": 50, "height": 50,
            "children": [rect("A", true), rect("B", false), rect("C", false), rect("D", true), rect("E", false)]
        }));
        let config = ConvertConfig::default();
        let assets = VectorAssets::new();
        let mut emitter = Emitter::new(&config, &assets);
        let Markup::Element(root) = emitter.emit_root(&root).unwrap() else {
            panic!("root must be an element");
        };

        // A, wrapper{B, C}, D, wrapper{E}
        assert_eq!(root.children.len(), 4);
        let Markup::Element(first) = &root.children[1] else {
            panic!("expected wrapper");
        };
        assert_eq!(first.children.len(), 2);
        assert_eq!(first.classes, vec!["a-mask".to_string()]);
        assert!(first.style.contains(&decl("overflow", "hidden")));
        let Markup::Element(second) = &root.children[3] else {
            panic!("expected wrapper");
        };
        assert_eq!(second.children.len(), 1);
    }

    #[test]
    fn gradient_mask_wrapper_carries_mask_image() {
        let root = node(json!({
            "id": "9:0", "type": "FRAME", "name": "Faded", "width": 50, "height": 50,
            "children": [
                {
                    "id": "9:1", "type": "RECTANGLE", "name": "Fade", "isMask": true,
                    "maskType": "LUMINANCE", "width": 50, "height": 50,
                    "fills": [{
                        "type": "GRADIENT_LINEAR",
                        "gradientStops": [
                            { "position": 0, "color": { "r": 1, "g": 1, "b": 1, "a": 1 } },
                            { "position": 1, "color": { "r": 0, "g": 0, "b": 0, "a": 1 } }
                        ],
                        "gradientTransform": [[0, 1, 0], [-1, 0, 1]]
                    }]
                },
                {
                    "id": "9:2", "type": "RECTANGLE", "name": "Photo", "width": 50, "height": 50,
                    "fills": [{ "type": "SOLID", "color": { "r": 1, "g": 0, "b": 0 } }]
                }
            ]
        }));
        let (html, css) = emit(&root);

        let gradient = "linear-gradient(180deg, rgba(0, 0, 0, 1.00) 0%, rgba(0, 0, 0, 0.00) 100%)";
        assert!(
            css.contains(&format!(
                ".fade-mask {{\n  clip-path: inset(0);\n  -webkit-mask-image: {gradient};\n  mask-image: {gradient};\n}}"
            )),
            "{css}"
        );
        assert!(html.contains("<div class=\"fade-mask\""), "{html}");
        assert!(html.contains("class=\"photo\""), "{html}");
    }

    #[test]
    fn non_finite_geometry_is_fatal() {
        let mut root = SceneNode::new("1:0", "Root", NodeKind::Group);
        root.width = f32::NAN;
        let config = ConvertConfig::default();
        let assets = VectorAssets::new();
        let mut emitter = Emitter::new(&config, &assets);
        assert!(matches!(
            emitter.emit_root(&root),
            Err(ConvertError::Unexpected(_))
        ));
    }

    #[test]
    fn vectors_without_export_become_placeholders() {
        let root = node(json!({
            "id": "1:0", "type": "FRAME", "width": 20, "height": 20,
            "children": [{
                "id": "1:1", "type": "ELLIPSE", "name": "Dot", "width": 4, "height": 4,
                "fills": [{ "type": "SOLID", "color": { "r": 0, "g": 0, "b": 0 } }]
            }]
        }));
        let (_, css) = emit(&root);
        assert!(css.contains(".dot {\n  width: 4px;\n  height: 4px;\n  background: #D9D9D9;\n  border-radius: 50%;\n}"), "{css}");
    }

    #[test]
    fn inlined_vector_uses_prefetched_svg() {
        let root = node(json!({
            "id": "1:0", "type": "FRAME", "width": 20, "height": 20,
            "children": [{ "id": "1:1", "type": "VECTOR", "name": "Icon", "width": 4, "height": 4 }]
        }));
        let config = ConvertConfig::default();
        let mut assets = VectorAssets::new();
        assets.insert(crate::id::NodeId::intern("1:1"), VectorAsset::Svg("<svg/>".into()));
        let mut emitter = Emitter::new(&config, &assets);
        let html = render(&emitter.emit_root(&root).unwrap(), Dialect::Html, 0);
        assert!(html.contains("<div class=\"icon\" style=\"position: absolute; left: 0px; top: 0px; z-index: 1\">\n    <svg/>\n  </div>"), "{html}");
    }

    #[test]
    fn rotated_vector_gets_two_boxes() {
        let root = node(json!({
            "id": "1:0", "type": "FRAME", "width": 50, "height": 50,
            "children": [{
                "id": "1:1", "type": "VECTOR", "name": "Arrow", "width": 20, "height": 10,
                "rotation": 90,
                "fills": [{ "type": "SOLID", "color": { "r": 0, "g": 0, "b": 0 } }]
            }]
        }));
        let (html, _) = emit(&root);
        assert!(html.contains("rotate(-90deg)"), "{html}");
        assert!(html.contains("left: 50%; top: 50%"), "{html}");
    }
}
