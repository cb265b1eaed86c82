//! Geometry resolver: offsets, constraint anchoring, stacking order and
//! rotation for positioned nodes.

use crate::config::ConvertConfig;
use crate::css::{Declaration, decl, deg, format_num, px};
use crate::model::*;

/// What kind of box a node is positioned inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentKind {
    /// Frame, flow or free-form. `reversed` mirrors the stacking order.
    Frame { flow: bool, reversed: bool },
    /// Free-form group; children share the group's parent space.
    Group,
    /// Synthetic clip box wrapping a mask run.
    MaskWrapper,
}

/// The effective container a node is positioned against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerRef {
    pub kind: ParentKind,
    pub width: f32,
    pub height: f32,
    /// Point in the children's coordinate space that maps to the
    /// container's top-left corner.
    pub origin: (f32, f32),
    pub bbox: Option<Bounds>,
}

impl ContainerRef {
    /// Container formed by a frame or group node; `None` for leaves.
    pub fn for_node(node: &SceneNode) -> Option<Self> {
        let (kind, origin) = match &node.kind {
            NodeKind::Frame(frame) => (
                ParentKind::Frame {
                    flow: frame.is_auto_layout(),
                    reversed: frame.item_reverse_z_index,
                },
                (0.0, 0.0),
            ),
            // Group children live in the group's parent space.
            NodeKind::Group => (ParentKind::Group, (node.x, node.y)),
            _ => return None,
        };
        Some(Self {
            kind,
            width: node.width,
            height: node.height,
            origin,
            bbox: node.absolute_bounding_box,
        })
    }

    /// Clip box standing in for `mask`; the masked siblings share the
    /// mask's coordinate space.
    pub fn for_mask(mask: &SceneNode) -> Self {
        Self {
            kind: ParentKind::MaskWrapper,
            width: mask.width,
            height: mask.height,
            origin: (mask.x, mask.y),
            bbox: mask.absolute_bounding_box,
        }
    }

    /// Whether a child takes part in the container's flex/grid flow.
    pub fn is_flow_child(&self, node: &SceneNode) -> bool {
        matches!(self.kind, ParentKind::Frame { flow: true, .. }) && !node.is_absolute()
    }
}

/// Offset of a node's top-left from its container's top-left.
///
/// Rotated nodes, and children of groups and mask wrappers, measure from
/// absolute bounding boxes when both are known; otherwise local
/// coordinates are shifted by the container origin.
pub fn offsets(node: &SceneNode, container: &ContainerRef, config: &ConvertConfig) -> (f32, f32) {
    let prefer_bbox = node.is_rotated(config.rotation_epsilon)
        || matches!(container.kind, ParentKind::Group | ParentKind::MaskWrapper);
    if prefer_bbox {
        if let (Some(own), Some(parent)) = (node.absolute_bounding_box, container.bbox) {
            return (own.x - parent.x, own.y - parent.y);
        }
    }
    (node.x - container.origin.0, node.y - container.origin.1)
}

/// Stacking order of the `index`-th of `count` siblings.
///
/// Frame children start at 1 to stay above the frame's own background;
/// group and wrapper children start at 0.
pub fn z_index(kind: ParentKind, index: usize, count: usize) -> i64 {
    let (index, count) = (index as i64, count as i64);
    match kind {
        ParentKind::Frame { reversed: false, .. } => index + 1,
        ParentKind::Frame { reversed: true, .. } => count - index,
        ParentKind::Group | ParentKind::MaskWrapper => index,
    }
}

/// One axis of a resolved constraint.
struct AxisPlacement {
    declarations: Vec<Declaration>,
    translate: Option<String>,
}

/// Edge declarations for one axis.
///
/// `start`/`end` are the CSS edge properties, `offset` the node's offset,
/// `size` its extent and `extent` the container's.
fn place_axis(
    constraint: ConstraintType,
    (start, end, translate_fn): (&'static str, &'static str, &'static str),
    offset: f32,
    size: f32,
    extent: f32,
) -> AxisPlacement {
    let far = extent - (offset + size);
    match constraint {
        ConstraintType::Min => AxisPlacement {
            declarations: vec![decl(start, px(offset))],
            translate: None,
        },
        ConstraintType::Max => AxisPlacement {
            declarations: vec![decl(end, px(far))],
            translate: None,
        },
        ConstraintType::Stretch => AxisPlacement {
            declarations: vec![decl(start, px(offset)), decl(end, px(far))],
            translate: None,
        },
        ConstraintType::Center => {
            let residual = (offset + size / 2.0) - extent / 2.0;
            let mut translate = format!("{translate_fn}(-50%)");
            if residual.round() != 0.0 {
                translate.push_str(&format!(" {translate_fn}({})", px(residual)));
            }
            AxisPlacement {
                declarations: vec![decl(start, "50%")],
                translate: Some(translate),
            }
        }
    }
}

/// Declarations that place a node inside `container`.
///
/// Flow children only receive a stacking order; everything else is
/// absolutely positioned from its constraints. Rotation appends to the
/// transform list after any centering translations.
pub fn position_declarations(
    node: &SceneNode,
    container: &ContainerRef,
    index: usize,
    count: usize,
    config: &ConvertConfig,
) -> Vec<Declaration> {
    let offset = offsets(node, container, config);
    place(node, container, offset, index, count, config, true)
}

/// Half the difference between a node's bounding box and its unrotated
/// size, per axis. Zero without a bounding box.
pub fn rotation_inset(node: &SceneNode) -> (f32, f32) {
    match node.absolute_bounding_box {
        Some(bbox) => (
            (bbox.width - node.width) / 2.0,
            (bbox.height - node.height) / 2.0,
        ),
        None => (0.0, 0.0),
    }
}

/// Slot of a rotated vector's outer box, which keeps the unrotated size
/// and shares the bounding box's center.
///
/// Positioned boxes are shifted by [`rotation_inset`] before anchoring, so
/// far-edge anchors measure from the unrotated box's own edge. Flow boxes
/// take the inset up as a symmetric margin and reserve the bounding box.
pub fn rotated_slot_declarations(
    node: &SceneNode,
    container: &ContainerRef,
    index: usize,
    count: usize,
    config: &ConvertConfig,
) -> Vec<Declaration> {
    let (dx, dy) = rotation_inset(node);
    let (x, y) = offsets(node, container, config);
    let mut decls = place(node, container, (x + dx, y + dy), index, count, config, false);
    if container.is_flow_child(node) && (format_num(dx) != "0" || format_num(dy) != "0") {
        decls.insert(0, decl("margin", format!("{} {}", px(dy), px(dx))));
    }
    decls
}

fn place(
    node: &SceneNode,
    container: &ContainerRef,
    (x, y): (f32, f32),
    index: usize,
    count: usize,
    config: &ConvertConfig,
    rotate: bool,
) -> Vec<Declaration> {
    let mut decls = Vec::new();
    let mut transforms: Vec<String> = Vec::new();

    if !container.is_flow_child(node) {
        decls.push(decl("position", "absolute"));

        let horizontal = place_axis(
            node.constraints.horizontal,
            ("left", "right", "translateX"),
            x,
            node.width,
            container.width,
        );
        let vertical = place_axis(
            node.constraints.vertical,
            ("top", "bottom", "translateY"),
            y,
            node.height,
            container.height,
        );
        decls.extend(horizontal.declarations);
        decls.extend(vertical.declarations);
        transforms.extend(horizontal.translate);
        transforms.extend(vertical.translate);
    }

    if rotate && node.is_rotated(config.rotation_epsilon) {
        transforms.push(format!("rotate({})", deg(-node.rotation)));
        decls.push(decl("transform-origin", "0 0"));
    }
    if !transforms.is_empty() {
        decls.push(decl("transform", transforms.join(" ")));
    }

    decls.push(decl(
        "z-index",
        z_index(container.kind, index, count).to_string(),
    ));
    decls
}

/// Placement of the synthetic wrapper for a mask run: the mask's slot,
/// always absolute, anchored top-left.
pub fn mask_slot_declarations(
    mask: &SceneNode,
    parent: &ContainerRef,
    z: i64,
    config: &ConvertConfig,
) -> Vec<Declaration> {
    let (x, y) = offsets(mask, parent, config);
    vec![
        decl("position", "absolute"),
        decl("left", px(x)),
        decl("top", px(y)),
        decl("width", px(mask.width)),
        decl("height", px(mask.height)),
        decl("overflow", "hidden"),
        decl("z-index", z.to_string()),
    ]
}

/// Outer and inner declarations for a rotated vector.
///
/// The outer box keeps the unrotated size; the inner box is centered in
/// it and rotated. Placement comes from [`rotated_slot_declarations`].
pub fn rotated_vector_boxes(node: &SceneNode) -> (Vec<Declaration>, Vec<Declaration>) {
    let outer = vec![decl("width", px(node.width)), decl("height", px(node.height))];
    let inner = vec![
        decl("position", "absolute"),
        decl("left", "50%"),
        decl("top", "50%"),
        decl("width", px(node.width)),
        decl("height", px(node.height)),
        decl(
            "transform",
            format!("translate(-50%, -50%) rotate({})", deg(-node.rotation)),
        ),
    ];
    (outer, inner)
}

// ─── Tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn node(value: serde_json::Value) -> SceneNode {
        serde_json::from_value(value).unwrap()
    }

    fn free_frame(width: f32, height: f32) -> ContainerRef {
        ContainerRef {
            kind: ParentKind::Frame {
                flow: false,
                reversed: false,
            },
            width,
            height,
            origin: (0.0, 0.0),
            bbox: None,
        }
    }

    #[test]
    fn centered_child_has_no_residual() {
        let config = ConvertConfig::default();
        let child = node(json!({
            "id": "1:1", "type": "RECTANGLE", "x": 75, "y": 40, "width": 50, "height": 20,
            "constraints": { "horizontal": "CENTER", "vertical": "CENTER" }
        }));
        let decls = position_declarations(&child, &free_frame(200.0, 100.0), 0, 1, &config);
        assert_eq!(
            decls,
            vec![
                decl("position", "absolute"),
                decl("left", "50%"),
                decl("top", "50%"),
                decl("transform", "translateX(-50%) translateY(-50%)"),
                decl("z-index", "1"),
            ]
        );
    }

    #[test]
    fn centered_child_with_residual() {
        let config = ConvertConfig::default();
        let child = node(json!({
            "id": "1:1", "type": "RECTANGLE", "x": 0, "y": 40, "width": 50, "height": 20,
            "constraints": { "horizontal": "CENTER", "vertical": "CENTER" }
        }));
        let decls = position_declarations(&child, &free_frame(200.0, 100.0), 0, 1, &config);
        assert!(decls.contains(&decl(
            "transform",
            "translateX(-50%) translateX(-75px) translateY(-50%)"
        )));
    }

    #[test]
    fn min_max_stretch_edges() {
        let config = ConvertConfig::default();
        let mut child = node(json!({
            "id": "1:1", "type": "RECTANGLE", "x": 10, "y": 20, "width": 30, "height": 40
        }));
        let container = free_frame(100.0, 100.0);

        let decls = position_declarations(&child, &container, 0, 1, &config);
        assert_eq!(&decls[1..3], &[decl("left", "10px"), decl("top", "20px")]);

        child.constraints = Constraints {
            horizontal: ConstraintType::Max,
            vertical: ConstraintType::Stretch,
        };
        let decls = position_declarations(&child, &container, 0, 1, &config);
        assert_eq!(
            &decls[1..4],
            &[
                decl("right", "60px"),
                decl("top", "20px"),
                decl("bottom", "40px")
            ]
        );
    }

    #[test]
    fn flow_children_only_stack() {
        let config = ConvertConfig::default();
        let child = node(json!({ "id": "1:1", "type": "RECTANGLE", "x": 10 }));
        let flow = ContainerRef {
            kind: ParentKind::Frame {
                flow: true,
                reversed: false,
            },
            ..free_frame(10.0, 10.0)
        };
        assert_eq!(
            position_declarations(&child, &flow, 2, 3, &config),
            vec![decl("z-index", "3")]
        );
    }

    #[test]
    fn stacking_order() {
        let frame = ParentKind::Frame {
            flow: true,
            reversed: false,
        };
        let reversed = ParentKind::Frame {
            flow: true,
            reversed: true,
        };
        assert_eq!(z_index(frame, 0, 3), 1);
        assert_eq!(z_index(reversed, 0, 3), 3);
        assert_eq!(z_index(reversed, 2, 3), 1);
        assert_eq!(z_index(ParentKind::Group, 0, 3), 0);
    }

    #[test]
    fn group_children_measure_from_group_origin() {
        let config = ConvertConfig::default();
        let group = node(json!({
            "id": "1:1", "type": "GROUP", "x": 100, "y": 50, "width": 40, "height": 40
        }));
        let child = node(json!({
            "id": "1:2", "type": "RECTANGLE", "x": 110, "y": 60, "width": 10, "height": 10
        }));
        let container = ContainerRef::for_node(&group).unwrap();
        assert_eq!(offsets(&child, &container, &config), (10.0, 10.0));
    }

    #[test]
    fn rotated_nodes_use_bounding_boxes() {
        let config = ConvertConfig::default();
        let child = node(json!({
            "id": "1:2", "type": "RECTANGLE", "x": 5, "y": 5, "width": 10, "height": 10,
            "rotation": 45,
            "absoluteBoundingBox": { "x": 112, "y": 208, "width": 14, "height": 14 }
        }));
        let container = ContainerRef {
            bbox: Some(Bounds::new(100.0, 200.0, 100.0, 100.0)),
            ..free_frame(100.0, 100.0)
        };
        assert_eq!(offsets(&child, &container, &config), (12.0, 8.0));

        let decls = position_declarations(&child, &container, 0, 1, &config);
        assert!(decls.contains(&decl("transform-origin", "0 0")));
        assert!(decls.contains(&decl("transform", "rotate(-45deg)")));
    }

    #[test]
    fn rotation_below_epsilon_is_noise() {
        let config = ConvertConfig::default();
        let child = node(json!({ "id": "1:2", "type": "RECTANGLE", "rotation": 0.001 }));
        let decls = position_declarations(&child, &free_frame(10.0, 10.0), 0, 1, &config);
        assert!(!decls.iter().any(|d| d.property == "transform"));
    }

    #[test]
    fn rotated_vector_is_centered_in_its_bounding_box() {
        let config = ConvertConfig::default();
        let arrow = node(json!({
            "id": "1:2", "type": "VECTOR", "width": 20, "height": 10, "rotation": 90,
            "absoluteBoundingBox": { "x": 0, "y": 0, "width": 10, "height": 20 }
        }));
        let slot = rotated_slot_declarations(&arrow, &free_frame(50.0, 50.0), 0, 1, &config);
        assert_eq!(
            slot,
            vec![
                decl("position", "absolute"),
                decl("left", "-5px"),
                decl("top", "5px"),
                decl("z-index", "1"),
            ]
        );

        let (outer, inner) = rotated_vector_boxes(&arrow);
        assert_eq!(outer, vec![decl("width", "20px"), decl("height", "10px")]);
        assert_eq!(
            inner.last(),
            Some(&decl("transform", "translate(-50%, -50%) rotate(-90deg)"))
        );
    }

    #[test]
    fn rotated_vector_anchored_far_edges() {
        let config = ConvertConfig::default();
        let mut arrow = node(json!({
            "id": "1:2", "type": "VECTOR", "width": 20, "height": 10, "rotation": 90,
            "absoluteBoundingBox": { "x": 0, "y": 0, "width": 10, "height": 20 },
            "constraints": { "horizontal": "MAX", "vertical": "MIN" }
        }));
        // The 20px-wide outer box must span x in [-5, 15], centered on the
        // bounding box's x = 5.
        let slot = rotated_slot_declarations(&arrow, &free_frame(50.0, 50.0), 0, 1, &config);
        assert_eq!(&slot[1..3], &[decl("right", "35px"), decl("top", "5px")]);

        arrow.constraints.vertical = ConstraintType::Max;
        let slot = rotated_slot_declarations(&arrow, &free_frame(50.0, 50.0), 0, 1, &config);
        // y in [5, 15] leaves 35px below.
        assert_eq!(&slot[1..3], &[decl("right", "35px"), decl("bottom", "35px")]);
    }

    #[test]
    fn rotated_vector_in_flow_reserves_its_bounding_box() {
        let config = ConvertConfig::default();
        let arrow = node(json!({
            "id": "1:2", "type": "VECTOR", "width": 20, "height": 10, "rotation": 90,
            "absoluteBoundingBox": { "x": 0, "y": 0, "width": 10, "height": 20 }
        }));
        let flow = ContainerRef {
            kind: ParentKind::Frame {
                flow: true,
                reversed: false,
            },
            ..free_frame(50.0, 50.0)
        };
        let slot = rotated_slot_declarations(&arrow, &flow, 0, 1, &config);
        assert_eq!(slot, vec![decl("margin", "5px -5px"), decl("z-index", "1")]);
    }

    #[test]
    fn mask_wrapper_children_are_relative_to_mask() {
        let config = ConvertConfig::default();
        let mask = node(json!({
            "id": "1:1", "type": "RECTANGLE", "x": 20, "y": 30, "width": 50, "height": 50
        }));
        let masked = node(json!({
            "id": "1:2", "type": "RECTANGLE", "x": 25, "y": 35, "width": 10, "height": 10
        }));
        let wrapper = ContainerRef::for_mask(&mask);
        let decls = position_declarations(&masked, &wrapper, 0, 1, &config);
        assert_eq!(
            decls,
            vec![
                decl("position", "absolute"),
                decl("left", "5px"),
                decl("top", "5px"),
                decl("z-index", "0"),
            ]
        );
    }
}
