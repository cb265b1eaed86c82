//! Layout mapper: auto-layout and grid emulation as utility classes, and
//! per-axis sizing resolution.
//!
//! Frames in HORIZONTAL/VERTICAL mode become flex containers, GRID frames
//! become CSS grids. Every layout effect is a shared utility class so a
//! page full of identical stacks shares one set of rules.

use crate::css::{Declaration, decl, format_num, px};
use crate::model::*;
use crate::registry::StyleRegistry;

/// Numeric part of a utility class name.
///
/// Rounds to the nearest integer; negative values become `neg-<abs>`
/// because a bare minus cannot mark a value inside a class name.
pub fn format_negative_class_value(value: f32) -> String {
    let rounded = value.round() as i64;
    if rounded < 0 {
        format!("neg-{}", rounded.unsigned_abs())
    } else {
        rounded.to_string()
    }
}

/// Register a `<prefix>-<n>` utility whose declarations carry the signed
/// pixel value.
///
/// The class name uses the rounded value but the utility is keyed by the
/// exact one, so 8.4 and 7.6 become `gap-8` and `gap-8-2` instead of
/// sharing the first rule.
fn numeric_utility(
    reg: &mut StyleRegistry,
    prefix: &str,
    value: f32,
    properties: &[&'static str],
) -> String {
    let decls: Vec<Declaration> = properties.iter().map(|p| decl(*p, px(value))).collect();
    reg.intern_named_utility(
        &format!("{prefix}-{}", format_num(value)),
        &format!("{prefix}-{}", format_negative_class_value(value)),
        &decls,
    )
}

// ─── Containers ──────────────────────────────────────────────────────────

/// Utility classes for a frame's own layout, in cascade order.
///
/// Free-form frames get none; their children are positioned absolutely.
pub fn container_utilities(frame: &FrameProps, reg: &mut StyleRegistry) -> Vec<String> {
    match frame.layout_mode {
        LayoutMode::None => Vec::new(),
        LayoutMode::Grid => grid_utilities(frame, reg),
        LayoutMode::Horizontal | LayoutMode::Vertical => flex_utilities(frame, reg),
    }
}

fn flex_utilities(frame: &FrameProps, reg: &mut StyleRegistry) -> Vec<String> {
    let horizontal = frame.layout_mode == LayoutMode::Horizontal;
    let mut classes = vec![reg.intern_utility("flex", &[decl("display", "flex")])];

    classes.push(if horizontal {
        reg.intern_utility("flex-row", &[decl("flex-direction", "row")])
    } else {
        reg.intern_utility("flex-col", &[decl("flex-direction", "column")])
    });

    if frame.layout_wrap == LayoutWrap::Wrap {
        classes.push(reg.intern_utility("flex-wrap", &[decl("flex-wrap", "wrap")]));
        if frame.counter_axis_align_content == AlignContent::SpaceBetween {
            classes.push(reg.intern_utility(
                "content-between",
                &[decl("align-content", "space-between")],
            ));
        }
        if let Some(spacing) = frame.counter_axis_spacing.filter(|s| s.round() != 0.0) {
            // Wrapped rows stack vertically, wrapped columns horizontally.
            classes.push(if horizontal {
                numeric_utility(reg, "gap-y", spacing, &["row-gap"])
            } else {
                numeric_utility(reg, "gap-x", spacing, &["column-gap"])
            });
        }
    }

    // SPACE_BETWEEN distributes the free space itself.
    if frame.primary_axis_align_items != PrimaryAxisAlign::SpaceBetween
        && frame.item_spacing.round() != 0.0
    {
        let (prefix, property) = match (horizontal, frame.layout_wrap) {
            (true, LayoutWrap::Wrap) => ("gap-x", "column-gap"),
            (false, LayoutWrap::Wrap) => ("gap-y", "row-gap"),
            (_, LayoutWrap::NoWrap) => ("gap", "gap"),
        };
        classes.push(numeric_utility(reg, prefix, frame.item_spacing, &[property]));
    }

    classes.extend(padding_utilities(frame, reg));

    let (key, value) = justify(frame.primary_axis_align_items);
    classes.push(reg.intern_utility(key, &[decl("justify-content", value)]));
    let (key, value) = align(frame.counter_axis_align_items);
    classes.push(reg.intern_utility(key, &[decl("align-items", value)]));
    classes
}

fn grid_utilities(frame: &FrameProps, reg: &mut StyleRegistry) -> Vec<String> {
    let mut classes = vec![reg.intern_utility("grid", &[decl("display", "grid")])];

    if frame.grid_row_count > 0 {
        let n = frame.grid_row_count;
        classes.push(reg.intern_utility(
            &format!("grid-rows-{n}"),
            &[decl("grid-template-rows", format!("repeat({n}, minmax(0, 1fr))"))],
        ));
    }
    if frame.grid_column_count > 0 {
        let n = frame.grid_column_count;
        classes.push(reg.intern_utility(
            &format!("grid-cols-{n}"),
            &[decl("grid-template-columns", format!("repeat({n}, minmax(0, 1fr))"))],
        ));
    }

    let row_gap = frame.grid_row_gap.unwrap_or(frame.item_spacing);
    let column_gap = frame.grid_column_gap.unwrap_or(frame.item_spacing);
    if row_gap.round() == column_gap.round() {
        if row_gap.round() != 0.0 {
            classes.push(numeric_utility(reg, "gap", row_gap, &["gap"]));
        }
    } else {
        if row_gap.round() != 0.0 {
            classes.push(numeric_utility(reg, "gap-y", row_gap, &["row-gap"]));
        }
        if column_gap.round() != 0.0 {
            classes.push(numeric_utility(reg, "gap-x", column_gap, &["column-gap"]));
        }
    }

    classes.extend(padding_utilities(frame, reg));
    classes
}

/// One `p-N` class when all sides agree, else up to four directional
/// classes; zero sides are skipped.
fn padding_utilities(frame: &FrameProps, reg: &mut StyleRegistry) -> Vec<String> {
    let sides = [
        ("pt", "padding-top", frame.padding_top),
        ("pr", "padding-right", frame.padding_right),
        ("pb", "padding-bottom", frame.padding_bottom),
        ("pl", "padding-left", frame.padding_left),
    ];
    let first = sides[0].2;
    if sides.iter().all(|(_, _, v)| *v == first) {
        if first.round() == 0.0 {
            return Vec::new();
        }
        return vec![numeric_utility(reg, "p", first, &["padding"])];
    }
    sides
        .iter()
        .filter(|(_, _, v)| v.round() != 0.0)
        .map(|(prefix, property, v)| numeric_utility(reg, prefix, *v, &[*property]))
        .collect()
}

fn justify(align: PrimaryAxisAlign) -> (&'static str, &'static str) {
    match align {
        PrimaryAxisAlign::Min => ("justify-start", "flex-start"),
        PrimaryAxisAlign::Max => ("justify-end", "flex-end"),
        PrimaryAxisAlign::Center => ("justify-center", "center"),
        PrimaryAxisAlign::SpaceBetween => ("justify-between", "space-between"),
    }
}

fn align(align: Option<CounterAxisAlign>) -> (&'static str, &'static str) {
    match align {
        Some(CounterAxisAlign::Min) => ("items-start", "flex-start"),
        Some(CounterAxisAlign::Max) => ("items-end", "flex-end"),
        Some(CounterAxisAlign::Center) => ("items-center", "center"),
        Some(CounterAxisAlign::Baseline) => ("items-baseline", "baseline"),
        None => ("items-stretch", "stretch"),
    }
}

// ─── Sizing ──────────────────────────────────────────────────────────────

/// How one axis of a node is sized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeMode {
    /// Explicit pixel dimension.
    Fixed,
    /// Content-sized; no dimension emitted.
    Hug,
    /// Takes the parent's remaining space.
    Fill,
}

/// Where a node sits relative to its parent, as far as sizing cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// The converted root.
    Root,
    /// Normal-flow child of a flex frame with this primary axis.
    Flex(Axis),
    /// Normal-flow child of a grid frame.
    Grid,
    /// Absolutely positioned inside any container.
    Absolute,
}

/// Sizing outcome: utility classes plus dimension declarations for the
/// node's own class.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sizing {
    pub utilities: Vec<String>,
    pub declarations: Vec<Declaration>,
}

fn explicit_sizing(node: &SceneNode, axis: Axis) -> Option<LayoutSizing> {
    match axis {
        Axis::Horizontal => node.layout_sizing_horizontal,
        Axis::Vertical => node.layout_sizing_vertical,
    }
}

/// Sizing a node would choose on its own, without parent-driven fill.
fn intrinsic_mode(node: &SceneNode, axis: Axis) -> SizeMode {
    match &node.kind {
        NodeKind::Frame(frame) => match frame.primary_axis() {
            Some(primary) => {
                let mode = if primary == axis {
                    frame.primary_axis_sizing_mode
                } else {
                    frame.counter_axis_sizing_mode
                };
                match mode {
                    AxisSizingMode::Auto => SizeMode::Hug,
                    AxisSizingMode::Fixed => SizeMode::Fixed,
                }
            }
            None => SizeMode::Fixed,
        },
        NodeKind::Text(text) => match (text.text_auto_resize, axis) {
            (TextAutoResize::WidthAndHeight, _) => SizeMode::Hug,
            (TextAutoResize::Height, Axis::Vertical) => SizeMode::Hug,
            _ => SizeMode::Fixed,
        },
        _ => SizeMode::Fixed,
    }
}

/// Resolve the sizing mode of one axis.
///
/// Explicit per-axis sizing wins; inside a flex parent the legacy
/// `layoutGrow`/`layoutAlign` signals stand in when it is absent.
/// Free-form containers are always fixed.
pub fn axis_mode(node: &SceneNode, axis: Axis, placement: Placement) -> SizeMode {
    if node.is_container() && !node.is_auto_layout() {
        return SizeMode::Fixed;
    }
    let in_flow = matches!(placement, Placement::Flex(_) | Placement::Grid);

    if let Some(explicit) = explicit_sizing(node, axis) {
        return match explicit {
            LayoutSizing::Fixed => SizeMode::Fixed,
            LayoutSizing::Hug => SizeMode::Hug,
            LayoutSizing::Fill if in_flow => SizeMode::Fill,
            LayoutSizing::Fill => SizeMode::Fixed,
        };
    }

    if let Placement::Flex(primary) = placement {
        if primary == axis && node.layout_grow > 0.0 {
            return SizeMode::Fill;
        }
        if primary != axis && node.layout_align == LayoutAlign::Stretch {
            return SizeMode::Fill;
        }
    }
    intrinsic_mode(node, axis)
}

/// Resolve both axes into utilities and dimension declarations.
pub fn resolve_sizing(node: &SceneNode, placement: Placement, reg: &mut StyleRegistry) -> Sizing {
    let mut sizing = Sizing::default();
    let mut grow = false;
    let mut stretch = false;
    let mut shrink = false;

    for (axis, property, value) in [
        (Axis::Horizontal, "width", node.width),
        (Axis::Vertical, "height", node.height),
    ] {
        let mode = axis_mode(node, axis, placement);
        // Both edges pinned already define the size.
        if placement == Placement::Absolute && stretches(node, axis) {
            continue;
        }
        match (mode, placement) {
            (SizeMode::Fixed, Placement::Flex(primary)) => {
                sizing.declarations.push(decl(property, px(value)));
                shrink |= primary == axis;
            }
            (SizeMode::Fixed, _) => sizing.declarations.push(decl(property, px(value))),
            (SizeMode::Fill, Placement::Flex(primary)) if primary == axis => grow = true,
            (SizeMode::Fill, Placement::Flex(_)) => stretch = true,
            (SizeMode::Fill, _) | (SizeMode::Hug, _) => {}
        }
    }

    if grow {
        sizing.utilities.push(reg.intern_utility(
            "grow",
            &[decl("flex-grow", "1"), decl("flex-basis", "0")],
        ));
    }
    if stretch {
        sizing
            .utilities
            .push(reg.intern_utility("self-stretch", &[decl("align-self", "stretch")]));
    }
    if shrink {
        sizing
            .utilities
            .push(reg.intern_utility("shrink-0", &[decl("flex-shrink", "0")]));
    }
    log::trace!(
        "sizing {}: {} utilities, {} declarations",
        node.id,
        sizing.utilities.len(),
        sizing.declarations.len()
    );
    sizing
}

fn stretches(node: &SceneNode, axis: Axis) -> bool {
    let constraint = match axis {
        Axis::Horizontal => node.constraints.horizontal,
        Axis::Vertical => node.constraints.vertical,
    };
    constraint == ConstraintType::Stretch
}

/// `text-<size>` utility for a text node's font size.
pub fn text_size_utility(font_size: f32, reg: &mut StyleRegistry) -> String {
    numeric_utility(reg, "text", font_size, &["font-size"])
}

/// Placement of the children of a container node.
pub fn child_placement(parent: &SceneNode, child: &SceneNode) -> Placement {
    if child.is_absolute() {
        return Placement::Absolute;
    }
    match parent.frame_props().map(|f| f.layout_mode) {
        Some(LayoutMode::Horizontal) => Placement::Flex(Axis::Horizontal),
        Some(LayoutMode::Vertical) => Placement::Flex(Axis::Vertical),
        Some(LayoutMode::Grid) => Placement::Grid,
        Some(LayoutMode::None) | None => Placement::Absolute,
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────
