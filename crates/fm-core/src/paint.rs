//! Paint/effect resolver: fills, gradients, strokes, shadows, blurs, blend
//! modes and gradient mask images → CSS values.

use crate::config::ConvertConfig;
use crate::css::{Declaration, decl, format_num, pct, px};
use crate::model::*;
use kurbo::{Affine, Point, Vec2};

// ─── Colors ──────────────────────────────────────────────────────────────

/// Render a color with an extra opacity multiplier: hex when opaque,
/// otherwise `rgba()` with a two-decimal alpha.
pub fn color_value(color: Color, opacity: f32, config: &ConvertConfig) -> String {
    let alpha = (color.a * opacity).clamp(0.0, 1.0);
    if config.is_opaque(alpha) {
        color.to_hex()
    } else {
        let (r, g, b) = color.rgb_bytes();
        format!("rgba({r}, {g}, {b}, {alpha:.2})")
    }
}

// ─── Fills ───────────────────────────────────────────────────────────────

/// First visible paint of a list.
pub fn first_visible(paints: &[Paint]) -> Option<&Paint> {
    paints.iter().find(|p| p.visible)
}

/// CSS value for a single solid or gradient paint; `None` for images.
pub fn paint_value(paint: &Paint, config: &ConvertConfig) -> Option<String> {
    match &paint.kind {
        PaintKind::Solid { color } => Some(color_value(*color, paint.opacity, config)),
        PaintKind::LinearGradient(g) => Some(linear_gradient(g, paint.opacity, config)),
        PaintKind::RadialGradient(g) | PaintKind::DiamondGradient(g) => {
            Some(radial_gradient(g, paint.opacity, config))
        }
        PaintKind::ConicGradient(g) => Some(conic_gradient(g, paint.opacity, config)),
        PaintKind::Image => None,
    }
}

/// Background value for a paint list.
///
/// The first visible solid or gradient paint wins. When only image paints
/// are visible the configured placeholder color stands in for them.
pub fn fill_value(fills: &[Paint], config: &ConvertConfig) -> Option<String> {
    let visible = || fills.iter().filter(|p| p.visible);
    if let Some(value) = visible().find_map(|p| paint_value(p, config)) {
        return Some(value);
    }
    visible()
        .any(|p| matches!(p.kind, PaintKind::Image))
        .then(|| config.placeholder_color.clone())
}

/// Background value of a node's own fills.
pub fn fill_declaration(node: &SceneNode, config: &ConvertConfig) -> Option<String> {
    fill_value(&node.fills, config)
}

/// First visible solid or gradient fill, used to decide how text and masks
/// consume the fill.
pub fn primary_fill(fills: &[Paint]) -> Option<&Paint> {
    fills
        .iter()
        .find(|p| p.visible && (p.is_solid() || p.is_gradient()))
}

// ─── Gradients ───────────────────────────────────────────────────────────

/// Gradient-space → node-space mapping as a kurbo affine.
fn to_affine(t: &GradientTransform) -> Affine {
    Affine::new([
        t.a() as f64,
        t.c() as f64,
        t.b() as f64,
        t.d() as f64,
        t.tx() as f64,
        t.ty() as f64,
    ])
}

fn normalize_degrees(angle: f64) -> f32 {
    angle.rem_euclid(360.0) as f32
}

fn stop_list(
    stops: &[GradientStop],
    mut color: impl FnMut(&GradientStop) -> String,
) -> String {
    stops
        .iter()
        .map(|stop| format!("{} {}", color(stop), pct(stop.position * 100.0)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// CSS angle of a linear gradient. The host's y axis points the other way
/// round, hence the half turn.
pub fn linear_angle(t: &GradientTransform) -> f32 {
    let raw = (t.a() as f64).atan2(-(t.c() as f64)).to_degrees();
    normalize_degrees(raw + 180.0)
}

/// Gradient center in node space, as percentages of the box.
fn gradient_center(t: &GradientTransform) -> (f32, f32) {
    let affine = to_affine(t);
    if affine.determinant().abs() < 1e-9 {
        return (50.0, 50.0);
    }
    let center = affine.inverse() * Point::new(0.5, 0.5);
    ((center.x * 100.0) as f32, (center.y * 100.0) as f32)
}

/// Horizontal and vertical radii in node space, as percentages.
fn gradient_radii(t: &GradientTransform) -> (f32, f32) {
    let affine = to_affine(t);
    if affine.determinant().abs() < 1e-9 {
        return (50.0, 50.0);
    }
    let inv = affine.inverse();
    let [a, b, c, d, _, _] = inv.as_coeffs();
    let rx = Vec2::new(a, b).hypot() * 0.5;
    let ry = Vec2::new(c, d).hypot() * 0.5;
    ((rx * 100.0) as f32, (ry * 100.0) as f32)
}

pub fn linear_gradient(g: &Gradient, opacity: f32, config: &ConvertConfig) -> String {
    let angle = linear_angle(&g.gradient_transform);
    let stops = stop_list(&g.gradient_stops, |s| color_value(s.color, opacity, config));
    format!("linear-gradient({}deg, {stops})", format_num(angle))
}

/// Radial (and diamond) gradient. Radii within five percentage points of
/// each other render as a circle.
pub fn radial_gradient(g: &Gradient, opacity: f32, config: &ConvertConfig) -> String {
    let (cx, cy) = gradient_center(&g.gradient_transform);
    let (rx, ry) = gradient_radii(&g.gradient_transform);
    let stops = stop_list(&g.gradient_stops, |s| color_value(s.color, opacity, config));
    if (rx - ry).abs() < 5.0 {
        format!(
            "radial-gradient(circle closest-side at {} {}, {stops})",
            pct(cx),
            pct(cy)
        )
    } else {
        format!(
            "radial-gradient(ellipse {} {} at {} {}, {stops})",
            pct(rx),
            pct(ry),
            pct(cx),
            pct(cy)
        )
    }
}

/// Conic "from" angle of an angular gradient.
pub fn conic_angle(t: &GradientTransform) -> f32 {
    let raw = (-(t.c() as f64)).atan2(t.a() as f64).to_degrees();
    normalize_degrees(raw + 180.0)
}

pub fn conic_gradient(g: &Gradient, opacity: f32, config: &ConvertConfig) -> String {
    let angle = conic_angle(&g.gradient_transform);
    let (cx, cy) = gradient_center(&g.gradient_transform);
    let stops = stop_list(&g.gradient_stops, |s| color_value(s.color, opacity, config));
    format!(
        "conic-gradient(from {}deg at {} {}, {stops})",
        format_num(angle),
        pct(cx),
        pct(cy)
    )
}

// ─── Mask images ─────────────────────────────────────────────────────────

/// `mask-image` value for a mask node whose fill is a gradient.
///
/// Luminance masks turn each stop into black with the stop's luminance as
/// alpha; alpha and vector masks use the stop colors as they are.
pub fn mask_image_value(node: &SceneNode, config: &ConvertConfig) -> Option<String> {
    let paint = primary_fill(&node.fills).filter(|p| p.is_gradient())?;
    if node.mask_type != MaskType::Luminance {
        return paint_value(paint, config);
    }

    let luminance_stop = |s: &GradientStop| {
        let alpha = (s.color.luminance() * s.color.a * paint.opacity).clamp(0.0, 1.0);
        format!("rgba(0, 0, 0, {alpha:.2})")
    };
    let value = match &paint.kind {
        PaintKind::LinearGradient(g) => format!(
            "linear-gradient({}deg, {})",
            format_num(linear_angle(&g.gradient_transform)),
            stop_list(&g.gradient_stops, luminance_stop)
        ),
        PaintKind::RadialGradient(g) | PaintKind::DiamondGradient(g) => {
            let (cx, cy) = gradient_center(&g.gradient_transform);
            let (rx, ry) = gradient_radii(&g.gradient_transform);
            format!(
                "radial-gradient(ellipse {} {} at {} {}, {})",
                pct(rx),
                pct(ry),
                pct(cx),
                pct(cy),
                stop_list(&g.gradient_stops, luminance_stop)
            )
        }
        PaintKind::ConicGradient(g) => {
            let (cx, cy) = gradient_center(&g.gradient_transform);
            format!(
                "conic-gradient(from {}deg at {} {}, {})",
                format_num(conic_angle(&g.gradient_transform)),
                pct(cx),
                pct(cy),
                stop_list(&g.gradient_stops, luminance_stop)
            )
        }
        PaintKind::Solid { .. } | PaintKind::Image => return None,
    };
    Some(value)
}

// ─── Corners ─────────────────────────────────────────────────────────────

/// `border-radius` value, or `None` for square corners.
pub fn radius_value(radius: CornerRadius) -> Option<String> {
    match radius {
        CornerRadius::None => None,
        CornerRadius::Uniform(r) => Some(px(r)),
        CornerRadius::PerCorner([tl, tr, br, bl]) => {
            Some(format!("{} {} {} {}", px(tl), px(tr), px(br), px(bl)))
        }
    }
}

// ─── Strokes ─────────────────────────────────────────────────────────────

/// How the first visible solid stroke is reproduced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrokeStyle {
    /// INSIDE: an inset box-shadow of the stroke width.
    InsetShadow(String),
    /// OUTSIDE: a zero-offset outline.
    Outline(Vec<Declaration>),
    /// CENTER: a real border.
    Border(Declaration),
}

pub fn stroke_style(node: &SceneNode, config: &ConvertConfig) -> Option<StrokeStyle> {
    if node.stroke_weight <= 0.0 {
        return None;
    }
    let paint = node.strokes.iter().find(|p| p.visible && p.is_solid())?;
    let PaintKind::Solid { color } = paint.kind else {
        return None;
    };
    let color = color_value(color, paint.opacity, config);
    let width = px(node.stroke_weight);

    Some(match node.stroke_align {
        StrokeAlign::Inside => StrokeStyle::InsetShadow(format!("inset 0 0 0 {width} {color}")),
        StrokeAlign::Outside => StrokeStyle::Outline(vec![
            decl("outline", format!("{width} solid {color}")),
            decl("outline-offset", "0"),
        ]),
        StrokeAlign::Center => StrokeStyle::Border(decl("border", format!("{width} solid {color}"))),
    })
}

// ─── Effects ─────────────────────────────────────────────────────────────

fn box_shadow(shadow: &Shadow, inset: bool, config: &ConvertConfig) -> String {
    format!(
        "{}{} {} {} {} {}",
        if inset { "inset " } else { "" },
        px(shadow.offset.x),
        px(shadow.offset.y),
        px(shadow.radius),
        px(shadow.spread),
        color_value(shadow.color, 1.0, config)
    )
}

/// Visible drop and inner shadows in paint order, as `box-shadow` layers.
pub fn box_shadows(node: &SceneNode, config: &ConvertConfig) -> Vec<String> {
    node.effects
        .iter()
        .filter(|e| e.visible)
        .filter_map(|e| match &e.kind {
            EffectKind::DropShadow(s) => Some(box_shadow(s, false, config)),
            EffectKind::InnerShadow(s) => Some(box_shadow(s, true, config)),
            _ => None,
        })
        .collect()
}

/// Visible drop shadows as `text-shadow` layers. Text has no inset shadow.
pub fn text_shadows(node: &SceneNode, config: &ConvertConfig) -> Vec<String> {
    node.effects
        .iter()
        .filter(|e| e.visible)
        .filter_map(|e| match &e.kind {
            EffectKind::DropShadow(s) => Some(format!(
                "{} {} {} {}",
                px(s.offset.x),
                px(s.offset.y),
                px(s.radius),
                color_value(s.color, 1.0, config)
            )),
            _ => None,
        })
        .collect()
}

/// `filter` and `backdrop-filter` from the last visible blur of each kind.
///
/// The host's blur radius reads as a diameter; CSS blur takes a
/// sigma-like radius, so both are halved.
pub fn blur_declarations(node: &SceneNode) -> Vec<Declaration> {
    let last_radius = |want_layer: bool| {
        node.effects
            .iter()
            .filter(|e| e.visible)
            .filter_map(|e| match e.kind {
                EffectKind::LayerBlur { radius } if want_layer => Some(radius),
                EffectKind::BackgroundBlur { radius } if !want_layer => Some(radius),
                _ => None,
            })
            .last()
    };

    let mut decls = Vec::new();
    if let Some(radius) = last_radius(true) {
        decls.push(decl("filter", format!("blur({})", px(radius / 2.0))));
    }
    if let Some(radius) = last_radius(false) {
        decls.push(decl("backdrop-filter", format!("blur({})", px(radius / 2.0))));
    }
    decls
}

// ─── Blending & opacity ──────────────────────────────────────────────────

/// `mix-blend-mode` keyword. Normal and pass-through are the default and
/// yield `None`, as do modes CSS cannot express.
pub fn blend_mode_value(mode: BlendMode) -> Option<&'static str> {
    match mode {
        BlendMode::PassThrough | BlendMode::Normal => None,
        BlendMode::Darken => Some("darken"),
        BlendMode::Multiply => Some("multiply"),
        BlendMode::ColorBurn => Some("color-burn"),
        BlendMode::Lighten => Some("lighten"),
        BlendMode::Screen => Some("screen"),
        BlendMode::ColorDodge => Some("color-dodge"),
        BlendMode::Overlay => Some("overlay"),
        BlendMode::SoftLight => Some("soft-light"),
        BlendMode::HardLight => Some("hard-light"),
        BlendMode::Difference => Some("difference"),
        BlendMode::Exclusion => Some("exclusion"),
        BlendMode::Hue => Some("hue"),
        BlendMode::Saturation => Some("saturation"),
        BlendMode::Color => Some("color"),
        BlendMode::Luminosity => Some("luminosity"),
        BlendMode::LinearBurn | BlendMode::LinearDodge => {
            log::debug!("blend mode {mode:?} has no CSS keyword, omitted");
            None
        }
    }
}

/// Layer-level `opacity` and `mix-blend-mode`.
pub fn layer_declarations(node: &SceneNode, config: &ConvertConfig) -> Vec<Declaration> {
    let mut decls = Vec::new();
    if !config.is_opaque(node.opacity) {
        decls.push(decl("opacity", format_num(node.opacity)));
    }
    if let Some(mode) = blend_mode_value(node.blend_mode) {
        decls.push(decl("mix-blend-mode", mode));
    }
    decls
}

/// Everything a box-shaped node paints: background, stroke, corners,
/// shadows, blurs, opacity and blending.
pub fn box_declarations(node: &SceneNode, config: &ConvertConfig) -> Vec<Declaration> {
    let mut decls = Vec::new();
    if let Some(background) = fill_declaration(node, config) {
        decls.push(decl("background", background));
    }

    let mut shadows = Vec::new();
    match stroke_style(node, config) {
        Some(StrokeStyle::InsetShadow(shadow)) => shadows.push(shadow),
        Some(StrokeStyle::Outline(outline)) => decls.extend(outline),
        Some(StrokeStyle::Border(border)) => decls.push(border),
        None => {}
    }

    if let Some(radius) = radius_value(node.corner_radius()) {
        decls.push(decl("border-radius", radius));
    }

    shadows.extend(box_shadows(node, config));
    if !shadows.is_empty() {
        decls.push(decl("box-shadow", shadows.join(", ")));
    }

    decls.extend(blur_declarations(node));
    decls.extend(layer_declarations(node, config));
    decls
}

// ─── Tests ───────────────────────────────────────────────────────────────
