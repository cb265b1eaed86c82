//! Design-tree data model.
//!
//! A conversion reads a tree of `SceneNode` values owned by the caller.
//! The shapes mirror the host design-tool plugin API closely enough that a
//! JSON dump of a selection deserializes directly (camelCase keys,
//! SCREAMING_SNAKE_CASE enum values, unknown keys ignored).

use crate::id::NodeId;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

fn yes() -> bool {
    true
}

fn one() -> f32 {
    1.0
}

// ─── Colors & Paint ──────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × f32 [0.0, 1.0]; alpha defaults to opaque.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    #[serde(default = "one")]
    pub a: f32,
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Channels scaled to 0..=255.
    pub fn rgb_bytes(&self) -> (u8, u8, u8) {
        let byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        (byte(self.r), byte(self.g), byte(self.b))
    }

    /// `#RRGGBB`, alpha ignored.
    pub fn to_hex(&self) -> String {
        let (r, g, b) = self.rgb_bytes();
        format!("#{r:02X}{g:02X}{b:02X}")
    }

    /// Relative luminance (Rec. 709 weights) in 0..=1.
    pub fn luminance(&self) -> f32 {
        0.2126 * self.r + 0.7152 * self.g + 0.0722 * self.b
    }

    #[must_use]
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

/// A gradient stop; `position` is in 0.0 ..= 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub position: f32,
    pub color: Color,
}

/// 2×3 affine `[[a, b, tx], [c, d, ty]]` from gradient space to node-local
/// (unit square) space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientTransform(pub [[f32; 3]; 2]);

impl Default for GradientTransform {
    fn default() -> Self {
        Self([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]])
    }
}

impl GradientTransform {
    pub fn a(&self) -> f32 {
        self.0[0][0]
    }
    pub fn b(&self) -> f32 {
        self.0[0][1]
    }
    pub fn tx(&self) -> f32 {
        self.0[0][2]
    }
    pub fn c(&self) -> f32 {
        self.0[1][0]
    }
    pub fn d(&self) -> f32 {
        self.0[1][1]
    }
    pub fn ty(&self) -> f32 {
        self.0[1][2]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gradient {
    #[serde(default)]
    pub gradient_stops: Vec<GradientStop>,
    #[serde(default)]
    pub gradient_transform: GradientTransform,
}

/// What a paint draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaintKind {
    Solid {
        color: Color,
    },
    #[serde(rename = "GRADIENT_LINEAR")]
    LinearGradient(Gradient),
    #[serde(rename = "GRADIENT_RADIAL")]
    RadialGradient(Gradient),
    #[serde(rename = "GRADIENT_ANGULAR")]
    ConicGradient(Gradient),
    #[serde(rename = "GRADIENT_DIAMOND")]
    DiamondGradient(Gradient),
    /// Bitmap content; never reproduced, only signalled.
    Image,
}

/// A fill or stroke paint layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paint {
    #[serde(flatten)]
    pub kind: PaintKind,
    #[serde(default = "yes")]
    pub visible: bool,
    #[serde(default = "one")]
    pub opacity: f32,
}

impl Paint {
    pub fn solid(color: Color) -> Self {
        Self {
            kind: PaintKind::Solid { color },
            visible: true,
            opacity: 1.0,
        }
    }

    pub fn is_solid(&self) -> bool {
        matches!(self.kind, PaintKind::Solid { .. })
    }

    pub fn is_gradient(&self) -> bool {
        matches!(
            self.kind,
            PaintKind::LinearGradient(_)
                | PaintKind::RadialGradient(_)
                | PaintKind::ConicGradient(_)
                | PaintKind::DiamondGradient(_)
        )
    }
}

// ─── Stroke ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrokeAlign {
    Inside,
    Outside,
    #[default]
    Center,
}

// ─── Effects ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shadow {
    pub color: Color,
    #[serde(default)]
    pub offset: Vector,
    #[serde(default)]
    pub radius: f32,
    #[serde(default)]
    pub spread: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EffectKind {
    DropShadow(Shadow),
    InnerShadow(Shadow),
    LayerBlur { radius: f32 },
    BackgroundBlur { radius: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    #[serde(flatten)]
    pub kind: EffectKind,
    #[serde(default = "yes")]
    pub visible: bool,
}

// ─── Blending & masking ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlendMode {
    #[default]
    PassThrough,
    Normal,
    Darken,
    Multiply,
    LinearBurn,
    ColorBurn,
    Lighten,
    Screen,
    LinearDodge,
    ColorDodge,
    Overlay,
    SoftLight,
    HardLight,
    Difference,
    Exclusion,
    Hue,
    Saturation,
    Color,
    Luminosity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaskType {
    #[default]
    Alpha,
    Vector,
    Luminance,
}

// ─── Positioning & sizing ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConstraintType {
    /// `SCALE` has no box-layout counterpart and anchors like `MIN`.
    #[default]
    #[serde(alias = "SCALE")]
    Min,
    Max,
    Center,
    Stretch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Constraints {
    #[serde(default)]
    pub horizontal: ConstraintType,
    #[serde(default)]
    pub vertical: ConstraintType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LayoutPositioning {
    #[default]
    Auto,
    Absolute,
}

/// Explicit per-axis sizing of a node inside (or as) an auto-layout frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LayoutSizing {
    Fixed,
    Hug,
    Fill,
}

/// Legacy counter-axis alignment of a child; only `STRETCH` matters here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LayoutAlign {
    Stretch,
    #[default]
    #[serde(other)]
    Inherit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Axis-aligned box, in document space for `absoluteBoundingBox`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Resolved corner rounding of a box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CornerRadius {
    None,
    Uniform(f32),
    /// top-left, top-right, bottom-right, bottom-left.
    PerCorner([f32; 4]),
}

// ─── Frame ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LayoutMode {
    #[default]
    None,
    Horizontal,
    Vertical,
    Grid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrimaryAxisAlign {
    #[default]
    Min,
    Max,
    Center,
    SpaceBetween,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CounterAxisAlign {
    Min,
    Max,
    Center,
    Baseline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AxisSizingMode {
    #[default]
    Fixed,
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LayoutWrap {
    #[default]
    NoWrap,
    Wrap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlignContent {
    #[default]
    Auto,
    SpaceBetween,
}

/// Frame / component / instance container properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FrameProps {
    pub layout_mode: LayoutMode,
    pub item_spacing: f32,
    pub padding_top: f32,
    pub padding_right: f32,
    pub padding_bottom: f32,
    pub padding_left: f32,
    pub primary_axis_align_items: PrimaryAxisAlign,
    /// Absent means children stretch across the counter axis.
    pub counter_axis_align_items: Option<CounterAxisAlign>,
    pub primary_axis_sizing_mode: AxisSizingMode,
    pub counter_axis_sizing_mode: AxisSizingMode,
    pub layout_wrap: LayoutWrap,
    pub counter_axis_spacing: Option<f32>,
    pub counter_axis_align_content: AlignContent,
    pub grid_row_count: u32,
    pub grid_column_count: u32,
    pub grid_row_gap: Option<f32>,
    pub grid_column_gap: Option<f32>,
    pub clips_content: bool,
    /// Earlier children stack above later ones.
    pub item_reverse_z_index: bool,
}

impl FrameProps {
    /// Whether children participate in a flex/grid flow.
    pub fn is_auto_layout(&self) -> bool {
        self.layout_mode != LayoutMode::None
    }

    /// Main axis of a flex frame; `None` for free-form and grid frames.
    pub fn primary_axis(&self) -> Option<Axis> {
        match self.layout_mode {
            LayoutMode::Horizontal => Some(Axis::Horizontal),
            LayoutMode::Vertical => Some(Axis::Vertical),
            LayoutMode::None | LayoutMode::Grid => None,
        }
    }
}

// ─── Text ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontName {
    pub family: String,
    pub style: String,
}

impl Default for FontName {
    fn default() -> Self {
        Self {
            family: "Inter".into(),
            style: "Regular".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "unit", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineHeight {
    #[default]
    Auto,
    Percent {
        value: f32,
    },
    Pixels {
        value: f32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LetterSpacing {
    Percent { value: f32 },
    Pixels { value: f32 },
}

impl Default for LetterSpacing {
    fn default() -> Self {
        LetterSpacing::Pixels { value: 0.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TextCase {
    #[default]
    Original,
    Upper,
    Lower,
    Title,
    SmallCaps,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TextDecoration {
    #[default]
    None,
    Underline,
    Strikethrough,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TextAutoResize {
    #[default]
    None,
    WidthAndHeight,
    Height,
    Truncate,
}

/// A contiguous character range sharing one fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSegment {
    pub characters: String,
    #[serde(default)]
    pub fills: SmallVec<[Paint; 1]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextProps {
    pub characters: String,
    pub font_name: FontName,
    pub font_size: f32,
    pub line_height: LineHeight,
    pub letter_spacing: LetterSpacing,
    pub text_align_horizontal: TextAlign,
    pub text_case: TextCase,
    pub text_decoration: TextDecoration,
    pub paragraph_spacing: f32,
    pub text_auto_resize: TextAutoResize,
    /// Present only when the fill varies across the text.
    pub segments: Vec<TextSegment>,
}

impl Default for TextProps {
    fn default() -> Self {
        Self {
            characters: String::new(),
            font_name: FontName::default(),
            font_size: 12.0,
            line_height: LineHeight::default(),
            letter_spacing: LetterSpacing::default(),
            text_align_horizontal: TextAlign::default(),
            text_case: TextCase::default(),
            text_decoration: TextDecoration::default(),
            paragraph_spacing: 0.0,
            text_auto_resize: TextAutoResize::default(),
            segments: Vec::new(),
        }
    }
}

// ─── Scene Nodes ─────────────────────────────────────────────────────────

/// The node variants the compiler distinguishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    /// Frame, component and instance containers behave identically.
    #[serde(alias = "COMPONENT", alias = "INSTANCE", alias = "COMPONENT_SET")]
    Frame(FrameProps),

    /// Free-form container sized to its children's bounding box.
    Group,

    Text(TextProps),

    Rectangle,

    Ellipse,

    /// Vector, line, polygon, star and boolean-operation shapes.
    #[serde(
        rename = "VECTOR",
        alias = "LINE",
        alias = "POLYGON",
        alias = "STAR",
        alias = "BOOLEAN_OPERATION"
    )]
    VectorLike,
}

/// A single node of the design tree. Children are owned and ordered
/// bottom-most first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneNode {
    pub id: NodeId,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub kind: NodeKind,

    #[serde(default = "yes")]
    pub visible: bool,
    #[serde(default = "one")]
    pub opacity: f32,
    #[serde(default)]
    pub blend_mode: BlendMode,
    /// Degrees, counter-clockwise positive.
    #[serde(default)]
    pub rotation: f32,

    /// Parent-local position.
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    #[serde(default)]
    pub absolute_bounding_box: Option<Bounds>,

    #[serde(default)]
    pub corner_radius: Option<f32>,
    #[serde(default)]
    pub top_left_radius: Option<f32>,
    #[serde(default)]
    pub top_right_radius: Option<f32>,
    #[serde(default)]
    pub bottom_right_radius: Option<f32>,
    #[serde(default)]
    pub bottom_left_radius: Option<f32>,

    #[serde(default)]
    pub children: Vec<SceneNode>,

    #[serde(default)]
    pub fills: SmallVec<[Paint; 1]>,
    #[serde(default)]
    pub strokes: SmallVec<[Paint; 1]>,
    #[serde(default)]
    pub stroke_weight: f32,
    #[serde(default)]
    pub stroke_align: StrokeAlign,
    #[serde(default)]
    pub effects: SmallVec<[Effect; 2]>,

    #[serde(default)]
    pub is_mask: bool,
    #[serde(default)]
    pub mask_type: MaskType,

    #[serde(default)]
    pub layout_positioning: LayoutPositioning,
    #[serde(default)]
    pub constraints: Constraints,
    #[serde(default)]
    pub layout_sizing_horizontal: Option<LayoutSizing>,
    #[serde(default)]
    pub layout_sizing_vertical: Option<LayoutSizing>,
    #[serde(default)]
    pub layout_grow: f32,
    #[serde(default)]
    pub layout_align: LayoutAlign,
}

impl SceneNode {
    pub fn new(id: &str, name: &str, kind: NodeKind) -> Self {
        Self {
            id: NodeId::intern(id),
            name: name.to_string(),
            kind,
            visible: true,
            opacity: 1.0,
            blend_mode: BlendMode::default(),
            rotation: 0.0,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            absolute_bounding_box: None,
            corner_radius: None,
            top_left_radius: None,
            top_right_radius: None,
            bottom_right_radius: None,
            bottom_left_radius: None,
            children: Vec::new(),
            fills: SmallVec::new(),
            strokes: SmallVec::new(),
            stroke_weight: 0.0,
            stroke_align: StrokeAlign::default(),
            effects: SmallVec::new(),
            is_mask: false,
            mask_type: MaskType::default(),
            layout_positioning: LayoutPositioning::default(),
            constraints: Constraints::default(),
            layout_sizing_horizontal: None,
            layout_sizing_vertical: None,
            layout_grow: 0.0,
            layout_align: LayoutAlign::default(),
        }
    }

    #[must_use]
    pub fn with_frame(mut self, x: f32, y: f32, width: f32, height: f32) -> Self {
        self.x = x;
        self.y = y;
        self.width = width;
        self.height = height;
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn with_fill(mut self, paint: Paint) -> Self {
        self.fills.push(paint);
        self
    }

    pub fn frame_props(&self) -> Option<&FrameProps> {
        match &self.kind {
            NodeKind::Frame(props) => Some(props),
            _ => None,
        }
    }

    pub fn text_props(&self) -> Option<&TextProps> {
        match &self.kind {
            NodeKind::Text(props) => Some(props),
            _ => None,
        }
    }

    /// Frames and groups hold children.
    pub fn is_container(&self) -> bool {
        matches!(self.kind, NodeKind::Frame(_) | NodeKind::Group)
    }

    /// Shapes realized through the external vector export.
    pub fn is_vector_like(&self) -> bool {
        matches!(self.kind, NodeKind::Ellipse | NodeKind::VectorLike)
    }

    pub fn is_auto_layout(&self) -> bool {
        self.frame_props().is_some_and(FrameProps::is_auto_layout)
    }

    pub fn is_rotated(&self, epsilon: f32) -> bool {
        self.rotation.abs() >= epsilon
    }

    pub fn is_absolute(&self) -> bool {
        self.layout_positioning == LayoutPositioning::Absolute
    }

    /// Per-corner radii win over the uniform radius when any is non-zero
    /// and they differ.
    pub fn corner_radius(&self) -> CornerRadius {
        let uniform = self.corner_radius.unwrap_or(0.0);
        let corners = [
            self.top_left_radius.unwrap_or(uniform),
            self.top_right_radius.unwrap_or(uniform),
            self.bottom_right_radius.unwrap_or(uniform),
            self.bottom_left_radius.unwrap_or(uniform),
        ];
        if corners.iter().all(|r| *r == corners[0]) {
            if corners[0] > 0.0 {
                CornerRadius::Uniform(corners[0])
            } else {
                CornerRadius::None
            }
        } else {
            CornerRadius::PerCorner(corners)
        }
    }

    /// Whether every numeric field that feeds geometry is finite.
    pub fn has_finite_geometry(&self) -> bool {
        let bbox_ok = self.absolute_bounding_box.is_none_or(|b| {
            b.x.is_finite() && b.y.is_finite() && b.width.is_finite() && b.height.is_finite()
        });
        bbox_ok
            && [
                self.x,
                self.y,
                self.width,
                self.height,
                self.rotation,
                self.opacity,
            ]
            .iter()
            .all(|v| v.is_finite())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────
