//! Text styling and text-level markup.

use crate::config::ConvertConfig;
use crate::css::{Declaration, decl, format_num, pct, px};
use crate::layout::format_negative_class_value;
use crate::markup::{Element, Markup};
use crate::model::*;
use crate::paint::{color_value, paint_value, primary_fill};
use crate::registry::StyleRegistry;

/// Numeric weight named by a font style such as `"Semi Bold Italic"`.
pub fn font_weight(style: &str) -> u16 {
    let style: String = style
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();
    // Compound names first so "extrabold" never reads as "bold".
    const WEIGHTS: &[(&str, u16)] = &[
        ("hairline", 100),
        ("thin", 100),
        ("extralight", 200),
        ("ultralight", 200),
        ("semibold", 600),
        ("demibold", 600),
        ("extrabold", 800),
        ("ultrabold", 800),
        ("light", 300),
        ("medium", 500),
        ("bold", 700),
        ("black", 900),
        ("heavy", 900),
    ];
    WEIGHTS
        .iter()
        .find(|(name, _)| style.contains(name))
        .map_or(400, |(_, weight)| *weight)
}

pub fn is_italic(style: &str) -> bool {
    let style = style.to_lowercase();
    style.contains("italic") || style.contains("oblique")
}

/// Paint of one run of text: a plain color, or a gradient clipped to the
/// glyphs.
fn text_paint(fills: &[Paint], config: &ConvertConfig) -> Vec<Declaration> {
    match primary_fill(fills) {
        Some(paint) if paint.is_gradient() => match paint_value(paint, config) {
            Some(gradient) => vec![
                decl("background", gradient),
                decl("-webkit-background-clip", "text"),
                decl("background-clip", "text"),
                decl("color", "transparent"),
            ],
            None => Vec::new(),
        },
        Some(paint) => match paint.kind {
            PaintKind::Solid { color } => vec![decl("color", color_value(color, paint.opacity, config))],
            _ => Vec::new(),
        },
        None if fills.iter().any(|p| p.visible) => {
            vec![decl("color", config.placeholder_color.clone())]
        }
        None => Vec::new(),
    }
}

/// Typography declarations of a text node's own class.
pub fn text_declarations(
    node: &SceneNode,
    props: &TextProps,
    config: &ConvertConfig,
) -> Vec<Declaration> {
    let mut decls = vec![decl(
        "font-family",
        format!("\"{}\", sans-serif", props.font_name.family),
    )];

    let weight = font_weight(&props.font_name.style);
    if weight != 400 {
        decls.push(decl("font-weight", weight.to_string()));
    }
    if is_italic(&props.font_name.style) {
        decls.push(decl("font-style", "italic"));
    }

    match props.line_height {
        LineHeight::Auto => {}
        LineHeight::Percent { value } => decls.push(decl("line-height", pct(value))),
        LineHeight::Pixels { value } => decls.push(decl("line-height", px(value))),
    }
    match props.letter_spacing {
        LetterSpacing::Percent { value } if value != 0.0 => {
            decls.push(decl("letter-spacing", format!("{}em", format_num(value / 100.0))));
        }
        LetterSpacing::Pixels { value } if value != 0.0 => {
            decls.push(decl("letter-spacing", px(value)));
        }
        _ => {}
    }

    match props.text_align_horizontal {
        TextAlign::Left => {}
        TextAlign::Center => decls.push(decl("text-align", "center")),
        TextAlign::Right => decls.push(decl("text-align", "right")),
        TextAlign::Justified => decls.push(decl("text-align", "justify")),
    }
    match props.text_case {
        TextCase::Original => {}
        TextCase::Upper => decls.push(decl("text-transform", "uppercase")),
        TextCase::Lower => decls.push(decl("text-transform", "lowercase")),
        TextCase::Title => decls.push(decl("text-transform", "capitalize")),
        TextCase::SmallCaps => decls.push(decl("font-variant", "small-caps")),
    }
    match props.text_decoration {
        TextDecoration::None => {}
        TextDecoration::Underline => decls.push(decl("text-decoration", "underline")),
        TextDecoration::Strikethrough => decls.push(decl("text-decoration", "line-through")),
    }
    match props.text_auto_resize {
        TextAutoResize::WidthAndHeight => decls.push(decl("white-space", "nowrap")),
        TextAutoResize::Truncate => {
            decls.push(decl("overflow", "hidden"));
            decls.push(decl("text-overflow", "ellipsis"));
            decls.push(decl("white-space", "nowrap"));
        }
        TextAutoResize::None | TextAutoResize::Height => {}
    }

    // Styled segments carry their own paint.
    if props.segments.is_empty() {
        decls.extend(text_paint(&node.fills, config));
    }
    decls
}

/// Lines of `text` separated by explicit breaks.
fn lines(text: &str) -> Vec<Markup> {
    let mut out = Vec::new();
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push(Markup::LineBreak);
        }
        if !line.is_empty() {
            out.push(Markup::Text(line.to_string()));
        }
    }
    out
}

/// Children of a text element.
///
/// Styled segments become inline spans with their own paint. Otherwise,
/// with paragraph spacing, each paragraph becomes a block span with a
/// bottom margin; without it, newlines become `<br />`.
pub fn text_content(props: &TextProps, reg: &mut StyleRegistry, config: &ConvertConfig) -> Vec<Markup> {
    if !props.segments.is_empty() {
        return props
            .segments
            .iter()
            .flat_map(|segment| {
                let style = text_paint(&segment.fills, config);
                if style.is_empty() {
                    return lines(&segment.characters);
                }
                let mut span = Element::new("span").with_style(style);
                span.children = lines(&segment.characters);
                vec![Markup::Element(span)]
            })
            .collect();
    }

    let paragraphs: Vec<&str> = props.characters.split('\n').collect();
    if props.paragraph_spacing > 0.0 && paragraphs.len() > 1 {
        let spacing = props.paragraph_spacing;
        let class = reg.intern_named_utility(
            &format!("paragraph-{}", format_num(spacing)),
            &format!("paragraph-{}", format_negative_class_value(spacing)),
            &[decl("display", "block"), decl("margin-bottom", px(spacing))],
        );
        // Spacing only separates paragraphs; the last one adds none.
        let last = paragraphs.len() - 1;
        return paragraphs
            .into_iter()
            .enumerate()
            .map(|(i, paragraph)| {
                let classes = if i < last { vec![class.clone()] } else { Vec::new() };
                let mut span = Element::new("span").with_classes(classes);
                if !paragraph.is_empty() {
                    span.children.push(Markup::Text(paragraph.to_string()));
                }
                Markup::Element(span)
            })
            .collect();
    }

    lines(&props.characters)
}
