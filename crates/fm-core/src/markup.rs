//! Markup tree and its two output dialects.
//!
//! The walker builds a small element tree; rendering is the only place
//! that knows about `class` vs `className`, inline style syntax and text
//! escaping.

use crate::config::OutputFormat;
use crate::css::Declaration;
use std::fmt::Write;

/// Output dialect of the markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// `class="…"`, `style="prop: value"`.
    Html,
    /// `className="…"`, `style={{ prop: "value" }}`.
    Jsx,
}

impl From<OutputFormat> for Dialect {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Html => Dialect::Html,
            OutputFormat::Component => Dialect::Jsx,
        }
    }
}

/// A node of the emitted markup tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Markup {
    Element(Element),
    /// Unescaped text; escaped per dialect when rendered.
    Text(String),
    LineBreak,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub tag: &'static str,
    pub classes: Vec<String>,
    /// Inline style, already deduplicated.
    pub style: Vec<Declaration>,
    /// Pre-sanitized SVG pasted as the element's content.
    pub inner_svg: Option<String>,
    pub children: Vec<Markup>,
}

impl Element {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_classes(mut self, classes: Vec<String>) -> Self {
        self.classes = classes;
        self
    }

    #[must_use]
    pub fn with_style(mut self, style: Vec<Declaration>) -> Self {
        self.style = style;
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: Markup) -> Self {
        self.children.push(child);
        self
    }

    /// Text-level content renders on one line so no whitespace leaks into
    /// the text.
    fn is_phrasing(&self) -> bool {
        !self.children.is_empty()
            && self.children.iter().all(|child| match child {
                Markup::Text(_) | Markup::LineBreak => true,
                Markup::Element(e) => e.tag == "span" && (e.children.is_empty() || e.is_phrasing()),
            })
    }
}

// ─── Escaping ────────────────────────────────────────────────────────────

/// Escape text for the given dialect. Both reserve `&<>"'`; JSX also
/// reserves braces.
pub fn escape_text(text: &str, dialect: Dialect) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '{' if dialect == Dialect::Jsx => out.push_str("&#123;"),
            '}' if dialect == Dialect::Jsx => out.push_str("&#125;"),
            _ => out.push(c),
        }
    }
    out
}

/// `-webkit-mask-image` → `WebkitMaskImage`, `z-index` → `zIndex`.
pub fn camel_case_property(property: &str) -> String {
    let mut out = String::with_capacity(property.len());
    let mut upper = false;
    for c in property.chars() {
        if c == '-' {
            upper = true;
            continue;
        }
        out.push(if upper { c.to_ascii_uppercase() } else { c });
        upper = false;
    }
    out
}

fn json_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

fn style_attribute(style: &[Declaration], dialect: Dialect) -> String {
    match dialect {
        Dialect::Html => {
            let body = style
                .iter()
                .map(|d| d.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            format!(" style=\"{}\"", escape_text(&body, Dialect::Html))
        }
        Dialect::Jsx => {
            let body = style
                .iter()
                .map(|d| format!("{}: {}", camel_case_property(d.property), json_string(&d.value)))
                .collect::<Vec<_>>()
                .join(", ");
            format!(" style={{{{ {body} }}}}")
        }
    }
}

// ─── Rendering ───────────────────────────────────────────────────────────

/// Render a markup tree, indenting nested elements by two spaces per level.
#[must_use]
pub fn render(markup: &Markup, dialect: Dialect, depth: usize) -> String {
    let mut out = String::with_capacity(1024);
    write_markup(&mut out, markup, dialect, depth);
    out
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn write_markup(out: &mut String, markup: &Markup, dialect: Dialect, depth: usize) {
    match markup {
        Markup::Element(element) => write_element(out, element, dialect, depth),
        Markup::Text(text) => {
            indent(out, depth);
            let _ = writeln!(out, "{}", escape_text(text, dialect));
        }
        Markup::LineBreak => {
            indent(out, depth);
            out.push_str("<br />\n");
        }
    }
}

fn open_tag(element: &Element, dialect: Dialect) -> String {
    let mut tag = format!("<{}", element.tag);
    if !element.classes.is_empty() {
        let attr = match dialect {
            Dialect::Html => "class",
            Dialect::Jsx => "className",
        };
        let _ = write!(tag, " {attr}=\"{}\"", element.classes.join(" "));
    }
    if !element.style.is_empty() {
        tag.push_str(&style_attribute(&element.style, dialect));
    }
    tag
}

/// Text-level content on a single line.
fn write_inline(out: &mut String, markup: &Markup, dialect: Dialect) {
    match markup {
        Markup::Text(text) => out.push_str(&escape_text(text, dialect)),
        Markup::LineBreak => out.push_str("<br />"),
        Markup::Element(element) => {
            out.push_str(&open_tag(element, dialect));
            out.push('>');
            for child in &element.children {
                write_inline(out, child, dialect);
            }
            let _ = write!(out, "</{}>", element.tag);
        }
    }
}

fn write_element(out: &mut String, element: &Element, dialect: Dialect, depth: usize) {
    indent(out, depth);
    out.push_str(&open_tag(element, dialect));

    if let Some(svg) = &element.inner_svg {
        match dialect {
            Dialect::Html => {
                out.push_str(">\n");
                indent(out, depth + 1);
                let _ = writeln!(out, "{svg}");
                indent(out, depth);
                let _ = writeln!(out, "</{}>", element.tag);
            }
            Dialect::Jsx => {
                let _ = writeln!(
                    out,
                    " dangerouslySetInnerHTML={{{{ __html: {} }}}} />",
                    json_string(svg)
                );
            }
        }
        return;
    }

    if element.children.is_empty() {
        match dialect {
            Dialect::Html => {
                let _ = writeln!(out, "></{}>", element.tag);
            }
            Dialect::Jsx => out.push_str(" />\n"),
        }
        return;
    }

    out.push('>');
    if element.is_phrasing() {
        for child in &element.children {
            write_inline(out, child, dialect);
        }
        let _ = writeln!(out, "</{}>", element.tag);
        return;
    }

    out.push('\n');
    for child in &element.children {
        write_markup(out, child, dialect, depth + 1);
    }
    indent(out, depth);
    let _ = writeln!(out, "</{}>", element.tag);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::decl;
    use pretty_assertions::assert_eq;

    fn sample() -> Markup {
        Markup::Element(
            Element::new("div")
                .with_classes(vec!["card".into(), "flex".into()])
                .with_style(vec![decl("position", "relative"), decl("z-index", "1")])
                .with_child(Markup::Element(
                    Element::new("p")
                        .with_classes(vec!["label".into()])
                        .with_child(Markup::Text("A < B {x}".into()))
                        .with_child(Markup::LineBreak)
                        .with_child(Markup::Text("next".into())),
                ))
                .with_child(Markup::Element(Element::new("div"))),
        )
    }

    #[test]
    fn html_rendering() {
        assert_eq!(
            render(&sample(), Dialect::Html, 0),
            "<div class=\"card flex\" style=\"position: relative; z-index: 1\">\n  \
             <p class=\"label\">A &lt; B {x}<br />next</p>\n  \
             <div></div>\n\
             </div>\n"
        );
    }

    #[test]
    fn jsx_rendering() {
        assert_eq!(
            render(&sample(), Dialect::Jsx, 0),
            "<div className=\"card flex\" style={{ position: \"relative\", zIndex: \"1\" }}>\n  \
             <p className=\"label\">A &lt; B &#123;x&#125;<br />next</p>\n  \
             <div />\n\
             </div>\n"
        );
    }

    #[test]
    fn escaping_per_dialect() {
        assert_eq!(
            escape_text("Tom & \"Jerry\" 'n' {}", Dialect::Html),
            "Tom &amp; &quot;Jerry&quot; &#39;n&#39; {}"
        );
        assert_eq!(escape_text("{a}", Dialect::Jsx), "&#123;a&#125;");
    }

    #[test]
    fn camel_case_properties() {
        assert_eq!(camel_case_property("z-index"), "zIndex");
        assert_eq!(camel_case_property("-webkit-mask-image"), "WebkitMaskImage");
        assert_eq!(camel_case_property("width"), "width");
    }

    #[test]
    fn inlined_svg() {
        let mut icon = Element::new("div").with_classes(vec!["icon".into()]);
        icon.inner_svg = Some("<svg width=\"4\"/>".into());
        let markup = Markup::Element(icon);

        assert_eq!(
            render(&markup, Dialect::Html, 0),
            "<div class=\"icon\">\n  <svg width=\"4\"/>\n</div>\n"
        );
        assert_eq!(
            render(&markup, Dialect::Jsx, 0),
            "<div className=\"icon\" dangerouslySetInnerHTML={{ __html: \"<svg width=\\\"4\\\"/>\" }} />\n"
        );
    }
}
