//! Document assembler: wraps emitted markup into an HTML page or a
//! component module and serializes the stylesheet.

use crate::config::ConvertConfig;
use crate::markup::{Dialect, Markup, escape_text, render};
use crate::registry::StyleRegistry;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

const FONTS_ORIGIN: &str = "https://fonts.googleapis.com";
const FONTS_STATIC_ORIGIN: &str = "https://fonts.gstatic.com";

/// Web-font families in use and the weights requested for each.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FontSet {
    families: BTreeMap<String, BTreeSet<u16>>,
}

impl FontSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a family/weight pair. Icon fonts are never requested.
    pub fn add(&mut self, family: &str, weight: u16, config: &ConvertConfig) {
        if !config.include_fonts || family.trim().is_empty() || config.is_icon_font(family) {
            return;
        }
        self.families
            .entry(family.to_string())
            .or_default()
            .insert(weight);
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    /// Google Fonts `css2` request for every family, sorted.
    pub fn stylesheet_url(&self) -> Option<String> {
        if self.families.is_empty() {
            return None;
        }
        let mut url = format!("{FONTS_ORIGIN}/css2?");
        for (i, (family, weights)) in self.families.iter().enumerate() {
            if i > 0 {
                url.push('&');
            }
            let weights = weights
                .iter()
                .map(u16::to_string)
                .collect::<Vec<_>>()
                .join(";");
            let _ = write!(url, "family={}:wght@{weights}", family.replace(' ', "+"));
        }
        url.push_str("&display=swap");
        Some(url)
    }
}

/// The CSS text blob: font import (component mode only), reset, rules.
pub fn stylesheet(registry: &StyleRegistry, fonts: &FontSet, dialect: Dialect) -> String {
    let mut out = String::with_capacity(256 + registry.len() * 64);
    if dialect == Dialect::Jsx {
        if let Some(url) = fonts.stylesheet_url() {
            let _ = writeln!(out, "@import url('{url}');\n");
        }
    }
    out.push_str("*, *::before, *::after {\n  box-sizing: border-box;\n}\n\n");
    out.push_str("body, p {\n  margin: 0;\n}\n");
    if !registry.is_empty() {
        out.push('\n');
        out.push_str(&registry.to_css());
    }
    out
}

fn escape_attr(value: &str) -> String {
    escape_text(value, Dialect::Html)
}

/// A complete HTML page around `body`.
pub fn html_document(body: &Markup, title: &str, fonts: &FontSet, config: &ConvertConfig) -> String {
    let mut out = String::with_capacity(2048);
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    out.push_str("  <meta charset=\"utf-8\" />\n");
    out.push_str(
        "  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />\n",
    );
    let _ = writeln!(out, "  <title>{}</title>", escape_attr(title));
    if let Some(url) = fonts.stylesheet_url() {
        let _ = writeln!(out, "  <link rel=\"preconnect\" href=\"{FONTS_ORIGIN}\" />");
        let _ = writeln!(
            out,
            "  <link rel=\"preconnect\" href=\"{FONTS_STATIC_ORIGIN}\" crossorigin />"
        );
        let _ = writeln!(out, "  <link rel=\"stylesheet\" href=\"{}\" />", escape_attr(&url));
    }
    let _ = writeln!(
        out,
        "  <link rel=\"stylesheet\" href=\"{}\" />",
        escape_attr(&config.stylesheet_name)
    );
    out.push_str("</head>\n<body>\n");
    out.push_str(&render(body, Dialect::Html, 1));
    out.push_str("</body>\n</html>\n");
    out
}

/// PascalCase component name from a layer name; `Component` when nothing
/// usable remains.
pub fn component_name(name: &str) -> String {
    let mut out = String::new();
    for word in name.split(|c: char| !c.is_ascii_alphanumeric()) {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            out.push_str(chars.as_str());
        }
    }
    if out.is_empty() {
        return "Component".into();
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert_str(0, "Component");
    }
    out
}

/// A component module returning `body`.
pub fn component_module(body: &Markup, name: &str, config: &ConvertConfig) -> String {
    let mut out = String::with_capacity(2048);
    let _ = writeln!(out, "import './{}';\n", config.stylesheet_name);
    let _ = writeln!(out, "export default function {name}() {{");
    out.push_str("  return (\n");
    out.push_str(&render(body, Dialect::Jsx, 2));
    out.push_str("  );\n}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::decl;
    use crate::markup::Element;
    use pretty_assertions::assert_eq;

    #[test]
    fn font_url_is_sorted_and_deduplicated() {
        let config = ConvertConfig::default();
        let mut fonts = FontSet::new();
        fonts.add("Roboto Mono", 700, &config);
        fonts.add("Inter", 600, &config);
        fonts.add("Inter", 400, &config);
        fonts.add("Inter", 600, &config);
        fonts.add("Material Symbols Outlined", 400, &config);
        assert_eq!(
            fonts.stylesheet_url().unwrap(),
            "https://fonts.googleapis.com/css2?family=Inter:wght@400;600&family=Roboto+Mono:wght@700&display=swap"
        );
    }

    #[test]
    fn fonts_can_be_disabled() {
        let config = ConvertConfig {
            include_fonts: false,
            ..ConvertConfig::default()
        };
        let mut fonts = FontSet::new();
        fonts.add("Inter", 400, &config);
        assert!(fonts.is_empty());
        assert_eq!(fonts.stylesheet_url(), None);
    }

    #[test]
    fn stylesheet_layout() {
        let mut reg = StyleRegistry::new();
        reg.intern_utility("flex", &[decl("display", "flex")]);
        let config = ConvertConfig::default();
        let mut fonts = FontSet::new();
        fonts.add("Inter", 400, &config);

        let html = stylesheet(&reg, &fonts, Dialect::Html);
        assert!(html.starts_with("*, *::before, *::after {"));
        assert!(html.ends_with("body, p {\n  margin: 0;\n}\n\n.flex {\n  display: flex;\n}\n"));

        let jsx = stylesheet(&reg, &fonts, Dialect::Jsx);
        assert!(jsx.starts_with("@import url('https://fonts.googleapis.com/css2?family=Inter"));
    }

    #[test]
    fn html_shell() {
        let config = ConvertConfig::default();
        let body = Markup::Element(Element::new("div").with_classes(vec!["root".into()]));
        let html = html_document(&body, "Home & About", &FontSet::new(), &config);
        assert!(html.starts_with("<!DOCTYPE html>\n"));
        assert!(html.contains("<title>Home &amp; About</title>"));
        assert!(html.contains("<link rel=\"stylesheet\" href=\"styles.css\" />"));
        assert!(!html.contains("fonts.googleapis.com"));
        assert!(html.contains("<body>\n  <div class=\"root\"></div>\n</body>"));
    }

    #[test]
    fn component_shell() {
        let config = ConvertConfig::component();
        let body = Markup::Element(Element::new("div").with_classes(vec!["root".into()]));
        assert_eq!(
            component_module(&body, "PricingCard", &config),
            "import './styles.css';\n\nexport default function PricingCard() {\n  return (\n    <div className=\"root\" />\n  );\n}\n"
        );
    }

    #[test]
    fn component_names() {
        assert_eq!(component_name("pricing card"), "PricingCard");
        assert_eq!(component_name("Hero/Section-2"), "HeroSection2");
        assert_eq!(component_name("✨"), "Component");
        assert_eq!(component_name("404 page"), "Component404Page");
    }
}
