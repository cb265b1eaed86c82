//! Conversion configuration.

/// Markup dialect of the emitted document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Full HTML document, `class=` and `style="..."` attributes.
    #[default]
    Html,
    /// Component module returning JSX, `className=` and object style maps.
    Component,
}

/// Configuration for `convert`.
///
/// The tolerances trade visual fidelity against output noise; the defaults
/// match what the host design tool treats as "no rotation" and "opaque".
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// Output dialect. Default: **Html**.
    pub format: OutputFormat,

    /// Rotations with a magnitude below this many degrees are treated as
    /// floating-point noise. Default: **0.01**.
    pub rotation_epsilon: f32,

    /// Alpha within this distance of 1.0 counts as fully opaque: colors
    /// render as hex and `opacity` is omitted. Default: **0.005**.
    pub opacity_tolerance: f32,

    /// Flat color standing in for image fills and for vectors that cannot
    /// be exported. Default: **#D9D9D9**.
    pub placeholder_color: String,

    /// Reject roots whose layout mode is NONE. Default: **false**.
    pub require_auto_layout: bool,

    /// Emit web-font requests for the text families in use. Default: **true**.
    pub include_fonts: bool,

    /// Case-insensitive substrings marking icon-font families, which are
    /// never requested as web fonts.
    pub icon_font_patterns: Vec<String>,

    /// File name the document links (HTML) or imports (component).
    /// Default: **styles.css**.
    pub stylesheet_name: String,

    /// Document `<title>`. Falls back to the root node name.
    pub title: Option<String>,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Html,
            rotation_epsilon: 0.01,
            opacity_tolerance: 0.005,
            placeholder_color: "#D9D9D9".into(),
            require_auto_layout: false,
            include_fonts: true,
            icon_font_patterns: vec![
                "icon".into(),
                "material symbols".into(),
                "font awesome".into(),
            ],
            stylesheet_name: "styles.css".into(),
            title: None,
        }
    }
}

impl ConvertConfig {
    pub fn component() -> Self {
        Self {
            format: OutputFormat::Component,
            ..Self::default()
        }
    }

    /// Whether an alpha value renders as fully opaque.
    pub fn is_opaque(&self, alpha: f32) -> bool {
        (1.0 - alpha).abs() < self.opacity_tolerance
    }

    /// Whether a family name matches one of the icon-font patterns.
    pub fn is_icon_font(&self, family: &str) -> bool {
        let family = family.to_lowercase();
        self.icon_font_patterns
            .iter()
            .any(|pattern| family.contains(&pattern.to_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opacity_tolerance_boundaries() {
        let config = ConvertConfig::default();
        assert!(config.is_opaque(1.0));
        assert!(config.is_opaque(0.996));
        assert!(!config.is_opaque(0.99));
    }

    #[test]
    fn icon_fonts_match_case_insensitively() {
        let config = ConvertConfig::default();
        assert!(config.is_icon_font("Material Symbols Rounded"));
        assert!(config.is_icon_font("Phosphor Icons"));
        assert!(!config.is_icon_font("Inter"));
    }
}
