//! CSS declaration values and number formatting shared by every resolver.

use std::collections::HashSet;
use std::fmt;

/// One `property: value` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub property: &'static str,
    pub value: String,
}

impl Declaration {
    pub fn new(property: &'static str, value: impl Into<String>) -> Self {
        Self {
            property,
            value: value.into(),
        }
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.property, self.value)
    }
}

/// Shorthand for building a declaration list.
pub fn decl(property: &'static str, value: impl Into<String>) -> Declaration {
    Declaration::new(property, value)
}

/// Drop earlier occurrences of a property so the last one wins, keeping
/// the surviving declarations in their original relative order.
pub fn dedupe_last(decls: Vec<Declaration>) -> Vec<Declaration> {
    let mut seen = HashSet::new();
    let mut kept: Vec<Declaration> = decls
        .into_iter()
        .rev()
        .filter(|d| seen.insert(d.property))
        .collect();
    kept.reverse();
    kept
}

/// Declaration lines as they appear inside a rule body, one per line.
/// This exact text is the style signature.
pub fn declaration_lines(decls: &[Declaration]) -> Vec<String> {
    decls.iter().map(|d| format!("{d};")).collect()
}

/// Format a float rounded to two decimals, without trailing zeros.
pub fn format_num(n: f32) -> String {
    let rounded = (n * 100.0).round() / 100.0;
    if rounded == 0.0 {
        return "0".into();
    }
    if rounded == rounded.floor() {
        format!("{}", rounded as i64)
    } else {
        format!("{rounded:.2}")
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}

/// A pixel length.
pub fn px(n: f32) -> String {
    format!("{}px", format_num(n))
}

/// A percentage.
pub fn pct(n: f32) -> String {
    format!("{}%", format_num(n))
}

/// An angle in degrees.
pub fn deg(n: f32) -> String {
    format!("{}deg", format_num(n))
}
