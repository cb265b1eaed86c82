use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

/// Global string interner for host node IDs (`"12:345"`, `"I1:2;3:4"`).
///
/// Entries are never freed: every id seen by any conversion stays resident
/// for the life of the process. A one-shot CLI run never notices. A
/// long-lived host converting many large documents grows by roughly the
/// total length of the distinct ids it has seen, in exchange for `Copy`
/// ids that hash as a `u32`.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// A lightweight, interned identifier for nodes in the design tree.
/// Internally a 4-byte `Spur` index: Copy, and Eq/Hash in O(1).
///
/// Interned strings are immutable, so sharing the interner across
/// concurrent conversions carries no per-run state.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Spur);

impl NodeId {
    /// Intern a new string as a NodeId, or return existing if already interned.
    pub fn intern(s: &str) -> Self {
        NodeId(INTERNER.get_or_intern(s))
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// The ID with every character outside `[a-z0-9]` folded to `-`.
    ///
    /// Host IDs carry `:` and `;` separators; this form is safe inside
    /// class names, SVG `id` attributes and file names.
    pub fn slug(&self) -> String {
        let mut out = String::with_capacity(self.as_str().len());
        for c in self.as_str().chars() {
            if c.is_ascii_alphanumeric() {
                out.push(c.to_ascii_lowercase());
            } else if !out.ends_with('-') {
                out.push('-');
            }
        }
        out.trim_matches('-').to_string()
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(NodeId::intern(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = NodeId::intern("12:345");
        let b = NodeId::intern("12:345");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "12:345");
    }

    #[test]
    fn slug_folds_separators() {
        assert_eq!(NodeId::intern("12:345").slug(), "12-345");
        assert_eq!(NodeId::intern("I1:2;3:4").slug(), "i1-2-3-4");
        assert_eq!(NodeId::intern("::").slug(), "");
    }
}
