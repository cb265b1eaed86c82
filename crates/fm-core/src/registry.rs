//! Style registry: signature-based class deduplication and naming.
//!
//! One registry lives for exactly one conversion call. It is the only
//! owner of the signature → class mapping, so identical declaration lists
//! always resolve to the same class within a run, and nothing leaks into
//! the next run.

use crate::css::{Declaration, declaration_lines};
use crate::id::NodeId;
use std::collections::{HashMap, HashSet};
use std::fmt::Write;

/// A class in the generated stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleEntry {
    /// Unique class name (`base` or `base-N`).
    pub class_name: String,
    /// Sanitized name the class was minted from.
    pub base_name: String,
    /// 0 when unsuffixed, otherwise the numeric suffix.
    pub suffix: u32,
    /// Declaration lines, each terminated with `;`.
    pub body: Vec<String>,
}

/// Per-run style interner.
#[derive(Debug, Default)]
pub struct StyleRegistry {
    /// Signature (exact ordered declaration text) → class name.
    signatures: HashMap<String, String>,
    /// Utility key → class name.
    utilities: HashMap<String, String>,
    /// Per-base mint counters.
    counters: HashMap<String, u32>,
    /// Every class name handed out so far.
    taken: HashSet<String>,
    entries: Vec<StyleEntry>,
}

impl StyleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a well-known single-purpose class once per run.
    ///
    /// Later calls with the same key return the first registration's class
    /// and ignore their declarations.
    pub fn intern_utility(&mut self, key: &str, decls: &[Declaration]) -> String {
        self.intern_named_utility(key, key, decls)
    }

    /// Like [`intern_utility`](Self::intern_utility), but the class is
    /// minted from `name` while lookups use `key`. Two keys sharing a name
    /// get `name` and `name-2`.
    pub fn intern_named_utility(&mut self, key: &str, name: &str, decls: &[Declaration]) -> String {
        if let Some(existing) = self.utilities.get(key) {
            return existing.clone();
        }
        let (class_name, suffix) = self.mint(name);
        log::trace!("utility .{class_name}");
        self.utilities.insert(key.to_string(), class_name.clone());
        self.entries.push(StyleEntry {
            class_name: class_name.clone(),
            base_name: name.to_string(),
            suffix,
            body: declaration_lines(decls),
        });
        class_name
    }

    /// Intern a declaration list under a readable base name.
    ///
    /// The signature is the exact ordered declaration text: identical
    /// lists share one class regardless of `base_name`.
    pub fn intern_signature(&mut self, base_name: &str, decls: &[Declaration]) -> String {
        let body = declaration_lines(decls);
        let signature = body.join("\n");
        if let Some(existing) = self.signatures.get(&signature) {
            return existing.clone();
        }
        let (class_name, suffix) = self.mint(base_name);
        log::trace!("class .{class_name} ({} declarations)", body.len());
        self.signatures.insert(signature, class_name.clone());
        self.entries.push(StyleEntry {
            class_name: class_name.clone(),
            base_name: base_name.to_string(),
            suffix,
            body,
        });
        class_name
    }

    /// Mint a fresh class name: `base`, then `base-2`, `base-3`, ...
    pub fn unique_name(&mut self, base: &str) -> String {
        self.mint(base).0
    }

    fn mint(&mut self, base: &str) -> (String, u32) {
        let counter = self.counters.entry(base.to_string()).or_insert(0);
        loop {
            *counter += 1;
            let (name, suffix) = if *counter == 1 {
                (base.to_string(), 0)
            } else {
                (format!("{base}-{counter}"), *counter)
            };
            // A literal name like `card-2` may already own this slot.
            if self.taken.insert(name.clone()) {
                return (name, suffix);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries ordered by `(base_name, suffix)`.
    pub fn sorted_entries(&self) -> Vec<&StyleEntry> {
        let mut entries: Vec<&StyleEntry> = self.entries.iter().collect();
        entries.sort_by(|a, b| {
            a.base_name
                .cmp(&b.base_name)
                .then(a.suffix.cmp(&b.suffix))
        });
        entries
    }

    /// Serialize every entry as a CSS rule, in sorted order.
    pub fn to_css(&self) -> String {
        let mut out = String::with_capacity(self.entries.len() * 64);
        for (i, entry) in self.sorted_entries().into_iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            let _ = writeln!(out, ".{} {{", entry.class_name);
            for line in &entry.body {
                let _ = writeln!(out, "  {line}");
            }
            out.push_str("}\n");
        }
        out
    }
}

/// Turn a designer-facing layer name into a class base name.
///
/// Lowercases, strips everything outside `[a-z0-9-_]` and whitespace,
/// folds whitespace runs into one hyphen and trims hyphens. An empty
/// result falls back to `node-<id>`; a leading digit gets an `n-` prefix
/// so the class stays a valid selector. Idempotent.
pub fn sanitize_name(name: &str, id: NodeId) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_hyphen = false;
    for c in name.to_lowercase().chars() {
        if c.is_whitespace() {
            pending_hyphen = true;
        } else if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_' {
            if pending_hyphen {
                out.push('-');
                pending_hyphen = false;
            }
            out.push(c);
        }
    }
    let trimmed = out.trim_matches('-');

    let base = if trimmed.is_empty() {
        let slug = id.slug();
        if slug.is_empty() {
            "node".to_string()
        } else {
            format!("node-{slug}")
        }
    } else {
        trimmed.to_string()
    };

    if base.starts_with(|c: char| c.is_ascii_digit()) {
        format!("n-{base}")
    } else {
        base
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────
