//! Vector export seam.
//!
//! The host renders vector-like nodes to SVG on request. Exports are
//! awaited one at a time, depth-first and left-to-right, before emission
//! starts; the emitter only ever reads the finished [`VectorAssets`].
//! A failed export is the single recovered error of a conversion: it
//! becomes a placeholder box and never aborts the run.

use crate::config::ConvertConfig;
use crate::error::ExportError;
use crate::id::NodeId;
use crate::model::SceneNode;
use crate::svg::inline_svg;
use crate::walker::is_invisible_spacer;
use std::collections::HashMap;

/// Host service turning a shape node into SVG bytes.
#[allow(async_fn_in_trait)]
pub trait VectorExporter {
    async fn export_vector(&self, node: &SceneNode) -> Result<Vec<u8>, ExportError>;
}

/// Synchronous closures work as exporters, which keeps test doubles short.
impl<F> VectorExporter for F
where
    F: Fn(&SceneNode) -> Result<Vec<u8>, ExportError>,
{
    async fn export_vector(&self, node: &SceneNode) -> Result<Vec<u8>, ExportError> {
        self(node)
    }
}

/// Exporter for hosts without vector support: every vector becomes a
/// placeholder.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExport;

impl VectorExporter for NoExport {
    async fn export_vector(&self, node: &SceneNode) -> Result<Vec<u8>, ExportError> {
        Err(ExportError::Unsupported(format!("no exporter for {}", node.id)))
    }
}

/// What the emitter pastes for one vector node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VectorAsset {
    /// Inline-ready SVG with namespaced ids.
    Svg(String),
    /// Flat box in the placeholder color.
    Placeholder,
}

pub type VectorAssets = HashMap<NodeId, VectorAsset>;

/// Whether a vector has any visible paint worth exporting.
pub fn has_visible_paint(node: &SceneNode) -> bool {
    node.fills.iter().any(|p| p.visible) || node.strokes.iter().any(|p| p.visible)
}

/// Decode exported bytes and namespace their ids for `id`.
pub fn decode_svg(bytes: Vec<u8>, id: NodeId) -> Result<String, ExportError> {
    let text = String::from_utf8(bytes).map_err(|_| ExportError::NotText)?;
    Ok(inline_svg(&text, &id.slug()))
}

async fn fetch_one<E: VectorExporter>(node: &SceneNode, exporter: &E) -> VectorAsset {
    if !has_visible_paint(node) {
        log::debug!("{} has no visible paint, using placeholder", node.id);
        return VectorAsset::Placeholder;
    }
    let result = match exporter.export_vector(node).await {
        Ok(bytes) => decode_svg(bytes, node.id),
        Err(err) => Err(err),
    };
    match result {
        Ok(svg) => VectorAsset::Svg(svg),
        Err(err) => {
            log::warn!("vector export of {} failed, using placeholder: {err}", node.id);
            VectorAsset::Placeholder
        }
    }
}

/// Export every emitted vector-like node under `root`.
///
/// Visits exactly what the emitter visits: the root always, hidden
/// subtrees and dropped spacers never. A vector-like node is exported as
/// one picture, so its own children are not descended into.
pub async fn prefetch_vectors<E: VectorExporter>(
    root: &SceneNode,
    exporter: &E,
    config: &ConvertConfig,
) -> VectorAssets {
    let mut assets = VectorAssets::new();
    let mut stack = vec![(root, true)];
    while let Some((node, is_root)) = stack.pop() {
        if !is_root && (!node.visible || is_invisible_spacer(node, config)) {
            continue;
        }
        if node.is_vector_like() {
            let asset = fetch_one(node, exporter).await;
            assets.insert(node.id, asset);
            continue;
        }
        stack.extend(node.children.iter().rev().map(|child| (child, false)));
    }
    assets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Color, NodeKind, Paint};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    fn vector(id: &str) -> SceneNode {
        SceneNode::new(id, id, NodeKind::VectorLike)
            .with_frame(0.0, 0.0, 10.0, 10.0)
            .with_fill(Paint::solid(Color::rgb(0.0, 0.0, 0.0)))
    }

    #[tokio::test]
    async fn exports_in_document_order() {
        let root = SceneNode::new("1:0", "root", NodeKind::Group)
            .with_child(vector("1:1"))
            .with_child(
                SceneNode::new("1:2", "nested", NodeKind::Group).with_child(vector("1:3")),
            )
            .with_child(vector("1:4"));

        let seen = RefCell::new(Vec::new());
        let exporter = |node: &SceneNode| -> Result<Vec<u8>, ExportError> {
            seen.borrow_mut().push(node.id.to_string());
            Ok(b"<svg id=\"a\"/>".to_vec())
        };
        let assets = prefetch_vectors(&root, &exporter, &ConvertConfig::default()).await;

        assert_eq!(seen.into_inner(), vec!["1:1", "1:3", "1:4"]);
        assert_eq!(
            assets[&NodeId::intern("1:3")],
            VectorAsset::Svg("<svg id=\"a-1-3\"/>".into())
        );
    }

    #[tokio::test]
    async fn failures_become_placeholders() {
        let root = SceneNode::new("2:0", "root", NodeKind::Group)
            .with_child(vector("2:1"))
            .with_child(vector("2:2"));
        let exporter = |node: &SceneNode| -> Result<Vec<u8>, ExportError> {
            if node.id.as_str() == "2:1" {
                Err(ExportError::Host("boom".into()))
            } else {
                Ok(vec![0xff, 0xfe])
            }
        };
        let assets = prefetch_vectors(&root, &exporter, &ConvertConfig::default()).await;
        assert_eq!(assets[&NodeId::intern("2:1")], VectorAsset::Placeholder);
        assert_eq!(assets[&NodeId::intern("2:2")], VectorAsset::Placeholder);
    }

    #[tokio::test]
    async fn boolean_operations_export_as_one_picture() {
        let union = vector("4:1")
            .with_child(vector("4:2"))
            .with_child(vector("4:3"));
        let root = SceneNode::new("4:0", "root", NodeKind::Group)
            .with_child(union)
            .with_child(vector("4:4"));

        let seen = RefCell::new(Vec::new());
        let exporter = |node: &SceneNode| -> Result<Vec<u8>, ExportError> {
            seen.borrow_mut().push(node.id.to_string());
            Ok(b"<svg/>".to_vec())
        };
        let assets = prefetch_vectors(&root, &exporter, &ConvertConfig::default()).await;

        assert_eq!(seen.into_inner(), vec!["4:1", "4:4"]);
        assert!(!assets.contains_key(&NodeId::intern("4:2")));
    }

    #[tokio::test]
    async fn hidden_root_still_exports_its_vectors() {
        let mut root = SceneNode::new("5:0", "root", NodeKind::Group).with_child(vector("5:1"));
        root.visible = false;
        let mut hidden = vector("5:2");
        hidden.visible = false;
        root.children.push(hidden);

        let seen = RefCell::new(Vec::new());
        let exporter = |node: &SceneNode| -> Result<Vec<u8>, ExportError> {
            seen.borrow_mut().push(node.id.to_string());
            Ok(b"<svg/>".to_vec())
        };
        let assets = prefetch_vectors(&root, &exporter, &ConvertConfig::default()).await;

        assert_eq!(seen.into_inner(), vec!["5:1"]);
        assert_eq!(assets[&NodeId::intern("5:1")], VectorAsset::Svg("<svg/>".into()));
    }

    #[tokio::test]
    async fn unpainted_vectors_are_not_exported() {
        let mut bare = vector("3:1");
        bare.fills.clear();
        bare.strokes.push(Paint {
            visible: false,
            ..Paint::solid(Color::rgb(1.0, 0.0, 0.0))
        });
        let exporter = |_: &SceneNode| -> Result<Vec<u8>, ExportError> {
            panic!("export must not be requested")
        };
        let assets = prefetch_vectors(&bare, &exporter, &ConvertConfig::default()).await;
        assert_eq!(assets[&bare.id], VectorAsset::Placeholder);
    }
}
