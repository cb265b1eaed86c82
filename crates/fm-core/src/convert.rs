//! Conversion entry point: root selection, export prefetch, emission and
//! document assembly.

use crate::config::{ConvertConfig, OutputFormat};
use crate::document::{component_module, component_name, html_document, stylesheet};
use crate::error::ConvertError;
use crate::export::{VectorExporter, prefetch_vectors};
use crate::markup::Dialect;
use crate::model::{LayoutMode, NodeKind, SceneNode};
use crate::walker::Emitter;

/// The two artifacts of one conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOutput {
    pub format: OutputFormat,
    /// `index.html` or `<Component>.jsx`.
    pub document_name: String,
    pub document: String,
    pub stylesheet_name: String,
    pub stylesheet: String,
}

/// First frame or group in the host selection.
pub fn select_root<'a>(
    selection: &'a [SceneNode],
    config: &ConvertConfig,
) -> Result<&'a SceneNode, ConvertError> {
    let root = selection
        .iter()
        .find(|node| node.is_container())
        .ok_or_else(|| ConvertError::selection("Select a frame or group to export"))?;

    if config.require_auto_layout {
        let free_form = match &root.kind {
            NodeKind::Frame(frame) => frame.layout_mode == LayoutMode::None,
            _ => true,
        };
        if free_form {
            return Err(ConvertError::selection(format!(
                "\"{}\" must use auto layout to be exported",
                root.name
            )));
        }
    }
    Ok(root)
}

/// Convert the selection into a document and its stylesheet.
///
/// Vector exports are awaited first, one node at a time; emission itself
/// is synchronous. Each call owns a fresh style registry.
pub async fn convert<E: VectorExporter>(
    selection: &[SceneNode],
    exporter: &E,
    config: &ConvertConfig,
) -> Result<ConversionOutput, ConvertError> {
    let root = select_root(selection, config)?;
    log::debug!("converting {} ({:?}) as {:?}", root.id, root.name, config.format);

    let assets = prefetch_vectors(root, exporter, config).await;
    let mut emitter = Emitter::new(config, &assets);
    let body = emitter.emit_root(root)?;
    let (registry, fonts) = emitter.finish();
    log::debug!("{} classes, {} vector assets", registry.len(), assets.len());

    let dialect = Dialect::from(config.format);
    let css = stylesheet(&registry, &fonts, dialect);
    let (document_name, document) = match config.format {
        OutputFormat::Html => {
            let title = config.title.as_deref().unwrap_or(&root.name);
            ("index.html".to_string(), html_document(&body, title, &fonts, config))
        }
        OutputFormat::Component => {
            let name = component_name(&root.name);
            (format!("{name}.jsx"), component_module(&body, &name, config))
        }
    };

    Ok(ConversionOutput {
        format: config.format,
        document_name,
        document,
        stylesheet_name: config.stylesheet_name.clone(),
        stylesheet: css,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::NoExport;
    use crate::model::FrameProps;
    use pretty_assertions::assert_eq;

    #[test]
    fn selection_needs_a_container() {
        let text = SceneNode::new("1:1", "Label", NodeKind::Text(Default::default()));
        let err = select_root(std::slice::from_ref(&text), &ConvertConfig::default()).unwrap_err();
        assert_eq!(err.user_message(), "Select a frame or group to export");

        let group = SceneNode::new("1:2", "Group", NodeKind::Group);
        let selection = [text, group];
        let root = select_root(&selection, &ConvertConfig::default()).unwrap();
        assert_eq!(root.name, "Group");
    }

    #[test]
    fn auto_layout_can_be_required() {
        let config = ConvertConfig {
            require_auto_layout: true,
            ..ConvertConfig::default()
        };
        let free = SceneNode::new("1:1", "Canvas", NodeKind::Frame(FrameProps::default()));
        assert!(matches!(
            select_root(std::slice::from_ref(&free), &config),
            Err(ConvertError::Selection(_))
        ));

        let stack = SceneNode::new(
            "1:2",
            "Stack",
            NodeKind::Frame(FrameProps {
                layout_mode: LayoutMode::Vertical,
                ..FrameProps::default()
            }),
        );
        assert!(select_root(std::slice::from_ref(&stack), &config).is_ok());
    }

    #[tokio::test]
    async fn component_output_is_named_after_the_root() {
        let root = SceneNode::new("1:0", "pricing card", NodeKind::Group).with_frame(0.0, 0.0, 10.0, 10.0);
        let out = convert(&[root], &NoExport, &ConvertConfig::component())
            .await
            .unwrap();
        assert_eq!(out.document_name, "PricingCard.jsx");
        assert!(out.document.contains("export default function PricingCard()"));
        assert_eq!(out.stylesheet_name, "styles.css");
    }

    #[tokio::test]
    async fn html_title_falls_back_to_root_name() {
        let root = SceneNode::new("1:0", "Landing", NodeKind::Group).with_frame(0.0, 0.0, 10.0, 10.0);
        let out = convert(&[root.clone()], &NoExport, &ConvertConfig::default())
            .await
            .unwrap();
        assert_eq!(out.document_name, "index.html");
        assert!(out.document.contains("<title>Landing</title>"));

        let titled = ConvertConfig {
            title: Some("Home".into()),
            ..ConvertConfig::default()
        };
        let out = convert(&[root], &NoExport, &titled).await.unwrap();
        assert!(out.document.contains("<title>Home</title>"));
    }
}
