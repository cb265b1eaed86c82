//! `fm`: convert a design node tree into a document and stylesheet.
//!
//! Stands in for the design-tool host: the selection comes from a JSON
//! file and vector exports from a directory of pre-rendered SVG files.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use fm_core::{ConvertConfig, ExportError, OutputFormat, SceneNode, VectorExporter};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON file holding one node or an array of nodes (the selection)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output dialect
    #[arg(long, value_enum, default_value_t = Format::Html)]
    format: Format,

    /// Directory the artifacts are written to
    #[arg(long, value_name = "DIR", default_value = ".")]
    out: PathBuf,

    /// Directory of `<node-id-slug>.svg` vector exports
    #[arg(long, value_name = "DIR")]
    vectors: Option<PathBuf>,

    /// Document title (HTML only); defaults to the root name
    #[arg(long)]
    title: Option<String>,

    /// Reject roots that do not use auto layout
    #[arg(long)]
    require_auto_layout: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum Format {
    Html,
    Component,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Html => OutputFormat::Html,
            Format::Component => OutputFormat::Component,
        }
    }
}

/// Serves vector exports from files on disk. A missing file is an export
/// failure, which the converter turns into a placeholder.
struct DirectoryExporter {
    dir: Option<PathBuf>,
}

impl VectorExporter for DirectoryExporter {
    async fn export_vector(&self, node: &SceneNode) -> Result<Vec<u8>, ExportError> {
        let Some(dir) = &self.dir else {
            return Err(ExportError::Unsupported("no --vectors directory".into()));
        };
        let path = dir.join(format!("{}.svg", node.id.slug()));
        tokio::fs::read(&path)
            .await
            .map_err(|e| ExportError::Host(format!("{}: {e}", path.display())))
    }
}

/// The selection is either a single node or an array of nodes.
fn read_selection(path: &Path) -> Result<Vec<SceneNode>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value: serde_json::Value =
        serde_json::from_str(&text).with_context(|| format!("{} is not JSON", path.display()))?;
    let selection: serde_json::Result<Vec<SceneNode>> = if value.is_array() {
        serde_json::from_value(value)
    } else {
        serde_json::from_value(value).map(|node| vec![node])
    };
    selection.with_context(|| format!("{} is not a node tree", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let selection = read_selection(&cli.input)?;
    let config = ConvertConfig {
        format: cli.format.into(),
        require_auto_layout: cli.require_auto_layout,
        title: cli.title,
        ..ConvertConfig::default()
    };
    let exporter = DirectoryExporter { dir: cli.vectors };

    let output = match fm_core::convert(&selection, &exporter, &config).await {
        Ok(output) => output,
        Err(err) => {
            log::error!("{err}");
            anyhow::bail!("{}", err.user_message());
        }
    };

    std::fs::create_dir_all(&cli.out)
        .with_context(|| format!("failed to create {}", cli.out.display()))?;
    for (name, contents) in [
        (&output.document_name, &output.document),
        (&output.stylesheet_name, &output.stylesheet),
    ] {
        let path = cli.out.join(name);
        std::fs::write(&path, contents)
            .with_context(|| format!("failed to write {}", path.display()))?;
        log::info!("wrote {}", path.display());
    }
    Ok(())
}
