pub mod config;
pub mod convert;
pub mod css;
pub mod document;
pub mod error;
pub mod export;
pub mod geometry;
pub mod id;
pub mod layout;
pub mod markup;
pub mod model;
pub mod paint;
pub mod registry;
pub mod svg;
pub mod text;
pub mod walker;

pub use config::{ConvertConfig, OutputFormat};
pub use convert::{ConversionOutput, convert, select_root};
pub use error::{ConvertError, ExportError};
pub use export::{NoExport, VectorAsset, VectorExporter, prefetch_vectors};
pub use id::NodeId;
pub use model::*;
pub use registry::{StyleRegistry, sanitize_name};
