//! Error taxonomy of a conversion call.

use thiserror::Error;

/// Failure of a whole conversion call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConvertError {
    /// Nothing convertible was selected, or the root is not eligible.
    #[error("{0}")]
    Selection(String),

    /// Anything else that went wrong while walking the tree.
    #[error("Export failed: {0}")]
    Unexpected(String),
}

impl ConvertError {
    pub fn selection(message: impl Into<String>) -> Self {
        ConvertError::Selection(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        ConvertError::Unexpected(message.into())
    }

    /// Text for the host to show the user. Selection problems are shown
    /// verbatim; everything else collapses to a generic failure.
    pub fn user_message(&self) -> &str {
        match self {
            ConvertError::Selection(message) => message,
            ConvertError::Unexpected(_) => "Export failed",
        }
    }
}

/// Failure to export a single node as a vector image.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExportError {
    #[error("unsupported geometry: {0}")]
    Unsupported(String),

    #[error("host export failed: {0}")]
    Host(String),

    #[error("exported image is not UTF-8 text")]
    NotText,
}
