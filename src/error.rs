//! Error types for network preprocessing and GraphML export.

use network_types::{EntityKind, UnknownEntityKind};
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the exporter.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Export format name not recognised by partitioning or file naming.
    #[error("Unsupported export format: '{0}'")]
    UnsupportedFormat(String),

    #[error(transparent)]
    UnknownEntityKind(#[from] UnknownEntityKind),

    /// A categorical variable has no `options` list to fan out into.
    #[error("Categorical variable '{variable}' ({kind} '{entity_type}') declares no options")]
    MissingCategoricalOptions {
        kind: EntityKind,
        /// Subtype id, or `ego`.
        entity_type: String,
        /// Codebook key of the variable.
        variable: String,
    },

    /// An edge endpoint does not match any node resequenced so far.
    #[error("Edge '{edge}' references node '{node}' which has not been resequenced")]
    UnresolvedEdgeEndpoint { edge: String, node: String },

    #[error("Duplicate session '{0}' in unified network")]
    DuplicateSession(String),

    #[error("Invalid export options: {0}")]
    InvalidOptions(String),

    #[error("Formatting error: {0}")]
    Format(#[from] std::fmt::Error),

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ExportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Get an error code for this error type.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            Self::UnknownEntityKind(_) => "UNKNOWN_ENTITY_KIND",
            Self::MissingCategoricalOptions { .. } => "MISSING_CATEGORICAL_OPTIONS",
            Self::UnresolvedEdgeEndpoint { .. } => "UNRESOLVED_EDGE_ENDPOINT",
            Self::DuplicateSession(_) => "DUPLICATE_SESSION",
            Self::InvalidOptions(_) => "INVALID_OPTIONS",
            Self::Format(_) => "FORMAT",
            Self::Io { .. } => "IO",
            Self::Json(_) => "JSON",
            Self::Yaml(_) => "YAML",
        }
    }

    /// Structural errors in the input; sink and parse failures are not.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Io { .. } | Self::Json(_) | Self::Yaml(_))
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;
