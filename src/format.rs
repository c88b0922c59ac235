//! Export formats and output file naming.

use crate::error::ExportError;
use network_types::{EntityKind, SessionVariables};
use std::fmt;
use std::str::FromStr;

/// Output formats that share the preprocessing pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// Whole-graph XML document.
    GraphMl,
    /// One table of node attributes per node subtype.
    AttributeList,
    /// One edge list per edge subtype.
    EdgeList,
    /// One adjacency matrix per edge subtype.
    AdjacencyMatrix,
    /// Ego attribute table.
    Ego,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::GraphMl => "graphml",
            ExportFormat::AttributeList => "attributeList",
            ExportFormat::EdgeList => "edgeList",
            ExportFormat::AdjacencyMatrix => "adjacencyMatrix",
            ExportFormat::Ego => "ego",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::GraphMl => ".graphml",
            _ => ".csv",
        }
    }

    /// Entity kind a format needs one output per subtype of, if any.
    pub fn partition_kind(&self) -> Option<EntityKind> {
        match self {
            ExportFormat::GraphMl | ExportFormat::Ego => None,
            ExportFormat::AttributeList => Some(EntityKind::Node),
            ExportFormat::EdgeList | ExportFormat::AdjacencyMatrix => Some(EntityKind::Edge),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "graphml" => Ok(ExportFormat::GraphMl),
            "attributeList" => Ok(ExportFormat::AttributeList),
            "edgeList" => Ok(ExportFormat::EdgeList),
            "adjacencyMatrix" => Ok(ExportFormat::AdjacencyMatrix),
            "ego" => Ok(ExportFormat::Ego),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Replace anything outside `[A-Za-z0-9._-]` so the name is safe on every platform.
pub fn sanitize_file_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || ch == '.' {
                ch
            } else {
                '_'
            }
        })
        .collect();
    if sanitized.is_empty() {
        "export".to_string()
    } else {
        sanitized
    }
}

/// `{caseId}_{sessionUUID}`, for per-session files.
pub fn session_file_prefix(variables: &SessionVariables) -> String {
    format!(
        "{}_{}",
        sanitize_file_name(&variables.case_id),
        sanitize_file_name(&variables.session_uuid)
    )
}

/// Protocol name, for files combining several sessions.
pub fn unified_file_prefix(variables: &SessionVariables) -> String {
    sanitize_file_name(&variables.protocol_name)
}

/// `{prefix}_{format}[_{partitionEntity}]{extension}`.
pub fn export_file_name(
    prefix: &str,
    format: ExportFormat,
    partition_entity: Option<&str>,
) -> String {
    match partition_entity {
        Some(entity) => format!(
            "{}_{}_{}{}",
            prefix,
            format,
            sanitize_file_name(entity),
            format.extension()
        ),
        None => format!("{}_{}{}", prefix, format, format.extension()),
    }
}
