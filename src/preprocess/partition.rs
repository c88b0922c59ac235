//! Network partitioning.
//!
//! Table-oriented formats need one output per entity subtype; whole-graph
//! formats take the session as is.

use crate::codebook::entity_type_name;
use crate::error::Result;
use crate::format::ExportFormat;
use indexmap::IndexMap;
use network_types::{Codebook, EntityKind, Session};

/// A session, or the slice of it holding one entity subtype.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionPartition {
    pub session: Session,
    /// Display name of the subtype this partition holds, for file naming.
    pub partition_entity: Option<String>,
}

impl SessionPartition {
    fn whole(session: &Session) -> Self {
        Self {
            session: session.clone(),
            partition_entity: None,
        }
    }
}

/// Resolved display name used to tag a partition.
pub fn partition_entity(codebook: &Codebook, kind: EntityKind, entity_type: &str) -> String {
    entity_type_name(codebook, kind, Some(entity_type))
}

/// Split a session by subtype when `format` needs one table per subtype.
///
/// A session with no entities of the partitioned kind comes back unchanged.
pub fn partition_network_by_type(
    codebook: &Codebook,
    session: &Session,
    format: ExportFormat,
) -> Vec<SessionPartition> {
    match format.partition_kind() {
        None => vec![SessionPartition::whole(session)],
        Some(EntityKind::Node) => {
            if session.nodes.is_empty() {
                return vec![SessionPartition::whole(session)];
            }
            let mut groups: IndexMap<&str, Vec<_>> = IndexMap::new();
            for node in &session.nodes {
                groups.entry(node.node_type.as_str()).or_default().push(node.clone());
            }
            groups
                .into_iter()
                .map(|(node_type, nodes)| SessionPartition {
                    session: Session {
                        nodes,
                        ..session.clone()
                    },
                    partition_entity: Some(partition_entity(codebook, EntityKind::Node, node_type)),
                })
                .collect()
        }
        Some(_) => {
            if session.edges.is_empty() {
                return vec![SessionPartition::whole(session)];
            }
            let mut groups: IndexMap<&str, Vec<_>> = IndexMap::new();
            for edge in &session.edges {
                groups.entry(edge.edge_type.as_str()).or_default().push(edge.clone());
            }
            groups
                .into_iter()
                .map(|(edge_type, edges)| SessionPartition {
                    session: Session {
                        edges,
                        ..session.clone()
                    },
                    partition_entity: Some(partition_entity(codebook, EntityKind::Edge, edge_type)),
                })
                .collect()
        }
    }
}

/// Same as [`partition_network_by_type`], naming the format as text.
///
/// Unknown format names are rejected before any work is done.
pub fn partition_network(
    codebook: &Codebook,
    session: &Session,
    format: &str,
) -> Result<Vec<SessionPartition>> {
    let format: ExportFormat = format.parse()?;
    Ok(partition_network_by_type(codebook, session, format))
}
