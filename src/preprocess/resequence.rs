//! ID resequencing.
//!
//! Replaces UUID identities with compact integers for human-readable output.
//! One counter runs across every session of an export, so ids never repeat
//! in a combined document.

use crate::error::{ExportError, Result};
use network_types::{Edge, Node, Session};
use std::collections::HashMap;

/// Export-scoped counter plus the primary key → export id map.
#[derive(Debug)]
pub struct IdSequencer {
    next_id: u64,
    assigned: HashMap<String, u64>,
}

impl Default for IdSequencer {
    fn default() -> Self {
        Self {
            next_id: 1,
            assigned: HashMap::new(),
        }
    }
}

impl IdSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Export id assigned to a node primary key so far.
    pub fn lookup(&self, uid: &str) -> Option<u64> {
        self.assigned.get(uid).copied()
    }

    /// Number of ids handed out so far.
    pub fn issued(&self) -> u64 {
        self.next_id - 1
    }

    pub fn resequence_node(&mut self, node: &Node) -> Node {
        let id = self.next_id();
        if let Some(uid) = &node.uid {
            self.assigned.insert(uid.clone(), id);
        }
        Node {
            export_id: Some(id),
            ..node.clone()
        }
    }

    /// Both endpoints must already have been resequenced.
    pub fn resequence_edge(&mut self, edge: &Edge) -> Result<Edge> {
        let id = self.next_id();
        let from = self.endpoint(edge, &edge.from)?;
        let to = self.endpoint(edge, &edge.to)?;
        Ok(Edge {
            export_id: Some(id),
            from_export_id: Some(from),
            to_export_id: Some(to),
            ..edge.clone()
        })
    }

    fn endpoint(&self, edge: &Edge, node: &str) -> Result<u64> {
        self.lookup(node)
            .ok_or_else(|| ExportError::UnresolvedEdgeEndpoint {
                edge: edge.uid.clone().unwrap_or_default(),
                node: node.to_string(),
            })
    }

    /// Nodes first, then edges, so edges can resolve their endpoints.
    pub fn resequence_session(&mut self, session: &Session) -> Result<Session> {
        let nodes = session
            .nodes
            .iter()
            .map(|node| self.resequence_node(node))
            .collect();
        let edges = session
            .edges
            .iter()
            .map(|edge| self.resequence_edge(edge))
            .collect::<Result<Vec<_>>>()?;
        Ok(Session {
            ego: session.ego.clone(),
            nodes,
            edges,
            session_variables: session.session_variables.clone(),
        })
    }
}

/// Resequence every session in input order with one shared counter.
pub fn resequence_ids(sessions: &[Session]) -> Result<Vec<Session>> {
    let mut sequencer = IdSequencer::new();
    let resequenced = sessions
        .iter()
        .map(|session| sequencer.resequence_session(session))
        .collect::<Result<Vec<_>>>()?;
    tracing::debug!(
        sessions = resequenced.len(),
        ids = sequencer.issued(),
        "resequenced entity ids"
    );
    Ok(resequenced)
}
