//! Network preparation: the preprocessing stages chained for GraphML export.

use super::{insert_ego_into_sessions, resequence_ids};
use crate::config::ExportOptions;
use crate::error::{ExportError, Result};
use network_types::{Network, Session, UnifiedNetwork};

/// Index sessions by session id, keeping input order.
pub fn unify_sessions(sessions: Vec<Session>) -> Result<UnifiedNetwork> {
    let mut unified = UnifiedNetwork::default();
    for session in sessions {
        let id = session.session_variables.session_uuid.clone();
        if unified.session_variables.contains_key(&id) {
            return Err(ExportError::DuplicateSession(id));
        }
        unified.nodes.insert(id.clone(), session.nodes);
        unified.edges.insert(id.clone(), session.edges);
        unified.ego.insert(id.clone(), session.ego);
        unified.session_variables.insert(id, session.session_variables);
    }
    Ok(unified)
}

/// Ego attribution, resequencing, then one network per output document.
///
/// With `unify_networks` every session lands in a single unified network;
/// otherwise each session becomes its own network.
pub fn prepare_networks(sessions: &[Session], options: &ExportOptions) -> Result<Vec<Network>> {
    let attributed = insert_ego_into_sessions(sessions);
    let resequenced = resequence_ids(&attributed)?;

    if options.unify_networks {
        let unified = unify_sessions(resequenced)?;
        tracing::debug!(sessions = unified.session_count(), "unified sessions into one network");
        Ok(vec![Network::Unified(unified)])
    } else {
        Ok(resequenced.into_iter().map(Network::Single).collect())
    }
}
