//! Ego attribution.
//!
//! Stamps the ego's primary key onto every node and edge of its session so
//! entities keep their session attribution once sessions are flattened.

use network_types::Session;

/// Copy of `session` with every node and edge attributed to its ego.
pub fn insert_network_ego(session: &Session) -> Session {
    let mut session = session.clone();
    let ego_uid = session.ego.uid.clone();
    for node in &mut session.nodes {
        node.ego = ego_uid.clone();
    }
    for edge in &mut session.edges {
        edge.ego = ego_uid.clone();
    }
    session
}

pub fn insert_ego_into_sessions(sessions: &[Session]) -> Vec<Session> {
    sessions.iter().map(insert_network_ego).collect()
}
