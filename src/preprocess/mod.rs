//! Entity preprocessing pipeline.
//!
//! Turns raw sessions into the normalized shape every export format consumes:
//!
//! ```text
//! sessions ──► ego attribution ──► resequencing ──► Network (single | unified)
//!                                                     │
//!                     tabular formats ◄── partitioning + variable renaming
//! ```
//!
//! Every stage returns new values; inputs are never mutated.

pub mod ego;
pub mod partition;
pub mod prepare;
pub mod resequence;
pub mod variables;

pub use ego::{insert_ego_into_sessions, insert_network_ego};
pub use partition::{
    partition_entity, partition_network, partition_network_by_type, SessionPartition,
};
pub use prepare::{prepare_networks, unify_sessions};
pub use resequence::{resequence_ids, IdSequencer};
pub use variables::{process_entity_variables, process_session_variables};
