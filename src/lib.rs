//! Network Export - codebook-driven GraphML export of interview sessions.
//!
//! Converts one or more interview sessions (an ego, the people and places it
//! named, the relationships between them) into a GraphML document whose key
//! schema is derived from the study codebook.
//!
//! # Architecture
//!
//! ```text
//! sessions ──► preprocess (ego attribution, resequencing, unify)
//!                 │
//!                 ▼
//!              Network ──► graphml::keys      (pass 1: <key> schema)
//!                      ──► graphml::elements  (pass 2: <node>/<edge>/<data>)
//!                      ──► graphml::document  (lazy fragment stream)
//!                                 │
//!                                 ▼
//!                           sink::StorageSink
//! ```
//!
//! The [`codebook`] resolver is consulted by every stage.
//!
//! # Example
//!
//! ```
//! use network_export::{ExportOptions, GraphMlDocument, prepare_networks};
//! use network_types::{Codebook, Ego, Node, Session, SessionVariables};
//!
//! let session = Session {
//!     ego: Ego::new("ego-1"),
//!     nodes: vec![Node::new("n-1", "person").with_attribute("nickname", "Al")],
//!     edges: vec![],
//!     session_variables: SessionVariables {
//!         case_id: "case 1".into(),
//!         session_uuid: "s-1".into(),
//!         protocol_name: "Study".into(),
//!         remote_protocol_id: "p-1".into(),
//!         export_time: chrono::Utc::now(),
//!         start_time: None,
//!         finish_time: None,
//!     },
//! };
//! let codebook = Codebook::default();
//! let options = ExportOptions::default();
//!
//! let networks = prepare_networks(&[session], &options).unwrap();
//! let xml = GraphMlDocument::new(&networks[0], &codebook, &options)
//!     .unwrap()
//!     .into_string()
//!     .unwrap();
//! assert!(xml.contains(r#"<node id="1">"#));
//! ```

pub mod codebook;
pub mod config;
mod error;
pub mod format;
pub mod graphml;
pub mod logging;
pub mod preprocess;
pub mod sink;
pub mod values;

// Re-exports
pub use codebook::{
    get_entity_attribute, infer_numeric_type, validate_codebook, AttributeProperty, InferredType,
    ResolvedProperty,
};
pub use config::ExportOptions;
pub use error::{ExportError, Result};
pub use format::{export_file_name, ExportFormat};
pub use graphml::{GraphMlDocument, DEFAULT_BATCH_SIZE};
pub use preprocess::{
    insert_ego_into_sessions, insert_network_ego, partition_network, partition_network_by_type,
    prepare_networks, process_entity_variables, resequence_ids, SessionPartition,
};
pub use sink::{export_sessions, export_to_sink, ExportSummary, FsSink, MemorySink, StorageSink};
