//! GraphML encoding engine.
//!
//! Two passes over the same attribute plan:
//!
//! 1. [`keys`] declares one `<key>` per distinct attribute (fanned out for
//!    categorical and layout variables).
//! 2. [`elements`] writes `<node>`/`<edge>` elements and ego `<data>` against
//!    those declarations.
//!
//! [`document`] orders both passes into a lazy fragment stream.

pub mod document;
pub mod elements;
pub mod encoding;
pub mod keys;

pub use document::{GraphMlDocument, DEFAULT_BATCH_SIZE};
pub use elements::{edge_elements, ego_data_elements, node_elements, ElementContext};
pub use encoding::{encode_attribute, hash_identifier, xml_escape, AttributeEncoding, GraphMlType};
pub use keys::{generate_key_elements, key_target};
