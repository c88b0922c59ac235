//! Identifier derivation and attribute encoding plans.
//!
//! Key declarations and data elements both go through [`encode_attribute`],
//! so a `<data key="..">` can never name an identifier that the key schema
//! derived differently.

use network_types::{Codebook, NetworkEntity, VariableOption, VariableType};
use sha2::{Digest, Sha256};

/// Node display label.
pub const LABEL_KEY: &str = "label";
/// Resolved subtype display name.
pub const TYPE_KEY: &str = "networkCanvasType";
/// Original primary key of a node or edge.
pub const UUID_KEY: &str = "networkCanvasUUID";
/// Original primary key of an edge's source node.
pub const SOURCE_UUID_KEY: &str = "networkCanvasSourceUUID";
/// Original primary key of an edge's target node.
pub const TARGET_UUID_KEY: &str = "networkCanvasTargetUUID";
/// Primary key of a session's ego, attached to its graph.
pub const EGO_UUID_KEY: &str = "networkCanvasEgoUUID";

/// Primitive `attr.type` values of the GraphML dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphMlType {
    Boolean,
    Int,
    Double,
    String,
}

impl GraphMlType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GraphMlType::Boolean => "boolean",
            GraphMlType::Int => "int",
            GraphMlType::Double => "double",
            GraphMlType::String => "string",
        }
    }
}

/// Lowercase hex SHA-256 of `raw`; always a valid NMTOKEN.
pub fn hash_identifier(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}

/// Key id of one categorical option.
pub fn option_identifier(key: &str, option: &VariableOption) -> String {
    format!("{}_{}", key, hash_identifier(&option.value_text()))
}

pub fn layout_identifiers(key: &str) -> (String, String) {
    (format!("{}_X", key), format!("{}_Y", key))
}

pub fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// How one attribute of one entity is represented in the document.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeEncoding<'a> {
    /// Codebook variable stored in a single field, keyed by its raw id.
    Field {
        id: String,
        name: &'a str,
        variable_type: VariableType,
    },
    /// One boolean field per option.
    Categorical {
        name: &'a str,
        options: Vec<(String, &'a VariableOption)>,
    },
    /// Separate X and Y fields.
    Layout { name: &'a str, x: String, y: String },
    /// Data the codebook does not describe, keyed by the hash of its name.
    External { id: String, name: &'a str },
}

/// Resolve the encoding of attribute `key` on `entity`.
pub fn encode_attribute<'a, E: NetworkEntity>(
    codebook: &'a Codebook,
    entity: &E,
    key: &'a str,
) -> AttributeEncoding<'a> {
    let Some(variable) = codebook.variable(E::KIND, entity.entity_type(), key) else {
        return AttributeEncoding::External {
            id: hash_identifier(key),
            name: key,
        };
    };
    let name = variable.name.as_str();

    match variable.variable_type {
        VariableType::Categorical => AttributeEncoding::Categorical {
            name,
            options: variable
                .options
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(|option| (option_identifier(key, option), option))
                .collect(),
        },
        VariableType::Layout => {
            let (x, y) = layout_identifiers(key);
            AttributeEncoding::Layout { name, x, y }
        }
        variable_type => AttributeEncoding::Field {
            id: key.to_string(),
            name,
            variable_type,
        },
    }
}
