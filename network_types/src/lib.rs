//! Network Types - Foundation Types for Interview Network Export
//!
//! This crate contains the pure data structures shared by every stage of the
//! exporter: the variable-definition schema ("codebook"), the entities captured
//! during an interview session, and the aggregate network shapes handed to the
//! GraphML encoder.
//!
//! ## Contents
//!
//! - Codebook model: entity definitions, variable definitions, categorical options
//! - Entity records: [`Node`], [`Edge`], [`Ego`] and the [`NetworkEntity`] accessor trait
//! - Sessions: [`Session`], [`SessionVariables`]
//! - Aggregates: [`Network`], [`UnifiedNetwork`]
//!
//! ## Rules
//!
//! 1. **NO BUSINESS LOGIC** - resolution, preprocessing and encoding live in the exporter
//!    crate
//! 2. **SERIALIZABLE** - every type round-trips through serde using the capture format's
//!    field names
//! 3. **RESERVED PROPERTIES ARE FIELDS** - ego attribution and export ids are struct fields,
//!    never injected into the attribute map

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Attribute map of an entity: codebook variable ids (or external names) to raw values.
pub type Attributes = IndexMap<String, Value>;

/// Session identifier (the session UUID).
pub type SessionId = String;

// ============================================================================
// ENTITY KINDS
// ============================================================================

/// The three codebook namespaces an entity can be typed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Node,
    Edge,
    Ego,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Node => "node",
            EntityKind::Edge => "edge",
            EntityKind::Ego => "ego",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when an entity kind name is not one of `node`, `edge`, `ego`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown entity kind: '{0}'")]
pub struct UnknownEntityKind(pub String);

impl FromStr for EntityKind {
    type Err = UnknownEntityKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "node" => Ok(EntityKind::Node),
            "edge" => Ok(EntityKind::Edge),
            "ego" => Ok(EntityKind::Ego),
            other => Err(UnknownEntityKind(other.to_string())),
        }
    }
}

// ============================================================================
// CODEBOOK
// ============================================================================

/// Semantic type of a codebook variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableType {
    Boolean,
    Ordinal,
    Number,
    Scalar,
    Text,
    Datetime,
    Categorical,
    Layout,
}

impl VariableType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariableType::Boolean => "boolean",
            VariableType::Ordinal => "ordinal",
            VariableType::Number => "number",
            VariableType::Scalar => "scalar",
            VariableType::Text => "text",
            VariableType::Datetime => "datetime",
            VariableType::Categorical => "categorical",
            VariableType::Layout => "layout",
        }
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One selectable option of a categorical (or ordinal) variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableOption {
    /// Stored value; strings and numbers both occur in captured data.
    pub value: Value,
    #[serde(default)]
    pub label: String,
}

impl VariableOption {
    pub fn new(value: impl Into<Value>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }

    /// Option value as text: strings verbatim, everything else JSON-rendered.
    pub fn value_text(&self) -> String {
        match &self.value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Declared name, type and options of a single variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub variable_type: VariableType,
    /// Present only for categorical and ordinal variables.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<VariableOption>>,
}

impl VariableDefinition {
    pub fn new(name: impl Into<String>, variable_type: VariableType) -> Self {
        Self {
            name: name.into(),
            variable_type,
            options: None,
        }
    }

    pub fn with_options(mut self, options: Vec<VariableOption>) -> Self {
        self.options = Some(options);
        self
    }
}

/// Definition of one entity subtype (or of the ego namespace).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityDefinition {
    /// Display name of the subtype, e.g. "Person".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Variables in declaration order.
    #[serde(default)]
    pub variables: IndexMap<String, VariableDefinition>,
}

impl EntityDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            variables: IndexMap::new(),
        }
    }

    pub fn with_variable(mut self, key: impl Into<String>, variable: VariableDefinition) -> Self {
        self.variables.insert(key.into(), variable);
        self
    }
}

/// Variable schema for every entity kind and subtype.
///
/// Codebooks are frequently partial, so every level is optional and lookups
/// return `None` instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Codebook {
    #[serde(default)]
    pub node: IndexMap<String, EntityDefinition>,
    #[serde(default)]
    pub edge: IndexMap<String, EntityDefinition>,
    /// The ego has a single flat namespace; it is not keyed by subtype.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ego: Option<EntityDefinition>,
}

impl Codebook {
    /// Look up the definition for an entity kind and subtype.
    ///
    /// The subtype is ignored for [`EntityKind::Ego`].
    pub fn entity_definition(
        &self,
        kind: EntityKind,
        entity_type: Option<&str>,
    ) -> Option<&EntityDefinition> {
        match kind {
            EntityKind::Node => entity_type.and_then(|t| self.node.get(t)),
            EntityKind::Edge => entity_type.and_then(|t| self.edge.get(t)),
            EntityKind::Ego => self.ego.as_ref(),
        }
    }

    /// Look up a single variable definition by its raw attribute key.
    pub fn variable(
        &self,
        kind: EntityKind,
        entity_type: Option<&str>,
        key: &str,
    ) -> Option<&VariableDefinition> {
        self.entity_definition(kind, entity_type)?
            .variables
            .get(key)
    }

    /// Every definition in the codebook with its kind and subtype id.
    pub fn definitions(
        &self,
    ) -> impl Iterator<Item = (EntityKind, Option<&str>, &EntityDefinition)> {
        let nodes = self
            .node
            .iter()
            .map(|(t, d)| (EntityKind::Node, Some(t.as_str()), d));
        let edges = self
            .edge
            .iter()
            .map(|(t, d)| (EntityKind::Edge, Some(t.as_str()), d));
        let ego = self.ego.iter().map(|d| (EntityKind::Ego, None, d));
        nodes.chain(edges).chain(ego)
    }
}

// ============================================================================
// ENTITIES
// ============================================================================

/// Read access shared by nodes, edges and egos.
pub trait NetworkEntity {
    /// Codebook namespace the entity is typed under.
    const KIND: EntityKind;

    /// Primary key (a UUID in captured data).
    fn uid(&self) -> Option<&str>;

    /// Subtype id; `None` for the ego.
    fn entity_type(&self) -> Option<&str>;

    fn attributes(&self) -> &Attributes;

    fn attributes_mut(&mut self) -> &mut Attributes;

    /// Resequenced export id, once assigned.
    fn export_id(&self) -> Option<u64>;
}

/// A person or place named during the interview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    #[serde(rename = "_uid", default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub attributes: Attributes,
    /// Primary key of the ego of the session this node was captured in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ego: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_id: Option<u64>,
}

impl Node {
    pub fn new(uid: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            uid: Some(uid.into()),
            node_type: node_type.into(),
            attributes: Attributes::new(),
            ego: None,
            export_id: None,
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

impl NetworkEntity for Node {
    const KIND: EntityKind = EntityKind::Node;

    fn uid(&self) -> Option<&str> {
        self.uid.as_deref()
    }

    fn entity_type(&self) -> Option<&str> {
        Some(&self.node_type)
    }

    fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }

    fn export_id(&self) -> Option<u64> {
        self.export_id
    }
}

/// A relationship between two nodes of the same session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    #[serde(rename = "_uid", default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(rename = "type")]
    pub edge_type: String,
    /// Primary key of the source node.
    pub from: String,
    /// Primary key of the target node.
    pub to: String,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ego: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_id: Option<u64>,
    /// Export id of the source node, assigned during resequencing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_export_id: Option<u64>,
    /// Export id of the target node, assigned during resequencing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_export_id: Option<u64>,
}

impl Edge {
    pub fn new(
        uid: impl Into<String>,
        edge_type: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        Self {
            uid: Some(uid.into()),
            edge_type: edge_type.into(),
            from: from.into(),
            to: to.into(),
            attributes: Attributes::new(),
            ego: None,
            export_id: None,
            from_export_id: None,
            to_export_id: None,
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

impl NetworkEntity for Edge {
    const KIND: EntityKind = EntityKind::Edge;

    fn uid(&self) -> Option<&str> {
        self.uid.as_deref()
    }

    fn entity_type(&self) -> Option<&str> {
        Some(&self.edge_type)
    }

    fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }

    fn export_id(&self) -> Option<u64> {
        self.export_id
    }
}

/// The respondent of one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ego {
    #[serde(rename = "_uid", default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default)]
    pub attributes: Attributes,
}

impl Ego {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: Some(uid.into()),
            attributes: Attributes::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

impl NetworkEntity for Ego {
    const KIND: EntityKind = EntityKind::Ego;

    fn uid(&self) -> Option<&str> {
        self.uid.as_deref()
    }

    fn entity_type(&self) -> Option<&str> {
        None
    }

    fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }

    fn export_id(&self) -> Option<u64> {
        None
    }
}

// ============================================================================
// SESSIONS AND NETWORKS
// ============================================================================

/// Metadata describing one interview session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionVariables {
    pub case_id: String,
    #[serde(rename = "sessionUUID")]
    pub session_uuid: SessionId,
    pub protocol_name: String,
    #[serde(rename = "remoteProtocolID")]
    pub remote_protocol_id: String,
    pub export_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_time: Option<DateTime<Utc>>,
}

/// Everything captured in one interview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub ego: Ego,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    pub session_variables: SessionVariables,
}

impl Session {
    pub fn session_id(&self) -> &str {
        &self.session_variables.session_uuid
    }
}

/// Several sessions indexed by session id, in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedNetwork {
    pub nodes: IndexMap<SessionId, Vec<Node>>,
    pub edges: IndexMap<SessionId, Vec<Edge>>,
    pub ego: IndexMap<SessionId, Ego>,
    pub session_variables: IndexMap<SessionId, SessionVariables>,
}

impl UnifiedNetwork {
    /// Session ids in the order their session variables were inserted.
    pub fn session_ids(&self) -> impl Iterator<Item = &str> {
        self.session_variables.keys().map(String::as_str)
    }

    pub fn nodes_for(&self, session_id: &str) -> &[Node] {
        self.nodes.get(session_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn edges_for(&self, session_id: &str) -> &[Edge] {
        self.edges.get(session_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn ego_for(&self, session_id: &str) -> Option<&Ego> {
        self.ego.get(session_id)
    }

    pub fn all_nodes(&self) -> impl Iterator<Item = &Node> + Clone {
        self.nodes.values().flatten()
    }

    pub fn all_edges(&self) -> impl Iterator<Item = &Edge> + Clone {
        self.edges.values().flatten()
    }

    pub fn all_egos(&self) -> impl Iterator<Item = &Ego> + Clone {
        self.ego.values()
    }

    pub fn session_count(&self) -> usize {
        self.session_variables.len()
    }
}

/// Input to the GraphML encoder: one session, or several unified sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "camelCase")]
pub enum Network {
    Single(Session),
    Unified(UnifiedNetwork),
}
