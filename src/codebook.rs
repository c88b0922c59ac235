//! Codebook attribute resolution.
//!
//! Every later stage asks the same questions of the codebook: what is this
//! attribute called, what type is it, which options does it offer. Missing
//! levels are routine (external data, partial codebooks), so lookups return
//! `None` rather than erroring.

use crate::error::{ExportError, Result};
use network_types::{
    Codebook, EntityKind, NetworkEntity, VariableDefinition, VariableOption, VariableType,
};
use serde_json::Value;

/// Which property of a variable definition to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeProperty {
    Name,
    Type,
    Options,
}

/// A resolved variable property.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolvedProperty<'a> {
    Name(&'a str),
    Type(VariableType),
    Options(&'a [VariableOption]),
}

/// Resolve one property of a variable, naming the entity kind as text.
///
/// Returns `None` when the kind is not `node`/`edge`/`ego`, when the subtype
/// or variable is absent, or when the variable lacks the property.
pub fn get_entity_attribute<'a>(
    codebook: &'a Codebook,
    kind: &str,
    entity_type: Option<&str>,
    key: &str,
    property: AttributeProperty,
) -> Option<ResolvedProperty<'a>> {
    let kind: EntityKind = kind.parse().ok()?;
    let variable = codebook.variable(kind, entity_type, key)?;
    match property {
        AttributeProperty::Name => Some(ResolvedProperty::Name(&variable.name)),
        AttributeProperty::Type => Some(ResolvedProperty::Type(variable.variable_type)),
        AttributeProperty::Options => variable
            .options
            .as_deref()
            .map(ResolvedProperty::Options),
    }
}

/// Variable definition for an attribute of a concrete entity.
pub fn resolve_variable<'a, E: NetworkEntity>(
    codebook: &'a Codebook,
    entity: &E,
    key: &str,
) -> Option<&'a VariableDefinition> {
    codebook.variable(E::KIND, entity.entity_type(), key)
}

pub fn attribute_type<E: NetworkEntity>(
    codebook: &Codebook,
    entity: &E,
    key: &str,
) -> Option<VariableType> {
    resolve_variable(codebook, entity, key).map(|v| v.variable_type)
}

/// Display name of an attribute, falling back to the raw key.
pub fn attribute_name<'a, E: NetworkEntity>(
    codebook: &'a Codebook,
    entity: &E,
    key: &'a str,
) -> &'a str {
    resolve_variable(codebook, entity, key)
        .map(|v| v.name.as_str())
        .unwrap_or(key)
}

/// Display name of an entity subtype, falling back to the subtype id.
pub fn entity_type_name(
    codebook: &Codebook,
    kind: EntityKind,
    entity_type: Option<&str>,
) -> String {
    codebook
        .entity_definition(kind, entity_type)
        .and_then(|d| d.name.clone())
        .or_else(|| entity_type.map(str::to_string))
        .unwrap_or_else(|| kind.as_str().to_string())
}

/// First variable of a node subtype whose display name is "name", ignoring case.
pub fn node_label_variable<'a>(codebook: &'a Codebook, node_type: &str) -> Option<&'a str> {
    codebook
        .entity_definition(EntityKind::Node, Some(node_type))?
        .variables
        .iter()
        .find(|(_, v)| v.name.to_lowercase() == "name")
        .map(|(key, _)| key.as_str())
}

/// Every categorical variable must carry an options list to fan out into.
///
/// An empty list is accepted and produces no option fields.
pub fn validate_codebook(codebook: &Codebook) -> Result<()> {
    for (kind, entity_type, definition) in codebook.definitions() {
        for (key, variable) in &definition.variables {
            if variable.variable_type == VariableType::Categorical && variable.options.is_none() {
                return Err(ExportError::MissingCategoricalOptions {
                    kind,
                    entity_type: entity_type.unwrap_or(kind.as_str()).to_string(),
                    variable: key.clone(),
                });
            }
        }
    }
    Ok(())
}

// ============================================================================
// NUMERIC TYPE INFERENCE
// ============================================================================

/// Primitive type inferred for a numeric attribute by scanning its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferredType {
    Int,
    Double,
    String,
}

impl InferredType {
    fn classify(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Number(n) => {
                if n.is_i64() || n.is_u64() {
                    Some(Self::Int)
                } else {
                    match n.as_f64() {
                        Some(f) if f.fract() == 0.0 => Some(Self::Int),
                        _ => Some(Self::Double),
                    }
                }
            }
            Value::String(s) => Some(Self::classify_text(s)),
            _ => Some(Self::String),
        }
    }

    /// Strings count as numbers only when they round-trip exactly.
    fn classify_text(s: &str) -> Self {
        if s.parse::<i64>().map(|i| i.to_string() == s).unwrap_or(false) {
            return Self::Int;
        }
        match s.parse::<f64>() {
            Ok(f) if f.is_finite() && f.to_string() == s => Self::Double,
            _ => Self::String,
        }
    }

    /// Least specific type covering both; never narrows.
    fn widen(self, next: Self) -> Self {
        match (self, next) {
            (a, b) if a == b => a,
            (Self::Int, Self::Double) | (Self::Double, Self::Int) => Self::Double,
            _ => Self::String,
        }
    }
}

/// Infer the primitive type of `key` across a collection of entities.
///
/// Entities without a value for the key are skipped. Returns `None` when no
/// entity carries a value.
pub fn infer_numeric_type<'a, E, I>(entities: I, key: &str) -> Option<InferredType>
where
    E: NetworkEntity + 'a,
    I: IntoIterator<Item = &'a E>,
{
    entities
        .into_iter()
        .filter_map(|entity| entity.attributes().get(key))
        .filter_map(InferredType::classify)
        .fold(None, |acc, next| {
            Some(match acc {
                None => next,
                Some(current) => current.widen(next),
            })
        })
}
