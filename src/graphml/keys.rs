//! Key-schema generation: the `<key>` declarations for one entity kind.

use super::encoding::{
    encode_attribute, xml_escape, AttributeEncoding, GraphMlType, EGO_UUID_KEY, LABEL_KEY,
    SOURCE_UUID_KEY, TARGET_UUID_KEY, TYPE_KEY, UUID_KEY,
};
use crate::codebook::{infer_numeric_type, InferredType};
use crate::error::Result;
use network_types::{Codebook, EntityKind, NetworkEntity, VariableType};
use std::collections::HashSet;
use std::fmt::Write;

/// Value of the `for` attribute; ego data hangs off the graph element.
pub fn key_target(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Node => "node",
        EntityKind::Edge => "edge",
        EntityKind::Ego => "graph",
    }
}

fn write_key(
    xml: &mut String,
    id: &str,
    name: &str,
    attr_type: GraphMlType,
    target: &str,
) -> Result<()> {
    writeln!(
        xml,
        r#"  <key id="{}" attr.name="{}" attr.type="{}" for="{}"/>"#,
        xml_escape(id),
        xml_escape(name),
        attr_type.as_str(),
        target
    )?;
    Ok(())
}

fn numeric_key_type<'a, E, I>(entities: I, key: &str) -> GraphMlType
where
    E: NetworkEntity + 'a,
    I: IntoIterator<Item = &'a E>,
{
    match infer_numeric_type(entities, key) {
        Some(InferredType::Int) => GraphMlType::Int,
        Some(InferredType::Double) => GraphMlType::Double,
        Some(InferredType::String) | None => GraphMlType::String,
    }
}

/// Declare every key needed by `entities`.
///
/// Reserved keys come first, then one declaration (or one fan-out group) per
/// distinct attribute, in first-seen order. Attributes in `excluded` are skipped.
pub fn generate_key_elements<'a, E, I>(
    entities: I,
    codebook: &Codebook,
    excluded: &[String],
) -> Result<String>
where
    E: NetworkEntity + 'a,
    I: IntoIterator<Item = &'a E> + Clone,
{
    let target = key_target(E::KIND);
    let mut xml = String::new();

    let reserved: &[&str] = match E::KIND {
        EntityKind::Node => &[LABEL_KEY, TYPE_KEY, UUID_KEY],
        EntityKind::Edge => &[TYPE_KEY, UUID_KEY, SOURCE_UUID_KEY, TARGET_UUID_KEY],
        EntityKind::Ego => &[EGO_UUID_KEY],
    };
    for key in reserved {
        write_key(&mut xml, key, key, GraphMlType::String, target)?;
    }

    // Keyed by emitted id: the same attribute key can resolve to a codebook
    // field for one subtype and an external attribute for another.
    let mut declared: HashSet<String> = reserved.iter().map(|key| key.to_string()).collect();
    for entity in entities.clone() {
        for key in entity.attributes().keys() {
            let key = key.as_str();
            if excluded.iter().any(|k| k == key) {
                continue;
            }

            match encode_attribute(codebook, entity, key) {
                AttributeEncoding::Field {
                    id,
                    name,
                    variable_type,
                } => {
                    if declared.contains(&id) {
                        continue;
                    }
                    let attr_type = match variable_type {
                        VariableType::Boolean => GraphMlType::Boolean,
                        VariableType::Ordinal | VariableType::Number => {
                            numeric_key_type(entities.clone(), key)
                        }
                        VariableType::Scalar => GraphMlType::Double,
                        _ => GraphMlType::String,
                    };
                    write_key(&mut xml, &id, name, attr_type, target)?;
                    declared.insert(id);
                }
                AttributeEncoding::Categorical { name, options } => {
                    for (id, option) in options {
                        if declared.contains(&id) {
                            continue;
                        }
                        let option_name = format!("{}_{}", name, option.value_text());
                        write_key(&mut xml, &id, &option_name, GraphMlType::Boolean, target)?;
                        declared.insert(id);
                    }
                }
                AttributeEncoding::Layout { name, x, y } => {
                    for (id, axis) in [(x, "X"), (y, "Y")] {
                        if declared.contains(&id) {
                            continue;
                        }
                        let axis_name = format!("{}_{}", name, axis);
                        write_key(&mut xml, &id, &axis_name, GraphMlType::Double, target)?;
                        declared.insert(id);
                    }
                }
                AttributeEncoding::External { id, name } => {
                    if declared.contains(&id) {
                        continue;
                    }
                    write_key(&mut xml, &id, name, GraphMlType::String, target)?;
                    declared.insert(id);
                }
            }
        }
    }

    tracing::debug!(kind = E::KIND.as_str(), keys = declared.len(), "generated key schema");
    Ok(xml)
}
