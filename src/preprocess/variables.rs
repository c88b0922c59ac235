//! Attribute renaming for tabular exports.
//!
//! Codebook variable ids become display names; categorical variables fan out
//! into one boolean column per option and layout variables into `_x`/`_y`.

use crate::codebook::resolve_variable;
use crate::config::ExportOptions;
use crate::values::{selection_includes, LayoutPoint};
use network_types::{Attributes, Codebook, NetworkEntity, Session, VariableType};
use serde_json::Value;

/// Copy of `entity` with its attributes keyed by display name.
pub fn process_entity_variables<E>(entity: &E, codebook: &Codebook, options: &ExportOptions) -> E
where
    E: NetworkEntity + Clone,
{
    let mut renamed = Attributes::new();

    for (key, value) in entity.attributes() {
        let Some(variable) = resolve_variable(codebook, entity, key) else {
            renamed.insert(key.clone(), value.clone());
            continue;
        };

        match variable.variable_type {
            VariableType::Categorical => {
                for option in variable.options.as_deref().unwrap_or_default() {
                    renamed.insert(
                        format!("{}_{}", variable.name, option.value_text()),
                        Value::Bool(selection_includes(value, &option.value)),
                    );
                }
            }
            VariableType::Layout => {
                if let Some(point) = LayoutPoint::from_value(value) {
                    let point = point.project(options);
                    renamed.insert(format!("{}_x", variable.name), Value::from(point.x));
                    renamed.insert(format!("{}_y", variable.name), Value::from(point.y));
                }
            }
            _ => {
                renamed.insert(variable.name.clone(), value.clone());
            }
        }
    }

    let mut processed = entity.clone();
    *processed.attributes_mut() = renamed;
    processed
}

/// Rename the attributes of the ego and of every node and edge of a session.
pub fn process_session_variables(
    session: &Session,
    codebook: &Codebook,
    options: &ExportOptions,
) -> Session {
    Session {
        ego: process_entity_variables(&session.ego, codebook, options),
        nodes: session
            .nodes
            .iter()
            .map(|node| process_entity_variables(node, codebook, options))
            .collect(),
        edges: session
            .edges
            .iter()
            .map(|edge| process_entity_variables(edge, codebook, options))
            .collect(),
        session_variables: session.session_variables.clone(),
    }
}
