//! Shared fixtures for integration tests.
//!
//! Two interview sessions, each with one ego, two people (a categorical and a
//! layout attribute each) and one relationship.

#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use network_types::{
    Codebook, Edge, Ego, EntityDefinition, Node, Session, SessionVariables, VariableDefinition,
    VariableOption, VariableType,
};
use serde_json::json;

pub const PERSON: &str = "person";
pub const KNOWS: &str = "knows";
pub const NAME: &str = "v-name";
pub const CLOSENESS: &str = "v-close";
pub const POSITION: &str = "v-pos";
pub const STRENGTH: &str = "v-strength";
pub const EGO_AGE: &str = "e-age";

pub fn codebook() -> Codebook {
    let mut codebook = Codebook::default();
    codebook.node.insert(
        PERSON.into(),
        EntityDefinition::new("Person")
            .with_variable(NAME, VariableDefinition::new("Name", VariableType::Text))
            .with_variable(
                CLOSENESS,
                VariableDefinition::new("Closeness", VariableType::Categorical).with_options(vec![
                    VariableOption::new("A", "Family"),
                    VariableOption::new("B", "Work"),
                    VariableOption::new("C", "School"),
                ]),
            )
            .with_variable(POSITION, VariableDefinition::new("Position", VariableType::Layout)),
    );
    codebook.edge.insert(
        KNOWS.into(),
        EntityDefinition::new("Knows")
            .with_variable(STRENGTH, VariableDefinition::new("Strength", VariableType::Ordinal)),
    );
    codebook.ego = Some(
        EntityDefinition::default()
            .with_variable(EGO_AGE, VariableDefinition::new("Age", VariableType::Number)),
    );
    codebook
}

pub fn session(id: &str, ego_age: u64) -> Session {
    let a = format!("{}-node-a", id);
    let b = format!("{}-node-b", id);
    Session {
        ego: Ego::new(format!("{}-ego", id)).with_attribute(EGO_AGE, ego_age),
        nodes: vec![
            Node::new(a.clone(), PERSON)
                .with_attribute(NAME, format!("Alex ({})", id))
                .with_attribute(CLOSENESS, json!(["A", "C"]))
                .with_attribute(POSITION, json!({ "x": 0.25, "y": 0.75 })),
            Node::new(b.clone(), PERSON)
                .with_attribute(NAME, "Sam & Jo")
                .with_attribute(CLOSENESS, json!(["B"]))
                .with_attribute(POSITION, json!({ "x": 0.5, "y": 0.5 }))
                .with_attribute("favourite colour", "green"),
        ],
        edges: vec![Edge::new(format!("{}-edge", id), KNOWS, a, b).with_attribute(STRENGTH, 3)],
        session_variables: SessionVariables {
            case_id: format!("case {}", id),
            session_uuid: id.to_string(),
            protocol_name: "Friendship Study".into(),
            remote_protocol_id: "protocol-1".into(),
            export_time: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            start_time: Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()),
            finish_time: None,
        },
    }
}

pub fn sessions() -> Vec<Session> {
    vec![session("s1", 34), session("s2", 51)]
}
