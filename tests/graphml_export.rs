//! End-to-end GraphML export tests.
//!
//! Documents are parsed back with quick-xml so structure, escaping and the
//! key/data consistency rule are checked on the real output rather than on
//! substrings.

mod helpers;

use anyhow::{anyhow, Result};
use network_export::graphml::hash_identifier;
use network_export::{
    export_sessions, prepare_networks, ExportOptions, FsSink, GraphMlDocument, MemorySink,
};
use network_types::{Codebook, Edge, EntityDefinition, Network, Node};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;
use uuid::Uuid;

// =============================================================================
// DOCUMENT MODEL
// =============================================================================

type Attrs = BTreeMap<String, String>;

#[derive(Debug, Default)]
struct Element {
    attrs: Attrs,
    data: Vec<(String, String)>,
}

impl Element {
    fn data(&self, key: &str) -> Option<&str> {
        self.data
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Default)]
struct Graph {
    attrs: Attrs,
    ego_data: Vec<(String, String)>,
    nodes: Vec<Element>,
    edges: Vec<Element>,
}

#[derive(Debug, Default)]
struct Document {
    keys: Vec<Attrs>,
    graphs: Vec<Graph>,
    /// `<data>` keys with no earlier `<key>` for the same element kind.
    undeclared: Vec<String>,
}

impl Document {
    fn key(&self, id: &str, target: &str) -> Option<&Attrs> {
        self.keys.iter().find(|k| {
            k.get("id").map(String::as_str) == Some(id)
                && k.get("for").map(String::as_str) == Some(target)
        })
    }
}

fn attributes(e: &BytesStart<'_>) -> Result<Attrs> {
    let mut attrs = Attrs::new();
    for attr in e.attributes() {
        let attr = attr?;
        attrs.insert(
            String::from_utf8(attr.key.as_ref().to_vec())?,
            attr.unescape_value()?.into_owned(),
        );
    }
    Ok(attrs)
}

#[derive(Default)]
struct ParseState {
    doc: Document,
    element: Option<(String, Element)>,
    data: Option<(String, String)>,
}

impl ParseState {
    fn open(&mut self, e: &BytesStart<'_>, empty: bool) -> Result<()> {
        let name = String::from_utf8(e.name().as_ref().to_vec())?;
        let attrs = attributes(e)?;
        match name.as_str() {
            "key" => self.doc.keys.push(attrs),
            "graph" => self.doc.graphs.push(Graph {
                attrs,
                ..Graph::default()
            }),
            "node" | "edge" => {
                self.element = Some((name.clone(), Element { attrs, data: vec![] }));
                if empty {
                    self.close(&name)?;
                }
            }
            "data" => {
                let key = attrs
                    .get("key")
                    .cloned()
                    .ok_or_else(|| anyhow!("<data> without key"))?;
                let target = match &self.element {
                    Some((kind, _)) => kind.clone(),
                    None => "graph".to_string(),
                };
                if self.doc.key(&key, &target).is_none() {
                    self.doc.undeclared.push(format!("{}:{}", target, key));
                }
                self.data = Some((key, String::new()));
                if empty {
                    self.close("data")?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self, name: &str) -> Result<()> {
        let graph = self
            .doc
            .graphs
            .last_mut()
            .ok_or_else(|| anyhow!("<{}> outside a graph", name));
        match name {
            "data" => {
                let data = self.data.take().ok_or_else(|| anyhow!("unbalanced </data>"))?;
                match self.element.as_mut() {
                    Some((_, element)) => element.data.push(data),
                    None => graph?.ego_data.push(data),
                }
            }
            "node" | "edge" => {
                let (kind, element) = self
                    .element
                    .take()
                    .ok_or_else(|| anyhow!("unbalanced </{}>", name))?;
                let graph = graph?;
                if kind == "node" {
                    graph.nodes.push(element);
                } else {
                    graph.edges.push(element);
                }
            }
            _ => {}
        }
        Ok(())
    }
}

fn parse(xml: &str) -> Result<Document> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut state = ParseState::default();
    loop {
        match reader.read_event()? {
            Event::Start(e) => state.open(&e, false)?,
            Event::Empty(e) => state.open(&e, true)?,
            Event::Text(t) => {
                if let Some((_, text)) = state.data.as_mut() {
                    text.push_str(&t.unescape()?);
                }
            }
            Event::End(e) => {
                let name = String::from_utf8(e.name().as_ref().to_vec())?;
                state.close(&name)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(state.doc)
}

fn render(network: &Network, codebook: &Codebook, options: &ExportOptions) -> Result<String> {
    Ok(GraphMlDocument::new(network, codebook, options)?.into_string()?)
}

fn screen_options() -> ExportOptions {
    ExportOptions {
        screen_layout_width: 800.0,
        screen_layout_height: 600.0,
        ..ExportOptions::default()
    }
}

// =============================================================================
// SEPARATE SESSIONS
// =============================================================================

#[test]
fn separate_sessions_export_one_document_each() -> Result<()> {
    let codebook = helpers::codebook();
    let options = screen_options();
    let networks = prepare_networks(&helpers::sessions(), &options)?;
    assert_eq!(networks.len(), 2);

    let first = parse(&render(&networks[0], &codebook, &options)?)?;
    assert_eq!(first.graphs.len(), 1);
    let graph = &first.graphs[0];
    assert_eq!(graph.attrs["edgedefault"], "directed");
    assert_eq!(graph.attrs["nc:sessionUUID"], "s1");
    assert_eq!(graph.attrs["nc:caseId"], "case s1");
    assert_eq!(graph.attrs["nc:sessionExportTime"], "2024-03-01T12:00:00.000Z");
    assert_eq!(graph.attrs["nc:sessionStartTime"], "2024-03-01T10:00:00.000Z");
    assert!(!graph.attrs.contains_key("nc:sessionFinishTime"));
    assert_eq!(graph.nodes.len(), 2);
    assert_eq!(graph.edges.len(), 1);
    assert!(first.undeclared.is_empty(), "undeclared data: {:?}", first.undeclared);

    let second = parse(&render(&networks[1], &codebook, &options)?)?;
    let ids: Vec<&str> = second.graphs[0]
        .nodes
        .iter()
        .map(|n| n.attrs["id"].as_str())
        .collect();
    assert_eq!(ids, vec!["4", "5"]);
    let edge = &second.graphs[0].edges[0];
    assert_eq!(
        (edge.attrs["id"].as_str(), edge.attrs["source"].as_str(), edge.attrs["target"].as_str()),
        ("6", "4", "5")
    );
    assert_eq!(edge.data("networkCanvasSourceUUID"), Some("s2-node-a"));
    assert_eq!(edge.data("networkCanvasTargetUUID"), Some("s2-node-b"));
    assert_eq!(edge.data(helpers::STRENGTH), Some("3"));
    Ok(())
}

#[test]
fn node_values_match_literal_inputs() -> Result<()> {
    let codebook = helpers::codebook();
    let options = screen_options();
    let networks = prepare_networks(&helpers::sessions(), &options)?;
    let doc = parse(&render(&networks[0], &codebook, &options)?)?;
    let nodes = &doc.graphs[0].nodes;

    let alex = &nodes[0];
    assert_eq!(alex.data("label"), Some("Alex (s1)"));
    assert_eq!(alex.data("networkCanvasType"), Some("Person"));
    assert_eq!(alex.data("networkCanvasUUID"), Some("s1-node-a"));
    let closeness = |option: &str| format!("{}_{}", helpers::CLOSENESS, hash_identifier(option));
    assert_eq!(alex.data(&closeness("A")), Some("true"));
    assert_eq!(alex.data(&closeness("B")), Some("false"));
    assert_eq!(alex.data(&closeness("C")), Some("true"));
    assert_eq!(alex.data("v-pos_X"), Some("200.00"));
    assert_eq!(alex.data("v-pos_Y"), Some("150.00"));
    assert!(alex.data(helpers::CLOSENESS).is_none());
    assert!(alex.data(helpers::POSITION).is_none());

    let sam = &nodes[1];
    assert_eq!(sam.data("label"), Some("Sam & Jo"));
    assert_eq!(sam.data(&hash_identifier("favourite colour")), Some("green"));
    let external = doc
        .key(&hash_identifier("favourite colour"), "node")
        .ok_or_else(|| anyhow!("external attribute not declared"))?;
    assert_eq!(external["attr.name"], "favourite colour");
    assert_eq!(external["attr.type"], "string");
    Ok(())
}

#[test]
fn key_schema_is_typed_unique_and_nmtoken_safe() -> Result<()> {
    let codebook = helpers::codebook();
    let options = ExportOptions::default();
    let networks = prepare_networks(&helpers::sessions(), &options)?;
    let doc = parse(&render(&networks[0], &codebook, &options)?)?;

    let nmtoken = Regex::new(r"^[A-Za-z0-9._:-]+$")?;
    let mut seen = std::collections::HashSet::new();
    for key in &doc.keys {
        assert!(nmtoken.is_match(&key["id"]), "invalid key id {:?}", key["id"]);
        assert!(
            seen.insert((key["id"].clone(), key["for"].clone())),
            "duplicate key {:?}",
            key
        );
    }

    let type_of = |id: &str, target: &str| doc.key(id, target).map(|k| k["attr.type"].clone());
    assert_eq!(type_of(helpers::EGO_AGE, "graph").as_deref(), Some("int"));
    assert_eq!(type_of(helpers::STRENGTH, "edge").as_deref(), Some("int"));
    assert_eq!(type_of("v-pos_X", "node").as_deref(), Some("double"));
    assert_eq!(
        type_of(&format!("{}_{}", helpers::CLOSENESS, hash_identifier("B")), "node").as_deref(),
        Some("boolean")
    );
    assert_eq!(type_of(helpers::NAME, "node").as_deref(), Some("string"));
    Ok(())
}

#[test]
fn ego_data_attaches_to_graph() -> Result<()> {
    let codebook = helpers::codebook();
    let options = ExportOptions::default();
    let networks = prepare_networks(&helpers::sessions(), &options)?;
    let doc = parse(&render(&networks[1], &codebook, &options)?)?;

    assert_eq!(
        doc.graphs[0].ego_data,
        vec![
            ("networkCanvasEgoUUID".to_string(), "s2-ego".to_string()),
            (helpers::EGO_AGE.to_string(), "51".to_string()),
        ]
    );
    Ok(())
}

#[test]
fn shared_key_is_declared_for_every_subtype_encoding() -> Result<()> {
    let mut codebook = helpers::codebook();
    codebook.node.insert("venue".into(), EntityDefinition::new("Venue"));
    let options = ExportOptions::default();
    let mut session = helpers::session("s1", 34);
    session
        .nodes
        .push(Node::new("s1-venue", "venue").with_attribute(helpers::NAME, "Cafe"));
    let networks = prepare_networks(&[session], &options)?;
    let doc = parse(&render(&networks[0], &codebook, &options)?)?;

    assert!(doc.undeclared.is_empty(), "undeclared data: {:?}", doc.undeclared);
    let external = doc
        .key(&hash_identifier(helpers::NAME), "node")
        .ok_or_else(|| anyhow!("venue name not declared"))?;
    assert_eq!(external["attr.name"], helpers::NAME);
    assert_eq!(doc.key(helpers::NAME, "node").map(|k| k["attr.name"].as_str()), Some("Name"));

    let nodes = &doc.graphs[0].nodes;
    assert_eq!(nodes[0].data(helpers::NAME), Some("Alex (s1)"));
    assert_eq!(nodes[2].data(&hash_identifier(helpers::NAME)), Some("Cafe"));
    Ok(())
}

#[test]
fn integral_floats_render_like_their_int_key() -> Result<()> {
    let codebook = helpers::codebook();
    let options = ExportOptions::default();
    let mut session = helpers::session("s1", 34);
    session.edges = vec![
        Edge::new("s1-e1", helpers::KNOWS, "s1-node-a", "s1-node-b")
            .with_attribute(helpers::STRENGTH, 2.0),
        Edge::new("s1-e2", helpers::KNOWS, "s1-node-b", "s1-node-a")
            .with_attribute(helpers::STRENGTH, 3),
    ];
    let networks = prepare_networks(&[session], &options)?;
    let doc = parse(&render(&networks[0], &codebook, &options)?)?;

    let strength = doc
        .key(helpers::STRENGTH, "edge")
        .ok_or_else(|| anyhow!("strength not declared"))?;
    assert_eq!(strength["attr.type"], "int");
    let values: Vec<Option<&str>> = doc.graphs[0]
        .edges
        .iter()
        .map(|e| e.data(helpers::STRENGTH))
        .collect();
    assert_eq!(values, vec![Some("2"), Some("3")]);
    Ok(())
}

#[test]
fn node_without_primary_key_gets_fresh_uuid() -> Result<()> {
    network_export::logging::init_test_tracing();
    let codebook = helpers::codebook();
    let options = ExportOptions::default();
    let mut session = helpers::session("s1", 34);
    session.nodes[1].uid = None;
    session.edges.clear();
    let networks = prepare_networks(&[session], &options)?;
    let Network::Single(prepared) = &networks[0] else {
        return Err(anyhow!("expected a single-session network"));
    };
    assert_eq!(prepared.nodes[1].export_id, Some(2));

    let doc = parse(&render(&networks[0], &codebook, &options)?)?;
    let nodes = &doc.graphs[0].nodes;
    assert_eq!(nodes[0].attrs["id"], "1");
    assert!(Uuid::parse_str(&nodes[1].attrs["id"]).is_ok());
    assert!(nodes[1].data("networkCanvasUUID").is_none());
    Ok(())
}

// =============================================================================
// UNIFIED SESSIONS
// =============================================================================

#[test]
fn unified_sessions_share_schema_with_graph_per_session() -> Result<()> {
    let codebook = helpers::codebook();
    let options = ExportOptions {
        unify_networks: true,
        use_directed_edges: false,
        ..screen_options()
    };
    let networks = prepare_networks(&helpers::sessions(), &options)?;
    assert_eq!(networks.len(), 1);

    let doc = parse(&render(&networks[0], &codebook, &options)?)?;
    assert!(doc.undeclared.is_empty(), "undeclared data: {:?}", doc.undeclared);

    let sessions: Vec<&str> = doc
        .graphs
        .iter()
        .map(|g| g.attrs["nc:sessionUUID"].as_str())
        .collect();
    assert_eq!(sessions, vec!["s1", "s2"]);
    assert!(doc.graphs.iter().all(|g| g.attrs["edgedefault"] == "undirected"));

    let ego_keys = doc.keys.iter().filter(|k| k["for"] == "graph").count();
    assert_eq!(ego_keys, 2, "ego uuid plus one shared age key");
    let ages: Vec<Option<&str>> = doc
        .graphs
        .iter()
        .map(|g| {
            g.ego_data
                .iter()
                .find(|(k, _)| k == helpers::EGO_AGE)
                .map(|(_, v)| v.as_str())
        })
        .collect();
    assert_eq!(ages, vec![Some("34"), Some("51")]);

    let node_ids: Vec<&str> = doc
        .graphs
        .iter()
        .flat_map(|g| g.nodes.iter().map(|n| n.attrs["id"].as_str()))
        .collect();
    assert_eq!(node_ids, vec!["1", "2", "4", "5"]);
    Ok(())
}

// =============================================================================
// STREAMING
// =============================================================================

#[test]
fn large_networks_stream_in_bounded_batches() -> Result<()> {
    network_export::logging::init_test_tracing();
    let codebook = helpers::codebook();
    let options = ExportOptions::default();
    let mut session = helpers::session("big", 40);
    session.nodes = (0..1_050)
        .map(|i| {
            Node::new(format!("n-{}", i), helpers::PERSON)
                .with_attribute(helpers::NAME, format!("P{}", i))
        })
        .collect();
    session.edges.clear();
    let networks = prepare_networks(&[session], &options)?;

    let mut joined = String::new();
    let mut node_counts = Vec::new();
    let document = GraphMlDocument::new(&networks[0], &codebook, &options)?.with_batch_size(250);
    for fragment in document {
        let fragment = fragment?;
        let nodes = fragment.matches("<node ").count();
        assert!(nodes <= 250);
        if nodes > 0 {
            node_counts.push(nodes);
        }
        joined.push_str(&fragment);
    }
    assert_eq!(node_counts, vec![250, 250, 250, 250, 50]);
    assert_eq!(joined, render(&networks[0], &codebook, &options)?);
    assert_eq!(parse(&joined)?.graphs[0].nodes.len(), 1_050);
    Ok(())
}

#[test]
fn exclusions_drop_keys_and_data() -> Result<()> {
    let codebook = helpers::codebook();
    let options = ExportOptions::default();
    let networks = prepare_networks(&helpers::sessions(), &options)?;
    let xml = GraphMlDocument::new(&networks[0], &codebook, &options)?
        .with_excluded_attributes([helpers::POSITION, "favourite colour"])
        .into_string()?;
    let doc = parse(&xml)?;

    assert!(doc.key("v-pos_X", "node").is_none());
    assert!(doc.key(&hash_identifier("favourite colour"), "node").is_none());
    assert!(doc.graphs[0].nodes.iter().all(|n| n.data("v-pos_X").is_none()));
    assert!(doc.undeclared.is_empty());
    Ok(())
}

// =============================================================================
// SINKS
// =============================================================================

#[test]
fn filesystem_export_writes_parseable_files() -> Result<()> {
    network_export::logging::init_test_tracing();
    let dir = tempfile::tempdir()?;
    let codebook = helpers::codebook();
    let options = ExportOptions::default();
    let mut sink = FsSink::new(dir.path());

    let directory = Path::new("graphml");
    let summaries =
        export_sessions(&helpers::sessions(), &codebook, &options, &mut sink, directory)?;

    assert_eq!(summaries.len(), 2);
    for summary in &summaries {
        let written = std::fs::read_to_string(dir.path().join(&summary.path))?;
        assert_eq!(written.len(), summary.bytes);
        assert_eq!(parse(&written)?.graphs.len(), 1);
    }
    assert_eq!(
        summaries[0].path,
        Path::new("graphml").join("case_s1_s1_graphml.graphml")
    );
    Ok(())
}

#[test]
fn invalid_codebook_writes_nothing() {
    let mut codebook = helpers::codebook();
    if let Some(person) = codebook.node.get_mut(helpers::PERSON) {
        if let Some(closeness) = person.variables.get_mut(helpers::CLOSENESS) {
            closeness.options = None;
        }
    }
    let mut sink = MemorySink::new();
    let err = export_sessions(
        &helpers::sessions(),
        &codebook,
        &ExportOptions::default(),
        &mut sink,
        Path::new(""),
    )
    .unwrap_err();

    assert_eq!(err.code(), "MISSING_CATEGORICAL_OPTIONS");
    assert!(sink.files.is_empty());
}

// =============================================================================
// PROPERTIES
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Arbitrary external attribute names and values still yield a
    /// well-formed document whose data keys are all declared.
    #[test]
    fn arbitrary_external_attributes_stay_consistent(
        attributes in prop::collection::vec(("[ -~]{1,16}", "[ -~]{0,16}"), 1..8)
    ) {
        let codebook = helpers::codebook();
        let options = ExportOptions::default();
        let mut session = helpers::session("prop", 30);
        for (key, value) in &attributes {
            session.nodes[0].attributes.insert(key.clone(), value.clone().into());
        }
        let networks = prepare_networks(&[session], &options).unwrap();
        let xml = render(&networks[0], &codebook, &options).unwrap();
        let doc = parse(&xml).unwrap();

        prop_assert!(doc.undeclared.is_empty(), "undeclared: {:?}", doc.undeclared);
        let nmtoken = Regex::new(r"^[A-Za-z0-9._:-]+$").unwrap();
        for key in &doc.keys {
            prop_assert!(nmtoken.is_match(&key["id"]));
        }
    }
}
