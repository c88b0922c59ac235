//! Streaming document assembly.
//!
//! [`GraphMlDocument`] is a pull-based iterator of XML fragments: preamble,
//! key schema (ego, node, edge), then one `<graph>` section per session.
//! Nodes and edges are emitted in fixed-size batches so no fragment holds
//! more than `batch_size` elements.

use super::elements::{edge_elements, ego_data_elements, node_elements, ElementContext};
use super::encoding::xml_escape;
use super::keys::generate_key_elements;
use crate::codebook::validate_codebook;
use crate::config::ExportOptions;
use crate::error::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use network_types::{Codebook, Edge, Ego, Network, Node, SessionVariables};
use std::fmt::Write;

/// Entities per node or edge fragment.
pub const DEFAULT_BATCH_SIZE: usize = 100;

const GRAPHML_NAMESPACE: &str = "http://graphml.graphdrawing.org/xmlns";
const GRAPHML_SCHEMA_LOCATION: &str =
    "http://graphml.graphdrawing.org/xmlns http://graphml.graphdrawing.org/xmlns/1.0/graphml.xsd";
const NC_NAMESPACE: &str = "http://schema.networkcanvas.com/xmlns";

/// Everything one `<graph>` element is built from.
#[derive(Debug, Clone, Copy)]
struct GraphSection<'a> {
    variables: &'a SessionVariables,
    ego: Option<&'a Ego>,
    nodes: &'a [Node],
    edges: &'a [Edge],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    Preamble,
    EgoKeys,
    NodeKeys,
    EdgeKeys,
    GraphOpen(usize),
    Nodes { section: usize, offset: usize },
    Edges { section: usize, offset: usize },
    GraphClose(usize),
    DocumentClose,
    Done,
}

/// Lazy, finite, non-restartable sequence of GraphML fragments for one network.
///
/// After an error the iterator yields nothing further.
pub struct GraphMlDocument<'a> {
    codebook: &'a Codebook,
    options: &'a ExportOptions,
    sections: Vec<GraphSection<'a>>,
    excluded: Vec<String>,
    batch_size: usize,
    cursor: Cursor,
}

impl<'a> GraphMlDocument<'a> {
    /// Validate inputs and position the document before its preamble.
    pub fn new(
        network: &'a Network,
        codebook: &'a Codebook,
        options: &'a ExportOptions,
    ) -> Result<Self> {
        validate_codebook(codebook)?;
        options.validate()?;

        let sections = match network {
            Network::Single(session) => vec![GraphSection {
                variables: &session.session_variables,
                ego: Some(&session.ego),
                nodes: &session.nodes,
                edges: &session.edges,
            }],
            Network::Unified(unified) => unified
                .session_variables
                .iter()
                .map(|(session_id, variables)| GraphSection {
                    variables,
                    ego: unified.ego_for(session_id),
                    nodes: unified.nodes_for(session_id),
                    edges: unified.edges_for(session_id),
                })
                .collect(),
        };

        Ok(Self {
            codebook,
            options,
            sections,
            excluded: Vec::new(),
            batch_size: DEFAULT_BATCH_SIZE,
            cursor: Cursor::Preamble,
        })
    }

    /// Override the number of entities per fragment; zero is treated as one.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Attribute keys to leave out of both the key schema and the data.
    pub fn with_excluded_attributes(
        mut self,
        excluded: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.excluded = excluded.into_iter().map(Into::into).collect();
        self
    }

    /// Number of `<graph>` sections the document will contain.
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Drain the remaining fragments into one string.
    pub fn into_string(self) -> Result<String> {
        self.collect()
    }

    fn context(&self) -> ElementContext<'_> {
        ElementContext::new(self.codebook, self.options, &self.excluded)
    }

    fn preamble(&self) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<graphml xmlns=\"{}\" xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\" xsi:schemaLocation=\"{}\" xmlns:nc=\"{}\">\n",
            GRAPHML_NAMESPACE, GRAPHML_SCHEMA_LOCATION, NC_NAMESPACE
        )
    }

    fn graph_open(&self, section: &GraphSection<'_>) -> Result<String> {
        let variables = section.variables;
        let mut xml = String::new();
        write!(
            xml,
            r#"  <graph edgedefault="{}" nc:caseId="{}" nc:sessionUUID="{}" nc:protocolName="{}" nc:remoteProtocolID="{}" nc:sessionExportTime="{}""#,
            self.options.edge_default(),
            xml_escape(&variables.case_id),
            xml_escape(&variables.session_uuid),
            xml_escape(&variables.protocol_name),
            xml_escape(&variables.remote_protocol_id),
            timestamp(&variables.export_time)
        )?;
        if let Some(start) = &variables.start_time {
            write!(xml, r#" nc:sessionStartTime="{}""#, timestamp(start))?;
        }
        if let Some(finish) = &variables.finish_time {
            write!(xml, r#" nc:sessionFinishTime="{}""#, timestamp(finish))?;
        }
        xml.push_str(">\n");

        if let Some(ego) = section.ego {
            xml.push_str(&ego_data_elements(ego, &self.context())?);
        }
        Ok(xml)
    }

    /// Produce the fragment at the cursor and advance; `None` once finished.
    fn step(&mut self) -> Result<Option<String>> {
        loop {
            match self.cursor {
                Cursor::Preamble => {
                    self.cursor = Cursor::EgoKeys;
                    return Ok(Some(self.preamble()));
                }
                Cursor::EgoKeys => {
                    self.cursor = Cursor::NodeKeys;
                    let egos = self.sections.iter().filter_map(|s| s.ego);
                    return generate_key_elements(egos, self.codebook, &self.excluded).map(Some);
                }
                Cursor::NodeKeys => {
                    self.cursor = Cursor::EdgeKeys;
                    let nodes = self.sections.iter().flat_map(|s| s.nodes.iter());
                    return generate_key_elements(nodes, self.codebook, &self.excluded).map(Some);
                }
                Cursor::EdgeKeys => {
                    self.cursor = Cursor::GraphOpen(0);
                    let edges = self.sections.iter().flat_map(|s| s.edges.iter());
                    return generate_key_elements(edges, self.codebook, &self.excluded).map(Some);
                }
                Cursor::GraphOpen(index) => {
                    let Some(section) = self.sections.get(index).copied() else {
                        self.cursor = Cursor::DocumentClose;
                        continue;
                    };
                    tracing::debug!(
                        session = %section.variables.session_uuid,
                        nodes = section.nodes.len(),
                        edges = section.edges.len(),
                        "opening graph section"
                    );
                    self.cursor = Cursor::Nodes {
                        section: index,
                        offset: 0,
                    };
                    return self.graph_open(&section).map(Some);
                }
                Cursor::Nodes { section, offset } => {
                    let nodes = self.sections[section].nodes;
                    if offset >= nodes.len() {
                        self.cursor = Cursor::Edges { section, offset: 0 };
                        continue;
                    }
                    let end = (offset + self.batch_size).min(nodes.len());
                    self.cursor = Cursor::Nodes { section, offset: end };
                    return node_elements(&nodes[offset..end], &self.context()).map(Some);
                }
                Cursor::Edges { section, offset } => {
                    let edges = self.sections[section].edges;
                    if offset >= edges.len() {
                        self.cursor = Cursor::GraphClose(section);
                        continue;
                    }
                    let end = (offset + self.batch_size).min(edges.len());
                    self.cursor = Cursor::Edges { section, offset: end };
                    return edge_elements(&edges[offset..end], &self.context()).map(Some);
                }
                Cursor::GraphClose(index) => {
                    self.cursor = Cursor::GraphOpen(index + 1);
                    return Ok(Some("  </graph>\n".to_string()));
                }
                Cursor::DocumentClose => {
                    self.cursor = Cursor::Done;
                    tracing::debug!(sections = self.sections.len(), "document complete");
                    return Ok(Some("</graphml>\n".to_string()));
                }
                Cursor::Done => return Ok(None),
            }
        }
    }
}

impl Iterator for GraphMlDocument<'_> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.step() {
            Ok(fragment) => fragment.map(Ok),
            Err(err) => {
                self.cursor = Cursor::Done;
                Some(Err(err))
            }
        }
    }
}

impl std::iter::FusedIterator for GraphMlDocument<'_> {}

fn timestamp(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}
