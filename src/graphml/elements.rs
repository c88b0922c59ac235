//! Element generation: `<node>`/`<edge>` elements and ego data.
//!
//! Data identifiers come from [`encode_attribute`], the same plan the key
//! schema is built from.

use super::encoding::{
    encode_attribute, xml_escape, AttributeEncoding, EGO_UUID_KEY, LABEL_KEY, SOURCE_UUID_KEY,
    TARGET_UUID_KEY, TYPE_KEY, UUID_KEY,
};
use crate::codebook::{entity_type_name, node_label_variable};
use crate::config::ExportOptions;
use crate::error::Result;
use crate::values::{is_truthy, selection_includes, value_text, LayoutPoint};
use network_types::{Codebook, Edge, Ego, NetworkEntity, Node};
use std::fmt::Write;
use uuid::Uuid;

const NODE_LABEL_FALLBACK: &str = "Node";

/// Shared inputs of the element writers for one document.
#[derive(Debug, Clone, Copy)]
pub struct ElementContext<'a> {
    pub codebook: &'a Codebook,
    pub options: &'a ExportOptions,
    /// Attribute keys never written as data.
    pub excluded: &'a [String],
}

impl<'a> ElementContext<'a> {
    pub fn new(
        codebook: &'a Codebook,
        options: &'a ExportOptions,
        excluded: &'a [String],
    ) -> Self {
        Self {
            codebook,
            options,
            excluded,
        }
    }

    fn is_excluded(&self, key: &str) -> bool {
        self.excluded.iter().any(|k| k == key)
    }

    fn format_coordinate(&self, value: f64) -> String {
        if self.options.use_screen_layout_coordinates {
            format!("{:.2}", value)
        } else {
            value.to_string()
        }
    }
}

fn write_data(xml: &mut String, indent: &str, key: &str, value: &str) -> Result<()> {
    writeln!(
        xml,
        r#"{}<data key="{}">{}</data>"#,
        indent,
        xml_escape(key),
        xml_escape(value)
    )?;
    Ok(())
}

/// A fresh UUID when the primary key is missing, else the export id, else the
/// primary key.
fn element_id<E: NetworkEntity>(entity: &E) -> String {
    match entity.uid() {
        Some(uid) => match entity.export_id() {
            Some(id) => id.to_string(),
            None => uid.to_string(),
        },
        None => {
            let generated = Uuid::new_v4().to_string();
            tracing::warn!(
                kind = E::KIND.as_str(),
                export_id = ?entity.export_id(),
                generated = %generated,
                "entity has no primary key, using a generated identifier"
            );
            generated
        }
    }
}

/// Write one `<data>` per set, non-excluded attribute of `entity`.
fn write_attribute_data<E: NetworkEntity>(
    xml: &mut String,
    indent: &str,
    entity: &E,
    ctx: &ElementContext<'_>,
) -> Result<()> {
    for (key, value) in entity.attributes() {
        if ctx.is_excluded(key) || !is_truthy(value) {
            continue;
        }

        match encode_attribute(ctx.codebook, entity, key) {
            AttributeEncoding::Field { id, .. } | AttributeEncoding::External { id, .. } => {
                write_data(xml, indent, &id, &value_text(value))?;
            }
            AttributeEncoding::Categorical { options, .. } => {
                for (id, option) in options {
                    let selected = selection_includes(value, &option.value);
                    write_data(xml, indent, &id, if selected { "true" } else { "false" })?;
                }
            }
            AttributeEncoding::Layout { x, y, .. } => {
                let Some(point) = LayoutPoint::from_value(value) else {
                    tracing::debug!(key = %key, "skipping malformed layout value");
                    continue;
                };
                let point = point.project(ctx.options);
                write_data(xml, indent, &x, &ctx.format_coordinate(point.x))?;
                write_data(xml, indent, &y, &ctx.format_coordinate(point.y))?;
            }
        }
    }
    Ok(())
}

fn node_label(node: &Node, codebook: &Codebook) -> String {
    node_label_variable(codebook, &node.node_type)
        .and_then(|key| node.attributes.get(key))
        .filter(|value| is_truthy(value))
        .map(value_text)
        .unwrap_or_else(|| NODE_LABEL_FALLBACK.to_string())
}

/// `<node>` elements for a batch of nodes.
pub fn node_elements<'a, I>(nodes: I, ctx: &ElementContext<'_>) -> Result<String>
where
    I: IntoIterator<Item = &'a Node>,
{
    let mut xml = String::new();
    for node in nodes {
        writeln!(xml, r#"    <node id="{}">"#, xml_escape(&element_id(node)))?;
        write_data(&mut xml, "      ", LABEL_KEY, &node_label(node, ctx.codebook))?;
        let type_name = entity_type_name(ctx.codebook, Node::KIND, Some(&node.node_type));
        write_data(&mut xml, "      ", TYPE_KEY, &type_name)?;
        if let Some(uid) = node.uid() {
            write_data(&mut xml, "      ", UUID_KEY, uid)?;
        }
        write_attribute_data(&mut xml, "      ", node, ctx)?;
        xml.push_str("    </node>\n");
    }
    Ok(xml)
}

/// `<edge>` elements for a batch of edges.
///
/// Endpoints use the resequenced node ids when assigned, else the raw keys.
pub fn edge_elements<'a, I>(edges: I, ctx: &ElementContext<'_>) -> Result<String>
where
    I: IntoIterator<Item = &'a Edge>,
{
    let mut xml = String::new();
    for edge in edges {
        let source = edge
            .from_export_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| edge.from.clone());
        let target = edge
            .to_export_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| edge.to.clone());
        writeln!(
            xml,
            r#"    <edge id="{}" source="{}" target="{}">"#,
            xml_escape(&element_id(edge)),
            xml_escape(&source),
            xml_escape(&target)
        )?;
        let type_name = entity_type_name(ctx.codebook, Edge::KIND, Some(&edge.edge_type));
        write_data(&mut xml, "      ", TYPE_KEY, &type_name)?;
        if let Some(uid) = edge.uid() {
            write_data(&mut xml, "      ", UUID_KEY, uid)?;
        }
        write_data(&mut xml, "      ", SOURCE_UUID_KEY, &edge.from)?;
        write_data(&mut xml, "      ", TARGET_UUID_KEY, &edge.to)?;
        write_attribute_data(&mut xml, "      ", edge, ctx)?;
        xml.push_str("    </edge>\n");
    }
    Ok(xml)
}

/// Ego `<data>` entries, attached directly to the enclosing `<graph>`.
pub fn ego_data_elements(ego: &Ego, ctx: &ElementContext<'_>) -> Result<String> {
    let mut xml = String::new();
    if let Some(uid) = ego.uid() {
        write_data(&mut xml, "    ", EGO_UUID_KEY, uid)?;
    }
    write_attribute_data(&mut xml, "    ", ego, ctx)?;
    Ok(xml)
}
