//! Graph assembly.
//!
//! Builds a [`Gexf`] from a coerced node table and a coerced edge table.
//! The attribute models are always derived from the two schemas. Integrity
//! of the result (unique ids, resolvable endpoints, declared attributes) is
//! enforced by the document as each node and edge is added.

use tabgraph_gexf::{Edge, Gexf, Node};
use tabgraph_schemas::{
    ColumnSchema, GraphParams, Marker, SchemaElement, VizKind,
};
use tracing::{debug_span, info};

use crate::LoadedTable;
use crate::coerce::{Record, Value};
use crate::error::ConvertError;
use crate::model::derive_attribute_model;

/// Populates a new document with every node, then every edge, in input
/// order.
///
/// Labels default to the node or edge id. Edges without an `id` column are
/// numbered `e1`, `e2`, ... by their position in the edge table.
///
/// # Errors
///
/// Returns an assembly error ([`ConvertError::is_assembly`]) if the document
/// rejects a node or edge, or a record does not fit its schema.
pub fn assemble(
    nodes: LoadedTable,
    edges: LoadedTable,
    params: &GraphParams,
) -> Result<Gexf, ConvertError> {
    let _span = debug_span!(
        "assemble",
        nodes = nodes.records.len(),
        edges = edges.records.len()
    )
    .entered();

    let mut gexf = Gexf::new(
        params.clone(),
        derive_attribute_model(&nodes.schema),
        derive_attribute_model(&edges.schema),
    )?;

    for record in nodes.records {
        gexf.add_node(build_node(&nodes.schema, record)?)?;
    }

    let mut position = 0;
    for record in edges.records {
        position += 1;
        gexf.add_edge(build_edge(&edges.schema, record, position)?)?;
    }

    info!(
        nodes = gexf.node_count(),
        edges = gexf.edge_count(),
        "assembled graph"
    );
    Ok(gexf)
}

fn build_node(
    schema: &ColumnSchema,
    record: Record,
) -> Result<Node, ConvertError> {
    let row = record.row;
    let mismatch =
        |header: &str| ConvertError::record_mismatch(schema.kind(), row, header);

    let mut id = None;
    let mut label = None;
    let mut node = Node::new("", "");
    for (column, value) in schema.columns().iter().zip(record.values) {
        match (&column.element, value) {
            (_, Value::Missing) => {}
            (SchemaElement::Marker(Marker::Id), Value::Text(text)) => {
                id = Some(text);
            }
            (SchemaElement::Marker(Marker::Label), Value::Text(text)) => {
                label = Some(text);
            }
            (SchemaElement::Attribute(decl), Value::Attribute(value)) => {
                node.attributes.insert(decl.id.clone(), value);
            }
            (SchemaElement::Viz(VizKind::Color), Value::Color(color)) => {
                node.viz.color = Some(color);
            }
            (SchemaElement::Viz(VizKind::Size), Value::Number(size)) => {
                node.viz.size = Some(size);
            }
            (SchemaElement::Viz(VizKind::Shape), Value::NodeShape(shape)) => {
                node.viz.shape = Some(shape);
            }
            _ => return Err(mismatch(&column.header)),
        }
    }

    node.id = id.ok_or_else(|| mismatch(Marker::Id.as_str()))?;
    node.label = label.unwrap_or_else(|| node.id.clone());
    Ok(node)
}

fn build_edge(
    schema: &ColumnSchema,
    record: Record,
    position: usize,
) -> Result<Edge, ConvertError> {
    let row = record.row;
    let mismatch =
        |header: &str| ConvertError::record_mismatch(schema.kind(), row, header);

    let mut id = None;
    let mut label = None;
    let mut source = None;
    let mut target = None;
    let mut edge = Edge::new("", "", "", "");
    for (column, value) in schema.columns().iter().zip(record.values) {
        match (&column.element, value) {
            (_, Value::Missing) => {}
            (SchemaElement::Marker(Marker::Id), Value::Text(text)) => {
                id = Some(text);
            }
            (SchemaElement::Marker(Marker::Label), Value::Text(text)) => {
                label = Some(text);
            }
            (SchemaElement::Marker(Marker::Source), Value::Text(text)) => {
                source = Some(text);
            }
            (SchemaElement::Marker(Marker::Target), Value::Text(text)) => {
                target = Some(text);
            }
            (SchemaElement::Marker(Marker::Type), Value::EdgeType(kind)) => {
                edge.kind = Some(kind);
            }
            (SchemaElement::Marker(Marker::Weight), Value::Number(weight)) => {
                edge.weight = Some(weight);
            }
            (SchemaElement::Attribute(decl), Value::Attribute(value)) => {
                edge.attributes.insert(decl.id.clone(), value);
            }
            (SchemaElement::Viz(VizKind::Color), Value::Color(color)) => {
                edge.viz.color = Some(color);
            }
            (SchemaElement::Viz(VizKind::Thickness), Value::Number(t)) => {
                edge.viz.thickness = Some(t);
            }
            (SchemaElement::Viz(VizKind::Shape), Value::EdgeShape(shape)) => {
                edge.viz.shape = Some(shape);
            }
            _ => return Err(mismatch(&column.header)),
        }
    }

    edge.id = id.unwrap_or_else(|| format!("e{position}"));
    edge.label = label.unwrap_or_else(|| edge.id.clone());
    edge.source = source.ok_or_else(|| mismatch(Marker::Source.as_str()))?;
    edge.target = target.ok_or_else(|| mismatch(Marker::Target.as_str()))?;
    Ok(edge)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;
    use tabgraph_gexf::AttributeValue;
    use tabgraph_schemas::{
        AttributeDef, AttributeType, EdgeShape, EdgeType, RawSchemaElement,
        TableKind,
    };

    use super::*;
    use crate::coerce::coerce_rows;
    use crate::load::Row;
    use crate::schema::validate_schema;

    /// Validates and coerces an in-memory table.
    fn table(
        kind: TableKind,
        schema: serde_json::Value,
        rows: &[&[&str]],
    ) -> LoadedTable {
        let raw: Vec<RawSchemaElement> = serde_json::from_value(schema).unwrap();
        let headers: Vec<String> =
            (0..raw.len()).map(|i| format!("col{i}")).collect();
        let schema = validate_schema(&headers, &raw, kind).unwrap();
        let rows = rows
            .iter()
            .enumerate()
            .map(|(i, r)| Row {
                number: i + 1,
                cells: r.iter().map(|&s| s.to_owned()).collect(),
            })
            .collect();
        let records = coerce_rows(rows, &schema).unwrap();
        LoadedTable { schema, records }
    }

    fn three_nodes() -> LoadedTable {
        table(
            TableKind::Node,
            json!(["id"]),
            &[&["a"], &["b"], &["c"]],
        )
    }

    #[test]
    fn test_node_with_label_and_float_attribute() {
        let nodes = table(
            TableKind::Node,
            json!(["id", "label", { "target": "attributes", "type": "float" }]),
            &[&["n1", "Node One", "3.25"]],
        );
        let edges = table(TableKind::Edge, json!(["source", "target"]), &[]);
        let gexf = assemble(nodes, edges, &GraphParams::default()).unwrap();

        let node = gexf.node("n1").unwrap();
        assert_eq!(node.label, "Node One");
        assert_eq!(
            node.attributes.get("col2"),
            Some(&AttributeValue::Float(3.25))
        );
        assert_eq!(
            gexf.node_model(),
            [AttributeDef::new("col2", "col2", AttributeType::Float)]
        );
        assert!(gexf.edge_model().is_empty());
    }

    #[test]
    fn test_labels_default_to_id() {
        let nodes = table(
            TableKind::Node,
            json!(["id", "label"]),
            &[&["a", ""], &["b", "Bee"]],
        );
        let edges = table(TableKind::Edge, json!(["source", "target"]), &[]);
        let gexf = assemble(nodes, edges, &GraphParams::default()).unwrap();

        let labels: Vec<_> = gexf.nodes().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, ["a", "Bee"]);
    }

    #[test]
    fn test_edge_ids_synthesized_by_position() {
        let edges = table(
            TableKind::Edge,
            json!(["source", "target"]),
            &[&["a", "b"], &["b", "c"], &["c", "a"]],
        );
        let gexf =
            assemble(three_nodes(), edges, &GraphParams::default()).unwrap();

        let ids: Vec<_> = gexf.edges().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["e1", "e2", "e3"]);
        assert!(gexf.edges().all(|e| e.label == e.id));
    }

    #[test]
    fn test_edge_fields() {
        let edges = table(
            TableKind::Edge,
            json!([
                "id",
                "source",
                "target",
                "type",
                "weight",
                { "target": "viz", "id": "shape" },
                { "target": "viz", "id": "thickness" },
                { "target": "attributes", "id": "since", "type": "integer" },
            ]),
            &[
                &["x", "a", "b", "undirected", "2.5", "dotted", "", "1999"],
                &["y", "b", "c", "", "", "", "4", ""],
            ],
        );
        let gexf =
            assemble(three_nodes(), edges, &GraphParams::default()).unwrap();

        let x = gexf.edge("x").unwrap();
        assert_eq!(x.kind, Some(EdgeType::Undirected));
        assert_eq!(x.weight, Some(2.5));
        assert_eq!(x.viz.shape, Some(EdgeShape::Dotted));
        assert_eq!(x.viz.thickness, None);
        assert_eq!(x.attributes.get("since"), Some(&AttributeValue::Integer(1999)));

        let y = gexf.edge("y").unwrap();
        assert_eq!(y.kind, None);
        assert_eq!(y.weight, None);
        assert_eq!(y.viz.thickness, Some(4.0));
        assert!(y.attributes.is_empty());
    }

    #[test]
    fn test_dangling_endpoint_is_assembly_error() {
        let edges = table(
            TableKind::Edge,
            json!(["source", "target"]),
            &[&["a", "zz"]],
        );
        let err =
            assemble(three_nodes(), edges, &GraphParams::default()).unwrap_err();
        assert!(err.is_assembly());
        assert!(err.to_string().contains("\"zz\""));
    }

    #[test]
    fn test_duplicate_node_is_assembly_error() {
        let nodes = table(TableKind::Node, json!(["id"]), &[&["a"], &["a"]]);
        let edges = table(TableKind::Edge, json!(["source", "target"]), &[]);
        let err = assemble(nodes, edges, &GraphParams::default()).unwrap_err();
        assert!(err.is_assembly());
    }

    #[test]
    fn test_unrepresentable_label_is_assembly_error() {
        let nodes =
            table(TableKind::Node, json!(["id", "label"]), &[&["a", "A\u{1}"]]);
        let edges = table(TableKind::Edge, json!(["source", "target"]), &[]);
        let err = assemble(nodes, edges, &GraphParams::default()).unwrap_err();
        assert!(err.is_assembly());
        assert!(err.to_string().contains("label"));
    }

    #[test]
    fn test_invalid_meta_key_is_assembly_error() {
        let mut params = GraphParams::default();
        params.meta.insert("data source".into(), "survey".into());
        let edges = table(TableKind::Edge, json!(["source", "target"]), &[]);
        let err = assemble(three_nodes(), edges, &params).unwrap_err();
        assert!(err.is_assembly());
        assert!(err.to_string().contains("\"data source\""));
    }

    /// A record coerced for a different schema is rejected, not guessed at.
    #[test]
    fn test_mismatched_record_rejected() {
        let mut nodes = three_nodes();
        nodes.records[1].values[0] = Value::Number(1.0);
        let edges = table(TableKind::Edge, json!(["source", "target"]), &[]);
        let err = assemble(nodes, edges, &GraphParams::default()).unwrap_err();

        assert!(err.is_assembly());
        assert_eq!(err.table(), Some(TableKind::Node));
        assert!(err.to_string().contains("record 2"));
    }

    #[test]
    fn test_params_carried_over() {
        let mut params = GraphParams::new(EdgeType::Mutual);
        params.meta.insert("creator".into(), "tests".into());
        let edges = table(TableKind::Edge, json!(["source", "target"]), &[]);
        let gexf = assemble(three_nodes(), edges, &params).unwrap();
        assert_eq!(gexf.params(), &params);
    }

    proptest! {
        /// Synthesized edge ids follow table position, whatever the
        /// endpoints are.
        #[test]
        fn prop_synthesized_ids(ends in prop::collection::vec((0..3_usize, 0..3_usize), 0..20)) {
            let names = ["a", "b", "c"];
            let rows: Vec<Vec<&str>> = ends
                .iter()
                .map(|&(s, t)| vec![names[s], names[t]])
                .collect();
            let rows: Vec<&[&str]> = rows.iter().map(Vec::as_slice).collect();
            let edges = table(TableKind::Edge, json!(["source", "target"]), &rows);

            let gexf = assemble(three_nodes(), edges, &GraphParams::default()).unwrap();
            prop_assert_eq!(gexf.edge_count(), ends.len());
            for (i, edge) in gexf.edges().enumerate() {
                prop_assert_eq!(&edge.id, &format!("e{}", i + 1));
                prop_assert_eq!(edge.source.as_str(), names[ends[i].0]);
            }
        }
    }
}
