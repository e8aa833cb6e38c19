//! Cell coercion.
//!
//! Each raw string cell is converted to the [`Value`] its column's schema
//! element calls for. Empty cells in optional columns become
//! [`Value::Missing`]; the assembler decides what a missing value means.

use tabgraph_gexf::AttributeValue;
use tabgraph_schemas::{
    AttributeType, Color, ColumnSchema, EdgeShape, EdgeType, Marker,
    NodeShape, SchemaElement, TableKind, VizKind,
};
use tracing::instrument;

use crate::error::ConvertError;
use crate::load::Row;

/// A typed cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Identifier, label, source, or target.
    Text(String),
    /// A custom attribute value of the declared type.
    Attribute(AttributeValue),
    /// Edge weight, node size, or edge thickness.
    Number(f64),
    Color(Color),
    EdgeType(EdgeType),
    NodeShape(NodeShape),
    EdgeShape(EdgeShape),
    /// An empty cell in a column that may be left blank.
    Missing,
}

/// The coerced cells of one data row, in column order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// The source row's [`Row::number`].
    pub row: usize,
    pub values: Vec<Value>,
}

/// Coerces every row against `schema`.
///
/// Rows are expected to have exactly one cell per schema column; the loader
/// guarantees this for tables it produced.
///
/// # Errors
///
/// Returns a value error ([`ConvertError::is_value`]) for the first cell
/// that does not fit its column, naming the column, row, and value.
#[instrument(skip_all, fields(table = %schema.kind(), rows = rows.len()))]
pub fn coerce_rows(
    rows: Vec<Row>,
    schema: &ColumnSchema,
) -> Result<Vec<Record>, ConvertError> {
    rows.into_iter()
        .map(|Row { number: row, cells }| {
            let values = schema
                .columns()
                .iter()
                .zip(cells)
                .map(|(column, cell)| {
                    coerce_cell(cell, &column.element, schema.kind()).map_err(
                        |rejected| {
                            ConvertError::value(
                                schema.kind(),
                                &column.header,
                                row,
                                &rejected.value,
                                rejected.expected,
                            )
                        },
                    )
                })
                .collect::<Result<_, _>>()?;
            Ok(Record { row, values })
        })
        .collect()
}

/// What a rejected cell held and what was expected instead.
struct Rejected {
    value: String,
    expected: String,
}

impl Rejected {
    fn new(value: String, expected: impl Into<String>) -> Self {
        Self {
            value,
            expected: expected.into(),
        }
    }
}

fn coerce_cell(
    cell: String,
    element: &SchemaElement,
    table: TableKind,
) -> Result<Value, Rejected> {
    match element {
        SchemaElement::Marker(marker) => coerce_marker(cell, *marker),
        SchemaElement::Attribute(decl) => coerce_attribute(cell, decl.kind),
        SchemaElement::Viz(viz) => coerce_viz(cell, *viz, table),
    }
}

fn coerce_marker(cell: String, marker: Marker) -> Result<Value, Rejected> {
    match marker {
        Marker::Id | Marker::Source | Marker::Target => {
            if cell.is_empty() {
                Err(Rejected::new(cell, "a non-empty identifier"))
            } else {
                Ok(Value::Text(cell))
            }
        }
        Marker::Label if cell.is_empty() => Ok(Value::Missing),
        Marker::Label => Ok(Value::Text(cell)),
        Marker::Weight => optional(cell, |s| parse_float(s).map(Value::Number)),
        Marker::Type => optional(cell, |s| {
            s.parse::<EdgeType>()
                .map(Value::EdgeType)
                .map_err(|e| e.expected().to_owned())
        }),
    }
}

fn coerce_attribute(
    cell: String,
    kind: AttributeType,
) -> Result<Value, Rejected> {
    match kind {
        AttributeType::String => {
            Ok(Value::Attribute(AttributeValue::String(cell)))
        }
        AttributeType::Boolean => {
            Ok(Value::Attribute(AttributeValue::Boolean(parse_bool(&cell))))
        }
        AttributeType::Integer => optional(cell, |s| {
            parse_integer(s).map(|i| Value::Attribute(i.into()))
        }),
        AttributeType::Float => optional(cell, |s| {
            parse_float(s).map(|x| Value::Attribute(x.into()))
        }),
    }
}

fn coerce_viz(
    cell: String,
    viz: VizKind,
    table: TableKind,
) -> Result<Value, Rejected> {
    optional(cell, |s| match viz {
        VizKind::Size | VizKind::Thickness => {
            parse_float(s).map(Value::Number)
        }
        VizKind::Color => s
            .parse::<Color>()
            .map(Value::Color)
            .map_err(|e| e.expected().to_owned()),
        VizKind::Shape => {
            let shape = match table {
                TableKind::Node => s.parse().map(Value::NodeShape),
                TableKind::Edge => s.parse().map(Value::EdgeShape),
            };
            shape.map_err(|e| e.expected().to_owned())
        }
    })
}

/// Maps an empty cell to [`Value::Missing`] and hands anything else to
/// `parse`, which returns a description of the expected input on failure.
fn optional(
    cell: String,
    parse: impl FnOnce(&str) -> Result<Value, String>,
) -> Result<Value, Rejected> {
    if cell.is_empty() {
        return Ok(Value::Missing);
    }
    parse(&cell).map_err(|expected| Rejected::new(cell, expected))
}

/// `"true"` in any case and `"1"` are true; everything else is false.
fn parse_bool(s: &str) -> bool {
    s.eq_ignore_ascii_case("true") || s == "1"
}

fn parse_float(s: &str) -> Result<f64, String> {
    s.parse::<f64>()
        .ok()
        .filter(|x| x.is_finite())
        .ok_or_else(|| "a finite number".to_owned())
}

/// Parses a base-10 integer, truncating a decimal value toward zero.
fn parse_integer(s: &str) -> Result<i64, String> {
    if let Ok(i) = s.parse::<i64>() {
        return Ok(i);
    }
    let expected = || "an integer".to_owned();
    let x = parse_float(s).map_err(|_| expected())?.trunc();
    // `as` saturates, so out-of-range values must be rejected first.
    #[allow(clippy::cast_precision_loss)]
    let in_range = (i64::MIN as f64..i64::MAX as f64).contains(&x);
    if !in_range {
        return Err(expected());
    }
    #[allow(clippy::cast_possible_truncation)]
    Ok(x as i64)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use tabgraph_schemas::{AttributeDecl, Column};

    use super::*;

    fn schema(kind: TableKind, elements: Vec<SchemaElement>) -> ColumnSchema {
        let columns = elements
            .into_iter()
            .enumerate()
            .map(|(i, element)| Column {
                header: format!("col{i}"),
                element,
            })
            .collect();
        ColumnSchema::new(kind, columns)
    }

    fn attribute(kind: AttributeType) -> SchemaElement {
        SchemaElement::Attribute(AttributeDecl {
            id: "attr".into(),
            title: "attr".into(),
            kind,
        })
    }

    /// Numbers rows consecutively from 1.
    fn rows(rows: &[&[&str]]) -> Vec<Row> {
        rows.iter()
            .enumerate()
            .map(|(i, cells)| Row {
                number: i + 1,
                cells: cells.iter().map(|&s| s.to_owned()).collect(),
            })
            .collect()
    }

    fn coerce_one(
        kind: TableKind,
        element: SchemaElement,
        cell: &str,
    ) -> Result<Value, ConvertError> {
        let schema = schema(kind, vec![element]);
        let mut records = coerce_rows(rows(&[&[cell]]), &schema)?;
        Ok(records.remove(0).values.remove(0))
    }

    #[test]
    fn test_node_row() {
        let schema = schema(
            TableKind::Node,
            vec![
                SchemaElement::Marker(Marker::Id),
                SchemaElement::Marker(Marker::Label),
                attribute(AttributeType::Float),
            ],
        );
        let records =
            coerce_rows(rows(&[&["n1", "Node One", "3.25"]]), &schema)
                .unwrap();

        assert_eq!(
            records,
            [Record {
                row: 1,
                values: vec![
                    Value::Text("n1".into()),
                    Value::Text("Node One".into()),
                    Value::Attribute(AttributeValue::Float(3.25)),
                ],
            }]
        );
    }

    #[test]
    fn test_empty_optional_cells_are_missing() {
        for element in [
            SchemaElement::Marker(Marker::Label),
            SchemaElement::Marker(Marker::Weight),
            SchemaElement::Marker(Marker::Type),
            attribute(AttributeType::Integer),
            attribute(AttributeType::Float),
            SchemaElement::Viz(VizKind::Color),
            SchemaElement::Viz(VizKind::Thickness),
            SchemaElement::Viz(VizKind::Shape),
        ] {
            assert_eq!(
                coerce_one(TableKind::Edge, element, "").unwrap(),
                Value::Missing
            );
        }
    }

    #[test]
    fn test_empty_identifier_rejected() {
        let err =
            coerce_one(TableKind::Edge, SchemaElement::Marker(Marker::Source), "")
                .unwrap_err();
        assert!(err.is_value());
        assert!(err.to_string().contains("non-empty identifier"));
    }

    #[test]
    fn test_string_and_boolean_never_missing() {
        assert_eq!(
            coerce_one(TableKind::Node, attribute(AttributeType::String), "")
                .unwrap(),
            Value::Attribute(AttributeValue::String(String::new()))
        );
        assert_eq!(
            coerce_one(TableKind::Node, attribute(AttributeType::Boolean), "")
                .unwrap(),
            Value::Attribute(AttributeValue::Boolean(false))
        );
    }

    #[test]
    fn test_integer_truncates_decimals() {
        let int = |s: &str| coerce_one(TableKind::Node, attribute(AttributeType::Integer), s);
        assert_eq!(int("42").unwrap(), Value::Attribute(42_i64.into()));
        assert_eq!(int("7.9").unwrap(), Value::Attribute(7_i64.into()));
        assert_eq!(int("-7.9").unwrap(), Value::Attribute((-7_i64).into()));
        assert!(int("seven").unwrap_err().is_value());
        assert!(int("1e300").unwrap_err().is_value());
    }

    #[test]
    fn test_non_finite_numbers_rejected() {
        for cell in ["NaN", "inf", "-infinity", "1,5", "abc"] {
            let err = coerce_one(
                TableKind::Edge,
                SchemaElement::Marker(Marker::Weight),
                cell,
            )
            .unwrap_err();
            assert!(err.is_value(), "{cell}");
            assert!(err.to_string().contains("a finite number"));
        }
    }

    #[test]
    fn test_edge_type() {
        assert_eq!(
            coerce_one(TableKind::Edge, SchemaElement::Marker(Marker::Type), "mutual")
                .unwrap(),
            Value::EdgeType(EdgeType::Mutual)
        );
        let err = coerce_one(
            TableKind::Edge,
            SchemaElement::Marker(Marker::Type),
            "Directed",
        )
        .unwrap_err();
        assert!(err.to_string().contains("one of directed, undirected, mutual"));
    }

    #[test]
    fn test_shape_vocabulary_per_table() {
        assert_eq!(
            coerce_one(TableKind::Node, SchemaElement::Viz(VizKind::Shape), "diamond")
                .unwrap(),
            Value::NodeShape(NodeShape::Diamond)
        );
        assert!(
            coerce_one(TableKind::Edge, SchemaElement::Viz(VizKind::Shape), "diamond")
                .is_err()
        );
    }

    #[test]
    fn test_hexagon_edge_shape_rejected() {
        let schema = ColumnSchema::new(
            TableKind::Edge,
            vec![Column {
                header: "style".into(),
                element: SchemaElement::Viz(VizKind::Shape),
            }],
        );
        let err = coerce_rows(rows(&[&["dashed"], &["hexagon"]]), &schema)
            .unwrap_err();

        assert!(err.is_value());
        let msg = err.to_string();
        assert!(msg.contains("\"style\""));
        assert!(msg.contains("\"hexagon\""));
        assert!(msg.contains("row 2"));
    }

    /// Records and errors keep the number the loader gave each row, even
    /// when earlier rows were skipped.
    #[test]
    fn test_row_numbers_preserved() {
        let schema =
            schema(TableKind::Node, vec![attribute(AttributeType::Integer)]);
        let numbered = |number: usize, cell: &str| Row {
            number,
            cells: vec![cell.to_owned()],
        };

        let records =
            coerce_rows(vec![numbered(1, "7"), numbered(3, "8")], &schema)
                .unwrap();
        let numbers: Vec<_> = records.iter().map(|r| r.row).collect();
        assert_eq!(numbers, [1, 3]);

        let err = coerce_rows(
            vec![numbered(1, "7"), numbered(3, "eight")],
            &schema,
        )
        .unwrap_err();
        assert!(err.is_value());
        assert!(err.to_string().contains("row 3"));
    }

    #[test]
    fn test_color() {
        assert_eq!(
            coerce_one(
                TableKind::Node,
                SchemaElement::Viz(VizKind::Color),
                "rgb(10,20,30)"
            )
            .unwrap(),
            Value::Color(Color::rgb(10, 20, 30))
        );
        let err = coerce_one(
            TableKind::Node,
            SchemaElement::Viz(VizKind::Color),
            "#ff0000",
        )
        .unwrap_err();
        assert!(err.to_string().contains("rgb(r,g,b)"));
    }

    #[test]
    fn test_boolean_examples() {
        assert!(parse_bool("true"));
        assert!(parse_bool("TRUE"));
        assert!(parse_bool("1"));
        assert!(!parse_bool("yes"));
        assert!(!parse_bool("0"));
        assert!(!parse_bool(" true"));
    }

    proptest! {
        /// Boolean coercion never fails and is true only for the two
        /// accepted spellings.
        #[test]
        fn prop_boolean_coercion(cell in ".*") {
            let value = coerce_one(
                TableKind::Node,
                attribute(AttributeType::Boolean),
                &cell,
            )
            .unwrap();
            let expected = cell.to_ascii_lowercase() == "true" || cell == "1";
            prop_assert_eq!(value, Value::Attribute(AttributeValue::Boolean(expected)));
        }
    }
}
