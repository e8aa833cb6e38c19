//! Column schema validation.
//!
//! Turns the raw schema from the configuration into a [`ColumnSchema`]:
//! each element is checked against the table's header and vocabulary, bound
//! to its column header, and has its defaults filled in. The raw schema is
//! left untouched, so validating the same input twice gives equal results.

use tabgraph_schemas::{
    AttributeDecl, AttributeType, Column, ColumnSchema, Marker,
    RawDeclaration, RawSchemaElement, SchemaElement, TableKind, VizKind,
};
use tracing::instrument;

use crate::error::ConvertError;

const TARGET_ATTRIBUTES: &str = "attributes";
const TARGET_VIZ: &str = "viz";

/// Validates `raw` against the header row of a `kind` table.
///
/// Checks run in order: the column count, the required markers, then each
/// element in header order.
///
/// # Errors
///
/// Returns a schema error ([`ConvertError::is_schema`]) naming the counts,
/// the missing marker, or the index and value of the offending element.
#[instrument(skip_all, fields(table = %kind))]
pub fn validate_schema(
    headers: &[String],
    raw: &[RawSchemaElement],
    kind: TableKind,
) -> Result<ColumnSchema, ConvertError> {
    if headers.len() != raw.len() {
        return Err(ConvertError::schema(
            kind,
            format!(
                "the table has {} columns but the schema has {} elements",
                headers.len(),
                raw.len()
            ),
        ));
    }

    for &marker in kind.required_markers() {
        let present = raw.iter().any(
            |e| matches!(e, RawSchemaElement::Marker(m) if m == marker.as_str()),
        );
        if !present {
            return Err(ConvertError::schema(
                kind,
                format!("missing required marker {:?}", marker.as_str()),
            ));
        }
    }

    let mut columns: Vec<Column> = Vec::with_capacity(raw.len());
    for (index, (header, element)) in headers.iter().zip(raw).enumerate() {
        let element = normalize(header, element, kind).map_err(|problem| {
            ConvertError::schema(
                kind,
                format!("element {index} ({}): {problem}", describe(element)),
            )
        })?;

        if matches!(element, SchemaElement::Marker(_) | SchemaElement::Viz(_))
            && columns.iter().any(|c| c.element == element)
        {
            return Err(ConvertError::schema(
                kind,
                format!(
                    "element {index} ({}): declared more than once",
                    describe(&raw[index])
                ),
            ));
        }

        columns.push(Column {
            header: header.clone(),
            element,
        });
    }

    Ok(ColumnSchema::new(kind, columns))
}

/// Resolves one raw element, or describes what is wrong with it.
fn normalize(
    header: &str,
    element: &RawSchemaElement,
    kind: TableKind,
) -> Result<SchemaElement, String> {
    match element {
        RawSchemaElement::Marker(name) => {
            let marker = name
                .parse::<Marker>()
                .ok()
                .filter(|m| kind.markers().contains(m))
                .ok_or_else(|| {
                    format!("expected one of {}", marker_names(kind))
                })?;
            Ok(SchemaElement::Marker(marker))
        }
        RawSchemaElement::Declaration(decl) => match decl.target.as_str() {
            TARGET_ATTRIBUTES => normalize_attribute(header, decl),
            TARGET_VIZ => normalize_viz(decl, kind),
            other => Err(format!(
                "unknown target {other:?}, expected \"{TARGET_ATTRIBUTES}\" \
                 or \"{TARGET_VIZ}\""
            )),
        },
        RawSchemaElement::Other(_) => Err(
            "expected a marker string or a declaration object with a target"
                .to_owned(),
        ),
    }
}

fn normalize_attribute(
    header: &str,
    decl: &RawDeclaration,
) -> Result<SchemaElement, String> {
    let type_name = decl
        .kind
        .as_deref()
        .ok_or("attribute declarations require a type")?;
    let kind: AttributeType =
        type_name.parse().map_err(|e| format!("invalid type: {e}"))?;

    let id = decl.id.clone().unwrap_or_else(|| header.to_owned());
    let title = decl.title.clone().unwrap_or_else(|| id.clone());
    Ok(SchemaElement::Attribute(AttributeDecl { id, title, kind }))
}

fn normalize_viz(
    decl: &RawDeclaration,
    kind: TableKind,
) -> Result<SchemaElement, String> {
    let allowed = || {
        let names: Vec<&str> =
            kind.viz_kinds().iter().map(|v| v.as_str()).collect();
        names.join(", ")
    };
    let id = decl
        .id
        .as_deref()
        .ok_or_else(|| format!("viz declarations require an id ({})", allowed()))?;
    let viz = id
        .parse::<VizKind>()
        .ok()
        .filter(|v| kind.viz_kinds().contains(v))
        .ok_or_else(|| {
            format!("viz id {id:?} is not one of {}", allowed())
        })?;
    Ok(SchemaElement::Viz(viz))
}

fn marker_names(kind: TableKind) -> String {
    let names: Vec<&str> = kind.markers().iter().map(|m| m.as_str()).collect();
    names.join(", ")
}

/// Renders a raw element the way it was written in the configuration.
fn describe(element: &RawSchemaElement) -> String {
    serde_json::to_string(element).unwrap_or_else(|_| format!("{element:?}"))
}
