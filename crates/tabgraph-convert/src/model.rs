//! Attribute model derivation.

use tabgraph_schemas::{AttributeDef, ColumnSchema};

/// Returns the attribute model declared by `schema`: one entry per
/// attribute column, in column order.
pub fn derive_attribute_model(schema: &ColumnSchema) -> Vec<AttributeDef> {
    schema.attributes().map(AttributeDef::from).collect()
}
