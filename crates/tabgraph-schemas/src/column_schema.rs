//! Column schemas: how each column of a node or edge table maps onto the
//! graph document.
//!
//! A schema exists in two forms. The raw form ([`RawSchemaElement`]) is what
//! users write in the configuration file: bare marker strings mixed with
//! declaration objects. The normalized form ([`ColumnSchema`]) is produced by
//! validation in `tabgraph-convert`; every column is bound to its header and
//! resolved to a [`SchemaElement`] with all defaults filled in.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::vocabulary::{VocabularyError, parse_exact};

/// Which of the two input tables a schema describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    Node,
    Edge,
}

impl TableKind {
    /// Lowercase name used in log fields and error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Edge => "edge",
        }
    }

    /// Markers a schema of this kind may use.
    pub fn markers(self) -> &'static [Marker] {
        match self {
            Self::Node => &[Marker::Id, Marker::Label],
            Self::Edge => &[
                Marker::Id,
                Marker::Type,
                Marker::Label,
                Marker::Source,
                Marker::Target,
                Marker::Weight,
            ],
        }
    }

    /// Markers a schema of this kind must contain.
    pub fn required_markers(self) -> &'static [Marker] {
        match self {
            Self::Node => &[Marker::Id],
            Self::Edge => &[Marker::Source, Marker::Target],
        }
    }

    /// Visualization properties a schema of this kind may declare.
    pub fn viz_kinds(self) -> &'static [VizKind] {
        match self {
            Self::Node => &[VizKind::Color, VizKind::Size, VizKind::Shape],
            Self::Edge => {
                &[VizKind::Color, VizKind::Thickness, VizKind::Shape]
            }
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bare schema element naming a structural role of its column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    Id,
    Label,
    Type,
    Source,
    Target,
    Weight,
}

impl Marker {
    /// Every marker, in the order error messages list them.
    pub const ALL: [Self; 6] = [
        Self::Id,
        Self::Label,
        Self::Type,
        Self::Source,
        Self::Target,
        Self::Weight,
    ];

    /// The marker as it is written in a schema.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Label => "label",
            Self::Type => "type",
            Self::Source => "source",
            Self::Target => "target",
            Self::Weight => "weight",
        }
    }
}

impl FromStr for Marker {
    type Err = VocabularyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_exact(s, &Self::ALL, Self::as_str)
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value type of a custom attribute.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    String,
    Integer,
    Float,
    Boolean,
}

impl AttributeType {
    /// Every variant, in the order error messages list them.
    pub const ALL: [Self; 4] =
        [Self::String, Self::Integer, Self::Float, Self::Boolean];

    /// The GEXF `type` of the attribute.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
        }
    }
}

impl FromStr for AttributeType {
    type Err = VocabularyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_exact(s, &Self::ALL, Self::as_str)
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visualization property a column feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VizKind {
    Color,
    /// Node size.
    Size,
    /// Edge thickness.
    Thickness,
    Shape,
}

impl VizKind {
    /// Every variant, in the order error messages list them.
    pub const ALL: [Self; 4] =
        [Self::Color, Self::Size, Self::Thickness, Self::Shape];

    /// The `id` a viz declaration uses for this property.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Color => "color",
            Self::Size => "size",
            Self::Thickness => "thickness",
            Self::Shape => "shape",
        }
    }
}

impl FromStr for VizKind {
    type Err = VocabularyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_exact(s, &Self::ALL, Self::as_str)
    }
}

impl fmt::Display for VizKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One element of a schema as written in the configuration file.
///
/// Deserialization never fails on the element's shape: anything that is
/// neither a string nor a declaration object lands in [`Self::Other`] so the
/// validator can report it together with its column index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum RawSchemaElement {
    /// A bare marker such as `"id"` or `"source"`.
    Marker(String),
    /// A `{ "target": .., "id": .., "title": .., "type": .. }` object.
    Declaration(RawDeclaration),
    /// Any other JSON value; always rejected by validation.
    Other(serde_json::Value),
}

impl RawSchemaElement {
    /// Shorthand for [`RawSchemaElement::Marker`].
    pub fn marker(name: impl Into<String>) -> Self {
        Self::Marker(name.into())
    }
}

/// A structured schema element before defaults are applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RawDeclaration {
    /// `"attributes"` or `"viz"`.
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// A custom attribute column with its defaults resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDecl {
    pub id: String,
    pub title: String,
    pub kind: AttributeType,
}

/// A validated schema element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaElement {
    Marker(Marker),
    Attribute(AttributeDecl),
    Viz(VizKind),
}

/// A schema element bound to the header of the column it describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub header: String,
    pub element: SchemaElement,
}

/// A validated, normalized schema for one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    kind: TableKind,
    columns: Vec<Column>,
}

impl ColumnSchema {
    /// Wraps already validated columns. Use `validate_schema` in
    /// `tabgraph-convert` to build one from a raw schema.
    pub fn new(kind: TableKind, columns: Vec<Column>) -> Self {
        Self { kind, columns }
    }

    /// The table this schema describes.
    pub fn kind(&self) -> TableKind {
        self.kind
    }

    /// Columns in table order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True for a schema with no columns, which validation never produces.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns true if some column carries `marker`.
    pub fn has_marker(&self, marker: Marker) -> bool {
        self.columns
            .iter()
            .any(|c| c.element == SchemaElement::Marker(marker))
    }

    /// Attribute declarations in column order.
    pub fn attributes(&self) -> impl Iterator<Item = &AttributeDecl> {
        self.columns.iter().filter_map(|c| match &c.element {
            SchemaElement::Attribute(decl) => Some(decl),
            _ => None,
        })
    }
}

/// One entry of a graph's attribute model: the declaration the document
/// embeds for a node or edge attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDef {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: AttributeType,
}

impl AttributeDef {
    /// Creates a model entry.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        kind: AttributeType,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            kind,
        }
    }
}

impl From<&AttributeDecl> for AttributeDef {
    fn from(decl: &AttributeDecl) -> Self {
        Self::new(decl.id.clone(), decl.title.clone(), decl.kind)
    }
}
