//! The in-memory graph document.
//!
//! A [`Gexf`] is created with its graph parameters and both attribute
//! models, then populated node by node and edge by edge. Every insertion is
//! checked against what is already in the document, so a populated document
//! is always internally consistent:
//! - node ids and edge ids are unique,
//! - edge endpoints name existing nodes,
//! - attribute values are declared in the model with a matching type,
//! - every string is representable in XML 1.0.

use std::fmt;

use indexmap::IndexMap;
use tabgraph_schemas::{
    AttributeDef, AttributeType, Color, EdgeShape, EdgeType, GraphParams,
    NodeShape,
};

use crate::error::GexfError;
use crate::xml;

/// A typed attribute value attached to a node or edge.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl AttributeValue {
    /// The attribute type this value satisfies.
    pub fn kind(&self) -> AttributeType {
        match self {
            Self::String(_) => AttributeType::String,
            Self::Integer(_) => AttributeType::Integer,
            Self::Float(_) => AttributeType::Float,
            Self::Boolean(_) => AttributeType::Boolean,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Boolean(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

/// Rendering hints for a node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeViz {
    pub color: Option<Color>,
    pub size: Option<f64>,
    pub shape: Option<NodeShape>,
}

impl NodeViz {
    /// True when no hint is set and the `<viz:*>` children can be omitted.
    pub fn is_empty(&self) -> bool {
        self.color.is_none() && self.size.is_none() && self.shape.is_none()
    }
}

/// Rendering hints for an edge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeViz {
    pub color: Option<Color>,
    pub thickness: Option<f64>,
    pub shape: Option<EdgeShape>,
}

impl EdgeViz {
    /// True when no hint is set.
    pub fn is_empty(&self) -> bool {
        self.color.is_none()
            && self.thickness.is_none()
            && self.shape.is_none()
    }
}

/// A graph node. `id` is unique within its document.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub label: String,
    /// Attribute values keyed by attribute id, in column order.
    pub attributes: IndexMap<String, AttributeValue>,
    pub viz: NodeViz,
}

impl Node {
    /// Creates a node with no attributes and no rendering hints.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            attributes: IndexMap::new(),
            viz: NodeViz::default(),
        }
    }
}

/// A graph edge between two nodes of the same document.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: String,
    pub label: String,
    /// Per-edge type; the graph default applies when `None`.
    pub kind: Option<EdgeType>,
    pub source: String,
    pub target: String,
    pub weight: Option<f64>,
    /// Attribute values keyed by attribute id, in column order.
    pub attributes: IndexMap<String, AttributeValue>,
    pub viz: EdgeViz,
}

impl Edge {
    /// Creates an edge with the graph's default type and no weight.
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind: None,
            source: source.into(),
            target: target.into(),
            weight: None,
            attributes: IndexMap::new(),
            viz: EdgeViz::default(),
        }
    }
}

/// A static graph with separate node and edge attribute models.
#[derive(Debug, Clone, PartialEq)]
pub struct Gexf {
    params: GraphParams,
    node_model: Vec<AttributeDef>,
    edge_model: Vec<AttributeDef>,
    nodes: IndexMap<String, Node>,
    edges: IndexMap<String, Edge>,
}

impl Gexf {
    /// Creates an empty document.
    ///
    /// Fails if either model declares the same attribute id twice, or if a
    /// metadata key is not a valid element name.
    pub fn new(
        params: GraphParams,
        node_model: Vec<AttributeDef>,
        edge_model: Vec<AttributeDef>,
    ) -> Result<Self, GexfError> {
        check_meta(&params)?;
        check_model("node", &node_model)?;
        check_model("edge", &edge_model)?;
        Ok(Self {
            params,
            node_model,
            edge_model,
            nodes: IndexMap::new(),
            edges: IndexMap::new(),
        })
    }

    /// Adds a node, rejecting duplicate ids and attribute values that the
    /// node model does not declare.
    pub fn add_node(&mut self, node: Node) -> Result<(), GexfError> {
        if self.nodes.contains_key(&node.id) {
            return Err(GexfError::duplicate_node(&node.id));
        }
        let owner = format!("node {:?}", node.id);
        check_text(&owner, "id", &node.id)?;
        check_text(&owner, "label", &node.label)?;
        check_string_values(&owner, &node.attributes)?;
        check_attributes("node", &node.id, &node.attributes, &self.node_model)?;
        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    /// Adds an edge between two existing nodes, rejecting duplicate ids and
    /// attribute values that the edge model does not declare.
    pub fn add_edge(&mut self, edge: Edge) -> Result<(), GexfError> {
        if self.edges.contains_key(&edge.id) {
            return Err(GexfError::duplicate_edge(&edge.id));
        }
        for (end, node) in [("source", &edge.source), ("target", &edge.target)]
        {
            if !self.nodes.contains_key(node) {
                return Err(GexfError::dangling_endpoint(&edge.id, end, node));
            }
        }
        let owner = format!("edge {:?}", edge.id);
        check_text(&owner, "id", &edge.id)?;
        check_text(&owner, "label", &edge.label)?;
        check_string_values(&owner, &edge.attributes)?;
        check_attributes("edge", &edge.id, &edge.attributes, &self.edge_model)?;
        self.edges.insert(edge.id.clone(), edge);
        Ok(())
    }

    /// Graph-level parameters, including the metadata.
    pub fn params(&self) -> &GraphParams {
        &self.params
    }

    /// Attributes declared for nodes, in declaration order.
    pub fn node_model(&self) -> &[AttributeDef] {
        &self.node_model
    }

    /// Attributes declared for edges, in declaration order.
    pub fn edge_model(&self) -> &[AttributeDef] {
        &self.edge_model
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl ExactSizeIterator<Item = &Node> {
        self.nodes.values()
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> impl ExactSizeIterator<Item = &Edge> {
        self.edges.values()
    }

    /// Looks up a node by id.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Looks up an edge by id.
    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.get(id)
    }

    /// Number of nodes added so far.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges added so far.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

/// Metadata keys other than the last-modified date become element names.
fn check_meta(params: &GraphParams) -> Result<(), GexfError> {
    for (key, value) in &params.meta {
        if key != GraphParams::LAST_MODIFIED && !xml::is_name(key) {
            return Err(GexfError::invalid_meta_key(key));
        }
        check_text("metadata", key, value)?;
    }
    Ok(())
}

fn check_model(
    class: &'static str,
    model: &[AttributeDef],
) -> Result<(), GexfError> {
    for (i, def) in model.iter().enumerate() {
        if model[..i].iter().any(|earlier| earlier.id == def.id) {
            return Err(GexfError::duplicate_attribute(class, &def.id));
        }
        let owner = format!("{class} attribute");
        check_text(&owner, "id", &def.id)?;
        check_text(&owner, "title", &def.title)?;
    }
    Ok(())
}

fn check_text(owner: &str, field: &str, value: &str) -> Result<(), GexfError> {
    if xml::is_text(value) {
        Ok(())
    } else {
        Err(GexfError::invalid_text(owner, field, value))
    }
}

fn check_string_values(
    owner: &str,
    attributes: &IndexMap<String, AttributeValue>,
) -> Result<(), GexfError> {
    for (id, value) in attributes {
        if let AttributeValue::String(text) = value {
            check_text(owner, id, text)?;
        }
    }
    Ok(())
}

fn check_attributes(
    class: &'static str,
    owner: &str,
    attributes: &IndexMap<String, AttributeValue>,
    model: &[AttributeDef],
) -> Result<(), GexfError> {
    for (id, value) in attributes {
        let def = model
            .iter()
            .find(|def| &def.id == id)
            .ok_or_else(|| GexfError::unknown_attribute(class, owner, id))?;
        if def.kind != value.kind() {
            return Err(GexfError::type_mismatch(
                class,
                owner,
                id,
                def.kind,
                value.kind(),
            ));
        }
    }
    Ok(())
}
