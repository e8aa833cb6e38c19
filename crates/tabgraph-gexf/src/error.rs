//! Error types for the graph document.
//!
//! Every error is an integrity violation detected while the document is
//! being populated. Writing the document only fails with `io::Error`.

use std::fmt;

use tabgraph_schemas::AttributeType;

/// A node, edge, or attribute model the document refused to accept.
#[derive(Debug, Clone, PartialEq)]
pub struct GexfError {
    kind: GexfErrorKind,
}

/// The specific integrity violation.
#[derive(Debug, Clone, PartialEq)]
enum GexfErrorKind {
    /// Two attribute definitions of the same class share an id.
    DuplicateAttribute { class: &'static str, id: String },
    /// A node id was added twice.
    DuplicateNode(String),
    /// An edge id was added twice.
    DuplicateEdge(String),
    /// An edge endpoint does not name an existing node.
    DanglingEndpoint {
        edge: String,
        end: &'static str,
        node: String,
    },
    /// An attribute value has no definition in the model.
    UnknownAttribute {
        class: &'static str,
        owner: String,
        id: String,
    },
    /// An attribute value does not have the declared type.
    TypeMismatch {
        class: &'static str,
        owner: String,
        id: String,
        expected: AttributeType,
        actual: AttributeType,
    },
    /// A metadata key cannot be written as an XML element name.
    InvalidMetaKey(String),
    /// Text holds a character that XML 1.0 cannot represent.
    InvalidText {
        owner: String,
        field: String,
        value: String,
    },
}

impl GexfError {
    pub(crate) fn duplicate_attribute(class: &'static str, id: &str) -> Self {
        Self {
            kind: GexfErrorKind::DuplicateAttribute {
                class,
                id: id.to_owned(),
            },
        }
    }

    pub(crate) fn duplicate_node(id: &str) -> Self {
        Self {
            kind: GexfErrorKind::DuplicateNode(id.to_owned()),
        }
    }

    pub(crate) fn duplicate_edge(id: &str) -> Self {
        Self {
            kind: GexfErrorKind::DuplicateEdge(id.to_owned()),
        }
    }

    pub(crate) fn dangling_endpoint(
        edge: &str,
        end: &'static str,
        node: &str,
    ) -> Self {
        Self {
            kind: GexfErrorKind::DanglingEndpoint {
                edge: edge.to_owned(),
                end,
                node: node.to_owned(),
            },
        }
    }

    pub(crate) fn unknown_attribute(
        class: &'static str,
        owner: &str,
        id: &str,
    ) -> Self {
        Self {
            kind: GexfErrorKind::UnknownAttribute {
                class,
                owner: owner.to_owned(),
                id: id.to_owned(),
            },
        }
    }

    pub(crate) fn type_mismatch(
        class: &'static str,
        owner: &str,
        id: &str,
        expected: AttributeType,
        actual: AttributeType,
    ) -> Self {
        Self {
            kind: GexfErrorKind::TypeMismatch {
                class,
                owner: owner.to_owned(),
                id: id.to_owned(),
                expected,
                actual,
            },
        }
    }

    pub(crate) fn invalid_meta_key(key: &str) -> Self {
        Self {
            kind: GexfErrorKind::InvalidMetaKey(key.to_owned()),
        }
    }

    pub(crate) fn invalid_text(owner: &str, field: &str, value: &str) -> Self {
        Self {
            kind: GexfErrorKind::InvalidText {
                owner: owner.to_owned(),
                field: field.to_owned(),
                value: value.to_owned(),
            },
        }
    }

    /// Returns true if an attribute model declared the same id twice.
    pub fn is_duplicate_attribute(&self) -> bool {
        matches!(self.kind, GexfErrorKind::DuplicateAttribute { .. })
    }

    /// Returns true if a node id was already taken.
    pub fn is_duplicate_node(&self) -> bool {
        matches!(self.kind, GexfErrorKind::DuplicateNode(_))
    }

    /// Returns true if an edge id was already taken.
    pub fn is_duplicate_edge(&self) -> bool {
        matches!(self.kind, GexfErrorKind::DuplicateEdge(_))
    }

    /// Returns true if an edge named a node that is not in the document.
    pub fn is_dangling_endpoint(&self) -> bool {
        matches!(self.kind, GexfErrorKind::DanglingEndpoint { .. })
    }

    /// Returns true if a value named an attribute missing from the model.
    pub fn is_unknown_attribute(&self) -> bool {
        matches!(self.kind, GexfErrorKind::UnknownAttribute { .. })
    }

    /// Returns true if a value's type differs from its declaration.
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self.kind, GexfErrorKind::TypeMismatch { .. })
    }

    /// Returns true if a metadata key is not a valid XML element name.
    pub fn is_invalid_meta_key(&self) -> bool {
        matches!(self.kind, GexfErrorKind::InvalidMetaKey(_))
    }

    /// Returns true if an id, label, or value holds a character XML cannot
    /// carry.
    pub fn is_invalid_text(&self) -> bool {
        matches!(self.kind, GexfErrorKind::InvalidText { .. })
    }
}

impl fmt::Display for GexfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            GexfErrorKind::DuplicateAttribute { class, id } => {
                write!(f, "{class} attribute {id:?} is declared more than once")
            }
            GexfErrorKind::DuplicateNode(id) => {
                write!(f, "duplicate node id {id:?}")
            }
            GexfErrorKind::DuplicateEdge(id) => {
                write!(f, "duplicate edge id {id:?}")
            }
            GexfErrorKind::DanglingEndpoint { edge, end, node } => {
                write!(f, "edge {edge:?} has unknown {end} node {node:?}")
            }
            GexfErrorKind::UnknownAttribute { class, owner, id } => {
                write!(f, "{class} {owner:?} sets undeclared attribute {id:?}")
            }
            GexfErrorKind::TypeMismatch {
                class,
                owner,
                id,
                expected,
                actual,
            } => write!(
                f,
                "{class} {owner:?} sets attribute {id:?} to a {actual} value, \
                 but it is declared as {expected}"
            ),
            GexfErrorKind::InvalidMetaKey(key) => {
                write!(f, "metadata key {key:?} is not a valid XML name")
            }
            GexfErrorKind::InvalidText {
                owner,
                field,
                value,
            } => write!(
                f,
                "{owner} {field} {value:?} contains a character that XML \
                 cannot represent"
            ),
        }
    }
}

impl std::error::Error for GexfError {}
