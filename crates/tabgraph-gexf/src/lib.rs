//! GEXF graph documents.
//!
//! This crate is the document layer of the tabgraph pipeline. The
//! converter populates a [`Gexf`] with nodes and edges; the document
//! enforces its own integrity (unique ids, resolvable endpoints, declared
//! and correctly typed attributes) and serializes itself as GEXF 1.2 XML.
//!
//! ## Usage
//!
//! ```
//! use tabgraph_gexf::{Edge, Gexf, Node};
//! use tabgraph_schemas::{EdgeType, GraphParams};
//!
//! let mut gexf =
//!     Gexf::new(GraphParams::new(EdgeType::Directed), Vec::new(), Vec::new())
//!         .unwrap();
//! gexf.add_node(Node::new("a", "A")).unwrap();
//! gexf.add_node(Node::new("b", "B")).unwrap();
//! gexf.add_edge(Edge::new("e1", "e1", "a", "b")).unwrap();
//!
//! let xml = gexf.to_xml_string().unwrap();
//! assert!(xml.contains(r#"<edge id="e1" source="a" target="b""#));
//! ```

mod document;
mod error;
mod writer;
mod xml;

#[doc(inline)]
pub use crate::document::{
    AttributeValue, Edge, EdgeViz, Gexf, Node, NodeViz,
};
#[doc(inline)]
pub use crate::error::GexfError;
