//! GEXF 1.2 XML serialization.
//!
//! Output is pretty-printed with two-space indentation. Attribute models are
//! written only when non-empty, and nodes or edges without attribute values
//! or viz properties are written as empty elements.

use std::io::{self, Write};

use indexmap::IndexMap;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use tabgraph_schemas::{AttributeDef, Color, GraphParams};
use tracing::debug_span;

use crate::document::{AttributeValue, Edge, Gexf, Node};
use crate::xml::escape_value;

const GEXF_NAMESPACE: &str = "http://gexf.net/1.2";
const VIZ_NAMESPACE: &str = "http://gexf.net/1.2/viz";
const GEXF_VERSION: &str = "1.2";

impl Gexf {
    /// Writes the document as pretty-printed GEXF XML.
    pub fn write_to(&self, out: impl Write) -> io::Result<()> {
        let _span = debug_span!(
            "write_gexf",
            nodes = self.node_count(),
            edges = self.edge_count()
        )
        .entered();

        let mut w = Writer::new_with_indent(out, b' ', 2);
        w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let mut root = BytesStart::new("gexf");
        root.push_attribute(("xmlns", GEXF_NAMESPACE));
        root.push_attribute(("xmlns:viz", VIZ_NAMESPACE));
        root.push_attribute(("version", GEXF_VERSION));
        w.write_event(Event::Start(root))?;

        self.write_meta(&mut w)?;

        let mut graph = BytesStart::new("graph");
        graph.push_attribute((
            "defaultedgetype",
            self.params().default_edge_type.as_str(),
        ));
        graph.push_attribute(("mode", "static"));
        w.write_event(Event::Start(graph))?;

        write_model(&mut w, "node", self.node_model())?;
        write_model(&mut w, "edge", self.edge_model())?;

        w.write_event(Event::Start(BytesStart::new("nodes")))?;
        for node in self.nodes() {
            write_node(&mut w, node)?;
        }
        w.write_event(Event::End(BytesEnd::new("nodes")))?;

        w.write_event(Event::Start(BytesStart::new("edges")))?;
        for edge in self.edges() {
            write_edge(&mut w, edge)?;
        }
        w.write_event(Event::End(BytesEnd::new("edges")))?;

        w.write_event(Event::End(BytesEnd::new("graph")))?;
        w.write_event(Event::End(BytesEnd::new("gexf")))?;
        w.get_mut().write_all(b"\n")
    }

    /// Serializes the document into a string.
    pub fn to_xml_string(&self) -> io::Result<String> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        String::from_utf8(buf)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    fn write_meta<W: Write>(&self, w: &mut Writer<W>) -> io::Result<()> {
        let params = self.params();
        let mut elements = params.meta_elements().peekable();
        if params.last_modified().is_none() && elements.peek().is_none() {
            return Ok(());
        }

        let mut meta = BytesStart::new("meta");
        if let Some(date) = params.last_modified() {
            push_text(&mut meta, GraphParams::LAST_MODIFIED, date);
        }
        if elements.peek().is_none() {
            return w.write_event(Event::Empty(meta));
        }

        w.write_event(Event::Start(meta))?;
        for (key, value) in elements {
            w.write_event(Event::Start(BytesStart::new(key)))?;
            let text = BytesText::from_escaped(escape_value(value));
            w.write_event(Event::Text(text))?;
            w.write_event(Event::End(BytesEnd::new(key)))?;
        }
        w.write_event(Event::End(BytesEnd::new("meta")))
    }
}

fn write_model<W: Write>(
    w: &mut Writer<W>,
    class: &str,
    model: &[AttributeDef],
) -> io::Result<()> {
    if model.is_empty() {
        return Ok(());
    }

    let mut attributes = BytesStart::new("attributes");
    attributes.push_attribute(("class", class));
    attributes.push_attribute(("mode", "static"));
    w.write_event(Event::Start(attributes))?;
    for def in model {
        let mut attribute = BytesStart::new("attribute");
        push_text(&mut attribute, "id", &def.id);
        push_text(&mut attribute, "title", &def.title);
        attribute.push_attribute(("type", def.kind.as_str()));
        w.write_event(Event::Empty(attribute))?;
    }
    w.write_event(Event::End(BytesEnd::new("attributes")))
}

fn write_node<W: Write>(w: &mut Writer<W>, node: &Node) -> io::Result<()> {
    let mut start = BytesStart::new("node");
    push_text(&mut start, "id", &node.id);
    push_text(&mut start, "label", &node.label);

    if node.attributes.is_empty() && node.viz.is_empty() {
        return w.write_event(Event::Empty(start));
    }

    w.write_event(Event::Start(start))?;
    write_attvalues(w, &node.attributes)?;
    if let Some(color) = node.viz.color {
        write_color(w, color)?;
    }
    if let Some(size) = node.viz.size {
        write_viz_value(w, "viz:size", &size.to_string())?;
    }
    if let Some(shape) = node.viz.shape {
        write_viz_value(w, "viz:shape", shape.as_str())?;
    }
    w.write_event(Event::End(BytesEnd::new("node")))
}

fn write_edge<W: Write>(w: &mut Writer<W>, edge: &Edge) -> io::Result<()> {
    let mut start = BytesStart::new("edge");
    push_text(&mut start, "id", &edge.id);
    push_text(&mut start, "source", &edge.source);
    push_text(&mut start, "target", &edge.target);
    push_text(&mut start, "label", &edge.label);
    if let Some(kind) = edge.kind {
        start.push_attribute(("type", kind.as_str()));
    }
    if let Some(weight) = edge.weight {
        start.push_attribute(("weight", weight.to_string().as_str()));
    }

    if edge.attributes.is_empty() && edge.viz.is_empty() {
        return w.write_event(Event::Empty(start));
    }

    w.write_event(Event::Start(start))?;
    write_attvalues(w, &edge.attributes)?;
    if let Some(color) = edge.viz.color {
        write_color(w, color)?;
    }
    if let Some(thickness) = edge.viz.thickness {
        write_viz_value(w, "viz:thickness", &thickness.to_string())?;
    }
    if let Some(shape) = edge.viz.shape {
        write_viz_value(w, "viz:shape", shape.as_str())?;
    }
    w.write_event(Event::End(BytesEnd::new("edge")))
}

fn write_attvalues<W: Write>(
    w: &mut Writer<W>,
    values: &IndexMap<String, AttributeValue>,
) -> io::Result<()> {
    if values.is_empty() {
        return Ok(());
    }

    w.write_event(Event::Start(BytesStart::new("attvalues")))?;
    for (id, value) in values {
        let mut attvalue = BytesStart::new("attvalue");
        push_text(&mut attvalue, "for", id);
        push_text(&mut attvalue, "value", &value.to_string());
        w.write_event(Event::Empty(attvalue))?;
    }
    w.write_event(Event::End(BytesEnd::new("attvalues")))
}

fn write_color<W: Write>(w: &mut Writer<W>, color: Color) -> io::Result<()> {
    let mut element = BytesStart::new("viz:color");
    element.push_attribute(("r", color.r.to_string().as_str()));
    element.push_attribute(("g", color.g.to_string().as_str()));
    element.push_attribute(("b", color.b.to_string().as_str()));
    if let Some(a) = color.a {
        element.push_attribute(("a", a.to_string().as_str()));
    }
    w.write_event(Event::Empty(element))
}

/// Adds a string attribute, escaping it so that readers get it back
/// unchanged.
fn push_text(start: &mut BytesStart<'_>, key: &str, value: &str) {
    let escaped = escape_value(value);
    start.push_attribute((key.as_bytes(), escaped.as_bytes()));
}

fn write_viz_value<W: Write>(
    w: &mut Writer<W>,
    name: &str,
    value: &str,
) -> io::Result<()> {
    let mut element = BytesStart::new(name);
    element.push_attribute(("value", value));
    w.write_event(Event::Empty(element))
}

#[cfg(test)]
mod tests {
    use tabgraph_schemas::{
        AttributeType, EdgeShape, EdgeType, GraphParams, NodeShape,
    };

    use super::*;

    fn sample() -> Gexf {
        let mut params = GraphParams::new(EdgeType::Undirected);
        params
            .meta
            .insert("lastmodifieddate".into(), "2024-05-01".into());
        params.meta.insert("creator".into(), "Ada & co".into());

        let mut gexf = Gexf::new(
            params,
            vec![AttributeDef::new("score", "Score", AttributeType::Float)],
            Vec::new(),
        )
        .unwrap();

        let mut a = Node::new("a", "Alpha <1>");
        a.attributes.insert("score".into(), 2.5.into());
        a.viz.color = Some(Color::rgb(255, 0, 0));
        a.viz.size = Some(10.0);
        a.viz.shape = Some(NodeShape::Square);
        gexf.add_node(a).unwrap();
        gexf.add_node(Node::new("b", "b")).unwrap();

        let mut edge = Edge::new("e1", "e1", "a", "b");
        edge.kind = Some(EdgeType::Directed);
        edge.weight = Some(1.5);
        edge.viz.shape = Some(EdgeShape::Dashed);
        gexf.add_edge(edge).unwrap();
        gexf
    }

    #[test]
    fn test_write_document() {
        let xml = sample().to_xml_string().unwrap();

        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains(r#"<gexf xmlns="http://gexf.net/1.2""#));
        assert!(xml.contains(r#"<meta lastmodifieddate="2024-05-01">"#));
        assert!(xml.contains("<creator>Ada &amp; co</creator>"));
        assert!(
            xml.contains(r#"<graph defaultedgetype="undirected" mode="static">"#)
        );
        assert!(xml.contains(
            r#"<attribute id="score" title="Score" type="float"/>"#
        ));
        assert!(xml.contains(r#"<node id="a" label="Alpha &lt;1&gt;">"#));
        assert!(xml.contains(r#"<attvalue for="score" value="2.5"/>"#));
        assert!(xml.contains(r#"<viz:color r="255" g="0" b="0"/>"#));
        assert!(xml.contains(r#"<viz:size value="10"/>"#));
        assert!(xml.contains(r#"<viz:shape value="square"/>"#));
        assert!(xml.contains(r#"<node id="b" label="b"/>"#));
        assert!(xml.contains(
            r#"<edge id="e1" source="a" target="b" label="e1" type="directed" weight="1.5">"#
        ));
        assert!(xml.contains(r#"<viz:shape value="dashed"/>"#));
        assert!(!xml.contains(r#"class="edge""#));
        assert!(xml.ends_with("</gexf>\n"));
    }

    /// Indentation follows nesting depth.
    #[test]
    fn test_pretty_printed() {
        let xml = sample().to_xml_string().unwrap();
        assert!(xml.contains("\n  <graph "));
        assert!(xml.contains("\n    <nodes>"));
        assert!(xml.contains("\n      <node id=\"a\""));
    }

    /// Markup, line breaks and tabs in strings survive a round trip through
    /// a conforming reader.
    #[test]
    fn test_read_back() {
        use quick_xml::Reader;

        let mut params = GraphParams::default();
        params.meta.insert("creator".into(), "<tabgraph>".into());
        params.meta.insert("data-source".into(), "a & b".into());
        let mut gexf = Gexf::new(
            params,
            vec![AttributeDef::new("note", "Note", AttributeType::String)],
            Vec::new(),
        )
        .unwrap();
        let mut node = Node::new("n\"1", "first line\nsecond\t<&>");
        node.attributes.insert("note".into(), "crlf\r\nend".into());
        gexf.add_node(node).unwrap();
        let xml = gexf.to_xml_string().unwrap();
        assert!(xml.contains("first line&#10;second&#9;&lt;&amp;&gt;"));

        let mut reader = Reader::from_str(&xml);
        let mut elements = Vec::new();
        let mut labels = Vec::new();
        let mut notes = Vec::new();
        loop {
            match reader.read_event().unwrap() {
                Event::Eof => break,
                Event::Start(e) | Event::Empty(e) => {
                    let name = e.name();
                    elements
                        .push(String::from_utf8_lossy(name.as_ref()).into_owned());
                    if name.as_ref() == b"node" {
                        let label =
                            e.try_get_attribute("label").unwrap().unwrap();
                        labels
                            .push(label.unescape_value().unwrap().into_owned());
                    }
                    if name.as_ref() == b"attvalue" {
                        let value =
                            e.try_get_attribute("value").unwrap().unwrap();
                        notes
                            .push(value.unescape_value().unwrap().into_owned());
                    }
                }
                _ => {}
            }
        }

        assert!(elements.iter().any(|e| e == "creator"));
        assert!(elements.iter().any(|e| e == "data-source"));
        assert_eq!(labels, ["first line\nsecond\t<&>"]);
        assert_eq!(notes, ["crlf\r\nend"]);
    }

    #[test]
    fn test_meta_omitted_when_empty() {
        let gexf =
            Gexf::new(GraphParams::default(), Vec::new(), Vec::new()).unwrap();
        let xml = gexf.to_xml_string().unwrap();
        assert!(!xml.contains("<meta"));
        assert!(xml.contains("<nodes>"));
    }
}
