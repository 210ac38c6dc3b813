//! XML primitives.
//!
//! The import side works over a small owned DOM ([`XmlNode`]) built from
//! `quick-xml` events. The export side builds a [`WireNode`] tree, a JSON-like
//! shape where string leaves become attributes and nested nodes become child
//! elements named by their field, and serializes it in one pass.

mod wire;

pub use wire::{WireNode, write_document};

use indexmap::IndexMap;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{Result, XmiError};

// ============================================================================
// DOM
// ============================================================================

/// An XML element with its attributes and element children.
///
/// Text content is not retained; XMI carries everything in attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlNode {
    /// Qualified tag name, e.g. `packagedElement` or `uml:Model`.
    pub name: String,
    pub attributes: IndexMap<String, String>,
    pub children: Vec<XmlNode>,
    /// Position of the start tag in document order; stable for one parse.
    pub index: usize,
}

impl XmlNode {
    pub fn new(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
            children: Vec::new(),
            index,
        }
    }

    /// Get an attribute value.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Direct children with the given tag name, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlNode> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// First direct child with the given tag name.
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// This node or the first descendant (depth first) with the given tag name.
    pub fn find(&self, name: &str) -> Option<&XmlNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }
}

/// Parse a document and return its root element.
pub fn parse_document(input: &str) -> Result<XmlNode> {
    let mut reader = Reader::from_str(input);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root: Option<XmlNode> = None;
    let mut index = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let node = start_node(e, index)?;
                index += 1;
                stack.push(node);
            }
            Ok(Event::Empty(ref e)) => {
                let node = start_node(e, index)?;
                index += 1;
                attach(&mut stack, &mut root, node)?;
            }
            Ok(Event::End(_)) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| XmiError::xml("Unexpected closing tag"))?;
                attach(&mut stack, &mut root, node)?;
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(XmiError::xml(format!(
                    "XML parse error at position {}: {e}",
                    reader.error_position()
                )));
            }
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(XmiError::xml(format!(
            "Unexpected end of document inside <{}>",
            open.name
        )));
    }
    root.ok_or_else(|| XmiError::missing_element("document root"))
}

fn start_node(e: &BytesStart<'_>, index: usize) -> Result<XmlNode> {
    let name = std::str::from_utf8(e.name().as_ref())
        .map_err(|e| XmiError::xml(format!("Invalid tag name: {e}")))?
        .to_string();
    let mut node = XmlNode::new(name, index);
    for attr in e.attributes() {
        let attr = attr.map_err(|e| XmiError::xml(format!("Invalid attribute: {e}")))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| XmiError::xml(format!("Invalid attribute name: {e}")))?
            .to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| XmiError::xml(format!("Invalid attribute value: {e}")))?
            .into_owned();
        node.attributes.insert(key, value);
    }
    Ok(node)
}

fn attach(stack: &mut [XmlNode], root: &mut Option<XmlNode>, node: XmlNode) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None if root.is_none() => *root = Some(node),
        None => return Err(XmiError::xml("Multiple root elements")),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_elements() {
        let doc = parse_document(
            r#"<?xml version="1.0"?>
<xmi:XMI xmi:version="2.1">
  <uml:Model xmi:id="m1" name="M">
    <packagedElement xmi:type="uml:Class" xmi:id="c1" name="A &amp; B"/>
    <!-- ignored -->
    <packagedElement xmi:type="uml:Class" xmi:id="c2">text is dropped</packagedElement>
  </uml:Model>
</xmi:XMI>"#,
        )
        .expect("should parse");

        assert_eq!(doc.name, "xmi:XMI");
        let model = doc.child("uml:Model").expect("model");
        assert_eq!(model.attr("name"), Some("M"));
        let classes: Vec<_> = model.children_named("packagedElement").collect();
        assert_eq!(classes.len(), 2);
        assert_eq!(classes[0].attr("name"), Some("A & B"));
        assert!(classes[0].index < classes[1].index);
    }

    #[test]
    fn test_find_descendant() {
        let doc = parse_document("<root><a><xmi:XMI x=\"1\"/></a></root>").expect("should parse");
        assert_eq!(doc.find("xmi:XMI").and_then(|n| n.attr("x")), Some("1"));
        assert!(doc.find("missing").is_none());
    }

    #[test]
    fn test_unclosed_document_is_an_error() {
        let err = parse_document("<xmi:XMI><uml:Model>").unwrap_err();
        assert!(matches!(err, XmiError::Xml(_)));
    }

    #[test]
    fn test_mismatched_tags_are_an_error() {
        assert!(parse_document("<a><b></a></b>").is_err());
    }

    #[test]
    fn test_empty_document_is_missing_root() {
        let err = parse_document("<?xml version=\"1.0\"?>").unwrap_err();
        assert!(matches!(err, XmiError::Missing { .. }));
    }
}
