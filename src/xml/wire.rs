use std::io::Cursor;

use indexmap::IndexMap;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};

use crate::error::{Result, XmiError};
use crate::options::XmiOptions;

/// A node of the export tree.
///
/// Attributes keep insertion order; children are grouped under the field name
/// that becomes their tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WireNode {
    pub attributes: IndexMap<String, String>,
    pub children: IndexMap<String, Vec<WireNode>>,
}

impl WireNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Node with a single attribute, e.g. `{xmi:idref: id}` or `{value: text}`.
    pub fn with_attr(name: &str, value: impl Into<String>) -> Self {
        let mut node = Self::new();
        node.set_attr(name, value);
        node
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        self.attributes.insert(name.to_string(), value.into());
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        self.attributes.shift_remove(name)
    }

    /// Replace whatever is stored under `name` with one child.
    pub fn set_child(&mut self, name: &str, child: WireNode) {
        self.children.insert(name.to_string(), vec![child]);
    }

    /// Append a child under `name`.
    pub fn add_child(&mut self, name: &str, child: WireNode) {
        self.children.entry(name.to_string()).or_default().push(child);
    }

    pub fn children(&self, name: &str) -> &[WireNode] {
        self.children.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut WireNode> {
        self.children.get_mut(name).and_then(|c| c.first_mut())
    }

    pub fn remove_children(&mut self, name: &str) -> Vec<WireNode> {
        self.children.shift_remove(name).unwrap_or_default()
    }
}

/// Serialize a root node into a complete XMI document.
///
/// The preamble is the XML declaration, the `xmi:XMI` element carrying the
/// namespace declarations and an `xmi:Documentation` exporter marker. The
/// root is written with its own `xmi:type` as tag name.
pub fn write_document(root: &WireNode, options: &XmiOptions) -> Result<String> {
    let mut buffer = Cursor::new(Vec::new());
    let mut writer = Writer::new_with_indent(&mut buffer, options.indent_char(), options.tab_size);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(|e| XmiError::xml(format!("Failed to write declaration: {e}")))?;

    let mut xmi_start = BytesStart::new("xmi:XMI");
    xmi_start.push_attribute(("xmi:version", options.xmi_version.as_str()));
    xmi_start.push_attribute(("xmlns:uml", options.uml_namespace.as_str()));
    xmi_start.push_attribute(("xmlns:xmi", options.xmi_namespace.as_str()));
    writer
        .write_event(Event::Start(xmi_start))
        .map_err(|e| XmiError::xml(format!("Failed to write XMI start: {e}")))?;

    let mut doc = BytesStart::new("xmi:Documentation");
    doc.push_attribute(("exporter", options.exporter.as_str()));
    doc.push_attribute(("exporterVersion", options.exporter_version.as_str()));
    writer
        .write_event(Event::Empty(doc))
        .map_err(|e| XmiError::xml(format!("Failed to write documentation: {e}")))?;

    let tag = root.attr("xmi:type").unwrap_or("uml:Model").to_string();
    write_node(&mut writer, &tag, root)?;

    writer
        .write_event(Event::End(BytesEnd::new("xmi:XMI")))
        .map_err(|e| XmiError::xml(format!("Failed to write XMI end: {e}")))?;

    String::from_utf8(buffer.into_inner())
        .map_err(|e| XmiError::xml(format!("Invalid UTF-8 in output: {e}")))
}

fn write_node<W: std::io::Write>(writer: &mut Writer<W>, tag: &str, node: &WireNode) -> Result<()> {
    let mut start = BytesStart::new(tag);
    for (key, value) in &node.attributes {
        // Line breaks survive attribute normalization only as character references
        let escaped = quick_xml::escape::escape(value.as_str())
            .replace('\n', "&#xA;")
            .replace('\r', "&#xD;")
            .replace('\t', "&#x9;");
        start.push_attribute((key.as_bytes(), escaped.as_bytes()));
    }

    let has_children = node.children.values().any(|c| !c.is_empty());
    if !has_children {
        return writer
            .write_event(Event::Empty(start))
            .map_err(|e| XmiError::xml(format!("Failed to write element: {e}")));
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|e| XmiError::xml(format!("Failed to write element start: {e}")))?;
    for (name, children) in &node.children {
        for child in children {
            write_node(writer, name, child)?;
        }
    }
    writer
        .write_event(Event::End(BytesEnd::new(tag)))
        .map_err(|e| XmiError::xml(format!("Failed to write element end: {e}")))?;
    Ok(())
}
