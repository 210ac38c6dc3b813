//! Writer session and wire-node setters.
//!
//! The free setters mirror the reader's accessors: each writes one attribute
//! or child of a [`WireNode`] and is a no-op when there is nothing to write
//! (except booleans, which are always written). The session methods dispatch
//! nested records to their concept writers and collect deferred nodes.

use crate::model::{ElementId, Record, Repository, Value};
use crate::options::XmiOptions;
use crate::xml::WireNode;

use super::uml;

// ============================================================================
// SETTERS
// ============================================================================

pub fn set_type(json: &mut WireNode, type_name: &str) {
    json.set_attr("xmi:type", type_name);
}

/// Written only when non-empty.
pub fn write_string(json: &mut WireNode, name: &str, value: &str) {
    if !value.is_empty() {
        json.set_attr(name, value);
    }
}

pub fn write_boolean(json: &mut WireNode, name: &str, value: bool) {
    json.set_attr(name, if value { "true" } else { "false" });
}

/// A literal of `literals`; anything outside the set is written as its
/// first entry.
pub fn write_enum(json: &mut WireNode, name: &str, value: &str, literals: &[&str]) {
    let literal = literals
        .iter()
        .find(|l| **l == value)
        .or_else(|| literals.first());
    if let Some(literal) = literal {
        json.set_attr(name, *literal);
    }
}

pub fn write_ref(json: &mut WireNode, name: &str, id: Option<&ElementId>) {
    if let Some(id) = id {
        json.set_attr(name, id.as_str());
    }
}

/// One `<name xmi:idref="id"/>` child per id.
pub fn write_ref_array<'i>(
    json: &mut WireNode,
    name: &str,
    ids: impl IntoIterator<Item = &'i ElementId>,
) {
    for id in ids {
        json.add_child(name, WireNode::with_attr("xmi:idref", id.as_str()));
    }
}

/// Wrap a non-empty scalar into a value specification with a fresh id.
///
/// `uml:OpaqueExpression` carries the text as `body`, every other kind as
/// `value`.
pub fn write_value_spec(json: &mut WireNode, name: &str, value_type: &str, value: &str) {
    if value.is_empty() {
        return;
    }
    let mut spec = WireNode::with_attr("xmi:id", ElementId::generate().as_str());
    set_type(&mut spec, value_type);
    let payload = if value_type == "uml:OpaqueExpression" { "body" } else { "value" };
    spec.set_attr(payload, value);
    json.set_child(name, spec);
}

/// Guards, conditions and invariants: a `uml:Constraint` whose
/// `specification` attribute holds the text.
pub fn write_constraint(json: &mut WireNode, name: &str, text: &str) {
    if text.is_empty() {
        return;
    }
    let mut constraint = WireNode::with_attr("xmi:id", ElementId::generate().as_str());
    set_type(&mut constraint, "uml:Constraint");
    constraint.set_attr("specification", text);
    json.set_child(name, constraint);
}

// ============================================================================
// SESSION
// ============================================================================

/// State of one export: the repository being written, options, and the
/// placeholder nodes to append after the tree.
pub struct Writer<'a> {
    repository: &'a Repository,
    options: &'a XmiOptions,
    deferred: Vec<WireNode>,
    written: usize,
}

impl<'a> Writer<'a> {
    pub fn new(repository: &'a Repository, options: &'a XmiOptions) -> Self {
        Self {
            repository,
            options,
            deferred: Vec::new(),
            written: 0,
        }
    }

    pub fn repository(&self) -> &'a Repository {
        self.repository
    }

    pub fn options(&self) -> &XmiOptions {
        self.options
    }

    /// Number of element nodes produced so far.
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn deferred(&self) -> &[WireNode] {
        &self.deferred
    }

    pub fn into_deferred(self) -> Vec<WireNode> {
        self.deferred
    }

    /// Queue a node for the end of the document; a node whose `xmi:id` is
    /// already queued is dropped.
    pub fn defer(&mut self, node: WireNode) {
        let Some(id) = node.attr("xmi:id") else {
            return;
        };
        if !self.deferred.iter().any(|n| n.attr("xmi:id") == Some(id)) {
            self.deferred.push(node);
        }
    }

    /// The wire node of one record, or `None` when its type has no wire
    /// form.
    pub fn write_node(&mut self, record: &Record) -> Option<WireNode> {
        let node = uml::write(self, record)?;
        self.written += 1;
        Some(node)
    }

    /// Append the node of `record` under `name`; false when nothing was
    /// written.
    pub fn write_element(&mut self, json: &mut WireNode, name: &str, record: &Record) -> bool {
        match self.write_node(record) {
            Some(node) => {
                json.add_child(name, node);
                true
            }
            None => false,
        }
    }

    pub fn write_element_array<'r>(
        &mut self,
        json: &mut WireNode,
        name: &str,
        records: impl IntoIterator<Item = &'r Record>,
    ) {
        for record in records {
            self.write_element(json, name, record);
        }
    }

    /// Write every record held in the sequence `field` of `record` under
    /// `name`.
    pub fn write_owned(&mut self, json: &mut WireNode, name: &str, record: &Record, field: &str) {
        let repository = self.repository;
        self.write_element_array(json, name, repository.children(record, field));
    }

    /// A `type` that is either a reference or the bare name of a primitive.
    ///
    /// A name gets a `uml:DataType` placeholder with id `<name>_id`, queued
    /// once however many features use it.
    pub fn write_type(&mut self, json: &mut WireNode, name: &str, value: Option<&Value>) {
        match value {
            Some(Value::Reference(id)) => json.set_attr(name, id.as_str()),
            Some(Value::String(type_name)) if !type_name.trim().is_empty() => {
                let id = format!("{type_name}_id");
                let mut placeholder = WireNode::with_attr("xmi:id", id.as_str());
                set_type(&mut placeholder, "uml:DataType");
                placeholder.set_attr("name", type_name.as_str());
                self.defer(placeholder);
                json.set_attr(name, id);
            }
            _ => {}
        }
    }

    /// The node's `xmi:Extension` child, created with this exporter as
    /// `extender` on first use.
    pub fn extension<'n>(&self, json: &'n mut WireNode) -> &'n mut WireNode {
        let slot = json.children.entry("xmi:Extension".to_string()).or_default();
        if slot.is_empty() {
            slot.push(WireNode::with_attr("extender", self.options.exporter.as_str()));
        }
        &mut slot[0]
    }

    /// Set `<key value="..."/>` in the extension block.
    pub fn write_extension(&self, json: &mut WireNode, key: &str, value: &str) {
        self.extension(json).set_child(key, WireNode::with_attr("value", value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::metamodel::literals;
    use rstest::rstest;

    #[test]
    fn test_string_written_only_when_present() {
        let mut json = WireNode::new();
        write_string(&mut json, "name", "");
        write_string(&mut json, "fileName", "a.jar");
        assert_eq!(json.attr("name"), None);
        assert_eq!(json.attr("fileName"), Some("a.jar"));
    }

    #[test]
    fn test_boolean_always_written() {
        let mut json = WireNode::new();
        write_boolean(&mut json, "isAbstract", false);
        write_boolean(&mut json, "isLeaf", true);
        assert_eq!(json.attr("isAbstract"), Some("false"));
        assert_eq!(json.attr("isLeaf"), Some("true"));
    }

    #[rstest]
    #[case("private", "private")]
    #[case("", "public")]
    #[case("friend", "public")]
    fn test_enum_falls_back_to_first_literal(#[case] value: &str, #[case] expected: &str) {
        let mut json = WireNode::new();
        write_enum(&mut json, "visibility", value, literals::VISIBILITY);
        assert_eq!(json.attr("visibility"), Some(expected));
    }

    #[test]
    fn test_value_spec_payload_by_kind() {
        let mut json = WireNode::new();
        write_value_spec(&mut json, "specification", "uml:OpaqueExpression", "x > 0");
        write_value_spec(&mut json, "defaultValue", "uml:LiteralString", "abc");
        write_value_spec(&mut json, "upperValue", "uml:LiteralInteger", "");

        let spec = &json.children("specification")[0];
        assert_eq!(spec.attr("body"), Some("x > 0"));
        assert!(spec.attr("xmi:id").is_some_and(|id| !id.is_empty()));
        assert_eq!(json.children("defaultValue")[0].attr("value"), Some("abc"));
        assert!(json.children("upperValue").is_empty());
    }

    #[test]
    fn test_ref_array_children() {
        let mut json = WireNode::new();
        let ids = [ElementId::from("a"), ElementId::from("b")];
        write_ref_array(&mut json, "memberEnd", &ids);
        let refs: Vec<_> = json
            .children("memberEnd")
            .iter()
            .filter_map(|n| n.attr("xmi:idref"))
            .collect();
        assert_eq!(refs, ["a", "b"]);
    }

    #[test]
    fn test_placeholder_types_deferred_once() {
        let repository = Repository::new();
        let options = XmiOptions::default();
        let mut writer = Writer::new(&repository, &options);
        let mut a = WireNode::new();
        let mut b = WireNode::new();
        writer.write_type(&mut a, "type", Some(&Value::from("String")));
        writer.write_type(&mut b, "type", Some(&Value::from("String")));
        writer.write_type(&mut b, "other", Some(&Value::Reference("t1".into())));

        assert_eq!(a.attr("type"), Some("String_id"));
        assert_eq!(b.attr("other"), Some("t1"));
        assert_eq!(writer.deferred().len(), 1);
        assert_eq!(writer.deferred()[0].attr("xmi:type"), Some("uml:DataType"));
        assert_eq!(writer.deferred()[0].attr("name"), Some("String"));
    }

    #[test]
    fn test_extension_merges_entries() {
        let repository = Repository::new();
        let options = XmiOptions::default().with_exporter("Modeler", "1");
        let writer = Writer::new(&repository, &options);
        let mut json = WireNode::new();
        writer.write_extension(&mut json, "documentation", "doc");
        writer.write_extension(&mut json, "stereotype", "entity");

        let ext = &json.children("xmi:Extension");
        assert_eq!(ext.len(), 1);
        assert_eq!(ext[0].attr("extender"), Some("Modeler"));
        assert_eq!(ext[0].children("documentation")[0].attr("value"), Some("doc"));
        assert_eq!(ext[0].children("stereotype")[0].attr("value"), Some("entity"));
    }
}
