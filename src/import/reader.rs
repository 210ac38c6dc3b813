//! Reader session and attribute/child accessors.
//!
//! The plain accessors (`read_string`, `read_boolean`, ...) never fail:
//! absence yields the default. The session methods additionally dispatch
//! nested elements through the registry and register what they produce in
//! the session's [`IdTable`].

use std::collections::HashMap;

use crate::model::{ElementId, IdTable, Record, Value};
use crate::options::XmiOptions;
use crate::xml::XmlNode;

use super::registry::ReaderRegistry;

/// What a concept reader produces for one node.
#[derive(Debug, Clone, PartialEq)]
pub enum Read {
    /// An element record; the caller stamps `_parent` and registers it.
    Record(Record),
    /// A scalar, from value specifications such as `uml:LiteralInteger`.
    Value(Value),
}

/// A concept reader as stored in the registry.
pub type ReadFn = fn(&mut Reader<'_>, &XmlNode) -> Option<Read>;

// ============================================================================
// ATTRIBUTE ACCESSORS
// ============================================================================

pub fn read_opt_string(node: &XmlNode, name: &str) -> Option<String> {
    node.attr(name).map(str::to_string)
}

pub fn read_string(node: &XmlNode, name: &str, default: &str) -> String {
    node.attr(name).unwrap_or(default).to_string()
}

/// `"true"` in any case is true; any other present value is false.
pub fn read_boolean(node: &XmlNode, name: &str, default: bool) -> bool {
    match node.attr(name) {
        Some(value) => value.eq_ignore_ascii_case("true"),
        None => default,
    }
}

pub fn read_integer(node: &XmlNode, name: &str, default: i64) -> i64 {
    node.attr(name)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// A reference given as `name="id"` or as `<name xmi:idref="id"/>`.
///
/// The attribute form wins when both are present.
pub fn read_ref(node: &XmlNode, name: &str) -> Option<ElementId> {
    if let Some(value) = node.attr(name) {
        return Some(ElementId::from(value));
    }
    node.child(name)
        .and_then(|c| c.attr("xmi:idref"))
        .map(ElementId::from)
}

/// All references named `name`: whitespace separated ids in the attribute
/// form followed by every `<name xmi:idref="id"/>` child.
pub fn read_ref_array(node: &XmlNode, name: &str) -> Vec<ElementId> {
    let mut refs: Vec<ElementId> = node
        .attr(name)
        .map(|v| v.split_whitespace().map(ElementId::from).collect())
        .unwrap_or_default();
    refs.extend(
        node.children_named(name)
            .filter_map(|c| c.attr("xmi:idref"))
            .map(ElementId::from),
    );
    refs
}

// ============================================================================
// SESSION
// ============================================================================

/// State of one import: registry, options and the id table being filled.
pub struct Reader<'a> {
    registry: &'a ReaderRegistry,
    options: &'a XmiOptions,
    pub table: IdTable,
    generated: HashMap<usize, ElementId>,
}

impl<'a> Reader<'a> {
    pub fn new(registry: &'a ReaderRegistry, options: &'a XmiOptions) -> Self {
        Self {
            registry,
            options,
            table: IdTable::new(),
            generated: HashMap::new(),
        }
    }

    pub fn options(&self) -> &XmiOptions {
        self.options
    }

    pub fn into_table(self) -> IdTable {
        self.table
    }

    /// The node's `xmi:id`, or an id generated once per node and reused.
    pub fn id_of(&mut self, node: &XmlNode) -> ElementId {
        if let Some(id) = node.attr("xmi:id") {
            return ElementId::from(id);
        }
        self.generated
            .entry(node.index)
            .or_insert_with(ElementId::generate)
            .clone()
    }

    /// Look an attribute literal up in a registered enumeration.
    pub fn read_enum(
        &self,
        node: &XmlNode,
        name: &str,
        enum_name: &str,
        default: Option<&str>,
    ) -> Option<String> {
        node.attr(name)
            .and_then(|literal| self.registry.enum_value(enum_name, literal))
            .or(default)
            .map(str::to_string)
    }

    /// Dispatch `node` as `type_name` without registering the result.
    pub fn dispatch(&mut self, node: &XmlNode, type_name: &str) -> Option<Read> {
        match self.registry.element(type_name) {
            Some(read) => read(self, node),
            None => {
                tracing::trace!(type_name, tag = %node.name, "no reader registered, skipping");
                None
            }
        }
    }

    /// Stamp the parent and register a produced record.
    pub fn adopt(&mut self, mut record: Record, parent: &ElementId) -> ElementId {
        record.parent = Some(parent.clone());
        let id = record.id.clone();
        self.table.put(record);
        id
    }

    /// First child named `name` whose `xmi:type` yields a value.
    ///
    /// Records come back as [`Value::Owned`]; value specifications as the
    /// scalar they denote. `uml:LiteralNull` yields nothing.
    pub fn read_element(&mut self, node: &XmlNode, name: &str) -> Option<Value> {
        let parent = self.id_of(node);
        for child in node.children_named(name) {
            let Some(type_name) = child.attr("xmi:type") else {
                continue;
            };
            match self.dispatch(child, type_name) {
                Some(Read::Record(record)) => {
                    return Some(Value::Owned(self.adopt(record, &parent)));
                }
                Some(Read::Value(value)) if !value.is_null() => return Some(value),
                _ => {}
            }
        }
        None
    }

    /// Every child named `name` that reads as a record, in document order.
    ///
    /// Children without `xmi:type` are read as `default_type`.
    pub fn read_element_array(
        &mut self,
        node: &XmlNode,
        name: &str,
        default_type: Option<&str>,
    ) -> Vec<ElementId> {
        let parent = self.id_of(node);
        let mut ids = Vec::new();
        for child in node.children_named(name) {
            let Some(type_name) = child.attr("xmi:type").or(default_type) else {
                continue;
            };
            if let Some(Read::Record(record)) = self.dispatch(child, type_name) {
                ids.push(self.adopt(record, &parent));
            }
        }
        ids
    }

    /// Read a top-level node, dispatched by its tag name.
    pub fn read_top_level(&mut self, node: &XmlNode) -> Option<ElementId> {
        let name = node.name.clone();
        match self.dispatch(node, &name)? {
            Read::Record(record) => {
                let id = record.id.clone();
                self.table.put(record);
                Some(id)
            }
            Read::Value(_) => None,
        }
    }

    /// Text of a guard or condition written as a constraint: its
    /// `specification` attribute, the body/value of its nested
    /// specification, or the child itself read as a value specification.
    pub fn read_constraint_text(&mut self, node: &XmlNode, name: &str) -> Option<String> {
        let constraint = node.child(name)?;
        if let Some(text) = constraint.attr("specification") {
            return Some(text.to_string());
        }
        if constraint.child("specification").is_some() {
            return self.read_element(constraint, "specification").and_then(|v| v.as_text());
        }
        self.read_element(node, name).and_then(|v| v.as_text())
    }
}
