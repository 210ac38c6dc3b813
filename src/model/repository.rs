//! In-memory model graph.
//!
//! [`Repository`] is the live model the export pipeline reads from and the
//! default [`Materializer`] the import pipeline hands its normalized tree to.

use serde_json::Value as Json;

use super::metamodel::{self, ElementKind};
use super::{ElementId, IdTable, Record, Value};
use crate::error::{Result, XmiError};

/// Consumer of a normalized JSON tree produced by an import.
///
/// Implementations must either take the whole tree or nothing.
pub trait Materializer {
    /// Insert the tree and return the id of its root.
    fn materialize(&mut self, tree: &Json) -> Result<ElementId>;
}

/// An in-memory model: every element by id plus the ordered top-level list.
#[derive(Debug, Clone, Default)]
pub struct Repository {
    elements: IdTable,
    roots: Vec<ElementId>,
}

impl Repository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of elements, at any depth.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Insert a record without attaching it anywhere.
    pub fn insert(&mut self, record: Record) -> ElementId {
        let id = record.id.clone();
        self.elements.put(record);
        id
    }

    /// Insert a top-level element.
    pub fn add_root(&mut self, record: Record) -> ElementId {
        let id = self.insert(record);
        if !self.roots.contains(&id) {
            self.roots.push(id.clone());
        }
        id
    }

    /// Insert `record` as an owned child of `parent` under `field`.
    ///
    /// Returns `None` if the parent does not exist.
    pub fn add_child(
        &mut self,
        parent: &ElementId,
        field: &str,
        mut record: Record,
    ) -> Option<ElementId> {
        let owner = self.elements.get_mut(parent)?;
        owner.add_to(field, record.id.clone());
        record.parent = Some(parent.clone());
        Some(self.insert(record))
    }

    pub fn get(&self, id: &ElementId) -> Option<&Record> {
        self.elements.get(id)
    }

    pub fn get_mut(&mut self, id: &ElementId) -> Option<&mut Record> {
        self.elements.get_mut(id)
    }

    pub fn root_ids(&self) -> &[ElementId] {
        &self.roots
    }

    pub fn roots(&self) -> impl Iterator<Item = &Record> {
        self.roots.iter().filter_map(|id| self.elements.get(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.elements.iter()
    }

    /// Resolve a single reference or owned field.
    pub fn resolve(&self, record: &Record, field: &str) -> Option<&Record> {
        self.elements.resolve(record, field)
    }

    /// Resolve every id of a sequence field, skipping dangling ones.
    pub fn children(&self, record: &Record, field: &str) -> Vec<&Record> {
        record
            .ids(field)
            .iter()
            .filter_map(|id| self.elements.get(id))
            .collect()
    }

    /// Relationships that have `id` as one of their ends and pass `filter`.
    ///
    /// Directed relationships match on `source`/`target`, undirected ones on
    /// the `reference` of `end1`/`end2`.
    pub fn relationships_of<F>(&self, id: &ElementId, filter: F) -> Vec<&Record>
    where
        F: Fn(&Record) -> bool,
    {
        self.elements
            .iter()
            .filter(|r| metamodel::is_kind_of(&r.type_name, ElementKind::Relationship))
            .filter(|r| {
                r.id_of("source") == Some(id)
                    || r.id_of("target") == Some(id)
                    || ["end1", "end2"].iter().any(|end| {
                        self.resolve(r, end).and_then(|e| e.id_of("reference")) == Some(id)
                    })
            })
            .filter(|r| filter(r))
            .collect()
    }

    /// First element with the given name, in insertion order.
    pub fn find_by_name(&self, name: &str) -> Option<&Record> {
        self.elements.iter().find(|r| r.str("name") == name)
    }

    /// First element of the given type with the given name.
    pub fn find(&self, type_name: &str, name: &str) -> Option<&Record> {
        self.elements
            .iter()
            .find(|r| r.type_name == type_name && r.str("name") == name)
    }

    /// Normalized JSON tree of one element and everything it owns.
    pub fn to_json(&self, id: &ElementId) -> Option<Json> {
        self.elements.to_json(id)
    }
}

impl Materializer for Repository {
    fn materialize(&mut self, tree: &Json) -> Result<ElementId> {
        let mut staged = Vec::new();
        let root = stage(tree, None, &mut staged)?
            .ok_or_else(|| XmiError::invalid_record("root has no known concept type"))?;
        tracing::debug!(root = %root, records = staged.len(), "materializing tree");
        for record in staged {
            self.elements.put(record);
        }
        self.roots.push(root.clone());
        Ok(root)
    }
}

/// Convert one JSON node (and its owned subtree) into records.
///
/// Nodes with a type the metamodel does not know are dropped with their
/// subtree; structural violations fail the whole tree.
fn stage(
    node: &Json,
    parent: Option<&ElementId>,
    out: &mut Vec<Record>,
) -> Result<Option<ElementId>> {
    let object = node
        .as_object()
        .ok_or_else(|| XmiError::invalid_record("tree node is not an object"))?;
    let id = object
        .get("_id")
        .and_then(Json::as_str)
        .ok_or_else(|| XmiError::invalid_record("tree node without string _id"))?;
    let type_name = object
        .get("_type")
        .and_then(Json::as_str)
        .ok_or_else(|| XmiError::invalid_record(format!("node {id} without string _type")))?;

    if !metamodel::is_concrete(type_name) {
        tracing::warn!(id, type_name, "dropping node of unknown concept type");
        return Ok(None);
    }

    let id = ElementId::from(id);
    let mut record = Record::new(id.clone()).typed(type_name);
    record.parent = parent.cloned().or_else(|| {
        object
            .get("_parent")
            .and_then(|p| p.get("$ref"))
            .and_then(Json::as_str)
            .map(ElementId::from)
    });

    for (key, value) in object {
        if matches!(key.as_str(), "_id" | "_type" | "_parent") {
            continue;
        }
        let value = stage_value(key, value, &id, out)?;
        record.fields.insert(key.clone(), value);
    }
    out.push(record);
    Ok(Some(id))
}

fn stage_value(key: &str, value: &Json, owner: &ElementId, out: &mut Vec<Record>) -> Result<Value> {
    Ok(match value {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Boolean(*b),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => Value::String(n.to_string()),
        },
        Json::String(s) => Value::String(s.clone()),
        Json::Object(object) => {
            if let Some(target) = object.get("$ref").and_then(Json::as_str) {
                Value::Reference(target.into())
            } else if object.contains_key("_id") {
                match stage(value, Some(owner), out)? {
                    Some(child) => Value::Owned(child),
                    None => Value::Null,
                }
            } else {
                return Err(XmiError::invalid_record(format!(
                    "field {key} of {owner} is neither a record nor a reference"
                )));
            }
        }
        Json::Array(items) => {
            let all_refs = !items.is_empty()
                && items
                    .iter()
                    .all(|i| i.get("$ref").and_then(Json::as_str).is_some());
            if all_refs {
                Value::References(
                    items
                        .iter()
                        .filter_map(|i| i.get("$ref").and_then(Json::as_str))
                        .map(ElementId::from)
                        .collect(),
                )
            } else {
                let mut children = Vec::new();
                for item in items {
                    if let Some(child) = stage(item, Some(owner), out)? {
                        children.push(child);
                    }
                }
                Value::OwnedList(children)
            }
        }
    })
}
