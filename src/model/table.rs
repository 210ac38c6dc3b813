use indexmap::IndexMap;
use serde_json::{Map, Value as Json, json};
use std::collections::HashSet;

use super::{ElementId, Record, Value};

/// Id → record table for one conversion session.
///
/// Readers register every record they produce here; postprocessors look
/// records up by id and mutate them in place. Nothing is shared between
/// sessions.
#[derive(Debug, Clone, Default)]
pub struct IdTable {
    records: IndexMap<ElementId, Record>,
}

impl IdTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &ElementId) -> Option<&Record> {
        self.records.get(id)
    }

    pub fn get_mut(&mut self, id: &ElementId) -> Option<&mut Record> {
        self.records.get_mut(id)
    }

    pub fn contains(&self, id: &ElementId) -> bool {
        self.records.contains_key(id)
    }

    /// Insert or replace a record under its own id.
    pub fn put(&mut self, record: Record) {
        self.records.insert(record.id.clone(), record);
    }

    pub fn remove(&mut self, id: &ElementId) -> Option<Record> {
        self.records.shift_remove(id)
    }

    /// Snapshot of the current ids, in insertion order.
    pub fn ids(&self) -> Vec<ElementId> {
        self.records.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    /// Type tag of a record, if present.
    pub fn type_of(&self, id: &ElementId) -> Option<&str> {
        self.records.get(id).map(|r| r.type_name.as_str())
    }

    /// Resolve a single reference or owned field of a record.
    pub fn resolve(&self, record: &Record, key: &str) -> Option<&Record> {
        record.id_of(key).and_then(|id| self.records.get(id))
    }

    /// Emit the normalized JSON tree rooted at `id`.
    ///
    /// Owned fields nest, reference fields become `{"$ref": id}`, private
    /// `_`-prefixed fields are dropped. Owned ids missing from the table are
    /// skipped.
    pub fn to_json(&self, id: &ElementId) -> Option<Json> {
        let mut path = HashSet::new();
        self.emit(id, &mut path)
    }

    fn emit(&self, id: &ElementId, path: &mut HashSet<ElementId>) -> Option<Json> {
        let record = self.records.get(id)?;
        if !path.insert(id.clone()) {
            // A record reachable from itself is emitted as a reference
            return Some(json!({ "$ref": id.as_str() }));
        }

        let mut object = Map::new();
        object.insert("_id".to_string(), json!(record.id.as_str()));
        object.insert("_type".to_string(), json!(record.type_name));
        if let Some(parent) = &record.parent {
            object.insert("_parent".to_string(), json!({ "$ref": parent.as_str() }));
        }
        for (key, value) in &record.fields {
            if key.starts_with('_') {
                continue;
            }
            let json = match value {
                Value::Null => Json::Null,
                Value::Boolean(b) => json!(b),
                Value::Integer(i) => json!(i),
                Value::String(s) => json!(s),
                Value::Reference(target) => json!({ "$ref": target.as_str() }),
                Value::References(targets) => Json::Array(
                    targets
                        .iter()
                        .map(|t| json!({ "$ref": t.as_str() }))
                        .collect(),
                ),
                Value::Owned(child) => match self.emit(child, path) {
                    Some(json) => json,
                    None => continue,
                },
                Value::OwnedList(children) => Json::Array(
                    children
                        .iter()
                        .filter_map(|c| self.emit(c, path))
                        .collect(),
                ),
            };
            object.insert(key.clone(), json);
        }

        path.remove(id);
        Some(Json::Object(object))
    }
}
