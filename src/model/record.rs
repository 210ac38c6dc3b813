use indexmap::IndexMap;
use std::sync::Arc;

// ============================================================================
// IDs
// ============================================================================

/// Unique identifier for a model element.
///
/// This corresponds to `xmi:id` on the wire and `_id` in normalized records.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub Arc<str>);

impl ElementId {
    /// Create a new element ID.
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// Generate a new UUID-based ID.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string().into())
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ElementId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ElementId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&ElementId> for ElementId {
    fn from(id: &ElementId) -> Self {
        id.clone()
    }
}

// ============================================================================
// VALUES
// ============================================================================

/// A field value of a normalized record.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    String(String),
    /// `{ $ref: id }`, resolved lazily.
    Reference(ElementId),
    /// Sequence of references.
    References(Vec<ElementId>),
    /// A nested record owned by this one.
    Owned(ElementId),
    /// Ordered sequence of nested records.
    OwnedList(Vec<ElementId>),
}

impl Value {
    /// Scalar rendered as text, as used when joining multiplicity bounds.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::String(s) => Some(s.clone()),
            Self::Integer(i) => Some(i.to_string()),
            Self::Boolean(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// The single id carried by a reference or owned value.
    pub fn id(&self) -> Option<&ElementId> {
        match self {
            Self::Reference(id) | Self::Owned(id) => Some(id),
            _ => None,
        }
    }

    /// Ids carried by any reference or owned form.
    pub fn ids(&self) -> &[ElementId] {
        match self {
            Self::Reference(id) | Self::Owned(id) => std::slice::from_ref(id),
            Self::References(ids) | Self::OwnedList(ids) => ids,
            _ => &[],
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

// ============================================================================
// RECORDS
// ============================================================================

/// One normalized model element.
///
/// `type_name` is the target concept (`UMLClass`) or, for wire-only
/// intermediates, a bare metamodel name (`OccurrenceSpecification`). Fields
/// whose key starts with `_` are session-private and never leave the
/// import pipeline.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub id: ElementId,
    pub type_name: String,
    pub parent: Option<ElementId>,
    pub fields: IndexMap<String, Value>,
}

impl Record {
    pub fn new(id: impl Into<ElementId>) -> Self {
        Self {
            id: id.into(),
            type_name: String::new(),
            parent: None,
            fields: IndexMap::new(),
        }
    }

    /// Builder: set the concept type.
    pub fn typed(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = type_name.into();
        self
    }

    /// Builder: set a field.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Builder: set a reference field.
    pub fn with_ref(mut self, key: &str, id: impl Into<ElementId>) -> Self {
        self.set(key, Value::Reference(id.into()));
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.fields.insert(key.to_string(), value.into());
    }

    pub fn set_ref(&mut self, key: &str, id: Option<ElementId>) {
        let value = id.map(Value::Reference).unwrap_or(Value::Null);
        self.fields.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.shift_remove(key)
    }

    /// String field, empty when absent or not a string.
    pub fn str(&self, key: &str) -> &str {
        match self.fields.get(key) {
            Some(Value::String(s)) => s,
            _ => "",
        }
    }

    /// Boolean field, false when absent.
    pub fn bool(&self, key: &str) -> bool {
        matches!(self.fields.get(key), Some(Value::Boolean(true)))
    }

    pub fn int(&self, key: &str) -> Option<i64> {
        match self.fields.get(key) {
            Some(Value::Integer(i)) => Some(*i),
            _ => None,
        }
    }

    /// Id of a single reference or owned field.
    pub fn id_of(&self, key: &str) -> Option<&ElementId> {
        self.fields.get(key).and_then(Value::id)
    }

    /// Ids of a sequence field (owned or referenced).
    pub fn ids(&self, key: &str) -> &[ElementId] {
        self.fields.get(key).map(Value::ids).unwrap_or(&[])
    }

    /// Append one owned child to a sequence field, creating it if needed.
    pub fn add_to(&mut self, key: &str, id: ElementId) {
        match self.fields.get_mut(key) {
            Some(Value::OwnedList(ids)) | Some(Value::References(ids)) => ids.push(id),
            _ => {
                self.fields.insert(key.to_string(), Value::OwnedList(vec![id]));
            }
        }
    }

    /// Append owned children, skipping ids already present.
    pub fn append_to(&mut self, key: &str, ids: impl IntoIterator<Item = ElementId>) {
        let entry = self
            .fields
            .entry(key.to_string())
            .or_insert_with(|| Value::OwnedList(Vec::new()));
        if !matches!(entry, Value::OwnedList(_) | Value::References(_)) {
            *entry = Value::OwnedList(Vec::new());
        }
        if let Value::OwnedList(list) | Value::References(list) = entry {
            for id in ids {
                if !list.contains(&id) {
                    list.push(id);
                }
            }
        }
    }

    /// Remove one id from a sequence field; true if it was present.
    pub fn remove_from(&mut self, key: &str, id: &ElementId) -> bool {
        if let Some(Value::OwnedList(list) | Value::References(list)) = self.fields.get_mut(key) {
            let before = list.len();
            list.retain(|x| x != id);
            return list.len() != before;
        }
        false
    }

    /// Shallow merge: every field of `other` overwrites the same field here.
    pub fn merge(&mut self, other: Record) {
        for (key, value) in other.fields {
            self.fields.insert(key, value);
        }
    }
}
