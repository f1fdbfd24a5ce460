//! The response document model.
//!
//! [`ResponseDocument`] wraps a decoded JSON object and offers two views of
//! the same data:
//!
//! - **map-style**: [`get`](ResponseDocument::get) returns a [`Field`] for any
//!   key, with nested objects wrapped as generic documents;
//! - **typed**: [`typed_get`](ResponseDocument::typed_get) consults the
//!   document's [`DocumentKind`] relations and tags nested documents with their
//!   structural kind, and [`parse`](ResponseDocument::parse) deserializes the
//!   whole document into a serde type.
//!
//! Relation-typed values are materialised on first access and cached on the
//! instance. The underlying data is never mutated.
//!
//! ```rust,ignore
//! let update = ResponseDocument::from_json(raw)?;
//! let sender = update.typed_get("message").typed_get("from");
//! assert_eq!(sender.as_document().map(|d| d.kind()), Some(DocumentKind::User));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::trace;

use crate::error::{DocumentError, DocumentResult};
use crate::field::Field;
use crate::kind::DocumentKind;

/// An immutable, ordered key/value document.
///
/// Cloning is cheap: the data and the relation cache are shared.
#[derive(Clone)]
pub struct ResponseDocument {
    data: Arc<Map<String, Value>>,
    kind: DocumentKind,
    relations: Arc<RwLock<HashMap<String, Field>>>,
}

impl ResponseDocument {
    /// Wraps an object as a generic document.
    pub fn new(data: Map<String, Value>) -> Self {
        Self::with_data(data, DocumentKind::Generic)
    }

    pub(crate) fn with_data(data: Map<String, Value>, kind: DocumentKind) -> Self {
        Self {
            data: Arc::new(data),
            kind,
            relations: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Decodes a JSON object.
    pub fn from_json(raw: &str) -> DocumentResult<Self> {
        let value: Value = serde_json::from_str(raw)?;
        Self::try_from(value)
    }

    /// Returns a view of the same data tagged with another kind.
    ///
    /// The new view starts with an empty relation cache.
    pub fn with_kind(&self, kind: DocumentKind) -> Self {
        Self {
            data: Arc::clone(&self.data),
            kind,
            relations: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    /// Reads a key, wrapping nested objects as generic documents.
    ///
    /// Missing keys yield [`Field::Null`].
    pub fn get(&self, key: &str) -> Field {
        self.data
            .get(key)
            .map(|value| Field::from_value(value, DocumentKind::Generic))
            .unwrap_or_default()
    }

    /// Reads a key through the kind's relation table.
    ///
    /// When `key` relates to another kind and a value is present, the nested
    /// document (or each document in a list) is tagged with that kind and the
    /// result is cached for subsequent calls. Other keys behave like
    /// [`get`](Self::get).
    pub fn typed_get(&self, key: &str) -> Field {
        let Some(relation) = self.kind.relation(key) else {
            return self.get(key);
        };

        if let Some(cached) = self.relations.read().get(key) {
            return cached.clone();
        }

        let Some(value) = self.data.get(key).filter(|v| !v.is_null()) else {
            return Field::Null;
        };

        trace!(kind = %self.kind, key, target = %relation.target, "materialising relation");
        let field = Field::from_value(value, relation.target);
        self.relations
            .write()
            .entry(key.to_owned())
            .or_insert(field)
            .clone()
    }

    /// Borrows the raw value under `key`.
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Keys in the order they were received.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Exports every entry as an ordered list of fields.
    pub fn collect(&self) -> Vec<(String, Field)> {
        self.data
            .iter()
            .map(|(k, v)| (k.clone(), Field::from_value(v, DocumentKind::Generic)))
            .collect()
    }

    /// Borrows the underlying object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn to_value(&self) -> Value {
        Value::Object((*self.data).clone())
    }

    pub fn into_value(self) -> Value {
        Value::Object(Arc::try_unwrap(self.data).unwrap_or_else(|shared| (*shared).clone()))
    }

    /// Deserializes the whole document into a typed view.
    pub fn parse<T: DeserializeOwned>(&self) -> DocumentResult<T> {
        Ok(serde_json::from_value(self.to_value())?)
    }

    /// Returns `true` when both documents share the same underlying data.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.data, &b.data)
    }

    /// Number of relation values materialised so far.
    pub fn cached_relations(&self) -> usize {
        self.relations.read().len()
    }
}

impl Default for ResponseDocument {
    fn default() -> Self {
        Self::new(Map::new())
    }
}

/// Documents are equal when they hold the same entries in the same order.
impl PartialEq for ResponseDocument {
    fn eq(&self, other: &Self) -> bool {
        self.data.len() == other.data.len() && self.data.iter().eq(other.data.iter())
    }
}

impl fmt::Debug for ResponseDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseDocument")
            .field("kind", &self.kind)
            .field("data", &self.data)
            .finish()
    }
}

impl From<Map<String, Value>> for ResponseDocument {
    fn from(data: Map<String, Value>) -> Self {
        Self::new(data)
    }
}

impl TryFrom<Value> for ResponseDocument {
    type Error = DocumentError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self::new(map)),
            other => Err(DocumentError::NotAnObject {
                found: json_type_name(&other),
            }),
        }
    }
}

impl Serialize for ResponseDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.data.as_ref().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ResponseDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Map::<String, Value>::deserialize(deserializer).map(Self::new)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
