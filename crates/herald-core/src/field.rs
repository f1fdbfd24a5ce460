//! The value type returned by document access.

use serde_json::Value;

use crate::document::ResponseDocument;
use crate::kind::DocumentKind;

/// One value read out of a [`ResponseDocument`].
///
/// Missing keys and JSON `null` both read as [`Field::Null`], and navigating
/// into anything that is not a document yields `Null` again, so chains like
/// `update.get("message").get("chat").get("id")` never fail.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Field {
    /// Absent key or explicit `null`.
    #[default]
    Null,
    /// A string, number or boolean.
    Scalar(Value),
    /// A nested document.
    Document(ResponseDocument),
    /// An ordered sequence.
    List(Vec<Field>),
}

impl Field {
    /// Wraps a raw value, tagging every nested object with `kind`.
    pub(crate) fn from_value(value: &Value, kind: DocumentKind) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Object(map) => Self::Document(ResponseDocument::with_data(map.clone(), kind)),
            Value::Array(items) => {
                Self::List(items.iter().map(|v| Self::from_value(v, kind)).collect())
            }
            scalar => Self::Scalar(scalar.clone()),
        }
    }

    /// Continues navigation into a nested document.
    pub fn get(&self, key: &str) -> Field {
        match self {
            Self::Document(doc) => doc.get(key),
            _ => Self::Null,
        }
    }

    /// Continues relation-aware navigation into a nested document.
    pub fn typed_get(&self, key: &str) -> Field {
        match self {
            Self::Document(doc) => doc.typed_get(key),
            _ => Self::Null,
        }
    }

    /// Returns the element at `index` of a list.
    pub fn at(&self, index: usize) -> Field {
        match self {
            Self::List(items) => items.get(index).cloned().unwrap_or_default(),
            _ => Self::Null,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(v) => v.as_str(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Scalar(v) => v.as_i64(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Scalar(v) => v.as_u64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Scalar(v) => v.as_f64(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Scalar(v) => v.as_bool(),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&ResponseDocument> {
        match self {
            Self::Document(doc) => Some(doc),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Field]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Consumes the field, returning the nested document if there is one.
    pub fn into_document(self) -> Option<ResponseDocument> {
        match self {
            Self::Document(doc) => Some(doc),
            _ => None,
        }
    }

    /// Converts the field back into raw JSON.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Scalar(v) => v.clone(),
            Self::Document(doc) => doc.to_value(),
            Self::List(items) => Value::Array(items.iter().map(Self::to_value).collect()),
        }
    }
}

impl From<ResponseDocument> for Field {
    fn from(doc: ResponseDocument) -> Self {
        Self::Document(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_navigation_through_scalars_is_null() {
        let field = Field::Scalar(json!("text"));
        assert!(field.get("anything").is_null());
        assert!(field.at(0).is_null());
    }

    #[test]
    fn test_list_indexing() {
        let field = Field::from_value(&json!([{"a": 1}, 2]), DocumentKind::Generic);
        assert_eq!(field.at(0).get("a").as_i64(), Some(1));
        assert_eq!(field.at(1).as_i64(), Some(2));
        assert!(field.at(2).is_null());
    }

    #[test]
    fn test_json_null_reads_as_null() {
        assert!(Field::from_value(&Value::Null, DocumentKind::Generic).is_null());
    }
}
