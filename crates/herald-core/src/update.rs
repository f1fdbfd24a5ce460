//! Inbound updates.

use std::ops::Deref;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::classify;
use crate::document::ResponseDocument;
use crate::error::{DocumentResult, MalformedUpdate};
use crate::field::Field;
use crate::kind::DocumentKind;

/// One inbound event from the chat platform.
///
/// An update is a [`ResponseDocument`] of kind [`DocumentKind::Update`] with
/// an identifier and exactly one content key (`message`, `callback_query`,
/// …). `Deref` exposes the document API directly.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Update {
    document: ResponseDocument,
}

impl Update {
    pub fn new(document: ResponseDocument) -> Self {
        Self {
            document: document.with_kind(DocumentKind::Update),
        }
    }

    /// Decodes an update from JSON text.
    pub fn from_json(raw: &str) -> DocumentResult<Self> {
        ResponseDocument::from_json(raw).map(Self::new)
    }

    /// Wraps an already decoded JSON value.
    pub fn from_value(value: Value) -> DocumentResult<Self> {
        ResponseDocument::try_from(value).map(Self::new)
    }

    pub fn document(&self) -> &ResponseDocument {
        &self.document
    }

    pub fn id(&self) -> Option<i64> {
        self.document.get(classify::UPDATE_ID_KEY).as_i64()
    }

    /// Determines the top-level type, rejecting malformed updates.
    pub fn classify(&self) -> Result<&str, MalformedUpdate> {
        classify::content_key(&self.document)
    }

    /// The top-level type, or `None` for a malformed update.
    pub fn update_type(&self) -> Option<&str> {
        self.classify().ok()
    }

    /// The document under the content key, typed through the update relations.
    pub fn payload(&self) -> Field {
        self.update_type()
            .map(|ty| self.document.typed_get(ty))
            .unwrap_or_default()
    }

    /// The chat the update belongs to.
    ///
    /// Callback queries carry their chat on the originating message.
    pub fn chat(&self) -> Field {
        let payload = self.payload();
        match payload.typed_get("chat") {
            Field::Null => payload.typed_get("message").typed_get("chat"),
            chat => chat,
        }
    }

    /// The sender of the update, when the payload declares one.
    pub fn sender(&self) -> Field {
        match self.payload().typed_get("from") {
            Field::Null => self.payload().typed_get("user"),
            from => from,
        }
    }

    /// The most specific content kind of the payload.
    pub fn payload_subtype(&self) -> Option<&'static str> {
        self.payload()
            .as_document()
            .and_then(classify::payload_subtype)
    }

    /// Event names for subscribers, coarsest first:
    /// `update`, `message`, `message.text`.
    pub fn event_names(&self) -> Vec<String> {
        classify::event_names(self.update_type(), self.payload_subtype())
    }
}

impl Deref for Update {
    type Target = ResponseDocument;

    fn deref(&self) -> &Self::Target {
        &self.document
    }
}

impl From<ResponseDocument> for Update {
    fn from(document: ResponseDocument) -> Self {
        Self::new(document)
    }
}

impl Serialize for Update {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.document.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Update {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        ResponseDocument::deserialize(deserializer).map(Self::new)
    }
}
