//! Typed views over common documents.
//!
//! These are deserialized on demand with
//! [`ResponseDocument::parse`](crate::ResponseDocument::parse); the document
//! itself stays the source of truth.

use serde::{Deserialize, Serialize};

/// A user or bot account.
///
/// See also: <https://core.telegram.org/bots/api#user>.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    #[serde(default)]
    pub is_bot: bool,

    #[serde(default)]
    pub first_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
}

/// A private chat, group, supergroup or channel.
///
/// See also: <https://core.telegram.org/bots/api#chat>.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,

    #[serde(rename = "type", default)]
    pub chat_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// A special span inside message text: commands, mentions, links, …
///
/// `offset` and `length` are measured in UTF-16 code units.
///
/// See also: <https://core.telegram.org/bots/api#messageentity>.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageEntity {
    #[serde(rename = "type")]
    pub entity_type: String,

    pub offset: usize,

    pub length: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_emoji_id: Option<String>,
}

impl MessageEntity {
    /// Entity type the platform uses for `/command` spans.
    pub const BOT_COMMAND: &'static str = "bot_command";

    pub fn is_bot_command(&self) -> bool {
        self.entity_type == Self::BOT_COMMAND
    }
}
