//! Update classification catalogs.
//!
//! Classification happens at two levels. The top-level type of an update is
//! the single key besides [`UPDATE_ID_KEY`]. Within a message payload, the
//! subtype is the first entry of [`MESSAGE_CONTENT_KINDS`] present in the
//! payload, so the catalog order is the precedence order.

use crate::document::ResponseDocument;
use crate::error::MalformedUpdate;

/// Key carrying the update identifier.
pub const UPDATE_ID_KEY: &str = "update_id";

/// Known message content keys, most specific first.
pub const MESSAGE_CONTENT_KINDS: &[&str] = &[
    "text",
    "audio",
    "animation",
    "dice",
    "document",
    "game",
    "photo",
    "sticker",
    "story",
    "video",
    "voice",
    "video_note",
    "contact",
    "location",
    "venue",
    "poll",
    "new_chat_members",
    "left_chat_member",
    "new_chat_title",
    "new_chat_photo",
    "delete_chat_photo",
    "group_chat_created",
    "supergroup_chat_created",
    "channel_chat_created",
    "message_auto_delete_timer_changed",
    "migrate_to_chat_id",
    "migrate_from_chat_id",
    "pinned_message",
    "invoice",
    "successful_payment",
    "users_shared",
    "chat_shared",
    "connected_website",
    "write_access_allowed",
    "passport_data",
    "proximity_alert_triggered",
    "forum_topic_created",
    "forum_topic_edited",
    "forum_topic_closed",
    "forum_topic_reopened",
    "general_forum_topic_hidden",
    "general_forum_topic_unhidden",
    "giveaway_created",
    "giveaway",
    "giveaway_winners",
    "giveaway_completed",
    "video_chat_scheduled",
    "video_chat_started",
    "video_chat_ended",
    "video_chat_participants_invited",
    "web_app_data",
];

/// Root event name every update produces.
pub const UPDATE_EVENT: &str = "update";

/// Finds the top-level content key of an update document.
pub fn content_key(update: &ResponseDocument) -> Result<&str, MalformedUpdate> {
    let mut keys = update.keys().filter(|k| *k != UPDATE_ID_KEY);
    let Some(first) = keys.next() else {
        return Err(MalformedUpdate::MissingContent);
    };

    let rest: Vec<&str> = keys.collect();
    if rest.is_empty() {
        Ok(first)
    } else {
        Err(MalformedUpdate::AmbiguousContent {
            keys: std::iter::once(first)
                .chain(rest)
                .map(str::to_owned)
                .collect(),
        })
    }
}

/// Returns the first catalog entry present in `payload`.
///
/// Keys holding `null` do not count as present.
pub fn payload_subtype(payload: &ResponseDocument) -> Option<&'static str> {
    MESSAGE_CONTENT_KINDS
        .iter()
        .copied()
        .find(|kind| payload.value(kind).is_some_and(|v| !v.is_null()))
}

/// Builds the event names for a type and optional subtype, coarsest first.
pub fn event_names(update_type: Option<&str>, subtype: Option<&str>) -> Vec<String> {
    let mut names = vec![UPDATE_EVENT.to_owned()];
    if let Some(ty) = update_type {
        names.push(ty.to_owned());
        if let Some(sub) = subtype {
            names.push(format!("{ty}.{sub}"));
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> ResponseDocument {
        ResponseDocument::try_from(value).unwrap()
    }

    #[test]
    fn test_single_content_key() {
        let update = doc(json!({"update_id": 1, "callback_query": {"id": "x"}}));
        assert_eq!(content_key(&update), Ok("callback_query"));
    }

    #[test]
    fn test_missing_content() {
        let update = doc(json!({"update_id": 1}));
        assert_eq!(content_key(&update), Err(MalformedUpdate::MissingContent));
    }

    #[test]
    fn test_ambiguous_content() {
        let update = doc(json!({"update_id": 1, "message": {}, "poll": {}}));
        assert_eq!(
            content_key(&update),
            Err(MalformedUpdate::AmbiguousContent {
                keys: vec!["message".into(), "poll".into()]
            })
        );
    }

    #[test]
    fn test_catalog_order_decides_subtype() {
        // `caption` is not a content kind; `photo` wins. `text` precedes `photo`.
        let payload = doc(json!({"caption": "look", "photo": [{"file_id": "a"}]}));
        assert_eq!(payload_subtype(&payload), Some("photo"));

        let payload = doc(json!({"photo": [], "text": "both"}));
        assert_eq!(payload_subtype(&payload), Some("text"));
    }

    #[test]
    fn test_unknown_payload_has_no_subtype() {
        let payload = doc(json!({"id": "cb", "data": "x"}));
        assert_eq!(payload_subtype(&payload), None);
    }

    #[test]
    fn test_event_names() {
        assert_eq!(
            event_names(Some("message"), Some("photo")),
            vec!["update", "message", "message.photo"]
        );
        assert_eq!(event_names(Some("poll"), None), vec!["update", "poll"]);
        assert_eq!(event_names(None, Some("text")), vec!["update"]);
    }

    #[test]
    fn test_catalog_has_no_duplicates() {
        let mut sorted = MESSAGE_CONTENT_KINDS.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), MESSAGE_CONTENT_KINDS.len());
    }
}
