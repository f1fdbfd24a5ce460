//! Command extraction from update text.
//!
//! A command token is the marker character, a command name and an optional
//! `@botusername` suffix. When the payload carries entity metadata, the first
//! `bot_command` entity locates the token anywhere in the text; without entity
//! metadata the text itself must start with the marker.
//!
//! Entity offsets are measured in UTF-16 code units and are converted to byte
//! positions before slicing.

use std::ops::Range;

use herald_core::{MessageEntity, ResponseDocument, Update};
use serde::Deserialize;
use tracing::debug;

/// Default command marker.
pub const DEFAULT_MARKER: char = '/';

/// Update types that may carry commands unless configured otherwise.
pub const DEFAULT_COMMAND_UPDATE_TYPES: &[&str] = &["message", "channel_post"];

/// Where in the payload the command was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSource {
    Text,
    Caption,
}

impl TextSource {
    fn keys(self) -> (&'static str, &'static str) {
        match self {
            Self::Text => ("text", "entities"),
            Self::Caption => ("caption", "caption_entities"),
        }
    }
}

/// A recognized command token and its raw arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Command name, without marker or mention.
    pub name: String,
    /// The `@username` suffix, if any.
    pub mention: Option<String>,
    /// Whitespace-separated words following the token.
    pub arguments: Vec<String>,
    /// Raw text following the token, with leading whitespace removed.
    pub remainder: String,
    pub source: TextSource,
}

impl Invocation {
    /// The raw text after the first `skip` arguments, inner whitespace kept.
    pub fn remainder_after(&self, skip: usize) -> &str {
        let mut rest = self.remainder.as_str();
        for _ in 0..skip {
            rest = rest.trim_start();
            let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            rest = &rest[end..];
        }
        rest.trim_start()
    }
}

/// Result of looking for a command in an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// The update type does not carry commands.
    NotApplicable,
    /// The payload has no command token.
    NoCommand,
    /// The token mentions a different bot.
    NotAddressed { name: String, mention: String },
    Command(Invocation),
}

/// Finds command invocations in updates.
#[derive(Debug, Clone)]
pub struct CommandParser {
    marker: char,
    username: Option<String>,
    update_types: Vec<String>,
}

impl Default for CommandParser {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER,
            username: None,
            update_types: DEFAULT_COMMAND_UPDATE_TYPES
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
        }
    }
}

impl CommandParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_marker(mut self, marker: char) -> Self {
        self.marker = marker;
        self
    }

    /// Sets the bot username used to filter `@mentions`.
    ///
    /// Without a username every mention is accepted.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        let username = username.into();
        self.username = Some(username.trim_start_matches('@').to_owned());
        self
    }

    pub fn with_update_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.update_types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn marker(&self) -> char {
        self.marker
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn is_command_bearing(&self, update_type: &str) -> bool {
        self.update_types.iter().any(|t| t == update_type)
    }

    /// Looks for a command in `update`.
    pub fn extract(&self, update: &Update) -> Extraction {
        let Some(update_type) = update.update_type() else {
            return Extraction::NotApplicable;
        };
        if !self.is_command_bearing(update_type) {
            return Extraction::NotApplicable;
        }

        let payload = update.payload();
        let Some(payload) = payload.as_document() else {
            return Extraction::NoCommand;
        };

        for source in [TextSource::Text, TextSource::Caption] {
            let (text_key, entities_key) = source.keys();
            if let Some(text) = payload.value(text_key).and_then(|v| v.as_str()) {
                let entities = read_entities(payload, entities_key);
                return self.parse_text(text, entities.as_deref(), source);
            }
        }
        Extraction::NoCommand
    }

    /// Parses `text` with optional entity metadata.
    ///
    /// `entities` is `None` when the payload has no usable entity list, which
    /// enables leading-marker scanning.
    pub fn parse_text(
        &self,
        text: &str,
        entities: Option<&[MessageEntity]>,
        source: TextSource,
    ) -> Extraction {
        let span = match entities {
            Some(entities) => {
                let Some(entity) = entities.iter().find(|e| e.is_bot_command()) else {
                    return Extraction::NoCommand;
                };
                match utf16_span(text, entity.offset, entity.length) {
                    Some(span) => span,
                    None => {
                        debug!(
                            offset = entity.offset,
                            length = entity.length,
                            "Command entity does not fit the text"
                        );
                        return Extraction::NoCommand;
                    }
                }
            }
            None if text.starts_with(self.marker) => {
                0..text.find(char::is_whitespace).unwrap_or(text.len())
            }
            None => return Extraction::NoCommand,
        };

        let Some(token) = text[span.clone()].strip_prefix(self.marker) else {
            return Extraction::NoCommand;
        };
        let (name, mention) = match token.split_once('@') {
            Some((name, mention)) => (name, Some(mention)),
            None => (token, None),
        };
        if name.is_empty() {
            return Extraction::NoCommand;
        }

        if let (Some(mention), Some(username)) = (mention, self.username.as_deref()) {
            if !mention.eq_ignore_ascii_case(username) {
                return Extraction::NotAddressed {
                    name: name.to_owned(),
                    mention: mention.to_owned(),
                };
            }
        }

        let remainder = text[span.end..].trim_start();
        Extraction::Command(Invocation {
            name: name.to_owned(),
            mention: mention.map(str::to_owned),
            arguments: remainder.split_whitespace().map(str::to_owned).collect(),
            remainder: remainder.to_owned(),
            source,
        })
    }
}

fn read_entities(payload: &ResponseDocument, key: &str) -> Option<Vec<MessageEntity>> {
    let value = payload.value(key)?;
    if value.is_null() {
        return None;
    }
    match Vec::<MessageEntity>::deserialize(value) {
        Ok(entities) => Some(entities),
        Err(err) => {
            debug!(key, error = %err, "Ignoring malformed entity list");
            None
        }
    }
}

/// Converts a UTF-16 `offset`/`length` pair into a byte range of `text`.
///
/// Returns `None` if either end falls outside the text or inside a surrogate
/// pair.
pub fn utf16_span(text: &str, offset: usize, length: usize) -> Option<Range<usize>> {
    let end_units = offset.checked_add(length)?;
    let mut units = 0;
    let mut start = None;

    let boundaries = text
        .char_indices()
        .map(|(idx, ch)| (idx, ch.len_utf16()))
        .chain(std::iter::once((text.len(), 0)));
    for (idx, width) in boundaries {
        if units == offset {
            start = Some(idx);
        }
        if units == end_units {
            return Some(start?..idx);
        }
        if units > end_units {
            return None;
        }
        units += width;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn update(value: serde_json::Value) -> Update {
        Update::from_value(value).unwrap()
    }

    fn invocation(extraction: Extraction) -> Invocation {
        match extraction {
            Extraction::Command(inv) => inv,
            other => panic!("expected a command, got {other:?}"),
        }
    }

    #[test]
    fn test_leading_marker() {
        let parser = CommandParser::new();
        let u = update(json!({"update_id": 1, "message": {"text": "/image"}}));
        let inv = invocation(parser.extract(&u));
        assert_eq!(inv.name, "image");
        assert!(inv.arguments.is_empty());
        assert_eq!(inv.source, TextSource::Text);
    }

    #[test]
    fn test_entity_in_middle_of_text() {
        let parser = CommandParser::new();
        let u = update(json!({
            "update_id": 1,
            "message": {
                "text": "Hey guys check out this /image ",
                "entities": [{"offset": 24, "length": 6, "type": "bot_command"}]
            }
        }));
        let inv = invocation(parser.extract(&u));
        assert_eq!(inv.name, "image");
        assert!(inv.arguments.is_empty());
    }

    #[test]
    fn test_entities_win_over_leading_marker() {
        let parser = CommandParser::new();
        let u = update(json!({
            "update_id": 1,
            "message": {
                "text": "/first then /second x",
                "entities": [{"offset": 12, "length": 7, "type": "bot_command"}]
            }
        }));
        let inv = invocation(parser.extract(&u));
        assert_eq!(inv.name, "second");
        assert_eq!(inv.arguments, ["x"]);

        // Entity metadata without a command entity disables marker scanning.
        let u = update(json!({
            "update_id": 2,
            "message": {
                "text": "/not a command",
                "entities": [{"offset": 0, "length": 4, "type": "bold"}]
            }
        }));
        assert_eq!(parser.extract(&u), Extraction::NoCommand);
    }

    #[test]
    fn test_malformed_entities_fall_back_to_marker() {
        let parser = CommandParser::new();
        let u = update(json!({
            "update_id": 1,
            "message": {"text": "/image cats", "entities": "garbage"}
        }));
        let inv = invocation(parser.extract(&u));
        assert_eq!(inv.name, "image");
        assert_eq!(inv.arguments, ["cats"]);

        let u = update(json!({
            "update_id": 2,
            "message": {"text": "hello", "entities": [{"offset": "x"}]}
        }));
        assert_eq!(parser.extract(&u), Extraction::NoCommand);
    }

    #[test]
    fn test_utf16_offsets() {
        // "😀" is two UTF-16 units and four bytes.
        let text = "😀 hi /go now";
        assert_eq!(utf16_span(text, 6, 3), Some(8..11));
        assert_eq!(&text[8..11], "/go");
        assert_eq!(utf16_span(text, 1, 1), None);
        assert_eq!(utf16_span(text, 0, 100), None);

        let parser = CommandParser::new();
        let entities = [MessageEntity {
            entity_type: "bot_command".into(),
            offset: 6,
            length: 3,
            url: None,
            user: None,
            language: None,
            custom_emoji_id: None,
        }];
        let inv = invocation(parser.parse_text(text, Some(&entities), TextSource::Text));
        assert_eq!(inv.name, "go");
        assert_eq!(inv.arguments, ["now"]);
    }

    #[test]
    fn test_arguments_and_remainder() {
        let parser = CommandParser::new();
        let inv = invocation(parser.parse_text(
            "/say  hello   big world",
            None,
            TextSource::Text,
        ));
        assert_eq!(inv.arguments, ["hello", "big", "world"]);
        assert_eq!(inv.remainder, "hello   big world");
        assert_eq!(inv.remainder_after(1), "big world");
        assert_eq!(inv.remainder_after(3), "");
    }

    #[test]
    fn test_mentions() {
        let parser = CommandParser::new().with_username("@HeraldBot");

        let inv = invocation(parser.parse_text("/start@heraldbot", None, TextSource::Text));
        assert_eq!(inv.name, "start");
        assert_eq!(inv.mention.as_deref(), Some("heraldbot"));

        assert_eq!(
            parser.parse_text("/start@otherbot", None, TextSource::Text),
            Extraction::NotAddressed {
                name: "start".into(),
                mention: "otherbot".into()
            }
        );

        // Without a configured username every mention is accepted.
        let open = CommandParser::new();
        assert!(matches!(
            open.parse_text("/start@otherbot", None, TextSource::Text),
            Extraction::Command(_)
        ));
    }

    #[test]
    fn test_caption_commands() {
        let parser = CommandParser::new();
        let u = update(json!({
            "update_id": 1,
            "message": {"photo": [], "caption": "/tag cats"}
        }));
        let inv = invocation(parser.extract(&u));
        assert_eq!(inv.name, "tag");
        assert_eq!(inv.source, TextSource::Caption);
    }

    #[test]
    fn test_non_command_updates() {
        let parser = CommandParser::new();
        let plain = update(json!({"update_id": 1, "message": {"text": "hello"}}));
        assert_eq!(parser.extract(&plain), Extraction::NoCommand);

        let bare = update(json!({"update_id": 1, "message": {"text": "/"}}));
        assert_eq!(parser.extract(&bare), Extraction::NoCommand);

        let edited = update(json!({"update_id": 1, "edited_message": {"text": "/image"}}));
        assert_eq!(parser.extract(&edited), Extraction::NotApplicable);

        let malformed = update(json!({"update_id": 1}));
        assert_eq!(parser.extract(&malformed), Extraction::NotApplicable);
    }

    #[test]
    fn test_custom_marker_and_types() {
        let parser = CommandParser::new()
            .with_marker('!')
            .with_update_types(["edited_message"]);
        let u = update(json!({"update_id": 1, "edited_message": {"text": "!ping"}}));
        assert_eq!(invocation(parser.extract(&u)).name, "ping");
    }
}
