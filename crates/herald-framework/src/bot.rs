//! The bot/session handle passed through dispatch.
//!
//! The core never talks to the network; it only carries the handle so that
//! handlers and notification consumers can reach the outbound side.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A bot instance as seen by the dispatch core.
pub trait Bot: Any + Send + Sync {
    /// Configured name of this bot (e.g. the key in the bots configuration).
    fn name(&self) -> &str;

    /// The platform username, used to check `/command@username` mentions.
    fn username(&self) -> Option<&str> {
        None
    }

    /// Upcasts to `Any` so that handlers can recover the concrete type.
    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

/// A shared, type-erased bot handle.
pub type BoxedBot = Arc<dyn Bot>;

impl fmt::Debug for dyn Bot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bot")
            .field("name", &self.name())
            .field("username", &self.username())
            .finish()
    }
}

/// A plain bot handle carrying only identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotInfo {
    name: String,
    username: Option<String>,
}

impl BotInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            username: None,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Wraps this handle for dispatch.
    pub fn boxed(self) -> BoxedBot {
        Arc::new(self)
    }
}

impl Bot for BotInfo {
    fn name(&self) -> &str {
        &self.name
    }

    fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}
