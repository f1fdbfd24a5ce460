//! Notifications emitted by the dispatcher.
//!
//! A [`NotificationSink`] receives every notification synchronously from the
//! dispatch loop. Sinks must not block; [`ChannelSink`] forwards into an
//! unbounded tokio channel for consumers that need to do real work.

use std::sync::Arc;

use herald_core::Update;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::bot::BoxedBot;
use crate::error::CommandError;
use crate::handler::HandlerKind;

/// Name of [`Notification::CommandNotFound`].
pub const COMMAND_NOT_FOUND: &str = "command.not_found";

/// Name of [`Notification::CommandFailed`].
pub const COMMAND_FAILED: &str = "command.failed";

#[derive(Debug, Clone)]
pub enum Notification {
    /// A classifier event such as `update`, `message` or `message.text`.
    Event {
        name: String,
        bot: BoxedBot,
        update: Update,
    },
    /// A command token named no registered command.
    CommandNotFound {
        name: String,
        bot: BoxedBot,
        update: Update,
    },
    /// A resolved command failed to bind or to run.
    CommandFailed {
        name: String,
        handler: HandlerKind,
        error: Arc<CommandError>,
        bot: BoxedBot,
        update: Update,
    },
}

impl Notification {
    /// The event name subscribers match on.
    pub fn name(&self) -> &str {
        match self {
            Self::Event { name, .. } => name,
            Self::CommandNotFound { .. } => COMMAND_NOT_FOUND,
            Self::CommandFailed { .. } => COMMAND_FAILED,
        }
    }

    pub fn update(&self) -> &Update {
        match self {
            Self::Event { update, .. }
            | Self::CommandNotFound { update, .. }
            | Self::CommandFailed { update, .. } => update,
        }
    }

    pub fn bot(&self) -> &BoxedBot {
        match self {
            Self::Event { bot, .. }
            | Self::CommandNotFound { bot, .. }
            | Self::CommandFailed { bot, .. } => bot,
        }
    }
}

/// Receives dispatcher notifications.
pub trait NotificationSink: Send + Sync {
    fn emit(&self, notification: Notification);
}

impl<F> NotificationSink for F
where
    F: Fn(Notification) + Send + Sync,
{
    fn emit(&self, notification: Notification) {
        self(notification)
    }
}

/// Drops every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn emit(&self, _notification: Notification) {}
}

/// Logs notifications with `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn emit(&self, notification: Notification) {
        match &notification {
            Notification::Event { name, bot, update } => {
                debug!(event = %name, bot = bot.name(), update_id = ?update.id(), "Update event");
            }
            Notification::CommandNotFound { name, bot, update } => {
                info!(command = %name, bot = bot.name(), update_id = ?update.id(), "Command not found");
            }
            Notification::CommandFailed {
                name,
                handler,
                error,
                bot,
                update,
            } => {
                error!(
                    command = %name,
                    handler = %handler,
                    bot = bot.name(),
                    update_id = ?update.id(),
                    error = %error,
                    "Command failed"
                );
            }
        }
    }
}

/// Forwards notifications into an unbounded tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelSink {
    /// Creates a sink and the receiver it feeds.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn from_sender(tx: mpsc::UnboundedSender<Notification>) -> Self {
        Self { tx }
    }
}

impl NotificationSink for ChannelSink {
    fn emit(&self, notification: Notification) {
        if self.tx.send(notification).is_err() {
            debug!("Notification receiver dropped");
        }
    }
}

/// Emits every notification to several sinks in order.
#[derive(Clone, Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn NotificationSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: impl NotificationSink + 'static) -> Self {
        self.sinks.push(Arc::new(sink));
        self
    }

    pub fn with_shared(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl NotificationSink for FanoutSink {
    fn emit(&self, notification: Notification) {
        if let Some((last, rest)) = self.sinks.split_last() {
            for sink in rest {
                sink.emit(notification.clone());
            }
            last.emit(notification);
        }
    }
}
