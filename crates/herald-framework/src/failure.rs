//! Per-command failure hooks.

use std::sync::Arc;

use async_trait::async_trait;
use herald_core::Update;

use crate::bot::BoxedBot;
use crate::command::Command;
use crate::error::CommandError;

/// Whether the generic failure notification is still emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureDisposition {
    #[default]
    Notify,
    Suppress,
}

/// A failed command invocation, as seen by its hook.
#[derive(Debug, Clone)]
pub struct CommandFailure {
    pub command: Arc<Command>,
    pub error: Arc<CommandError>,
    pub update: Update,
    pub bot: BoxedBot,
}

/// Runs when a command's binding or handler fails, before the dispatcher
/// emits [`Notification::CommandFailed`](crate::Notification::CommandFailed).
///
/// A hook that panics counts as [`FailureDisposition::Notify`].
#[async_trait]
pub trait FailureHook: Send + Sync {
    async fn on_failure(&self, failure: &CommandFailure) -> FailureDisposition;
}

#[async_trait]
impl<F> FailureHook for F
where
    F: Fn(&CommandFailure) -> FailureDisposition + Send + Sync,
{
    async fn on_failure(&self, failure: &CommandFailure) -> FailureDisposition {
        self(failure)
    }
}
