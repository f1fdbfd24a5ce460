//! Per-invocation context handed to handlers.

use std::sync::Arc;

use herald_core::Update;

use crate::binder::BoundArguments;
use crate::bot::BoxedBot;
use crate::command::Command;
use crate::parse::Invocation;

/// Everything a handler may extract its parameters from.
///
/// A context is created for one resolved command of one update, after its
/// arguments were bound, and dropped when the handler completes.
#[derive(Debug, Clone)]
pub struct CommandContext {
    update: Update,
    bot: BoxedBot,
    command: Arc<Command>,
    invocation: Invocation,
    arguments: BoundArguments,
}

impl CommandContext {
    pub fn new(
        update: Update,
        bot: BoxedBot,
        command: Arc<Command>,
        invocation: Invocation,
        arguments: BoundArguments,
    ) -> Self {
        Self {
            update,
            bot,
            command,
            invocation,
            arguments,
        }
    }

    pub fn update(&self) -> &Update {
        &self.update
    }

    pub fn bot(&self) -> &BoxedBot {
        &self.bot
    }

    pub fn command(&self) -> &Arc<Command> {
        &self.command
    }

    pub fn invocation(&self) -> &Invocation {
        &self.invocation
    }

    pub fn arguments(&self) -> &BoundArguments {
        &self.arguments
    }
}
