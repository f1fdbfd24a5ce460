use std::sync::Arc;

use crate::command::Command;
use crate::error::RegistryError;

/// A type that declares a set of commands backed by its own methods.
///
/// Usually implemented with the `#[command_handlers]` attribute, which
/// collects every `#[command(...)]` method of an `impl` block. The commands
/// are built once, when the provider is registered.
pub trait CommandProvider: Send + Sync + 'static {
    fn commands(self: Arc<Self>) -> Result<Vec<Command>, RegistryError>;
}
