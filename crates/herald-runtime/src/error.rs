//! Runtime error types.

use herald_core::DocumentError;
use herald_framework::RegistryError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur during runtime operations.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A bot's command selection could not be turned into a registry.
    #[error("Failed to build commands for bot {bot}: {source}")]
    Registry {
        bot: String,
        #[source]
        source: RegistryError,
    },

    /// An inbound payload is not a valid update document.
    #[error("Invalid update document: {0}")]
    Document(#[from] DocumentError),

    /// Bot not found.
    #[error("Bot not found: {0}")]
    BotNotFound(String),

    /// Bot already exists.
    #[error("Bot already exists: {0}")]
    BotExists(String),

    /// No bot was named and no default bot is configured.
    #[error("No bot named and no default bot configured")]
    NoDefaultBot,
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
