//! Error types for the Herald framework.

use thiserror::Error;

/// A boxed error returned by handler bodies.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Registration-time errors.
///
/// These are fatal to startup: a registry that fails to build must not be
/// used for dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A command name or alias is already taken.
    #[error("command name `{name}` is already registered by `{existing}`")]
    DuplicateCommand {
        /// The colliding name or alias.
        name: String,
        /// The command that already owns it.
        existing: String,
    },

    /// Two groups share a name in a library.
    #[error("command group `{0}` is already defined")]
    DuplicateGroup(String),

    /// A command name or alias does not fit the command grammar.
    #[error("invalid command name `{0}`")]
    InvalidName(String),

    /// A command declares its arguments in an unusable order.
    #[error("invalid arguments for command `{command}`: {reason}")]
    InvalidArguments {
        /// The command being registered.
        command: String,
        /// What is wrong with the declaration.
        reason: String,
    },

    /// An argument declaration string could not be parsed.
    #[error("invalid argument declaration `{spec}`: {reason}")]
    InvalidArgumentSpec {
        /// The declaration as written.
        spec: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A group references a shared command or group, but no library was
    /// available to resolve it.
    #[error("group `{group}` references `{reference}`, which needs a command library")]
    UnresolvedReference {
        /// The group holding the reference.
        group: String,
        /// The referenced name.
        reference: String,
    },

    /// A selection names neither a shared command nor a group.
    #[error("unknown command `{0}`")]
    UnknownCommand(String),

    /// A group reference names no known group.
    #[error("unknown command group `{0}`")]
    UnknownGroup(String),

    /// Groups reference each other in a loop.
    #[error("command groups form a cycle: {0}")]
    GroupCycle(String),
}

/// Errors that can occur during handler parameter extraction.
#[derive(Debug, Clone, Error)]
pub enum ExtractError {
    /// The bot handle is not of the expected concrete type.
    #[error("bot type mismatch: expected '{expected}'")]
    BotTypeMismatch {
        /// Expected bot type name.
        expected: &'static str,
    },

    /// The update has no document payload.
    #[error("update has no payload document")]
    MissingPayload,

    /// Custom extraction error.
    #[error("{0}")]
    Custom(String),
}

impl ExtractError {
    /// Creates a custom extraction error.
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }
}

/// Result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Failure to turn raw command arguments into handler parameters.
#[derive(Debug, Clone, Error)]
pub enum BindingError {
    /// A required declared argument has no value.
    #[error("missing required argument `{name}` at position {position}")]
    MissingArgument {
        /// The declared argument name.
        name: String,
        /// Zero-based position in the declaration.
        position: usize,
    },

    /// Bound values could not be converted into the requested type.
    #[error("invalid arguments: {0}")]
    Invalid(String),

    /// A contextual parameter could not be extracted.
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// Why a resolved command did not complete.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Parameters could not be bound.
    #[error("argument binding failed: {0}")]
    Binding(#[from] BindingError),

    /// The handler body returned an error.
    #[error("handler failed: {0}")]
    Handler(#[source] BoxError),

    /// The handler panicked.
    #[error("handler panicked: {0}")]
    Panicked(String),
}

impl CommandError {
    /// Wraps any error returned from a handler body.
    pub fn handler(err: impl Into<BoxError>) -> Self {
        Self::Handler(err.into())
    }

    /// Returns `true` when the failure happened before the handler body ran.
    pub fn is_binding(&self) -> bool {
        matches!(self, Self::Binding(_))
    }
}

impl From<ExtractError> for CommandError {
    fn from(err: ExtractError) -> Self {
        Self::Binding(BindingError::Extract(err))
    }
}
