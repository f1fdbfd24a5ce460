//! # Herald Framework
//!
//! Command resolution and execution for Herald bots.
//!
//! This layer provides:
//! - Command definitions, groups and shared libraries, flattened into a
//!   [`CommandRegistry`] at startup
//! - Command extraction from update text ([`CommandParser`])
//! - Positional argument binding ([`binder`]) and Axum-style parameter
//!   extraction ([`extractor`])
//! - The [`CommandDispatcher`], which isolates handler failures and reports
//!   them as [`Notification`]s
//! - Clap-based argument parsing (with the `clap` feature)
//!
//! ```rust,ignore
//! let mut registry = CommandRegistry::new();
//! registry.register(
//!     Command::new("echo", HandlerRef::callable(echo))
//!         .describe("Repeat the given text")
//!         .try_args(["text..."])?,
//! )?;
//!
//! let dispatcher = CommandDispatcher::new(registry).with_sink(TracingSink);
//! let outcome = dispatcher.dispatch(update, bot).await;
//! ```

pub mod binder;
pub mod bot;
pub mod command;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod extractor;
pub mod failure;
pub mod group;
pub mod handler;
pub mod library;
pub mod notification;
pub mod parse;
pub mod provider;
pub mod registry;

pub use binder::{BoundArguments, bind};
pub use bot::{Bot, BotInfo, BoxedBot};
pub use command::{ArgumentSpec, Command};
pub use context::CommandContext;
pub use dispatcher::{CommandDispatcher, DispatchOutcome, DispatchRequest};
pub use error::{BindingError, BoxError, CommandError, ExtractError, ExtractResult, RegistryError};
pub use extractor::{Args, Arguments, BotRef, Excess, FromCommandContext, Payload};
pub use failure::{CommandFailure, FailureDisposition, FailureHook};
pub use group::{CommandGroup, GroupMember};
pub use handler::{
    BoxedHandler, Handler, HandlerKind, HandlerRef, HandlerResponse, HandlerResult, Json,
    MethodHandler, into_handler,
};
pub use library::CommandLibrary;
pub use notification::{
    ChannelSink, FanoutSink, Notification, NotificationSink, NullSink, TracingSink,
};
pub use parse::{CommandParser, Extraction, Invocation, TextSource};
pub use provider::CommandProvider;
pub use registry::CommandRegistry;

#[cfg(feature = "clap")]
pub use extractor::ClapArgs;

pub use futures::future::BoxFuture;
