//! # Herald
//!
//! Command dispatch core for chat bots.
//!
//! Herald takes raw update documents from a chat platform, decides whether an
//! update invokes a command, resolves that command to a registered handler,
//! binds the handler's parameters from the untyped update and runs it. A
//! failing handler is reported as a notification and never stops the loop.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌────────────┐   ┌──────────┐   ┌────────┐   ┌─────────┐
//! │  Update  │──▶│ Classifier │──▶│ Registry │──▶│ Binder │──▶│ Handler │
//! │ document │   │  + parser  │   │  lookup  │   │        │   │         │
//! └──────────┘   └────────────┘   └──────────┘   └────────┘   └────┬────┘
//!                                                                  │ error / panic
//!                                                                  ▼
//!                                                         ┌──────────────────┐
//!                                                         │ NotificationSink │
//!                                                         └──────────────────┘
//! ```
//!
//! - **core**: response documents, updates and their classification
//! - **framework**: commands, registries, argument binding, handlers and the dispatcher
//! - **runtime**: configuration, logging, per-bot dispatchers and the dispatch loop
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use herald::prelude::*;
//!
//! async fn echo(args: Args) -> String {
//!     args.get("text").unwrap_or_default().to_owned()
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut library = CommandLibrary::new();
//!     library.share(Command::new("echo", HandlerRef::callable(echo)).try_args(["text..."])?)?;
//!
//!     let runtime = HeraldRuntime::builder().library(library).build()?;
//!     let (tx, rx) = tokio::sync::mpsc::channel(64);
//!     // hand `tx` to the webhook side
//!     runtime.run_until_signal(rx).await;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config` *(default)*: TOML configuration files
//! - `yaml-config`: YAML configuration files
//! - `json-log`: JSON log output
//! - `clap`: the `ClapArgs` extractor

pub use herald_core as core;
pub use herald_framework as framework;
pub use herald_macros::command_handlers;
pub use herald_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use herald::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use herald_runtime::{CancellationToken, HeraldConfig, HeraldRuntime, InboundUpdate};

    // Documents and updates
    pub use herald_core::{Field, ResponseDocument, Update};

    // Commands and their registration
    pub use herald_framework::{
        Command, CommandGroup, CommandLibrary, CommandProvider, CommandRegistry,
    };
    pub use herald_macros::command_handlers;

    // Dispatch
    pub use herald_framework::{CommandDispatcher, DispatchOutcome};

    // Handlers and extractors
    pub use herald_framework::{
        Args, Arguments, BotRef, Excess, FromCommandContext, HandlerRef, Json, Payload,
    };

    // Failures and notifications
    pub use herald_framework::{
        BoxError, CommandError, CommandFailure, FailureDisposition, Notification,
        NotificationSink,
    };

    // Bot handles
    pub use herald_framework::{Bot, BotInfo, BoxedBot};

    #[cfg(feature = "clap")]
    pub use herald_framework::ClapArgs;
}
