//! Herald Runtime - configuration, logging and the dispatch loop.
//!
//! This crate provides:
//! - Layered configuration ([`ConfigLoader`], [`HeraldConfig`])
//! - Logging setup ([`LoggingBuilder`], [`logging::init_from_config`])
//! - One dispatcher per configured bot ([`BotsManager`])
//! - The sequential dispatch loop ([`HeraldRuntime`])
//!
//! ```ignore
//! use herald_runtime::{HeraldRuntime, InboundUpdate};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let runtime = HeraldRuntime::builder().library(library).build()?;
//!
//!     let (tx, rx) = tokio::sync::mpsc::channel(64);
//!     spawn_webhook(tx);
//!
//!     let stats = runtime.run_until_signal(rx).await;
//!     println!("handled {} updates", stats.received);
//!     Ok(())
//! }
//! ```

pub mod bots;
pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

pub use bots::{BotsManager, ManagedBot, build_dispatcher};
pub use config::{
    BotConfig, ConfigError, ConfigLoader, ConfigResult, DispatchConfig, HeraldConfig,
    LoggingConfig,
};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::{HeraldRuntime, InboundUpdate, RunStats, RuntimeBuilder, wait_for_shutdown};

pub use tokio_util::sync::CancellationToken;

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Logging macros for handler code.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
