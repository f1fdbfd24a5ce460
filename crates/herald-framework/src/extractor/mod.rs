//! Extractor system for handler parameters.
//!
//! Handler functions declare what they need as parameters, and each parameter
//! type implements [`FromCommandContext`]. The dispatcher extracts every
//! parameter before the handler body runs.
//!
//! ```rust,ignore
//! #[derive(Deserialize)]
//! struct Convert {
//!     amount: f64,
//!     currency: Option<String>,
//! }
//!
//! async fn convert(args: Arguments<Convert>, bot: BoxedBot) -> String {
//!     format!("{} {}", args.amount, args.currency.as_deref().unwrap_or("USD"))
//! }
//! ```
//!
//! # Error Handling
//!
//! A failing extractor fails the invocation with a binding error, reported the
//! same way as an error returned by the handler. Parameters wrapped in
//! [`Option<T>`] never fail.

pub mod arguments;
pub mod basic;
pub mod bot;
#[cfg(feature = "clap")]
pub mod clap_args;

pub use arguments::{Args, Arguments, Excess};
pub use basic::{FromCommandContext, Payload};
pub use bot::BotRef;
#[cfg(feature = "clap")]
pub use clap_args::ClapArgs;
