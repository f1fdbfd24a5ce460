//! Procedural macros for the Herald bot framework.
//!
//! This crate provides:
//!
//! - `#[command_handlers]` - Turns the `#[command(...)]` methods of an `impl`
//!   block into a `CommandProvider`
//!
//! # Example
//!
//! ```rust,ignore
//! use herald::prelude::*;
//!
//! struct Weather {
//!     api_key: String,
//! }
//!
//! #[command_handlers]
//! impl Weather {
//!     /// Show the forecast for a city
//!     #[command(aliases = ["w"], args = ["city", "days=1"])]
//!     async fn forecast(&self, args: Args) -> String {
//!         format!("sunny in {}", args.get("city").unwrap_or_default())
//!     }
//!
//!     #[command(name = "weather_help", description = "How to use the weather bot")]
//!     async fn help() -> &'static str {
//!         "try /forecast <city>"
//!     }
//! }
//!
//! registry.register_provider(Arc::new(Weather { api_key }))?;
//! ```

mod command;

use proc_macro::TokenStream;
use syn::{ItemImpl, parse_macro_input};

/// Collects `#[command(...)]` methods into a `CommandProvider` implementation.
///
/// # Attributes
///
/// On the `impl` block:
/// - `#[command_handlers(crate = "path")]` - Path of the framework crate
///   (default: `herald::framework`)
///
/// On each method:
/// - `name = "..."` - Command name (default: the method name)
/// - `description = "..."` - Help text (default: the method's doc comment)
/// - `aliases = ["...", ...]` - Alternative names
/// - `args = ["...", ...]` - Declared arguments (`name`, `name?`,
///   `name=default`, `name...`)
///
/// Methods may take `&self`, `self: Arc<Self>` or no receiver; every other
/// parameter must be an extractor. `&self` methods share the registered
/// instance.
#[proc_macro_attribute]
pub fn command_handlers(attr: TokenStream, item: TokenStream) -> TokenStream {
    let options = parse_macro_input!(attr as command::ProviderOptions);
    let item = parse_macro_input!(item as ItemImpl);

    match command::expand(options, item) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
