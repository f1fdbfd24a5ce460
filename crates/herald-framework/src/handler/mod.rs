//! Handler system for the Herald framework.
//!
//! - **Handler** ([`traits`]) – The [`Handler`] and [`MethodHandler`] traits
//!   that adapt async functions with extractor parameters, similar to Axum's
//!   system
//! - **Response** ([`response`]) – [`HandlerResponse`], which turns handler
//!   return values into an optional JSON output or a failure
//! - **Reference** ([`reference`]) – [`HandlerRef`], the single invocation
//!   capability behind every registered command
//!
//! # Handler variants
//!
//! A command may be backed by:
//!
//! ```rust,ignore
//! // a plain function or closure
//! HandlerRef::callable(echo);
//!
//! // a method on a shared receiver
//! HandlerRef::method(weather.clone(), "forecast", WeatherService::forecast);
//!
//! // a method on a receiver built fresh for every call
//! HandlerRef::constructed::<Counter, _, _>("count", Counter::count);
//! ```

pub mod reference;
pub mod response;
pub mod traits;

pub use reference::{BoxedHandler, HandlerKind, HandlerRef, HandlerResult, into_handler};
pub use response::{HandlerResponse, Json};
pub use traits::{Handler, MethodHandler};
