//! Handler traits and their blanket implementations.
//!
//! Handlers are async functions whose parameters implement
//! [`FromCommandContext`] and whose return value implements
//! [`HandlerResponse`]. Implementations exist for 0-16 parameters.
//!
//! ```rust,ignore
//! // No parameters, no output
//! async fn ping() {}
//!
//! // Declared arguments and a reply
//! async fn echo(args: Args) -> String {
//!     args.get("text").unwrap_or_default().to_owned()
//! }
//!
//! // Failing handlers return `Result`
//! async fn fetch(Arguments(q): Arguments<Query>) -> Result<String, reqwest::Error> {
//!     // ...
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::context::CommandContext;
use crate::extractor::FromCommandContext;
use crate::handler::{HandlerResponse, HandlerResult};

// ============================================================================
// Handler Trait
// ============================================================================

/// A free-standing command handler.
///
/// Every parameter is extracted from the context before the body runs; the
/// first failed extraction fails the invocation.
#[async_trait]
pub trait Handler<T>: Clone + Send + Sync + 'static {
    /// Call the handler with the given context.
    async fn call(self, ctx: Arc<CommandContext>) -> HandlerResult;
}

/// A handler whose first parameter is a receiver of type `S`.
///
/// Receivers are passed as `Arc<S>`, so `async fn run(self: Arc<Self>, ...)`
/// methods can be used directly.
#[async_trait]
pub trait MethodHandler<S, T>: Clone + Send + Sync + 'static {
    /// Call the handler on `receiver` with the given context.
    async fn call(self, receiver: Arc<S>, ctx: Arc<CommandContext>) -> HandlerResult;
}

// ============================================================================
// Implementations for functions (Axum-style)
// ============================================================================

/// Macro to generate handler implementations for functions with different arities.
macro_rules! impl_handler {
    (
        $($ty:ident),*
    ) => {
        #[allow(non_snake_case, unused_variables)]
        #[async_trait]
        impl<F, Fut, Res, $($ty,)*> Handler<($($ty,)*)> for F
        where
            F: FnOnce($($ty,)*) -> Fut + Clone + Send + Sync + 'static,
            Fut: Future<Output = Res> + Send + 'static,
            Res: HandlerResponse + 'static,
            $( $ty: FromCommandContext + Send + 'static, )*
        {
            async fn call(self, ctx: Arc<CommandContext>) -> HandlerResult {
                $(
                    let $ty = $ty::from_context(&ctx)?;
                )*

                (self)($($ty,)*).await.into_output()
            }
        }

        #[allow(non_snake_case, unused_variables)]
        #[async_trait]
        impl<F, Fut, Res, S, $($ty,)*> MethodHandler<S, ($($ty,)*)> for F
        where
            F: FnOnce(Arc<S>, $($ty,)*) -> Fut + Clone + Send + Sync + 'static,
            Fut: Future<Output = Res> + Send + 'static,
            Res: HandlerResponse + 'static,
            S: Send + Sync + 'static,
            $( $ty: FromCommandContext + Send + 'static, )*
        {
            async fn call(self, receiver: Arc<S>, ctx: Arc<CommandContext>) -> HandlerResult {
                $(
                    let $ty = $ty::from_context(&ctx)?;
                )*

                (self)(receiver, $($ty,)*).await.into_output()
            }
        }
    };
}

// Generate implementations for 0-16 parameters
impl_handler!();
impl_handler!(T1);
impl_handler!(T1, T2);
impl_handler!(T1, T2, T3);
impl_handler!(T1, T2, T3, T4);
impl_handler!(T1, T2, T3, T4, T5);
impl_handler!(T1, T2, T3, T4, T5, T6);
impl_handler!(T1, T2, T3, T4, T5, T6, T7);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8, T9);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8, T9, T10);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11, T12);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11, T12, T13);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11, T12, T13, T14);
impl_handler!(
    T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11, T12, T13, T14, T15
);
impl_handler!(
    T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11, T12, T13, T14, T15, T16
);
