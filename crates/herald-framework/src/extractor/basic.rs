use std::sync::Arc;

use herald_core::{ResponseDocument, Update};

use crate::bot::BoxedBot;
use crate::command::Command;
use crate::context::CommandContext;
use crate::error::{ExtractError, ExtractResult};
use crate::parse::Invocation;

/// A trait for types that can be extracted from a [`CommandContext`].
///
/// Types implementing this trait can be used directly as handler function
/// parameters.
///
/// # Example
///
/// ```rust,ignore
/// struct ChatId(i64);
///
/// impl FromCommandContext for ChatId {
///     fn from_context(ctx: &CommandContext) -> ExtractResult<Self> {
///         ctx.update()
///             .chat()
///             .get("id")
///             .as_i64()
///             .map(ChatId)
///             .ok_or_else(|| ExtractError::custom("update has no chat"))
///     }
/// }
/// ```
pub trait FromCommandContext: Sized {
    /// Attempts to extract this type from the given context.
    fn from_context(ctx: &CommandContext) -> ExtractResult<Self>;
}

/// Optional parameters never fail; a failed extraction becomes `None`.
impl<T: FromCommandContext> FromCommandContext for Option<T> {
    fn from_context(ctx: &CommandContext) -> ExtractResult<Self> {
        Ok(T::from_context(ctx).ok())
    }
}

impl FromCommandContext for Update {
    fn from_context(ctx: &CommandContext) -> ExtractResult<Self> {
        Ok(ctx.update().clone())
    }
}

impl FromCommandContext for BoxedBot {
    fn from_context(ctx: &CommandContext) -> ExtractResult<Self> {
        Ok(ctx.bot().clone())
    }
}

impl FromCommandContext for Arc<Command> {
    fn from_context(ctx: &CommandContext) -> ExtractResult<Self> {
        Ok(ctx.command().clone())
    }
}

impl FromCommandContext for Invocation {
    fn from_context(ctx: &CommandContext) -> ExtractResult<Self> {
        Ok(ctx.invocation().clone())
    }
}

/// The typed payload document of the update, e.g. the message.
#[derive(Debug, Clone)]
pub struct Payload(pub ResponseDocument);

impl std::ops::Deref for Payload {
    type Target = ResponseDocument;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromCommandContext for Payload {
    fn from_context(ctx: &CommandContext) -> ExtractResult<Self> {
        ctx.update()
            .payload()
            .into_document()
            .map(Payload)
            .ok_or(ExtractError::MissingPayload)
    }
}
