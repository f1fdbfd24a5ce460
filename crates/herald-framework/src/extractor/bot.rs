use std::sync::Arc;

use crate::bot::Bot;
use crate::context::CommandContext;
use crate::error::{ExtractError, ExtractResult};
use crate::extractor::FromCommandContext;

/// The bot handle downcast to its concrete type.
///
/// Use `Deref` to reach the bot's own API. Extraction fails when the bot
/// dispatching the update is of a different type.
#[derive(Clone)]
pub struct BotRef<T: Bot>(pub Arc<T>);

impl<T: Bot> std::ops::Deref for BotRef<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: Bot + std::fmt::Debug> std::fmt::Debug for BotRef<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("BotRef").field(&self.0).finish()
    }
}

impl<T: Bot> FromCommandContext for BotRef<T> {
    fn from_context(ctx: &CommandContext) -> ExtractResult<Self> {
        ctx.bot()
            .clone()
            .as_any()
            .downcast::<T>()
            .map(BotRef)
            .map_err(|_| ExtractError::BotTypeMismatch {
                expected: std::any::type_name::<T>(),
            })
    }
}
