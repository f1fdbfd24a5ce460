use serde::de::DeserializeOwned;

use crate::binder::BoundArguments;
use crate::context::CommandContext;
use crate::error::{ExtractError, ExtractResult};
use crate::extractor::FromCommandContext;

/// Declared arguments converted into a `Deserialize` type.
///
/// Field names match declared argument names. String values are coerced into
/// numbers, booleans and unit enum variants as the target type requires;
/// optional arguments map onto `Option` fields.
///
/// ```rust,ignore
/// #[derive(Deserialize)]
/// struct Remind {
///     minutes: u32,
///     text: Option<String>,
/// }
///
/// // registered with `.try_args(["minutes", "text..."])`
/// async fn remind(Arguments(args): Arguments<Remind>) -> String {
///     format!("I'll remind you in {} minutes", args.minutes)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Arguments<T>(pub T);

impl<T> Arguments<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> std::ops::Deref for Arguments<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: DeserializeOwned> FromCommandContext for Arguments<T> {
    fn from_context(ctx: &CommandContext) -> ExtractResult<Self> {
        ctx.arguments()
            .deserialize()
            .map(Arguments)
            .map_err(|e| ExtractError::custom(e.to_string()))
    }
}

/// The bound arguments, for lookup by name or position.
pub type Args = BoundArguments;

impl FromCommandContext for BoundArguments {
    fn from_context(ctx: &CommandContext) -> ExtractResult<Self> {
        Ok(ctx.arguments().clone())
    }
}

/// Raw words left over after every declared argument was bound.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Excess(pub Vec<String>);

impl FromCommandContext for Excess {
    fn from_context(ctx: &CommandContext) -> ExtractResult<Self> {
        Ok(Excess(ctx.arguments().excess().to_vec()))
    }
}
