use serde::Serialize;
use serde_json::Value;

use crate::error::{BoxError, CommandError};
use crate::handler::HandlerResult;

/// A trait for handler return values.
///
/// The output of a successful handler is an optional JSON value that the
/// dispatcher hands back to its caller.
pub trait HandlerResponse: Send {
    fn into_output(self) -> HandlerResult;
}

impl HandlerResponse for () {
    fn into_output(self) -> HandlerResult {
        Ok(None)
    }
}

impl HandlerResponse for String {
    fn into_output(self) -> HandlerResult {
        Ok(Some(Value::String(self)))
    }
}

impl HandlerResponse for &'static str {
    fn into_output(self) -> HandlerResult {
        Ok(Some(Value::String(self.to_owned())))
    }
}

/// `Value::Null` counts as no output.
impl HandlerResponse for Value {
    fn into_output(self) -> HandlerResult {
        Ok((!self.is_null()).then_some(self))
    }
}

impl<T: HandlerResponse> HandlerResponse for Option<T> {
    fn into_output(self) -> HandlerResult {
        match self {
            Some(t) => t.into_output(),
            None => Ok(None),
        }
    }
}

/// On `Err`, the command fails and the error travels with the failure
/// notification.
impl<T, E> HandlerResponse for Result<T, E>
where
    T: HandlerResponse,
    E: Into<BoxError> + Send,
{
    fn into_output(self) -> HandlerResult {
        match self {
            Ok(t) => t.into_output(),
            Err(e) => Err(CommandError::handler(e)),
        }
    }
}

/// Serializes any value as the handler output.
#[derive(Debug, Clone)]
pub struct Json<T>(pub T);

impl<T: Serialize + Send> HandlerResponse for Json<T> {
    fn into_output(self) -> HandlerResult {
        serde_json::to_value(self.0)
            .map_err(CommandError::handler)?
            .into_output()
    }
}
