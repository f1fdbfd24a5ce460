//! Clap-parsed command arguments.
//!
//! The raw text after the command token is split shell-style, so quoted
//! values may contain whitespace, and then handed to [`clap::Parser`].

use clap::Parser;

use crate::context::CommandContext;
use crate::error::{ExtractError, ExtractResult};
use crate::extractor::FromCommandContext;

/// Arguments parsed with clap instead of the positional binder.
///
/// ```rust,ignore
/// #[derive(Parser)]
/// struct Ban {
///     user: String,
///     #[arg(short, long, default_value_t = 60)]
///     minutes: u32,
/// }
///
/// async fn ban(ClapArgs(ban): ClapArgs<Ban>) -> String {
///     format!("banned {} for {}m", ban.user, ban.minutes)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ClapArgs<T: Parser>(pub T);

impl<T: Parser> ClapArgs<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: Parser> std::ops::Deref for ClapArgs<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: Parser> FromCommandContext for ClapArgs<T> {
    fn from_context(ctx: &CommandContext) -> ExtractResult<Self> {
        let invocation = ctx.invocation();
        let argv = std::iter::once(invocation.name.clone()).chain(shell_split(&invocation.remainder));
        T::try_parse_from(argv)
            .map(ClapArgs)
            .map_err(|e| ExtractError::custom(e.render().to_string()))
    }
}

/// Shell-like argument splitting.
///
/// Handles whitespace separation, single and double quotes, and backslash
/// escapes inside double quotes.
pub fn shell_split(input: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_single_quote = false;
    let mut in_double_quote = false;
    let mut escape_next = false;
    let mut quoted = false;

    for ch in input.chars() {
        if escape_next {
            current.push(ch);
            escape_next = false;
            continue;
        }

        match ch {
            '\\' if in_double_quote => escape_next = true,
            '\'' if !in_double_quote => {
                in_single_quote = !in_single_quote;
                quoted = true;
            }
            '"' if !in_single_quote => {
                in_double_quote = !in_double_quote;
                quoted = true;
            }
            c if c.is_whitespace() && !in_single_quote && !in_double_quote => {
                if !current.is_empty() || quoted {
                    args.push(std::mem::take(&mut current));
                }
                quoted = false;
            }
            _ => current.push(ch),
        }
    }

    if !current.is_empty() || quoted {
        args.push(current);
    }

    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_split() {
        assert_eq!(shell_split("a  b\tc"), ["a", "b", "c"]);
        assert_eq!(shell_split(r#"say "hello world" 'x y'"#), ["say", "hello world", "x y"]);
        assert_eq!(shell_split(r#""a \"q\"""#), [r#"a "q""#]);
        assert_eq!(shell_split(r#"empty """#), ["empty", ""]);
        assert!(shell_split("   ").is_empty());
    }
}
