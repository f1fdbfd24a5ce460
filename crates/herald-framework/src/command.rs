//! Command definitions.
//!
//! A [`Command`] is a named unit of work bound to a handler. It is reachable
//! by its name and by each of its aliases, and declares the positional
//! arguments it expects:
//!
//! ```rust,ignore
//! let convert = Command::new("convert", HandlerRef::callable(convert))
//!     .describe("Convert an amount between currencies")
//!     .alias("cv")
//!     .try_args(["amount", "from=USD", "to?"])?;
//! ```

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::RegistryError;
use crate::failure::FailureHook;
use crate::handler::HandlerRef;

/// Returns `true` if `name` can be used as a command name or alias.
///
/// Names are non-empty and made of alphanumerics, `_` and `-`, which keeps
/// them free of whitespace, the `@` mention separator and marker characters.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}

/// One declared positional argument.
///
/// The declaration syntax accepted by [`FromStr`] is:
///
/// | Syntax          | Meaning                                   |
/// |-----------------|-------------------------------------------|
/// | `name`          | required                                  |
/// | `name?`         | optional, binds to nothing when absent    |
/// | `name=default`  | optional, binds to `default` when absent  |
/// | `name...`       | takes the rest of the raw argument text   |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentSpec {
    name: String,
    optional: bool,
    default: Option<String>,
    rest: bool,
}

impl ArgumentSpec {
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            optional: false,
            default: None,
            rest: false,
        }
    }

    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            optional: true,
            ..Self::required(name)
        }
    }

    pub fn with_default(name: impl Into<String>, default: impl Into<String>) -> Self {
        Self {
            optional: true,
            default: Some(default.into()),
            ..Self::required(name)
        }
    }

    /// An argument capturing the remaining raw text, whitespace included.
    pub fn rest(name: impl Into<String>) -> Self {
        Self {
            optional: true,
            rest: true,
            ..Self::required(name)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn default_value(&self) -> Option<&str> {
        self.default.as_deref()
    }

    pub fn is_rest(&self) -> bool {
        self.rest
    }
}

impl FromStr for ArgumentSpec {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| RegistryError::InvalidArgumentSpec {
            spec: s.to_owned(),
            reason: reason.to_owned(),
        };

        let spec = s.trim();
        let parsed = if let Some(name) = spec.strip_suffix("...") {
            Self::rest(name)
        } else if let Some(name) = spec.strip_suffix('?') {
            Self::optional(name)
        } else if let Some((name, default)) = spec.split_once('=') {
            Self::with_default(name.trim_end(), default.trim_start())
        } else {
            Self::required(spec)
        };

        if parsed.name.is_empty() {
            return Err(invalid("argument name is empty"));
        }
        if !parsed
            .name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_')
        {
            return Err(invalid("argument names may only contain alphanumerics and `_`"));
        }
        Ok(parsed)
    }
}

impl fmt::Display for ArgumentSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.default, self.rest, self.optional) {
            (_, true, _) => write!(f, "{}...", self.name),
            (Some(default), _, _) => write!(f, "{}={}", self.name, default),
            (None, _, true) => write!(f, "{}?", self.name),
            (None, _, false) => f.write_str(&self.name),
        }
    }
}

/// A named, invokable command.
#[derive(Clone)]
pub struct Command {
    name: String,
    description: String,
    aliases: Vec<String>,
    arguments: Vec<ArgumentSpec>,
    handler: HandlerRef,
    failure_hook: Option<Arc<dyn FailureHook>>,
}

impl Command {
    pub fn new(name: impl Into<String>, handler: HandlerRef) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            aliases: Vec::new(),
            arguments: Vec::new(),
            handler,
            failure_hook: None,
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    pub fn arg(mut self, spec: ArgumentSpec) -> Self {
        self.arguments.push(spec);
        self
    }

    pub fn args(mut self, specs: impl IntoIterator<Item = ArgumentSpec>) -> Self {
        self.arguments.extend(specs);
        self
    }

    /// Appends arguments parsed from declaration strings.
    pub fn try_args<I, S>(mut self, specs: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for spec in specs {
            self.arguments.push(spec.as_ref().parse()?);
        }
        Ok(self)
    }

    /// Installs a hook that runs before the generic failure notification.
    pub fn on_failure(mut self, hook: impl FailureHook + 'static) -> Self {
        self.failure_hook = Some(Arc::new(hook));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn arguments(&self) -> &[ArgumentSpec] {
        &self.arguments
    }

    pub fn handler(&self) -> &HandlerRef {
        &self.handler
    }

    pub fn failure_hook(&self) -> Option<&Arc<dyn FailureHook>> {
        self.failure_hook.as_ref()
    }

    /// The name followed by every alias.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// A one-line usage string, e.g. `/convert <amount> [from=USD] [to]`.
    pub fn usage(&self, marker: char) -> String {
        let mut usage = format!("{marker}{}", self.name);
        for arg in &self.arguments {
            let part = match (arg.is_optional(), arg.default_value(), arg.is_rest()) {
                (_, _, true) => format!(" [{}...]", arg.name()),
                (_, Some(default), _) => format!(" [{}={default}]", arg.name()),
                (true, None, _) => format!(" [{}]", arg.name()),
                (false, _, _) => format!(" <{}>", arg.name()),
            };
            usage.push_str(&part);
        }
        usage
    }

    /// Checks the name grammar and the argument declaration order.
    pub fn validate(&self) -> Result<(), RegistryError> {
        for name in self.names() {
            if !is_valid_name(name) {
                return Err(RegistryError::InvalidName(name.to_owned()));
            }
        }

        let invalid = |reason: String| RegistryError::InvalidArguments {
            command: self.name.clone(),
            reason,
        };

        let mut seen = HashSet::new();
        let mut optional_seen = false;
        for (index, arg) in self.arguments.iter().enumerate() {
            if !seen.insert(arg.name()) {
                return Err(invalid(format!("argument `{}` is declared twice", arg.name())));
            }
            if arg.is_rest() && index + 1 != self.arguments.len() {
                return Err(invalid(format!("rest argument `{}` must be last", arg.name())));
            }
            if arg.is_optional() {
                optional_seen = true;
            } else if optional_seen {
                return Err(invalid(format!(
                    "required argument `{}` follows an optional one",
                    arg.name()
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("arguments", &self.arguments)
            .field("handler", self.handler.kind())
            .field("failure_hook", &self.failure_hook.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> HandlerRef {
        HandlerRef::callable(|| async {})
    }

    #[test]
    fn test_parse_argument_specs() {
        let spec: ArgumentSpec = "amount".parse().unwrap();
        assert!(!spec.is_optional());

        let spec: ArgumentSpec = "currency?".parse().unwrap();
        assert!(spec.is_optional());
        assert_eq!(spec.default_value(), None);

        let spec: ArgumentSpec = "currency=USD".parse().unwrap();
        assert_eq!(spec.name(), "currency");
        assert_eq!(spec.default_value(), Some("USD"));

        let spec: ArgumentSpec = "query...".parse().unwrap();
        assert!(spec.is_rest());
        assert_eq!(spec.to_string(), "query...");
    }

    #[test]
    fn test_reject_bad_argument_specs() {
        assert!("".parse::<ArgumentSpec>().is_err());
        assert!("?".parse::<ArgumentSpec>().is_err());
        assert!("two words".parse::<ArgumentSpec>().is_err());
    }

    #[test]
    fn test_names_and_usage() {
        let cmd = Command::new("convert", noop())
            .with_aliases(["cv", "conv"])
            .try_args(["amount", "from=USD", "to?"])
            .unwrap();
        assert_eq!(cmd.names().collect::<Vec<_>>(), ["convert", "cv", "conv"]);
        assert_eq!(cmd.usage('/'), "/convert <amount> [from=USD] [to]");
        assert!(cmd.validate().is_ok());
    }

    #[test]
    fn test_validate_names() {
        let cmd = Command::new("bad name", noop());
        assert_eq!(
            cmd.validate(),
            Err(RegistryError::InvalidName("bad name".into()))
        );

        let cmd = Command::new("ok", noop()).alias("also@bad");
        assert!(matches!(cmd.validate(), Err(RegistryError::InvalidName(_))));
    }

    #[test]
    fn test_validate_argument_order() {
        let cmd = Command::new("x", noop())
            .try_args(["a?", "b"])
            .unwrap();
        assert!(matches!(
            cmd.validate(),
            Err(RegistryError::InvalidArguments { .. })
        ));

        let cmd = Command::new("x", noop())
            .try_args(["a...", "b?"])
            .unwrap();
        assert!(matches!(
            cmd.validate(),
            Err(RegistryError::InvalidArguments { .. })
        ));

        let cmd = Command::new("x", noop()).try_args(["a", "a"]).unwrap();
        assert!(matches!(
            cmd.validate(),
            Err(RegistryError::InvalidArguments { .. })
        ));
    }
}
