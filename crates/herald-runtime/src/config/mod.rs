//! Configuration for the Herald runtime.
//!
//! Configuration is layered with figment: built-in defaults, TOML/YAML files,
//! `HERALD_*` environment variables and programmatic overrides. The loaded
//! [`HeraldConfig`] is validated before it is returned.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    BotConfig, DispatchConfig, HeraldConfig, LogFormat, LogLevel, LogOutput, LogRotation,
    LoggingConfig, SpanEventConfig,
};
pub use validation::validate_config;
