//! Configuration schema definitions.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use herald_framework::parse::{DEFAULT_COMMAND_UPDATE_TYPES, DEFAULT_MARKER};
use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HeraldConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Command extraction and dispatch settings shared by every bot.
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Individual bot configurations.
    #[serde(default)]
    pub bots: Vec<BotConfig>,

    /// Bot that receives updates not addressed to a named bot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_bot: Option<String>,
}

impl HeraldConfig {
    /// Looks up a bot by name.
    pub fn bot(&self, name: &str) -> Option<&BotConfig> {
        self.bots.iter().find(|bot| bot.name == name)
    }
}

// =============================================================================
// Dispatch
// =============================================================================

/// Command extraction and dispatch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Single character that starts a command, `/` by default.
    #[serde(default = "default_command_marker")]
    pub command_marker: String,

    /// Update types inspected for commands.
    #[serde(default = "default_command_update_types")]
    pub command_update_types: Vec<String>,

    /// Emit one `Event` notification per classifier event name.
    #[serde(default = "default_emit_update_events")]
    pub emit_update_events: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            command_marker: default_command_marker(),
            command_update_types: default_command_update_types(),
            emit_update_events: default_emit_update_events(),
        }
    }
}

impl DispatchConfig {
    /// The configured marker character.
    ///
    /// Falls back to `/` when the marker is empty; validation rejects that
    /// case before a runtime is built.
    pub fn marker(&self) -> char {
        self.command_marker.chars().next().unwrap_or(DEFAULT_MARKER)
    }
}

fn default_command_marker() -> String {
    DEFAULT_MARKER.to_string()
}

fn default_command_update_types() -> Vec<String> {
    DEFAULT_COMMAND_UPDATE_TYPES
        .iter()
        .map(|t| (*t).to_owned())
        .collect()
}

fn default_emit_update_events() -> bool {
    true
}

// =============================================================================
// Bots
// =============================================================================

/// Individual bot configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Unique name for this bot instance.
    pub name: String,

    /// Platform username, used to filter `/command@username` mentions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Shared command and group names selected from the command library.
    #[serde(default)]
    pub commands: Vec<String>,

    /// Whether this bot is enabled.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl BotConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            username: None,
            commands: Vec::new(),
            enabled: true,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_commands<I, S>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.commands = commands.into_iter().map(Into::into).collect();
        self
    }
}

fn default_enabled() -> bool {
    true
}

// =============================================================================
// Logging
// =============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Base log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Output destination.
    #[serde(default)]
    pub output: LogOutput,

    /// Log file path, used when `output` is `file`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,

    /// How often the log file is rotated.
    #[serde(default)]
    pub rotation: LogRotation,

    /// Include thread IDs.
    #[serde(default)]
    pub thread_ids: bool,

    /// Include source file and line.
    #[serde(default)]
    pub file_location: bool,

    /// Span lifecycle events to log.
    #[serde(default)]
    pub span_events: SpanEventConfig,

    /// Per-target level overrides, e.g. `herald_framework = "debug"`.
    #[serde(default)]
    pub filters: BTreeMap<String, LogLevel>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            format: LogFormat::default(),
            output: LogOutput::default(),
            file_path: None,
            rotation: LogRotation::default(),
            thread_ids: false,
            file_location: false,
            span_events: SpanEventConfig::default(),
            filters: BTreeMap::new(),
        }
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    /// Requires the `json-log` feature.
    Json,
}

/// Log output destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}

/// Log file rotation period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    #[default]
    Never,
    Daily,
    Hourly,
    Minutely,
}

/// Span lifecycle events to log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpanEventConfig {
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub enter: bool,
    #[serde(default)]
    pub exit: bool,
    #[serde(default)]
    pub close: bool,
}
