//! Configuration validation utilities.

use std::collections::HashSet;

use super::error::{ConfigError, ConfigResult};
use super::schema::{BotConfig, DispatchConfig, HeraldConfig, LogFormat, LogOutput, LoggingConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &HeraldConfig) -> ConfigResult<()> {
    validate_logging_config(&config.logging)?;
    validate_dispatch_config(&config.dispatch)?;
    validate_bots_config(&config.bots)?;

    if let Some(default_bot) = &config.default_bot {
        match config.bot(default_bot) {
            None => return Err(ConfigError::UnknownDefaultBot(default_bot.clone())),
            Some(bot) if !bot.enabled => {
                return Err(ConfigError::DisabledDefaultBot(default_bot.clone()));
            }
            Some(_) => {}
        }
    }

    Ok(())
}

fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::missing_field("logging.file_path"));
    }

    if logging.format == LogFormat::Json && !cfg!(feature = "json-log") {
        return Err(ConfigError::validation(
            "JSON log format requires the `json-log` feature",
        ));
    }

    Ok(())
}

/// Validates command extraction settings.
fn validate_dispatch_config(dispatch: &DispatchConfig) -> ConfigResult<()> {
    let mut chars = dispatch.command_marker.chars();
    match (chars.next(), chars.next()) {
        (None, _) => return Err(ConfigError::missing_field("dispatch.command_marker")),
        (Some(_), Some(_)) => {
            return Err(ConfigError::validation(format!(
                "Command marker must be a single character, got {:?}",
                dispatch.command_marker
            )));
        }
        (Some(marker), None) if marker.is_whitespace() || marker.is_alphanumeric() => {
            return Err(ConfigError::validation(format!(
                "Command marker cannot be whitespace or alphanumeric, got {marker:?}"
            )));
        }
        _ => {}
    }

    if dispatch.command_update_types.is_empty() {
        return Err(ConfigError::validation(
            "At least one command update type is required",
        ));
    }

    Ok(())
}

/// Validates all bot configurations.
fn validate_bots_config(bots: &[BotConfig]) -> ConfigResult<()> {
    let mut seen_names = HashSet::new();

    for bot in bots {
        validate_bot_config(bot)?;

        if !seen_names.insert(&bot.name) {
            return Err(ConfigError::DuplicateBotName(bot.name.clone()));
        }
    }

    Ok(())
}

/// Validates a single bot configuration.
fn validate_bot_config(bot: &BotConfig) -> ConfigResult<()> {
    if bot.name.is_empty() {
        return Err(ConfigError::missing_field("bot.name"));
    }

    if bot.name.chars().any(char::is_whitespace) {
        return Err(ConfigError::validation(format!(
            "Bot name cannot contain whitespace: {:?}",
            bot.name
        )));
    }

    if let Some(username) = &bot.username
        && username.trim_start_matches('@').is_empty()
    {
        return Err(ConfigError::validation(format!(
            "Bot {} has an empty username",
            bot.name
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_empty_config() {
        let config = HeraldConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_duplicate_bot_name() {
        let bot = BotConfig::new("herald").with_commands(["ping"]);
        let config = HeraldConfig {
            bots: vec![bot.clone(), bot],
            ..Default::default()
        };

        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::DuplicateBotName(name)) if name == "herald"));
    }

    #[test]
    fn test_validate_unknown_default_bot() {
        let config = HeraldConfig {
            bots: vec![BotConfig::new("a")],
            default_bot: Some("b".into()),
            ..Default::default()
        };
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::UnknownDefaultBot(name)) if name == "b"
        ));
    }

    #[test]
    fn test_validate_disabled_default_bot() {
        let mut config = HeraldConfig {
            bots: vec![BotConfig::new("a"), BotConfig::new("b")],
            default_bot: Some("b".into()),
            ..Default::default()
        };
        assert!(validate_config(&config).is_ok());

        config.bots[1].enabled = false;
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(&err, ConfigError::DisabledDefaultBot(name) if name == "b"));
        assert_eq!(err.to_string(), "Default bot is disabled: b");
    }

    #[test]
    fn test_validate_marker() {
        let mut config = HeraldConfig::default();

        config.dispatch.command_marker = " ".into();
        assert!(validate_config(&config).is_err());

        config.dispatch.command_marker = "//".into();
        assert!(validate_config(&config).is_err());

        config.dispatch.command_marker = String::new();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::MissingField { .. })
        ));

        config.dispatch.command_marker = "!".into();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.dispatch.marker(), '!');
    }

    #[test]
    fn test_validate_file_output_needs_path() {
        let mut config = HeraldConfig::default();
        config.logging.output = LogOutput::File;
        assert!(validate_config(&config).is_err());

        config.logging.file_path = Some("logs/herald.log".into());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_bot_name_whitespace() {
        let config = HeraldConfig {
            bots: vec![BotConfig::new("my bot")],
            ..Default::default()
        };
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError { .. })
        ));
    }
}
