//! Bot instances and their dispatchers.
//!
//! Each configured bot gets its own [`CommandDispatcher`], built from the
//! shared [`CommandLibrary`] and the bot's command selection. Registries are
//! frozen once built; changing a bot's commands means rebuilding it.

use std::collections::HashMap;
use std::sync::Arc;

use herald_framework::{
    BotInfo, BoxedBot, CommandDispatcher, CommandLibrary, CommandParser, NotificationSink,
};
use tracing::{debug, info, warn};

use crate::config::{BotConfig, DispatchConfig, HeraldConfig};
use crate::error::{RuntimeError, RuntimeResult};

/// A bot handle paired with the dispatcher that serves it.
#[derive(Debug, Clone)]
pub struct ManagedBot {
    handle: BoxedBot,
    dispatcher: CommandDispatcher,
}

impl ManagedBot {
    pub fn new(handle: BoxedBot, dispatcher: CommandDispatcher) -> Self {
        Self { handle, dispatcher }
    }

    pub fn name(&self) -> &str {
        self.handle.name()
    }

    pub fn handle(&self) -> &BoxedBot {
        &self.handle
    }

    pub fn dispatcher(&self) -> &CommandDispatcher {
        &self.dispatcher
    }
}

/// The set of bots served by a runtime.
#[derive(Debug, Default)]
pub struct BotsManager {
    bots: HashMap<String, ManagedBot>,
    default_bot: Option<String>,
}

impl BotsManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds every enabled bot in `config`.
    ///
    /// Bots get a [`BotInfo`] handle; use [`BotsManager::set_handle`] to
    /// attach a richer one.
    pub fn from_config(
        config: &HeraldConfig,
        library: &CommandLibrary,
        sink: Arc<dyn NotificationSink>,
    ) -> RuntimeResult<Self> {
        let mut manager = Self::new();

        for bot in &config.bots {
            if !bot.enabled {
                debug!(bot = %bot.name, "Skipping disabled bot");
                continue;
            }

            let dispatcher = build_dispatcher(&config.dispatch, bot, library, Arc::clone(&sink))?;
            let mut handle = BotInfo::new(&bot.name);
            if let Some(username) = &bot.username {
                handle = handle.with_username(username);
            }
            manager.insert(ManagedBot::new(handle.boxed(), dispatcher))?;
        }

        if let Some(default_bot) = &config.default_bot {
            manager.set_default(default_bot)?;
        }

        Ok(manager)
    }

    /// Adds a bot; names must be unique.
    pub fn insert(&mut self, bot: ManagedBot) -> RuntimeResult<()> {
        let name = bot.name().to_owned();
        if self.bots.contains_key(&name) {
            return Err(RuntimeError::BotExists(name));
        }

        info!(
            bot = %name,
            commands = bot.dispatcher.registry().len(),
            "Registered bot"
        );
        self.bots.insert(name, bot);
        Ok(())
    }

    /// Removes a bot, clearing the default if it pointed there.
    pub fn remove(&mut self, name: &str) -> RuntimeResult<ManagedBot> {
        let bot = self
            .bots
            .remove(name)
            .ok_or_else(|| RuntimeError::BotNotFound(name.to_owned()))?;
        if self.default_bot.as_deref() == Some(name) {
            self.default_bot = None;
        }
        Ok(bot)
    }

    /// Replaces the handle passed to a bot's handlers, keeping its dispatcher.
    ///
    /// The new handle must report the same name.
    pub fn set_handle(&mut self, handle: BoxedBot) -> RuntimeResult<()> {
        let bot = self
            .bots
            .get_mut(handle.name())
            .ok_or_else(|| RuntimeError::BotNotFound(handle.name().to_owned()))?;
        bot.handle = handle;
        Ok(())
    }

    pub fn set_default(&mut self, name: &str) -> RuntimeResult<()> {
        if !self.bots.contains_key(name) {
            return Err(RuntimeError::BotNotFound(name.to_owned()));
        }
        self.default_bot = Some(name.to_owned());
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ManagedBot> {
        self.bots.get(name)
    }

    /// Resolves the bot an update is addressed to.
    ///
    /// Without a name, the configured default bot is used, or the only bot
    /// when exactly one is registered.
    pub fn resolve(&self, name: Option<&str>) -> RuntimeResult<&ManagedBot> {
        match name {
            Some(name) => self
                .bots
                .get(name)
                .ok_or_else(|| RuntimeError::BotNotFound(name.to_owned())),
            None => {
                if let Some(default_bot) = &self.default_bot {
                    return self
                        .bots
                        .get(default_bot)
                        .ok_or_else(|| RuntimeError::BotNotFound(default_bot.clone()));
                }
                let mut bots = self.bots.values();
                match (bots.next(), bots.next()) {
                    (Some(only), None) => Ok(only),
                    _ => Err(RuntimeError::NoDefaultBot),
                }
            }
        }
    }

    /// Bot names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.bots.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.bots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bots.is_empty()
    }
}

/// Builds the dispatcher for one configured bot.
pub fn build_dispatcher(
    dispatch: &DispatchConfig,
    bot: &BotConfig,
    library: &CommandLibrary,
    sink: Arc<dyn NotificationSink>,
) -> RuntimeResult<CommandDispatcher> {
    if bot.commands.is_empty() {
        warn!(bot = %bot.name, "Bot selects no commands");
    }

    let registry =
        library
            .build_registry(&bot.commands)
            .map_err(|source| RuntimeError::Registry {
                bot: bot.name.clone(),
                source,
            })?;

    let mut parser = CommandParser::new()
        .with_marker(dispatch.marker())
        .with_update_types(dispatch.command_update_types.iter().cloned());
    if let Some(username) = &bot.username {
        parser = parser.with_username(username);
    }

    Ok(CommandDispatcher::new(registry)
        .with_parser(parser)
        .with_shared_sink(sink)
        .emit_update_events(dispatch.emit_update_events))
}
