//! The command registry.
//!
//! The registry maps every command name and alias to one shared
//! [`Command`]. It is built once during startup through `&mut` access and then
//! frozen behind an `Arc` for dispatch, so lookups never contend with writes.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::command::Command;
use crate::error::RegistryError;
use crate::group::{CommandGroup, GroupMember};
use crate::provider::CommandProvider;

/// Name/alias lookup table for commands.
#[derive(Clone, Default)]
pub struct CommandRegistry {
    entries: HashMap<String, Arc<Command>>,
    commands: Vec<Arc<Command>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a command under its name and all of its aliases.
    ///
    /// Either every name is inserted or none is: a collision with an existing
    /// entry, or between the command's own names, leaves the registry as it
    /// was.
    pub fn register(&mut self, command: Command) -> Result<Arc<Command>, RegistryError> {
        command.validate()?;

        let mut own = HashSet::new();
        for name in command.names() {
            if let Some(existing) = self.entries.get(name) {
                return Err(RegistryError::DuplicateCommand {
                    name: name.to_owned(),
                    existing: existing.name().to_owned(),
                });
            }
            if !own.insert(name) {
                return Err(RegistryError::DuplicateCommand {
                    name: name.to_owned(),
                    existing: command.name().to_owned(),
                });
            }
        }

        let command = Arc::new(command);
        for name in command.names() {
            self.entries.insert(name.to_owned(), command.clone());
        }
        self.commands.push(command.clone());

        debug!(
            command = command.name(),
            aliases = ?command.aliases(),
            handler = %command.handler().kind(),
            "Registered command"
        );
        Ok(command)
    }

    /// Registers several commands, stopping at the first failure.
    ///
    /// Unlike [`register_group`](Self::register_group) this is not atomic:
    /// commands before the failing one stay registered.
    pub fn register_all(
        &mut self,
        commands: impl IntoIterator<Item = Command>,
    ) -> Result<usize, RegistryError> {
        let mut count = 0;
        for command in commands {
            self.register(command)?;
            count += 1;
        }
        Ok(count)
    }

    /// Recursively registers the inline members of a group.
    ///
    /// The group is registered as a whole: if any member fails, the registry
    /// is left unchanged. Shared commands and group references need a
    /// [`CommandLibrary`](crate::CommandLibrary) and are rejected here.
    pub fn register_group(&mut self, group: CommandGroup) -> Result<usize, RegistryError> {
        let mut staged = self.clone();
        let count = staged.register_group_members(&group)?;
        *self = staged;
        Ok(count)
    }

    fn register_group_members(&mut self, group: &CommandGroup) -> Result<usize, RegistryError> {
        let mut count = 0;
        for member in group.members() {
            match member {
                GroupMember::Command(command) => {
                    self.register(command.clone())?;
                    count += 1;
                }
                GroupMember::Group(nested) => count += self.register_group_members(nested)?,
                GroupMember::Shared(reference) | GroupMember::GroupRef(reference) => {
                    return Err(RegistryError::UnresolvedReference {
                        group: group.name().to_owned(),
                        reference: reference.clone(),
                    });
                }
            }
        }
        Ok(count)
    }

    /// Registers every command a provider declares.
    pub fn register_provider<P: CommandProvider>(
        &mut self,
        provider: Arc<P>,
    ) -> Result<usize, RegistryError> {
        let commands = provider.commands()?;
        let mut staged = self.clone();
        let count = staged.register_all(commands)?;
        *self = staged;
        Ok(count)
    }

    /// Looks up a command by exact name or alias.
    pub fn resolve(&self, name: &str) -> Option<&Arc<Command>> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Every name and alias with the command it resolves to.
    pub fn all(&self) -> &HashMap<String, Arc<Command>> {
        &self.entries
    }

    /// Distinct commands in registration order.
    pub fn commands(&self) -> &[Arc<Command>] {
        &self.commands
    }

    /// Number of distinct commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.commands.iter().map(|c| c.name()))
            .finish()
    }
}
