//! Shared commands and named groups.
//!
//! A [`CommandLibrary`] holds commands that several bots may use and groups
//! that reference them by name. Each bot then selects what it needs by name
//! and gets its own [`CommandRegistry`]:
//!
//! ```rust,ignore
//! let mut library = CommandLibrary::new();
//! library.share(help_command)?;
//! library.add_group(CommandGroup::new("basic").shared("help").command(start))?;
//!
//! let registry = library.build_registry(["basic", "weather"])?;
//! ```

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use crate::command::Command;
use crate::error::RegistryError;
use crate::group::{CommandGroup, GroupMember};
use crate::provider::CommandProvider;
use crate::registry::CommandRegistry;

#[derive(Debug, Clone, Default)]
pub struct CommandLibrary {
    shared: BTreeMap<String, Command>,
    groups: BTreeMap<String, CommandGroup>,
}

impl CommandLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a command that selections and groups can refer to by name.
    pub fn share(&mut self, command: Command) -> Result<(), RegistryError> {
        command.validate()?;
        if let Some(existing) = self.shared.get(command.name()) {
            return Err(RegistryError::DuplicateCommand {
                name: command.name().to_owned(),
                existing: existing.name().to_owned(),
            });
        }
        self.shared.insert(command.name().to_owned(), command);
        Ok(())
    }

    /// Shares every command of a provider.
    pub fn share_provider<P: CommandProvider>(
        &mut self,
        provider: std::sync::Arc<P>,
    ) -> Result<(), RegistryError> {
        for command in provider.commands()? {
            self.share(command)?;
        }
        Ok(())
    }

    pub fn add_group(&mut self, group: CommandGroup) -> Result<(), RegistryError> {
        if self.groups.contains_key(group.name()) {
            return Err(RegistryError::DuplicateGroup(group.name().to_owned()));
        }
        self.groups.insert(group.name().to_owned(), group);
        Ok(())
    }

    pub fn shared(&self, name: &str) -> Option<&Command> {
        self.shared.get(name)
    }

    pub fn group(&self, name: &str) -> Option<&CommandGroup> {
        self.groups.get(name)
    }

    /// Flattens a selection into the commands it denotes.
    ///
    /// Each entry names a group or a shared command; groups win when a name is
    /// both. A shared command or group reached through several paths is
    /// included once.
    pub fn resolve_selection<I, S>(&self, selection: I) -> Result<Vec<Command>, RegistryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut flattener = Flattener {
            library: self,
            stack: Vec::new(),
            seen_shared: HashSet::new(),
            expanded: HashSet::new(),
            out: Vec::new(),
        };

        for entry in selection {
            let entry = entry.as_ref();
            if let Some(group) = self.groups.get(entry) {
                flattener.group(group)?;
            } else if self.shared.contains_key(entry) {
                flattener.shared(entry)?;
            } else {
                return Err(RegistryError::UnknownCommand(entry.to_owned()));
            }
        }
        Ok(flattener.out)
    }

    /// Builds a registry for a selection of groups and shared commands.
    pub fn build_registry<I, S>(&self, selection: I) -> Result<CommandRegistry, RegistryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = CommandRegistry::new();
        registry.register_all(self.resolve_selection(selection)?)?;
        debug!(commands = registry.len(), "Built command registry");
        Ok(registry)
    }
}

struct Flattener<'a> {
    library: &'a CommandLibrary,
    stack: Vec<String>,
    seen_shared: HashSet<String>,
    expanded: HashSet<String>,
    out: Vec<Command>,
}

impl Flattener<'_> {
    fn shared(&mut self, name: &str) -> Result<(), RegistryError> {
        let command = self
            .library
            .shared
            .get(name)
            .ok_or_else(|| RegistryError::UnknownCommand(name.to_owned()))?;
        if self.seen_shared.insert(name.to_owned()) {
            self.out.push(command.clone());
        }
        Ok(())
    }

    fn group(&mut self, group: &CommandGroup) -> Result<(), RegistryError> {
        if self.stack.iter().any(|name| name == group.name()) {
            let mut path = self.stack.clone();
            path.push(group.name().to_owned());
            return Err(RegistryError::GroupCycle(path.join(" -> ")));
        }
        if self.expanded.contains(group.name()) {
            return Ok(());
        }

        self.stack.push(group.name().to_owned());
        for member in group.members() {
            match member {
                GroupMember::Command(command) => self.out.push(command.clone()),
                GroupMember::Shared(name) => self.shared(name)?,
                GroupMember::Group(nested) => self.group(nested)?,
                GroupMember::GroupRef(name) => {
                    let nested = self
                        .library
                        .groups
                        .get(name)
                        .ok_or_else(|| RegistryError::UnknownGroup(name.clone()))?;
                    self.group(nested)?;
                }
            }
        }
        self.stack.pop();
        self.expanded.insert(group.name().to_owned());
        Ok(())
    }
}
