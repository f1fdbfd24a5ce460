//! Command groups.
//!
//! Groups only exist at registration time. A registry or library flattens
//! them into individual commands before any update is dispatched.

use crate::command::Command;

/// One entry of a [`CommandGroup`].
#[derive(Debug, Clone)]
pub enum GroupMember {
    /// A command defined inline.
    Command(Command),
    /// A shared command looked up by name in a [`CommandLibrary`](crate::CommandLibrary).
    Shared(String),
    /// A nested group defined inline.
    Group(CommandGroup),
    /// A group looked up by name in a [`CommandLibrary`](crate::CommandLibrary).
    GroupRef(String),
}

/// A named collection of commands and nested groups.
#[derive(Debug, Clone, Default)]
pub struct CommandGroup {
    name: String,
    members: Vec<GroupMember>,
}

impl CommandGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    pub fn command(mut self, command: Command) -> Self {
        self.members.push(GroupMember::Command(command));
        self
    }

    pub fn commands(mut self, commands: impl IntoIterator<Item = Command>) -> Self {
        self.members
            .extend(commands.into_iter().map(GroupMember::Command));
        self
    }

    pub fn shared(mut self, name: impl Into<String>) -> Self {
        self.members.push(GroupMember::Shared(name.into()));
        self
    }

    pub fn group(mut self, group: CommandGroup) -> Self {
        self.members.push(GroupMember::Group(group));
        self
    }

    pub fn group_ref(mut self, name: impl Into<String>) -> Self {
        self.members.push(GroupMember::GroupRef(name.into()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[GroupMember] {
        &self.members
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
