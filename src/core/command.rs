//! Named editor commands.
//!
//! Every key binding resolves to a command name; the name is looked up in the
//! [`CommandRegistry`] and the command runs against the whole [`EditorApp`].

use std::collections::HashMap;
use std::rc::Rc;

use crate::core::app::EditorApp;
use crate::core::dispatcher::DispatchResult;

pub trait Command {
    /// Name the command is registered and bound under
    fn name(&self) -> &'static str;

    /// Run the command `count` times where repetition makes sense
    fn execute(&self, app: &mut EditorApp, count: usize) -> DispatchResult;
}

/// Name-keyed command table. Entries are shared so a command can be looked
/// up and then run against the app that owns the table.
#[derive(Default, Clone)]
pub struct CommandRegistry {
    commands: HashMap<&'static str, Rc<dyn Command>>,
}

impl CommandRegistry {
    pub fn register(&mut self, command: impl Command + 'static) {
        self.commands.insert(command.name(), Rc::new(command));
    }

    pub fn get(&self, name: &str) -> Option<Rc<dyn Command>> {
        self.commands.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.commands.keys().copied().collect();
        names.sort_unstable();
        names
    }
}
