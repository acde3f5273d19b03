//! Explicit task-class registry.
//!
//! Whoever assembles the game's task system constructs a registry and hands
//! it to the factory; there is no global class cache, so tests stay hermetic
//! and embedders can restrict the available behaviors per context.

use std::collections::BTreeSet;
use std::str::FromStr;

use crate::kinds::TaskClass;

/// The set of task classes a factory is allowed to construct.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskRegistry {
    classes: BTreeSet<TaskClass>,
}

impl TaskRegistry {
    /// A registry with nothing registered.
    pub fn empty() -> Self {
        Self {
            classes: BTreeSet::new(),
        }
    }

    /// A registry containing every built-in class.
    pub fn with_builtins() -> Self {
        Self {
            classes: TaskClass::ALL.into_iter().collect(),
        }
    }

    pub fn register(&mut self, class: TaskClass) {
        self.classes.insert(class);
    }

    pub fn unregister(&mut self, class: TaskClass) -> bool {
        self.classes.remove(&class)
    }

    pub fn contains(&self, class: TaskClass) -> bool {
        self.classes.contains(&class)
    }

    /// Class lookup by snake_case name, honoring registration.
    pub fn lookup(&self, name: &str) -> Option<TaskClass> {
        let class = TaskClass::from_str(name).ok()?;
        self.contains(class).then_some(class)
    }

    pub fn classes(&self) -> impl Iterator<Item = TaskClass> + '_ {
        self.classes.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_knows_every_class() {
        let registry = TaskRegistry::with_builtins();
        assert_eq!(registry.len(), TaskClass::ALL.len());
        for class in TaskClass::ALL {
            assert!(registry.contains(class));
        }
    }

    #[test]
    fn lookup_honors_registration() {
        let mut registry = TaskRegistry::with_builtins();
        assert_eq!(registry.lookup("climb"), Some(TaskClass::Climb));
        assert!(registry.unregister(TaskClass::Climb));
        assert_eq!(registry.lookup("climb"), None);
        assert_eq!(registry.lookup("not_a_task"), None);
    }
}
