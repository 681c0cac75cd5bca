//! Pluggable checks and actions, resolved by type name.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use healwatch_core::keys;

use crate::actions::RestartSupervisorProgram;
use crate::checks::{CommandCheck, HttpGetCheck};
use crate::logger::TaskLogger;

/// A health predicate for one task.
///
/// Implementations must not panic or propagate faults: anything that goes
/// wrong is logged through `log` and reported as unhealthy (`false`).
#[async_trait]
pub trait Check: Send + Sync {
    async fn check(&self, config: &toml::Table, log: &TaskLogger) -> bool;
}

/// A corrective side effect, run when a task becomes unhealthy.
///
/// Implementations absorb and log their own failures; the monitor does not
/// react to the outcome.
#[async_trait]
pub trait Action: Send + Sync {
    async fn execute(&self, config: &toml::Table, log: &TaskLogger);
}

/// Name-keyed map of capabilities.
pub struct Registry<T: ?Sized> {
    entries: HashMap<String, Arc<T>>,
}

/// Registry of checks, keyed by `check_type`.
pub type CheckRegistry = Registry<dyn Check>;

/// Registry of actions, keyed by `action_on_failure`.
pub type ActionRegistry = Registry<dyn Action>;

impl<T: ?Sized> Registry<T> {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Register `capability` under `name`, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, capability: Arc<T>) -> &mut Self {
        self.entries.insert(name.into(), capability);
        self
    }

    /// Builder form of [`Registry::register`].
    pub fn with(mut self, name: impl Into<String>, capability: Arc<T>) -> Self {
        self.register(name, capability);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<T>> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: ?Sized> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> Clone for Registry<T> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl Registry<dyn Check> {
    /// Registry pre-populated with `http_get` and `command`.
    pub fn with_defaults() -> Self {
        Self::new()
            .with(keys::CHECK_TYPE_HTTP_GET, Arc::new(HttpGetCheck))
            .with(keys::CHECK_TYPE_COMMAND, Arc::new(CommandCheck))
    }
}

impl Registry<dyn Action> {
    /// Registry pre-populated with `restart_supervisor_program`.
    pub fn with_defaults() -> Self {
        Self::new().with(
            keys::ACTION_TYPE_RESTART_SUPERVISOR_PROGRAM,
            Arc::new(RestartSupervisorProgram),
        )
    }
}

/// Deserialize a capability's typed settings from its config table.
pub(crate) fn parse_config<T: DeserializeOwned>(config: &toml::Table) -> Result<T, toml::de::Error> {
    toml::Value::Table(config.clone()).try_into()
}
