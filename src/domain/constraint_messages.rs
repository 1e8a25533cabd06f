// src/domain/constraint_messages.rs
//! Friendly messages keyed by database constraint name.
//!
//! The process-wide table is installed once during startup (usually from the
//! `CONSTRAINT_MESSAGES_FILE` setting) and is read-only afterwards. Code that
//! needs an isolated table, such as tests, builds its own [`ConstraintMessages`].
use once_cell::sync::{Lazy, OnceCell};
use std::collections::HashMap;

static GLOBAL: OnceCell<ConstraintMessages> = OnceCell::new();
static EMPTY: Lazy<ConstraintMessages> = Lazy::new(ConstraintMessages::default);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintMessages {
    messages: HashMap<String, String>,
}

impl ConstraintMessages {
    pub fn new(messages: HashMap<String, String>) -> Self {
        Self { messages }
    }

    pub fn get(&self, constraint: &str) -> Option<&str> {
        self.messages.get(constraint).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Installs the process-wide table. Returns the rejected table when one is
    /// already installed.
    pub fn install(self) -> Result<(), Self> {
        GLOBAL.set(self)
    }

    /// The installed table, or an empty one when nothing was installed.
    pub fn global() -> &'static Self {
        GLOBAL.get().unwrap_or(&EMPTY)
    }
}

impl<K, V> FromIterator<(K, V)> for ConstraintMessages
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            messages: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
