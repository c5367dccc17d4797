use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::models::TaskKey;

/// Task keys the user explicitly marked done.
///
/// Serializes as a sorted array of key strings. Decoding skips entries that
/// are not valid keys: they could never match a generated task anyway.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CompletionLedger {
    keys: BTreeSet<TaskKey>,
}

impl CompletionLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the key was not already present.
    pub fn insert(&mut self, key: TaskKey) -> bool {
        self.keys.insert(key)
    }

    /// Returns `true` if the key was present.
    pub fn remove(&mut self, key: &TaskKey) -> bool {
        self.keys.remove(key)
    }

    #[must_use]
    pub fn contains(&self, key: &TaskKey) -> bool {
        self.keys.contains(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaskKey> {
        self.keys.iter()
    }
}

impl FromIterator<TaskKey> for CompletionLedger {
    fn from_iter<I: IntoIterator<Item = TaskKey>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

impl<'de> Deserialize<'de> for CompletionLedger {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Vec::<String>::deserialize(deserializer)?;
        let mut ledger = CompletionLedger::new();
        for entry in raw {
            match entry.parse::<TaskKey>() {
                Ok(key) => {
                    ledger.insert(key);
                }
                Err(e) => warn!(%e, "dropping unreadable completion entry"),
            }
        }
        Ok(ledger)
    }
}
