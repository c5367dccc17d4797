use std::cell::RefCell;
use std::collections::BTreeMap;

use anyhow::Result;

/// String key-value persistence used for all application state.
///
/// Implementations take `&self` and handle their own interior mutability, the
/// same way a `rusqlite::Connection` does.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Returns `true` if a value was removed.
    fn remove(&self, key: &str) -> Result<bool>;

    /// Write several values at once. Backends that support transactions
    /// override this so either all values land or none do.
    fn set_many(&self, entries: &[(&str, String)]) -> Result<()> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }
}

/// Volatile store for tests and previews.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RefCell<BTreeMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_values<'a>(values: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let store = Self::new();
        store.values.borrow_mut().extend(
            values
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        );
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.values.borrow_mut().remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.get("notes").unwrap().is_none());

        store.set("notes", "repot in spring").unwrap();
        assert_eq!(store.get("notes").unwrap().as_deref(), Some("repot in spring"));

        assert!(store.remove("notes").unwrap());
        assert!(!store.remove("notes").unwrap());
    }

    #[test]
    fn test_set_many_default() {
        let store = MemoryStore::with_values([("theme", "light")]);
        store
            .set_many(&[("theme", "dark".to_string()), ("palette", "rose".to_string())])
            .unwrap();
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
        assert_eq!(store.get("palette").unwrap().as_deref(), Some("rose"));
    }
}
