use dashmap::DashMap;
use std::sync::Arc;

use super::SessionStore;
use crate::utils::error::Result;

/// In-memory store. Clones share the same entries, so a second controller
/// built on a clone sees what the first one wrote.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<DashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_operations() {
        let store = MemoryStore::new();
        store.set("auth_token", "T1").unwrap();
        assert_eq!(store.get("auth_token").unwrap().as_deref(), Some("T1"));
        assert_eq!(store.len(), 1);

        store.remove("auth_token").unwrap();
        store.remove("auth_token").unwrap();
        assert!(store.is_empty());
        assert!(store.get("auth_token").unwrap().is_none());
    }

    #[test]
    fn test_clones_share_entries() {
        let store = MemoryStore::new();
        let other = store.clone();
        store.set("k", "v").unwrap();
        assert_eq!(other.get("k").unwrap().as_deref(), Some("v"));
    }
}
