use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::error::KVError;
use crate::traits::KVStore;

/// MemoryKV is an in-memory KVStore backed by a BTreeMap.
///
/// Intended for tests and ephemeral setups; data is lost on drop. Lock
/// poisoning is treated as a storage error rather than a panic.
#[derive(Default)]
pub struct MemoryKV {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryKV {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KVStore for MemoryKV {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| KVError::Storage(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), KVError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| KVError::Storage(e.to_string()))?;
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), KVError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| KVError::Storage(e.to_string()))?;
        entries.remove(key);
        Ok(())
    }

    fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, KVError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| KVError::Storage(e.to_string()))?;
        Ok(entries
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_set_delete() {
        let store = MemoryKV::new();

        assert!(store.get("a").unwrap().is_none());
        store.set("a", b"1").unwrap();
        assert_eq!(store.get("a").unwrap(), Some(b"1".to_vec()));

        store.delete("a").unwrap();
        assert!(store.get("a").unwrap().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn scan_is_sorted_and_prefixed() {
        let store = MemoryKV::new();
        store.set("article:2", b"b").unwrap();
        store.set("article:1", b"a").unwrap();
        store.set("zzz", b"z").unwrap();

        let entries = store.scan("article:").unwrap();
        let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["article:1", "article:2"]);
    }

    #[test]
    fn default_batch_delete() {
        let store = MemoryKV::new();
        store.set("a", b"1").unwrap();
        store.set("b", b"2").unwrap();

        store.batch_delete(&["a", "b", "missing"]).unwrap();
        assert!(store.is_empty());
    }
}
