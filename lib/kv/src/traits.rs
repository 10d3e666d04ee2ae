use crate::error::KVError;

/// KVStore provides a key-value storage interface.
///
/// Keys follow a namespaced convention: `article:1756500000000`, etc.
/// All operations are single-key get/set/delete plus a prefix scan; there
/// are no transactions and no compare-and-swap across calls.
pub trait KVStore: Send + Sync {
    /// Get the value for a key. Returns None if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError>;

    /// Set a key-value pair.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), KVError>;

    /// Delete a key. Deleting an absent key is a no-op.
    fn delete(&self, key: &str) -> Result<(), KVError>;

    /// Delete several keys. Absent keys are skipped silently.
    fn batch_delete(&self, keys: &[&str]) -> Result<(), KVError> {
        for key in keys {
            self.delete(key)?;
        }
        Ok(())
    }

    /// Scan all keys matching a prefix. Returns sorted (key, value) pairs.
    fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, KVError>;
}
