use std::collections::HashMap;

use tracing::warn;

use super::{check_key, BackendError, StorageBackend};

/// In-process slots with an optional byte quota across all stored values
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    slots: HashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryBackend {
    pub fn with_quota(quota: usize) -> Self {
        Self {
            slots: HashMap::new(),
            quota: Some(quota),
        }
    }

    pub fn set_quota(&mut self, quota: Option<usize>) {
        self.quota = quota;
    }

    fn used_excluding(&self, key: &str) -> usize {
        self.slots
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(_, v)| v.len())
            .sum()
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        check_key(key)?;
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), BackendError> {
        check_key(key)?;
        if let Some(quota) = self.quota {
            let available = quota.saturating_sub(self.used_excluding(key));
            if value.len() > available {
                warn!(key, needed = value.len(), available, "Memory slot quota exceeded");
                return Err(BackendError::QuotaExceeded {
                    needed: value.len(),
                    available,
                });
            }
        }
        self.slots.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), BackendError> {
        check_key(key)?;
        self.slots.remove(key);
        Ok(())
    }
}
