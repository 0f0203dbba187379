//! Durable named slots. Each backend stores whole string values under short
//! keys, the way browser local storage does

use thiserror::Error;

mod file;
pub use file::*;

mod memory;
pub use memory::*;

mod sqlite;
pub use sqlite::*;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Rusqlite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
    #[error("Migration error: {0}")]
    Migration(String),
    #[error("Quota exceeded: {needed} bytes needed but only {available} available")]
    QuotaExceeded { needed: usize, available: usize },
    #[error("Slot key {0:?} is not valid. Can only contain ascii alphanumeric, - and _")]
    InvalidKey(String),
}

pub trait StorageBackend {
    /// Returns the value stored under `key`, `None` if nothing was ever stored
    fn get(&self, key: &str) -> Result<Option<String>, BackendError>;

    /// Replaces the value under `key`. Either the whole value lands or the
    /// previous one stays readable
    fn set(&mut self, key: &str, value: &str) -> Result<(), BackendError>;

    /// Removing a missing key is not an error
    fn remove(&mut self, key: &str) -> Result<(), BackendError>;
}

impl<B: StorageBackend + ?Sized> StorageBackend for Box<B> {
    fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), BackendError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), BackendError> {
        (**self).remove(key)
    }
}

pub fn check_key(key: &str) -> Result<(), BackendError> {
    if key.is_empty()
        || !key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        Err(BackendError::InvalidKey(key.to_owned()))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_check_key() {
        assert!(check_key("gym-routines").is_ok());
        assert!(check_key("gym_app_user2").is_ok());
        assert!(check_key("").is_err());
        assert!(check_key("../etc/passwd").is_err());
        assert!(check_key("has space").is_err());
    }

    #[test]
    fn test_boxed_backend_delegates() {
        let mut backend: Box<dyn StorageBackend> = Box::new(MemoryBackend::default());
        backend.set("slot", "value").unwrap();
        assert_eq!(backend.get("slot").unwrap().as_deref(), Some("value"));
        backend.remove("slot").unwrap();
        assert_eq!(backend.get("slot").unwrap(), None);
    }
}
