use shared::{error::ValidationError, model::constants::SESSION_SLOT};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::db::backend::{BackendError, StorageBackend};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session storage error: {0}")]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// The display name the user entered on this device. Purely cosmetic: it
/// picks a greeting and decides whether the built-in templates are seeded,
/// it doesn't identify or authorize anyone
#[derive(Debug)]
pub struct SessionLabel<B> {
    backend: B,
}

impl<B: StorageBackend> SessionLabel<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn current(&self) -> Result<Option<String>, SessionError> {
        Ok(self.backend.get(SESSION_SLOT)?)
    }

    /// Stores the trimmed name and returns it
    #[instrument(skip(self))]
    pub fn login(&mut self, name: &str) -> Result<String, SessionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::new("Name can't be empty").into());
        }
        self.backend.set(SESSION_SLOT, name)?;
        debug!("Session label set");
        Ok(name.to_owned())
    }

    pub fn logout(&mut self) -> Result<(), SessionError> {
        Ok(self.backend.remove(SESSION_SLOT)?)
    }
}
