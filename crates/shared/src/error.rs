use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("Validation failed: {}", error_messages.join("; "))]
pub struct ValidationError {
    pub error_messages: Vec<String>,
}

impl ValidationError {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            error_messages: vec![message.into()],
        }
    }

    /// Turns a list of collected messages into a result, failing if any were
    /// collected
    pub fn check(error_messages: Vec<String>) -> Result<(), Self> {
        if error_messages.is_empty() {
            Ok(())
        } else {
            Err(Self { error_messages })
        }
    }
}
