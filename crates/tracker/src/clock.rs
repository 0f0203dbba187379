use chrono::{DateTime, Utc};
use shared::types::Uuid;

/// Source of timestamps for created and updated dates
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Source of candidate ids. Candidates are checked for collisions by the
/// repository, so a source doesn't have to guarantee uniqueness itself
pub trait IdSource {
    fn next_id(&mut self) -> Uuid;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn next_id(&mut self) -> Uuid {
        Uuid::new_v4()
    }
}
