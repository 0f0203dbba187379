use shared::{error::ValidationError, types::Uuid};
use thiserror::Error;

use crate::db::StoreError;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Routines haven't finished loading")]
    NotReady,
    #[error("Routine {0} doesn't exist")]
    RoutineNotFound(Uuid),
    #[error("Exercise {exercise_id} doesn't exist in routine {routine_id}")]
    ExerciseNotFound { routine_id: Uuid, exercise_id: Uuid },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The in-memory change was kept but couldn't be persisted
    #[error("Change wasn't saved: {0}")]
    Write(#[source] StoreError),
    #[error("Couldn't generate a unique id after {attempts} attempts")]
    IdsExhausted { attempts: usize },
}

impl RepositoryError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::RoutineNotFound(_) | Self::ExerciseNotFound { .. }
        )
    }
}
