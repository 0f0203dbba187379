use serde::{Deserialize, Serialize};

use crate::{
    error::ValidationError,
    model::{check_name, NewExercise, ValidateModel},
};

/// A built-in routine definition. Ids and timestamps are assigned when it is
/// turned into a routine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutineTemplate {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub exercises: Vec<NewExercise>,
}

impl RoutineTemplate {
    pub fn new<T: Into<String>>(name: T, exercises: Vec<NewExercise>) -> Self {
        Self {
            name: name.into(),
            description: None,
            exercises,
        }
    }
}

impl ValidateModel for RoutineTemplate {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut messages = Vec::new();
        check_name("Routine", &self.name, &mut messages);
        for exercise in &self.exercises {
            if let Err(e) = exercise.validate() {
                messages.extend(
                    e.error_messages
                        .into_iter()
                        .map(|m| format!("{}: {m}", self.name)),
                );
            }
        }
        ValidationError::check(messages)
    }
}
