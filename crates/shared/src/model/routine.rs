use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::ValidationError,
    model::{check_name, Exercise, ValidateModel},
    types::Uuid,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Routine {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Insertion order is display order
    pub exercises: Vec<Exercise>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Routine {
    /// A new routine with no exercises, created and updated at `now`
    pub fn new<T: Into<String>>(
        id: Uuid,
        name: T,
        description: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description,
            exercises: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Refreshes `updated_at`. Never moves it backwards if the clock did
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = self.updated_at.max(now);
    }

    pub fn exercise(&self, id: &Uuid) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.id == *id)
    }

    pub fn exercise_mut(&mut self, id: &Uuid) -> Option<&mut Exercise> {
        self.exercises.iter_mut().find(|e| e.id == *id)
    }

    /// Removes the exercise, returning it if it was present
    pub fn remove_exercise(&mut self, id: &Uuid) -> Option<Exercise> {
        let index = self.exercises.iter().position(|e| e.id == *id)?;
        Some(self.exercises.remove(index))
    }
}

impl ValidateModel for Routine {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut messages = Vec::new();
        check_name("Routine", &self.name, &mut messages);

        if self.updated_at < self.created_at {
            messages.push(format!(
                "Routine {} was updated ({}) before it was created ({})",
                self.id, self.updated_at, self.created_at
            ));
        }

        let mut seen = HashSet::new();
        for exercise in &self.exercises {
            if let Err(e) = exercise.validate() {
                messages.extend(
                    e.error_messages
                        .into_iter()
                        .map(|m| format!("Exercise {}: {m}", exercise.id)),
                );
            }
            if !seen.insert(exercise.id) {
                messages.push(format!("Duplicate exercise id {}", exercise.id));
            }
        }

        ValidationError::check(messages)
    }
}

/// Validates every routine plus the collection wide id rules: routine ids are
/// unique and no exercise id appears twice anywhere in the collection
pub fn validate_collection(routines: &[Routine]) -> Result<(), ValidationError> {
    let mut messages = Vec::new();
    let mut routine_ids = HashSet::new();
    let mut exercise_ids = HashSet::new();

    for routine in routines {
        if let Err(e) = routine.validate() {
            messages.extend(e.error_messages);
        }
        if !routine_ids.insert(routine.id) {
            messages.push(format!("Duplicate routine id {}", routine.id));
        }
        for exercise in &routine.exercises {
            if !exercise_ids.insert(exercise.id) {
                messages.push(format!(
                    "Exercise id {} is used more than once",
                    exercise.id
                ));
            }
        }
    }

    ValidationError::check(messages)
}

/// Partial update for a routine's own fields. Exercises are changed through
/// their own operations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoutinePatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
}

impl RoutinePatch {
    pub fn name<T: Into<String>>(mut self, name: T) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description<T: Into<String>>(mut self, description: T) -> Self {
        self.description = Some(Some(description.into()));
        self
    }

    pub fn clear_description(mut self) -> Self {
        self.description = Some(None);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(self, routine: &mut Routine) {
        if let Some(name) = self.name {
            routine.name = name;
        }
        if let Some(description) = self.description {
            routine.description = description;
        }
    }
}

impl ValidateModel for RoutinePatch {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut messages = Vec::new();
        if let Some(name) = &self.name {
            check_name("Routine", name, &mut messages);
        }
        ValidationError::check(messages)
    }
}
