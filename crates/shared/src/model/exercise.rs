use serde::{Deserialize, Serialize};

use crate::{
    error::ValidationError,
    model::{
        check_name,
        constants::{MIN_REPS, MIN_SETS},
        ValidateModel,
    },
    types::Uuid,
};

/// One movement entry inside a routine. Only exists as part of its parent
/// routine's exercise list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: Uuid,
    pub name: String,
    pub sets: u32,
    pub reps: u32,
    /// Absent means bodyweight or unspecified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ValidateModel for Exercise {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut messages = Vec::new();
        check_exercise_fields(
            &self.name,
            self.sets,
            self.reps,
            self.weight,
            &mut messages,
        );
        ValidationError::check(messages)
    }
}

/// User supplied fields for a new exercise, before an id is assigned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExercise {
    pub name: String,
    pub sets: u32,
    pub reps: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl NewExercise {
    pub fn new<T: Into<String>>(name: T, sets: u32, reps: u32) -> Self {
        Self {
            name: name.into(),
            sets,
            reps,
            weight: None,
            notes: None,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn with_notes<T: Into<String>>(mut self, notes: T) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn into_exercise(self, id: Uuid) -> Exercise {
        let Self {
            name,
            sets,
            reps,
            weight,
            notes,
        } = self;
        Exercise {
            id,
            name,
            sets,
            reps,
            weight,
            notes,
        }
    }
}

impl ValidateModel for NewExercise {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut messages = Vec::new();
        check_exercise_fields(
            &self.name,
            self.sets,
            self.reps,
            self.weight,
            &mut messages,
        );
        ValidationError::check(messages)
    }
}

/// Partial update for an exercise. `None` leaves a field untouched, the
/// nested options on `weight` and `notes` distinguish set from clear
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExercisePatch {
    pub name: Option<String>,
    pub sets: Option<u32>,
    pub reps: Option<u32>,
    pub weight: Option<Option<f64>>,
    pub notes: Option<Option<String>>,
}

impl ExercisePatch {
    pub fn name<T: Into<String>>(mut self, name: T) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn sets(mut self, sets: u32) -> Self {
        self.sets = Some(sets);
        self
    }

    pub fn reps(mut self, reps: u32) -> Self {
        self.reps = Some(reps);
        self
    }

    pub fn weight(mut self, weight: f64) -> Self {
        self.weight = Some(Some(weight));
        self
    }

    pub fn clear_weight(mut self) -> Self {
        self.weight = Some(None);
        self
    }

    pub fn notes<T: Into<String>>(mut self, notes: T) -> Self {
        self.notes = Some(Some(notes.into()));
        self
    }

    pub fn clear_notes(mut self) -> Self {
        self.notes = Some(None);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(self, exercise: &mut Exercise) {
        if let Some(name) = self.name {
            exercise.name = name;
        }
        if let Some(sets) = self.sets {
            exercise.sets = sets;
        }
        if let Some(reps) = self.reps {
            exercise.reps = reps;
        }
        if let Some(weight) = self.weight {
            exercise.weight = weight;
        }
        if let Some(notes) = self.notes {
            exercise.notes = notes;
        }
    }
}

impl ValidateModel for ExercisePatch {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut messages = Vec::new();
        if let Some(name) = &self.name {
            check_name("Exercise", name, &mut messages);
        }
        if let Some(sets) = self.sets {
            check_sets(sets, &mut messages);
        }
        if let Some(reps) = self.reps {
            check_reps(reps, &mut messages);
        }
        if let Some(weight) = self.weight {
            check_weight(weight, &mut messages);
        }
        ValidationError::check(messages)
    }
}

fn check_exercise_fields(
    name: &str,
    sets: u32,
    reps: u32,
    weight: Option<f64>,
    messages: &mut Vec<String>,
) {
    check_name("Exercise", name, messages);
    check_sets(sets, messages);
    check_reps(reps, messages);
    check_weight(weight, messages);
}

fn check_sets(sets: u32, messages: &mut Vec<String>) {
    if sets < MIN_SETS {
        messages.push(format!("Sets needs to be at least {MIN_SETS}"));
    }
}

fn check_reps(reps: u32, messages: &mut Vec<String>) {
    if reps < MIN_REPS {
        messages.push(format!("Reps needs to be at least {MIN_REPS}"));
    }
}

fn check_weight(weight: Option<f64>, messages: &mut Vec<String>) {
    match weight {
        Some(w) if !w.is_finite() => messages.push(format!("Weight {w} isn't a number")),
        Some(w) if w < 0.0 => messages.push(format!("Weight can't be negative, got {w}")),
        _ => {}
    }
}
