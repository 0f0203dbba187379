use shared::{
    model::{
        Exercise, ExercisePatch, NewExercise, Routine, RoutinePatch, RoutineTemplate,
        ValidateModel,
    },
    types::Uuid,
};
use tracing::{debug, info, instrument, warn};

use crate::{
    db::{backend::StorageBackend, Store},
    Clock, IdSource, RandomIds, SystemClock,
};

mod error;
pub use error::*;


/// How many candidate ids are drawn before giving up on finding a free one
pub const MAX_ID_ATTEMPTS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Uninitialized,
    Loading,
    Ready,
}

/// The in-memory authority for the routine list during a session. Every
/// mutation is applied here and then the whole list is written through to
/// the store before the call returns.
///
/// Nothing is available until [`Repository::load`] has run: reads and writes
/// issued before that are rejected with [`RepositoryError::NotReady`].
pub struct Repository<B> {
    store: Store<B>,
    state: LoadState,
    routines: Vec<Routine>,
    clock: Box<dyn Clock>,
    ids: Box<dyn IdSource>,
}

impl<B: StorageBackend> Repository<B> {
    pub fn new(store: Store<B>) -> Self {
        Self::with_sources(store, SystemClock, RandomIds)
    }

    pub fn with_sources<C, I>(store: Store<B>, clock: C, ids: I) -> Self
    where
        C: Clock + 'static,
        I: IdSource + 'static,
    {
        Self {
            store,
            state: LoadState::Uninitialized,
            routines: Vec::new(),
            clock: Box::new(clock),
            ids: Box::new(ids),
        }
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn store(&self) -> &Store<B> {
        &self.store
    }

    /// Loads the routine list from the store. Only the first call does
    /// anything; an unreadable store leaves the repository ready and empty
    #[instrument(skip(self))]
    pub fn load(&mut self) -> LoadState {
        if self.state != LoadState::Uninitialized {
            return self.state;
        }
        self.state = LoadState::Loading;
        self.routines = self.store.read_all();
        self.state = LoadState::Ready;
        info!("Loaded {} routines", self.routines.len());
        self.state
    }

    /// Drops the in-memory list and reads it again from the store
    #[instrument(skip(self))]
    pub fn reload(&mut self) -> Result<(), RepositoryError> {
        self.ensure_ready()?;
        self.state = LoadState::Loading;
        self.routines = self.store.read_all();
        self.state = LoadState::Ready;
        debug!("Reloaded {} routines", self.routines.len());
        Ok(())
    }

    pub fn routines(&self) -> Result<&[Routine], RepositoryError> {
        self.ensure_ready()?;
        Ok(&self.routines)
    }

    pub fn find_by_id(&self, id: &Uuid) -> Result<Option<&Routine>, RepositoryError> {
        self.ensure_ready()?;
        Ok(self.routines.iter().find(|r| r.id == *id))
    }

    #[instrument(skip(self))]
    pub fn create(
        &mut self,
        name: &str,
        description: Option<String>,
    ) -> Result<Routine, RepositoryError> {
        self.ensure_ready()?;
        RoutinePatch::default().name(name).validate()?;

        let id = self.fresh_id()?;
        let routine = Routine::new(id, name, description, self.clock.now());
        self.routines.push(routine.clone());
        info!(%id, "Created routine");

        self.persist()?;
        Ok(routine)
    }

    #[instrument(skip(self))]
    pub fn update(&mut self, id: &Uuid, patch: RoutinePatch) -> Result<Routine, RepositoryError> {
        self.ensure_ready()?;
        patch.validate()?;

        let now = self.clock.now();
        let routine = self.routine_mut(id)?;
        patch.apply(routine);
        routine.touch(now);
        let updated = routine.clone();

        self.persist()?;
        Ok(updated)
    }

    /// Removes the routine and all of its exercises. Deleting an id that
    /// isn't there succeeds without touching the store
    #[instrument(skip(self))]
    pub fn delete(&mut self, id: &Uuid) -> Result<(), RepositoryError> {
        self.ensure_ready()?;

        let before = self.routines.len();
        self.routines.retain(|r| r.id != *id);
        if self.routines.len() == before {
            debug!(%id, "Routine already gone");
            return Ok(());
        }
        info!(%id, "Deleted routine");
        self.persist()
    }

    #[instrument(skip(self))]
    pub fn add_exercise(
        &mut self,
        routine_id: &Uuid,
        exercise: NewExercise,
    ) -> Result<Exercise, RepositoryError> {
        self.ensure_ready()?;
        exercise.validate()?;
        self.routine_mut(routine_id)?;

        let id = self.fresh_id()?;
        let now = self.clock.now();
        let exercise = exercise.into_exercise(id);
        let routine = self.routine_mut(routine_id)?;
        routine.exercises.push(exercise.clone());
        routine.touch(now);
        debug!(%id, "Added exercise");

        self.persist()?;
        Ok(exercise)
    }

    #[instrument(skip(self))]
    pub fn update_exercise(
        &mut self,
        routine_id: &Uuid,
        exercise_id: &Uuid,
        patch: ExercisePatch,
    ) -> Result<Exercise, RepositoryError> {
        self.ensure_ready()?;
        patch.validate()?;

        let now = self.clock.now();
        let routine = self.routine_mut(routine_id)?;
        let exercise = routine
            .exercise_mut(exercise_id)
            .ok_or(RepositoryError::ExerciseNotFound {
                routine_id: *routine_id,
                exercise_id: *exercise_id,
            })?;
        patch.apply(exercise);
        let updated = exercise.clone();
        routine.touch(now);

        self.persist()?;
        Ok(updated)
    }

    /// Unlike [`Repository::delete`], a missing exercise is reported as
    /// [`RepositoryError::ExerciseNotFound`] and nothing changes
    #[instrument(skip(self))]
    pub fn delete_exercise(
        &mut self,
        routine_id: &Uuid,
        exercise_id: &Uuid,
    ) -> Result<(), RepositoryError> {
        self.ensure_ready()?;

        let now = self.clock.now();
        let routine = self.routine_mut(routine_id)?;
        routine
            .remove_exercise(exercise_id)
            .ok_or(RepositoryError::ExerciseNotFound {
                routine_id: *routine_id,
                exercise_id: *exercise_id,
            })?;
        routine.touch(now);

        self.persist()
    }

    /// Creates a routine for every template whose name isn't already taken
    /// (exact match). Template exercises get fresh ids. Returns only the
    /// routines that were created, so a second call with the same templates
    /// returns nothing
    #[instrument(skip_all, fields(templates = templates.len()))]
    pub fn seed_if_absent(
        &mut self,
        templates: &[RoutineTemplate],
    ) -> Result<Vec<Routine>, RepositoryError> {
        self.ensure_ready()?;
        for template in templates {
            template.validate()?;
        }

        let mut created = Vec::new();
        for template in templates {
            if self.routines.iter().any(|r| r.name == template.name) {
                debug!(name = %template.name, "Routine already exists, skipping template");
                continue;
            }
            let routine = self.instantiate(template)?;
            info!(id = %routine.id, name = %routine.name, "Seeded routine");
            created.push(routine);
            self.persist()?;
        }
        Ok(created)
    }

    /// Pushes a routine built from `template` onto the list. Exercise ids are
    /// drawn one at a time after the routine is in the list so each one is
    /// checked against everything generated before it
    fn instantiate(&mut self, template: &RoutineTemplate) -> Result<Routine, RepositoryError> {
        let id = self.fresh_id()?;
        self.routines.push(Routine::new(
            id,
            template.name.clone(),
            template.description.clone(),
            self.clock.now(),
        ));

        for exercise in &template.exercises {
            let exercise_id = match self.fresh_id() {
                Ok(exercise_id) => exercise_id,
                Err(e) => {
                    self.routines.pop();
                    return Err(e);
                }
            };
            if let Some(routine) = self.routines.last_mut() {
                routine
                    .exercises
                    .push(exercise.clone().into_exercise(exercise_id));
            }
        }

        Ok(self.routines[self.routines.len() - 1].clone())
    }

    fn ensure_ready(&self) -> Result<(), RepositoryError> {
        match self.state {
            LoadState::Ready => Ok(()),
            _ => Err(RepositoryError::NotReady),
        }
    }

    fn routine_mut(&mut self, id: &Uuid) -> Result<&mut Routine, RepositoryError> {
        self.routines
            .iter_mut()
            .find(|r| r.id == *id)
            .ok_or(RepositoryError::RoutineNotFound(*id))
    }

    fn is_taken(&self, id: &Uuid) -> bool {
        self.routines
            .iter()
            .any(|r| r.id == *id || r.exercises.iter().any(|e| e.id == *id))
    }

    /// Draws ids until one is free across every routine and exercise
    fn fresh_id(&mut self) -> Result<Uuid, RepositoryError> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = self.ids.next_id();
            if !self.is_taken(&id) {
                return Ok(id);
            }
            warn!(%id, "Generated id is already in use, drawing another");
        }
        Err(RepositoryError::IdsExhausted {
            attempts: MAX_ID_ATTEMPTS,
        })
    }

    /// Writes the whole in-memory list through to the store. On failure the
    /// in-memory change stays and the next successful write catches the store
    /// up
    fn persist(&mut self) -> Result<(), RepositoryError> {
        self.store
            .write_all(&self.routines)
            .map_err(RepositoryError::Write)
    }
}
