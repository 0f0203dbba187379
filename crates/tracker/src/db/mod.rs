use shared::{
    error::ValidationError,
    model::{constants::ROUTINES_SLOT, validate_collection, Routine},
    types::Uuid,
};
use thiserror::Error;
use tracing::{debug, error, instrument};

pub mod backend;
use backend::{check_key, BackendError, StorageBackend};

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Malformed json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Invalid(#[from] ValidationError),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Stored routines couldn't be decoded: {0}")]
    Decode(#[from] DecodeError),
    #[error("Stored routines couldn't be read: {0}")]
    Read(#[source] BackendError),
    #[error("Routines couldn't be encoded: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("Routines couldn't be written: {0}")]
    Write(#[source] BackendError),
    #[error("Routines weren't written: {0}")]
    Invalid(#[source] ValidationError),
    #[error("Routine {0} is already stored")]
    Duplicate(Uuid),
}

/// The full routine collection serialized into a single slot. Every change
/// rewrites the whole slot
#[derive(Debug)]
pub struct Store<B> {
    backend: B,
    slot: String,
}

impl<B: StorageBackend> Store<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            slot: ROUTINES_SLOT.to_owned(),
        }
    }

    pub fn with_slot<T: Into<String>>(backend: B, slot: T) -> Result<Self, BackendError> {
        let slot = slot.into();
        check_key(&slot)?;
        Ok(Self { backend, slot })
    }

    /// The stored blob exactly as it sits in the slot
    pub fn raw(&self) -> Result<Option<String>, StoreError> {
        self.backend.get(&self.slot).map_err(StoreError::Read)
    }

    /// Reads and validates the stored collection, reporting what went wrong
    #[instrument(skip(self), fields(slot = %self.slot))]
    pub fn try_read_all(&self) -> Result<Vec<Routine>, StoreError> {
        let Some(data) = self.raw()? else {
            debug!("Nothing stored yet");
            return Ok(Vec::new());
        };
        decode(&data).map_err(StoreError::from)
    }

    /// Reads the stored collection. Anything unreadable is logged and treated
    /// as an empty collection
    pub fn read_all(&self) -> Vec<Routine> {
        self.try_read_all().unwrap_or_else(|e| {
            error!("Error loading routines, starting empty: {e}");
            Vec::new()
        })
    }

    /// Replaces the stored collection. A collection that wouldn't read back
    /// is rejected and the slot is left as it was
    #[instrument(skip(self, routines), fields(slot = %self.slot, count = routines.len()))]
    pub fn write_all(&mut self, routines: &[Routine]) -> Result<(), StoreError> {
        validate_collection(routines).map_err(|e| {
            error!("Refusing to save invalid routines: {e}");
            StoreError::Invalid(e)
        })?;
        let data = serde_json::to_string(routines).map_err(StoreError::Encode)?;
        self.backend.set(&self.slot, &data).map_err(|e| {
            error!("Error saving routines: {e}");
            StoreError::Write(e)
        })
    }

    pub fn insert(&mut self, routine: Routine) -> Result<(), StoreError> {
        let mut routines = self.read_all();
        if routines.iter().any(|r| r.id == routine.id) {
            return Err(StoreError::Duplicate(routine.id));
        }
        routines.push(routine);
        self.write_all(&routines)
    }

    /// Swaps in `routine` for the stored one with the same id. Returns false
    /// without writing if there isn't one
    pub fn replace(&mut self, routine: Routine) -> Result<bool, StoreError> {
        let mut routines = self.read_all();
        match routines.iter_mut().find(|r| r.id == routine.id) {
            Some(stored) => *stored = routine,
            None => return Ok(false),
        }
        self.write_all(&routines)?;
        Ok(true)
    }

    /// Returns false without writing if nothing had that id
    pub fn delete_by_id(&mut self, id: &Uuid) -> Result<bool, StoreError> {
        let mut routines = self.read_all();
        let before = routines.len();
        routines.retain(|r| r.id != *id);
        if routines.len() == before {
            return Ok(false);
        }
        self.write_all(&routines)?;
        Ok(true)
    }

    pub fn find_by_id(&self, id: &Uuid) -> Option<Routine> {
        self.read_all().into_iter().find(|r| r.id == *id)
    }
}

/// Typed decode followed by the model rules, so a blob of the right shape but
/// with impossible values is rejected as well
fn decode(data: &str) -> Result<Vec<Routine>, DecodeError> {
    let routines: Vec<Routine> = serde_json::from_str(data)?;
    validate_collection(&routines)?;
    Ok(routines)
}

#[cfg(test)]
mod test {
    use chrono::{TimeZone, Utc};
    use shared::model::NewExercise;

    use super::{backend::MemoryBackend, *};

    fn routine(n: u128, name: &str) -> Routine {
        let now = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
        let mut routine = Routine::new(Uuid::from_u128(n), name, None, now);
        routine.exercises.push(
            NewExercise::new("Squat", 3, 8)
                .with_weight(42.5)
                .into_exercise(Uuid::from_u128(n + 1000)),
        );
        routine
    }

    fn store_with(data: &str) -> Store<MemoryBackend> {
        let mut backend = MemoryBackend::default();
        backend.set(ROUTINES_SLOT, data).unwrap();
        Store::new(backend)
    }

    #[test]
    fn test_empty_slot_reads_empty() {
        let store = Store::new(MemoryBackend::default());
        assert!(store.try_read_all().unwrap().is_empty());
        assert!(store.read_all().is_empty());
    }

    #[test]
    fn test_malformed_blob_recovers_empty() {
        for data in [
            "not json",
            "{\"id\": 1}",
            "[{\"name\": \"missing fields\"}]",
        ] {
            let store = store_with(data);
            assert!(matches!(
                store.try_read_all(),
                Err(StoreError::Decode(DecodeError::Json(_)))
            ));
            assert!(store.read_all().is_empty());
        }
    }

    #[test]
    fn test_invalid_values_are_decode_errors() {
        let mut bad = routine(1, "Leg Day");
        bad.exercises[0].sets = 0;
        let store = store_with(&serde_json::to_string(&[bad]).unwrap());
        assert!(matches!(
            store.try_read_all(),
            Err(StoreError::Decode(DecodeError::Invalid(_)))
        ));
        assert!(store.read_all().is_empty());

        let twice = routine(1, "Leg Day");
        let store = store_with(&serde_json::to_string(&[twice.clone(), twice]).unwrap());
        assert!(store.try_read_all().is_err());
    }

    #[test]
    fn test_write_read_round_trip_is_stable() {
        let mut store = Store::new(MemoryBackend::default());
        let routines = vec![routine(1, "Leg Day"), routine(2, "Push")];
        store.write_all(&routines).unwrap();
        let first = store.raw().unwrap();

        let read = store.read_all();
        assert_eq!(read, routines);

        store.write_all(&read).unwrap();
        assert_eq!(store.raw().unwrap(), first);
        assert_eq!(store.read_all(), routines);
    }

    #[test]
    fn test_timestamps_keep_subsecond_precision() {
        let mut store = Store::new(MemoryBackend::default());
        let original = routine(1, "Leg Day");
        store.write_all(&[original.clone()]).unwrap();
        let read = store.read_all();
        assert_eq!(read[0].created_at, original.created_at);
        assert_eq!(read[0].updated_at.timestamp_subsec_nanos(), 123_456_789);
    }

    #[test]
    fn test_failed_write_keeps_previous_blob() {
        let mut store = Store::new(MemoryBackend::with_quota(2048));
        store.write_all(&[routine(1, "Leg Day")]).unwrap();

        let huge = "x".repeat(4096);
        let err = store.write_all(&[routine(2, &huge)]).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Write(BackendError::QuotaExceeded { .. })
        ));
        assert_eq!(store.read_all(), vec![routine(1, "Leg Day")]);
    }

    #[test]
    fn test_convenience_operations() {
        let mut store = Store::new(MemoryBackend::default());
        store.insert(routine(1, "Leg Day")).unwrap();
        store.insert(routine(2, "Push")).unwrap();
        assert!(matches!(
            store.insert(routine(1, "Again")),
            Err(StoreError::Duplicate(_))
        ));

        let mut renamed = routine(2, "Push Day");
        renamed.description = Some("Chest and shoulders".into());
        assert!(store.replace(renamed.clone()).unwrap());
        assert!(!store.replace(routine(3, "Ghost")).unwrap());
        assert_eq!(store.find_by_id(&Uuid::from_u128(2)), Some(renamed));

        assert!(store.delete_by_id(&Uuid::from_u128(1)).unwrap());
        assert!(!store.delete_by_id(&Uuid::from_u128(1)).unwrap());
        assert_eq!(store.find_by_id(&Uuid::from_u128(1)), None);
        assert_eq!(store.read_all().len(), 1);
    }

    #[test]
    fn test_invalid_routines_are_never_written() {
        let mut store = Store::new(MemoryBackend::default());
        store.insert(routine(1, "Leg Day")).unwrap();
        let before = store.raw().unwrap();

        let mut zero_sets = routine(2, "Push");
        zero_sets.exercises[0].sets = 0;
        assert!(matches!(
            store.insert(zero_sets),
            Err(StoreError::Invalid(_))
        ));

        assert!(matches!(
            store.insert(routine(3, "  ")),
            Err(StoreError::Invalid(_))
        ));

        // Exercise id already used inside routine 1
        let mut shared_exercise = routine(4, "Pull");
        shared_exercise.exercises[0].id = Uuid::from_u128(1001);
        assert!(matches!(
            store.insert(shared_exercise),
            Err(StoreError::Invalid(_))
        ));

        assert_eq!(store.raw().unwrap(), before);
        assert_eq!(store.read_all(), vec![routine(1, "Leg Day")]);
    }

    #[test]
    fn test_custom_slot_key_is_checked() {
        assert!(Store::with_slot(MemoryBackend::default(), "other-slot").is_ok());
        assert!(Store::with_slot(MemoryBackend::default(), "bad/slot").is_err());
    }
}
