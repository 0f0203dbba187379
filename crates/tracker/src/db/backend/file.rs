use std::{
    fs::{self, File},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use tracing::{debug, instrument, warn};

use super::{check_key, BackendError, StorageBackend};

/// One json file per slot inside a data directory
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    #[instrument]
    pub fn open<P: AsRef<Path> + std::fmt::Debug>(dir: P) -> Result<Self, BackendError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        debug!("Using data dir {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl StorageBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        check_key(key)?;
        match fs::read_to_string(self.slot_path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self, value), fields(len = value.len()))]
    fn set(&mut self, key: &str, value: &str) -> Result<(), BackendError> {
        check_key(key)?;
        let path = self.slot_path(key);
        let tmp_path = path.with_extension(format!("tmp.{}", std::process::id()));

        // Write to the side then rename over the slot so a reader never sees
        // a partial value
        let written = File::create(&tmp_path).and_then(|mut file| {
            file.write_all(value.as_bytes())?;
            file.sync_all()
        });
        if let Err(e) = written.and_then(|_| fs::rename(&tmp_path, &path)) {
            if let Err(cleanup) = fs::remove_file(&tmp_path) {
                if cleanup.kind() != ErrorKind::NotFound {
                    warn!(?cleanup, "Failed to remove temp file {}", tmp_path.display());
                }
            }
            return Err(e.into());
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), BackendError> {
        check_key(key)?;
        match fs::remove_file(self.slot_path(key)) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = FileBackend::open(dir.path().join("nested")).unwrap();

        assert_eq!(backend.get("gym-routines").unwrap(), None);
        backend.set("gym-routines", "[]").unwrap();
        backend.set("gym-routines", "[1]").unwrap();
        assert_eq!(backend.get("gym-routines").unwrap().as_deref(), Some("[1]"));

        // Only the slot file is left behind
        let files = fs::read_dir(backend.dir()).unwrap().count();
        assert_eq!(files, 1);

        backend.remove("gym-routines").unwrap();
        backend.remove("gym-routines").unwrap();
        assert_eq!(backend.get("gym-routines").unwrap(), None);
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        FileBackend::open(dir.path())
            .unwrap()
            .set("gym-app-user", "Dario")
            .unwrap();

        let backend = FileBackend::open(dir.path()).unwrap();
        assert_eq!(backend.get("gym-app-user").unwrap().as_deref(), Some("Dario"));
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = FileBackend::open(dir.path()).unwrap();
        assert!(matches!(
            backend.set("../escape", "x"),
            Err(BackendError::InvalidKey(_))
        ));
    }
}
