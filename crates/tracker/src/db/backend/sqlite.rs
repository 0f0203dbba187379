use std::{ffi::c_int, path::Path, sync::Once};

use chrono::{SecondsFormat, Utc};
use include_dir::{include_dir, Dir};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use rusqlite_migration::{Migrations, SchemaVersion};
use tracing::{debug, error, info, instrument, span, trace, warn, Level};

use super::{check_key, BackendError, StorageBackend};

static MIGRATIONS_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/migrations");

fn sqlite_connection_trace_callback(query: &str) {
    trace!(target: "sqlite_tracing", query);
}

fn sqlite_log_callback(sqlite_code: c_int, msg: &str) {
    use rusqlite::ffi;
    let err_code = ffi::Error::new(sqlite_code);

    // See https://www.sqlite.org/rescode.html for description of result codes.
    match sqlite_code & 0xff {
        ffi::SQLITE_NOTICE => info!(target: "sqlite", msg, %err_code, "SQLITE NOTICE"),
        ffi::SQLITE_WARNING => warn!(target: "sqlite", msg, %err_code, "SQLITE WARNING"),
        _ => error!(target: "sqlite", msg, %err_code, "SQLITE ERROR"),
    };
}

pub fn get_migrations() -> Result<Migrations<'static>, BackendError> {
    Migrations::from_directory(&MIGRATIONS_DIR)
        .map_err(|e| BackendError::Migration(format!("Migrations::from_directory: {e:?}")))
}

/// Slots kept as rows of a single sqlite table
#[derive(Debug)]
pub struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    #[instrument]
    pub fn open<P: AsRef<Path> + std::fmt::Debug>(path: P) -> Result<Self, BackendError> {
        // Configure the log callback before opening the database
        static CONFIG_LOG: Once = Once::new();
        let mut config_result = Ok(());
        CONFIG_LOG.call_once(|| unsafe {
            config_result = rusqlite::trace::config_log(Some(sqlite_log_callback));
        });
        config_result?;

        let open_flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX
            | OpenFlags::SQLITE_OPEN_CREATE;

        let conn = Connection::open_with_flags(path, open_flags)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, BackendError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(mut conn: Connection) -> Result<Self, BackendError> {
        configure_connection(&mut conn)?;
        let ran = run_migrations(&mut conn)?;
        debug!("Ran {ran} slot migrations");
        Ok(Self { conn })
    }
}

#[instrument(skip(conn))]
fn configure_connection(conn: &mut Connection) -> Result<(), BackendError> {
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;

    if cfg!(debug_assertions) {
        conn.trace(Some(sqlite_connection_trace_callback));
    }
    Ok(())
}

fn schema_version(
    migrations: &Migrations<'static>,
    conn: &Connection,
) -> Result<usize, BackendError> {
    match migrations
        .current_version(conn)
        .map_err(|e| BackendError::Migration(format!("Migrations::current_version: {e:?}")))?
    {
        SchemaVersion::Inside(n) => Ok(n.into()),
        SchemaVersion::Outside(n) => Err(BackendError::Migration(format!(
            "Schema version {n} is outside of known schema migrations. Manual intervention required"
        ))),
        SchemaVersion::NoneSet => Ok(0),
    }
}

fn run_migrations(conn: &mut Connection) -> Result<usize, BackendError> {
    let _span = span!(Level::INFO, "Running migrations").entered();
    let migrations = get_migrations()?;

    let initial_version = schema_version(&migrations, conn)?;
    migrations
        .to_latest(conn)
        .map_err(|e| BackendError::Migration(format!("Migrations::to_latest: {e:?}")))?;
    let final_version = schema_version(&migrations, conn)?;

    Ok(final_version - initial_version)
}

impl StorageBackend for SqliteBackend {
    fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        check_key(key)?;
        let mut stmt = self
            .conn
            .prepare_cached("SELECT value FROM slot WHERE key = ?1")?;
        Ok(stmt.query_row(params![key], |row| row.get(0)).optional()?)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), BackendError> {
        check_key(key)?;
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                r#"
                INSERT INTO slot (key, value, updated_date)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_date = excluded.updated_date
                "#,
            )?;
            stmt.execute(params![key, value, now])?;
        }
        tx.commit()?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), BackendError> {
        check_key(key)?;
        self.conn
            .execute("DELETE FROM slot WHERE key = ?1", params![key])?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_migrations_are_valid() {
        get_migrations().unwrap().validate().unwrap();
    }

    #[test]
    fn test_upsert_replaces_value() {
        let mut backend = SqliteBackend::open_in_memory().unwrap();
        assert_eq!(backend.get("gym-routines").unwrap(), None);

        backend.set("gym-routines", "[]").unwrap();
        backend.set("gym-routines", "[{}]").unwrap();
        assert_eq!(backend.get("gym-routines").unwrap().as_deref(), Some("[{}]"));

        let rows: i64 = backend
            .conn
            .query_row("SELECT COUNT(*) FROM slot", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);

        backend.remove("gym-routines").unwrap();
        assert_eq!(backend.get("gym-routines").unwrap(), None);
    }

    #[test]
    fn test_reopen_keeps_values_and_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routines.sqlite");

        SqliteBackend::open(&path)
            .unwrap()
            .set("gym-app-user", "Dario")
            .unwrap();

        let backend = SqliteBackend::open(&path).unwrap();
        assert_eq!(backend.get("gym-app-user").unwrap().as_deref(), Some("Dario"));
    }
}
