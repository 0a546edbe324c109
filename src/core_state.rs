//! Shared application state.
//!
//! `CoreState` owns the single SQLite connection and the runtime config.
//! It is wrapped in `Arc` at startup and handed to the HTTP layer.

use std::sync::{Mutex, MutexGuard};

use rusqlite::Connection;

use crate::config::AppConfig;
use crate::db;

// ═══════════════════════════════════════════════════════════
// CoreState
// ═══════════════════════════════════════════════════════════

pub struct CoreState {
    /// One connection, serialized by the mutex. Each store call is its own
    /// statement; callers hold the guard only for the duration of one
    /// workflow operation.
    db: Mutex<Connection>,
    pub config: AppConfig,
}

impl CoreState {
    pub fn new(conn: Connection, config: AppConfig) -> Self {
        Self {
            db: Mutex::new(conn),
            config,
        }
    }

    /// Open (and migrate) the database named by `config.db_path`.
    pub fn open(config: AppConfig) -> Result<Self, CoreError> {
        let conn = db::open_database(&config.db_path)?;
        tracing::info!(path = %config.db_path.display(), "Database opened");
        Ok(Self::new(conn, config))
    }

    /// Acquire the connection.
    pub fn lock_db(&self) -> Result<MutexGuard<'_, Connection>, CoreError> {
        self.db.lock().map_err(|_| CoreError::LockPoisoned)
    }

    /// Run `f` with the connection held.
    pub fn with_db<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Connection) -> Result<T, E>,
        E: From<CoreError>,
    {
        let conn = self.lock_db()?;
        f(&conn)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Internal lock error")]
    LockPoisoned,
    #[error("Database error: {0}")]
    Database(#[from] db::DatabaseError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn test_config(path: std::path::PathBuf) -> AppConfig {
        AppConfig::from_lookup(|key| match key {
            "HMS_DB_PATH" => Some(path.display().to_string()),
            _ => None,
        })
        .unwrap()
    }

    #[test]
    fn with_db_runs_against_connection() {
        let conn = db::open_memory_database().unwrap();
        let state = CoreState::new(conn, test_config("unused.db".into()));
        let count: i64 = state
            .with_db(|conn| {
                conn.query_row("SELECT COUNT(*) FROM employee_category", [], |row| row.get(0))
                    .map_err(|e| CoreError::Database(e.into()))
            })
            .unwrap();
        assert_eq!(count, 3);
    }

    #[test]
    fn open_creates_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("hms.db");
        let state = CoreState::open(test_config(path.clone())).unwrap();
        assert!(path.exists());
        assert!(state.lock_db().is_ok());
    }
}
