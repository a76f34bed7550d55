//! Shared request state.
//!
//! One SQLite connection guarded by a mutex; handlers build short-lived
//! services over it for the duration of one call.

use parcinfo_core::db::{open_db, open_db_in_memory, DbResult};
use parcinfo_core::{
    AppareilService, PeripheriqueService, PersonneService, SqliteAppareilRepository,
    SqlitePeripheriqueRepository, SqlitePersonneRepository,
};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

pub type Peripheriques<'conn> =
    PeripheriqueService<SqlitePeripheriqueRepository<'conn>, SqliteAppareilRepository<'conn>>;

#[derive(Clone)]
pub struct AppState {
    conn: Arc<Mutex<Connection>>,
}

impl AppState {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Opens (and migrates) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    pub fn in_memory() -> DbResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    pub fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> T) -> T {
        // Multi-statement writes are transactional; a poisoned lock holds no
        // partial write.
        let guard = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    pub fn appareils<T>(
        &self,
        f: impl FnOnce(&AppareilService<SqliteAppareilRepository<'_>>) -> T,
    ) -> T {
        self.with_conn(|conn| f(&AppareilService::new(SqliteAppareilRepository::new(conn))))
    }

    pub fn personnes<T>(
        &self,
        f: impl FnOnce(&PersonneService<SqlitePersonneRepository<'_>>) -> T,
    ) -> T {
        self.with_conn(|conn| f(&PersonneService::new(SqlitePersonneRepository::new(conn))))
    }

    pub fn peripheriques<T>(&self, f: impl FnOnce(&Peripheriques<'_>) -> T) -> T {
        self.with_conn(|conn| {
            f(&PeripheriqueService::new(
                SqlitePeripheriqueRepository::new(conn),
                SqliteAppareilRepository::new(conn),
            ))
        })
    }
}
