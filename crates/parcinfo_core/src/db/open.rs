//! Connection factory for the inventory database.
//!
//! Every connection handed out has `foreign_keys=ON`: ownership links cascade
//! with their person or device, and a peripheral never points at a missing
//! device. Migrations are applied before the connection is returned.

use super::migrations::apply_migrations;
use super::DbResult;
use log::{error, info};
use rusqlite::Connection;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy)]
enum OpenMode {
    File,
    Memory,
}

impl Display for OpenMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::File => "file",
            Self::Memory => "memory",
        })
    }
}

/// Opens (creating if needed) the inventory file at `path`.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    connect(OpenMode::File, || Connection::open(path))
}

/// Throwaway inventory used by tests and demos.
pub fn open_db_in_memory() -> DbResult<Connection> {
    connect(OpenMode::Memory, Connection::open_in_memory)
}

fn connect(
    mode: OpenMode,
    open: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    let result: DbResult<Connection> = open()
        .map_err(Into::into)
        .and_then(|mut conn| prepare(&mut conn).map(|()| conn));
    let duration_ms = started_at.elapsed().as_millis();

    match &result {
        Ok(_) => info!("event=db_open module=db status=ok mode={mode} duration_ms={duration_ms}"),
        Err(err) => error!(
            "event=db_open module=db status=error mode={mode} duration_ms={duration_ms} error={err}"
        ),
    }
    result
}

fn prepare(conn: &mut Connection) -> DbResult<()> {
    conn.pragma_update(None, "foreign_keys", true)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    apply_migrations(conn)
}
