// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! The storage facade over an Engine Library.
//!
//! A library on disk is a directory with two database files, `m.db` (the
//! music catalog) and `p.db` (the performance data). A [`Database`] handle
//! attaches both files to one connection under the schema names `music` and
//! `perfdata`, detects and validates the schema version, and is the sole
//! conduit for row operations afterwards. The SQL issued for each operation
//! is shaped by the detected version: columns that a version does not carry
//! are omitted from statements and read back as `None`.
//!
//! The handle is synchronous and blocking, owns its connection exclusively
//! and holds no internal locking; concurrent processes are arbitrated by the
//! file locks of the underlying engine.

pub mod metadata;
pub mod performance;
pub mod track;

use crate::error::{Error, Result};
use crate::schema;
use crate::version::SchemaVersion;
use rusqlite::Connection;
use std::cell::Cell;
use std::path::Path;
use uuid::Uuid;

/// File name of the music store inside a library directory.
pub const MUSIC_DB_FILE: &str = "m.db";

/// File name of the performance store inside a library directory.
pub const PERF_DB_FILE: &str = "p.db";

/// An open Engine Library.
///
/// Dropping the handle (or calling [`Database::close`]) releases the
/// connection and every prepared statement; a closed handle cannot be
/// reopened.
#[derive(Debug)]
pub struct Database {
    conn: Connection,
    version: SchemaVersion,
    in_transaction: Cell<bool>,
}

impl Database {
    /// Opens an existing library directory.
    ///
    /// Detects the schema version from the `Information` rows and validates
    /// the catalog of both stores against the registry before returning.
    ///
    /// # Errors
    ///
    /// [`Error::LibraryNotFound`] if either database file is absent,
    /// [`Error::UnsupportedSchema`] if the version tuple is unknown, and
    /// [`Error::DatabaseInconsistency`] if the catalog diverges from the
    /// reference schema.
    pub fn open(directory: impl AsRef<Path>) -> Result<Self> {
        let directory = directory.as_ref();
        let music = directory.join(MUSIC_DB_FILE);
        let perf = directory.join(PERF_DB_FILE);
        if !music.is_file() || !perf.is_file() {
            return Err(Error::LibraryNotFound(directory.to_path_buf()));
        }
        let conn = attach(&music, &perf)?;
        let version = schema::detect(&conn)?;
        schema::validate(&conn, version)?;
        log::debug!(
            "opened library at {} (schema {version})",
            directory.display()
        );
        Ok(Self {
            conn,
            version,
            in_transaction: Cell::new(false),
        })
    }

    /// Creates a new library directory with empty stores at `version`.
    ///
    /// The directory is created if it does not exist yet.
    pub fn create(directory: impl AsRef<Path>, version: SchemaVersion) -> Result<Self> {
        let directory = directory.as_ref();
        std::fs::create_dir_all(directory)?;
        let conn = attach(
            &directory.join(MUSIC_DB_FILE),
            &directory.join(PERF_DB_FILE),
        )?;
        log::debug!(
            "creating library at {} (schema {version})",
            directory.display()
        );
        Self::initialize(conn, version)
    }

    /// Creates a library backed by two anonymous in-memory stores.
    pub fn create_in_memory(version: SchemaVersion) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(
            "ATTACH DATABASE ':memory:' AS music; ATTACH DATABASE ':memory:' AS perfdata;",
        )?;
        Self::initialize(conn, version)
    }

    fn initialize(conn: Connection, version: SchemaVersion) -> Result<Self> {
        let database = Self {
            conn,
            version,
            in_transaction: Cell::new(false),
        };
        let transaction = database.transaction()?;
        schema::create(&database.conn, version)?;
        transaction.commit()?;
        Ok(database)
    }

    /// The schema version this library was opened or created at.
    #[must_use]
    pub fn version(&self) -> SchemaVersion {
        self.version
    }

    /// Re-validates the catalog of both stores against the registry.
    pub fn verify(&self) -> Result<()> {
        schema::validate(&self.conn, self.version)
    }

    /// The stable identity of the library, generated once at creation time
    /// and shared by both stores.
    pub fn library_uuid(&self) -> Result<Uuid> {
        let mut stmt = self.conn.prepare("SELECT uuid FROM music.Information")?;
        let mut rows: Vec<Option<String>> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<_>>()?;
        match rows.len() {
            0 => Err(Error::DatabaseInconsistency(
                "music store has no Information row".to_string(),
            )),
            1 => match rows.remove(0) {
                Some(text) => Uuid::parse_str(&text).map_err(|err| {
                    Error::DatabaseInconsistency(format!("malformed library uuid: {err}"))
                }),
                None => Err(Error::DatabaseInconsistency(
                    "library uuid is unset".to_string(),
                )),
            },
            len => Err(Error::DatabaseInconsistency(format!(
                "music store has {len} Information rows"
            ))),
        }
    }

    /// Begins a scoped transaction.
    ///
    /// The returned guard commits on [`Transaction::commit`] and rolls back
    /// when dropped without a commit. Guards do not nest: while one guard is
    /// live, further guards are observers and their commit (or rollback) is
    /// a no-op.
    pub fn transaction(&self) -> Result<Transaction<'_>> {
        let outermost = !self.in_transaction.get();
        if outermost {
            self.conn.execute_batch("BEGIN EXCLUSIVE")?;
            self.in_transaction.set(true);
        }
        Ok(Transaction {
            db: self,
            outermost,
            committed: false,
        })
    }

    /// Closes the library, releasing the connection.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, err)| Error::Storage(err))
    }
}

fn attach(music: &Path, perf: &Path) -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    conn.execute(
        "ATTACH DATABASE ?1 AS music",
        [music.to_string_lossy().into_owned()],
    )?;
    conn.execute(
        "ATTACH DATABASE ?1 AS perfdata",
        [perf.to_string_lossy().into_owned()],
    )?;
    Ok(conn)
}

/// A scoped transaction on a [`Database`].
///
/// Only the outermost guard controls the actual transaction; inner guards
/// are observers.
#[derive(Debug)]
pub struct Transaction<'db> {
    db: &'db Database,
    outermost: bool,
    committed: bool,
}

impl Transaction<'_> {
    /// Commits the writes performed while the guard was live.
    pub fn commit(mut self) -> Result<()> {
        self.committed = true;
        if self.outermost {
            self.db.in_transaction.set(false);
            self.db.conn.execute_batch("COMMIT")?;
        }
        Ok(())
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if self.outermost && !self.committed {
            self.db.in_transaction.set(false);
            if let Err(err) = self.db.conn.execute_batch("ROLLBACK") {
                log::warn!("failed to roll back transaction: {err}");
            }
        }
    }
}
