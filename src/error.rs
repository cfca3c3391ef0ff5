// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Error types returned by this crate.

use crate::db::track::TrackId;
use crate::version::SemanticVersion;
use std::path::PathBuf;

/// Result type with [`Error`] as the error variant, used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that may be returned when working with an Engine Library.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The library directory or one of its database files does not exist.
    #[error("library not found at {}", .0.display())]
    LibraryNotFound(PathBuf),
    /// The schema version found in the `Information` rows is not registered.
    #[error("unsupported schema version {0}")]
    UnsupportedSchema(SemanticVersion),
    /// The database catalog does not match the reference schema, or the two
    /// stores disagree with each other.
    #[error("database inconsistency: {0}")]
    DatabaseInconsistency(String),
    /// A track row was requested that does not exist (anymore).
    #[error("track {0} does not exist")]
    TrackDeleted(TrackId),
    /// More than one row matched a key that must be unique per track.
    #[error("track database inconsistency: {0}")]
    TrackDatabaseInconsistency(String),
    /// A performance data blob violates its framing or length rules.
    #[error("corrupt blob: {0}")]
    CorruptBlob(String),
    /// A performance data blob carries an unknown leading format tag.
    #[error("unsupported blob format tag {0:#04x}")]
    UnsupportedBlobVersion(u8),
    /// An error reported by the underlying SQL engine.
    #[error(transparent)]
    Storage(#[from] rusqlite::Error),
    /// An I/O error outside of the SQL engine.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
