// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! # enginecrate
//!
//! Library for reading and writing the Denon Engine Library databases used
//! by standalone DJ players.
//!
//! An Engine Library is a directory holding two SQLite files that share a
//! schema version: `m.db`, the music catalog (tracks, crates, metadata), and
//! `p.db`, the performance database (waveforms, beat grids, cues, loops).
//! The firmware revisions changed both the relational schemas and the binary
//! layout of the performance blobs over time, so this crate keeps a registry
//! of frozen schema versions and dispatches on the version found in a
//! library.
//!
//! ```no_run
//! use enginecrate::db::track::Track;
//! use enginecrate::db::Database;
//! use enginecrate::version::SchemaVersion;
//!
//! # fn main() -> enginecrate::Result<()> {
//! let db = Database::create("Engine Library", SchemaVersion::LATEST)?;
//! let id = db.create_track(&Track {
//!     length: Some(240),
//!     filename: Some("b.mp3".to_string()),
//!     ..Track::default()
//! })?;
//! assert_eq!(db.track(id)?.length, Some(240));
//! # Ok(())
//! # }
//! ```

#![warn(rust_2018_idioms)]
#![warn(missing_debug_implementations)]
#![warn(missing_docs)]

pub mod blob;
pub mod db;
pub mod error;
mod schema;
pub mod util;
pub mod version;

pub use error::{Error, Result};
