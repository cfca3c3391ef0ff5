// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Metadata rows of the music store.
//!
//! Tracks carry two parallel metadata tables, one string-typed (`MetaData`)
//! and one integer-typed (`MetaDataInteger`), both keyed by `(track id,
//! type)`. The type tags are closed enumerations, and several slots have
//! never been seen holding anything but a constant. The hardware refuses to
//! browse tracks whose slot set deviates from what its own importer writes,
//! so the canonical bulk writers reproduce that set exactly: every slot
//! present, the unknown slots carrying their observed literals, and (for the
//! integer table) the rows inserted in the same order the hardware uses.
//! Do not clean any of this up.

use crate::db::track::TrackId;
use crate::db::Database;
use crate::error::{Error, Result};
use parse_display::Display;

/// Type tags of the string-typed `MetaData` table.
///
/// The numbering has no slot 9; a canonical track carries 15 rows.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
#[display(style = "snake_case")]
#[repr(i64)]
pub enum MetadataType {
    /// Track title.
    Title = 1,
    /// Performing artist.
    Artist = 2,
    /// Album name.
    Album = 3,
    /// Genre name.
    Genre = 4,
    /// Free-form comment.
    Comment = 5,
    /// Publisher / record label.
    Publisher = 6,
    /// Composer.
    Composer = 7,
    /// Unknown slot, written as NULL.
    Unknown8 = 8,
    /// Playing time formatted as `MM:SS`.
    DurationMmSs = 10,
    /// Unknown slot, written as NULL.
    Unknown11 = 11,
    /// Whether the track has ever been played.
    EverPlayed = 12,
    /// Extension of the audio file.
    FileExtension = 13,
    /// Unknown slot, written as NULL.
    Unknown14 = 14,
    /// Unknown slot, always the literal string `"1"`.
    Unknown15 = 15,
    /// Unknown slot, always the literal string `"1"`.
    Unknown16 = 16,
}

impl MetadataType {
    /// All slots of a canonical track, in ascending type order.
    pub const ALL: [MetadataType; 15] = [
        MetadataType::Title,
        MetadataType::Artist,
        MetadataType::Album,
        MetadataType::Genre,
        MetadataType::Comment,
        MetadataType::Publisher,
        MetadataType::Composer,
        MetadataType::Unknown8,
        MetadataType::DurationMmSs,
        MetadataType::Unknown11,
        MetadataType::EverPlayed,
        MetadataType::FileExtension,
        MetadataType::Unknown14,
        MetadataType::Unknown15,
        MetadataType::Unknown16,
    ];

    /// The numeric tag stored in the `type` column.
    #[must_use]
    pub fn code(self) -> i64 {
        self as i64
    }

    /// Looks a slot up by its numeric tag.
    #[must_use]
    pub fn from_code(code: i64) -> Option<Self> {
        MetadataType::ALL.into_iter().find(|ty| ty.code() == code)
    }
}

/// Type tags of the integer-typed `MetaDataInteger` table.
///
/// A canonical track carries 12 rows.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
#[display(style = "snake_case")]
#[repr(i64)]
pub enum MetadataIntegerType {
    /// Timestamp of the last playback (seconds since the epoch).
    LastPlayedTimestamp = 1,
    /// Timestamp of the last file modification.
    LastModifiedTimestamp = 2,
    /// Timestamp of the last file access.
    LastAccessedTimestamp = 3,
    /// Musical key code.
    MusicalKey = 4,
    /// User rating (0-100 in steps of 20).
    Rating = 5,
    /// Unknown slot, written as NULL.
    Unknown6 = 6,
    /// Unknown slot, written as NULL.
    Unknown7 = 7,
    /// Unknown slot, written as NULL.
    Unknown8 = 8,
    /// Unknown slot, written as NULL.
    Unknown9 = 9,
    /// Hash of the last played state.
    LastPlayHash = 10,
    /// Unknown slot, always the integer `1`.
    Unknown11 = 11,
    /// Unknown slot, always the integer `1`.
    Unknown12 = 12,
}

impl MetadataIntegerType {
    /// All slots of a canonical track, in ascending type order.
    pub const ALL: [MetadataIntegerType; 12] = [
        MetadataIntegerType::LastPlayedTimestamp,
        MetadataIntegerType::LastModifiedTimestamp,
        MetadataIntegerType::LastAccessedTimestamp,
        MetadataIntegerType::MusicalKey,
        MetadataIntegerType::Rating,
        MetadataIntegerType::Unknown6,
        MetadataIntegerType::Unknown7,
        MetadataIntegerType::Unknown8,
        MetadataIntegerType::Unknown9,
        MetadataIntegerType::LastPlayHash,
        MetadataIntegerType::Unknown11,
        MetadataIntegerType::Unknown12,
    ];

    /// The numeric tag stored in the `type` column.
    #[must_use]
    pub fn code(self) -> i64 {
        self as i64
    }

    /// Looks a slot up by its numeric tag.
    #[must_use]
    pub fn from_code(code: i64) -> Option<Self> {
        MetadataIntegerType::ALL
            .into_iter()
            .find(|ty| ty.code() == code)
    }
}

/// The string metadata of one track, as written by the canonical writer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackMetadata {
    /// Track title.
    pub title: Option<String>,
    /// Performing artist.
    pub artist: Option<String>,
    /// Album name.
    pub album: Option<String>,
    /// Genre name.
    pub genre: Option<String>,
    /// Free-form comment.
    pub comment: Option<String>,
    /// Publisher / record label.
    pub publisher: Option<String>,
    /// Composer.
    pub composer: Option<String>,
    /// Playing time formatted as `MM:SS`.
    pub duration_mm_ss: Option<String>,
    /// Whether the track has ever been played.
    pub ever_played: Option<String>,
    /// Extension of the audio file.
    pub file_extension: Option<String>,
}

/// The integer metadata of one track, as written by the canonical writer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackIntegerMetadata {
    /// Musical key code.
    pub musical_key: Option<i64>,
    /// User rating (0-100 in steps of 20).
    pub rating: Option<i64>,
    /// Timestamp of the last playback.
    pub last_played_at: Option<i64>,
    /// Timestamp of the last file modification.
    pub last_modified_at: Option<i64>,
    /// Timestamp of the last file access.
    pub last_accessed_at: Option<i64>,
    /// Hash of the last played state.
    pub last_play_hash: Option<i64>,
}

/// Writes all 15 string slots in one statement, unknown literals included.
const CANONICAL_METADATA_SQL: &str =
    "INSERT OR REPLACE INTO music.MetaData ( id, type, text ) VALUES \
     ( ?1, 1, ?2 ), ( ?1, 2, ?3 ), ( ?1, 3, ?4 ), ( ?1, 4, ?5 ), ( ?1, 5, ?6 ), \
     ( ?1, 6, ?7 ), ( ?1, 7, ?8 ), ( ?1, 8, NULL ), ( ?1, 10, ?9 ), ( ?1, 11, NULL ), \
     ( ?1, 12, ?10 ), ( ?1, 13, ?11 ), ( ?1, 14, NULL ), ( ?1, 15, '1' ), ( ?1, 16, '1' )";

/// Writes all 12 integer slots in one statement, using the insertion order
/// observed from the hardware importer (4, 5, 1, 2, 3, 6, 8, 7, 9, 10, 11,
/// then 12).
const CANONICAL_INTEGER_METADATA_SQL: &str =
    "INSERT OR REPLACE INTO music.MetaDataInteger ( id, type, value ) VALUES \
     ( ?1, 4, ?2 ), ( ?1, 5, ?3 ), ( ?1, 1, ?4 ), ( ?1, 2, ?5 ), ( ?1, 3, ?6 ), \
     ( ?1, 6, NULL ), ( ?1, 8, NULL ), ( ?1, 7, NULL ), ( ?1, 9, NULL ), \
     ( ?1, 10, ?7 ), ( ?1, 11, 1 ), ( ?1, 12, 1 )";

impl Database {
    /// Reads one string metadata slot. `None` if the slot is absent or NULL.
    pub fn metadata(&self, id: TrackId, ty: MetadataType) -> Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT text FROM music.MetaData WHERE id = ?1 AND type = ?2")?;
        let mut rows: Vec<Option<String>> = stmt
            .query_map([id.0, ty.code()], |row| row.get(0))?
            .collect::<rusqlite::Result<_>>()?;
        match rows.len() {
            0 => Ok(None),
            1 => Ok(rows.remove(0)),
            len => Err(Error::TrackDatabaseInconsistency(format!(
                "{len} MetaData rows share id {id} and type {ty}"
            ))),
        }
    }

    /// Writes one string metadata slot, replacing any previous row.
    pub fn set_metadata(&self, id: TrackId, ty: MetadataType, text: Option<&str>) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO music.MetaData ( id, type, text ) VALUES ( ?1, ?2, ?3 )",
            rusqlite::params![id.0, ty.code(), text],
        )?;
        Ok(())
    }

    /// Reads every string metadata row of a track, NULL slots included,
    /// ordered by type.
    pub fn all_metadata(&self, id: TrackId) -> Result<Vec<(MetadataType, Option<String>)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT type, text FROM music.MetaData WHERE id = ?1 ORDER BY type")?;
        let rows: Vec<(i64, Option<String>)> = stmt
            .query_map([id.0], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<_>>()?;
        rows.into_iter()
            .map(|(code, text)| {
                let ty = MetadataType::from_code(code).ok_or_else(|| {
                    Error::DatabaseInconsistency(format!(
                        "unknown MetaData type {code} on track {id}"
                    ))
                })?;
                Ok((ty, text))
            })
            .collect()
    }

    /// Reads the string metadata rows of a track that hold a non-NULL text,
    /// ordered by type.
    pub fn populated_metadata(&self, id: TrackId) -> Result<Vec<(MetadataType, String)>> {
        let mut stmt = self.conn.prepare(
            "SELECT type, text FROM music.MetaData \
             WHERE id = ?1 AND text IS NOT NULL ORDER BY type",
        )?;
        let rows: Vec<(i64, String)> = stmt
            .query_map([id.0], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<_>>()?;
        rows.into_iter()
            .map(|(code, text)| {
                let ty = MetadataType::from_code(code).ok_or_else(|| {
                    Error::DatabaseInconsistency(format!(
                        "unknown MetaData type {code} on track {id}"
                    ))
                })?;
                Ok((ty, text))
            })
            .collect()
    }

    /// Replaces the complete string metadata of a track with the canonical
    /// 15-row set.
    ///
    /// The write is a single statement, so a reader either sees all slots or
    /// none of them.
    pub fn set_track_metadata(&self, id: TrackId, metadata: &TrackMetadata) -> Result<()> {
        self.conn.execute(
            CANONICAL_METADATA_SQL,
            rusqlite::params![
                id.0,
                metadata.title,
                metadata.artist,
                metadata.album,
                metadata.genre,
                metadata.comment,
                metadata.publisher,
                metadata.composer,
                metadata.duration_mm_ss,
                metadata.ever_played,
                metadata.file_extension,
            ],
        )?;
        Ok(())
    }

    /// Reads one integer metadata slot. `None` if the slot is absent or NULL.
    pub fn integer_metadata(
        &self,
        id: TrackId,
        ty: MetadataIntegerType,
    ) -> Result<Option<i64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM music.MetaDataInteger WHERE id = ?1 AND type = ?2")?;
        let mut rows: Vec<Option<i64>> = stmt
            .query_map([id.0, ty.code()], |row| row.get(0))?
            .collect::<rusqlite::Result<_>>()?;
        match rows.len() {
            0 => Ok(None),
            1 => Ok(rows.remove(0)),
            len => Err(Error::TrackDatabaseInconsistency(format!(
                "{len} MetaDataInteger rows share id {id} and type {ty}"
            ))),
        }
    }

    /// Writes one integer metadata slot, replacing any previous row.
    pub fn set_integer_metadata(
        &self,
        id: TrackId,
        ty: MetadataIntegerType,
        value: Option<i64>,
    ) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO music.MetaDataInteger ( id, type, value ) \
             VALUES ( ?1, ?2, ?3 )",
            rusqlite::params![id.0, ty.code(), value],
        )?;
        Ok(())
    }

    /// Reads every integer metadata row of a track, NULL slots included,
    /// ordered by type.
    pub fn all_integer_metadata(
        &self,
        id: TrackId,
    ) -> Result<Vec<(MetadataIntegerType, Option<i64>)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT type, value FROM music.MetaDataInteger WHERE id = ?1 ORDER BY type")?;
        let rows: Vec<(i64, Option<i64>)> = stmt
            .query_map([id.0], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<_>>()?;
        rows.into_iter()
            .map(|(code, value)| {
                let ty = MetadataIntegerType::from_code(code).ok_or_else(|| {
                    Error::DatabaseInconsistency(format!(
                        "unknown MetaDataInteger type {code} on track {id}"
                    ))
                })?;
                Ok((ty, value))
            })
            .collect()
    }

    /// Reads the integer metadata rows of a track that hold a non-NULL
    /// value, ordered by type.
    pub fn populated_integer_metadata(
        &self,
        id: TrackId,
    ) -> Result<Vec<(MetadataIntegerType, i64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT type, value FROM music.MetaDataInteger \
             WHERE id = ?1 AND value IS NOT NULL ORDER BY type",
        )?;
        let rows: Vec<(i64, i64)> = stmt
            .query_map([id.0], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<_>>()?;
        rows.into_iter()
            .map(|(code, value)| {
                let ty = MetadataIntegerType::from_code(code).ok_or_else(|| {
                    Error::DatabaseInconsistency(format!(
                        "unknown MetaDataInteger type {code} on track {id}"
                    ))
                })?;
                Ok((ty, value))
            })
            .collect()
    }

    /// Replaces the complete integer metadata of a track with the canonical
    /// 12-row set, issued as a single statement in the hardware insertion
    /// order.
    pub fn set_track_integer_metadata(
        &self,
        id: TrackId,
        metadata: &TrackIntegerMetadata,
    ) -> Result<()> {
        self.conn.execute(
            CANONICAL_INTEGER_METADATA_SQL,
            rusqlite::params![
                id.0,
                metadata.musical_key,
                metadata.rating,
                metadata.last_played_at,
                metadata.last_modified_at,
                metadata.last_accessed_at,
                metadata.last_play_hash,
            ],
        )?;
        Ok(())
    }
}
