// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Track rows of the music store.

use crate::db::Database;
use crate::error::{Error, Result};
use crate::version::SchemaVersion;
use parse_display::Display;
use rusqlite::types::ToSql;

/// Identifies a track row.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
#[display("{0}")]
pub struct TrackId(pub i64);

/// A track row as the union of the fields of all supported versions.
///
/// Every field is optional; fields a schema version does not carry are
/// ignored on write and come back as `None` on read. Which field exists in
/// which version is decided by the storage facade, not by this type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Track {
    /// Position of the track in the manual play order.
    pub play_order: Option<i64>,
    /// Length of the track in seconds.
    pub length: Option<i64>,
    /// Length of the track in seconds as calculated during analysis.
    pub length_calculated: Option<i64>,
    /// Tempo in beats per minute, rounded to an integer.
    pub bpm: Option<i64>,
    /// Release year.
    pub year: Option<i64>,
    /// Path of the audio file, relative to the library directory.
    pub path: Option<String>,
    /// Name of the audio file.
    pub filename: Option<String>,
    /// Bitrate of the audio file in bits per second.
    pub bitrate: Option<i64>,
    /// Tempo in beats per minute as measured by the analyzer.
    pub bpm_analyzed: Option<f64>,
    /// Numeric track type tag.
    pub track_type: Option<i64>,
    /// Whether the track lives in another library.
    pub is_external_track: Option<bool>,
    /// UUID of the external library the track lives in.
    pub uuid_of_external_database: Option<String>,
    /// Id of the track inside the external library.
    pub id_track_in_external_database: Option<i64>,
    /// Id of the `AlbumArt` row holding the cover image.
    pub id_album_art: Option<i64>,
    /// Size of the audio file in bytes. Only stored from schema 1.13.0 on.
    pub file_bytes: Option<i64>,
    /// Key of the track in a Rekordbox PDB import. Only stored from schema
    /// 1.13.1 on.
    pub pdb_import_key: Option<i64>,
    /// URI of the audio file. Only stored from schema 1.15.0 on.
    pub uri: Option<String>,
    /// Whether the beat grid is locked against re-analysis. Only stored from
    /// schema 1.17.0 on.
    pub is_beatgrid_locked: Option<bool>,
}

static NONE: Option<i64> = None;

impl Track {
    /// Columns of the `Track` table in `version`, excluding the primary key.
    fn columns(version: SchemaVersion) -> Vec<&'static str> {
        let mut columns = vec![
            "playOrder",
            "length",
            "lengthCalculated",
            "bpm",
            "year",
            "path",
            "filename",
            "bitrate",
            "bpmAnalyzed",
            "trackType",
            "isExternalTrack",
            "uuidOfExternalDatabase",
            "idTrackInExternalDatabase",
            "idAlbumArt",
        ];
        if version.supports_file_bytes() {
            columns.push("fileBytes");
        }
        if version.supports_pdb_import_key() {
            columns.push("pdbImportKey");
        }
        if version.supports_uri() {
            columns.push("uri");
        }
        if version.supports_beatgrid_lock() {
            columns.push("isBeatGridLocked");
        }
        columns
    }

    fn bind(&self, column: &str) -> &dyn ToSql {
        match column {
            "playOrder" => &self.play_order,
            "length" => &self.length,
            "lengthCalculated" => &self.length_calculated,
            "bpm" => &self.bpm,
            "year" => &self.year,
            "path" => &self.path,
            "filename" => &self.filename,
            "bitrate" => &self.bitrate,
            "bpmAnalyzed" => &self.bpm_analyzed,
            "trackType" => &self.track_type,
            "isExternalTrack" => &self.is_external_track,
            "uuidOfExternalDatabase" => &self.uuid_of_external_database,
            "idTrackInExternalDatabase" => &self.id_track_in_external_database,
            "idAlbumArt" => &self.id_album_art,
            "fileBytes" => &self.file_bytes,
            "pdbImportKey" => &self.pdb_import_key,
            "uri" => &self.uri,
            "isBeatGridLocked" => &self.is_beatgrid_locked,
            _ => &NONE,
        }
    }

    fn from_row(row: &rusqlite::Row<'_>, columns: &[&str]) -> rusqlite::Result<Self> {
        let mut track = Track::default();
        for (index, column) in columns.iter().enumerate() {
            match *column {
                "playOrder" => track.play_order = row.get(index)?,
                "length" => track.length = row.get(index)?,
                "lengthCalculated" => track.length_calculated = row.get(index)?,
                "bpm" => track.bpm = row.get(index)?,
                "year" => track.year = row.get(index)?,
                "path" => track.path = row.get(index)?,
                "filename" => track.filename = row.get(index)?,
                "bitrate" => track.bitrate = row.get(index)?,
                "bpmAnalyzed" => track.bpm_analyzed = row.get(index)?,
                "trackType" => track.track_type = row.get(index)?,
                "isExternalTrack" => track.is_external_track = row.get(index)?,
                "uuidOfExternalDatabase" => {
                    track.uuid_of_external_database = row.get(index)?;
                }
                "idTrackInExternalDatabase" => {
                    track.id_track_in_external_database = row.get(index)?;
                }
                "idAlbumArt" => track.id_album_art = row.get(index)?,
                "fileBytes" => track.file_bytes = row.get(index)?,
                "pdbImportKey" => track.pdb_import_key = row.get(index)?,
                "uri" => track.uri = row.get(index)?,
                "isBeatGridLocked" => track.is_beatgrid_locked = row.get(index)?,
                _ => {}
            }
        }
        Ok(track)
    }
}

impl Database {
    /// Inserts a new track row and returns its id.
    ///
    /// Fields newer than the library's schema version are ignored.
    pub fn create_track(&self, track: &Track) -> Result<TrackId> {
        let columns = Track::columns(self.version);
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "INSERT INTO music.Track ( {} ) VALUES ( {} )",
            columns.join(", "),
            placeholders.join(", ")
        );
        let values: Vec<&dyn ToSql> = columns.iter().map(|column| track.bind(column)).collect();
        self.conn.execute(&sql, values.as_slice())?;
        let id = TrackId(self.conn.last_insert_rowid());
        log::trace!("created track {id}");
        Ok(id)
    }

    /// Reads the track row with the given id.
    ///
    /// # Errors
    ///
    /// [`Error::TrackDeleted`] if no row exists, and
    /// [`Error::TrackDatabaseInconsistency`] if more than one row matches.
    pub fn track(&self, id: TrackId) -> Result<Track> {
        let columns = Track::columns(self.version);
        let sql = format!(
            "SELECT {} FROM music.Track WHERE id = ?1",
            columns.join(", ")
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows: Vec<Track> = stmt
            .query_map([id.0], |row| Track::from_row(row, &columns))?
            .collect::<rusqlite::Result<_>>()?;
        match rows.len() {
            0 => Err(Error::TrackDeleted(id)),
            1 => Ok(rows.remove(0)),
            len => Err(Error::TrackDatabaseInconsistency(format!(
                "{len} Track rows share id {id}"
            ))),
        }
    }

    /// Overwrites the track row with the given id.
    pub fn update_track(&self, id: TrackId, track: &Track) -> Result<()> {
        let columns = Track::columns(self.version);
        let assignments: Vec<String> = columns
            .iter()
            .enumerate()
            .map(|(index, column)| format!("{column} = ?{}", index + 1))
            .collect();
        let sql = format!(
            "UPDATE music.Track SET {} WHERE id = ?{}",
            assignments.join(", "),
            columns.len() + 1
        );
        let mut values: Vec<&dyn ToSql> =
            columns.iter().map(|column| track.bind(column)).collect();
        values.push(&id.0);
        let changed = self.conn.execute(&sql, values.as_slice())?;
        if changed == 0 {
            return Err(Error::TrackDeleted(id));
        }
        Ok(())
    }

    /// Deletes the track row and everything hanging off it (metadata and
    /// performance data). The surrounding schema has no foreign keys, so the
    /// cascade is issued here, atomically.
    pub fn remove_track(&self, id: TrackId) -> Result<()> {
        let transaction = self.transaction()?;
        let removed = self
            .conn
            .execute("DELETE FROM music.Track WHERE id = ?1", [id.0])?;
        if removed == 0 {
            return Err(Error::TrackDeleted(id));
        }
        self.conn
            .execute("DELETE FROM music.MetaData WHERE id = ?1", [id.0])?;
        self.conn
            .execute("DELETE FROM music.MetaDataInteger WHERE id = ?1", [id.0])?;
        self.conn
            .execute("DELETE FROM perfdata.PerformanceData WHERE id = ?1", [id.0])?;
        transaction.commit()?;
        log::trace!("removed track {id}");
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_track() -> Track {
        Track {
            play_order: Some(1),
            length: Some(240),
            length_calculated: Some(240),
            bpm: Some(128),
            year: Some(2020),
            path: Some("/a/b.mp3".to_string()),
            filename: Some("b.mp3".to_string()),
            bitrate: Some(320_000),
            bpm_analyzed: Some(127.96),
            track_type: Some(1),
            is_external_track: Some(false),
            uuid_of_external_database: None,
            id_track_in_external_database: None,
            id_album_art: Some(1),
            file_bytes: Some(9_643_776),
            pdb_import_key: None,
            uri: Some("file:///a/b.mp3".to_string()),
            is_beatgrid_locked: Some(false),
        }
    }

    #[test]
    fn roundtrip_on_latest_schema() {
        let db = Database::create_in_memory(SchemaVersion::LATEST).unwrap();
        let track = sample_track();
        let id = db.create_track(&track).unwrap();
        assert_eq!(db.track(id).unwrap(), track);
    }

    #[test]
    fn newer_fields_are_projected_away() {
        let db = Database::create_in_memory(SchemaVersion::V1_7_1).unwrap();
        let track = sample_track();
        let id = db.create_track(&track).unwrap();
        let stored = db.track(id).unwrap();
        assert_eq!(stored.file_bytes, None);
        assert_eq!(stored.pdb_import_key, None);
        assert_eq!(stored.uri, None);
        assert_eq!(stored.is_beatgrid_locked, None);
        assert_eq!(stored.length, track.length);
        assert_eq!(stored.bpm_analyzed, track.bpm_analyzed);
    }

    #[test]
    fn update_overwrites_fields() {
        let db = Database::create_in_memory(SchemaVersion::LATEST).unwrap();
        let mut track = sample_track();
        let id = db.create_track(&track).unwrap();
        track.length = Some(241);
        db.update_track(id, &track).unwrap();
        assert_eq!(db.track(id).unwrap().length, Some(241));
    }

    #[test]
    fn reading_a_missing_track_fails() {
        let db = Database::create_in_memory(SchemaVersion::LATEST).unwrap();
        assert!(matches!(
            db.track(TrackId(999)),
            Err(Error::TrackDeleted(TrackId(999)))
        ));
    }

    #[test]
    fn remove_cascades() {
        let db = Database::create_in_memory(SchemaVersion::LATEST).unwrap();
        let id = db.create_track(&sample_track()).unwrap();
        db.set_metadata(id, crate::db::metadata::MetadataType::Title, Some("T"))
            .unwrap();
        db.set_performance_data(id, &Default::default()).unwrap();
        db.remove_track(id).unwrap();
        assert!(matches!(db.track(id), Err(Error::TrackDeleted(_))));
        assert!(db.all_metadata(id).unwrap().is_empty());
        // Absent performance data reads back as the default row.
        assert_eq!(
            db.performance_data(id).unwrap(),
            Default::default()
        );
    }
}
