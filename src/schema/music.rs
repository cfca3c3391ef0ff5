// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Reference catalog of the music store (`m.db`).
//!
//! The table set is stable across the supported versions; the differences
//! are limited to columns added to `Track` over time, the `CopiedTrack`
//! table appearing with 1.9.1, and the declared type of boolean columns in
//! the two 1.18.0 variants.

use super::{information_table, ColumnDesc, IndexDesc, TableDesc};
use crate::version::SchemaVersion;

/// Builds the music store catalog for `version`.
pub(crate) fn tables(version: SchemaVersion) -> Vec<TableDesc> {
    let boolean = version.boolean_column_type();

    let mut track_columns = vec![
        ColumnDesc::primary_key("id"),
        ColumnDesc::new("playOrder", "INTEGER"),
        ColumnDesc::new("length", "INTEGER"),
        ColumnDesc::new("lengthCalculated", "INTEGER"),
        ColumnDesc::new("bpm", "INTEGER"),
        ColumnDesc::new("year", "INTEGER"),
        ColumnDesc::new("path", "TEXT"),
        ColumnDesc::new("filename", "TEXT"),
        ColumnDesc::new("bitrate", "INTEGER"),
        ColumnDesc::new("bpmAnalyzed", "DOUBLE"),
        ColumnDesc::new("trackType", "INTEGER"),
        ColumnDesc::new("isExternalTrack", boolean),
        ColumnDesc::new("uuidOfExternalDatabase", "TEXT"),
        ColumnDesc::new("idTrackInExternalDatabase", "INTEGER"),
        ColumnDesc::new("idAlbumArt", "INTEGER"),
    ];
    if version.supports_file_bytes() {
        track_columns.push(ColumnDesc::new("fileBytes", "INTEGER"));
    }
    if version.supports_pdb_import_key() {
        track_columns.push(ColumnDesc::new("pdbImportKey", "INTEGER"));
    }
    if version.supports_uri() {
        track_columns.push(ColumnDesc::new("uri", "TEXT"));
    }
    if version.supports_beatgrid_lock() {
        track_columns.push(ColumnDesc::new("isBeatGridLocked", boolean));
    }

    let mut tables = vec![
        information_table(),
        TableDesc {
            name: "Track",
            columns: track_columns,
            indices: vec![
                IndexDesc::plain("index_Track_id", &["id"]),
                IndexDesc::plain("index_Track_path", &["path"]),
                IndexDesc::plain("index_Track_filename", &["filename"]),
                IndexDesc::plain("index_Track_isExternalTrack", &["isExternalTrack"]),
                IndexDesc::plain(
                    "index_Track_uuidOfExternalDatabase",
                    &["uuidOfExternalDatabase"],
                ),
            ],
        },
        TableDesc {
            name: "MetaData",
            columns: vec![
                ColumnDesc::in_primary_key("id", "INTEGER", 1),
                ColumnDesc::in_primary_key("type", "INTEGER", 2),
                ColumnDesc::new("text", "TEXT"),
            ],
            indices: vec![
                IndexDesc::primary_key_auto("sqlite_autoindex_MetaData_1", &["id", "type"]),
                IndexDesc::plain("index_MetaData_id", &["id"]),
                IndexDesc::plain("index_MetaData_type", &["type"]),
                IndexDesc::plain("index_MetaData_text", &["text"]),
            ],
        },
        TableDesc {
            name: "MetaDataInteger",
            columns: vec![
                ColumnDesc::in_primary_key("id", "INTEGER", 1),
                ColumnDesc::in_primary_key("type", "INTEGER", 2),
                ColumnDesc::new("value", "INTEGER"),
            ],
            indices: vec![
                IndexDesc::primary_key_auto(
                    "sqlite_autoindex_MetaDataInteger_1",
                    &["id", "type"],
                ),
                IndexDesc::plain("index_MetaDataInteger_id", &["id"]),
                IndexDesc::plain("index_MetaDataInteger_type", &["type"]),
            ],
        },
        TableDesc {
            name: "AlbumArt",
            columns: vec![
                ColumnDesc::primary_key("id"),
                ColumnDesc::new("hash", "TEXT"),
                ColumnDesc::new("albumArt", "BLOB"),
            ],
            indices: vec![
                IndexDesc::plain("index_AlbumArt_id", &["id"]),
                IndexDesc::plain("index_AlbumArt_hash", &["hash"]),
            ],
        },
        TableDesc {
            name: "Crate",
            columns: vec![
                ColumnDesc::primary_key("id"),
                ColumnDesc::new("title", "TEXT"),
                ColumnDesc::new("path", "TEXT"),
            ],
            indices: vec![
                IndexDesc::plain("index_Crate_id", &["id"]),
                IndexDesc::plain("index_Crate_path", &["path"]),
            ],
        },
        TableDesc {
            name: "CrateParentList",
            columns: vec![
                ColumnDesc::new("crateOriginId", "INTEGER"),
                ColumnDesc::new("crateParentId", "INTEGER"),
            ],
            indices: vec![IndexDesc::plain(
                "index_CrateParentList_crateOriginId",
                &["crateOriginId"],
            )],
        },
        TableDesc {
            name: "CrateTrackList",
            columns: vec![
                ColumnDesc::new("crateId", "INTEGER"),
                ColumnDesc::new("trackId", "INTEGER"),
            ],
            indices: vec![
                IndexDesc::plain("index_CrateTrackList_crateId", &["crateId"]),
                IndexDesc::plain("index_CrateTrackList_trackId", &["trackId"]),
            ],
        },
        TableDesc {
            name: "Playlist",
            columns: vec![
                ColumnDesc::primary_key("id"),
                ColumnDesc::new("title", "TEXT"),
            ],
            indices: vec![IndexDesc::plain("index_Playlist_id", &["id"])],
        },
        TableDesc {
            name: "PlaylistTrackList",
            columns: vec![
                ColumnDesc::new("playlistId", "INTEGER"),
                ColumnDesc::new("trackId", "INTEGER"),
                ColumnDesc::new("trackIdInOriginDatabase", "INTEGER"),
                ColumnDesc::new("databaseUuid", "TEXT"),
                ColumnDesc::new("trackNumber", "INTEGER"),
            ],
            indices: vec![
                IndexDesc::plain("index_PlaylistTrackList_playlistId", &["playlistId"]),
                IndexDesc::plain("index_PlaylistTrackList_trackId", &["trackId"]),
            ],
        },
        TableDesc {
            name: "Historylist",
            columns: vec![
                ColumnDesc::primary_key("id"),
                ColumnDesc::new("title", "TEXT"),
            ],
            indices: vec![IndexDesc::plain("index_Historylist_id", &["id"])],
        },
        TableDesc {
            name: "HistorylistTrackList",
            columns: vec![
                ColumnDesc::new("historylistId", "INTEGER"),
                ColumnDesc::new("trackId", "INTEGER"),
                ColumnDesc::new("trackIdInOriginDatabase", "INTEGER"),
                ColumnDesc::new("databaseUuid", "TEXT"),
                ColumnDesc::new("date", "INTEGER"),
            ],
            indices: vec![
                IndexDesc::plain(
                    "index_HistorylistTrackList_historylistId",
                    &["historylistId"],
                ),
                IndexDesc::plain("index_HistorylistTrackList_date", &["date"]),
            ],
        },
        TableDesc {
            name: "Preparelist",
            columns: vec![
                ColumnDesc::primary_key("id"),
                ColumnDesc::new("title", "TEXT"),
            ],
            indices: vec![IndexDesc::plain("index_Preparelist_id", &["id"])],
        },
        TableDesc {
            name: "PrepareTrackList",
            columns: vec![
                ColumnDesc::new("trackId", "INTEGER"),
                ColumnDesc::new("trackNumber", "INTEGER"),
            ],
            indices: vec![IndexDesc::plain("index_PrepareTrackList_trackId", &["trackId"])],
        },
    ];

    if version.supports_copied_track() {
        tables.push(TableDesc {
            name: "CopiedTrack",
            columns: vec![
                ColumnDesc::primary_key("trackId"),
                ColumnDesc::new("uuidOfSourceDatabase", "TEXT"),
                ColumnDesc::new("idOfTrackInSourceDatabase", "INTEGER"),
            ],
            indices: vec![IndexDesc::plain("index_CopiedTrack_trackId", &["trackId"])],
        });
    }

    tables
}
