// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Performance data rows of the performance store.
//!
//! A track has at most one `PerformanceData` row. The row may legally be
//! absent (the track has not been analyzed yet); readers synthesize a
//! default-valued row in that case. Writes replace the whole row.

use crate::blob::{
    BeatData, Blob, HighResWaveformData, LoopsData, OverviewWaveformData, QuickCuesData,
    TrackData,
};
use crate::db::track::TrackId;
use crate::db::Database;
use crate::error::{Error, Result};
use rusqlite::types::ToSql;

/// The decoded performance data of one track.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerformanceData {
    /// Whether the track has been analyzed.
    pub is_analyzed: bool,
    /// Whether the waveforms have been rendered.
    pub is_rendered: bool,
    /// Overall analysis parameters.
    pub track_data: TrackData,
    /// High-resolution scrolling waveform.
    pub high_res_waveform: HighResWaveformData,
    /// Fixed-width overview waveform.
    pub overview_waveform: OverviewWaveformData,
    /// Beat grids.
    pub beat_data: BeatData,
    /// Quick cues and main cue points.
    pub quick_cues: QuickCuesData,
    /// Saved loops.
    pub loops: LoopsData,
    /// Whether Serato values were imported for this track.
    pub has_serato_values: bool,
    /// Whether Rekordbox values were imported for this track. Only stored
    /// from schema 1.7.1 on.
    pub has_rekordbox_values: bool,
    /// Whether Traktor values were imported for this track. Only stored from
    /// schema 1.11.1 on.
    pub has_traktor_values: bool,
}

struct RawRow {
    is_analyzed: bool,
    is_rendered: bool,
    track_data: Option<Vec<u8>>,
    high_res_waveform: Option<Vec<u8>>,
    overview_waveform: Option<Vec<u8>>,
    beat_data: Option<Vec<u8>>,
    quick_cues: Option<Vec<u8>>,
    loops: Option<Vec<u8>>,
    has_serato_values: bool,
    has_rekordbox_values: bool,
    has_traktor_values: bool,
}

fn decode_column<T: Blob>(column: Option<&Vec<u8>>) -> Result<T> {
    match column {
        None => Ok(T::default()),
        Some(bytes) => T::decode(bytes),
    }
}

impl Database {
    /// Reads the performance data of a track.
    ///
    /// An absent row is not an error: the default row (nothing analyzed, all
    /// blobs at their defaults) is returned instead.
    pub fn performance_data(&self, id: TrackId) -> Result<PerformanceData> {
        let rekordbox = self.version.supports_rekordbox_flag();
        let traktor = self.version.supports_traktor_flag();
        let mut columns = vec![
            "isAnalyzed",
            "isRendered",
            "trackData",
            "highResolutionWaveFormData",
            "overviewWaveFormData",
            "beatData",
            "quickCues",
            "loops",
            "hasSeratoValues",
        ];
        if rekordbox {
            columns.push("hasRekordboxValues");
        }
        if traktor {
            columns.push("hasTraktorValues");
        }
        let sql = format!(
            "SELECT {} FROM perfdata.PerformanceData WHERE id = ?1",
            columns.join(", ")
        );
        let rekordbox_index = rekordbox.then_some(9);
        let traktor_index = traktor.then(|| 9 + usize::from(rekordbox));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows: Vec<RawRow> = stmt
            .query_map([id.0], |row| {
                let flag = |index: Option<usize>| -> rusqlite::Result<bool> {
                    match index {
                        Some(index) => Ok(row.get::<_, Option<bool>>(index)?.unwrap_or_default()),
                        None => Ok(false),
                    }
                };
                Ok(RawRow {
                    is_analyzed: row.get::<_, Option<bool>>(0)?.unwrap_or_default(),
                    is_rendered: row.get::<_, Option<bool>>(1)?.unwrap_or_default(),
                    track_data: row.get(2)?,
                    high_res_waveform: row.get(3)?,
                    overview_waveform: row.get(4)?,
                    beat_data: row.get(5)?,
                    quick_cues: row.get(6)?,
                    loops: row.get(7)?,
                    has_serato_values: row.get::<_, Option<bool>>(8)?.unwrap_or_default(),
                    has_rekordbox_values: flag(rekordbox_index)?,
                    has_traktor_values: flag(traktor_index)?,
                })
            })?
            .collect::<rusqlite::Result<_>>()?;

        let raw = match rows.len() {
            0 => return Ok(PerformanceData::default()),
            1 => rows.remove(0),
            len => {
                return Err(Error::TrackDatabaseInconsistency(format!(
                    "{len} PerformanceData rows share id {id}"
                )))
            }
        };

        Ok(PerformanceData {
            is_analyzed: raw.is_analyzed,
            is_rendered: raw.is_rendered,
            track_data: decode_column(raw.track_data.as_ref())?,
            high_res_waveform: decode_column(raw.high_res_waveform.as_ref())?,
            overview_waveform: decode_column(raw.overview_waveform.as_ref())?,
            beat_data: decode_column(raw.beat_data.as_ref())?,
            quick_cues: decode_column(raw.quick_cues.as_ref())?,
            loops: decode_column(raw.loops.as_ref())?,
            has_serato_values: raw.has_serato_values,
            has_rekordbox_values: raw.has_rekordbox_values,
            has_traktor_values: raw.has_traktor_values,
        })
    }

    /// Replaces the performance data row of a track as a whole.
    ///
    /// Columns that the library's schema version does not carry are dropped
    /// from the write.
    pub fn set_performance_data(&self, id: TrackId, data: &PerformanceData) -> Result<()> {
        let track_data = data.track_data.encode()?;
        let high_res_waveform = data.high_res_waveform.encode()?;
        let overview_waveform = data.overview_waveform.encode()?;
        let beat_data = data.beat_data.encode()?;
        let quick_cues = data.quick_cues.encode()?;
        let loops = data.loops.encode()?;

        let mut columns = vec![
            "id",
            "isAnalyzed",
            "isRendered",
            "trackData",
            "highResolutionWaveFormData",
            "overviewWaveFormData",
            "beatData",
            "quickCues",
            "loops",
            "hasSeratoValues",
        ];
        let mut values: Vec<&dyn ToSql> = vec![
            &id.0,
            &data.is_analyzed,
            &data.is_rendered,
            &track_data,
            &high_res_waveform,
            &overview_waveform,
            &beat_data,
            &quick_cues,
            &loops,
            &data.has_serato_values,
        ];
        if self.version.supports_rekordbox_flag() {
            columns.push("hasRekordboxValues");
            values.push(&data.has_rekordbox_values);
        }
        if self.version.supports_traktor_flag() {
            columns.push("hasTraktorValues");
            values.push(&data.has_traktor_values);
        }

        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "INSERT OR REPLACE INTO perfdata.PerformanceData ( {} ) VALUES ( {} )",
            columns.join(", "),
            placeholders.join(", ")
        );
        self.conn.execute(&sql, values.as_slice())?;
        Ok(())
    }

    /// Deletes the performance data row of a track, if any.
    pub fn clear_performance_data(&self, id: TrackId) -> Result<()> {
        self.conn.execute(
            "DELETE FROM perfdata.PerformanceData WHERE id = ?1",
            [id.0],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::blob::{BeatMarker, BlobString, Loop, QuickCue};
    use crate::util::Color;
    use crate::version::SchemaVersion;
    use pretty_assertions::assert_eq;

    fn sample_data() -> PerformanceData {
        let mut quick_cues = QuickCuesData::default();
        quick_cues.cues[0] = QuickCue {
            label: BlobString::new("Intro"),
            sample_offset: 44100.0,
            color: Color {
                red: 255,
                green: 64,
                blue: 0,
                alpha: 255,
            },
        };
        let mut loops = LoopsData::default();
        loops.loops[1] = Loop {
            label: BlobString::new("Break"),
            start_sample: 88200.0,
            end_sample: 176_400.0,
            is_start_set: true,
            is_end_set: true,
            color: Color::default(),
        };
        PerformanceData {
            is_analyzed: true,
            is_rendered: true,
            track_data: TrackData {
                sample_rate: 44100.0,
                samples: 10_000_000.0,
                average_loudness: 0.5,
                key: 12,
            },
            beat_data: BeatData {
                sample_rate: 44100.0,
                samples: 10_000_000.0,
                default_markers: vec![
                    BeatMarker {
                        sample_offset: 0.0,
                        beat_number: 0,
                        beats_until_next: 4,
                        source: 0,
                    },
                    BeatMarker {
                        sample_offset: 22050.0,
                        beat_number: 1,
                        beats_until_next: 4,
                        source: 0,
                    },
                ],
                adjusted_markers: vec![],
            },
            quick_cues,
            loops,
            has_serato_values: false,
            has_rekordbox_values: true,
            has_traktor_values: false,
            ..PerformanceData::default()
        }
    }

    #[test]
    fn roundtrip_on_latest_schema() {
        let db = Database::create_in_memory(SchemaVersion::LATEST).unwrap();
        let id = TrackId(1);
        let data = sample_data();
        db.set_performance_data(id, &data).unwrap();
        assert_eq!(db.performance_data(id).unwrap(), data);
    }

    #[test]
    fn absent_row_reads_as_default() {
        let db = Database::create_in_memory(SchemaVersion::LATEST).unwrap();
        assert_eq!(
            db.performance_data(TrackId(999)).unwrap(),
            PerformanceData::default()
        );
    }

    #[test]
    fn flag_columns_are_projected_per_version() {
        let db = Database::create_in_memory(SchemaVersion::V1_6_0).unwrap();
        let id = TrackId(1);
        let data = sample_data();
        db.set_performance_data(id, &data).unwrap();
        let stored = db.performance_data(id).unwrap();
        // 1.6.0 predates both flag columns.
        assert!(!stored.has_rekordbox_values);
        assert!(!stored.has_traktor_values);
        assert_eq!(stored.beat_data, data.beat_data);
    }

    #[test]
    fn clear_removes_the_row() {
        let db = Database::create_in_memory(SchemaVersion::LATEST).unwrap();
        let id = TrackId(1);
        db.set_performance_data(id, &sample_data()).unwrap();
        db.clear_performance_data(id).unwrap();
        assert_eq!(
            db.performance_data(id).unwrap(),
            PerformanceData::default()
        );
        // Clearing an absent row is not an error.
        db.clear_performance_data(id).unwrap();
    }

    #[test]
    fn replace_overwrites_the_whole_row() {
        let db = Database::create_in_memory(SchemaVersion::LATEST).unwrap();
        let id = TrackId(1);
        db.set_performance_data(id, &sample_data()).unwrap();
        let plain = PerformanceData {
            is_analyzed: true,
            ..PerformanceData::default()
        };
        db.set_performance_data(id, &plain).unwrap();
        assert_eq!(db.performance_data(id).unwrap(), plain);
    }
}
