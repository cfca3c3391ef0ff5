// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Codec for the `beatData` column.
//!
//! A beat grid is stored twice: the "default" grid produced by the analyzer
//! and the "adjusted" grid after manual edits on the player. Both are lists
//! of markers ordered by strictly increasing sample offset.

use crate::blob::Blob;
use binrw::binrw;

/// A single marker of a beat grid.
#[binrw]
#[derive(Debug, PartialEq, Clone, Copy, Default)]
#[brw(big)]
pub struct BeatMarker {
    /// Offset of the marker from the track start, in samples.
    pub sample_offset: f64,
    /// Number of the beat within its bar.
    pub beat_number: i32,
    /// Number of beats until the next marker (or the track end for the last
    /// marker).
    pub beats_until_next: i32,
    /// Origin of the marker: `0` for the analyzer, non-zero for markers the
    /// user has moved.
    pub source: u8,
}

/// Beat grids of a track.
#[binrw]
#[derive(Debug, PartialEq, Clone, Default)]
#[brw(big)]
pub struct BeatData {
    /// Sample rate of the analyzed audio in Hz.
    pub sample_rate: f64,
    /// Total number of samples in the track.
    pub samples: f64,
    #[br(temp)]
    #[bw(try_calc = u64::try_from(default_markers.len()))]
    num_default: u64,
    /// Beat grid as produced by the analyzer.
    #[br(count = num_default, assert(markers_ordered(&default_markers)))]
    #[bw(assert(markers_ordered(default_markers)))]
    pub default_markers: Vec<BeatMarker>,
    #[br(temp)]
    #[bw(try_calc = u64::try_from(adjusted_markers.len()))]
    num_adjusted: u64,
    /// Beat grid after manual adjustment.
    #[br(count = num_adjusted, assert(markers_ordered(&adjusted_markers)))]
    #[bw(assert(markers_ordered(adjusted_markers)))]
    pub adjusted_markers: Vec<BeatMarker>,
}

impl Blob for BeatData {}

/// Markers must be ordered by strictly increasing sample offset.
fn markers_ordered(markers: &[BeatMarker]) -> bool {
    markers
        .windows(2)
        .all(|pair| pair[0].sample_offset < pair[1].sample_offset)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::Error;
    use crate::util::testing::test_roundtrip;
    use pretty_assertions::assert_eq;

    fn marker(sample_offset: f64, beat_number: i32) -> BeatMarker {
        BeatMarker {
            sample_offset,
            beat_number,
            beats_until_next: 4,
            source: 0,
        }
    }

    #[test]
    fn payload_layout() {
        let data = BeatData {
            sample_rate: 2.0,
            samples: 0.5,
            default_markers: vec![marker(0.0, 0), marker(2.0, 1)],
            adjusted_markers: vec![],
        };
        test_roundtrip(
            &[
                0x40, 0, 0, 0, 0, 0, 0, 0, // sample rate
                0x3F, 0xE0, 0, 0, 0, 0, 0, 0, // samples
                0, 0, 0, 0, 0, 0, 0, 2, // number of default markers
                0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 4, 0, // marker 1
                0x40, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 4, 0, // marker 2
                0, 0, 0, 0, 0, 0, 0, 0, // number of adjusted markers
            ],
            data,
        );
    }

    #[test]
    fn column_roundtrip() {
        let data = BeatData {
            sample_rate: 44100.0,
            samples: 10_000_000.0,
            default_markers: vec![marker(0.0, 0), marker(22050.0, 1)],
            adjusted_markers: vec![marker(0.0, 0), marker(22050.0, 1), marker(44100.0, 2)],
        };
        let column = data.encode().unwrap();
        assert_eq!(BeatData::decode(&column).unwrap(), data);
    }

    #[test]
    fn unordered_markers_are_rejected() {
        let data = BeatData {
            sample_rate: 44100.0,
            samples: 1000.0,
            default_markers: vec![marker(22050.0, 0), marker(0.0, 1)],
            adjusted_markers: vec![],
        };
        assert!(matches!(data.encode(), Err(Error::CorruptBlob(_))));
    }

    #[test]
    fn equal_offsets_are_rejected() {
        let data = BeatData {
            sample_rate: 44100.0,
            samples: 1000.0,
            default_markers: vec![marker(0.0, 0), marker(0.0, 1)],
            adjusted_markers: vec![],
        };
        assert!(matches!(data.encode(), Err(Error::CorruptBlob(_))));
    }
}
