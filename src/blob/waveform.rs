// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Codecs for the `highResolutionWaveFormData` and `overviewWaveFormData`
//! columns.
//!
//! Both payloads start with a header extent holding the number of samples per
//! waveform entry, followed by one fixed-size extent per entry. The number of
//! entries is not stored anywhere; readers consume extents until the payload
//! is exhausted.

use crate::blob::Blob;
use binrw::{binrw, helpers::until_eof};

/// One channel value of a waveform entry.
#[binrw]
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct WaveformPoint {
    /// Amplitude of the channel (0-255).
    pub value: u8,
    /// Opacity the player renders the value with (0-255).
    pub opacity: u8,
}

/// A single entry of the high-resolution waveform, split into frequency
/// bands.
#[binrw]
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
#[brw(big)]
pub struct HighResWaveformEntry {
    #[br(temp, assert(len == 6))]
    #[bw(calc = 6u32)]
    len: u32,
    /// Low frequency band.
    pub low: WaveformPoint,
    /// Mid frequency band.
    pub mid: WaveformPoint,
    /// High frequency band.
    pub high: WaveformPoint,
}

/// High-resolution scrolling waveform of a track.
#[binrw]
#[derive(Debug, PartialEq, Clone, Default)]
#[brw(big)]
pub struct HighResWaveformData {
    #[br(temp, assert(len_header == 8))]
    #[bw(calc = 8u32)]
    len_header: u32,
    /// Number of audio samples covered by one waveform entry.
    pub samples_per_entry: f64,
    /// The waveform entries.
    #[br(parse_with = until_eof)]
    pub entries: Vec<HighResWaveformEntry>,
}

impl Blob for HighResWaveformData {}

/// A single entry of the overview waveform.
#[binrw]
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
#[brw(big)]
pub struct OverviewWaveformEntry {
    #[br(temp, assert(len == 2))]
    #[bw(calc = 2u32)]
    len: u32,
    /// The single channel of the entry.
    pub point: WaveformPoint,
}

/// Fixed-width overview waveform of a track.
#[binrw]
#[derive(Debug, PartialEq, Clone, Default)]
#[brw(big)]
pub struct OverviewWaveformData {
    #[br(temp, assert(len_header == 8))]
    #[bw(calc = 8u32)]
    len_header: u32,
    /// Number of audio samples covered by one waveform entry.
    pub samples_per_entry: f64,
    /// The waveform entries.
    #[br(parse_with = until_eof)]
    pub entries: Vec<OverviewWaveformEntry>,
}

impl Blob for OverviewWaveformData {}

#[cfg(test)]
mod test {
    use super::*;
    use crate::util::testing::test_roundtrip;
    use pretty_assertions::assert_eq;

    #[test]
    fn high_res_payload_layout() {
        let data = HighResWaveformData {
            samples_per_entry: 2.0,
            entries: vec![
                HighResWaveformEntry {
                    low: WaveformPoint {
                        value: 10,
                        opacity: 128,
                    },
                    mid: WaveformPoint {
                        value: 20,
                        opacity: 129,
                    },
                    high: WaveformPoint {
                        value: 30,
                        opacity: 130,
                    },
                },
                HighResWaveformEntry::default(),
            ],
        };
        test_roundtrip(
            &[
                0, 0, 0, 8, // header extent length
                0x40, 0, 0, 0, 0, 0, 0, 0, // samples per entry
                0, 0, 0, 6, 10, 128, 20, 129, 30, 130, // entry 1
                0, 0, 0, 6, 0, 0, 0, 0, 0, 0, // entry 2
            ],
            data,
        );
    }

    #[test]
    fn overview_payload_layout() {
        let data = OverviewWaveformData {
            samples_per_entry: 2.0,
            entries: vec![OverviewWaveformEntry {
                point: WaveformPoint {
                    value: 42,
                    opacity: 255,
                },
            }],
        };
        test_roundtrip(
            &[
                0, 0, 0, 8, // header extent length
                0x40, 0, 0, 0, 0, 0, 0, 0, // samples per entry
                0, 0, 0, 2, 42, 255, // entry 1
            ],
            data,
        );
    }

    #[test]
    fn column_roundtrip() {
        let data = HighResWaveformData {
            samples_per_entry: 1024.0,
            entries: (0..300)
                .map(|i| HighResWaveformEntry {
                    low: WaveformPoint {
                        value: (i % 256) as u8,
                        opacity: 255,
                    },
                    mid: WaveformPoint {
                        value: ((i * 7) % 256) as u8,
                        opacity: 200,
                    },
                    high: WaveformPoint {
                        value: ((i * 13) % 256) as u8,
                        opacity: 100,
                    },
                })
                .collect(),
        };
        let column = data.encode().unwrap();
        assert_eq!(HighResWaveformData::decode(&column).unwrap(), data);

        let overview = OverviewWaveformData {
            samples_per_entry: 4096.0,
            entries: (0..100)
                .map(|i| OverviewWaveformEntry {
                    point: WaveformPoint {
                        value: (i % 256) as u8,
                        opacity: 255,
                    },
                })
                .collect(),
        };
        let column = overview.encode().unwrap();
        assert_eq!(OverviewWaveformData::decode(&column).unwrap(), overview);
    }

    #[test]
    fn empty_entry_list() {
        let data = OverviewWaveformData {
            samples_per_entry: 4096.0,
            entries: vec![],
        };
        let column = data.encode().unwrap();
        assert_eq!(OverviewWaveformData::decode(&column).unwrap(), data);
    }
}
