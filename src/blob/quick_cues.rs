// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Codec for the `quickCues` column.

use crate::blob::{Blob, BlobString};
use crate::util::Color;
use binrw::binrw;

/// Number of quick cue slots the players expose.
pub const NUM_QUICK_CUES: usize = 8;

/// A single quick cue slot.
#[binrw]
#[derive(Debug, PartialEq, Clone)]
#[brw(big)]
pub struct QuickCue {
    /// Label shown on the performance pad.
    pub label: BlobString,
    /// Offset of the cue point in samples. Negative if the slot is unset.
    pub sample_offset: f64,
    /// Color of the performance pad.
    pub color: Color,
}

impl QuickCue {
    /// Whether the slot holds a cue point.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.sample_offset >= 0.0
    }
}

impl Default for QuickCue {
    fn default() -> Self {
        Self {
            label: BlobString::default(),
            sample_offset: -1.0,
            color: Color::default(),
        }
    }
}

/// Quick cues of a track.
#[binrw]
#[derive(Debug, PartialEq, Clone)]
#[brw(big)]
pub struct QuickCuesData {
    #[br(temp)]
    #[bw(try_calc = u8::try_from(cues.len()))]
    num_cues: u8,
    /// The cue slots, usually [`NUM_QUICK_CUES`] of them.
    #[br(count = num_cues)]
    pub cues: Vec<QuickCue>,
    /// Main cue point after manual adjustment, in samples.
    pub adjusted_main_cue: f64,
    /// Main cue point as set by the analyzer, in samples.
    pub default_main_cue: f64,
}

impl Default for QuickCuesData {
    fn default() -> Self {
        Self {
            cues: vec![QuickCue::default(); NUM_QUICK_CUES],
            adjusted_main_cue: 0.0,
            default_main_cue: 0.0,
        }
    }
}

impl Blob for QuickCuesData {}

#[cfg(test)]
mod test {
    use super::*;
    use crate::util::testing::test_roundtrip;
    use pretty_assertions::assert_eq;

    #[test]
    fn payload_layout() {
        let data = QuickCuesData {
            cues: vec![QuickCue {
                label: BlobString::new("A"),
                sample_offset: 2.0,
                color: Color {
                    red: 1,
                    green: 2,
                    blue: 3,
                    alpha: 4,
                },
            }],
            adjusted_main_cue: 0.5,
            default_main_cue: 0.5,
        };
        test_roundtrip(
            &[
                1, // number of cues
                1, 0x41, // label
                0x40, 0, 0, 0, 0, 0, 0, 0, // sample offset
                1, 2, 3, 4, // pad color
                0x3F, 0xE0, 0, 0, 0, 0, 0, 0, // adjusted main cue
                0x3F, 0xE0, 0, 0, 0, 0, 0, 0, // default main cue
            ],
            data,
        );
    }

    #[test]
    fn column_roundtrip() {
        let mut data = QuickCuesData::default();
        data.cues[0] = QuickCue {
            label: BlobString::new("Intro"),
            sample_offset: 88200.0,
            color: Color {
                red: 255,
                green: 0,
                blue: 64,
                alpha: 255,
            },
        };
        data.adjusted_main_cue = 88200.0;
        data.default_main_cue = 44100.0;
        let column = data.encode().unwrap();
        assert_eq!(QuickCuesData::decode(&column).unwrap(), data);
    }

    #[test]
    fn default_has_eight_unset_slots() {
        let data = QuickCuesData::default();
        assert_eq!(data.cues.len(), NUM_QUICK_CUES);
        assert!(data.cues.iter().all(|cue| !cue.is_set()));
    }
}
