// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Codec for the `loops` column.
//!
//! Unlike the other shapes, saved loops were never compressed by any firmware
//! revision; the column holds the raw payload.

use crate::blob::{Blob, BlobString};
use crate::util::Color;
use binrw::binrw;

/// Number of loop slots the players expose.
pub const NUM_LOOPS: usize = 8;

/// A single saved loop slot.
#[binrw]
#[derive(Debug, PartialEq, Clone)]
#[brw(big)]
pub struct Loop {
    /// Label shown on the performance pad.
    pub label: BlobString,
    /// Start of the loop in samples.
    pub start_sample: f64,
    /// End of the loop in samples.
    pub end_sample: f64,
    /// Whether the start point has been set.
    #[br(map = |flag: u8| flag != 0)]
    #[bw(map = |flag: &bool| u8::from(*flag))]
    pub is_start_set: bool,
    /// Whether the end point has been set.
    #[br(map = |flag: u8| flag != 0)]
    #[bw(map = |flag: &bool| u8::from(*flag))]
    pub is_end_set: bool,
    /// Color of the performance pad.
    pub color: Color,
}

impl Loop {
    /// Whether both loop points are set.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.is_start_set && self.is_end_set
    }
}

impl Default for Loop {
    fn default() -> Self {
        Self {
            label: BlobString::default(),
            start_sample: 0.0,
            end_sample: 0.0,
            is_start_set: false,
            is_end_set: false,
            color: Color::default(),
        }
    }
}

/// Saved loops of a track.
#[binrw]
#[derive(Debug, PartialEq, Clone)]
#[brw(big)]
pub struct LoopsData {
    #[br(temp)]
    #[bw(try_calc = u8::try_from(loops.len()))]
    num_loops: u8,
    /// The loop slots, usually [`NUM_LOOPS`] of them.
    #[br(count = num_loops)]
    pub loops: Vec<Loop>,
}

impl Default for LoopsData {
    fn default() -> Self {
        Self {
            loops: vec![Loop::default(); NUM_LOOPS],
        }
    }
}

impl Blob for LoopsData {
    const COMPRESSED: bool = false;
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::util::testing::test_roundtrip;
    use pretty_assertions::assert_eq;

    #[test]
    fn payload_layout() {
        let data = LoopsData {
            loops: vec![Loop {
                label: BlobString::new("L1"),
                start_sample: 2.0,
                end_sample: 0.5,
                is_start_set: true,
                is_end_set: false,
                color: Color {
                    red: 9,
                    green: 8,
                    blue: 7,
                    alpha: 6,
                },
            }],
        };
        test_roundtrip(
            &[
                1, // number of loops
                2, 0x4C, 0x31, // label
                0x40, 0, 0, 0, 0, 0, 0, 0, // start sample
                0x3F, 0xE0, 0, 0, 0, 0, 0, 0, // end sample
                1, 0, // set flags
                9, 8, 7, 6, // pad color
            ],
            data,
        );
    }

    #[test]
    fn column_is_not_compressed() {
        let data = LoopsData::default();
        let column = data.encode().unwrap();
        // Format tag, then the loop count.
        assert_eq!(column[0], 0x01);
        assert_eq!(column[1], NUM_LOOPS as u8);
        assert_eq!(LoopsData::decode(&column).unwrap(), data);
    }

    #[test]
    fn column_roundtrip() {
        let mut data = LoopsData::default();
        data.loops[3] = Loop {
            label: BlobString::new("Break"),
            start_sample: 88200.0,
            end_sample: 176400.0,
            is_start_set: true,
            is_end_set: true,
            color: Color {
                red: 0,
                green: 255,
                blue: 0,
                alpha: 255,
            },
        };
        let column = data.encode().unwrap();
        assert_eq!(LoopsData::decode(&column).unwrap(), data);
    }
}
