// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Codec for the `trackData` column.
//!
//! The payload is a single 28-byte extent holding the analysis parameters of
//! the whole track.

use crate::blob::Blob;
use binrw::binrw;

/// Overall analysis parameters of a track.
#[binrw]
#[derive(Debug, PartialEq, Clone, Copy, Default)]
#[brw(big)]
pub struct TrackData {
    #[br(temp, assert(len == 28))]
    #[bw(calc = 28u32)]
    len: u32,
    /// Sample rate of the analyzed audio in Hz.
    pub sample_rate: f64,
    /// Total number of samples in the track.
    pub samples: f64,
    /// Average loudness of the track, normalized to `[0, 1]`.
    #[br(assert((0.0..=1.0).contains(&average_loudness)))]
    pub average_loudness: f64,
    /// Musical key code of the track.
    pub key: i32,
}

impl Blob for TrackData {}
