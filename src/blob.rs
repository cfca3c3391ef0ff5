// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Codecs for the performance data blobs stored in the `PerformanceData`
//! table.
//!
//! Each column holds a standalone byte sequence describing one aspect of a
//! track analysis: beat grids, waveforms, quick cues, saved loops or overall
//! track parameters. All shapes share the same framing rules:
//!
//! - Multi-byte fields are big-endian.
//! - Compressed shapes prefix a zlib stream with the 4-byte big-endian length
//!   of the uncompressed payload. Saved loops are the one shape the firmware
//!   never compressed and are stored raw.
//! - The uncompressed payload starts with a one-byte format tag, currently
//!   `0x01`.
//! - Sub-records inside the track data and waveform payloads are framed as
//!   extents (a 4-byte length followed by the payload), read back until the
//!   stream is exhausted.
//!
//! An empty column is legal and decodes to the shape's default value.

pub mod beat_data;
pub mod loops;
pub mod quick_cues;
pub mod string;
pub mod track_data;
pub mod waveform;

pub use beat_data::{BeatData, BeatMarker};
pub use loops::{Loop, LoopsData};
pub use quick_cues::{QuickCue, QuickCuesData};
pub use string::BlobString;
pub use track_data::TrackData;
pub use waveform::{
    HighResWaveformData, HighResWaveformEntry, OverviewWaveformData, OverviewWaveformEntry,
    WaveformPoint,
};

use crate::error::{Error, Result};
use binrw::{io::Cursor, BinRead, BinWrite, Endian};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::{Read, Write};

/// Format tag expected at the start of every uncompressed payload.
const FORMAT_TAG: u8 = 0x01;

/// Compression level used for all compressed shapes.
///
/// Encoding is only deterministic at a fixed level; the uncompressed form is
/// the compatibility guarantee, the exact compressed bytes are not.
const COMPRESSION_LEVEL: u32 = 6;

fn corrupt(err: binrw::Error) -> Error {
    Error::CorruptBlob(err.to_string())
}

/// Wraps `payload` into the on-disk frame: 4-byte big-endian uncompressed
/// length followed by a zlib stream.
pub(crate) fn deflate(payload: &[u8]) -> Result<Vec<u8>> {
    let len = u32::try_from(payload.len())
        .map_err(|_| Error::CorruptBlob("payload exceeds frame limit".to_string()))?;
    let mut column = Vec::with_capacity(payload.len() / 2 + 8);
    column.extend_from_slice(&len.to_be_bytes());
    let mut encoder = ZlibEncoder::new(column, Compression::new(COMPRESSION_LEVEL));
    encoder.write_all(payload)?;
    Ok(encoder.finish()?)
}

/// Unwraps an on-disk frame produced by [`deflate`].
pub(crate) fn inflate(column: &[u8]) -> Result<Vec<u8>> {
    if column.len() < 4 {
        return Err(Error::CorruptBlob(
            "truncated compression frame".to_string(),
        ));
    }
    let mut prefix = [0u8; 4];
    prefix.copy_from_slice(&column[..4]);
    let expected = u32::from_be_bytes(prefix) as usize;
    let mut payload = Vec::with_capacity(expected);
    ZlibDecoder::new(&column[4..])
        .read_to_end(&mut payload)
        .map_err(|err| Error::CorruptBlob(format!("inflate failed: {err}")))?;
    if payload.len() != expected {
        return Err(Error::CorruptBlob(format!(
            "uncompressed length mismatch: header says {expected}, stream holds {}",
            payload.len()
        )));
    }
    Ok(payload)
}

fn read_payload<T>(payload: &[u8]) -> Result<T>
where
    T: for<'a> BinRead<Args<'a> = ()>,
{
    let (format, body) = payload
        .split_first()
        .ok_or_else(|| Error::CorruptBlob("empty payload".to_string()))?;
    if *format != FORMAT_TAG {
        return Err(Error::UnsupportedBlobVersion(*format));
    }
    let mut cursor = Cursor::new(body);
    let value = T::read_options(&mut cursor, Endian::Big, ()).map_err(corrupt)?;
    let trailing = body.len() as u64 - cursor.position();
    if trailing > 0 {
        return Err(Error::CorruptBlob(format!(
            "{trailing} trailing bytes after payload"
        )));
    }
    Ok(value)
}

fn write_payload<T>(value: &T) -> Result<Vec<u8>>
where
    T: for<'a> BinWrite<Args<'a> = ()>,
{
    let mut cursor = Cursor::new(Vec::new());
    value
        .write_options(&mut cursor, Endian::Big, ())
        .map_err(corrupt)?;
    let body = cursor.into_inner();
    let mut payload = Vec::with_capacity(body.len() + 1);
    payload.push(FORMAT_TAG);
    payload.extend_from_slice(&body);
    Ok(payload)
}

/// A performance data blob shape.
///
/// `decode` is the exact inverse of `encode` on well-formed input, and
/// `encode` is deterministic. Blob columns may legally be empty, in which
/// case `decode` yields [`Default::default`].
pub trait Blob:
    for<'a> BinRead<Args<'a> = ()> + for<'a> BinWrite<Args<'a> = ()> + Default
{
    /// Whether the column bytes are wrapped in the zlib frame.
    const COMPRESSED: bool = true;

    /// Decodes the column bytes into the shape.
    fn decode(column: &[u8]) -> Result<Self> {
        if column.is_empty() {
            return Ok(Self::default());
        }
        let payload = if Self::COMPRESSED {
            inflate(column)?
        } else {
            column.to_vec()
        };
        read_payload(&payload)
    }

    /// Encodes the shape into column bytes.
    fn encode(&self) -> Result<Vec<u8>> {
        let payload = write_payload(self)?;
        if Self::COMPRESSED {
            deflate(&payload)
        } else {
            Ok(payload)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn frame_roundtrip() {
        let payload = b"some payload bytes".to_vec();
        let column = deflate(&payload).unwrap();
        assert_eq!(&column[..4], &(payload.len() as u32).to_be_bytes());
        assert_eq!(inflate(&column).unwrap(), payload);
    }

    #[test]
    fn frame_rejects_truncation() {
        assert!(matches!(
            inflate(&[0, 0]),
            Err(Error::CorruptBlob(_))
        ));
    }

    #[test]
    fn frame_rejects_length_mismatch() {
        let mut column = deflate(b"four").unwrap();
        // Claim a longer uncompressed length than the stream holds.
        column[3] = 0xFF;
        assert!(matches!(inflate(&column), Err(Error::CorruptBlob(_))));
    }

    #[test]
    fn unknown_format_tag() {
        let column = deflate(&[0x7F, 1, 2, 3]).unwrap();
        assert!(matches!(
            TrackData::decode(&column),
            Err(Error::UnsupportedBlobVersion(0x7F))
        ));
    }

    #[test]
    fn empty_column_decodes_to_default() {
        assert_eq!(TrackData::decode(&[]).unwrap(), TrackData::default());
        assert_eq!(BeatData::decode(&[]).unwrap(), BeatData::default());
        assert_eq!(LoopsData::decode(&[]).unwrap(), LoopsData::default());
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let mut payload = write_payload(&TrackData::default()).unwrap();
        payload.push(0x00);
        let column = deflate(&payload).unwrap();
        assert!(matches!(
            TrackData::decode(&column),
            Err(Error::CorruptBlob(_))
        ));
    }
}
