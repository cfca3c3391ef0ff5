// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! `binrw`-based implementation of the length-prefixed UTF-8 strings used for
//! quick cue and loop labels.

use binrw::binrw;

/// A label string as stored inside performance data blobs: a single length
/// byte followed by that many bytes of UTF-8.
///
/// The players render at most a handful of characters, so the 255-byte limit
/// of the length prefix is never a concern in practice.
///
/// ```
/// # pub fn main() -> binrw::BinResult<()> {
/// use binrw::{BinRead, BinWrite, Endian};
/// use enginecrate::blob::BlobString;
///
/// let string = BlobString::new("Drop");
/// let binary = vec![0x4, 0x44, 0x72, 0x6F, 0x70];
///
/// let mut writer = binrw::io::Cursor::new(vec![]);
/// string.write_options(&mut writer, Endian::Big, ())?;
/// assert_eq!(&binary, writer.get_ref());
///
/// let mut reader = binrw::io::Cursor::new(binary);
/// let parsed = BlobString::read_options(&mut reader, Endian::Big, ())?;
/// assert_eq!(parsed, string);
/// # Ok(())
/// # }
/// ```
#[binrw]
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct BlobString {
    #[br(temp)]
    #[bw(try_calc = u8::try_from(value.len()))]
    len: u8,
    #[br(count = len, try_map = String::from_utf8)]
    #[bw(map = |value: &String| value.clone().into_bytes())]
    value: String,
}

impl BlobString {
    /// Creates a label from a Rust string.
    ///
    /// The encoded form stores the byte length in a single byte, so `string`
    /// must not exceed 255 bytes of UTF-8.
    #[must_use]
    pub fn new(string: impl Into<String>) -> Self {
        let value = string.into();
        debug_assert!(value.len() <= usize::from(u8::MAX));
        Self { value }
    }

    /// The label text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Whether the label is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl std::fmt::Display for BlobString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.value.fmt(f)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::util::testing::test_roundtrip;

    #[test]
    fn empty_string() {
        test_roundtrip(&[0x0], BlobString::default());
    }

    #[test]
    fn short_string() {
        test_roundtrip(&[0x3, 0x66, 0x6F, 0x6F], BlobString::new("foo"));
    }

    #[test]
    fn non_ascii_string() {
        test_roundtrip(
            &[0x6, 0x43, 0x75, 0x65, 0x20, 0xC3, 0xA9],
            BlobString::new("Cue é"),
        );
    }
}
