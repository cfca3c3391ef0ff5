// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Common types used in multiple modules.

use binrw::binrw;

/// RGBA color as stored in quick cue and loop blobs.
///
/// The players use the color to illuminate performance pads, so the alpha
/// channel acts as a brightness value rather than transparency.
#[binrw]
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct Color {
    /// Red channel.
    pub red: u8,
    /// Green channel.
    pub green: u8,
    /// Blue channel.
    pub blue: u8,
    /// Alpha channel (pad brightness).
    pub alpha: u8,
}

#[cfg(test)]
pub(crate) mod testing {
    use binrw::{BinRead, BinWrite, Endian};

    pub fn test_roundtrip<T>(bin: &[u8], obj: T)
    where
        T: for<'a> BinRead<Args<'a> = ()>
            + for<'a> BinWrite<Args<'a> = ()>
            + PartialEq
            + core::fmt::Debug,
    {
        // T->binary
        let mut writer = binrw::io::Cursor::new(Vec::with_capacity(bin.len()));
        obj.write_options(&mut writer, Endian::Big, ()).unwrap();
        assert_eq!(bin, writer.get_ref());
        // T->binary->T
        writer.set_position(0);
        let parsed = T::read_options(&mut writer, Endian::Big, ()).unwrap();
        assert_eq!(obj, parsed);
        // binary->T
        let mut cursor = binrw::io::Cursor::new(bin);
        let parsed = T::read_options(&mut cursor, Endian::Big, ()).unwrap();
        assert_eq!(obj, parsed);
        // binary->T->binary
        writer.set_position(0);
        parsed.write_options(&mut writer, Endian::Big, ()).unwrap();
        assert_eq!(bin, writer.get_ref());
    }
}
