// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Schema versions of the Engine Library format.
//!
//! Every library carries its schema version in the `Information` row of both
//! database files. The firmware revisions shipped a dozen such versions, and
//! two of them (the firmware and desktop builds of 1.18.0) share the same
//! version tuple and are distinguishable only by the declared SQL type of
//! certain boolean columns.

use parse_display::{Display, FromStr};

/// An ordered `major.minor.patch` triple as stored in the `Information` rows.
#[derive(Debug, Display, FromStr, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[display("{major}.{minor}.{patch}")]
pub struct SemanticVersion {
    /// Major version number.
    pub major: u32,
    /// Minor version number.
    pub minor: u32,
    /// Patch version number.
    pub patch: u32,
}

impl SemanticVersion {
    /// Creates a new version triple.
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

/// A schema version recognized by the registry.
///
/// The variants for 1.18.0 carry a suffix: `fw` libraries were written by
/// player firmware and declare boolean columns as `NUMERIC`, while `ep`
/// libraries come from the desktop software and declare them as `INTEGER`.
/// The catalogs are identical otherwise.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum SchemaVersion {
    /// Schema version 1.6.0.
    #[display("1.6.0")]
    V1_6_0,
    /// Schema version 1.7.1.
    #[display("1.7.1")]
    V1_7_1,
    /// Schema version 1.9.1.
    #[display("1.9.1")]
    V1_9_1,
    /// Schema version 1.11.1.
    #[display("1.11.1")]
    V1_11_1,
    /// Schema version 1.13.0.
    #[display("1.13.0")]
    V1_13_0,
    /// Schema version 1.13.1.
    #[display("1.13.1")]
    V1_13_1,
    /// Schema version 1.13.2 (catalog-identical to 1.13.1).
    #[display("1.13.2")]
    V1_13_2,
    /// Schema version 1.15.0.
    #[display("1.15.0")]
    V1_15_0,
    /// Schema version 1.17.0.
    #[display("1.17.0")]
    V1_17_0,
    /// Schema version 1.18.0, firmware variant (`NUMERIC` booleans).
    #[display("1.18.0-fw")]
    V1_18_0_FW,
    /// Schema version 1.18.0, desktop variant (`INTEGER` booleans).
    #[display("1.18.0-ep")]
    V1_18_0_EP,
}

impl SchemaVersion {
    /// All versions known to the registry, in ascending order.
    pub const ALL: [SchemaVersion; 11] = [
        SchemaVersion::V1_6_0,
        SchemaVersion::V1_7_1,
        SchemaVersion::V1_9_1,
        SchemaVersion::V1_11_1,
        SchemaVersion::V1_13_0,
        SchemaVersion::V1_13_1,
        SchemaVersion::V1_13_2,
        SchemaVersion::V1_15_0,
        SchemaVersion::V1_17_0,
        SchemaVersion::V1_18_0_FW,
        SchemaVersion::V1_18_0_EP,
    ];

    /// The most recent firmware schema version.
    pub const LATEST: SchemaVersion = SchemaVersion::V1_18_0_FW;

    /// The version triple written to the `Information` rows.
    #[must_use]
    pub fn semantic(self) -> SemanticVersion {
        match self {
            SchemaVersion::V1_6_0 => SemanticVersion::new(1, 6, 0),
            SchemaVersion::V1_7_1 => SemanticVersion::new(1, 7, 1),
            SchemaVersion::V1_9_1 => SemanticVersion::new(1, 9, 1),
            SchemaVersion::V1_11_1 => SemanticVersion::new(1, 11, 1),
            SchemaVersion::V1_13_0 => SemanticVersion::new(1, 13, 0),
            SchemaVersion::V1_13_1 => SemanticVersion::new(1, 13, 1),
            SchemaVersion::V1_13_2 => SemanticVersion::new(1, 13, 2),
            SchemaVersion::V1_15_0 => SemanticVersion::new(1, 15, 0),
            SchemaVersion::V1_17_0 => SemanticVersion::new(1, 17, 0),
            SchemaVersion::V1_18_0_FW | SchemaVersion::V1_18_0_EP => {
                SemanticVersion::new(1, 18, 0)
            }
        }
    }

    /// Whether the music store carries the `Track.fileBytes` column.
    #[must_use]
    pub fn supports_file_bytes(self) -> bool {
        self.semantic() >= SemanticVersion::new(1, 13, 0)
    }

    /// Whether the music store carries the `Track.pdbImportKey` column.
    #[must_use]
    pub fn supports_pdb_import_key(self) -> bool {
        self.semantic() >= SemanticVersion::new(1, 13, 1)
    }

    /// Whether the music store carries the `Track.uri` column.
    #[must_use]
    pub fn supports_uri(self) -> bool {
        self.semantic() >= SemanticVersion::new(1, 15, 0)
    }

    /// Whether the music store carries the `Track.isBeatGridLocked` column.
    #[must_use]
    pub fn supports_beatgrid_lock(self) -> bool {
        self.semantic() >= SemanticVersion::new(1, 17, 0)
    }

    /// Whether the music store carries the `CopiedTrack` table.
    #[must_use]
    pub fn supports_copied_track(self) -> bool {
        self.semantic() >= SemanticVersion::new(1, 9, 1)
    }

    /// Whether the performance store carries `hasRekordboxValues`.
    #[must_use]
    pub fn supports_rekordbox_flag(self) -> bool {
        self.semantic() >= SemanticVersion::new(1, 7, 1)
    }

    /// Whether the performance store carries `hasTraktorValues`.
    #[must_use]
    pub fn supports_traktor_flag(self) -> bool {
        self.semantic() >= SemanticVersion::new(1, 11, 1)
    }

    /// Declared SQL type of boolean columns in this version.
    pub(crate) fn boolean_column_type(self) -> &'static str {
        match self {
            SchemaVersion::V1_18_0_EP => "INTEGER",
            _ => "NUMERIC",
        }
    }
}
