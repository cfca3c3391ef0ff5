// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Reference catalog of the performance store (`p.db`).

use super::{information_table, ColumnDesc, IndexDesc, TableDesc};
use crate::version::SchemaVersion;

/// Builds the performance store catalog for `version`.
pub(crate) fn tables(version: SchemaVersion) -> Vec<TableDesc> {
    let boolean = version.boolean_column_type();

    let mut columns = vec![
        ColumnDesc::primary_key("id"),
        ColumnDesc::new("isAnalyzed", boolean),
        ColumnDesc::new("isRendered", boolean),
        ColumnDesc::new("trackData", "BLOB"),
        ColumnDesc::new("highResolutionWaveFormData", "BLOB"),
        ColumnDesc::new("overviewWaveFormData", "BLOB"),
        ColumnDesc::new("beatData", "BLOB"),
        ColumnDesc::new("quickCues", "BLOB"),
        ColumnDesc::new("loops", "BLOB"),
        ColumnDesc::new("hasSeratoValues", boolean),
    ];
    if version.supports_rekordbox_flag() {
        columns.push(ColumnDesc::new("hasRekordboxValues", boolean));
    }
    if version.supports_traktor_flag() {
        columns.push(ColumnDesc::new("hasTraktorValues", boolean));
    }

    vec![
        information_table(),
        TableDesc {
            name: "PerformanceData",
            columns,
            indices: vec![IndexDesc::plain("index_PerformanceData_id", &["id"])],
        },
    ]
}
