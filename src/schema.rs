// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! The registry of frozen schema versions.
//!
//! For every [`SchemaVersion`] the registry holds one descriptor of the
//! complete catalog of both stores: every table, every column and every
//! index. The same descriptor drives both directions:
//!
//! - **Create** generates the DDL that materializes the catalog on an empty
//!   pair of stores, followed by the seed rows (the `Information` row on both
//!   sides sharing a freshly generated library UUID, and the placeholder
//!   `AlbumArt` row).
//! - **Validate** reads the catalog of an existing pair of stores back
//!   through the `sqlite_master` table and the `table_info`, `index_list` and
//!   `index_info` pragmas and compares it against the descriptor in a
//!   canonical order (tables and columns by name, indices by name, index
//!   columns by rank). The first divergence is reported as a
//!   [`DatabaseInconsistency`](crate::Error::DatabaseInconsistency) naming
//!   the object.
//!
//! Version detection reads the version triple from the `Information` rows of
//! both stores. The 1.18.0 tuple is ambiguous between the firmware and
//! desktop builds and is disambiguated by probing the declared type of
//! `Track.isExternalTrack`.

pub(crate) mod music;
pub(crate) mod perf;

use crate::error::{Error, Result};
use crate::version::{SchemaVersion, SemanticVersion};
use rusqlite::Connection;
use uuid::Uuid;

/// The two stores of a library and their mandated schema names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Store {
    /// The music catalog (`m.db`), attached as `music`.
    Music,
    /// The performance database (`p.db`), attached as `perfdata`.
    Perf,
}

impl std::fmt::Display for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Store::Music => "music",
            Store::Perf => "perfdata",
        })
    }
}

/// Reference definition of a single column.
#[derive(Debug, Clone)]
pub(crate) struct ColumnDesc {
    pub(crate) name: &'static str,
    pub(crate) decl_type: &'static str,
    pub(crate) not_null: bool,
    pub(crate) default: Option<&'static str>,
    /// 1-based rank within the primary key, `0` if the column is not part of
    /// it. Matches the `pk` column of `PRAGMA table_info`.
    pub(crate) pk: u8,
}

impl ColumnDesc {
    pub(crate) const fn new(name: &'static str, decl_type: &'static str) -> Self {
        Self {
            name,
            decl_type,
            not_null: false,
            default: None,
            pk: 0,
        }
    }

    /// An `INTEGER PRIMARY KEY` column (rowid alias).
    pub(crate) const fn primary_key(name: &'static str) -> Self {
        Self {
            name,
            decl_type: "INTEGER",
            not_null: false,
            default: None,
            pk: 1,
        }
    }

    /// A member of a composite primary key.
    pub(crate) const fn in_primary_key(
        name: &'static str,
        decl_type: &'static str,
        rank: u8,
    ) -> Self {
        Self {
            name,
            decl_type,
            not_null: false,
            default: None,
            pk: rank,
        }
    }
}

/// How an index came into existence, matching the `origin` column of
/// `PRAGMA index_list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IndexOrigin {
    /// Created by an explicit `CREATE INDEX` statement (`c`).
    CreateIndex,
    /// Implicitly created for a composite primary key (`pk`).
    PrimaryKey,
}

impl IndexOrigin {
    fn code(self) -> &'static str {
        match self {
            IndexOrigin::CreateIndex => "c",
            IndexOrigin::PrimaryKey => "pk",
        }
    }
}

/// Reference definition of a single index.
#[derive(Debug, Clone)]
pub(crate) struct IndexDesc {
    pub(crate) name: &'static str,
    pub(crate) unique: bool,
    pub(crate) origin: IndexOrigin,
    pub(crate) partial: bool,
    /// Indexed columns ordered by rank.
    pub(crate) columns: &'static [&'static str],
}

impl IndexDesc {
    pub(crate) const fn plain(name: &'static str, columns: &'static [&'static str]) -> Self {
        Self {
            name,
            unique: false,
            origin: IndexOrigin::CreateIndex,
            partial: false,
            columns,
        }
    }

    /// The implicit unique index SQLite creates for a composite primary key.
    pub(crate) const fn primary_key_auto(
        name: &'static str,
        columns: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            unique: true,
            origin: IndexOrigin::PrimaryKey,
            partial: false,
            columns,
        }
    }
}

/// Reference definition of a single table with its indices.
#[derive(Debug, Clone)]
pub(crate) struct TableDesc {
    pub(crate) name: &'static str,
    pub(crate) columns: Vec<ColumnDesc>,
    pub(crate) indices: Vec<IndexDesc>,
}

impl TableDesc {
    fn create_table_sql(&self, store: Store) -> String {
        let mut pk_columns: Vec<&ColumnDesc> =
            self.columns.iter().filter(|column| column.pk > 0).collect();
        pk_columns.sort_by_key(|column| column.pk);
        let inline_pk = pk_columns.len() == 1 && pk_columns[0].decl_type == "INTEGER";

        let mut defs = Vec::with_capacity(self.columns.len() + 1);
        for column in &self.columns {
            let mut def = format!("{} {}", column.name, column.decl_type);
            if column.not_null {
                def.push_str(" NOT NULL");
            }
            if let Some(default) = column.default {
                def.push_str(" DEFAULT ");
                def.push_str(default);
            }
            if inline_pk && column.pk == 1 {
                def.push_str(" PRIMARY KEY");
            }
            defs.push(def);
        }
        if !inline_pk && !pk_columns.is_empty() {
            let names: Vec<&str> = pk_columns.iter().map(|column| column.name).collect();
            defs.push(format!("PRIMARY KEY ( {} )", names.join(", ")));
        }
        format!(
            "CREATE TABLE {store}.{} ( {} );\n",
            self.name,
            defs.join(", ")
        )
    }

    fn create_index_sql(&self, store: Store) -> String {
        let mut ddl = String::new();
        for index in &self.indices {
            if index.origin != IndexOrigin::CreateIndex {
                continue;
            }
            let unique = if index.unique { "UNIQUE " } else { "" };
            ddl.push_str(&format!(
                "CREATE {unique}INDEX {store}.{} ON {} ( {} );\n",
                index.name,
                self.name,
                index.columns.join(", ")
            ));
        }
        ddl
    }
}

/// The catalog of both stores for one schema version.
#[derive(Debug)]
pub(crate) struct SchemaDesc {
    pub(crate) music: Vec<TableDesc>,
    pub(crate) perf: Vec<TableDesc>,
}

/// Builds the reference catalog for `version`.
pub(crate) fn registry(version: SchemaVersion) -> SchemaDesc {
    SchemaDesc {
        music: music::tables(version),
        perf: perf::tables(version),
    }
}

/// The `Information` table, identical in both stores and across versions.
pub(crate) fn information_table() -> TableDesc {
    TableDesc {
        name: "Information",
        columns: vec![
            ColumnDesc::primary_key("id"),
            ColumnDesc::new("uuid", "TEXT"),
            ColumnDesc::new("schemaVersionMajor", "INTEGER"),
            ColumnDesc::new("schemaVersionMinor", "INTEGER"),
            ColumnDesc::new("schemaVersionPatch", "INTEGER"),
            // The typo is part of the on-disk format.
            ColumnDesc::new("currentPlayedIndiciator", "INTEGER"),
            ColumnDesc::new("lastRekordBoxLibraryImportReadCounter", "INTEGER"),
        ],
        indices: vec![IndexDesc::plain("index_Information_id", &["id"])],
    }
}

/// Materializes the schema for `version` on an empty pair of stores and
/// writes the seed rows.
pub(crate) fn create(conn: &Connection, version: SchemaVersion) -> Result<()> {
    let desc = registry(version);
    create_store(conn, Store::Music, &desc.music)?;
    create_store(conn, Store::Perf, &desc.perf)?;

    let uuid = Uuid::new_v4();
    seed_information(conn, Store::Music, uuid, version)?;
    seed_information(conn, Store::Perf, uuid, version)?;
    // Placeholder artwork row that Track.idAlbumArt points at when a track
    // has no cover.
    conn.execute(
        "INSERT INTO music.AlbumArt (id, hash, albumArt) VALUES (1, NULL, NULL)",
        [],
    )?;
    log::debug!("created schema {version} with library uuid {uuid}");
    Ok(())
}

fn create_store(conn: &Connection, store: Store, tables: &[TableDesc]) -> Result<()> {
    let mut ddl = String::new();
    for table in tables {
        ddl.push_str(&table.create_table_sql(store));
        ddl.push_str(&table.create_index_sql(store));
    }
    conn.execute_batch(&ddl)?;
    Ok(())
}

fn seed_information(
    conn: &Connection,
    store: Store,
    uuid: Uuid,
    version: SchemaVersion,
) -> Result<()> {
    let semantic = version.semantic();
    conn.execute(
        &format!(
            "INSERT INTO {store}.Information ( \
               id, uuid, schemaVersionMajor, schemaVersionMinor, schemaVersionPatch, \
               currentPlayedIndiciator, lastRekordBoxLibraryImportReadCounter ) \
             VALUES ( 1, ?1, ?2, ?3, ?4, 0, 0 )"
        ),
        rusqlite::params![
            uuid.to_string(),
            semantic.major,
            semantic.minor,
            semantic.patch
        ],
    )?;
    Ok(())
}

/// Confirms that the catalog of both stores matches the reference definition
/// of `version` exactly.
pub(crate) fn validate(conn: &Connection, version: SchemaVersion) -> Result<()> {
    let desc = registry(version);
    validate_store(conn, Store::Music, &desc.music)?;
    validate_store(conn, Store::Perf, &desc.perf)?;
    log::trace!("catalog matches schema {version}");
    Ok(())
}

fn mismatch(message: String) -> Error {
    Error::DatabaseInconsistency(message)
}

fn validate_store(conn: &Connection, store: Store, tables: &[TableDesc]) -> Result<()> {
    let mut expected: Vec<&TableDesc> = tables.iter().collect();
    expected.sort_by_key(|table| table.name);

    let mut stmt = conn.prepare(&format!(
        "SELECT name FROM {store}.sqlite_master \
         WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name"
    ))?;
    let observed: Vec<String> = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<_>>()?;

    let mut position = 0;
    loop {
        match (expected.get(position), observed.get(position)) {
            (None, None) => break,
            (Some(exp), None) => {
                return Err(mismatch(format!("{store}: missing table {}", exp.name)))
            }
            (None, Some(obs)) => {
                return Err(mismatch(format!("{store}: unexpected table {obs}")))
            }
            (Some(exp), Some(obs)) if exp.name != obs.as_str() => {
                return Err(mismatch(format!(
                    "{store}: expected table {} but found {obs}",
                    exp.name
                )))
            }
            _ => {}
        }
        position += 1;
    }

    for table in expected {
        validate_columns(conn, store, table)?;
        validate_indices(conn, store, table)?;
    }
    Ok(())
}

struct ObservedColumn {
    name: String,
    decl_type: String,
    not_null: bool,
    default: Option<String>,
    pk: u8,
}

fn validate_columns(conn: &Connection, store: Store, table: &TableDesc) -> Result<()> {
    let mut expected: Vec<&ColumnDesc> = table.columns.iter().collect();
    expected.sort_by_key(|column| column.name);

    let mut stmt = conn.prepare(&format!("PRAGMA {store}.table_info('{}')", table.name))?;
    let mut observed: Vec<ObservedColumn> = stmt
        .query_map([], |row| {
            Ok(ObservedColumn {
                name: row.get(1)?,
                decl_type: row.get(2)?,
                not_null: row.get(3)?,
                default: row.get(4)?,
                pk: row.get(5)?,
            })
        })?
        .collect::<rusqlite::Result<_>>()?;
    observed.sort_by(|a, b| a.name.cmp(&b.name));

    let mut position = 0;
    loop {
        let (exp, obs) = match (expected.get(position), observed.get(position)) {
            (None, None) => break,
            (Some(exp), None) => {
                return Err(mismatch(format!(
                    "{store}.{}: missing column {}",
                    table.name, exp.name
                )))
            }
            (None, Some(obs)) => {
                return Err(mismatch(format!(
                    "{store}.{}: unexpected column {}",
                    table.name, obs.name
                )))
            }
            (Some(exp), Some(obs)) => (*exp, obs),
        };
        if exp.name != obs.name {
            return Err(mismatch(format!(
                "{store}.{}: expected column {} but found {}",
                table.name, exp.name, obs.name
            )));
        }
        let qualified = format!("{store}.{}.{}", table.name, exp.name);
        if exp.decl_type != obs.decl_type {
            return Err(mismatch(format!(
                "{qualified}: declared type {} but expected {}",
                obs.decl_type, exp.decl_type
            )));
        }
        if exp.not_null != obs.not_null {
            return Err(mismatch(format!(
                "{qualified}: nullability differs from the reference schema"
            )));
        }
        if exp.default != obs.default.as_deref() {
            return Err(mismatch(format!(
                "{qualified}: default value differs from the reference schema"
            )));
        }
        if exp.pk != obs.pk {
            return Err(mismatch(format!(
                "{qualified}: primary key membership differs from the reference schema"
            )));
        }
        position += 1;
    }
    Ok(())
}

struct ObservedIndex {
    name: String,
    unique: bool,
    origin: String,
    partial: bool,
}

fn validate_indices(conn: &Connection, store: Store, table: &TableDesc) -> Result<()> {
    let mut expected: Vec<&IndexDesc> = table.indices.iter().collect();
    expected.sort_by_key(|index| index.name);

    let mut stmt = conn.prepare(&format!("PRAGMA {store}.index_list('{}')", table.name))?;
    let mut observed: Vec<ObservedIndex> = stmt
        .query_map([], |row| {
            Ok(ObservedIndex {
                name: row.get(1)?,
                unique: row.get(2)?,
                origin: row.get(3)?,
                partial: row.get(4)?,
            })
        })?
        .collect::<rusqlite::Result<_>>()?;
    observed.sort_by(|a, b| a.name.cmp(&b.name));

    let mut position = 0;
    loop {
        let (exp, obs) = match (expected.get(position), observed.get(position)) {
            (None, None) => break,
            (Some(exp), None) => {
                return Err(mismatch(format!(
                    "{store}.{}: missing index {}",
                    table.name, exp.name
                )))
            }
            (None, Some(obs)) => {
                return Err(mismatch(format!(
                    "{store}.{}: unexpected index {}",
                    table.name, obs.name
                )))
            }
            (Some(exp), Some(obs)) => (*exp, obs),
        };
        if exp.name != obs.name {
            return Err(mismatch(format!(
                "{store}.{}: expected index {} but found {}",
                table.name, exp.name, obs.name
            )));
        }
        let qualified = format!("{store}.{}.{}", table.name, exp.name);
        if exp.unique != obs.unique {
            return Err(mismatch(format!(
                "{qualified}: uniqueness differs from the reference schema"
            )));
        }
        if exp.origin.code() != obs.origin {
            return Err(mismatch(format!(
                "{qualified}: created as '{}' but expected '{}'",
                obs.origin,
                exp.origin.code()
            )));
        }
        if exp.partial != obs.partial {
            return Err(mismatch(format!(
                "{qualified}: partiality differs from the reference schema"
            )));
        }
        validate_index_columns(conn, store, table, exp)?;
        position += 1;
    }
    Ok(())
}

fn validate_index_columns(
    conn: &Connection,
    store: Store,
    table: &TableDesc,
    index: &IndexDesc,
) -> Result<()> {
    let mut stmt = conn.prepare(&format!("PRAGMA {store}.index_info('{}')", index.name))?;
    let mut observed: Vec<(i64, Option<String>)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(2)?)))?
        .collect::<rusqlite::Result<_>>()?;
    observed.sort_by_key(|(seqno, _)| *seqno);

    let qualified = format!("{store}.{}.{}", table.name, index.name);
    if observed.len() != index.columns.len() {
        return Err(mismatch(format!(
            "{qualified}: indexes {} columns but expected {}",
            observed.len(),
            index.columns.len()
        )));
    }
    for (rank, (expected_name, (_, observed_name))) in
        index.columns.iter().zip(&observed).enumerate()
    {
        if observed_name.as_deref() != Some(*expected_name) {
            return Err(mismatch(format!(
                "{qualified}: column at rank {rank} is {} but expected {expected_name}",
                observed_name.as_deref().unwrap_or("<expression>")
            )));
        }
    }
    Ok(())
}

/// Reads the schema version of an opened library.
///
/// Both stores must contain an `Information` table with a single row, and
/// the version triples must agree. The ambiguous 1.18.0 tuple is resolved by
/// probing the declared type of `Track.isExternalTrack`.
pub(crate) fn detect(conn: &Connection) -> Result<SchemaVersion> {
    let information_tables: i64 = conn.query_row(
        "SELECT (SELECT COUNT(*) FROM music.sqlite_master \
                 WHERE type = 'table' AND name = 'Information') \
              + (SELECT COUNT(*) FROM perfdata.sqlite_master \
                 WHERE type = 'table' AND name = 'Information')",
        [],
        |row| row.get(0),
    )?;
    if information_tables != 2 {
        return Err(mismatch(format!(
            "expected an Information table in both stores, found {information_tables}"
        )));
    }

    let music = read_information_version(conn, Store::Music)?;
    let perf = read_information_version(conn, Store::Perf)?;
    if music != perf {
        return Err(mismatch(format!(
            "music store is at schema {music} but performance store is at {perf}"
        )));
    }

    let version = match (music.major, music.minor, music.patch) {
        (1, 6, 0) => SchemaVersion::V1_6_0,
        (1, 7, 1) => SchemaVersion::V1_7_1,
        (1, 9, 1) => SchemaVersion::V1_9_1,
        (1, 11, 1) => SchemaVersion::V1_11_1,
        (1, 13, 0) => SchemaVersion::V1_13_0,
        (1, 13, 1) => SchemaVersion::V1_13_1,
        (1, 13, 2) => SchemaVersion::V1_13_2,
        (1, 15, 0) => SchemaVersion::V1_15_0,
        (1, 17, 0) => SchemaVersion::V1_17_0,
        (1, 18, 0) => disambiguate_1_18_0(conn)?,
        _ => return Err(Error::UnsupportedSchema(music)),
    };
    log::trace!("detected schema version {version}");
    Ok(version)
}

fn read_information_version(conn: &Connection, store: Store) -> Result<SemanticVersion> {
    let mut stmt = conn.prepare(&format!(
        "SELECT schemaVersionMajor, schemaVersionMinor, schemaVersionPatch \
         FROM {store}.Information"
    ))?;
    let rows: Vec<(u32, u32, u32)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
        .collect::<rusqlite::Result<_>>()?;
    match rows.as_slice() {
        [] => Err(mismatch(format!("{store} store has no Information row"))),
        [(major, minor, patch)] => Ok(SemanticVersion::new(*major, *minor, *patch)),
        _ => Err(mismatch(format!(
            "{store} store has {} Information rows",
            rows.len()
        ))),
    }
}

fn disambiguate_1_18_0(conn: &Connection) -> Result<SchemaVersion> {
    let decl_type = column_decl_type(conn, Store::Music, "Track", "isExternalTrack")?
        .ok_or_else(|| mismatch("music.Track has no isExternalTrack column".to_string()))?;
    if decl_type == "NUMERIC" {
        Ok(SchemaVersion::V1_18_0_FW)
    } else {
        Ok(SchemaVersion::V1_18_0_EP)
    }
}

fn column_decl_type(
    conn: &Connection,
    store: Store,
    table: &str,
    column: &str,
) -> Result<Option<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA {store}.table_info('{table}')"))?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(1)?, row.get::<_, String>(2)?))
    })?;
    for row in rows {
        let (name, decl_type) = row?;
        if name == column {
            return Ok(Some(decl_type));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod test {
    use super::*;

    fn empty_library() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "ATTACH DATABASE ':memory:' AS music; ATTACH DATABASE ':memory:' AS perfdata;",
        )
        .unwrap();
        conn
    }

    #[test]
    fn create_then_validate_roundtrip() {
        for version in SchemaVersion::ALL {
            let conn = empty_library();
            create(&conn, version).unwrap();
            validate(&conn, version).unwrap();
            assert_eq!(detect(&conn).unwrap(), version);
        }
    }

    #[test]
    fn variant_catalogs_differ_only_in_boolean_types() {
        let conn = empty_library();
        create(&conn, SchemaVersion::V1_18_0_FW).unwrap();
        let err = validate(&conn, SchemaVersion::V1_18_0_EP).unwrap_err();
        assert!(matches!(err, Error::DatabaseInconsistency(_)));
        assert!(err.to_string().contains("declared type"));
    }

    #[test]
    fn missing_index_is_reported_by_name() {
        let conn = empty_library();
        create(&conn, SchemaVersion::V1_15_0).unwrap();
        conn.execute_batch("DROP INDEX music.index_Track_path;")
            .unwrap();
        let err = validate(&conn, SchemaVersion::V1_15_0).unwrap_err();
        assert!(err.to_string().contains("index_Track_path"), "{err}");
    }

    #[test]
    fn extra_table_is_reported_by_name() {
        let conn = empty_library();
        create(&conn, SchemaVersion::V1_15_0).unwrap();
        conn.execute_batch("CREATE TABLE music.Zebra ( id INTEGER );")
            .unwrap();
        let err = validate(&conn, SchemaVersion::V1_15_0).unwrap_err();
        assert!(err.to_string().contains("Zebra"), "{err}");
    }

    #[test]
    fn wrong_column_type_is_reported() {
        let conn = empty_library();
        create(&conn, SchemaVersion::V1_6_0).unwrap();
        conn.execute_batch(
            "DROP TABLE music.Playlist; \
             CREATE TABLE music.Playlist ( id INTEGER PRIMARY KEY, title BLOB ); \
             CREATE INDEX music.index_Playlist_id ON Playlist ( id );",
        )
        .unwrap();
        let err = validate(&conn, SchemaVersion::V1_6_0).unwrap_err();
        assert!(err.to_string().contains("Playlist.title"), "{err}");
    }

    #[test]
    fn disagreeing_versions_are_rejected() {
        let conn = empty_library();
        create(&conn, SchemaVersion::V1_15_0).unwrap();
        conn.execute(
            "UPDATE perfdata.Information SET schemaVersionMinor = 17",
            [],
        )
        .unwrap();
        assert!(matches!(
            detect(&conn),
            Err(Error::DatabaseInconsistency(_))
        ));
    }

    #[test]
    fn unknown_version_is_rejected() {
        let conn = empty_library();
        create(&conn, SchemaVersion::V1_15_0).unwrap();
        conn.execute_batch(
            "UPDATE music.Information SET schemaVersionMinor = 99; \
             UPDATE perfdata.Information SET schemaVersionMinor = 99;",
        )
        .unwrap();
        assert!(matches!(detect(&conn), Err(Error::UnsupportedSchema(_))));
    }

    #[test]
    fn duplicate_information_row_is_rejected() {
        let conn = empty_library();
        create(&conn, SchemaVersion::V1_15_0).unwrap();
        conn.execute(
            "INSERT INTO music.Information ( \
               id, uuid, schemaVersionMajor, schemaVersionMinor, schemaVersionPatch, \
               currentPlayedIndiciator, lastRekordBoxLibraryImportReadCounter ) \
             VALUES ( 2, 'x', 1, 15, 0, 0, 0 )",
            [],
        )
        .unwrap();
        assert!(matches!(
            detect(&conn),
            Err(Error::DatabaseInconsistency(_))
        ));
    }
}
