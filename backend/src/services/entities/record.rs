//! Row mapping and lookups shared by the entity procedures.

use crate::db::entity_table;
use crate::error::ApiError;
use common::model::entity::{EntityKind, EntityRecord, InvalidFlag};
use regex::Regex;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::LazyLock;

pub const ENTITY_COLUMNS: &str = "id, ward_id, area_id, enumerator_id, enumerator_name, \
    building_token, is_ward_valid, is_area_valid, is_enumerator_valid, \
    is_building_token_valid, tmp_ward_number, tmp_area_code, tmp_enumerator_id";

static ENUMERATOR_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9-]{1,64}$").expect("valid enumerator regex"));

pub fn flag_column(flag: InvalidFlag) -> &'static str {
    match flag {
        InvalidFlag::Ward => "is_ward_valid",
        InvalidFlag::Area => "is_area_valid",
        InvalidFlag::Enumerator => "is_enumerator_valid",
        InvalidFlag::Token => "is_building_token_valid",
    }
}

pub fn entity_from_row(kind: EntityKind, row: &Row<'_>) -> rusqlite::Result<EntityRecord> {
    Ok(EntityRecord {
        id: row.get(0)?,
        kind,
        ward_id: row.get(1)?,
        area_id: row.get(2)?,
        enumerator_id: row.get(3)?,
        enumerator_name: row.get(4)?,
        building_token: row.get(5)?,
        is_ward_valid: row.get(6)?,
        is_area_valid: row.get(7)?,
        is_enumerator_valid: row.get(8)?,
        is_building_token_valid: row.get(9)?,
        tmp_ward_number: row.get(10)?,
        tmp_area_code: row.get(11)?,
        tmp_enumerator_id: row.get(12)?,
    })
}

pub fn find_entity(
    conn: &Connection,
    kind: EntityKind,
    id: &str,
) -> rusqlite::Result<Option<EntityRecord>> {
    let sql = format!(
        "SELECT {ENTITY_COLUMNS} FROM {} WHERE id = ?1",
        entity_table(kind)
    );
    conn.query_row(&sql, params![id], |row| entity_from_row(kind, row))
        .optional()
}

pub fn load_entity(conn: &Connection, kind: EntityKind, id: &str) -> Result<EntityRecord, ApiError> {
    find_entity(conn, kind, id)?
        .ok_or_else(|| ApiError::NotFound(format!("{} {} does not exist", kind.as_str(), id)))
}

/// Validates the shape of an enumerator code typed by a user.
pub fn check_enumerator_prefix(prefix: &str) -> Result<&str, ApiError> {
    let prefix = prefix.trim();
    if ENUMERATOR_PREFIX.is_match(prefix) {
        Ok(prefix)
    } else {
        Err(ApiError::Validation(format!(
            "'{}' is not a valid enumerator code (letters, digits and '-')",
            prefix
        )))
    }
}

/// Enumerators whose id starts with `prefix`, ignoring case. An id equal to
/// `prefix` wins outright and is returned alone; otherwise at most two are
/// returned, which is enough to tell a unique match from an ambiguous one.
pub fn enumerators_matching(
    conn: &Connection,
    prefix: &str,
) -> rusqlite::Result<Vec<(String, String)>> {
    let mut stmt = conn.prepare(
        "SELECT id, name FROM users
         WHERE role = 'enumerator'
           AND substr(lower(id), 1, length(?1)) = lower(?1)
         ORDER BY lower(id) = lower(?1) DESC, id
         LIMIT 2",
    )?;
    let rows = stmt.query_map(params![prefix], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;
    let mut found = rows.collect::<rusqlite::Result<Vec<_>>>()?;
    if found
        .first()
        .is_some_and(|(id, _)| id.eq_ignore_ascii_case(prefix))
    {
        found.truncate(1);
    }
    Ok(found)
}
