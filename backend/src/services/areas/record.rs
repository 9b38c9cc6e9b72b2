use crate::db::{enum_column, json_column};
use crate::error::ApiError;
use common::model::area::{Area, AreaStatus};
use rusqlite::{params, Connection, OptionalExtension, Row};

pub const AREA_COLUMNS: &str = "id, code, ward_number, geometry, centroid, status, assigned_to";

pub fn area_from_row(row: &Row<'_>) -> rusqlite::Result<Area> {
    Ok(Area {
        id: row.get(0)?,
        code: row.get(1)?,
        ward_number: row.get(2)?,
        geometry: json_column(row, 3)?,
        centroid: json_column(row, 4)?,
        status: enum_column(row, 5, AreaStatus::parse)?,
        assigned_to: row.get(6)?,
    })
}

pub fn load_area(conn: &Connection, area_id: &str) -> Result<Area, ApiError> {
    conn.query_row(
        &format!("SELECT {AREA_COLUMNS} FROM areas WHERE id = ?1"),
        params![area_id],
        area_from_row,
    )
    .optional()?
    .ok_or_else(|| ApiError::NotFound(format!("area {} does not exist", area_id)))
}

pub fn areas_of_ward(conn: &Connection, ward_number: i64) -> rusqlite::Result<Vec<Area>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {AREA_COLUMNS} FROM areas WHERE ward_number = ?1 ORDER BY code"
    ))?;
    let rows = stmt.query_map(params![ward_number], area_from_row)?;
    rows.collect()
}
