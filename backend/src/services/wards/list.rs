use crate::db::{json_column, row_exists, Database};
use crate::error::ApiError;
use crate::services::areas::record::areas_of_ward;
use actix_web::{web, HttpResponse};
use common::model::area::Area;
use common::model::ward::Ward;
use rusqlite::{Connection, Row};

pub(crate) async fn wards(db: web::Data<Database>) -> Result<HttpResponse, ApiError> {
    let wards = db.run(list_wards).await?;
    Ok(HttpResponse::Ok().json(wards))
}

pub(crate) async fn areas(
    db: web::Data<Database>,
    ward_number: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let ward_number = ward_number.into_inner();
    let areas = db.run(move |conn| list_areas(conn, ward_number)).await?;
    Ok(HttpResponse::Ok().json(areas))
}

pub fn ward_from_row(row: &Row<'_>) -> rusqlite::Result<Ward> {
    Ok(Ward {
        ward_number: row.get(0)?,
        ward_area_code: row.get(1)?,
        geometry: json_column(row, 2)?,
    })
}

pub fn list_wards(conn: &mut Connection) -> Result<Vec<Ward>, ApiError> {
    let mut stmt = conn.prepare(
        "SELECT ward_number, ward_area_code, geometry FROM wards ORDER BY ward_number",
    )?;
    let rows = stmt.query_map([], ward_from_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub fn list_areas(conn: &mut Connection, ward_number: i64) -> Result<Vec<Area>, ApiError> {
    if !row_exists(conn, "wards", "ward_number", &ward_number)? {
        return Err(ApiError::NotFound(format!(
            "ward {} does not exist",
            ward_number
        )));
    }
    Ok(areas_of_ward(conn, ward_number)?)
}
