use crate::db::Database;
use crate::error::ApiError;
use crate::services::areas::record::areas_of_ward;
use crate::services::wards::list::list_wards;
use actix_web::{web, HttpResponse};
use common::requests::LocateQuery;
use common::responses::LocateResult;
use rusqlite::Connection;

/// `GET /api/geo/locate?lng=..&lat=..`
pub(crate) async fn process(
    db: web::Data<Database>,
    query: web::Query<LocateQuery>,
) -> Result<HttpResponse, ApiError> {
    let LocateQuery { lng, lat } = query.into_inner();
    let result = db.run(move |conn| locate(conn, lng, lat)).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// Finds the ward containing the point and, within it, the area containing
/// the point. Polygons are scanned in memory; a ward holds tens of areas.
pub fn locate(conn: &mut Connection, lng: f64, lat: f64) -> Result<LocateResult, ApiError> {
    if !lng.is_finite() || !lat.is_finite() {
        return Err(ApiError::Validation(
            "coordinates must be finite numbers".to_string(),
        ));
    }
    let point = [lng, lat];

    let ward = list_wards(conn)?
        .into_iter()
        .find(|ward| ward.geometry.contains(point))
        .ok_or_else(|| ApiError::NotFound(format!("no ward contains ({}, {})", lng, lat)))?;

    let area = areas_of_ward(conn, ward.ward_number)?
        .into_iter()
        .find(|area| area.geometry.contains(point));

    Ok(LocateResult {
        ward_number: ward.ward_number,
        area_code: area.as_ref().map(|a| a.code),
        area_id: area.map(|a| a.id),
    })
}
