use crate::db::{row_exists, Database};
use crate::error::ApiError;
use crate::identity::Caller;
use crate::services::areas::record::load_area;
use actix_web::{web, HttpResponse};
use common::model::area::Area;
use common::requests::RegisterAreaRequest;
use log::info;
use rusqlite::{params, Connection, TransactionBehavior};

/// `POST /api/areas` (admin only)
pub(crate) async fn process(
    db: web::Data<Database>,
    caller: Caller,
    payload: web::Json<RegisterAreaRequest>,
) -> Result<HttpResponse, ApiError> {
    caller.require_admin()?;
    let request = payload.into_inner();
    let area = db.run(move |conn| register_area(conn, &request)).await?;
    Ok(HttpResponse::Created().json(area))
}

/// Stores a new, unassigned area inside an existing ward. The centroid is
/// derived from the polygon.
pub fn register_area(conn: &mut Connection, request: &RegisterAreaRequest) -> Result<Area, ApiError> {
    request
        .geometry
        .validate_polygon()
        .map_err(|e| ApiError::Validation(format!("area geometry: {}", e)))?;
    let centroid = request
        .geometry
        .centroid()
        .ok_or_else(|| ApiError::Validation("area geometry has no centroid".to_string()))?;

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    if !row_exists(&tx, "wards", "ward_number", &request.ward_number)? {
        return Err(ApiError::NotFound(format!(
            "ward {} does not exist",
            request.ward_number
        )));
    }
    let duplicate = tx
        .query_row(
            "SELECT COUNT(*) FROM areas WHERE ward_number = ?1 AND code = ?2",
            params![request.ward_number, request.code],
            |row| row.get::<_, i64>(0),
        )?
        > 0;
    if duplicate {
        return Err(ApiError::Conflict(format!(
            "ward {} already has an area with code {}",
            request.ward_number, request.code
        )));
    }

    let id = uuid::Uuid::new_v4().to_string();
    let geometry = serde_json::to_string(&request.geometry)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let centroid = serde_json::to_string(&centroid).map_err(|e| ApiError::Internal(e.to_string()))?;
    tx.execute(
        "INSERT INTO areas (id, code, ward_number, geometry, centroid) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![id, request.code, request.ward_number, geometry, centroid],
    )?;
    let area = load_area(&tx, &id)?;
    tx.commit()?;

    info!(
        "registered area {} (code {}) in ward {}",
        area.id, area.code, area.ward_number
    );
    Ok(area)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::seeded;
    use common::model::area::AreaStatus;
    use common::model::geometry::Geometry;

    fn request(code: i64, ward_number: i64) -> RegisterAreaRequest {
        RegisterAreaRequest {
            code,
            ward_number,
            geometry: Geometry::Polygon {
                coordinates: vec![vec![[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0], [0.0, 0.0]]],
            },
        }
    }

    #[test]
    fn registers_unassigned_area_with_centroid() {
        let mut conn = seeded();
        let area = register_area(&mut conn, &request(3, 1)).unwrap();
        assert_eq!(area.status, AreaStatus::Unassigned);
        assert_eq!(area.assigned_to, None);
        assert_eq!(area.centroid, Geometry::point(1.0, 1.0));
    }

    #[test]
    fn rejects_duplicate_code_and_unknown_ward() {
        let mut conn = seeded();
        assert!(matches!(
            register_area(&mut conn, &request(1, 1)),
            Err(ApiError::Conflict(_))
        ));
        assert!(matches!(
            register_area(&mut conn, &request(1, 7)),
            Err(ApiError::NotFound(_))
        ));
    }
}
