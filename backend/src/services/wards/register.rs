use crate::db::{row_exists, Database};
use crate::error::ApiError;
use crate::identity::Caller;
use actix_web::{web, HttpResponse};
use common::model::ward::Ward;
use common::requests::RegisterWardRequest;
use log::info;
use rusqlite::{params, Connection, TransactionBehavior};

/// `POST /api/wards` (admin only)
pub(crate) async fn process(
    db: web::Data<Database>,
    caller: Caller,
    payload: web::Json<RegisterWardRequest>,
) -> Result<HttpResponse, ApiError> {
    caller.require_admin()?;
    let request = payload.into_inner();
    let ward = db.run(move |conn| register_ward(conn, request)).await?;
    Ok(HttpResponse::Created().json(ward))
}

pub fn register_ward(conn: &mut Connection, request: RegisterWardRequest) -> Result<Ward, ApiError> {
    request
        .geometry
        .validate_polygon()
        .map_err(|e| ApiError::Validation(format!("ward geometry: {}", e)))?;
    let geometry =
        serde_json::to_string(&request.geometry).map_err(|e| ApiError::Internal(e.to_string()))?;

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    if row_exists(&tx, "wards", "ward_number", &request.ward_number)? {
        return Err(ApiError::Conflict(format!(
            "ward {} already exists",
            request.ward_number
        )));
    }
    tx.execute(
        "INSERT INTO wards (ward_number, ward_area_code, geometry) VALUES (?1, ?2, ?3)",
        params![request.ward_number, request.ward_area_code, geometry],
    )?;
    tx.commit()?;

    info!("registered ward {}", request.ward_number);
    Ok(Ward {
        ward_number: request.ward_number,
        ward_area_code: request.ward_area_code,
        geometry: request.geometry,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{memory, seeded};
    use common::model::geometry::Geometry;

    fn request(ward_number: i64) -> RegisterWardRequest {
        RegisterWardRequest {
            ward_number,
            ward_area_code: 100 + ward_number,
            geometry: Geometry::Polygon {
                coordinates: vec![vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]],
            },
        }
    }

    #[test]
    fn registers_ward_once() {
        let mut conn = memory();
        let ward = register_ward(&mut conn, request(4)).unwrap();
        assert_eq!(ward.ward_area_code, 104);

        let mut conn = seeded();
        assert!(matches!(
            register_ward(&mut conn, request(1)),
            Err(ApiError::Conflict(_))
        ));
    }

    #[test]
    fn rejects_point_geometry() {
        let mut conn = memory();
        let mut bad = request(2);
        bad.geometry = Geometry::point(1.0, 1.0);
        assert!(matches!(
            register_ward(&mut conn, bad),
            Err(ApiError::Validation(_))
        ));
    }
}
