use crate::db::Database;
use crate::error::ApiError;
use crate::services::areas::record::load_area;
use actix_web::{web, HttpResponse};

/// `GET /api/areas/{area_id}`
pub(crate) async fn process(
    db: web::Data<Database>,
    area_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let area_id = area_id.into_inner();
    let area = db.run(move |conn| load_area(conn, &area_id)).await?;
    Ok(HttpResponse::Ok().json(area))
}
