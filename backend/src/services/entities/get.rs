use crate::db::Database;
use crate::error::ApiError;
use crate::services::entities::record::load_entity;
use actix_web::{web, HttpResponse};
use common::model::entity::EntityKind;

/// `GET /api/entities/{kind}/{id}`
pub(crate) async fn process(
    db: web::Data<Database>,
    path: web::Path<(EntityKind, String)>,
) -> Result<HttpResponse, ApiError> {
    let (kind, id) = path.into_inner();
    let record = db.run(move |conn| load_entity(conn, kind, &id)).await?;
    Ok(HttpResponse::Ok().json(record))
}
