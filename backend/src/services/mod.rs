//! HTTP surface of the survey admin backend.

pub mod areas;
pub mod entities;
pub mod geo;
pub mod users;
pub mod wards;

#[cfg(test)]
mod tests;

use crate::error::ApiError;
use actix_web::web;

/// Registers every API scope plus extractor configuration that turns
/// malformed JSON, query strings and paths into `ApiError` responses.
pub fn configure(cfg: &mut web::ServiceConfig, json_limit: usize) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(json_limit)
            .error_handler(|err, _req| ApiError::Validation(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| ApiError::Validation(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| ApiError::NotFound(err.to_string()).into()),
    )
    .service(entities::configure_routes())
    .service(areas::configure_routes())
    .service(wards::configure_routes())
    .service(users::configure_routes())
    .service(geo::configure_routes());
}
