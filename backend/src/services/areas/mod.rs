//! # Area Service Module
//!
//! Areas are the geospatial subdivisions of a ward. Each carries a token pool
//! and an assignment status driven by the request / approve / reject /
//! withdraw flow.
//!
//! ## Sub-modules:
//! - `register`: admin registration of a new area inside a ward.
//! - `get`: returns one area.
//! - `tokens`: registers and lists an area's token pool.
//! - `status`: the assignment state machine.

mod get;
pub mod record;
pub mod register;
pub mod status;
pub mod tokens;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/areas";

/// Configures and returns the Actix `Scope` for area routes.
///
/// # Registered Routes:
///
/// *   **`POST /`**: `register::process`, admin only.
/// *   **`GET /{area_id}`**: `get::process`.
/// *   **`GET /{area_id}/tokens`**: `tokens::list`, optional `status` filter.
/// *   **`POST /{area_id}/tokens`**: `tokens::register`, admin only.
/// *   **`POST /{area_id}/request`**: `status::request`.
/// *   **`POST /{area_id}/approve`**, **`POST /{area_id}/reject`**: admin only.
/// *   **`POST /{area_id}/withdraw`**: owner or admin.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", post().to(register::process))
        .route("/{area_id}", get().to(get::process))
        .route("/{area_id}/tokens", get().to(tokens::list))
        .route("/{area_id}/tokens", post().to(tokens::register))
        .route("/{area_id}/request", post().to(status::request))
        .route("/{area_id}/approve", post().to(status::approve))
        .route("/{area_id}/reject", post().to(status::reject))
        .route("/{area_id}/withdraw", post().to(status::withdraw))
}
