//! # Ward Service Module
//!
//! Reference table of wards: registration and the listings the dashboard
//! uses to populate its ward and area dropdowns.

pub mod list;
pub mod register;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/wards";

/// Configures and returns the Actix `Scope` for ward routes.
///
/// *   **`GET /`**: `list::wards`.
/// *   **`POST /`**: `register::process`, admin only.
/// *   **`GET /{ward_number}/areas`**: `list::areas`.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(list::wards))
        .route("", post().to(register::process))
        .route("/{ward_number}/areas", get().to(list::areas))
}
