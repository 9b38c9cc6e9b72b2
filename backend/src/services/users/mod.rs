//! # User Service Module
//!
//! Admin registration of dashboard users and field enumerators.

mod register;

use actix_web::web::{post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/users";

/// *   **`POST /`**: `register::process`, admin only.
pub fn configure_routes() -> Scope {
    scope(API_PATH).route("", post().to(register::process))
}
