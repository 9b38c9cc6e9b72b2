//! # Geo Service Module
//!
//! Point lookup against the stored ward and area polygons.

mod locate;

use actix_web::web::{get, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/geo";

/// *   **`GET /locate?lng=..&lat=..`**: `locate::process`.
pub fn configure_routes() -> Scope {
    scope(API_PATH).route("/locate", get().to(locate::process))
}
