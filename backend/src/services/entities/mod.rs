//! # Entity Service Module
//!
//! Survey subjects (buildings, businesses and families) and the procedures
//! that keep their ward, area, enumerator and token references valid. Every
//! route is parameterised by `{kind}`: `building`, `business` or `family`.
//!
//! ## Sub-modules:
//! - `intake`: records a new survey form, resolving whatever references it can.
//! - `get`: returns one stored record.
//! - `assign_ward`, `assign_area`, `assign_enumerator`: the assignment
//!   procedures. Each writes a reference and its validity flag in one
//!   transaction.
//! - `invalid`: paged listing of records with at least one false flag.
//! - `revalidate`: recomputes flags from the live references.

pub mod assign_area;
pub mod assign_enumerator;
pub mod assign_ward;
mod get;
pub mod intake;
pub mod invalid;
pub mod record;
pub mod revalidate;

use actix_web::web::{get, post, put, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/entities";

/// Configures and returns the Actix `Scope` for entity routes.
///
/// # Registered Routes:
///
/// *   **`GET /{kind}/invalid`**: `invalid::process`. Query parameters `ward`,
///     `area_id`, `enumerator_id`, `flag`, `limit`, `offset`.
/// *   **`POST /{kind}/revalidate`**: `revalidate::process`, admin only.
/// *   **`POST /{kind}`**: `intake::process`, returns `201` with the record.
/// *   **`GET /{kind}/{id}`**: `get::process`.
/// *   **`PUT /{kind}/{id}/ward`**: `assign_ward::process`.
/// *   **`PUT /{kind}/{id}/area`**: `assign_area::process`; area and token
///     are always submitted together.
/// *   **`PUT /{kind}/{id}/enumerator`**: `assign_enumerator::process`.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        // Fixed segments first so they are not captured by `{id}`.
        .route("/{kind}/invalid", get().to(invalid::process))
        .route("/{kind}/revalidate", post().to(revalidate::process))
        .route("/{kind}", post().to(intake::process))
        .route("/{kind}/{id}", get().to(get::process))
        .route("/{kind}/{id}/ward", put().to(assign_ward::process))
        .route("/{kind}/{id}/area", put().to(assign_area::process))
        .route("/{kind}/{id}/enumerator", put().to(assign_enumerator::process))
}
