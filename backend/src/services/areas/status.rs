//! Area assignment state machine.
//!
//! ```text
//! unassigned --request--> pending --approve--> assigned
//!      ^                     |                    |
//!      +-------reject--------+                    |
//!      +-------------------withdraw---------------+
//! ```
//!
//! A pending area can also be withdrawn by the user who requested it. The
//! owning user is recorded on request and cleared whenever the area returns
//! to `unassigned`.

use crate::db::{row_exists, Database};
use crate::error::ApiError;
use crate::identity::Caller;
use crate::services::areas::record::load_area;
use actix_web::{web, HttpResponse};
use common::model::area::{Area, AreaStatus};
use common::responses::Ack;
use log::info;
use rusqlite::{params, Connection, Transaction, TransactionBehavior};

/// `POST /api/areas/{area_id}/request`
pub(crate) async fn request(
    db: web::Data<Database>,
    caller: Caller,
    area_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let area_id = area_id.into_inner();
    db.run(move |conn| request_area(conn, &area_id, &caller))
        .await?;
    Ok(HttpResponse::Ok().json(Ack::ok()))
}

/// `POST /api/areas/{area_id}/approve` (admin only)
pub(crate) async fn approve(
    db: web::Data<Database>,
    caller: Caller,
    area_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let area_id = area_id.into_inner();
    db.run(move |conn| approve_area(conn, &area_id, &caller))
        .await?;
    Ok(HttpResponse::Ok().json(Ack::ok()))
}

/// `POST /api/areas/{area_id}/reject` (admin only)
pub(crate) async fn reject(
    db: web::Data<Database>,
    caller: Caller,
    area_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let area_id = area_id.into_inner();
    db.run(move |conn| reject_area(conn, &area_id, &caller))
        .await?;
    Ok(HttpResponse::Ok().json(Ack::ok()))
}

/// `POST /api/areas/{area_id}/withdraw`
pub(crate) async fn withdraw(
    db: web::Data<Database>,
    caller: Caller,
    area_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let area_id = area_id.into_inner();
    db.run(move |conn| withdraw_area(conn, &area_id, &caller))
        .await?;
    Ok(HttpResponse::Ok().json(Ack::ok()))
}

pub fn request_area(conn: &mut Connection, area_id: &str, caller: &Caller) -> Result<(), ApiError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let area = load_area(&tx, area_id)?;
    expect_status(&area, AreaStatus::Unassigned)?;
    if !row_exists(&tx, "users", "id", &caller.user_id)? {
        return Err(ApiError::NotFound(format!(
            "user {} does not exist",
            caller.user_id
        )));
    }
    set_status(&tx, area_id, AreaStatus::Pending, Some(caller.user_id.as_str()))?;
    tx.commit()?;
    info!("area {} requested by {}", area_id, caller.user_id);
    Ok(())
}

pub fn approve_area(conn: &mut Connection, area_id: &str, caller: &Caller) -> Result<(), ApiError> {
    caller.require_admin()?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let area = load_area(&tx, area_id)?;
    expect_status(&area, AreaStatus::Pending)?;
    set_status(&tx, area_id, AreaStatus::Assigned, area.assigned_to.as_deref())?;
    tx.commit()?;
    info!("area {} approved by {}", area_id, caller.user_id);
    Ok(())
}

pub fn reject_area(conn: &mut Connection, area_id: &str, caller: &Caller) -> Result<(), ApiError> {
    caller.require_admin()?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let area = load_area(&tx, area_id)?;
    expect_status(&area, AreaStatus::Pending)?;
    set_status(&tx, area_id, AreaStatus::Unassigned, None)?;
    tx.commit()?;
    info!("area {} request rejected by {}", area_id, caller.user_id);
    Ok(())
}

/// Returns an assigned or pending area to `unassigned`. Only its owner or an
/// admin may do so; withdrawing an already unassigned area is a no-op for an
/// admin.
pub fn withdraw_area(conn: &mut Connection, area_id: &str, caller: &Caller) -> Result<(), ApiError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let area = load_area(&tx, area_id)?;

    let owns = area.assigned_to.as_deref() == Some(caller.user_id.as_str());
    if !owns && !caller.is_admin() {
        return Err(ApiError::Forbidden(format!(
            "user {} may not withdraw area {}",
            caller.user_id, area_id
        )));
    }
    if area.status == AreaStatus::Unassigned {
        return Ok(());
    }

    set_status(&tx, area_id, AreaStatus::Unassigned, None)?;
    tx.commit()?;
    info!(
        "area {} withdrawn from {} by {}",
        area_id,
        area.assigned_to.as_deref().unwrap_or("nobody"),
        caller.user_id
    );
    Ok(())
}

fn expect_status(area: &Area, expected: AreaStatus) -> Result<(), ApiError> {
    if area.status == expected {
        Ok(())
    } else {
        Err(ApiError::Conflict(format!(
            "area {} is {}, expected {}",
            area.id,
            area.status.as_str(),
            expected.as_str()
        )))
    }
}

fn set_status(
    tx: &Transaction<'_>,
    area_id: &str,
    status: AreaStatus,
    owner: Option<&str>,
) -> Result<(), ApiError> {
    tx.execute(
        "UPDATE areas SET status = ?1, assigned_to = ?2 WHERE id = ?3",
        params![status.as_str(), owner, area_id],
    )?;
    Ok(())
}
