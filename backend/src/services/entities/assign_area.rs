//! Area and token assignment.
//!
//! A token is only meaningful relative to the area it was allocated under, so
//! both are written by a single procedure in a single transaction: the token
//! is re-decided every time the area is set, and the previously held token is
//! released in the same transaction that claims a new one.

use crate::db::{entity_table, row_exists, Database};
use crate::error::ApiError;
use crate::services::areas::tokens::check_token_format;
use crate::services::entities::record::load_entity;
use actix_web::{web, HttpResponse};
use common::model::entity::EntityKind;
use common::model::token::TokenStatus;
use common::requests::{selected, AssignAreaRequest};
use common::responses::Ack;
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};

/// `PUT /api/entities/{kind}/{id}/area`
pub(crate) async fn process(
    db: web::Data<Database>,
    path: web::Path<(EntityKind, String)>,
    payload: web::Json<AssignAreaRequest>,
) -> Result<HttpResponse, ApiError> {
    let (kind, id) = path.into_inner();
    let AssignAreaRequest { area_id, token } = payload.into_inner();
    let area_id = selected(area_id.as_deref()).map(str::to_string);
    let token = selected(token.as_deref())
        .map(check_token_format)
        .transpose()?
        .map(str::to_string);

    db.run(move |conn| assign_area(conn, kind, &id, area_id.as_deref(), token.as_deref()))
        .await?;
    Ok(HttpResponse::Ok().json(Ack::ok()))
}

/// Sets the entity's area together with its token.
///
/// * `area = None` clears area and token (the old token is released).
/// * `token = None` keeps the area but releases and clears the token.
/// * Otherwise the token must exist, belong to `area`, and be unallocated or
///   already held by this entity. A token held elsewhere yields `Conflict`
///   and nothing is written.
pub fn assign_area(
    conn: &mut Connection,
    kind: EntityKind,
    entity_id: &str,
    area: Option<&str>,
    token: Option<&str>,
) -> Result<(), ApiError> {
    let table = entity_table(kind);
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let current = load_entity(&tx, kind, entity_id)?;
    let held = current.building_token.as_deref();

    let Some(area_id) = area else {
        if token.is_some() {
            return Err(ApiError::Validation(
                "a token cannot be assigned without an area".to_string(),
            ));
        }
        release_token(&tx, held)?;
        tx.execute(
            &format!(
                "UPDATE {table} SET area_id = NULL, is_area_valid = 0,
                     building_token = NULL, is_building_token_valid = 0
                 WHERE id = ?1"
            ),
            params![entity_id],
        )?;
        tx.commit()?;
        info!("{} {} area and token cleared", kind.as_str(), entity_id);
        return Ok(());
    };

    if !row_exists(&tx, "areas", "id", &area_id)? {
        return Err(ApiError::NotFound(format!("area {} does not exist", area_id)));
    }

    match token {
        Some(token) => {
            claimable(&tx, token, area_id, held)?;
            if held != Some(token) {
                release_token(&tx, held)?;
                tx.execute(
                    "UPDATE tokens SET status = ?1 WHERE token = ?2",
                    params![TokenStatus::Allocated.as_str(), token],
                )?;
            }
            tx.execute(
                &format!(
                    "UPDATE {table} SET area_id = ?1, is_area_valid = 1,
                         building_token = ?2, is_building_token_valid = 1
                     WHERE id = ?3"
                ),
                params![area_id, token, entity_id],
            )?;
        }
        None => {
            release_token(&tx, held)?;
            tx.execute(
                &format!(
                    "UPDATE {table} SET area_id = ?1, is_area_valid = 1,
                         building_token = NULL, is_building_token_valid = 0
                     WHERE id = ?2"
                ),
                params![area_id, entity_id],
            )?;
        }
    }

    tx.commit()?;
    info!(
        "{} {} assigned to area {} with token {}",
        kind.as_str(),
        entity_id,
        area_id,
        token.unwrap_or("none")
    );
    Ok(())
}

/// Checks that `token` can be held by an entity currently holding `held`.
fn claimable(
    tx: &Transaction<'_>,
    token: &str,
    area_id: &str,
    held: Option<&str>,
) -> Result<(), ApiError> {
    let row = tx
        .query_row(
            "SELECT area_id, status FROM tokens WHERE token = ?1",
            params![token],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
        )
        .optional()?;

    let Some((token_area, status)) = row else {
        return Err(ApiError::NotFound(format!("token {} does not exist", token)));
    };
    if token_area != area_id {
        return Err(ApiError::Validation(format!(
            "token {} belongs to area {}, not {}",
            token, token_area, area_id
        )));
    }
    if held != Some(token) && TokenStatus::parse(&status) == Some(TokenStatus::Allocated) {
        return Err(ApiError::Conflict(format!(
            "token {} is already allocated to another entity",
            token
        )));
    }
    Ok(())
}

fn release_token(tx: &Transaction<'_>, held: Option<&str>) -> Result<(), ApiError> {
    if let Some(old) = held {
        tx.execute(
            "UPDATE tokens SET status = ?1 WHERE token = ?2",
            params![TokenStatus::Unallocated.as_str(), old],
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{seeded, token_status};

    fn assign(
        conn: &mut Connection,
        id: &str,
        area: Option<&str>,
        token: Option<&str>,
    ) -> Result<(), ApiError> {
        assign_area(conn, EntityKind::Building, id, area, token)
    }

    fn allocated_owners(conn: &Connection, token: &str) -> i64 {
        let mut owners = 0;
        for kind in EntityKind::ALL {
            owners += conn
                .query_row(
                    &format!(
                        "SELECT COUNT(*) FROM {} WHERE building_token = ?1",
                        entity_table(kind)
                    ),
                    params![token],
                    |row| row.get::<_, i64>(0),
                )
                .unwrap();
        }
        owners
    }

    #[test]
    fn storage_rejects_a_second_holder_of_a_token() {
        let mut conn = seeded();
        assign(&mut conn, "B1", Some("A1"), Some("T-001")).unwrap();

        let err = conn
            .execute(
                "UPDATE buildings SET area_id = 'A1', building_token = 'T-001' WHERE id = 'B2'",
                [],
            )
            .unwrap_err();
        assert_eq!(
            err.sqlite_error_code(),
            Some(rusqlite::ErrorCode::ConstraintViolation)
        );

        let err = conn
            .execute(
                "INSERT INTO buildings (id, building_token) VALUES ('B3', 'T-001')",
                [],
            )
            .unwrap_err();
        assert_eq!(
            err.sqlite_error_code(),
            Some(rusqlite::ErrorCode::ConstraintViolation)
        );
        assert_eq!(allocated_owners(&conn, "T-001"), 1);
    }

    #[test]
    fn claims_token_and_marks_both_flags_valid() {
        let mut conn = seeded();
        assign(&mut conn, "B1", Some("A1"), Some("T-001")).unwrap();

        let record = load_entity(&conn, EntityKind::Building, "B1").unwrap();
        assert_eq!(record.area_id.as_deref(), Some("A1"));
        assert_eq!(record.building_token.as_deref(), Some("T-001"));
        assert!(record.is_area_valid && record.is_building_token_valid);
        assert_eq!(token_status(&conn, "T-001"), "allocated");
    }

    #[test]
    fn resaving_the_same_token_is_idempotent() {
        let mut conn = seeded();
        assign(&mut conn, "B1", Some("A1"), Some("T-001")).unwrap();
        assign(&mut conn, "B1", Some("A1"), Some("T-001")).unwrap();

        assert_eq!(token_status(&conn, "T-001"), "allocated");
        assert_eq!(allocated_owners(&conn, "T-001"), 1);
    }

    #[test]
    fn switching_tokens_releases_the_old_one() {
        let mut conn = seeded();
        assign(&mut conn, "B1", Some("A1"), Some("T-001")).unwrap();
        assign(&mut conn, "B1", Some("A1"), Some("T-002")).unwrap();

        assert_eq!(token_status(&conn, "T-001"), "unallocated");
        assert_eq!(token_status(&conn, "T-002"), "allocated");
        assert_eq!(allocated_owners(&conn, "T-001"), 0);
        assert_eq!(allocated_owners(&conn, "T-002"), 1);
    }

    #[test]
    fn token_held_elsewhere_is_a_conflict_and_changes_nothing() {
        let mut conn = seeded();
        assign(&mut conn, "B1", Some("A1"), Some("T-001")).unwrap();
        assign(&mut conn, "B2", Some("A1"), Some("T-002")).unwrap();

        let err = assign(&mut conn, "B2", Some("A1"), Some("T-001")).unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));

        let b1 = load_entity(&conn, EntityKind::Building, "B1").unwrap();
        let b2 = load_entity(&conn, EntityKind::Building, "B2").unwrap();
        assert_eq!(b1.building_token.as_deref(), Some("T-001"));
        assert_eq!(b2.building_token.as_deref(), Some("T-002"));
        assert_eq!(token_status(&conn, "T-002"), "allocated");
    }

    #[test]
    fn conflict_is_detected_across_entity_kinds() {
        let mut conn = seeded();
        conn.execute("INSERT INTO families (id) VALUES ('F1')", [])
            .unwrap();
        assign(&mut conn, "B1", Some("A1"), Some("T-003")).unwrap();

        let err = assign_area(&mut conn, EntityKind::Family, "F1", Some("A1"), Some("T-003"))
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[test]
    fn token_from_another_area_is_rejected() {
        let mut conn = seeded();
        let err = assign(&mut conn, "B1", Some("A1"), Some("T-101")).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(token_status(&conn, "T-101"), "unallocated");
    }

    #[test]
    fn changing_area_never_keeps_the_stale_token() {
        let mut conn = seeded();
        assign(&mut conn, "B1", Some("A1"), Some("T-001")).unwrap();

        // new area, same token: the token does not belong to A2
        let err = assign(&mut conn, "B1", Some("A2"), Some("T-001")).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        assign(&mut conn, "B1", Some("A2"), None).unwrap();
        let record = load_entity(&conn, EntityKind::Building, "B1").unwrap();
        assert_eq!(record.area_id.as_deref(), Some("A2"));
        assert_eq!(record.building_token, None);
        assert!(record.is_area_valid);
        assert!(!record.is_building_token_valid);
        assert_eq!(token_status(&conn, "T-001"), "unallocated");

        assign(&mut conn, "B1", Some("A2"), Some("T-101")).unwrap();
        assert_eq!(token_status(&conn, "T-101"), "allocated");
    }

    #[test]
    fn clearing_area_releases_token() {
        let mut conn = seeded();
        assign(&mut conn, "B1", Some("A1"), Some("T-001")).unwrap();
        assign(&mut conn, "B1", None, None).unwrap();

        let record = load_entity(&conn, EntityKind::Building, "B1").unwrap();
        assert_eq!(record.area_id, None);
        assert_eq!(record.building_token, None);
        assert!(!record.is_area_valid && !record.is_building_token_valid);
        assert_eq!(token_status(&conn, "T-001"), "unallocated");
    }

    #[test]
    fn unknown_area_or_token_is_not_found() {
        let mut conn = seeded();
        assign(&mut conn, "B1", Some("A1"), Some("T-001")).unwrap();

        let err = assign(&mut conn, "B1", Some("A9"), None).unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
        let err = assign(&mut conn, "B1", Some("A1"), Some("T-999")).unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));

        let record = load_entity(&conn, EntityKind::Building, "B1").unwrap();
        assert_eq!(record.building_token.as_deref(), Some("T-001"));
        assert_eq!(token_status(&conn, "T-001"), "allocated");
    }

    #[test]
    fn token_without_area_is_rejected() {
        let mut conn = seeded();
        let err = assign(&mut conn, "B1", None, Some("T-001")).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
