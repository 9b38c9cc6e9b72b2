//! Survey intake.
//!
//! Field forms arrive with free-typed ward number, area code and enumerator
//! code. The raw values are kept as `tmp_*` columns and every reference that
//! resolves is written along with its validity flag; the rest stay empty and
//! show up in the invalid-entity listing for an admin to fix.

use crate::db::{entity_table, row_exists, Database};
use crate::error::ApiError;
use crate::services::entities::record::{check_enumerator_prefix, enumerators_matching, load_entity};
use actix_web::{web, HttpResponse};
use common::model::entity::{EntityKind, EntityRecord};
use common::requests::IntakeRequest;
use log::info;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

/// `POST /api/entities/{kind}`
pub(crate) async fn process(
    db: web::Data<Database>,
    kind: web::Path<EntityKind>,
    payload: web::Json<IntakeRequest>,
) -> Result<HttpResponse, ApiError> {
    let kind = kind.into_inner();
    let request = payload.into_inner();
    let record = db.run(move |conn| intake(conn, kind, &request)).await?;
    Ok(HttpResponse::Created().json(record))
}

pub fn intake(
    conn: &mut Connection,
    kind: EntityKind,
    request: &IntakeRequest,
) -> Result<EntityRecord, ApiError> {
    let id = uuid::Uuid::new_v4().to_string();
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let ward = match trimmed(&request.tmp_ward_number).and_then(|v| v.parse::<i64>().ok()) {
        Some(number) if row_exists(&tx, "wards", "ward_number", &number)? => Some(number),
        _ => None,
    };

    let area: Option<String> = match (
        ward,
        trimmed(&request.tmp_area_code).and_then(|v| v.parse::<i64>().ok()),
    ) {
        (Some(ward_number), Some(code)) => tx
            .query_row(
                "SELECT id FROM areas WHERE ward_number = ?1 AND code = ?2",
                params![ward_number, code],
                |row| row.get(0),
            )
            .optional()?,
        _ => None,
    };

    let enumerator = match trimmed(&request.tmp_enumerator_id)
        .and_then(|v| check_enumerator_prefix(v).ok())
    {
        Some(prefix) => {
            let mut found = enumerators_matching(&tx, prefix)?;
            if found.len() == 1 {
                Some(found.remove(0))
            } else {
                None
            }
        }
        None => None,
    };
    let (enumerator_id, enumerator_name) = enumerator.unzip();

    tx.execute(
        &format!(
            "INSERT INTO {} (id, ward_id, area_id, enumerator_id, enumerator_name,
                 is_ward_valid, is_area_valid, is_enumerator_valid, is_building_token_valid,
                 tmp_ward_number, tmp_area_code, tmp_enumerator_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, ?9, ?10, ?11)",
            entity_table(kind)
        ),
        params![
            id,
            ward,
            area,
            enumerator_id,
            enumerator_name,
            ward.is_some(),
            area.is_some(),
            enumerator_id.is_some(),
            request.tmp_ward_number,
            request.tmp_area_code,
            request.tmp_enumerator_id,
        ],
    )?;
    let record = load_entity(&tx, kind, &id)?;
    tx.commit()?;

    info!(
        "{} {} recorded with {} unresolved reference(s)",
        kind.as_str(),
        id,
        record.invalid_flags().len()
    );
    Ok(record)
}

fn trimmed(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
