//! Recomputes validity flags from the live references.
//!
//! Flags are written together with their foreign keys by every procedure in
//! this service, but rows edited by hand or references removed underneath
//! (`ON DELETE SET NULL`) leave them stale. This pass brings every row of one
//! kind back in line in a single transaction.

use crate::db::{entity_table, Database};
use crate::error::ApiError;
use crate::identity::Caller;
use actix_web::{web, HttpResponse};
use common::model::entity::EntityKind;
use common::responses::RevalidateSummary;
use log::info;
use rusqlite::{Connection, TransactionBehavior};

/// `POST /api/entities/{kind}/revalidate` (admin only)
pub(crate) async fn process(
    db: web::Data<Database>,
    kind: web::Path<EntityKind>,
    caller: Caller,
) -> Result<HttpResponse, ApiError> {
    caller.require_admin()?;
    let kind = kind.into_inner();
    let corrected = db.run(move |conn| revalidate(conn, kind)).await?;
    Ok(HttpResponse::Ok().json(RevalidateSummary { corrected }))
}

pub fn revalidate(conn: &mut Connection, kind: EntityKind) -> Result<u64, ApiError> {
    let table = entity_table(kind);
    let ward = format!(
        "({table}.ward_id IS NOT NULL AND EXISTS \
         (SELECT 1 FROM wards WHERE wards.ward_number = {table}.ward_id))"
    );
    let area = format!(
        "({table}.area_id IS NOT NULL AND EXISTS \
         (SELECT 1 FROM areas WHERE areas.id = {table}.area_id))"
    );
    let enumerator = format!(
        "({table}.enumerator_id IS NOT NULL AND EXISTS \
         (SELECT 1 FROM users WHERE users.id = {table}.enumerator_id \
          AND users.role = 'enumerator'))"
    );
    let token = format!(
        "({table}.building_token IS NOT NULL AND EXISTS \
         (SELECT 1 FROM tokens WHERE tokens.token = {table}.building_token \
          AND tokens.area_id IS {table}.area_id))"
    );

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let corrected = tx.execute(
        &format!(
            "UPDATE {table} SET
                 is_ward_valid = {ward},
                 is_area_valid = {area},
                 is_enumerator_valid = {enumerator},
                 is_building_token_valid = {token}
             WHERE is_ward_valid != {ward}
                OR is_area_valid != {area}
                OR is_enumerator_valid != {enumerator}
                OR is_building_token_valid != {token}"
        ),
        [],
    )?;
    tx.commit()?;

    info!("revalidated {}: {} row(s) corrected", table, corrected);
    Ok(corrected as u64)
}
