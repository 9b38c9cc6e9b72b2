use crate::db::{entity_table, row_exists, Database};
use crate::error::ApiError;
use crate::services::entities::record::load_entity;
use actix_web::{web, HttpResponse};
use common::model::entity::EntityKind;
use common::requests::{selected, AssignWardRequest, WardSelection};
use common::responses::Ack;
use log::info;
use rusqlite::{params, Connection, TransactionBehavior};

/// `PUT /api/entities/{kind}/{id}/ward`
pub(crate) async fn process(
    db: web::Data<Database>,
    path: web::Path<(EntityKind, String)>,
    payload: web::Json<AssignWardRequest>,
) -> Result<HttpResponse, ApiError> {
    let (kind, id) = path.into_inner();
    let ward = parse_ward_selection(payload.ward.as_ref())?;
    db.run(move |conn| assign_ward(conn, kind, &id, ward)).await?;
    Ok(HttpResponse::Ok().json(Ack::ok()))
}

pub fn parse_ward_selection(raw: Option<&WardSelection>) -> Result<Option<i64>, ApiError> {
    match raw {
        None => Ok(None),
        Some(WardSelection::Number(number)) => Ok(Some(*number)),
        Some(WardSelection::Text(text)) => selected(Some(text.as_str()))
            .map(|value| {
                value
                    .parse::<i64>()
                    .map_err(|_| ApiError::Validation(format!("ward '{}' is not a number", value)))
            })
            .transpose(),
    }
}

/// Points the entity at `ward`, or clears its ward when `ward` is `None`.
///
/// An unknown ward number fails with `NotFound` and leaves the entity as it was.
pub fn assign_ward(
    conn: &mut Connection,
    kind: EntityKind,
    entity_id: &str,
    ward: Option<i64>,
) -> Result<(), ApiError> {
    let table = entity_table(kind);
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    load_entity(&tx, kind, entity_id)?;

    match ward {
        Some(ward_number) => {
            if !row_exists(&tx, "wards", "ward_number", &ward_number)? {
                return Err(ApiError::NotFound(format!(
                    "ward {} does not exist",
                    ward_number
                )));
            }
            tx.execute(
                &format!("UPDATE {table} SET ward_id = ?1, is_ward_valid = 1 WHERE id = ?2"),
                params![ward_number, entity_id],
            )?;
        }
        None => {
            tx.execute(
                &format!("UPDATE {table} SET ward_id = NULL, is_ward_valid = 0 WHERE id = ?1"),
                params![entity_id],
            )?;
        }
    }

    tx.commit()?;
    info!(
        "{} {} ward set to {}",
        kind.as_str(),
        entity_id,
        ward.map_or_else(|| "none".to_string(), |n| n.to_string())
    );
    Ok(())
}
