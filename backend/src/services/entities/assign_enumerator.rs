use crate::db::{entity_table, Database};
use crate::error::ApiError;
use crate::services::entities::record::{check_enumerator_prefix, enumerators_matching, load_entity};
use actix_web::{web, HttpResponse};
use common::model::entity::EntityKind;
use common::requests::AssignEnumeratorRequest;
use common::responses::Ack;
use log::info;
use rusqlite::{params, Connection, TransactionBehavior};

/// `PUT /api/entities/{kind}/{id}/enumerator`
pub(crate) async fn process(
    db: web::Data<Database>,
    path: web::Path<(EntityKind, String)>,
    payload: web::Json<AssignEnumeratorRequest>,
) -> Result<HttpResponse, ApiError> {
    let (kind, id) = path.into_inner();
    let prefix = check_enumerator_prefix(&payload.enumerator)?.to_string();
    db.run(move |conn| assign_enumerator(conn, kind, &id, &prefix))
        .await?;
    Ok(HttpResponse::Ok().json(Ack::ok()))
}

/// Resolves the short enumerator code typed on the form and stores the
/// enumerator id and name on the entity. The code must be a full id or
/// identify exactly one enumerator.
pub fn assign_enumerator(
    conn: &mut Connection,
    kind: EntityKind,
    entity_id: &str,
    prefix: &str,
) -> Result<(), ApiError> {
    let prefix = check_enumerator_prefix(prefix)?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    load_entity(&tx, kind, entity_id)?;

    let mut matches = enumerators_matching(&tx, prefix)?;
    let (enumerator_id, enumerator_name) = match matches.len() {
        0 => {
            return Err(ApiError::NotFound(format!(
                "no enumerator matches '{}'",
                prefix
            )))
        }
        1 => matches.remove(0),
        _ => {
            return Err(ApiError::Validation(format!(
                "enumerator code '{}' is ambiguous",
                prefix
            )))
        }
    };

    tx.execute(
        &format!(
            "UPDATE {} SET enumerator_id = ?1, enumerator_name = ?2, is_enumerator_valid = 1
             WHERE id = ?3",
            entity_table(kind)
        ),
        params![enumerator_id, enumerator_name, entity_id],
    )?;
    tx.commit()?;

    info!(
        "{} {} enumerator set to {}",
        kind.as_str(),
        entity_id,
        enumerator_id
    );
    Ok(())
}
