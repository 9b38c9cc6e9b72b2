use crate::db::{row_exists, Database};
use crate::error::ApiError;
use crate::identity::Caller;
use crate::services::entities::record::check_enumerator_prefix;
use actix_web::{web, HttpResponse};
use common::model::user::User;
use common::requests::RegisterUserRequest;
use log::info;
use rusqlite::{params, Connection, TransactionBehavior};

/// `POST /api/users` (admin only)
pub(crate) async fn process(
    db: web::Data<Database>,
    caller: Caller,
    payload: web::Json<RegisterUserRequest>,
) -> Result<HttpResponse, ApiError> {
    caller.require_admin()?;
    let request = payload.into_inner();
    let user = db.run(move |conn| register_user(conn, request)).await?;
    Ok(HttpResponse::Created().json(user))
}

/// User ids follow the enumerator code format so any of them can be typed as
/// a prefix on a survey form.
pub fn register_user(conn: &mut Connection, request: RegisterUserRequest) -> Result<User, ApiError> {
    let id = check_enumerator_prefix(&request.id)?.to_string();
    let name = request.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::Validation("user name must not be empty".to_string()));
    }

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    if row_exists(&tx, "users", "id", &id)? {
        return Err(ApiError::Conflict(format!("user {} already exists", id)));
    }
    tx.execute(
        "INSERT INTO users (id, name, role) VALUES (?1, ?2, ?3)",
        params![id, name, request.role.as_str()],
    )?;
    tx.commit()?;

    info!("registered {} {}", request.role.as_str(), id);
    Ok(User {
        id,
        name,
        role: request.role,
    })
}
