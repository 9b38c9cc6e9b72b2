//! Token pool of an area: registering pre-printed tokens and listing them for
//! the assignment dropdown.

use crate::db::{enum_column, row_exists, Database};
use crate::error::ApiError;
use crate::identity::Caller;
use actix_web::{web, HttpResponse};
use common::model::token::{Token, TokenStatus};
use common::requests::{RegisterTokensRequest, TokenListQuery};
use log::info;
use regex::Regex;
use rusqlite::{params, Connection, TransactionBehavior};
use std::collections::HashSet;
use std::sync::LazyLock;

static TOKEN_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]{0,63}$").expect("valid token regex"));

/// Tokens are printed on stickers: letters, digits, `-` and `_`, at most 64 long.
pub fn check_token_format(token: &str) -> Result<&str, ApiError> {
    if TOKEN_FORMAT.is_match(token) {
        Ok(token)
    } else {
        Err(ApiError::Validation(format!("'{}' is not a valid token", token)))
    }
}

/// `POST /api/areas/{area_id}/tokens` (admin only)
pub(crate) async fn register(
    db: web::Data<Database>,
    caller: Caller,
    area_id: web::Path<String>,
    payload: web::Json<RegisterTokensRequest>,
) -> Result<HttpResponse, ApiError> {
    caller.require_admin()?;
    let area_id = area_id.into_inner();
    let tokens = payload.into_inner().tokens;
    let created = db
        .run(move |conn| register_tokens(conn, &area_id, &tokens))
        .await?;
    Ok(HttpResponse::Created().json(created))
}

/// `GET /api/areas/{area_id}/tokens?status=unallocated`
pub(crate) async fn list(
    db: web::Data<Database>,
    area_id: web::Path<String>,
    query: web::Query<TokenListQuery>,
) -> Result<HttpResponse, ApiError> {
    let area_id = area_id.into_inner();
    let status = query.status;
    let tokens = db
        .run(move |conn| list_tokens(conn, &area_id, status))
        .await?;
    Ok(HttpResponse::Ok().json(tokens))
}

/// Adds unallocated tokens to an area's pool. All or none are added.
pub fn register_tokens(
    conn: &mut Connection,
    area_id: &str,
    tokens: &[String],
) -> Result<Vec<Token>, ApiError> {
    if tokens.is_empty() {
        return Err(ApiError::Validation("no tokens given".to_string()));
    }
    let mut seen = HashSet::new();
    for token in tokens {
        check_token_format(token)?;
        if !seen.insert(token.as_str()) {
            return Err(ApiError::Validation(format!("token {} given twice", token)));
        }
    }

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    if !row_exists(&tx, "areas", "id", &area_id)? {
        return Err(ApiError::NotFound(format!("area {} does not exist", area_id)));
    }
    for token in tokens {
        if row_exists(&tx, "tokens", "token", token)? {
            return Err(ApiError::Conflict(format!("token {} already exists", token)));
        }
        tx.execute(
            "INSERT INTO tokens (token, area_id, status) VALUES (?1, ?2, ?3)",
            params![token, area_id, TokenStatus::Unallocated.as_str()],
        )?;
    }
    tx.commit()?;

    info!("registered {} token(s) for area {}", tokens.len(), area_id);
    Ok(tokens
        .iter()
        .map(|token| Token {
            token: token.clone(),
            area_id: area_id.to_string(),
            status: TokenStatus::Unallocated,
        })
        .collect())
}

pub fn list_tokens(
    conn: &mut Connection,
    area_id: &str,
    status: Option<TokenStatus>,
) -> Result<Vec<Token>, ApiError> {
    if !row_exists(conn, "areas", "id", &area_id)? {
        return Err(ApiError::NotFound(format!("area {} does not exist", area_id)));
    }
    let mut stmt = conn.prepare(
        "SELECT token, area_id, status FROM tokens
         WHERE area_id = ?1 AND (?2 IS NULL OR status = ?2)
         ORDER BY token",
    )?;
    let rows = stmt.query_map(params![area_id, status.map(|s| s.as_str())], |row| {
        Ok(Token {
            token: row.get(0)?,
            area_id: row.get(1)?,
            status: enum_column(row, 2, TokenStatus::parse)?,
        })
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}
