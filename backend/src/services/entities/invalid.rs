//! Listing of entities that still need remediation.
//!
//! Rows, per-flag counts and the total are all computed from one predicate
//! inside one read transaction, so the page and its counts describe the same
//! snapshot even while assignments are being made.

use crate::db::{entity_table, Database};
use crate::error::ApiError;
use crate::services::entities::record::{entity_from_row, flag_column, ENTITY_COLUMNS};
use actix_web::{web, HttpResponse};
use common::model::entity::{EntityKind, InvalidCounts, InvalidEntitiesPage, InvalidFlag, Pagination};
use common::requests::InvalidEntitiesQuery;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 200;

/// `GET /api/entities/{kind}/invalid`
pub(crate) async fn process(
    db: web::Data<Database>,
    kind: web::Path<EntityKind>,
    query: web::Query<InvalidEntitiesQuery>,
) -> Result<HttpResponse, ApiError> {
    let kind = kind.into_inner();
    let query = query.into_inner();
    let page = db.run(move |conn| list_invalid(conn, kind, &query)).await?;
    Ok(HttpResponse::Ok().json(page))
}

pub fn list_invalid(
    conn: &mut Connection,
    kind: EntityKind,
    query: &InvalidEntitiesQuery,
) -> Result<InvalidEntitiesPage, ApiError> {
    let table = entity_table(kind);
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0);
    let (predicate, args) = predicate(query);

    let tx = conn.transaction()?;

    let (total, counts) = tx.query_row(
        &format!(
            "SELECT COUNT(*),
                    COALESCE(SUM(is_ward_valid = 0), 0),
                    COALESCE(SUM(is_area_valid = 0), 0),
                    COALESCE(SUM(is_enumerator_valid = 0), 0),
                    COALESCE(SUM(is_building_token_valid = 0), 0)
             FROM {table} WHERE {predicate}"
        ),
        params_from_iter(args.iter()),
        |row| {
            Ok((
                row.get::<_, i64>(0)? as u64,
                InvalidCounts {
                    ward: row.get::<_, i64>(1)? as u64,
                    area: row.get::<_, i64>(2)? as u64,
                    enumerator: row.get::<_, i64>(3)? as u64,
                    token: row.get::<_, i64>(4)? as u64,
                },
            ))
        },
    )?;

    let mut page_args = args;
    page_args.push(Value::Integer(i64::from(limit)));
    page_args.push(Value::Integer(i64::from(offset)));
    let rows = {
        let mut stmt = tx.prepare(&format!(
            "SELECT {ENTITY_COLUMNS} FROM {table} WHERE {predicate}
             ORDER BY id LIMIT ? OFFSET ?"
        ))?;
        let rows = stmt.query_map(params_from_iter(page_args.iter()), |row| {
            entity_from_row(kind, row)
        })?;
        rows.collect::<Result<Vec<_>, _>>()?
    };
    tx.commit()?;

    let has_more = u64::from(offset) + (rows.len() as u64) < total;
    Ok(InvalidEntitiesPage {
        rows,
        counts,
        pagination: Pagination {
            limit,
            offset,
            total,
            has_more,
        },
    })
}

/// WHERE clause and its positional arguments for `query`.
fn predicate(query: &InvalidEntitiesQuery) -> (String, Vec<Value>) {
    let mut clauses = Vec::new();
    let mut args = Vec::new();

    clauses.push(match query.flag {
        Some(flag) => format!("{} = 0", flag_column(flag)),
        None => format!(
            "({})",
            [
                InvalidFlag::Ward,
                InvalidFlag::Area,
                InvalidFlag::Enumerator,
                InvalidFlag::Token,
            ]
            .iter()
            .map(|flag| format!("{} = 0", flag_column(*flag)))
            .collect::<Vec<_>>()
            .join(" OR ")
        ),
    });

    if let Some(ward) = query.ward {
        clauses.push("ward_id = ?".to_string());
        args.push(Value::Integer(ward));
    }
    if let Some(area_id) = &query.area_id {
        clauses.push("area_id = ?".to_string());
        args.push(Value::Text(area_id.clone()));
    }
    if let Some(enumerator_id) = &query.enumerator_id {
        clauses.push("enumerator_id = ?".to_string());
        args.push(Value::Text(enumerator_id.clone()));
    }

    (clauses.join(" AND "), args)
}
