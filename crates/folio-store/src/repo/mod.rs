//! Repository layer persisting the content model to SQLite
//!
//! Each repository is a unit struct whose associated functions take the
//! caller's `&Connection`, so they work the same inside and outside a
//! transaction.

#![allow(clippy::result_large_err)]

pub mod custom_entity_repo;
pub mod image_asset_repo;
pub mod page_repo;
pub mod site_repo;

pub use custom_entity_repo::{CustomEntityFilter, SqliteCustomEntityRepo};
pub use image_asset_repo::{ImageAssetFilter, SqliteImageAssetRepo};
pub use page_repo::{PageFilter, SqlitePageRepo};
pub use site_repo::SqliteSiteRepo;

use chrono::{DateTime, Utc};
use folio_core::model::{PagingParams, WorkflowStatus};
use folio_core::ops::Transition;
use rusqlite::Connection;

use crate::errors::{from_rusqlite, Result};

pub(crate) fn to_millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

pub(crate) fn from_millis(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}

/// Decode a workflow status column inside a row mapper
pub(crate) fn status_column(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<WorkflowStatus> {
    let value: i64 = row.get(idx)?;
    WorkflowStatus::from_i64(value).ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, value))
}

/// Ids matching a filter plus the total before paging
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdPage {
    pub ids: Vec<i64>,
    pub total: u64,
}

/// Apply planned status changes to a versions table, in order
pub(crate) fn apply_transitions(
    conn: &Connection,
    table: &str,
    id_column: &str,
    transitions: &[Transition],
) -> Result<()> {
    let sql = format!(
        "UPDATE {} SET workflow_status = ?1 WHERE {} = ?2 AND workflow_status = ?3",
        table, id_column
    );
    for t in transitions {
        let changed = conn
            .execute(
                &sql,
                rusqlite::params![t.to.as_i64(), t.version_id, t.from.as_i64()],
            )
            .map_err(from_rusqlite)?;
        if changed != 1 {
            return Err(folio_core::errors::ExError::new(
                folio_core::errors::ExErrorKind::InvariantViolation,
            )
            .with_op("apply_transitions")
            .with_entity_id(t.version_id.to_string())
            .with_message(format!(
                "version {} was not {} when applying transition",
                t.version_id,
                t.from.as_str()
            )));
        }
    }
    Ok(())
}

/// Run a filtered id query for one page of results, plus its total count
pub(crate) fn paged_ids(
    conn: &Connection,
    id_expr: &str,
    from_where: &str,
    order_by: &str,
    params: &[&dyn rusqlite::ToSql],
    paging: PagingParams,
) -> Result<IdPage> {
    let count_sql = format!("SELECT COUNT(*) {}", from_where);
    let total: i64 = conn
        .query_row(&count_sql, params, |row| row.get(0))
        .map_err(from_rusqlite)?;

    let paging = paging.normalized();
    let page_sql = format!(
        "SELECT {} {} ORDER BY {} LIMIT {} OFFSET {}",
        id_expr,
        from_where,
        order_by,
        paging.limit(),
        paging.offset()
    );
    let mut stmt = conn.prepare(&page_sql).map_err(from_rusqlite)?;
    let ids = stmt
        .query_map(params, |row| row.get(0))
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<i64>, _>>()
        .map_err(from_rusqlite)?;

    Ok(IdPage {
        ids,
        total: u64::try_from(total).unwrap_or(0),
    })
}

/// `%text%` pattern for LIKE, with wildcards in the input escaped
pub(crate) fn like_pattern(text: &str) -> String {
    let escaped = text
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}
