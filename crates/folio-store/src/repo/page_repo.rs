//! Pages and page versions

#![allow(clippy::result_large_err)]

use folio_core::model::{Page, PageType, PageVersion, PagingParams, WorkflowStatus};
use folio_core::ops::Transition;
use rusqlite::{Connection, OptionalExtension};

use super::{
    apply_transitions, from_millis, like_pattern, paged_ids, status_column, to_millis, IdPage,
};
use crate::errors::{from_rusqlite, from_rusqlite_unique, Result};

pub struct SqlitePageRepo;

/// Search filter for pages; empty fields match everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageFilter {
    pub text: Option<String>,
    pub web_directory_id: Option<i64>,
    pub locale_id: Option<i64>,
    pub page_type: Option<PageType>,
}

const PAGE_COLUMNS: &str = "page_id, web_directory_id, locale_id, url_path, page_type, \
     custom_entity_definition_code, is_deleted, created_at, creator_id";

const VERSION_COLUMNS: &str = "page_version_id, page_id, title, meta_description, \
     exclude_from_sitemap, workflow_status, created_at, creator_id";

fn map_page(row: &rusqlite::Row<'_>) -> rusqlite::Result<Page> {
    let page_type: i64 = row.get(4)?;
    Ok(Page {
        page_id: row.get(0)?,
        web_directory_id: row.get(1)?,
        locale_id: row.get(2)?,
        url_path: row.get(3)?,
        page_type: PageType::from_i64(page_type)
            .ok_or(rusqlite::Error::IntegralValueOutOfRange(4, page_type))?,
        custom_entity_definition_code: row.get(5)?,
        is_deleted: row.get::<_, i64>(6)? != 0,
        created_at: from_millis(row.get(7)?),
        creator_id: row.get(8)?,
    })
}

fn map_version(row: &rusqlite::Row<'_>) -> rusqlite::Result<PageVersion> {
    Ok(PageVersion {
        page_version_id: row.get(0)?,
        page_id: row.get(1)?,
        title: row.get(2)?,
        meta_description: row.get(3)?,
        exclude_from_sitemap: row.get::<_, i64>(4)? != 0,
        workflow_status: status_column(row, 5)?,
        created_at: from_millis(row.get(6)?),
        creator_id: row.get(7)?,
    })
}

impl SqlitePageRepo {
    /// Insert a page; the id on the input is ignored and the new id returned
    pub fn insert_page(conn: &Connection, page: &Page) -> Result<i64> {
        conn.execute(
            "INSERT INTO pages (web_directory_id, locale_id, url_path, page_type,
                custom_entity_definition_code, is_deleted, created_at, creator_id)
             VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?7)",
            rusqlite::params![
                page.web_directory_id,
                page.locale_id,
                page.url_path,
                page.page_type.as_i64(),
                page.custom_entity_definition_code,
                to_millis(page.created_at),
                page.creator_id,
            ],
        )
        .map_err(|e| from_rusqlite_unique(e, "url_path", &page.url_path))?;
        Ok(conn.last_insert_rowid())
    }

    /// Insert a version; the id on the input is ignored and the new id returned
    pub fn insert_version(conn: &Connection, version: &PageVersion) -> Result<i64> {
        conn.execute(
            "INSERT INTO page_versions (page_id, title, meta_description, exclude_from_sitemap,
                workflow_status, created_at, creator_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                version.page_id,
                version.title,
                version.meta_description,
                i64::from(version.exclude_from_sitemap),
                version.workflow_status.as_i64(),
                to_millis(version.created_at),
                version.creator_id,
            ],
        )
        .map_err(from_rusqlite)?;
        Ok(conn.last_insert_rowid())
    }

    /// Get a page unless it has been deleted
    pub fn get_page(conn: &Connection, page_id: i64) -> Result<Option<Page>> {
        let sql = format!(
            "SELECT {} FROM pages WHERE page_id = ? AND is_deleted = 0",
            PAGE_COLUMNS
        );
        conn.query_row(&sql, [page_id], map_page)
            .optional()
            .map_err(from_rusqlite)
    }

    /// All live pages ordered by id
    pub fn list_pages(conn: &Connection) -> Result<Vec<Page>> {
        let sql = format!(
            "SELECT {} FROM pages WHERE is_deleted = 0 ORDER BY page_id",
            PAGE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql).map_err(from_rusqlite)?;
        let pages = stmt
            .query_map([], map_page)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        Ok(pages)
    }

    /// All versions of a page, oldest first
    pub fn get_versions(conn: &Connection, page_id: i64) -> Result<Vec<PageVersion>> {
        let sql = format!(
            "SELECT {} FROM page_versions WHERE page_id = ? ORDER BY created_at, page_version_id",
            VERSION_COLUMNS
        );
        let mut stmt = conn.prepare(&sql).map_err(from_rusqlite)?;
        let versions = stmt
            .query_map([page_id], map_version)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        Ok(versions)
    }

    pub fn get_version(conn: &Connection, page_version_id: i64) -> Result<Option<PageVersion>> {
        let sql = format!(
            "SELECT {} FROM page_versions WHERE page_version_id = ?",
            VERSION_COLUMNS
        );
        conn.query_row(&sql, [page_version_id], map_version)
            .optional()
            .map_err(from_rusqlite)
    }

    pub fn update_url(
        conn: &Connection,
        page_id: i64,
        web_directory_id: i64,
        locale_id: Option<i64>,
        url_path: &str,
        custom_entity_definition_code: Option<&str>,
    ) -> Result<()> {
        conn.execute(
            "UPDATE pages SET web_directory_id = ?1, locale_id = ?2, url_path = ?3,
                custom_entity_definition_code = ?4
             WHERE page_id = ?5",
            rusqlite::params![
                web_directory_id,
                locale_id,
                url_path,
                custom_entity_definition_code,
                page_id
            ],
        )
        .map_err(|e| from_rusqlite_unique(e, "url_path", url_path))?;
        Ok(())
    }

    /// Overwrite the content of a draft version
    pub fn update_draft(conn: &Connection, version: &PageVersion) -> Result<()> {
        conn.execute(
            "UPDATE page_versions SET title = ?1, meta_description = ?2, exclude_from_sitemap = ?3
             WHERE page_version_id = ?4 AND workflow_status = ?5",
            rusqlite::params![
                version.title,
                version.meta_description,
                i64::from(version.exclude_from_sitemap),
                version.page_version_id,
                WorkflowStatus::Draft.as_i64(),
            ],
        )
        .map_err(from_rusqlite)?;
        Ok(())
    }

    pub fn apply_transitions(conn: &Connection, transitions: &[Transition]) -> Result<()> {
        apply_transitions(conn, "page_versions", "page_version_id", transitions)
    }

    pub fn delete_version(conn: &Connection, page_version_id: i64) -> Result<()> {
        conn.execute(
            "DELETE FROM page_versions WHERE page_version_id = ?",
            [page_version_id],
        )
        .map_err(from_rusqlite)?;
        Ok(())
    }

    /// Soft delete; versions are kept for history
    pub fn mark_deleted(conn: &Connection, page_id: i64) -> Result<()> {
        conn.execute("UPDATE pages SET is_deleted = 1 WHERE page_id = ?", [page_id])
            .map_err(from_rusqlite)?;
        Ok(())
    }

    /// Whether no other live page uses this path in the directory and locale
    pub fn is_path_unique(
        conn: &Connection,
        web_directory_id: i64,
        locale_id: Option<i64>,
        url_path: &str,
        exclude_page_id: Option<i64>,
    ) -> Result<bool> {
        let found: Option<i64> = conn
            .query_row(
                "SELECT page_id FROM pages
                 WHERE web_directory_id = ?1 AND locale_id IS ?2 AND url_path = ?3
                   AND is_deleted = 0 AND page_id IS NOT ?4
                 LIMIT 1",
                rusqlite::params![web_directory_id, locale_id, url_path, exclude_page_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(from_rusqlite)?;
        Ok(found.is_none())
    }

    /// Page ids matching a filter, newest first
    pub fn search(conn: &Connection, filter: &PageFilter, paging: PagingParams) -> Result<IdPage> {
        let text = filter.text.as_deref().map(like_pattern);
        let page_type = filter.page_type.map(PageType::as_i64);
        paged_ids(
            conn,
            "p.page_id",
            "FROM pages p
             WHERE p.is_deleted = 0
               AND (?1 IS NULL OR p.web_directory_id = ?1)
               AND (?2 IS NULL OR p.locale_id = ?2)
               AND (?3 IS NULL OR p.page_type = ?3)
               AND (?4 IS NULL OR EXISTS (
                    SELECT 1 FROM page_versions v
                    WHERE v.page_id = p.page_id AND v.workflow_status IN (1, 4)
                      AND v.title LIKE ?4 ESCAPE '\\'))",
            "p.created_at DESC, p.page_id DESC",
            &[&filter.web_directory_id, &filter.locale_id, &page_type, &text],
            paging,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::apply_migrations;
    use folio_core::errors::ExErrorKind;
    use chrono::Utc;

    fn setup_db() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_migrations(&mut conn).unwrap();
        conn
    }

    fn new_page(url_path: &str) -> Page {
        Page {
            page_id: 0,
            web_directory_id: 1,
            locale_id: None,
            url_path: url_path.to_string(),
            page_type: PageType::Generic,
            custom_entity_definition_code: None,
            is_deleted: false,
            created_at: Utc::now(),
            creator_id: Some(1),
        }
    }

    fn new_version(page_id: i64, title: &str, status: WorkflowStatus) -> PageVersion {
        PageVersion {
            page_version_id: 0,
            page_id,
            title: title.to_string(),
            meta_description: String::new(),
            exclude_from_sitemap: false,
            workflow_status: status,
            created_at: Utc::now(),
            creator_id: Some(1),
        }
    }

    #[test]
    fn test_insert_and_get_page_with_versions() {
        let conn = setup_db();
        let page_id = SqlitePageRepo::insert_page(&conn, &new_page("about")).unwrap();
        SqlitePageRepo::insert_version(&conn, &new_version(page_id, "About", WorkflowStatus::Draft))
            .unwrap();

        let page = SqlitePageRepo::get_page(&conn, page_id).unwrap().unwrap();
        assert_eq!(page.url_path, "about");
        let versions = SqlitePageRepo::get_versions(&conn, page_id).unwrap();
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].workflow_status, WorkflowStatus::Draft);
    }

    #[test]
    fn test_schema_rejects_second_draft() {
        let conn = setup_db();
        let page_id = SqlitePageRepo::insert_page(&conn, &new_page("about")).unwrap();
        SqlitePageRepo::insert_version(&conn, &new_version(page_id, "A", WorkflowStatus::Draft))
            .unwrap();

        assert!(SqlitePageRepo::insert_version(
            &conn,
            &new_version(page_id, "B", WorkflowStatus::Draft)
        )
        .is_err());
    }

    #[test]
    fn test_path_uniqueness_ignores_deleted_and_self() {
        let conn = setup_db();
        let first = SqlitePageRepo::insert_page(&conn, &new_page("about")).unwrap();

        assert!(!SqlitePageRepo::is_path_unique(&conn, 1, None, "about", None).unwrap());
        assert!(SqlitePageRepo::is_path_unique(&conn, 1, None, "about", Some(first)).unwrap());

        SqlitePageRepo::mark_deleted(&conn, first).unwrap();
        assert!(SqlitePageRepo::is_path_unique(&conn, 1, None, "about", None).unwrap());
        assert!(SqlitePageRepo::get_page(&conn, first).unwrap().is_none());
    }

    #[test]
    fn test_schema_rejects_duplicate_live_path() {
        let conn = setup_db();
        let first = SqlitePageRepo::insert_page(&conn, &new_page("about")).unwrap();

        let err = SqlitePageRepo::insert_page(&conn, &new_page("about")).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::UniqueViolation);
        assert_eq!(err.property(), Some("url_path"));
        assert_eq!(err.value(), Some("about"));

        let other = SqlitePageRepo::insert_page(&conn, &new_page("contact")).unwrap();
        let err = SqlitePageRepo::update_url(&conn, other, 1, None, "about", None).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::UniqueViolation);

        SqlitePageRepo::mark_deleted(&conn, first).unwrap();
        SqlitePageRepo::insert_page(&conn, &new_page("about")).unwrap();
    }

    #[test]
    fn test_search_by_title() {
        let conn = setup_db();
        let about = SqlitePageRepo::insert_page(&conn, &new_page("about")).unwrap();
        SqlitePageRepo::insert_version(&conn, &new_version(about, "About us", WorkflowStatus::Draft))
            .unwrap();
        let contact = SqlitePageRepo::insert_page(&conn, &new_page("contact")).unwrap();
        SqlitePageRepo::insert_version(&conn, &new_version(contact, "Contact", WorkflowStatus::Draft))
            .unwrap();

        let filter = PageFilter {
            text: Some("about".to_string()),
            ..PageFilter::default()
        };
        let result = SqlitePageRepo::search(&conn, &filter, PagingParams::default()).unwrap();
        assert_eq!(result.ids, vec![about]);
        assert_eq!(result.total, 1);
    }
}
