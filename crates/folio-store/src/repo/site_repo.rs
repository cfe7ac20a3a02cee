//! Locales and web directories

#![allow(clippy::result_large_err)]

use chrono::{DateTime, Utc};
use folio_core::model::{Locale, WebDirectory};
use rusqlite::{Connection, OptionalExtension};

use super::{from_millis, to_millis};
use crate::errors::{from_rusqlite, Result};

pub struct SqliteSiteRepo;

const DIRECTORY_COLUMNS: &str =
    "web_directory_id, parent_web_directory_id, name, url_path, is_active, created_at";

fn map_locale(row: &rusqlite::Row<'_>) -> rusqlite::Result<Locale> {
    Ok(Locale {
        locale_id: row.get(0)?,
        iso_code: row.get(1)?,
        name: row.get(2)?,
        is_active: row.get::<_, i64>(3)? != 0,
    })
}

fn map_directory(row: &rusqlite::Row<'_>) -> rusqlite::Result<WebDirectory> {
    Ok(WebDirectory {
        web_directory_id: row.get(0)?,
        parent_web_directory_id: row.get(1)?,
        name: row.get(2)?,
        url_path: row.get(3)?,
        is_active: row.get::<_, i64>(4)? != 0,
        created_at: from_millis(row.get(5)?),
    })
}

impl SqliteSiteRepo {
    pub fn insert_locale(conn: &Connection, iso_code: &str, name: &str) -> Result<i64> {
        conn.execute(
            "INSERT INTO locales (iso_code, name, is_active) VALUES (?1, ?2, 1)",
            rusqlite::params![iso_code, name],
        )
        .map_err(from_rusqlite)?;
        Ok(conn.last_insert_rowid())
    }

    pub fn get_locale(conn: &Connection, locale_id: i64) -> Result<Option<Locale>> {
        conn.query_row(
            "SELECT locale_id, iso_code, name, is_active FROM locales WHERE locale_id = ?",
            [locale_id],
            map_locale,
        )
        .optional()
        .map_err(from_rusqlite)
    }

    pub fn get_locale_by_iso_code(conn: &Connection, iso_code: &str) -> Result<Option<Locale>> {
        conn.query_row(
            "SELECT locale_id, iso_code, name, is_active FROM locales WHERE iso_code = ?",
            [iso_code],
            map_locale,
        )
        .optional()
        .map_err(from_rusqlite)
    }

    pub fn list_locales(conn: &Connection) -> Result<Vec<Locale>> {
        let mut stmt = conn
            .prepare("SELECT locale_id, iso_code, name, is_active FROM locales ORDER BY iso_code")
            .map_err(from_rusqlite)?;
        let locales = stmt
            .query_map([], map_locale)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        Ok(locales)
    }

    pub fn insert_web_directory(
        conn: &Connection,
        parent_web_directory_id: i64,
        name: &str,
        url_path: &str,
        created_at: DateTime<Utc>,
    ) -> Result<i64> {
        conn.execute(
            "INSERT INTO web_directories (parent_web_directory_id, name, url_path, is_active, created_at)
             VALUES (?1, ?2, ?3, 1, ?4)",
            rusqlite::params![parent_web_directory_id, name, url_path, to_millis(created_at)],
        )
        .map_err(from_rusqlite)?;
        Ok(conn.last_insert_rowid())
    }

    pub fn get_web_directory(
        conn: &Connection,
        web_directory_id: i64,
    ) -> Result<Option<WebDirectory>> {
        let sql = format!(
            "SELECT {} FROM web_directories WHERE web_directory_id = ?",
            DIRECTORY_COLUMNS
        );
        conn.query_row(&sql, [web_directory_id], map_directory)
            .optional()
            .map_err(from_rusqlite)
    }

    pub fn list_web_directories(conn: &Connection) -> Result<Vec<WebDirectory>> {
        let sql = format!(
            "SELECT {} FROM web_directories ORDER BY web_directory_id",
            DIRECTORY_COLUMNS
        );
        let mut stmt = conn.prepare(&sql).map_err(from_rusqlite)?;
        let directories = stmt
            .query_map([], map_directory)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        Ok(directories)
    }

    pub fn web_directory_path_exists(
        conn: &Connection,
        parent_web_directory_id: i64,
        url_path: &str,
    ) -> Result<bool> {
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM web_directories WHERE parent_web_directory_id = ?1 AND url_path = ?2",
                rusqlite::params![parent_web_directory_id, url_path],
                |row| row.get(0),
            )
            .optional()
            .map_err(from_rusqlite)?;
        Ok(found.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::apply_migrations;

    fn setup_db() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_migrations(&mut conn).unwrap();
        conn
    }

    #[test]
    fn test_insert_and_list_locales() {
        let conn = setup_db();
        let id = SqliteSiteRepo::insert_locale(&conn, "en-GB", "English (UK)").unwrap();

        let locale = SqliteSiteRepo::get_locale_by_iso_code(&conn, "en-gb").unwrap().unwrap();
        assert_eq!(locale.locale_id, id);
        assert_eq!(SqliteSiteRepo::list_locales(&conn).unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_iso_code_rejected() {
        let conn = setup_db();
        SqliteSiteRepo::insert_locale(&conn, "fr", "French").unwrap();
        assert!(SqliteSiteRepo::insert_locale(&conn, "FR", "French").is_err());
    }

    #[test]
    fn test_web_directory_under_root() {
        let conn = setup_db();
        let id = SqliteSiteRepo::insert_web_directory(&conn, 1, "Blog", "blog", Utc::now()).unwrap();

        let directory = SqliteSiteRepo::get_web_directory(&conn, id).unwrap().unwrap();
        assert_eq!(directory.parent_web_directory_id, Some(1));
        assert!(SqliteSiteRepo::web_directory_path_exists(&conn, 1, "blog").unwrap());
        assert_eq!(SqliteSiteRepo::list_web_directories(&conn).unwrap().len(), 2);
    }
}
