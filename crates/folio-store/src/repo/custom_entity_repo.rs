//! Custom entities, their versions and definition rows

#![allow(clippy::result_large_err)]

use folio_core::definitions::CustomEntityDefinition;
use folio_core::model::{CustomEntity, CustomEntityVersion, PagingParams, WorkflowStatus};
use folio_core::ops::Transition;
use rusqlite::{Connection, OptionalExtension};

use super::{
    apply_transitions, from_millis, like_pattern, paged_ids, status_column, to_millis, IdPage,
};
use crate::errors::{from_rusqlite, Result};

pub struct SqliteCustomEntityRepo;

/// Search filter for custom entities of one definition
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomEntityFilter {
    pub definition_code: String,
    pub text: Option<String>,
    pub locale_id: Option<i64>,
    /// Only entities holding a version in this status
    pub workflow_status: Option<WorkflowStatus>,
}

const ENTITY_COLUMNS: &str = "custom_entity_id, custom_entity_definition_code, locale_id, \
     url_slug, ordering, created_at, creator_id";

const VERSION_COLUMNS: &str = "custom_entity_version_id, custom_entity_id, title, data, \
     workflow_status, created_at, creator_id";

fn map_entity(row: &rusqlite::Row<'_>) -> rusqlite::Result<CustomEntity> {
    Ok(CustomEntity {
        custom_entity_id: row.get(0)?,
        definition_code: row.get(1)?,
        locale_id: row.get(2)?,
        url_slug: row.get(3)?,
        ordering: row.get(4)?,
        created_at: from_millis(row.get(5)?),
        creator_id: row.get(6)?,
    })
}

fn map_version(row: &rusqlite::Row<'_>) -> rusqlite::Result<CustomEntityVersion> {
    Ok(CustomEntityVersion {
        custom_entity_version_id: row.get(0)?,
        custom_entity_id: row.get(1)?,
        title: row.get(2)?,
        data: row.get(3)?,
        workflow_status: status_column(row, 4)?,
        created_at: from_millis(row.get(5)?),
        creator_id: row.get(6)?,
    })
}

impl SqliteCustomEntityRepo {
    /// Create the definition row if missing; returns true when it was created
    pub fn ensure_definition(conn: &Connection, definition: &CustomEntityDefinition) -> Result<bool> {
        let inserted = conn
            .execute(
                "INSERT INTO custom_entity_definitions
                    (custom_entity_definition_code, force_url_slug_uniqueness, has_locale, is_ordered)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(custom_entity_definition_code) DO NOTHING",
                rusqlite::params![
                    definition.code,
                    i64::from(definition.force_url_slug_uniqueness),
                    i64::from(definition.has_locale),
                    i64::from(definition.is_ordered),
                ],
            )
            .map_err(from_rusqlite)?;
        Ok(inserted == 1)
    }

    pub fn definition_exists(conn: &Connection, code: &str) -> Result<bool> {
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM custom_entity_definitions WHERE custom_entity_definition_code = ?",
                [code],
                |row| row.get(0),
            )
            .optional()
            .map_err(from_rusqlite)?;
        Ok(found.is_some())
    }

    /// Insert an entity; the id on the input is ignored and the new id returned
    pub fn insert_entity(conn: &Connection, entity: &CustomEntity) -> Result<i64> {
        conn.execute(
            "INSERT INTO custom_entities (custom_entity_definition_code, locale_id, url_slug,
                ordering, created_at, creator_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                entity.definition_code,
                entity.locale_id,
                entity.url_slug,
                entity.ordering,
                to_millis(entity.created_at),
                entity.creator_id,
            ],
        )
        .map_err(from_rusqlite)?;
        Ok(conn.last_insert_rowid())
    }

    /// Insert a version; the id on the input is ignored and the new id returned
    pub fn insert_version(conn: &Connection, version: &CustomEntityVersion) -> Result<i64> {
        conn.execute(
            "INSERT INTO custom_entity_versions (custom_entity_id, title, data, workflow_status,
                created_at, creator_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                version.custom_entity_id,
                version.title,
                version.data,
                version.workflow_status.as_i64(),
                to_millis(version.created_at),
                version.creator_id,
            ],
        )
        .map_err(from_rusqlite)?;
        Ok(conn.last_insert_rowid())
    }

    pub fn get_entity(conn: &Connection, custom_entity_id: i64) -> Result<Option<CustomEntity>> {
        let sql = format!(
            "SELECT {} FROM custom_entities WHERE custom_entity_id = ?",
            ENTITY_COLUMNS
        );
        conn.query_row(&sql, [custom_entity_id], map_entity)
            .optional()
            .map_err(from_rusqlite)
    }

    /// Definition code of an entity, if it exists
    pub fn get_definition_code(conn: &Connection, custom_entity_id: i64) -> Result<Option<String>> {
        conn.query_row(
            "SELECT custom_entity_definition_code FROM custom_entities WHERE custom_entity_id = ?",
            [custom_entity_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(from_rusqlite)
    }

    /// Entities by id; missing ids are skipped and input order is kept
    pub fn get_entities(conn: &Connection, ids: &[i64]) -> Result<Vec<CustomEntity>> {
        let mut entities = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(entity) = Self::get_entity(conn, *id)? {
                entities.push(entity);
            }
        }
        Ok(entities)
    }

    /// Entities of a definition in ordering position, unordered ones last
    pub fn list_by_definition(conn: &Connection, definition_code: &str) -> Result<Vec<CustomEntity>> {
        let sql = format!(
            "SELECT {} FROM custom_entities WHERE custom_entity_definition_code = ?
             ORDER BY ordering IS NULL, ordering, custom_entity_id",
            ENTITY_COLUMNS
        );
        let mut stmt = conn.prepare(&sql).map_err(from_rusqlite)?;
        let entities = stmt
            .query_map([definition_code], map_entity)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        Ok(entities)
    }

    /// All versions of an entity, oldest first
    pub fn get_versions(conn: &Connection, custom_entity_id: i64) -> Result<Vec<CustomEntityVersion>> {
        let sql = format!(
            "SELECT {} FROM custom_entity_versions WHERE custom_entity_id = ?
             ORDER BY created_at, custom_entity_version_id",
            VERSION_COLUMNS
        );
        let mut stmt = conn.prepare(&sql).map_err(from_rusqlite)?;
        let versions = stmt
            .query_map([custom_entity_id], map_version)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        Ok(versions)
    }

    /// Overwrite the content of a draft version
    pub fn update_draft(conn: &Connection, version: &CustomEntityVersion) -> Result<()> {
        conn.execute(
            "UPDATE custom_entity_versions SET title = ?1, data = ?2
             WHERE custom_entity_version_id = ?3 AND workflow_status = ?4",
            rusqlite::params![
                version.title,
                version.data,
                version.custom_entity_version_id,
                WorkflowStatus::Draft.as_i64(),
            ],
        )
        .map_err(from_rusqlite)?;
        Ok(())
    }

    pub fn apply_transitions(conn: &Connection, transitions: &[Transition]) -> Result<()> {
        apply_transitions(
            conn,
            "custom_entity_versions",
            "custom_entity_version_id",
            transitions,
        )
    }

    pub fn delete_version(conn: &Connection, custom_entity_version_id: i64) -> Result<()> {
        conn.execute(
            "DELETE FROM custom_entity_versions WHERE custom_entity_version_id = ?",
            [custom_entity_version_id],
        )
        .map_err(from_rusqlite)?;
        Ok(())
    }

    pub fn update_url(
        conn: &Connection,
        custom_entity_id: i64,
        locale_id: Option<i64>,
        url_slug: &str,
    ) -> Result<()> {
        conn.execute(
            "UPDATE custom_entities SET locale_id = ?1, url_slug = ?2 WHERE custom_entity_id = ?3",
            rusqlite::params![locale_id, url_slug, custom_entity_id],
        )
        .map_err(from_rusqlite)?;
        Ok(())
    }

    pub fn update_ordering(
        conn: &Connection,
        custom_entity_id: i64,
        ordering: Option<i64>,
    ) -> Result<()> {
        conn.execute(
            "UPDATE custom_entities SET ordering = ?1 WHERE custom_entity_id = ?2",
            rusqlite::params![ordering, custom_entity_id],
        )
        .map_err(from_rusqlite)?;
        Ok(())
    }

    /// Hard delete; versions cascade
    pub fn delete_entity(conn: &Connection, custom_entity_id: i64) -> Result<()> {
        conn.execute(
            "DELETE FROM custom_entity_versions WHERE custom_entity_id = ?",
            [custom_entity_id],
        )
        .map_err(from_rusqlite)?;
        conn.execute(
            "DELETE FROM custom_entities WHERE custom_entity_id = ?",
            [custom_entity_id],
        )
        .map_err(from_rusqlite)?;
        Ok(())
    }

    /// Whether no other entity of the definition uses this slug in the locale
    pub fn is_slug_unique(
        conn: &Connection,
        definition_code: &str,
        locale_id: Option<i64>,
        url_slug: &str,
        exclude_custom_entity_id: Option<i64>,
    ) -> Result<bool> {
        let found: Option<i64> = conn
            .query_row(
                "SELECT custom_entity_id FROM custom_entities
                 WHERE custom_entity_definition_code = ?1 AND locale_id IS ?2 AND url_slug = ?3
                   AND custom_entity_id IS NOT ?4
                 LIMIT 1",
                rusqlite::params![definition_code, locale_id, url_slug, exclude_custom_entity_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(from_rusqlite)?;
        Ok(found.is_none())
    }

    /// Entity ids matching a filter, in ordering position then newest first
    pub fn search(
        conn: &Connection,
        filter: &CustomEntityFilter,
        paging: PagingParams,
    ) -> Result<IdPage> {
        let text = filter.text.as_deref().map(like_pattern);
        let status = filter.workflow_status.map(|s| s.as_i64());
        paged_ids(
            conn,
            "e.custom_entity_id",
            "FROM custom_entities e
             WHERE e.custom_entity_definition_code = ?1
               AND (?2 IS NULL OR e.locale_id = ?2)
               AND (?3 IS NULL OR EXISTS (
                    SELECT 1 FROM custom_entity_versions v
                    WHERE v.custom_entity_id = e.custom_entity_id AND v.workflow_status IN (1, 4)
                      AND v.title LIKE ?3 ESCAPE '\\'))
               AND (?4 IS NULL OR EXISTS (
                    SELECT 1 FROM custom_entity_versions s
                    WHERE s.custom_entity_id = e.custom_entity_id AND s.workflow_status = ?4))",
            "e.ordering IS NULL, e.ordering, e.created_at DESC, e.custom_entity_id DESC",
            &[&filter.definition_code, &filter.locale_id, &text, &status],
            paging,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::apply_migrations;
    use chrono::Utc;

    fn setup_db() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_migrations(&mut conn).unwrap();
        let definition = CustomEntityDefinition::new("BLGPST", "Blog Post");
        SqliteCustomEntityRepo::ensure_definition(&conn, &definition).unwrap();
        conn
    }

    fn new_entity(slug: &str) -> CustomEntity {
        CustomEntity {
            custom_entity_id: 0,
            definition_code: "BLGPST".to_string(),
            locale_id: None,
            url_slug: slug.to_string(),
            ordering: None,
            created_at: Utc::now(),
            creator_id: None,
        }
    }

    fn new_version(custom_entity_id: i64, status: WorkflowStatus) -> CustomEntityVersion {
        CustomEntityVersion {
            custom_entity_version_id: 0,
            custom_entity_id,
            title: "Hello".to_string(),
            data: serde_json::json!({ "body": "text" }),
            workflow_status: status,
            created_at: Utc::now(),
            creator_id: None,
        }
    }

    #[test]
    fn test_ensure_definition_is_idempotent() {
        let conn = setup_db();
        let definition = CustomEntityDefinition::new("BLGPST", "Blog Post");
        assert!(!SqliteCustomEntityRepo::ensure_definition(&conn, &definition).unwrap());
        assert!(SqliteCustomEntityRepo::definition_exists(&conn, "BLGPST").unwrap());
    }

    #[test]
    fn test_data_round_trips_as_json() {
        let conn = setup_db();
        let id = SqliteCustomEntityRepo::insert_entity(&conn, &new_entity("hello")).unwrap();
        SqliteCustomEntityRepo::insert_version(&conn, &new_version(id, WorkflowStatus::Draft))
            .unwrap();

        let versions = SqliteCustomEntityRepo::get_versions(&conn, id).unwrap();
        assert_eq!(versions[0].data["body"], "text");
    }

    #[test]
    fn test_transition_from_wrong_status_is_rejected() {
        let conn = setup_db();
        let id = SqliteCustomEntityRepo::insert_entity(&conn, &new_entity("hello")).unwrap();
        let version_id =
            SqliteCustomEntityRepo::insert_version(&conn, &new_version(id, WorkflowStatus::Draft))
                .unwrap();

        let stale = Transition {
            version_id,
            from: WorkflowStatus::Published,
            to: WorkflowStatus::Archived,
        };
        assert!(SqliteCustomEntityRepo::apply_transitions(&conn, &[stale]).is_err());
    }

    #[test]
    fn test_slug_uniqueness_scoped_by_locale() {
        let conn = setup_db();
        conn.execute("INSERT INTO locales (iso_code, name) VALUES ('fr', 'French')", [])
            .unwrap();
        let id = SqliteCustomEntityRepo::insert_entity(&conn, &new_entity("hello")).unwrap();

        assert!(!SqliteCustomEntityRepo::is_slug_unique(&conn, "BLGPST", None, "hello", None).unwrap());
        assert!(SqliteCustomEntityRepo::is_slug_unique(&conn, "BLGPST", Some(1), "hello", None).unwrap());
        assert!(SqliteCustomEntityRepo::is_slug_unique(&conn, "BLGPST", None, "hello", Some(id)).unwrap());
    }

    #[test]
    fn test_delete_entity_removes_versions() {
        let conn = setup_db();
        let id = SqliteCustomEntityRepo::insert_entity(&conn, &new_entity("hello")).unwrap();
        SqliteCustomEntityRepo::insert_version(&conn, &new_version(id, WorkflowStatus::Draft))
            .unwrap();

        SqliteCustomEntityRepo::delete_entity(&conn, id).unwrap();

        assert!(SqliteCustomEntityRepo::get_entity(&conn, id).unwrap().is_none());
        assert!(SqliteCustomEntityRepo::get_versions(&conn, id).unwrap().is_empty());
    }
}
