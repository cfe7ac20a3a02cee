//! Image asset records and tags

#![allow(clippy::result_large_err)]

use folio_core::model::{ImageAsset, PagingParams};
use rusqlite::{Connection, OptionalExtension};

use super::{from_millis, like_pattern, paged_ids, to_millis, IdPage};
use crate::errors::{from_rusqlite, Result};

pub struct SqliteImageAssetRepo;

/// Search filter for image assets; every listed tag must be present
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageAssetFilter {
    pub text: Option<String>,
    pub tags: Vec<String>,
}

const ASSET_COLUMNS: &str = "image_asset_id, title, file_name, extension, width, height, \
     file_size, file_digest, is_deleted, created_at, updated_at, creator_id";

fn map_asset(row: &rusqlite::Row<'_>) -> rusqlite::Result<ImageAsset> {
    Ok(ImageAsset {
        image_asset_id: row.get(0)?,
        title: row.get(1)?,
        file_name: row.get(2)?,
        extension: row.get(3)?,
        width: row.get(4)?,
        height: row.get(5)?,
        file_size: row.get::<_, i64>(6)?.try_into().unwrap_or(0),
        file_digest: row.get(7)?,
        is_deleted: row.get::<_, i64>(8)? != 0,
        created_at: from_millis(row.get(9)?),
        updated_at: from_millis(row.get(10)?),
        creator_id: row.get(11)?,
        tags: Vec::new(),
    })
}

fn load_tags(conn: &Connection, image_asset_id: i64) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT tag FROM image_asset_tags WHERE image_asset_id = ? ORDER BY tag")
        .map_err(from_rusqlite)?;
    let tags = stmt
        .query_map([image_asset_id], |row| row.get(0))
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<String>, _>>()
        .map_err(from_rusqlite)?;
    Ok(tags)
}

fn replace_tags(conn: &Connection, image_asset_id: i64, tags: &[String]) -> Result<()> {
    conn.execute(
        "DELETE FROM image_asset_tags WHERE image_asset_id = ?",
        [image_asset_id],
    )
    .map_err(from_rusqlite)?;
    for tag in tags {
        conn.execute(
            "INSERT OR IGNORE INTO image_asset_tags (image_asset_id, tag) VALUES (?1, ?2)",
            rusqlite::params![image_asset_id, tag],
        )
        .map_err(from_rusqlite)?;
    }
    Ok(())
}

impl SqliteImageAssetRepo {
    /// Insert an asset and its tags; the id on the input is ignored
    pub fn insert(conn: &Connection, asset: &ImageAsset) -> Result<i64> {
        conn.execute(
            "INSERT INTO image_assets (title, file_name, extension, width, height, file_size,
                file_digest, is_deleted, created_at, updated_at, creator_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8, ?9, ?10)",
            rusqlite::params![
                asset.title,
                asset.file_name,
                asset.extension,
                asset.width,
                asset.height,
                i64::try_from(asset.file_size).unwrap_or(i64::MAX),
                asset.file_digest,
                to_millis(asset.created_at),
                to_millis(asset.updated_at),
                asset.creator_id,
            ],
        )
        .map_err(from_rusqlite)?;
        let image_asset_id = conn.last_insert_rowid();
        replace_tags(conn, image_asset_id, &asset.tags)?;
        Ok(image_asset_id)
    }

    /// Get an asset unless it has been deleted
    pub fn get(conn: &Connection, image_asset_id: i64) -> Result<Option<ImageAsset>> {
        let sql = format!(
            "SELECT {} FROM image_assets WHERE image_asset_id = ? AND is_deleted = 0",
            ASSET_COLUMNS
        );
        let asset = conn
            .query_row(&sql, [image_asset_id], map_asset)
            .optional()
            .map_err(from_rusqlite)?;
        match asset {
            Some(mut asset) => {
                asset.tags = load_tags(conn, image_asset_id)?;
                Ok(Some(asset))
            }
            None => Ok(None),
        }
    }

    /// Assets by id; missing ids are skipped and input order is kept
    pub fn get_many(conn: &Connection, ids: &[i64]) -> Result<Vec<ImageAsset>> {
        let mut assets = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(asset) = Self::get(conn, *id)? {
                assets.push(asset);
            }
        }
        Ok(assets)
    }

    /// Save title, file fields and tags
    pub fn update(conn: &Connection, asset: &ImageAsset) -> Result<()> {
        conn.execute(
            "UPDATE image_assets SET title = ?1, file_name = ?2, extension = ?3, width = ?4,
                height = ?5, file_size = ?6, file_digest = ?7, updated_at = ?8
             WHERE image_asset_id = ?9",
            rusqlite::params![
                asset.title,
                asset.file_name,
                asset.extension,
                asset.width,
                asset.height,
                i64::try_from(asset.file_size).unwrap_or(i64::MAX),
                asset.file_digest,
                to_millis(asset.updated_at),
                asset.image_asset_id,
            ],
        )
        .map_err(from_rusqlite)?;
        replace_tags(conn, asset.image_asset_id, &asset.tags)
    }

    /// Soft delete; the file stays in the asset store
    pub fn mark_deleted(conn: &Connection, image_asset_id: i64) -> Result<()> {
        conn.execute(
            "UPDATE image_assets SET is_deleted = 1 WHERE image_asset_id = ?",
            [image_asset_id],
        )
        .map_err(from_rusqlite)?;
        Ok(())
    }

    /// Asset ids matching a filter, most recently updated first
    pub fn search(
        conn: &Connection,
        filter: &ImageAssetFilter,
        paging: PagingParams,
    ) -> Result<IdPage> {
        let text = filter.text.as_deref().map(like_pattern);
        let tags_json = serde_json::to_string(&filter.tags).unwrap_or_else(|_| "[]".to_string());
        let tag_count = i64::try_from(filter.tags.len()).unwrap_or(i64::MAX);
        paged_ids(
            conn,
            "a.image_asset_id",
            "FROM image_assets a
             WHERE a.is_deleted = 0
               AND (?1 IS NULL OR a.title LIKE ?1 ESCAPE '\\' OR a.file_name LIKE ?1 ESCAPE '\\')
               AND (?3 = 0 OR (
                    SELECT COUNT(*) FROM image_asset_tags t
                    WHERE t.image_asset_id = a.image_asset_id
                      AND t.tag IN (SELECT value FROM json_each(?2))) = ?3)",
            "a.updated_at DESC, a.image_asset_id DESC",
            &[&text, &tags_json, &tag_count],
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
        conn
    }

    fn new_asset(title: &str, tags: &[&str]) -> ImageAsset {
        let now = Utc::now();
        ImageAsset {
            image_asset_id: 0,
            title: title.to_string(),
            file_name: title.to_lowercase(),
            extension: "png".to_string(),
            width: 640,
            height: 480,
            file_size: 1024,
            file_digest: "ab".repeat(32),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            is_deleted: false,
            created_at: now,
            updated_at: now,
            creator_id: None,
        }
    }

    #[test]
    fn test_insert_and_get_with_tags() {
        let conn = setup_db();
        let id = SqliteImageAssetRepo::insert(&conn, &new_asset("Logo", &["brand", "header"])).unwrap();

        let asset = SqliteImageAssetRepo::get(&conn, id).unwrap().unwrap();
        assert_eq!(asset.tags, vec!["brand", "header"]);
        assert_eq!(asset.width, 640);
    }

    #[test]
    fn test_search_requires_all_tags() {
        let conn = setup_db();
        let both = SqliteImageAssetRepo::insert(&conn, &new_asset("Logo", &["brand", "header"])).unwrap();
        SqliteImageAssetRepo::insert(&conn, &new_asset("Banner", &["brand"])).unwrap();

        let filter = ImageAssetFilter {
            text: None,
            tags: vec!["brand".to_string(), "header".to_string()],
        };
        let result = SqliteImageAssetRepo::search(&conn, &filter, PagingParams::default()).unwrap();
        assert_eq!(result.ids, vec![both]);
    }

    #[test]
    fn test_deleted_assets_hidden() {
        let conn = setup_db();
        let id = SqliteImageAssetRepo::insert(&conn, &new_asset("Logo", &[])).unwrap();
        SqliteImageAssetRepo::mark_deleted(&conn, id).unwrap();

        assert!(SqliteImageAssetRepo::get(&conn, id).unwrap().is_none());
        let result =
            SqliteImageAssetRepo::search(&conn, &ImageAssetFilter::default(), PagingParams::default())
                .unwrap();
        assert_eq!(result.total, 0);
    }
}
