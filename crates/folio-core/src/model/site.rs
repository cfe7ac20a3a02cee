use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A content locale (e.g. `en-GB`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locale {
    pub locale_id: i64,
    pub iso_code: String,
    pub name: String,
    pub is_active: bool,
}

/// A node in the site's directory tree; pages live inside directories
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebDirectory {
    pub web_directory_id: i64,
    pub parent_web_directory_id: Option<i64>,
    pub name: String,
    /// Path segment of this directory (empty for the root)
    pub url_path: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl WebDirectory {
    /// Resolve the absolute path of every directory, keyed by id
    ///
    /// The root resolves to an empty string and children to `/segment/...`.
    /// Directories whose parent chain is broken or cyclic are omitted.
    pub fn resolve_full_paths(directories: &[WebDirectory]) -> HashMap<i64, String> {
        let by_id: HashMap<i64, &WebDirectory> = directories
            .iter()
            .map(|d| (d.web_directory_id, d))
            .collect();
        let mut paths = HashMap::new();

        for directory in directories {
            let mut segments = Vec::new();
            let mut current = Some(directory);
            let mut depth = 0;
            let mut complete = false;

            while let Some(dir) = current {
                if depth > directories.len() {
                    break;
                }
                if !dir.url_path.is_empty() {
                    segments.push(dir.url_path.as_str());
                }
                match dir.parent_web_directory_id {
                    None => {
                        complete = true;
                        current = None;
                    }
                    Some(parent_id) => current = by_id.get(&parent_id).copied(),
                }
                depth += 1;
            }

            if complete {
                segments.reverse();
                let path = segments
                    .iter()
                    .map(|s| format!("/{}", s))
                    .collect::<String>();
                paths.insert(directory.web_directory_id, path);
            }
        }

        paths
    }
}

/// Combine locale, directory path and a leaf segment into an absolute url path
pub fn combine_path(locale_iso: Option<&str>, directory_path: &str, leaf: &str) -> String {
    let mut path = String::new();
    if let Some(iso) = locale_iso {
        path.push('/');
        path.push_str(&iso.to_ascii_lowercase());
    }
    path.push_str(directory_path);
    if !leaf.is_empty() {
        path.push('/');
        path.push_str(leaf);
    }
    if path.is_empty() {
        path.push('/');
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dir(id: i64, parent: Option<i64>, url_path: &str) -> WebDirectory {
        WebDirectory {
            web_directory_id: id,
            parent_web_directory_id: parent,
            name: url_path.to_string(),
            url_path: url_path.to_string(),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_resolve_full_paths_nested() {
        let dirs = vec![dir(1, None, ""), dir(2, Some(1), "blog"), dir(3, Some(2), "2024")];
        let paths = WebDirectory::resolve_full_paths(&dirs);

        assert_eq!(paths.get(&1).map(String::as_str), Some(""));
        assert_eq!(paths.get(&2).map(String::as_str), Some("/blog"));
        assert_eq!(paths.get(&3).map(String::as_str), Some("/blog/2024"));
    }

    #[test]
    fn test_resolve_full_paths_skips_orphans() {
        let dirs = vec![dir(1, None, ""), dir(5, Some(99), "lost")];
        let paths = WebDirectory::resolve_full_paths(&dirs);
        assert!(!paths.contains_key(&5));
    }

    #[test]
    fn test_combine_path() {
        assert_eq!(combine_path(None, "", ""), "/");
        assert_eq!(combine_path(None, "", "about"), "/about");
        assert_eq!(combine_path(Some("en-GB"), "/blog", "post"), "/en-gb/blog/post");
        assert_eq!(combine_path(Some("fr"), "", ""), "/fr");
    }
}
