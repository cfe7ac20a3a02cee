use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::workflow::{VersionState, WorkflowStatus, WorkflowStatusQuery};
use crate::ops::workflow::select_version;

/// Kind of page; custom entity details pages route by a routing rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PageType {
    Generic,
    CustomEntityDetails,
}

impl PageType {
    pub fn as_i64(self) -> i64 {
        match self {
            PageType::Generic => 1,
            PageType::CustomEntityDetails => 2,
        }
    }

    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            1 => Some(PageType::Generic),
            2 => Some(PageType::CustomEntityDetails),
            _ => None,
        }
    }
}

/// Page record as persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub page_id: i64,
    pub web_directory_id: i64,
    pub locale_id: Option<i64>,
    /// Leaf path segment, or a routing rule format for custom entity details pages
    pub url_path: String,
    pub page_type: PageType,
    pub custom_entity_definition_code: Option<String>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub creator_id: Option<i64>,
}

/// Page version record as persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageVersion {
    pub page_version_id: i64,
    pub page_id: i64,
    pub title: String,
    pub meta_description: String,
    pub exclude_from_sitemap: bool,
    pub workflow_status: WorkflowStatus,
    pub created_at: DateTime<Utc>,
    pub creator_id: Option<i64>,
}

impl PageVersion {
    pub fn state(&self) -> VersionState {
        VersionState::new(self.page_version_id, self.workflow_status, self.created_at)
    }
}

/// Version entry of a cached page route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageVersionRoute {
    pub version_id: i64,
    pub title: String,
    pub workflow_status: WorkflowStatus,
    pub created_at: DateTime<Utc>,
}

/// Small, cacheable routing summary of a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRoute {
    pub page_id: i64,
    pub web_directory_id: i64,
    pub locale_id: Option<i64>,
    pub url_path: String,
    pub full_path: String,
    pub page_type: PageType,
    pub custom_entity_definition_code: Option<String>,
    pub title: String,
    pub is_published: bool,
    pub has_draft: bool,
    pub versions: Vec<PageVersionRoute>,
}

impl PageRoute {
    /// Build a route from a page and all of its versions
    pub fn build(page: &Page, versions: &[PageVersion], full_path: String) -> Self {
        let states: Vec<VersionState> = versions.iter().map(PageVersion::state).collect();
        let title = select_version(&states, WorkflowStatusQuery::PreferPublished)
            .and_then(|s| versions.iter().find(|v| v.page_version_id == s.version_id))
            .map(|v| v.title.clone())
            .unwrap_or_default();

        Self {
            page_id: page.page_id,
            web_directory_id: page.web_directory_id,
            locale_id: page.locale_id,
            url_path: page.url_path.clone(),
            full_path,
            page_type: page.page_type,
            custom_entity_definition_code: page.custom_entity_definition_code.clone(),
            title,
            is_published: states
                .iter()
                .any(|s| s.status == WorkflowStatus::Published),
            has_draft: states.iter().any(|s| s.status == WorkflowStatus::Draft),
            versions: versions
                .iter()
                .filter(|v| v.workflow_status != WorkflowStatus::Archived)
                .map(|v| PageVersionRoute {
                    version_id: v.page_version_id,
                    title: v.title.clone(),
                    workflow_status: v.workflow_status,
                    created_at: v.created_at,
                })
                .collect(),
        }
    }

    /// Resolve the version a read should use
    pub fn version(&self, query: WorkflowStatusQuery) -> Option<&PageVersionRoute> {
        let states: Vec<VersionState> = self
            .versions
            .iter()
            .map(|v| VersionState::new(v.version_id, v.workflow_status, v.created_at))
            .collect();
        let selected = select_version(&states, query)?;
        self.versions
            .iter()
            .find(|v| v.version_id == selected.version_id)
    }
}

/// Full editing view of a page and its latest version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageDetails {
    pub page: Page,
    pub latest_version: PageVersion,
    pub full_path: String,
    pub is_published: bool,
    pub has_draft: bool,
}

/// Data needed to render one page version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRenderDetails {
    pub page_id: i64,
    pub page_version_id: i64,
    pub title: String,
    pub meta_description: String,
    pub workflow_status: WorkflowStatus,
    pub page_route: Option<PageRoute>,
}

/// Search result row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSummary {
    pub page_id: i64,
    pub title: String,
    pub full_path: String,
    pub locale_id: Option<i64>,
    pub page_type: PageType,
    pub is_published: bool,
    pub has_draft: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&PageRoute> for PageSummary {
    fn from(route: &PageRoute) -> Self {
        Self {
            page_id: route.page_id,
            title: route.title.clone(),
            full_path: route.full_path.clone(),
            locale_id: route.locale_id,
            page_type: route.page_type,
            is_published: route.is_published,
            has_draft: route.has_draft,
            created_at: route
                .versions
                .iter()
                .map(|v| v.created_at)
                .min()
                .unwrap_or_else(Utc::now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Page {
        Page {
            page_id: 1,
            web_directory_id: 1,
            locale_id: None,
            url_path: "about".to_string(),
            page_type: PageType::Generic,
            custom_entity_definition_code: None,
            is_deleted: false,
            created_at: Utc::now(),
            creator_id: None,
        }
    }

    fn version(id: i64, title: &str, status: WorkflowStatus) -> PageVersion {
        PageVersion {
            page_version_id: id,
            page_id: 1,
            title: title.to_string(),
            meta_description: String::new(),
            exclude_from_sitemap: false,
            workflow_status: status,
            created_at: Utc::now(),
            creator_id: None,
        }
    }

    #[test]
    fn test_route_title_prefers_published() {
        let versions = vec![
            version(1, "Live", WorkflowStatus::Published),
            version(2, "Working", WorkflowStatus::Draft),
        ];
        let route = PageRoute::build(&page(), &versions, "/about".to_string());

        assert_eq!(route.title, "Live");
        assert!(route.is_published);
        assert!(route.has_draft);
        assert_eq!(
            route.version(WorkflowStatusQuery::Latest).map(|v| v.version_id),
            Some(2)
        );
    }

    #[test]
    fn test_route_drops_archived_versions() {
        let versions = vec![
            version(1, "Old", WorkflowStatus::Archived),
            version(2, "Working", WorkflowStatus::Draft),
        ];
        let route = PageRoute::build(&page(), &versions, "/about".to_string());

        assert_eq!(route.versions.len(), 1);
        assert!(!route.is_published);
        assert_eq!(route.title, "Working");
    }

    #[test]
    fn test_page_type_integers() {
        assert_eq!(PageType::from_i64(PageType::CustomEntityDetails.as_i64()), Some(PageType::CustomEntityDetails));
        assert_eq!(PageType::from_i64(0), None);
    }
}
