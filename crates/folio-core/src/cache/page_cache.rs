use std::sync::Arc;

use super::ObjectCache;
use crate::model::PageRoute;

/// Page routes by id, plus the full route list used by routing tables
pub struct PageCache {
    routes: ObjectCache<i64, PageRoute>,
    all_routes: ObjectCache<(), Arc<Vec<PageRoute>>>,
}

impl PageCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            routes: ObjectCache::new(capacity),
            all_routes: ObjectCache::new(usize::from(capacity > 0)),
        }
    }

    pub fn route(&self, page_id: i64) -> Option<PageRoute> {
        self.routes.get(&page_id)
    }

    pub fn get_or_add_route<E>(
        &self,
        page_id: i64,
        compute: impl FnOnce() -> Result<PageRoute, E>,
    ) -> Result<PageRoute, E> {
        self.routes.get_or_add(page_id, compute)
    }

    pub fn get_or_add_all<E>(
        &self,
        compute: impl FnOnce() -> Result<Arc<Vec<PageRoute>>, E>,
    ) -> Result<Arc<Vec<PageRoute>>, E> {
        self.all_routes.get_or_add((), compute)
    }

    pub fn contains(&self, page_id: i64) -> bool {
        self.routes.contains(&page_id)
    }

    pub fn has_all_routes(&self) -> bool {
        self.all_routes.contains(&())
    }

    /// Clear one page; the route list includes every page so it goes too
    pub fn clear(&self, page_id: i64) {
        tracing::debug!(page_id, "clear page cache");
        self.routes.clear(&page_id);
        self.all_routes.clear_all();
    }

    pub fn clear_all(&self) {
        self.routes.clear_all();
        self.all_routes.clear_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PageType;

    fn route(page_id: i64) -> PageRoute {
        PageRoute {
            page_id,
            web_directory_id: 1,
            locale_id: None,
            url_path: format!("p{}", page_id),
            full_path: format!("/p{}", page_id),
            page_type: PageType::Generic,
            custom_entity_definition_code: None,
            title: "T".to_string(),
            is_published: false,
            has_draft: true,
            versions: vec![],
        }
    }

    #[test]
    fn test_clear_drops_route_and_list() {
        let cache = PageCache::new(10);
        cache.get_or_add_route::<()>(1, || Ok(route(1))).unwrap();
        cache.get_or_add_route::<()>(2, || Ok(route(2))).unwrap();
        cache
            .get_or_add_all::<()>(|| Ok(Arc::new(vec![route(1), route(2)])))
            .unwrap();

        cache.clear(1);

        assert!(!cache.contains(1));
        assert!(cache.contains(2));
        assert!(!cache.has_all_routes());
    }
}
