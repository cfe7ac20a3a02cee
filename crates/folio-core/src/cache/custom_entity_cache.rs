use std::sync::Arc;

use super::ObjectCache;
use crate::model::CustomEntityRoute;

/// Custom entity routes grouped by definition code
pub struct CustomEntityCache {
    routes_by_definition: ObjectCache<String, Arc<Vec<CustomEntityRoute>>>,
}

impl CustomEntityCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            routes_by_definition: ObjectCache::new(capacity),
        }
    }

    pub fn get_or_add_routes<E>(
        &self,
        definition_code: &str,
        compute: impl FnOnce() -> Result<Arc<Vec<CustomEntityRoute>>, E>,
    ) -> Result<Arc<Vec<CustomEntityRoute>>, E> {
        self.routes_by_definition
            .get_or_add(definition_code.to_string(), compute)
    }

    pub fn contains(&self, definition_code: &str) -> bool {
        self.routes_by_definition
            .contains(&definition_code.to_string())
    }

    /// Clear the route list holding an entity of this definition
    pub fn clear(&self, definition_code: &str, custom_entity_id: i64) {
        tracing::debug!(definition_code, custom_entity_id, "clear custom entity cache");
        self.routes_by_definition
            .clear(&definition_code.to_string());
    }

    pub fn clear_definition(&self, definition_code: &str) {
        self.routes_by_definition
            .clear(&definition_code.to_string());
    }

    pub fn clear_all(&self) {
        self.routes_by_definition.clear_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_only_affects_one_definition() {
        let cache = CustomEntityCache::new(4);
        cache
            .get_or_add_routes::<()>("BLGPST", || Ok(Arc::new(vec![])))
            .unwrap();
        cache
            .get_or_add_routes::<()>("PRODCT", || Ok(Arc::new(vec![])))
            .unwrap();

        cache.clear("BLGPST", 3);

        assert!(!cache.contains("BLGPST"));
        assert!(cache.contains("PRODCT"));
    }
}
