//! Custom entity routing rules
//!
//! A custom entity details page stores a route format such as `{UrlSlug}`
//! as its url path. The matching rule turns the remainder of a request path
//! into an entity lookup, and an entity back into a url.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::errors::{FolioError, Result};
use crate::model::CustomEntityRoute;

/// What a rule extracted from a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteMatch {
    UrlSlug(String),
    Id { custom_entity_id: i64, url_slug: String },
}

impl RouteMatch {
    pub fn is_match(&self, route: &CustomEntityRoute) -> bool {
        match self {
            RouteMatch::UrlSlug(slug) => route.url_slug == *slug,
            RouteMatch::Id {
                custom_entity_id, ..
            } => route.custom_entity_id == *custom_entity_id,
        }
    }
}

pub trait CustomEntityRoutingRule: Send + Sync {
    /// Format stored as the details page url path
    fn route_format(&self) -> &str;

    /// Whether the rule can only address entities with unique slugs
    fn requires_unique_url_slug(&self) -> bool;

    /// Lower runs first when several rules could match
    fn priority(&self) -> i32;

    fn match_path(&self, path: &str) -> Option<RouteMatch>;

    /// Entity url below the details page's directory path
    fn make_url(&self, directory_path: &str, route: &CustomEntityRoute) -> String;
}

fn join(directory_path: &str, tail: &str) -> String {
    format!("{}/{}", directory_path.trim_end_matches('/'), tail)
}

/// `{UrlSlug}`: the slug alone identifies the entity
#[derive(Debug, Default, Clone, Copy)]
pub struct UrlSlugRoutingRule;

impl CustomEntityRoutingRule for UrlSlugRoutingRule {
    fn route_format(&self) -> &str {
        "{UrlSlug}"
    }

    fn requires_unique_url_slug(&self) -> bool {
        true
    }

    fn priority(&self) -> i32 {
        20
    }

    fn match_path(&self, path: &str) -> Option<RouteMatch> {
        let slug = path.trim_matches('/');
        if slug.is_empty() || slug.contains('/') {
            return None;
        }
        Some(RouteMatch::UrlSlug(slug.to_string()))
    }

    fn make_url(&self, directory_path: &str, route: &CustomEntityRoute) -> String {
        join(directory_path, &route.url_slug)
    }
}

/// `{Id}/{UrlSlug}`: the id identifies the entity, the slug is cosmetic
#[derive(Debug, Default, Clone, Copy)]
pub struct IdAndUrlSlugRoutingRule;

impl CustomEntityRoutingRule for IdAndUrlSlugRoutingRule {
    fn route_format(&self) -> &str {
        "{Id}/{UrlSlug}"
    }

    fn requires_unique_url_slug(&self) -> bool {
        false
    }

    fn priority(&self) -> i32 {
        10
    }

    fn match_path(&self, path: &str) -> Option<RouteMatch> {
        let mut parts = path.trim_matches('/').split('/');
        let id = parts.next()?.parse::<i64>().ok()?;
        let slug = parts.next()?;
        if parts.next().is_some() || slug.is_empty() {
            return None;
        }
        Some(RouteMatch::Id {
            custom_entity_id: id,
            url_slug: slug.to_string(),
        })
    }

    fn make_url(&self, directory_path: &str, route: &CustomEntityRoute) -> String {
        join(
            directory_path,
            &format!("{}/{}", route.custom_entity_id, route.url_slug),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingRuleSummary {
    pub route_format: String,
    pub requires_unique_url_slug: bool,
    pub priority: i32,
}

/// Registered rules, looked up by route format
#[derive(Clone)]
pub struct RoutingRuleRegistry {
    rules: Vec<Arc<dyn CustomEntityRoutingRule>>,
}

impl Default for RoutingRuleRegistry {
    fn default() -> Self {
        Self {
            rules: vec![Arc::new(IdAndUrlSlugRoutingRule), Arc::new(UrlSlugRoutingRule)],
        }
    }
}

impl RoutingRuleRegistry {
    /// Registry holding the built-in rules
    pub fn new() -> Self {
        Self::default()
    }

    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// # Errors
    /// Fails when a rule with the same route format exists.
    pub fn register(&mut self, rule: Arc<dyn CustomEntityRoutingRule>) -> Result<()> {
        if self.get(rule.route_format()).is_some() {
            return Err(FolioError::AlreadyRegistered {
                key: rule.route_format().to_string(),
            });
        }
        self.rules.push(rule);
        self.rules.sort_by_key(|r| r.priority());
        Ok(())
    }

    pub fn get(&self, route_format: &str) -> Option<Arc<dyn CustomEntityRoutingRule>> {
        self.rules
            .iter()
            .find(|r| r.route_format() == route_format)
            .cloned()
    }

    /// Rules in priority order
    pub fn all(&self) -> &[Arc<dyn CustomEntityRoutingRule>] {
        &self.rules
    }

    pub fn summaries(&self) -> Vec<RoutingRuleSummary> {
        self.rules.iter().map(|r| summarize(r.as_ref())).collect()
    }
}

pub fn summarize(rule: &dyn CustomEntityRoutingRule) -> RoutingRuleSummary {
    RoutingRuleSummary {
        route_format: rule.route_format().to_string(),
        requires_unique_url_slug: rule.requires_unique_url_slug(),
        priority: rule.priority(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(id: i64, slug: &str) -> CustomEntityRoute {
        CustomEntityRoute {
            custom_entity_id: id,
            definition_code: "BLGPST".to_string(),
            locale_id: None,
            url_slug: slug.to_string(),
            ordering: None,
            is_published: true,
            has_draft: false,
            versions: vec![],
        }
    }

    #[test]
    fn test_url_slug_rule() {
        let rule = UrlSlugRoutingRule;
        let m = rule.match_path("hello-world").unwrap();
        assert!(m.is_match(&route(1, "hello-world")));
        assert!(rule.match_path("a/b").is_none());
        assert_eq!(rule.make_url("/blog", &route(1, "hello")), "/blog/hello");
    }

    #[test]
    fn test_id_rule() {
        let rule = IdAndUrlSlugRoutingRule;
        let m = rule.match_path("/42/anything/").unwrap();
        assert!(m.is_match(&route(42, "renamed")));
        assert!(rule.match_path("abc/slug").is_none());
        assert_eq!(rule.make_url("/", &route(42, "post")), "/42/post");
    }

    #[test]
    fn test_registry_has_builtins_and_rejects_duplicates() {
        let mut registry = RoutingRuleRegistry::new();
        assert!(registry.get("{UrlSlug}").unwrap().requires_unique_url_slug());
        assert!(!registry.get("{Id}/{UrlSlug}").unwrap().requires_unique_url_slug());
        assert!(registry.register(Arc::new(UrlSlugRoutingRule)).is_err());
        assert_eq!(registry.summaries()[0].route_format, "{Id}/{UrlSlug}");
    }
}
