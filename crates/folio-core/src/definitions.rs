//! Custom entity definitions
//!
//! Definitions are declared by the host application and registered once at
//! startup. The store keeps a row per definition code so that entities can
//! reference it; that row is created on demand.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::{FolioError, Result};
use crate::model::CustomEntityDefinitionMicroSummary;
use crate::rules::validate_definition_code;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomEntityDefinition {
    /// Six character code; doubles as the permission entity code
    pub code: String,
    pub name: String,
    pub name_plural: String,
    pub description: String,
    /// Url slugs must be unique within the definition (and locale)
    pub force_url_slug_uniqueness: bool,
    pub has_locale: bool,
    pub is_ordered: bool,
    /// New entities get a slug derived from the title when none is given
    pub auto_generate_url_slug: bool,
    /// New entities are published as soon as they are added
    pub auto_publish: bool,
}

impl CustomEntityDefinition {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            code: code.into(),
            name_plural: format!("{}s", name),
            name,
            description: String::new(),
            force_url_slug_uniqueness: false,
            has_locale: false,
            is_ordered: false,
            auto_generate_url_slug: true,
            auto_publish: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn force_url_slug_uniqueness(mut self) -> Self {
        self.force_url_slug_uniqueness = true;
        self
    }

    pub fn localized(mut self) -> Self {
        self.has_locale = true;
        self
    }

    pub fn ordered(mut self) -> Self {
        self.is_ordered = true;
        self
    }

    pub fn auto_publish(mut self) -> Self {
        self.auto_publish = true;
        self
    }

    pub fn micro_summary(&self) -> CustomEntityDefinitionMicroSummary {
        CustomEntityDefinitionMicroSummary {
            code: self.code.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            force_url_slug_uniqueness: self.force_url_slug_uniqueness,
            has_locale: self.has_locale,
            is_ordered: self.is_ordered,
        }
    }
}

/// Definitions known to the engine, keyed by code
#[derive(Debug, Clone, Default)]
pub struct CustomEntityDefinitionRegistry {
    definitions: BTreeMap<String, CustomEntityDefinition>,
}

impl CustomEntityDefinitionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    /// Fails on an invalid code or a code that is already registered.
    pub fn register(&mut self, definition: CustomEntityDefinition) -> Result<()> {
        validate_definition_code(&definition.code)?;
        if self.definitions.contains_key(&definition.code) {
            return Err(FolioError::AlreadyRegistered {
                key: definition.code,
            });
        }
        self.definitions.insert(definition.code.clone(), definition);
        Ok(())
    }

    pub fn get(&self, code: &str) -> Option<&CustomEntityDefinition> {
        self.definitions.get(code)
    }

    /// # Errors
    /// `EntityNotFound` when no definition has this code.
    pub fn require(&self, code: &str) -> Result<&CustomEntityDefinition> {
        self.get(code)
            .ok_or_else(|| FolioError::not_found("custom_entity_definition", code))
    }

    /// All definitions ordered by name
    pub fn all(&self) -> Vec<&CustomEntityDefinition> {
        let mut all: Vec<&CustomEntityDefinition> = self.definitions.values().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
