//! Permission model and validation
//!
//! A [`Permission`] pairs an entity definition code with an action. Pages,
//! image assets, web directories and settings use fixed codes; custom
//! entities use the code of their own definition.

pub mod context;
pub mod validation;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use context::{ExecutionContext, Role, UserContext};
pub use validation::{PermissionValidationService, RoleBasedPermissionValidationService};

pub const PAGE_ENTITY_CODE: &str = "FOLPGE";
pub const IMAGE_ASSET_ENTITY_CODE: &str = "FOLIMG";
pub const WEB_DIRECTORY_ENTITY_CODE: &str = "FOLDIR";
pub const SETTINGS_ENTITY_CODE: &str = "FOLSET";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PermissionType {
    Read,
    Create,
    Update,
    UpdateUrl,
    Publish,
    Delete,
    AdminModule,
}

impl PermissionType {
    pub fn as_str(self) -> &'static str {
        match self {
            PermissionType::Read => "read",
            PermissionType::Create => "create",
            PermissionType::Update => "update",
            PermissionType::UpdateUrl => "update_url",
            PermissionType::Publish => "publish",
            PermissionType::Delete => "delete",
            PermissionType::AdminModule => "admin_module",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permission {
    pub entity_code: String,
    pub permission_type: PermissionType,
}

impl Permission {
    pub fn new(entity_code: impl Into<String>, permission_type: PermissionType) -> Self {
        Self {
            entity_code: entity_code.into(),
            permission_type,
        }
    }

    pub fn page(permission_type: PermissionType) -> Self {
        Self::new(PAGE_ENTITY_CODE, permission_type)
    }

    pub fn image_asset(permission_type: PermissionType) -> Self {
        Self::new(IMAGE_ASSET_ENTITY_CODE, permission_type)
    }

    pub fn web_directory(permission_type: PermissionType) -> Self {
        Self::new(WEB_DIRECTORY_ENTITY_CODE, permission_type)
    }

    pub fn settings(permission_type: PermissionType) -> Self {
        Self::new(SETTINGS_ENTITY_CODE, permission_type)
    }

    pub fn custom_entity(definition_code: &str, permission_type: PermissionType) -> Self {
        Self::new(definition_code, permission_type)
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.entity_code, self.permission_type.as_str())
    }
}
