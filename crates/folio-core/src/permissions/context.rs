use chrono::{DateTime, Utc};
use folio_core_types::RequestContext;
use std::collections::HashSet;

use super::Permission;

/// A role and the permissions granted to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub role_id: i64,
    pub title: String,
    /// Super administrators pass every permission check
    pub is_super_administrator: bool,
    pub permissions: HashSet<Permission>,
}

impl Role {
    pub fn new(role_id: i64, title: impl Into<String>) -> Self {
        Self {
            role_id,
            title: title.into(),
            is_super_administrator: false,
            permissions: HashSet::new(),
        }
    }

    pub fn super_administrator() -> Self {
        Self {
            role_id: 1,
            title: "Super Administrator".to_string(),
            is_super_administrator: true,
            permissions: HashSet::new(),
        }
    }

    pub fn anonymous() -> Self {
        Self::new(0, "Anonymous")
    }

    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permissions.insert(permission);
        self
    }

    pub fn with_permissions(mut self, permissions: impl IntoIterator<Item = Permission>) -> Self {
        self.permissions.extend(permissions);
        self
    }

    pub fn grants(&self, permission: &Permission) -> bool {
        self.is_super_administrator || self.permissions.contains(permission)
    }
}

/// The user a command or query runs as
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContext {
    pub user_id: Option<i64>,
    pub role: Role,
}

impl UserContext {
    pub fn anonymous() -> Self {
        Self {
            user_id: None,
            role: Role::anonymous(),
        }
    }

    /// Elevated context for background work and bootstrap tasks
    pub fn system() -> Self {
        Self {
            user_id: Some(0),
            role: Role::super_administrator(),
        }
    }

    pub fn signed_in(user_id: i64, role: Role) -> Self {
        Self {
            user_id: Some(user_id),
            role,
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.user_id.is_some()
    }
}

/// Everything a handler knows about who runs it and when
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub user: UserContext,
    pub executed_at: DateTime<Utc>,
    pub request: RequestContext,
}

impl ExecutionContext {
    pub fn new(user: UserContext) -> Self {
        Self {
            user,
            executed_at: Utc::now(),
            request: RequestContext::new(),
        }
    }

    pub fn anonymous() -> Self {
        Self::new(UserContext::anonymous())
    }

    pub fn system() -> Self {
        Self::new(UserContext::system())
    }

    pub fn with_request(mut self, request: RequestContext) -> Self {
        self.request = request;
        self
    }

    pub fn user(&self) -> &UserContext {
        &self.user
    }

    /// Same request, different user; used to elevate a nested call
    pub fn elevated(&self) -> Self {
        Self {
            user: UserContext::system(),
            executed_at: self.executed_at,
            request: self.request.child(),
        }
    }
}
