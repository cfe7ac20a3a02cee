use std::collections::BTreeSet;

use super::{Permission, PermissionType, UserContext};
use crate::errors::{FolioError, Result};

fn denied(permission: &Permission, user: &UserContext) -> FolioError {
    if user.is_signed_in() {
        FolioError::PermissionDenied {
            permission: permission.to_string(),
            user_id: user.user_id,
        }
    } else {
        FolioError::NotSignedIn {
            permission: permission.to_string(),
        }
    }
}

/// Checks a user against required permissions
///
/// Implementations only answer and raise; they never mutate anything.
pub trait PermissionValidationService: Send + Sync {
    fn has_permission(&self, permission: &Permission, user: &UserContext) -> bool;

    /// Fail on the first required permission the user lacks
    ///
    /// # Errors
    /// `NotSignedIn` for anonymous users, otherwise `PermissionDenied`.
    fn enforce(&self, required: &[Permission], user: &UserContext) -> Result<()> {
        match required.iter().find(|p| !self.has_permission(p, user)) {
            Some(missing) => Err(denied(missing, user)),
            None => Ok(()),
        }
    }

    /// Enforce one permission type across a set of custom entity definitions
    ///
    /// # Errors
    /// As [`PermissionValidationService::enforce`].
    fn enforce_custom_entity_permission(
        &self,
        permission_type: PermissionType,
        definition_codes: &[String],
        user: &UserContext,
    ) -> Result<()> {
        let codes: BTreeSet<&str> = definition_codes.iter().map(String::as_str).collect();
        let required: Vec<Permission> = codes
            .into_iter()
            .map(|code| Permission::custom_entity(code, permission_type))
            .collect();
        self.enforce(&required, user)
    }

    /// # Errors
    /// `NotSignedIn` when the user is anonymous.
    fn enforce_is_logged_in(&self, user: &UserContext) -> Result<()> {
        if user.is_signed_in() {
            Ok(())
        } else {
            Err(FolioError::NotSignedIn {
                permission: "signed_in".to_string(),
            })
        }
    }
}

/// Grants whatever the user's role lists; super administrators pass everything
#[derive(Debug, Default, Clone, Copy)]
pub struct RoleBasedPermissionValidationService;

impl PermissionValidationService for RoleBasedPermissionValidationService {
    fn has_permission(&self, permission: &Permission, user: &UserContext) -> bool {
        user.role.grants(permission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::Role;

    fn editor() -> UserContext {
        UserContext::signed_in(
            5,
            Role::new(2, "Editor").with_permissions([
                Permission::page(PermissionType::Read),
                Permission::custom_entity("BLGPST", PermissionType::Read),
            ]),
        )
    }

    #[test]
    fn test_enforce_names_first_missing_permission() {
        let service = RoleBasedPermissionValidationService;
        let err = service
            .enforce(
                &[
                    Permission::page(PermissionType::Read),
                    Permission::page(PermissionType::Publish),
                ],
                &editor(),
            )
            .unwrap_err();

        assert_eq!(
            err,
            FolioError::PermissionDenied {
                permission: "FOLPGE:publish".to_string(),
                user_id: Some(5),
            }
        );
    }

    #[test]
    fn test_anonymous_is_not_signed_in() {
        let service = RoleBasedPermissionValidationService;
        let err = service
            .enforce(&[Permission::page(PermissionType::Read)], &UserContext::anonymous())
            .unwrap_err();
        assert!(matches!(err, FolioError::NotSignedIn { .. }));
        assert!(service.enforce_is_logged_in(&UserContext::anonymous()).is_err());
    }

    #[test]
    fn test_custom_entity_permission_per_definition() {
        let service = RoleBasedPermissionValidationService;
        let user = editor();

        assert!(service
            .enforce_custom_entity_permission(
                PermissionType::Read,
                &["BLGPST".to_string(), "BLGPST".to_string()],
                &user
            )
            .is_ok());
        assert!(service
            .enforce_custom_entity_permission(
                PermissionType::Read,
                &["BLGPST".to_string(), "PRODCT".to_string()],
                &user
            )
            .is_err());
    }

    #[test]
    fn test_empty_requirement_always_passes() {
        let service = RoleBasedPermissionValidationService;
        assert!(service.enforce(&[], &UserContext::anonymous()).is_ok());
    }
}
