//! Workspace role guards for directory routes.

use starry_core::error::AppError;

use crate::extractors::AuthUser;

/// Directory create, rename, move and delete: owner or admin.
pub fn require_admin_or_owner(auth: &AuthUser) -> Result<(), AppError> {
    if !auth.can_manage_directories() {
        return Err(AppError::authorization("Owner or Admin access required"));
    }
    Ok(())
}

/// Tree reads: owner, admin or editor.
pub fn require_editor(auth: &AuthUser) -> Result<(), AppError> {
    if !auth.can_view_directories() {
        return Err(AppError::authorization(
            "Editor, Admin, or Owner access required",
        ));
    }
    Ok(())
}

/// Binding changes: editors and dataset operators.
pub fn require_dataset_editor(auth: &AuthUser) -> Result<(), AppError> {
    if !auth.can_bind_targets() {
        return Err(AppError::authorization(
            "Editor or Dataset operator access required",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use starry_core::error::ErrorKind;
    use starry_entity::account::WorkspaceRole;
    use starry_service::RequestContext;
    use uuid::Uuid;

    fn auth(role: WorkspaceRole) -> AuthUser {
        AuthUser(RequestContext::new(Uuid::new_v4(), Uuid::new_v4(), role))
    }

    #[test]
    fn test_role_table() {
        use WorkspaceRole::*;

        for role in [Owner, Admin] {
            assert!(require_admin_or_owner(&auth(role)).is_ok());
        }
        for role in [Editor, Normal, DatasetOperator] {
            let err = require_admin_or_owner(&auth(role)).unwrap_err();
            assert_eq!(err.kind, ErrorKind::Authorization);
        }

        for role in [Owner, Admin, Editor] {
            assert!(require_editor(&auth(role)).is_ok());
        }
        for role in [Normal, DatasetOperator] {
            assert!(require_editor(&auth(role)).is_err());
        }

        for role in [Owner, Admin, Editor, DatasetOperator] {
            assert!(require_dataset_editor(&auth(role)).is_ok());
        }
        assert!(require_dataset_editor(&auth(Normal)).is_err());
    }
}
