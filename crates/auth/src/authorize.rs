use thiserror::Error;
use tracing::debug;

use crate::{Action, Permission, Resource, Role, User};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("not authenticated")]
    Unauthenticated,

    #[error("forbidden: missing permission '{0}'")]
    Forbidden(Permission),
}

/// The one authorization decision of the console.
///
/// The Route Guard and every screen action ask this function instead of
/// checking roles themselves.
///
/// - No IO
/// - No panics
/// - Anonymous callers get nothing
pub fn can_view(user: Option<&User>, resource: Resource, action: Action) -> bool {
    match user {
        None => false,
        Some(user) => role_allows(user.rol, resource, action),
    }
}

/// [`can_view`] as a `Result`, for call sites that propagate with `?`.
pub fn authorize(user: Option<&User>, resource: Resource, action: Action) -> Result<(), AuthzError> {
    let Some(user) = user else {
        return Err(AuthzError::Unauthenticated);
    };

    if role_allows(user.rol, resource, action) {
        Ok(())
    } else {
        let permission = Permission::new(resource, action);
        debug!(user = %user.id, rol = %user.rol, %permission, "authorization denied");
        Err(AuthzError::Forbidden(permission))
    }
}

/// Every permission a role holds, in declaration order (for `whoami`-style output).
pub fn permissions_for(role: Role) -> Vec<Permission> {
    Resource::ALL
        .iter()
        .flat_map(|&resource| Action::ALL.iter().map(move |&action| Permission::new(resource, action)))
        .filter(|p| role_allows(role, p.resource, p.action))
        .collect()
}

fn role_allows(role: Role, resource: Resource, action: Action) -> bool {
    if role.is_admin() {
        return true;
    }

    // Employees (and roles the client does not know) read the operational
    // views, record their own movements and pull reports.
    matches!(
        (resource, action),
        (Resource::Dashboard, Action::View)
            | (Resource::Products, Action::View)
            | (Resource::Stock, Action::View)
            | (Resource::Movements, Action::View)
            | (Resource::Movements, Action::Create)
            | (Resource::Reports, Action::Download)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use inventario_core::UserId;

    fn user(rol: Role) -> User {
        User {
            id: UserId::new(1),
            nombre: "Test".to_string(),
            email: "test@example.com".to_string(),
            rol,
            activo: true,
            fecha_creacion: None,
            fecha_ultima_sesion: None,
        }
    }

    #[test]
    fn anonymous_is_denied_everything() {
        for resource in Resource::ALL {
            for action in Action::ALL {
                assert!(!can_view(None, resource, action));
            }
        }
        assert_eq!(authorize(None, Resource::Dashboard, Action::View), Err(AuthzError::Unauthenticated));
    }

    #[test]
    fn admin_is_allowed_everything() {
        let admin = user(Role::Admin);
        assert_eq!(permissions_for(Role::Admin).len(), Resource::ALL.len() * Action::ALL.len());
        assert!(can_view(Some(&admin), Resource::Users, Action::Restore));
        assert!(can_view(Some(&admin), Resource::Movements, Action::ViewAll));
    }

    #[test]
    fn employee_reads_operational_views_only() {
        let emp = user(Role::Empleado);
        assert!(can_view(Some(&emp), Resource::Products, Action::View));
        assert!(can_view(Some(&emp), Resource::Movements, Action::Create));
        assert!(can_view(Some(&emp), Resource::Reports, Action::Download));

        assert!(!can_view(Some(&emp), Resource::Products, Action::Create));
        assert!(!can_view(Some(&emp), Resource::Products, Action::ViewDeleted));
        assert!(!can_view(Some(&emp), Resource::Warehouses, Action::View));
        assert!(!can_view(Some(&emp), Resource::Users, Action::View));
        assert!(!can_view(Some(&emp), Resource::Movements, Action::ViewAll));
        assert!(!can_view(Some(&emp), Resource::Movements, Action::Update));
    }

    #[test]
    fn forbidden_error_names_the_permission() {
        let emp = user(Role::Empleado);
        let err = authorize(Some(&emp), Resource::Categories, Action::Restore).unwrap_err();
        assert_eq!(err.to_string(), "forbidden: missing permission 'categories.restore'");
    }

    #[test]
    fn unknown_role_is_no_stronger_than_employee() {
        assert_eq!(permissions_for(Role::Unknown), permissions_for(Role::Empleado));
    }
}
