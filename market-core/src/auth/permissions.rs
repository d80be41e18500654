//! Permission Definitions
//!
//! Role-based permission matrix for the four account roles. Every mutating
//! entry point in the services consults [`authorize`]; the matrix lives only
//! here so it can be tested in isolation.

use shared::error::{AppError, AppResult};
use shared::models::Role;
use std::fmt;

/// Operations gated by role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// Create/update/delete catalog products
    ManageCatalog,
    /// Transition order status, list all orders
    ManageOrders,
    /// Delete accounts, change roles
    ManageAccounts,
}

impl Permission {
    /// Get the string name for this permission
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ManageCatalog => "catalog:manage",
            Self::ManageOrders => "orders:manage",
            Self::ManageAccounts => "accounts:manage",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Admin role permissions (everything)
const ADMIN_PERMISSIONS: &[Permission] = &[
    Permission::ManageCatalog,
    Permission::ManageOrders,
    Permission::ManageAccounts,
];

/// Manager role permissions
const MANAGER_PERMISSIONS: &[Permission] = &[Permission::ManageCatalog, Permission::ManageOrders];

/// Seller role permissions
const SELLER_PERMISSIONS: &[Permission] = &[Permission::ManageCatalog];

/// Customer role permissions (browse, cart, checkout, bid - none of which
/// are role-gated)
const CUSTOMER_PERMISSIONS: &[Permission] = &[];

/// Get the permission set for a role
pub fn role_permissions(role: Role) -> &'static [Permission] {
    match role {
        Role::Admin => ADMIN_PERMISSIONS,
        Role::Manager => MANAGER_PERMISSIONS,
        Role::Seller => SELLER_PERMISSIONS,
        Role::Customer => CUSTOMER_PERMISSIONS,
    }
}

/// Check whether a role holds a permission
pub fn has_permission(role: Role, permission: Permission) -> bool {
    role_permissions(role).contains(&permission)
}

/// The authorization gate
///
/// Returns `PermissionDenied` before any state is touched; callers invoke
/// this first in every mutating operation.
pub fn authorize(role: Role, permission: Permission) -> AppResult<()> {
    if has_permission(role, permission) {
        return Ok(());
    }
    tracing::warn!(role = %role, permission = %permission, "Permission denied");
    Err(
        AppError::forbidden(format!("Role '{}' may not perform {}", role, permission))
            .with_detail("role", role.as_str())
            .with_detail("permission", permission.as_str()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::error::ErrorCode;

    #[test]
    fn test_admin_holds_everything() {
        for permission in [
            Permission::ManageCatalog,
            Permission::ManageOrders,
            Permission::ManageAccounts,
        ] {
            assert!(has_permission(Role::Admin, permission));
        }
    }

    #[test]
    fn test_permission_matrix() {
        assert!(has_permission(Role::Manager, Permission::ManageCatalog));
        assert!(has_permission(Role::Manager, Permission::ManageOrders));
        assert!(!has_permission(Role::Manager, Permission::ManageAccounts));

        assert!(has_permission(Role::Seller, Permission::ManageCatalog));
        assert!(!has_permission(Role::Seller, Permission::ManageOrders));
        assert!(!has_permission(Role::Seller, Permission::ManageAccounts));

        assert!(!has_permission(Role::Customer, Permission::ManageCatalog));
        assert!(!has_permission(Role::Customer, Permission::ManageOrders));
        assert!(!has_permission(Role::Customer, Permission::ManageAccounts));
    }

    #[test]
    fn test_authorize_denies_with_typed_error() {
        let err = authorize(Role::Customer, Permission::ManageCatalog).unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);
        let details = err.details.unwrap();
        assert_eq!(details.get("role").unwrap(), "customer");
        assert_eq!(details.get("permission").unwrap(), "catalog:manage");
    }

    #[test]
    fn test_authorize_allows() {
        assert!(authorize(Role::Seller, Permission::ManageCatalog).is_ok());
        assert!(authorize(Role::Admin, Permission::ManageAccounts).is_ok());
    }
}
