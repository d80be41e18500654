//! Account Model

use serde::{Deserialize, Serialize};
use std::fmt;

/// Permission level attached to every account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Manager,
    Seller,
    Customer,
}

impl Role {
    /// Get the string name for this role
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Seller => "seller",
            Self::Customer => "customer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Account entity
///
/// The username is the unique key. The secret is stored as provided by the
/// caller (credential hashing is owned by the presentation layer, if at all).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub username: String,
    pub secret: String,
    pub role: Role,
    pub display_name: String,
    /// Seed accounts (admin/manager) cannot be deleted or demoted
    pub is_protected: bool,
    /// Creation timestamp (epoch millis)
    pub created_at: i64,
}

impl Account {
    /// Strip the secret for handing the account across the presentation boundary
    pub fn to_response(&self) -> AccountResponse {
        AccountResponse {
            username: self.username.clone(),
            role: self.role,
            display_name: self.display_name.clone(),
            is_protected: self.is_protected,
        }
    }
}

/// Account response (without secret)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountResponse {
    pub username: String,
    pub role: Role,
    pub display_name: String,
    pub is_protected: bool,
}

/// Create account payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountCreate {
    pub username: String,
    pub secret: String,
    pub role: Role,
    pub display_name: String,
}

/// Update account payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountUpdate {
    pub secret: Option<String>,
    pub display_name: Option<String>,
    pub role: Option<Role>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_as_str() {
        assert_eq!(Role::Admin.as_str(), "admin");
        assert_eq!(Role::Customer.to_string(), "customer");
    }

    #[test]
    fn test_role_serde_snake_case() {
        assert_eq!(serde_json::to_string(&Role::Seller).unwrap(), "\"seller\"");
        let role: Role = serde_json::from_str("\"manager\"").unwrap();
        assert_eq!(role, Role::Manager);
    }

    #[test]
    fn test_response_has_no_secret() {
        let account = Account {
            username: "alice".into(),
            secret: "s3cret".into(),
            role: Role::Customer,
            display_name: "Alice".into(),
            is_protected: false,
            created_at: 0,
        };
        let json = serde_json::to_string(&account.to_response()).unwrap();
        assert!(!json.contains("s3cret"));
        assert!(json.contains("alice"));
    }
}
