//! Session type handed to the presentation layer
//!
//! A session is created by `CoreState::login` after authentication and owns
//! exactly one cart for its lifetime. Sessions are confined to their caller;
//! the core never shares them across threads.

use shared::models::{Account, Cart, Role};
use uuid::Uuid;

/// An authenticated session with its cart
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    account: Account,
    cart: Cart,
}

impl Session {
    /// Create a fresh session for an authenticated account
    pub fn new(account: Account) -> Self {
        let id = Uuid::new_v4();
        tracing::debug!(session_id = %id, username = %account.username, "Session opened");
        Self {
            id,
            account,
            cart: Cart::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn username(&self) -> &str {
        &self.account.username
    }

    pub fn role(&self) -> Role {
        self.account.role
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn cart_mut(&mut self) -> &mut Cart {
        &mut self.cart
    }

    /// Replace the account after an update (e.g. display name change)
    pub fn refresh_account(&mut self, account: Account) {
        self.account = account;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_account() -> Account {
        Account {
            username: "bob".into(),
            secret: "pw".into(),
            role: Role::Customer,
            display_name: "Bob".into(),
            is_protected: false,
            created_at: 0,
        }
    }

    #[test]
    fn test_new_session_has_empty_cart() {
        let session = Session::new(test_account());
        assert!(session.cart().is_empty());
        assert_eq!(session.username(), "bob");
        assert_eq!(session.role(), Role::Customer);
    }

    #[test]
    fn test_sessions_get_distinct_ids() {
        let a = Session::new(test_account());
        let b = Session::new(test_account());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_cart_is_mutable_through_session() {
        let mut session = Session::new(test_account());
        session.cart_mut().add_line(1, 2).unwrap();
        assert_eq!(session.cart().len(), 1);
    }
}
