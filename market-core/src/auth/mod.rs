//! Authorization and sessions
//!
//! The single place the (role, operation) permission matrix is defined.

mod permissions;
mod session;

pub use permissions::{Permission, authorize, has_permission, role_permissions};
pub use session::Session;
