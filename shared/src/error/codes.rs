//! Unified error codes for the marketplace core
//!
//! This module defines all error codes used across the core and the
//! presentation layer. Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Account errors
//! - 4xxx: Order errors
//! - 5xxx: Auction errors
//! - 6xxx: Product errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (username/password)
    InvalidCredentials = 1002,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Admin role required
    AdminRequired = 2002,

    // ==================== 3xxx: Account ====================
    /// Account not found
    AccountNotFound = 3001,
    /// Username already registered
    UsernameExists = 3002,
    /// Cannot modify/delete protected account
    AccountProtected = 3003,
    /// Cannot delete own account
    CannotDeleteSelf = 3004,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Cart has no lines to commit
    OrderEmpty = 4002,
    /// Order status transition not allowed
    InvalidStatusTransition = 4003,

    // ==================== 5xxx: Auction ====================
    /// Product is not an auction item
    NotAuctionItem = 5001,
    /// Bid does not exceed the current bid
    BidTooLow = 5002,

    // ==================== 6xxx: Product ====================
    /// Product not found
    ProductNotFound = 6001,
    /// Product has invalid price
    ProductInvalidPrice = 6002,
    /// Product has invalid stock
    ProductInvalidStock = 6003,
    /// Not enough stock for the requested quantity
    InsufficientStock = 6004,
    /// Product is referenced by a persisted order
    ProductReferencedByOrder = 6005,
    /// Cart line quantity must be at least 1
    InvalidQuantity = 6006,

    // ==================== 9xxx: System ====================
    /// Internal error
    InternalError = 9001,
    /// Backing store error
    StorageError = 9002,
    /// Backing store unavailable
    StorageUnavailable = 9003,
    /// Backing store operation timed out
    StorageTimeout = 9004,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid username or password",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::AdminRequired => "Administrator role is required",

            // Account
            ErrorCode::AccountNotFound => "Account not found",
            ErrorCode::UsernameExists => "Username is already registered",
            ErrorCode::AccountProtected => "Cannot modify protected account",
            ErrorCode::CannotDeleteSelf => "Cannot delete own account",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderEmpty => "Cart has no lines to commit",
            ErrorCode::InvalidStatusTransition => "Order status transition not allowed",

            // Auction
            ErrorCode::NotAuctionItem => "Product is not an auction item",
            ErrorCode::BidTooLow => "Bid must exceed the current bid",

            // Product
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::ProductInvalidPrice => "Product price must not be negative",
            ErrorCode::ProductInvalidStock => "Product stock must not be negative",
            ErrorCode::InsufficientStock => "Not enough stock for the requested quantity",
            ErrorCode::ProductReferencedByOrder => "Product is referenced by a persisted order",
            ErrorCode::InvalidQuantity => "Quantity must be at least 1",

            // System
            ErrorCode::InternalError => "Internal error",
            ErrorCode::StorageError => "Backing store error",
            ErrorCode::StorageUnavailable => "Backing store is unavailable",
            ErrorCode::StorageTimeout => "Backing store operation timed out",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::AdminRequired),

            // Account
            3001 => Ok(ErrorCode::AccountNotFound),
            3002 => Ok(ErrorCode::UsernameExists),
            3003 => Ok(ErrorCode::AccountProtected),
            3004 => Ok(ErrorCode::CannotDeleteSelf),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderEmpty),
            4003 => Ok(ErrorCode::InvalidStatusTransition),

            // Auction
            5001 => Ok(ErrorCode::NotAuctionItem),
            5002 => Ok(ErrorCode::BidTooLow),

            // Product
            6001 => Ok(ErrorCode::ProductNotFound),
            6002 => Ok(ErrorCode::ProductInvalidPrice),
            6003 => Ok(ErrorCode::ProductInvalidStock),
            6004 => Ok(ErrorCode::InsufficientStock),
            6005 => Ok(ErrorCode::ProductReferencedByOrder),
            6006 => Ok(ErrorCode::InvalidQuantity),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::StorageError),
            9003 => Ok(ErrorCode::StorageUnavailable),
            9004 => Ok(ErrorCode::StorageTimeout),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
