//! Identity Service - account registration, authentication, administration
//!
//! Owns the Account table. Authentication deliberately returns one uniform
//! `InvalidCredentials` error for unknown usernames and wrong secrets alike,
//! so callers cannot enumerate registered usernames.

use crate::auth::{Permission, authorize};
use crate::db::{BackingStore, StoreError, WriteOp, with_timeout};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Account, AccountCreate, AccountResponse, AccountUpdate, Role};
use std::sync::Arc;
use std::time::Duration;

/// Default seed accounts: (username, secret, role)
const SEED_ACCOUNTS: &[(&str, &str, Role)] = &[
    ("admin", "admin123", Role::Admin),
    ("manager", "manager123", Role::Manager),
];

/// Account store and authenticator
#[derive(Clone)]
pub struct IdentityService {
    store: Arc<dyn BackingStore>,
    timeout: Duration,
}

impl std::fmt::Debug for IdentityService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityService")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl IdentityService {
    pub fn new(store: Arc<dyn BackingStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Create the protected admin/manager accounts when absent
    pub async fn seed_defaults(&self) -> AppResult<()> {
        for (username, secret, role) in SEED_ACCOUNTS {
            let existing = with_timeout(self.timeout, self.store.get_account(username)).await?;
            if existing.is_some() {
                continue;
            }
            let account = Account {
                username: (*username).to_string(),
                secret: (*secret).to_string(),
                role: *role,
                display_name: (*username).to_string(),
                is_protected: true,
                created_at: chrono::Utc::now().timestamp_millis(),
            };
            with_timeout(
                self.timeout,
                self.store.apply(vec![WriteOp::InsertAccount(account)]),
            )
            .await?;
            tracing::info!(username = username, role = %role, "Seeded protected account");
        }
        Ok(())
    }

    /// Register a new account
    pub async fn register(&self, data: AccountCreate) -> AppResult<AccountResponse> {
        let username = data.username.trim();
        if username.is_empty() {
            return Err(AppError::validation("Username must not be empty"));
        }
        if data.secret.is_empty() {
            return Err(AppError::validation("Secret must not be empty"));
        }

        let existing = with_timeout(self.timeout, self.store.get_account(username)).await?;
        if existing.is_some() {
            return Err(AppError::new(ErrorCode::UsernameExists).with_detail("username", username));
        }

        let display_name = if data.display_name.trim().is_empty() {
            username.to_string()
        } else {
            data.display_name
        };
        let account = Account {
            username: username.to_string(),
            secret: data.secret,
            role: data.role,
            display_name,
            is_protected: false,
            created_at: chrono::Utc::now().timestamp_millis(),
        };

        let insert = self.store.apply(vec![WriteOp::InsertAccount(account.clone())]);
        match with_timeout(self.timeout, insert).await {
            Ok(()) => {}
            // Lost a registration race; present it as the duplicate it is
            Err(StoreError::Constraint(_)) => {
                return Err(
                    AppError::new(ErrorCode::UsernameExists).with_detail("username", username)
                );
            }
            Err(err) => return Err(err.into()),
        }

        tracing::info!(username = %account.username, role = %account.role, "Account registered");
        Ok(account.to_response())
    }

    /// Authenticate a username/secret pair
    ///
    /// Unknown user and wrong secret return the same error.
    pub async fn authenticate(&self, username: &str, secret: &str) -> AppResult<Account> {
        let account = with_timeout(self.timeout, self.store.get_account(username)).await?;
        match account {
            Some(account) if account.secret == secret => Ok(account),
            _ => {
                tracing::warn!(username = username, "Authentication failed");
                Err(AppError::invalid_credentials())
            }
        }
    }

    /// Update an account's secret, display name, or role
    ///
    /// Secret and display name may be changed by the account itself or an
    /// admin; role only by an admin, and never on a protected account.
    pub async fn update_account(
        &self,
        actor: &Account,
        target_username: &str,
        changes: AccountUpdate,
    ) -> AppResult<AccountResponse> {
        let mut target = with_timeout(self.timeout, self.store.get_account(target_username))
            .await?
            .ok_or_else(|| {
                AppError::new(ErrorCode::AccountNotFound).with_detail("username", target_username)
            })?;

        let is_self = actor.username == target.username;
        let is_admin = actor.role == Role::Admin;

        if (changes.secret.is_some() || changes.display_name.is_some()) && !is_self && !is_admin {
            return Err(AppError::forbidden(
                "Only the account itself or an admin may change credentials",
            ));
        }
        if let Some(role) = changes.role {
            authorize(actor.role, Permission::ManageAccounts)?;
            if target.is_protected && role != target.role {
                return Err(AppError::new(ErrorCode::AccountProtected)
                    .with_detail("username", target.username.clone()));
            }
            target.role = role;
        }
        if let Some(secret) = changes.secret {
            if secret.is_empty() {
                return Err(AppError::validation("Secret must not be empty"));
            }
            target.secret = secret;
        }
        if let Some(display_name) = changes.display_name {
            target.display_name = display_name;
        }

        with_timeout(
            self.timeout,
            self.store.apply(vec![WriteOp::UpdateAccount(target.clone())]),
        )
        .await?;
        tracing::info!(username = %target.username, actor = %actor.username, "Account updated");
        Ok(target.to_response())
    }

    /// Delete an account
    ///
    /// Requires account administration; protected seed accounts and the
    /// acting account itself are never deletable.
    pub async fn delete_account(&self, actor: &Account, target_username: &str) -> AppResult<()> {
        authorize(actor.role, Permission::ManageAccounts)?;

        if actor.username == target_username {
            return Err(AppError::new(ErrorCode::CannotDeleteSelf));
        }
        let target = with_timeout(self.timeout, self.store.get_account(target_username))
            .await?
            .ok_or_else(|| {
                AppError::new(ErrorCode::AccountNotFound).with_detail("username", target_username)
            })?;
        if target.is_protected {
            return Err(AppError::new(ErrorCode::AccountProtected)
                .with_detail("username", target_username));
        }

        with_timeout(
            self.timeout,
            self.store
                .apply(vec![WriteOp::DeleteAccount(target_username.to_string())]),
        )
        .await?;
        tracing::info!(username = target_username, actor = %actor.username, "Account deleted");
        Ok(())
    }

    /// List all accounts (admin only), secrets stripped
    pub async fn list_accounts(&self, actor_role: Role) -> AppResult<Vec<AccountResponse>> {
        authorize(actor_role, Permission::ManageAccounts)?;
        let accounts = with_timeout(self.timeout, self.store.list_accounts()).await?;
        Ok(accounts.iter().map(Account::to_response).collect())
    }
}
