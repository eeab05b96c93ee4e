//! Port abstraction for the identity store holding user accounts.
//!
//! The store owns password hashing and reset tokens; callers only ever see
//! opaque token strings.

use async_trait::async_trait;

use crate::domain::{UserAccount, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by identity store adapters.
    pub enum IdentityStoreError {
        /// Store connection could not be established.
        Connection { message: String } => "identity store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "identity store query failed: {message}",
        /// No user has the given identifier.
        UserNotFound { id: String } => "user {id} not found",
        /// No role has the given name.
        RoleNotFound { name: String } => "role {name} does not exist",
        /// The user already holds the role.
        AlreadyInRole { role: String } => "User already in role {role}.",
        /// The user does not hold the role.
        NotInRole { role: String } => "User is not in role {role}.",
        /// The reset token is unknown, expired or issued for another user.
        InvalidToken => "Invalid token.",
        /// The new password could not be hashed.
        PasswordHash { message: String } => "password hashing failed: {message}",
    }
}

/// Account storage and credential operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Every account with its role names and external logins.
    async fn list_users(&self) -> Result<Vec<UserAccount>, IdentityStoreError>;

    /// Fetch one account.
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserAccount>, IdentityStoreError>;

    /// Grant `role` to the user.
    async fn add_to_role(&self, id: UserId, role: &str) -> Result<(), IdentityStoreError>;

    /// Revoke `role` from the user.
    async fn remove_from_role(&self, id: UserId, role: &str) -> Result<(), IdentityStoreError>;

    /// Set the lockout flag and clear any lockout end.
    async fn set_lockout_enabled(&self, id: UserId, enabled: bool)
    -> Result<(), IdentityStoreError>;

    /// Issue a single-use password reset token bound to the user.
    async fn generate_password_reset_token(&self, id: UserId)
    -> Result<String, IdentityStoreError>;

    /// Consume `token` and replace the user's password.
    async fn reset_password(
        &self,
        id: UserId,
        token: &str,
        new_password: &str,
    ) -> Result<(), IdentityStoreError>;

    /// Remove every role membership of the user, then the user, in one
    /// transaction.
    ///
    /// Returns `false` when the user does not exist.
    async fn delete_user_with_memberships(&self, id: UserId) -> Result<bool, IdentityStoreError>;
}
