//! Driving port for user maintenance.

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Error, Notice, PasswordFailure, PasswordResetForm, UserId, UserSummary};

/// Token issued for a password reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetTicket {
    /// Email of the account being reset.
    pub email: String,
    /// Opaque reset token to submit with the new password.
    pub code: String,
}

/// Outcome of a password reset submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordReset {
    /// The password was replaced.
    Changed(Notice),
    /// The form failed validation.
    Invalid(Vec<PasswordFailure>),
    /// The identity store refused the reset.
    Failed(Notice),
}

/// Outcome of a user deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserDeletion {
    /// The user is gone.
    Deleted(Notice),
    /// The store failed; the user is unchanged.
    Failed {
        /// The user that was to be deleted.
        user: UserSummary,
        /// Danger notice.
        notice: Notice,
    },
}

/// User maintenance use cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserAdministration: Send + Sync {
    /// Users ordered by lockout then user name.
    async fn list_users(&self) -> Result<Vec<UserSummary>, Error>;

    /// Flip the lockout flag of a user.
    async fn toggle_lock(&self, id: UserId) -> Result<Notice, Error>;

    /// Issue a password reset token.
    async fn issue_password_reset(&self, id: UserId) -> Result<PasswordResetTicket, Error>;

    /// Validate the form and consume the token.
    async fn reset_password(
        &self,
        id: UserId,
        form: PasswordResetForm,
    ) -> Result<PasswordReset, Error>;

    /// Summary shown before deleting a user.
    async fn deletion_preview(&self, id: UserId) -> Result<UserSummary, Error>;

    /// Remove the user's memberships and the user.
    async fn delete_user(&self, id: UserId) -> Result<UserDeletion, Error>;
}
