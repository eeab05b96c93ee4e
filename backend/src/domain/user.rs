//! User accounts as seen by the maintenance screens.
//!
//! [`UserAccount`] mirrors what the identity store holds. [`UserSummary`] is
//! the derived view (lockout, administrator and local-login flags) that is
//! recomputed on every read and never persisted.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::ProtectedRoles;

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Wrap an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Identity-store account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    /// Account identifier.
    pub id: UserId,
    /// Email address.
    pub email: String,
    /// Login name.
    pub user_name: String,
    /// Lockout flag.
    pub lockout_enabled: bool,
    /// End of a timed lockout, if one is running.
    pub lockout_end: Option<DateTime<Utc>>,
    /// Names of external login providers linked to the account.
    pub external_logins: Vec<String>,
    /// Names of roles the account holds.
    pub roles: Vec<String>,
}

impl UserAccount {
    /// Whether the account holds `role`.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|held| held == role)
    }
}

/// User row for listings and confirmation views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    /// Account identifier.
    #[schema(value_type = String, format = Uuid)]
    pub user_id: UserId,
    /// Email address.
    pub email: String,
    /// Login name.
    pub user_name: String,
    /// Whether the account is locked.
    pub is_locked_out: bool,
    /// Whether the account signs in with a local password only.
    pub is_authorized_locally: bool,
    /// Whether the account holds the administrator role.
    pub is_admin: bool,
    /// Role names held.
    pub roles: Vec<String>,
}

impl UserSummary {
    /// Derive the summary of `account`.
    pub fn from_account(account: &UserAccount, protected: &ProtectedRoles) -> Self {
        let is_admin = protected
            .admin_role()
            .is_some_and(|admin| account.has_role(admin));
        Self {
            user_id: account.id,
            email: account.email.clone(),
            user_name: account.user_name.clone(),
            is_locked_out: account.lockout_enabled,
            is_authorized_locally: account.external_logins.is_empty(),
            is_admin,
            roles: account.roles.clone(),
        }
    }
}

/// Order summaries: unlocked accounts first, then by user name.
pub fn sort_summaries(summaries: &mut [UserSummary]) {
    summaries.sort_by(|left, right| {
        left.is_locked_out
            .cmp(&right.is_locked_out)
            .then_with(|| left.user_name.cmp(&right.user_name))
    });
}

/// Minimum password length accepted by the reset form.
pub const PASSWORD_MIN: usize = 6;
/// Maximum password length accepted by the reset form.
pub const PASSWORD_MAX: usize = 100;

/// Password-reset form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PasswordResetForm {
    /// Reset token previously issued for the user.
    pub code: String,
    /// New password.
    pub password: String,
    /// Confirmation of the new password.
    pub confirm_password: String,
}

/// Fields of the password-reset form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum PasswordField {
    /// Reset token.
    Code,
    /// New password.
    Password,
    /// Confirmation.
    ConfirmPassword,
}

/// Failure reported by [`PasswordResetForm::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PasswordFailure {
    /// Offending field.
    pub field: PasswordField,
    /// Explanation.
    pub message: String,
}

impl PasswordFailure {
    fn new(field: PasswordField, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl PasswordResetForm {
    /// Check the form before the token is consumed.
    ///
    /// # Examples
    /// ```
    /// use farm_backend::domain::PasswordResetForm;
    ///
    /// let form = PasswordResetForm {
    ///     code: "token".into(),
    ///     password: "secret1".into(),
    ///     confirm_password: "secret2".into(),
    /// };
    /// let failures = form.validate();
    /// assert_eq!(
    ///     failures[0].message,
    ///     "The password and confirmation password do not match."
    /// );
    /// ```
    pub fn validate(&self) -> Vec<PasswordFailure> {
        let mut failures = Vec::new();
        if self.code.trim().is_empty() {
            failures.push(PasswordFailure::new(
                PasswordField::Code,
                "The Code field is required.",
            ));
        }

        let length = self.password.chars().count();
        if length == 0 {
            failures.push(PasswordFailure::new(
                PasswordField::Password,
                "The Password field is required.",
            ));
        } else if !(PASSWORD_MIN..=PASSWORD_MAX).contains(&length) {
            failures.push(PasswordFailure::new(
                PasswordField::Password,
                format!(
                    "The Password must be at least {PASSWORD_MIN} characters long."
                ),
            ));
        }

        if self.password != self.confirm_password {
            failures.push(PasswordFailure::new(
                PasswordField::ConfirmPassword,
                "The password and confirmation password do not match.",
            ));
        }
        failures
    }
}

#[cfg(test)]
mod tests;
