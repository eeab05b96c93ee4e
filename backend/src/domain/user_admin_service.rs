//! User maintenance domain service.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::domain::ports::{
    IdentityStore, PasswordReset, PasswordResetTicket, UserAdministration, UserDeletion,
};
use crate::domain::role_service::{identity_store_message, map_identity_error};
use crate::domain::{
    Error, Notice, PasswordResetForm, ProtectedRoles, UserAccount, UserId, UserSummary,
    sort_summaries,
};

/// User service implementing the user driving port.
#[derive(Clone)]
pub struct UserAdminService<U> {
    identities: Arc<U>,
    protected: ProtectedRoles,
}

impl<U> UserAdminService<U> {
    /// Create a service over the given identity store.
    pub fn new(identities: Arc<U>, protected: ProtectedRoles) -> Self {
        Self {
            identities,
            protected,
        }
    }
}

impl<U> UserAdminService<U>
where
    U: IdentityStore,
{
    async fn find_account(&self, id: UserId) -> Result<UserAccount, Error> {
        self.identities
            .find_by_id(id)
            .await
            .map_err(map_identity_error)?
            .ok_or_else(|| Error::not_found(format!("user {id} not found")))
    }
}

#[async_trait]
impl<U> UserAdministration for UserAdminService<U>
where
    U: IdentityStore,
{
    async fn list_users(&self) -> Result<Vec<UserSummary>, Error> {
        let mut summaries: Vec<UserSummary> = self
            .identities
            .list_users()
            .await
            .map_err(map_identity_error)?
            .iter()
            .map(|account| UserSummary::from_account(account, &self.protected))
            .collect();
        sort_summaries(&mut summaries);
        Ok(summaries)
    }

    async fn toggle_lock(&self, id: UserId) -> Result<Notice, Error> {
        let account = self.find_account(id).await?;
        let locking = !account.lockout_enabled;
        match self.identities.set_lockout_enabled(id, locking).await {
            Ok(()) => {
                let state = if locking { "locked" } else { "unlocked" };
                Ok(Notice::success(format!(
                    "User - {} {state} successfully",
                    account.user_name
                )))
            }
            Err(error) => {
                warn!(%error, user = %id, locking, "lockout toggle failed");
                let action = if locking { "locking" } else { "unlocking" };
                Ok(Notice::danger(format!(
                    "Error {action} user: {}",
                    identity_store_message(&error)
                )))
            }
        }
    }

    async fn issue_password_reset(&self, id: UserId) -> Result<PasswordResetTicket, Error> {
        let account = self.find_account(id).await?;
        let code = self
            .identities
            .generate_password_reset_token(id)
            .await
            .map_err(map_identity_error)?;
        Ok(PasswordResetTicket {
            email: account.email,
            code,
        })
    }

    async fn reset_password(
        &self,
        id: UserId,
        form: PasswordResetForm,
    ) -> Result<PasswordReset, Error> {
        let account = self.find_account(id).await?;
        let failures = form.validate();
        if !failures.is_empty() {
            return Ok(PasswordReset::Invalid(failures));
        }
        match self
            .identities
            .reset_password(id, form.code.trim(), &form.password)
            .await
        {
            Ok(()) => Ok(PasswordReset::Changed(Notice::success(format!(
                "Password for - {} changed successfully",
                account.user_name
            )))),
            Err(error) => {
                warn!(%error, user = %id, "password reset failed");
                Ok(PasswordReset::Failed(Notice::danger(format!(
                    "Error changing password for - {} {}",
                    account.user_name,
                    identity_store_message(&error)
                ))))
            }
        }
    }

    async fn deletion_preview(&self, id: UserId) -> Result<UserSummary, Error> {
        let account = self.find_account(id).await?;
        Ok(UserSummary::from_account(&account, &self.protected))
    }

    async fn delete_user(&self, id: UserId) -> Result<UserDeletion, Error> {
        let account = self.find_account(id).await?;
        match self.identities.delete_user_with_memberships(id).await {
            Ok(_) => Ok(UserDeletion::Deleted(Notice::success(format!(
                "User - {} deleted successfully",
                account.email
            )))),
            Err(error) => {
                warn!(%error, user = %id, "user deletion failed");
                Ok(UserDeletion::Failed {
                    user: UserSummary::from_account(&account, &self.protected),
                    notice: Notice::danger(format!(
                        "Error deleting User: {}",
                        identity_store_message(&error)
                    )),
                })
            }
        }
    }
}

#[cfg(test)]
#[path = "user_admin_service_tests.rs"]
mod tests;
