//! Role maintenance domain service.
//!
//! Role membership lives in the identity store, so deletion decisions read the
//! user list from there. Protected roles are refused before any store call.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::domain::ports::{
    IdentityStore, IdentityStoreError, RoleAdministration, RoleDeletion, RoleMembers,
    RoleMembership, RoleRepository, RoleRepositoryError,
};
use crate::domain::{
    Error, Notice, ProtectedRoles, Role, RoleId, UserAccount, UserId, UserSummary,
};

/// Role service implementing the role driving port.
#[derive(Clone)]
pub struct RoleService<R, U> {
    roles: Arc<R>,
    identities: Arc<U>,
    protected: ProtectedRoles,
}

impl<R, U> RoleService<R, U> {
    /// Create a service over the given stores.
    pub fn new(roles: Arc<R>, identities: Arc<U>, protected: ProtectedRoles) -> Self {
        Self {
            roles,
            identities,
            protected,
        }
    }
}

pub(crate) fn map_role_error(error: RoleRepositoryError) -> Error {
    match error {
        RoleRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("role repository unavailable: {message}"))
        }
        RoleRepositoryError::Query { message } => {
            Error::internal(format!("role repository error: {message}"))
        }
    }
}

pub(crate) fn map_identity_error(error: IdentityStoreError) -> Error {
    match error {
        IdentityStoreError::Connection { message } => {
            Error::service_unavailable(format!("identity store unavailable: {message}"))
        }
        IdentityStoreError::UserNotFound { .. } | IdentityStoreError::RoleNotFound { .. } => {
            Error::not_found(error.to_string())
        }
        other => Error::internal(format!("identity store error: {other}")),
    }
}

/// Message of a role store failure, without the adapter prefix.
fn role_store_message(error: &RoleRepositoryError) -> &str {
    match error {
        RoleRepositoryError::Connection { message } | RoleRepositoryError::Query { message } => {
            message
        }
    }
}

/// Message of an identity store failure as shown to administrators.
pub(crate) fn identity_store_message(error: &IdentityStoreError) -> String {
    match error {
        IdentityStoreError::Connection { message } | IdentityStoreError::Query { message } => {
            message.clone()
        }
        other => other.to_string(),
    }
}

impl<R, U> RoleService<R, U>
where
    R: RoleRepository,
    U: IdentityStore,
{
    async fn find_role(&self, id: RoleId) -> Result<Role, Error> {
        self.roles
            .find_by_id(id)
            .await
            .map_err(map_role_error)?
            .ok_or_else(|| Error::not_found(format!("role {id} not found")))
    }

    async fn accounts(&self) -> Result<Vec<UserAccount>, Error> {
        self.identities.list_users().await.map_err(map_identity_error)
    }

    async fn members_of(&self, role_name: &str) -> Result<Vec<UserSummary>, Error> {
        Ok(self
            .accounts()
            .await?
            .iter()
            .filter(|account| account.has_role(role_name))
            .map(|account| UserSummary::from_account(account, &self.protected))
            .collect())
    }

    async fn delete_role(&self, role: &Role) -> RoleDeletion {
        match self.roles.delete_with_memberships(role.id).await {
            Ok(_) => RoleDeletion::Deleted(Notice::success(format!(
                "Role - {} deleted successfully",
                role.name
            ))),
            Err(error) => {
                warn!(%error, role = %role.name, "role deletion failed");
                RoleDeletion::Refused(Notice::danger(format!(
                    "Error deleting role: {}",
                    role_store_message(&error)
                )))
            }
        }
    }

    async fn insert_role(&self, name: &str) -> Result<Notice, RoleRepositoryError> {
        if self.roles.any_name_contains(name).await? {
            return Ok(Notice::danger(format!("Role - {name} already exists")));
        }
        self.roles.insert(name).await?;
        Ok(Notice::success(format!("Role - {name} created successfully")))
    }
}

#[async_trait]
impl<R, U> RoleAdministration for RoleService<R, U>
where
    R: RoleRepository,
    U: IdentityStore,
{
    async fn list_roles(&self) -> Result<Vec<Role>, Error> {
        self.roles.list_by_name().await.map_err(map_role_error)
    }

    async fn create_role(&self, name: &str) -> Notice {
        let name = name.trim();
        if name.is_empty() {
            return Notice::danger("Please enter Role");
        }
        match self.insert_role(name).await {
            Ok(notice) => notice,
            Err(error) => {
                warn!(%error, role = name, "role creation failed");
                Notice::danger(format!(
                    "Error creating Role: {}",
                    role_store_message(&error)
                ))
            }
        }
    }

    async fn request_role_deletion(&self, id: RoleId) -> Result<RoleDeletion, Error> {
        let role = self.find_role(id).await?;
        if self.protected.contains(&role.name) {
            return Ok(RoleDeletion::Refused(Notice::danger(format!(
                "{} role cannot be deleted",
                role.name
            ))));
        }

        let members = self.members_of(&role.name).await?;
        if members.is_empty() {
            return Ok(self.delete_role(&role).await);
        }
        Ok(RoleDeletion::ConfirmationRequired(RoleMembers {
            notice: Notice::info(format!(
                "You have to remove all the user from {} role before deleting it",
                role.name
            )),
            role_name: role.name,
            members,
        }))
    }

    async fn confirm_role_deletion(
        &self,
        role_name: &str,
        remove_all_users: bool,
    ) -> Result<RoleDeletion, Error> {
        if self.protected.contains(role_name) {
            return Ok(RoleDeletion::Refused(Notice::danger(format!(
                "You cannot delete {role_name} role"
            ))));
        }
        let role = self
            .roles
            .find_by_name(role_name)
            .await
            .map_err(map_role_error)?
            .ok_or_else(|| Error::not_found(format!("role {role_name} not found")))?;

        if remove_all_users {
            return Ok(self.delete_role(&role).await);
        }
        let members = self.members_of(&role.name).await?;
        Ok(RoleDeletion::ConfirmationRequired(RoleMembers {
            role_name: role.name,
            members,
            notice: Notice::danger(
                "You have to remove all the users from this role before deleting it",
            ),
        }))
    }

    async fn role_membership(&self, id: RoleId) -> Result<RoleMembership, Error> {
        let role = self.find_role(id).await?;
        let (members, non_members): (Vec<_>, Vec<_>) = self
            .accounts()
            .await?
            .iter()
            .map(|account| {
                (
                    account.has_role(&role.name),
                    UserSummary::from_account(account, &self.protected),
                )
            })
            .partition(|(member, _)| *member);
        Ok(RoleMembership {
            role,
            members: members.into_iter().map(|(_, summary)| summary).collect(),
            non_members: non_members.into_iter().map(|(_, summary)| summary).collect(),
        })
    }

    async fn add_user_to_role(&self, id: RoleId, user: UserId) -> Result<Notice, Error> {
        let role = self.find_role(id).await?;
        match self.identities.add_to_role(user, &role.name).await {
            Ok(()) => Ok(Notice::success(format!(
                "User added to {} Role successfully",
                role.name
            ))),
            Err(error) => {
                warn!(%error, role = %role.name, user = %user, "adding role member failed");
                Ok(Notice::danger(format!(
                    "Error adding user to role: {}",
                    identity_store_message(&error)
                )))
            }
        }
    }

    async fn remove_user_from_role(&self, id: RoleId, user: UserId) -> Result<Notice, Error> {
        let role = self.find_role(id).await?;
        match self.identities.remove_from_role(user, &role.name).await {
            Ok(()) => Ok(Notice::success(format!(
                "User removed from {} Role successfully",
                role.name
            ))),
            Err(error) => {
                warn!(%error, role = %role.name, user = %user, "removing role member failed");
                Ok(Notice::danger(format!(
                    "Error removing user from role: {}",
                    identity_store_message(&error)
                )))
            }
        }
    }
}

#[cfg(test)]
#[path = "role_service_tests.rs"]
mod tests;
