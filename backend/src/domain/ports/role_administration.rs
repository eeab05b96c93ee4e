//! Driving port for role maintenance.

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Error, Notice, Role, RoleId, UserId, UserSummary};

/// Members of a role awaiting deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleMembers {
    /// Role name.
    pub role_name: String,
    /// Users holding the role.
    pub members: Vec<UserSummary>,
    /// Notice explaining what is required.
    pub notice: Notice,
}

/// Outcome of a role deletion request or confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleDeletion {
    /// The role is gone.
    Deleted(Notice),
    /// The role was kept; the notice explains why.
    Refused(Notice),
    /// The role has members; the administrator must confirm their removal.
    ConfirmationRequired(RoleMembers),
}

/// Users split by whether they hold a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleMembership {
    /// The role.
    pub role: Role,
    /// Users holding it.
    pub members: Vec<UserSummary>,
    /// Users that could be added.
    pub non_members: Vec<UserSummary>,
}

/// Role maintenance use cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoleAdministration: Send + Sync {
    /// Roles ordered by name.
    async fn list_roles(&self) -> Result<Vec<Role>, Error>;

    /// Create a role from a submitted name.
    async fn create_role(&self, name: &str) -> Notice;

    /// Delete a role by id, asking for confirmation when it has members.
    async fn request_role_deletion(&self, id: RoleId) -> Result<RoleDeletion, Error>;

    /// Delete a role by name once the administrator has answered the
    /// confirmation.
    async fn confirm_role_deletion(
        &self,
        role_name: &str,
        remove_all_users: bool,
    ) -> Result<RoleDeletion, Error>;

    /// Users inside and outside the role.
    async fn role_membership(&self, id: RoleId) -> Result<RoleMembership, Error>;

    /// Grant the role to a user.
    async fn add_user_to_role(&self, id: RoleId, user: UserId) -> Result<Notice, Error>;

    /// Revoke the role from a user.
    async fn remove_user_from_role(&self, id: RoleId, user: UserId) -> Result<Notice, Error>;
}
