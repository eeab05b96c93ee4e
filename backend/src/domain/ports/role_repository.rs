//! Port abstraction for role persistence.

use async_trait::async_trait;

use crate::domain::{Role, RoleId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by role repository adapters.
    pub enum RoleRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "role repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "role repository query failed: {message}",
    }
}

/// Storage for roles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// All roles ordered by name.
    async fn list_by_name(&self) -> Result<Vec<Role>, RoleRepositoryError>;

    /// Fetch a role by identifier.
    async fn find_by_id(&self, id: RoleId) -> Result<Option<Role>, RoleRepositoryError>;

    /// Fetch a role by exact name.
    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, RoleRepositoryError>;

    /// Whether any existing role name contains `fragment`, case-sensitively.
    async fn any_name_contains(&self, fragment: &str) -> Result<bool, RoleRepositoryError>;

    /// Insert a role with a fresh identifier.
    async fn insert(&self, name: &str) -> Result<Role, RoleRepositoryError>;

    /// Remove every membership of the role, then the role itself, in one
    /// transaction.
    ///
    /// Returns `false` when the role does not exist.
    async fn delete_with_memberships(&self, id: RoleId) -> Result<bool, RoleRepositoryError>;
}
