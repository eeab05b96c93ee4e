//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`IdentityStore`]) are implemented by the
//! outbound adapters. Driving ports (`*Administration`) are implemented by
//! the domain services and called by the HTTP adapter.

mod macros;
pub(crate) use macros::define_port_error;

mod farm_administration;
mod farm_repository;
mod identity_store;
mod province_repository;
mod role_administration;
mod role_repository;
mod user_administration;

#[cfg(test)]
pub use farm_administration::MockFarmAdministration;
pub use farm_administration::{FarmAdministration, FarmSubmission, ProvinceVerdict};
#[cfg(test)]
pub use farm_repository::MockFarmRepository;
pub use farm_repository::{FarmRepository, FarmRepositoryError};
#[cfg(test)]
pub use identity_store::MockIdentityStore;
pub use identity_store::{IdentityStore, IdentityStoreError};
#[cfg(test)]
pub use province_repository::MockProvinceRepository;
pub use province_repository::{ProvinceRepository, ProvinceRepositoryError};
#[cfg(test)]
pub use role_administration::MockRoleAdministration;
pub use role_administration::{RoleAdministration, RoleDeletion, RoleMembers, RoleMembership};
#[cfg(test)]
pub use role_repository::MockRoleRepository;
pub use role_repository::{RoleRepository, RoleRepositoryError};
#[cfg(test)]
pub use user_administration::MockUserAdministration;
pub use user_administration::{
    PasswordReset, PasswordResetTicket, UserAdministration, UserDeletion,
};
