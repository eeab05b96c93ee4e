//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on driving ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{FarmAdministration, RoleAdministration, UserAdministration};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Farm maintenance and province checks.
    pub farms: Arc<dyn FarmAdministration>,
    /// Role and membership maintenance.
    pub roles: Arc<dyn RoleAdministration>,
    /// User account maintenance.
    pub users: Arc<dyn UserAdministration>,
}

impl HttpState {
    /// Construct state from the three maintenance ports.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use farm_backend::domain::{FarmService, ProtectedRoles, RoleService, UserAdminService};
    /// use farm_backend::inbound::http::state::HttpState;
    /// use farm_backend::outbound::memory::MemoryStore;
    /// use mockable::DefaultClock;
    ///
    /// let store = Arc::new(MemoryStore::seeded());
    /// let protected = ProtectedRoles::default();
    /// let state = HttpState::new(
    ///     Arc::new(FarmService::new(store.clone(), store.clone(), Arc::new(DefaultClock))),
    ///     Arc::new(RoleService::new(store.clone(), store.clone(), protected.clone())),
    ///     Arc::new(UserAdminService::new(store, protected)),
    /// );
    /// let _farms = state.farms.clone();
    /// ```
    pub fn new(
        farms: Arc<dyn FarmAdministration>,
        roles: Arc<dyn RoleAdministration>,
        users: Arc<dyn UserAdministration>,
    ) -> Self {
        Self {
            farms,
            roles,
            users,
        }
    }
}
