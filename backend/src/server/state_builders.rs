//! Builders wiring driven adapters into the HTTP state.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::info;

use farm_backend::domain::ports::{FarmRepository, IdentityStore, ProvinceRepository, RoleRepository};
use farm_backend::domain::{FarmService, ProtectedRoles, RoleService, UserAdminService};
use farm_backend::inbound::http::health::StorageBackend;
use farm_backend::inbound::http::state::HttpState;
use farm_backend::outbound::memory::MemoryStore;
use farm_backend::outbound::persistence::{
    DbPool, DieselFarmRepository, DieselIdentityStore, DieselProvinceRepository,
    DieselRoleRepository,
};

use super::ServerConfig;

/// Driven adapters for one storage backend.
struct Adapters<F, P, R, U> {
    farms: Arc<F>,
    provinces: Arc<P>,
    roles: Arc<R>,
    identities: Arc<U>,
}

fn build_services<F, P, R, U>(
    adapters: Adapters<F, P, R, U>,
    protected: &ProtectedRoles,
    clock: Arc<dyn Clock>,
) -> HttpState
where
    F: FarmRepository + 'static,
    P: ProvinceRepository + 'static,
    R: RoleRepository + 'static,
    U: IdentityStore + 'static,
{
    let Adapters {
        farms,
        provinces,
        roles,
        identities,
    } = adapters;
    HttpState::new(
        Arc::new(FarmService::new(farms, provinces, clock)),
        Arc::new(RoleService::new(
            roles,
            identities.clone(),
            protected.clone(),
        )),
        Arc::new(UserAdminService::new(identities, protected.clone())),
    )
}

fn diesel_state(pool: &DbPool, protected: &ProtectedRoles) -> HttpState {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    build_services(
        Adapters {
            farms: Arc::new(DieselFarmRepository::new(pool.clone())),
            provinces: Arc::new(DieselProvinceRepository::new(pool.clone())),
            roles: Arc::new(DieselRoleRepository::new(pool.clone())),
            identities: Arc::new(DieselIdentityStore::new(pool.clone(), clock.clone())),
        },
        protected,
        clock,
    )
}

/// In-memory state with the protected roles already present.
fn memory_state(protected: &ProtectedRoles) -> std::io::Result<HttpState> {
    let store = Arc::new(MemoryStore::seeded());
    for role in protected.iter() {
        store
            .insert_role(role)
            .map_err(|err| std::io::Error::other(err.to_string()))?;
    }
    info!(
        protected_roles = protected.iter().count(),
        "no database configured; using in-memory store"
    );
    Ok(build_services(
        Adapters {
            farms: store.clone(),
            provinces: store.clone(),
            roles: store.clone(),
            identities: store,
        },
        protected,
        Arc::new(DefaultClock),
    ))
}

/// Storage backend the configuration selects.
pub(crate) fn storage_backend(config: &ServerConfig) -> StorageBackend {
    if config.db_pool.is_some() {
        StorageBackend::Postgres
    } else {
        StorageBackend::Memory
    }
}

/// Build HTTP state from the configured backend.
///
/// # Errors
///
/// Returns an I/O error when the in-memory store cannot be seeded.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let state = match &config.db_pool {
        Some(pool) => diesel_state(pool, &config.protected_roles),
        None => memory_state(&config.protected_roles)?,
    };
    Ok(web::Data::new(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::cookie::Key;
    use rstest::rstest;

    #[rstest]
    #[actix_web::test]
    async fn memory_state_seeds_protected_roles() {
        let protected = ProtectedRoles::parse("Administrator,Auditor");
        let state = memory_state(&protected).expect("memory state");

        let names: Vec<String> = state
            .roles
            .list_roles()
            .await
            .expect("roles")
            .into_iter()
            .map(|role| role.name)
            .collect();
        assert_eq!(names, ["Administrator", "Auditor"]);
    }

    #[rstest]
    fn storage_backend_follows_pool_presence() {
        let config = ServerConfig::new(
            Key::generate(),
            false,
            "127.0.0.1:0".parse().expect("address"),
        );
        assert_eq!(storage_backend(&config), StorageBackend::Memory);
    }
}
