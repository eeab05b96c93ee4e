//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repositories here implement the driven ports over `diesel-async` with a
//! `bb8` pool. Row structs (`models.rs`) and table definitions
//! (`schema.rs`) stay private to this module; adapters translate rows into
//! domain types and map every database failure onto the port's error enum.
//!
//! # Example
//!
//! ```ignore
//! use farm_backend::outbound::persistence::{DbPool, DieselFarmRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/farms")).await?;
//! let farms = DieselFarmRepository::new(pool);
//! ```

mod diesel_error_mapping;
mod diesel_farm_repository;
mod diesel_identity_store;
mod diesel_role_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_farm_repository::{DieselFarmRepository, DieselProvinceRepository};
pub use diesel_identity_store::DieselIdentityStore;
pub use diesel_role_repository::DieselRoleRepository;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
