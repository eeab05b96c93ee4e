//! Outbound adapters implementing the driven ports.
//!
//! - **persistence**: PostgreSQL repositories and identity store using
//!   Diesel.
//! - **memory**: in-process store for runs without a database and for tests.
//!
//! Adapters only translate between domain types and their backing store.
//! Password hashing and reset-token handling shared by both identity
//! adapters lives in `identity_secrets`.

pub(crate) mod identity_secrets;
pub mod memory;
pub mod persistence;
