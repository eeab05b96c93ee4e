//! Port abstraction for farm persistence adapters and their errors.

use async_trait::async_trait;

use crate::domain::{Farm, FarmDetails, FarmId, FarmListing};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by farm repository adapters.
    pub enum FarmRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "farm repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "farm repository query failed: {message}",
    }
}

/// Storage for farm records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FarmRepository: Send + Sync {
    /// Every farm joined with its province name, ordered by province name
    /// then farm name; farms without a province come last.
    async fn list_with_provinces(&self) -> Result<Vec<FarmListing>, FarmRepositoryError>;

    /// Fetch a farm by identifier.
    async fn find_by_id(&self, id: FarmId) -> Result<Option<Farm>, FarmRepositoryError>;

    /// Insert a new farm and return it with its assigned identifier.
    async fn insert(&self, details: &FarmDetails) -> Result<Farm, FarmRepositoryError>;

    /// Replace every field of an existing farm.
    ///
    /// Returns `false` when no farm has the given identifier.
    async fn update(&self, farm: &Farm) -> Result<bool, FarmRepositoryError>;

    /// Delete a farm.
    ///
    /// Returns `false` when no farm has the given identifier.
    async fn delete(&self, id: FarmId) -> Result<bool, FarmRepositoryError>;
}
