//! Port abstraction for the province reference table.

use async_trait::async_trait;

use crate::domain::Province;

use super::define_port_error;

define_port_error! {
    /// Errors raised by province repository adapters.
    pub enum ProvinceRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "province repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } => "province repository query failed: {message}",
    }
}

/// Read-only access to provinces.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProvinceRepository: Send + Sync {
    /// All provinces ordered by name.
    async fn list_by_name(&self) -> Result<Vec<Province>, ProvinceRepositoryError>;

    /// Whether a province with this uppercase code exists.
    async fn exists(&self, code: &str) -> Result<bool, ProvinceRepositoryError>;
}
