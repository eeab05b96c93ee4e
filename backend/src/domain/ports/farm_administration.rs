//! Driving port for farm maintenance.
//!
//! HTTP handlers call this port for every farm screen. Validation failures and
//! store failures on create or edit are ordinary outcomes, not errors, so the
//! caller can return the normalised form to the administrator.

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{
    Error, Farm, FarmDraft, FarmId, FarmListing, FieldFailure, Notice, Province,
};

/// Outcome of a create or edit submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FarmSubmission {
    /// The farm was stored.
    Saved {
        /// Stored farm.
        farm: Farm,
        /// Success notice.
        notice: Notice,
    },
    /// Validation failed; nothing was stored.
    Invalid {
        /// Normalised form.
        draft: FarmDraft,
        /// Every failure found.
        failures: Vec<FieldFailure>,
    },
    /// The store rejected the write.
    Failed {
        /// Normalised form.
        draft: FarmDraft,
        /// Danger notice carrying the store message.
        notice: Notice,
    },
}

/// Result of the remote province-code check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum ProvinceVerdict {
    /// `true`: the code may be used.
    Accepted(bool),
    /// Message explaining why the code is rejected.
    Rejected(String),
}

impl ProvinceVerdict {
    /// Accepted verdict.
    pub fn accepted() -> Self {
        Self::Accepted(true)
    }

    /// Failure message, `None` when accepted.
    pub fn rejection(&self) -> Option<&str> {
        match self {
            Self::Accepted(_) => None,
            Self::Rejected(message) => Some(message),
        }
    }
}

/// Farm maintenance use cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FarmAdministration: Send + Sync {
    /// Farms with province names, ordered by province then name.
    async fn list_farms(&self) -> Result<Vec<FarmListing>, Error>;

    /// Provinces offered by the create and edit forms, ordered by name.
    async fn form_options(&self) -> Result<Vec<Province>, Error>;

    /// Fetch one farm; unknown ids are `not_found`.
    async fn get_farm(&self, id: FarmId) -> Result<Farm, Error>;

    /// Validate and store a new farm.
    async fn create_farm(&self, draft: FarmDraft) -> Result<FarmSubmission, Error>;

    /// Validate and replace an existing farm; unknown ids are `not_found`.
    async fn edit_farm(&self, id: FarmId, draft: FarmDraft) -> Result<FarmSubmission, Error>;

    /// Delete a farm; unknown ids are `not_found`, store failures become a
    /// danger notice.
    async fn delete_farm(&self, id: FarmId) -> Result<Notice, Error>;

    /// Check a province code against the reference table.
    async fn check_province_code(&self, code: &str) -> ProvinceVerdict;
}
