//! Farm maintenance domain service.
//!
//! Implements [`FarmAdministration`] over the farm and province repositories.
//! Create and edit run the validator, cross-check the province code, then
//! persist; store failures are reported back as danger notices alongside the
//! normalised form.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::warn;

use crate::domain::ports::{
    FarmAdministration, FarmRepository, FarmRepositoryError, FarmSubmission, ProvinceRepository,
    ProvinceRepositoryError, ProvinceVerdict,
};
use crate::domain::{
    Error, Farm, FarmDetails, FarmDraft, FarmField, FarmId, FarmListing, FieldFailure, Notice,
    Province, ProvinceCodeCheck, province_lookup_key, validate_farm,
};

/// Farm service implementing the farm driving port.
#[derive(Clone)]
pub struct FarmService<F, P> {
    farms: Arc<F>,
    provinces: Arc<P>,
    clock: Arc<dyn Clock>,
}

impl<F, P> FarmService<F, P> {
    /// Create a service over the given repositories.
    pub fn new(farms: Arc<F>, provinces: Arc<P>, clock: Arc<dyn Clock>) -> Self {
        Self {
            farms,
            provinces,
            clock,
        }
    }
}

fn map_farm_error(error: FarmRepositoryError) -> Error {
    match error {
        FarmRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("farm repository unavailable: {message}"))
        }
        FarmRepositoryError::Query { message } => {
            Error::internal(format!("farm repository error: {message}"))
        }
    }
}

fn map_province_error(error: ProvinceRepositoryError) -> Error {
    match error {
        ProvinceRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("province repository unavailable: {message}"))
        }
        ProvinceRepositoryError::Query { message } => {
            Error::internal(format!("province repository error: {message}"))
        }
    }
}

/// Underlying store message, without the adapter prefix.
fn store_message(error: &FarmRepositoryError) -> &str {
    match error {
        FarmRepositoryError::Connection { message } | FarmRepositoryError::Query { message } => {
            message
        }
    }
}

impl<F, P> FarmService<F, P>
where
    F: FarmRepository,
    P: ProvinceRepository,
{
    async fn lookup_province(
        &self,
        code: &str,
    ) -> Result<ProvinceCodeCheck, ProvinceRepositoryError> {
        let Some(key) = province_lookup_key(code) else {
            return Ok(ProvinceCodeCheck::WrongLength);
        };
        if self.provinces.exists(&key).await? {
            Ok(ProvinceCodeCheck::Valid)
        } else {
            Ok(ProvinceCodeCheck::NotOnFile)
        }
    }

    async fn verify_province(&self, code: &str) -> ProvinceVerdict {
        match self.lookup_province(code).await {
            Ok(check) => match check.message() {
                None => ProvinceVerdict::accepted(),
                Some(message) => ProvinceVerdict::Rejected(message.to_owned()),
            },
            Err(error) => {
                warn!(%error, "province lookup failed");
                let message = match &error {
                    ProvinceRepositoryError::Connection { message }
                    | ProvinceRepositoryError::Query { message } => message.as_str(),
                };
                ProvinceVerdict::Rejected(format!("error validating province code: {message}"))
            }
        }
    }

    /// Run every form rule, including the province cross-check.
    async fn validate(&self, draft: &mut FarmDraft) -> Vec<FieldFailure> {
        // Form dates carry no zone; compare them with the server's wall clock.
        let now = self.clock.local().naive_local();
        let mut failures = validate_farm(draft, now);
        if let Some(code) = draft.province_code.clone() {
            let verdict = self.verify_province(&code).await;
            if let Some(message) = verdict.rejection() {
                failures.push(FieldFailure::tagged(&[FarmField::ProvinceCode], message));
            }
        }
        failures
    }

    async fn validated_details(
        &self,
        mut draft: FarmDraft,
    ) -> Result<FarmDetails, FarmSubmission> {
        let failures = self.validate(&mut draft).await;
        if !failures.is_empty() {
            return Err(FarmSubmission::Invalid { draft, failures });
        }
        match FarmDetails::from_validated(draft.clone()) {
            Some(details) => Ok(details),
            None => Err(FarmSubmission::Invalid {
                draft,
                failures: vec![FieldFailure::untagged("farm form is incomplete")],
            }),
        }
    }
}

#[async_trait]
impl<F, P> FarmAdministration for FarmService<F, P>
where
    F: FarmRepository,
    P: ProvinceRepository,
{
    async fn list_farms(&self) -> Result<Vec<FarmListing>, Error> {
        self.farms.list_with_provinces().await.map_err(map_farm_error)
    }

    async fn form_options(&self) -> Result<Vec<Province>, Error> {
        self.provinces.list_by_name().await.map_err(map_province_error)
    }

    async fn get_farm(&self, id: FarmId) -> Result<Farm, Error> {
        self.farms
            .find_by_id(id)
            .await
            .map_err(map_farm_error)?
            .ok_or_else(|| Error::not_found(format!("farm {id} not found")))
    }

    async fn create_farm(&self, draft: FarmDraft) -> Result<FarmSubmission, Error> {
        let details = match self.validated_details(draft).await {
            Ok(details) => details,
            Err(outcome) => return Ok(outcome),
        };
        match self.farms.insert(&details).await {
            Ok(farm) => Ok(FarmSubmission::Saved {
                farm,
                notice: Notice::success("Farm created successfully"),
            }),
            Err(error) => {
                warn!(%error, "farm insert failed");
                Ok(FarmSubmission::Failed {
                    notice: Notice::danger(format!(
                        "Error creating farm: {}",
                        store_message(&error)
                    )),
                    draft: details.into(),
                })
            }
        }
    }

    async fn edit_farm(&self, id: FarmId, draft: FarmDraft) -> Result<FarmSubmission, Error> {
        self.get_farm(id).await?;
        let details = match self.validated_details(draft).await {
            Ok(details) => details,
            Err(outcome) => return Ok(outcome),
        };
        let farm = Farm { id, details };
        match self.farms.update(&farm).await {
            Ok(true) => Ok(FarmSubmission::Saved {
                notice: Notice::success(format!(
                    "Farm {} updated successfully",
                    farm.details.name
                )),
                farm,
            }),
            Ok(false) => Err(Error::not_found(format!("farm {id} not found"))),
            Err(error) => {
                warn!(%error, farm_id = %id, "farm update failed");
                Ok(FarmSubmission::Failed {
                    notice: Notice::danger(format!(
                        "Error updating farm: {}",
                        store_message(&error)
                    )),
                    draft: farm.details.into(),
                })
            }
        }
    }

    async fn delete_farm(&self, id: FarmId) -> Result<Notice, Error> {
        self.get_farm(id).await?;
        match self.farms.delete(id).await {
            Ok(true) => Ok(Notice::success("Farm deleted successfully")),
            Ok(false) => Err(Error::not_found(format!("farm {id} not found"))),
            Err(error) => {
                warn!(%error, farm_id = %id, "farm delete failed");
                Ok(Notice::danger(format!(
                    "Error deleting farm: {}",
                    store_message(&error)
                )))
            }
        }
    }

    async fn check_province_code(&self, code: &str) -> ProvinceVerdict {
        self.verify_province(code).await
    }
}

#[cfg(test)]
#[path = "farm_service_tests.rs"]
mod tests;
