//! Farm records and their form validation.
//!
//! A [`FarmDraft`] is what an administrator submits. Validation normalises
//! the draft in place and reports [`FieldFailure`]s; a draft without failures
//! converts into [`FarmDetails`], the shape persisted by repositories.

mod validation;

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub use self::validation::{
    FarmField, FieldFailure, normalise_phone, normalise_postal_code, validate_farm,
};

/// Errors raised when parsing a farm identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FarmIdError {
    /// No identifier was supplied.
    #[error("farm id is required")]
    Missing,
    /// The identifier is not a positive integer.
    #[error("farm id must be a positive integer")]
    Invalid,
}

/// Identifier of a persisted farm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct FarmId(i32);

impl FarmId {
    /// Validate and wrap a database identifier.
    pub fn new(id: i32) -> Result<Self, FarmIdError> {
        if id > 0 {
            Ok(Self(id))
        } else {
            Err(FarmIdError::Invalid)
        }
    }

    /// Parse an identifier taken from a request path or query string.
    ///
    /// # Examples
    /// ```
    /// use farm_backend::domain::{FarmId, FarmIdError};
    ///
    /// assert_eq!(FarmId::parse(Some("12")).map(FarmId::get), Ok(12));
    /// assert_eq!(FarmId::parse(Some(" ")), Err(FarmIdError::Missing));
    /// assert_eq!(FarmId::parse(Some("x")), Err(FarmIdError::Invalid));
    /// ```
    pub fn parse(raw: Option<&str>) -> Result<Self, FarmIdError> {
        let raw = raw.map(str::trim).filter(|value| !value.is_empty());
        let Some(raw) = raw else {
            return Err(FarmIdError::Missing);
        };
        let id = raw.parse::<i32>().map_err(|_| FarmIdError::Invalid)?;
        Self::new(id)
    }

    /// Raw integer value.
    pub fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for FarmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i32> for FarmId {
    type Error = FarmIdError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FarmId> for i32 {
    fn from(value: FarmId) -> Self {
        value.0
    }
}

/// Farm form as submitted for create or edit.
///
/// Every text field is optional at this stage; blank strings are treated as
/// absent by [`validate_farm`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct FarmDraft {
    /// Farm name.
    pub name: Option<String>,
    /// Street address.
    pub address: Option<String>,
    /// Town.
    pub town: Option<String>,
    /// County.
    pub county: Option<String>,
    /// Two-letter province code.
    pub province_code: Option<String>,
    /// Canadian postal code.
    pub postal_code: Option<String>,
    /// Home phone number.
    pub home_phone: Option<String>,
    /// Cell phone number.
    pub cell_phone: Option<String>,
    /// Free-form directions to the farm.
    pub directions: Option<String>,
    /// Date the farm joined the programme.
    pub date_joined: Option<NaiveDate>,
    /// Date the farm was last contacted.
    pub last_contact_date: Option<NaiveDate>,
}

/// Validated farm fields as persisted.
///
/// ## Invariants
/// - `name` is non-blank.
/// - `postal_code` matches the Canadian pattern and is uppercase.
/// - phone numbers, when present, are `NNN-NNN-NNNN`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FarmDetails {
    /// Farm name.
    pub name: String,
    /// Street address.
    pub address: Option<String>,
    /// Town.
    pub town: Option<String>,
    /// County.
    pub county: Option<String>,
    /// Uppercase province code.
    pub province_code: Option<String>,
    /// Normalised postal code.
    pub postal_code: String,
    /// Normalised home phone.
    pub home_phone: Option<String>,
    /// Normalised cell phone.
    pub cell_phone: Option<String>,
    /// Directions to the farm.
    pub directions: Option<String>,
    /// Date joined.
    pub date_joined: Option<NaiveDate>,
    /// Last contact date.
    pub last_contact_date: Option<NaiveDate>,
}

impl FarmDetails {
    /// Build details from a draft that passed validation.
    ///
    /// Returns `None` when a required field is still missing, which only
    /// happens if validation was skipped.
    pub fn from_validated(draft: FarmDraft) -> Option<Self> {
        let FarmDraft {
            name,
            address,
            town,
            county,
            province_code,
            postal_code,
            home_phone,
            cell_phone,
            directions,
            date_joined,
            last_contact_date,
        } = draft;
        Some(Self {
            name: name?,
            address,
            town,
            county,
            province_code,
            postal_code: postal_code?,
            home_phone,
            cell_phone,
            directions,
            date_joined,
            last_contact_date,
        })
    }
}

impl From<FarmDetails> for FarmDraft {
    fn from(details: FarmDetails) -> Self {
        Self {
            name: Some(details.name),
            address: details.address,
            town: details.town,
            county: details.county,
            province_code: details.province_code,
            postal_code: Some(details.postal_code),
            home_phone: details.home_phone,
            cell_phone: details.cell_phone,
            directions: details.directions,
            date_joined: details.date_joined,
            last_contact_date: details.last_contact_date,
        }
    }
}

/// Persisted farm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Farm {
    /// Farm identifier.
    #[schema(value_type = i32, example = 7)]
    pub id: FarmId,
    /// Farm fields.
    #[serde(flatten)]
    pub details: FarmDetails,
}

/// Farm row of the list view, joined with its province name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FarmListing {
    /// The farm.
    #[serde(flatten)]
    pub farm: Farm,
    /// Name of the farm's province, when it has one.
    pub province_name: Option<String>,
}

/// Sort listings by province name then farm name.
///
/// Farms without a province sort last, matching PostgreSQL's default
/// `ASC NULLS LAST` ordering.
pub fn sort_listings(listings: &mut [FarmListing]) {
    listings.sort_by(|left, right| {
        let province = match (&left.province_name, &right.province_name) {
            (Some(a), Some(b)) => a.cmp(b),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        };
        province.then_with(|| left.farm.details.name.cmp(&right.farm.details.name))
    });
}

#[cfg(test)]
mod tests;
