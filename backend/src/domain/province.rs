//! Province reference data and the province-code check.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Canadian province or territory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Province {
    /// Two-letter code, uppercase.
    #[schema(example = "ON")]
    pub code: String,
    /// Full name.
    #[schema(example = "Ontario")]
    pub name: String,
}

impl Province {
    /// Build a province record.
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// Length every province code must have.
pub const PROVINCE_CODE_LENGTH: usize = 2;

/// Outcome of checking a province code against the reference table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvinceCodeCheck {
    /// The code exists.
    Valid,
    /// The code is not exactly two characters long.
    WrongLength,
    /// The code is well formed but not on file.
    NotOnFile,
}

impl ProvinceCodeCheck {
    /// Whether the code may be stored.
    pub fn is_valid(self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Failure message for administrators, `None` when valid.
    ///
    /// # Examples
    /// ```
    /// use farm_backend::domain::ProvinceCodeCheck;
    ///
    /// assert_eq!(
    ///     ProvinceCodeCheck::WrongLength.message(),
    ///     Some("Province code should be 2 character long"),
    /// );
    /// assert_eq!(ProvinceCodeCheck::Valid.message(), None);
    /// ```
    pub fn message(self) -> Option<&'static str> {
        match self {
            Self::Valid => None,
            Self::WrongLength => Some("Province code should be 2 character long"),
            Self::NotOnFile => Some("Province code not on the file"),
        }
    }
}

/// Uppercase lookup key for `raw`, or `None` when its length is wrong.
///
/// Surrounding whitespace counts towards the length, so a padded code is
/// rejected rather than stored with its padding.
pub fn province_lookup_key(raw: &str) -> Option<String> {
    (raw.chars().count() == PROVINCE_CODE_LENGTH).then(|| raw.to_uppercase())
}
