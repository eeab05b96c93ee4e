//! Farm form validation and normalisation.
//!
//! Every rule runs on each pass so the administrator sees all problems at
//! once. Normalisation (province code, postal code, phone numbers) mutates
//! the draft in place.

use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::FarmDraft;

/// Farm form fields that validation failures can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum FarmField {
    /// Farm name.
    Name,
    /// Town.
    Town,
    /// County.
    County,
    /// Province code.
    ProvinceCode,
    /// Postal code.
    PostalCode,
    /// Home phone.
    HomePhone,
    /// Cell phone.
    CellPhone,
    /// Date joined.
    DateJoined,
    /// Last contact date.
    LastContactDate,
}

impl FarmField {
    /// Label shown to administrators.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Name => "Farm Name",
            Self::Town => "Town",
            Self::County => "County",
            Self::ProvinceCode => "Province",
            Self::PostalCode => "Postal Code",
            Self::HomePhone => "Home Phone",
            Self::CellPhone => "Cell Phone",
            Self::DateJoined => "Date Joined",
            Self::LastContactDate => "Last Contact Date",
        }
    }
}

/// A single validation failure.
///
/// `fields` is empty for record-level failures that do not belong to one
/// input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldFailure {
    /// Offending fields.
    pub fields: Vec<FarmField>,
    /// Human-readable explanation.
    pub message: String,
}

impl FieldFailure {
    /// Failure tagged with the given fields.
    pub fn tagged(fields: &[FarmField], message: impl Into<String>) -> Self {
        Self {
            fields: fields.to_vec(),
            message: message.into(),
        }
    }

    /// Record-level failure.
    pub fn untagged(message: impl Into<String>) -> Self {
        Self {
            fields: Vec::new(),
            message: message.into(),
        }
    }
}

const TOWN_OR_COUNTY_REQUIRED: &str = "at least one of town or county must be provided";
const CONTACT_BEFORE_JOINING: &str =
    "farm cannot be contacted about plots before they have joined the program";
const CONTACT_WITHOUT_JOINING: &str =
    "You have provided last contact date. So you must also have date joined";

static POSTAL_CODE_RE: OnceLock<Regex> = OnceLock::new();

fn postal_code_regex() -> &'static Regex {
    POSTAL_CODE_RE.get_or_init(|| {
        Regex::new(r"(?i)^[ABCEGHJKLMNPRSTVXY]\d[A-Z]\s?\d[A-Z]\d$")
            .unwrap_or_else(|error| panic!("postal code regex failed to compile: {error}"))
    })
}

/// Whether `value` looks like a Canadian postal code, case-insensitively.
pub fn is_canadian_postal_code(value: &str) -> bool {
    postal_code_regex().is_match(value)
}

/// Normalise a postal code.
///
/// Six-character codes gain a space after the third character; every code
/// is uppercased. No format check happens here.
///
/// # Examples
/// ```
/// use farm_backend::domain::normalise_postal_code;
///
/// assert_eq!(normalise_postal_code("a1b2c3"), "A1B 2C3");
/// assert_eq!(normalise_postal_code("a1b 2c3"), "A1B 2C3");
/// ```
pub fn normalise_postal_code(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    if chars.len() == 6 {
        let (head, tail) = chars.split_at(3);
        let head: String = head.iter().collect();
        let tail: String = tail.iter().collect();
        format!("{} {}", head.to_uppercase(), tail.to_uppercase())
    } else {
        raw.to_uppercase()
    }
}

/// Reformat a phone number as `NNN-NNN-NNNN`.
///
/// Returns `None` unless the input holds exactly ten digits once every other
/// character is dropped.
///
/// # Examples
/// ```
/// use farm_backend::domain::normalise_phone;
///
/// assert_eq!(normalise_phone("(416) 555-1234").as_deref(), Some("416-555-1234"));
/// assert_eq!(normalise_phone("555-1234"), None);
/// ```
pub fn normalise_phone(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != 10 {
        return None;
    }
    let (area, rest) = digits.split_at(3);
    let (exchange, line) = rest.split_at(3);
    Some(format!("{area}-{exchange}-{line}"))
}

fn blank_to_none(value: &mut Option<String>) {
    if value.as_deref().is_some_and(|text| text.trim().is_empty()) {
        *value = None;
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|text| text.trim().is_empty())
}

fn is_in_future(date: NaiveDate, now: NaiveDateTime) -> bool {
    date.and_time(NaiveTime::MIN) > now
}

fn future_date_failure(field: FarmField) -> FieldFailure {
    FieldFailure::tagged(
        &[field],
        format!("{} cannot be in future", field.display_name()),
    )
}

fn required_failure(field: FarmField) -> FieldFailure {
    FieldFailure::tagged(
        &[field],
        format!("The {} field is required.", field.display_name()),
    )
}

fn validate_field_rules(draft: &FarmDraft, now: NaiveDateTime, failures: &mut Vec<FieldFailure>) {
    if is_blank(draft.name.as_deref()) {
        failures.push(required_failure(FarmField::Name));
    }

    match draft.postal_code.as_deref() {
        None => failures.push(required_failure(FarmField::PostalCode)),
        Some(code) if !is_canadian_postal_code(code) => failures.push(FieldFailure::tagged(
            &[FarmField::PostalCode],
            format!(
                "{} is not a valid Canadian postal pattern",
                FarmField::PostalCode.display_name()
            ),
        )),
        Some(_) => {}
    }

    if draft.date_joined.is_some_and(|date| is_in_future(date, now)) {
        failures.push(future_date_failure(FarmField::DateJoined));
    }
    if draft
        .last_contact_date
        .is_some_and(|date| is_in_future(date, now))
    {
        failures.push(future_date_failure(FarmField::LastContactDate));
    }
}

fn normalise_phone_field(
    value: &mut Option<String>,
    field: FarmField,
    label: &str,
    failures: &mut Vec<FieldFailure>,
) {
    let Some(raw) = value.as_deref() else {
        return;
    };
    match normalise_phone(raw) {
        Some(formatted) => *value = Some(formatted),
        None => failures.push(FieldFailure::tagged(
            &[field],
            format!("{label} must have 10 digits (including area code)"),
        )),
    }
}

fn validate_record_rules(draft: &mut FarmDraft, failures: &mut Vec<FieldFailure>) {
    if is_blank(draft.town.as_deref()) && is_blank(draft.county.as_deref()) {
        failures.push(FieldFailure::tagged(
            &[FarmField::County, FarmField::Town],
            TOWN_OR_COUNTY_REQUIRED,
        ));
    }

    if let Some(code) = draft.province_code.as_mut() {
        *code = code.to_uppercase();
    }

    if let Some(code) = draft.postal_code.as_mut() {
        *code = normalise_postal_code(code);
    }

    normalise_phone_field(
        &mut draft.home_phone,
        FarmField::HomePhone,
        "home phone",
        failures,
    );
    normalise_phone_field(
        &mut draft.cell_phone,
        FarmField::CellPhone,
        "cell phone",
        failures,
    );

    // Only comparable when both dates are present.
    if let (Some(joined), Some(contacted)) = (draft.date_joined, draft.last_contact_date)
        && joined > contacted
    {
        failures.push(FieldFailure::untagged(CONTACT_BEFORE_JOINING));
    }

    if draft.last_contact_date.is_some() && draft.date_joined.is_none() {
        failures.push(FieldFailure::untagged(CONTACT_WITHOUT_JOINING));
    }
}

/// Validate and normalise a farm draft in place.
///
/// `now` is the moment dates are compared against; a date whose midnight is
/// after `now` is in the future. Blank optional fields become `None` before
/// any rule runs.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use farm_backend::domain::{FarmDraft, validate_farm};
///
/// let mut draft = FarmDraft {
///     name: Some("Maple Acres".into()),
///     town: Some("Guelph".into()),
///     postal_code: Some("n1g2w1".into()),
///     home_phone: Some("519.555.0199".into()),
///     ..FarmDraft::default()
/// };
/// let now = NaiveDate::from_ymd_opt(2024, 5, 1)
///     .and_then(|date| date.and_hms_opt(12, 0, 0))
///     .expect("valid timestamp");
///
/// assert!(validate_farm(&mut draft, now).is_empty());
/// assert_eq!(draft.postal_code.as_deref(), Some("N1G 2W1"));
/// assert_eq!(draft.home_phone.as_deref(), Some("519-555-0199"));
/// ```
pub fn validate_farm(draft: &mut FarmDraft, now: NaiveDateTime) -> Vec<FieldFailure> {
    for value in [
        &mut draft.name,
        &mut draft.address,
        &mut draft.town,
        &mut draft.county,
        &mut draft.province_code,
        &mut draft.postal_code,
        &mut draft.home_phone,
        &mut draft.cell_phone,
        &mut draft.directions,
    ] {
        blank_to_none(value);
    }

    let mut failures = Vec::new();
    validate_record_rules(draft, &mut failures);
    validate_field_rules(draft, now, &mut failures);
    failures
}
