//! Tests for farm identifiers, validation and listing order.

use super::*;
use chrono::{NaiveDate, NaiveDateTime};
use rstest::{fixture, rstest};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

#[fixture]
fn now() -> NaiveDateTime {
    date(2024, 5, 1).and_hms_opt(9, 30, 0).expect("valid time")
}

#[fixture]
fn valid_draft() -> FarmDraft {
    FarmDraft {
        name: Some("Maple Acres".into()),
        town: Some("Guelph".into()),
        postal_code: Some("N1G 2W1".into()),
        ..FarmDraft::default()
    }
}

fn messages(failures: &[FieldFailure]) -> Vec<&str> {
    failures
        .iter()
        .map(|failure| failure.message.as_str())
        .collect()
}

#[rstest]
#[case(Some("7"), Ok(7))]
#[case(Some(" 12 "), Ok(12))]
#[case(None, Err(FarmIdError::Missing))]
#[case(Some(""), Err(FarmIdError::Missing))]
#[case(Some("abc"), Err(FarmIdError::Invalid))]
#[case(Some("0"), Err(FarmIdError::Invalid))]
#[case(Some("-3"), Err(FarmIdError::Invalid))]
fn farm_id_parse(#[case] raw: Option<&str>, #[case] expected: Result<i32, FarmIdError>) {
    assert_eq!(FarmId::parse(raw).map(FarmId::get), expected);
}

#[rstest]
fn valid_draft_passes(mut valid_draft: FarmDraft, now: NaiveDateTime) {
    assert!(validate_farm(&mut valid_draft, now).is_empty());
}

#[rstest]
#[case("a1b2c3", "A1B 2C3")]
#[case("k1a 0b1", "K1A 0B1")]
#[case("H2X1Y4", "H2X 1Y4")]
fn postal_code_is_normalised(
    mut valid_draft: FarmDraft,
    now: NaiveDateTime,
    #[case] raw: &str,
    #[case] expected: &str,
) {
    valid_draft.postal_code = Some(raw.into());
    let failures = validate_farm(&mut valid_draft, now);
    assert!(failures.is_empty(), "unexpected failures: {failures:?}");
    assert_eq!(valid_draft.postal_code.as_deref(), Some(expected));
}

#[rstest]
#[case("12345")]
#[case("D1B 2C3")]
#[case("A1B-2C3")]
fn invalid_postal_code_fails_pattern(
    mut valid_draft: FarmDraft,
    now: NaiveDateTime,
    #[case] raw: &str,
) {
    valid_draft.postal_code = Some(raw.into());
    let failures = validate_farm(&mut valid_draft, now);
    assert_eq!(
        failures,
        vec![FieldFailure::tagged(
            &[FarmField::PostalCode],
            "Postal Code is not a valid Canadian postal pattern",
        )]
    );
}

#[rstest]
fn missing_required_fields_are_reported(now: NaiveDateTime) {
    let mut draft = FarmDraft {
        name: Some("   ".into()),
        county: Some("Wellington".into()),
        ..FarmDraft::default()
    };
    let failures = validate_farm(&mut draft, now);
    assert_eq!(
        messages(&failures),
        vec![
            "The Farm Name field is required.",
            "The Postal Code field is required.",
        ]
    );
    assert_eq!(draft.name, None);
}

#[rstest]
fn town_or_county_is_required(mut valid_draft: FarmDraft, now: NaiveDateTime) {
    valid_draft.town = Some(" ".into());
    valid_draft.county = None;
    let failures = validate_farm(&mut valid_draft, now);
    assert_eq!(
        failures,
        vec![FieldFailure::tagged(
            &[FarmField::County, FarmField::Town],
            "at least one of town or county must be provided",
        )]
    );
}

#[rstest]
fn province_code_is_uppercased(mut valid_draft: FarmDraft, now: NaiveDateTime) {
    valid_draft.province_code = Some("on".into());
    assert!(validate_farm(&mut valid_draft, now).is_empty());
    assert_eq!(valid_draft.province_code.as_deref(), Some("ON"));
}

#[rstest]
fn phones_are_normalised(mut valid_draft: FarmDraft, now: NaiveDateTime) {
    valid_draft.home_phone = Some("(416) 555-1234".into());
    valid_draft.cell_phone = Some("519 555 0000".into());
    assert!(validate_farm(&mut valid_draft, now).is_empty());
    assert_eq!(valid_draft.home_phone.as_deref(), Some("416-555-1234"));
    assert_eq!(valid_draft.cell_phone.as_deref(), Some("519-555-0000"));
}

#[rstest]
#[case::home(FarmField::HomePhone, "home phone must have 10 digits (including area code)")]
#[case::cell(FarmField::CellPhone, "cell phone must have 10 digits (including area code)")]
fn short_phone_fails(
    mut valid_draft: FarmDraft,
    now: NaiveDateTime,
    #[case] field: FarmField,
    #[case] message: &str,
) {
    match field {
        FarmField::HomePhone => valid_draft.home_phone = Some("555-1234".into()),
        _ => valid_draft.cell_phone = Some("555-1234".into()),
    }
    let failures = validate_farm(&mut valid_draft, now);
    assert_eq!(failures, vec![FieldFailure::tagged(&[field], message)]);
}

#[rstest]
fn future_date_joined_fails(mut valid_draft: FarmDraft, now: NaiveDateTime) {
    valid_draft.date_joined = Some(date(2030, 1, 1));
    let failures = validate_farm(&mut valid_draft, now);
    assert_eq!(
        failures,
        vec![FieldFailure::tagged(
            &[FarmField::DateJoined],
            "Date Joined cannot be in future",
        )]
    );
}

#[rstest]
fn date_at_current_moment_passes(mut valid_draft: FarmDraft) {
    let today = date(2024, 5, 1);
    let midnight = today.and_hms_opt(0, 0, 0).expect("valid time");
    valid_draft.date_joined = Some(today);
    valid_draft.last_contact_date = Some(today);
    assert!(validate_farm(&mut valid_draft, midnight).is_empty());
}

#[rstest]
fn future_last_contact_fails(mut valid_draft: FarmDraft, now: NaiveDateTime) {
    valid_draft.date_joined = Some(date(2024, 1, 1));
    valid_draft.last_contact_date = Some(date(2024, 5, 2));
    assert_eq!(
        messages(&validate_farm(&mut valid_draft, now)),
        vec!["Last Contact Date cannot be in future"]
    );
}

#[rstest]
fn contact_before_joining_fails(mut valid_draft: FarmDraft, now: NaiveDateTime) {
    valid_draft.date_joined = Some(date(2024, 3, 1));
    valid_draft.last_contact_date = Some(date(2024, 2, 1));
    let failures = validate_farm(&mut valid_draft, now);
    assert_eq!(
        failures,
        vec![FieldFailure::untagged(
            "farm cannot be contacted about plots before they have joined the program",
        )]
    );
}

#[rstest]
fn last_contact_requires_date_joined(mut valid_draft: FarmDraft, now: NaiveDateTime) {
    valid_draft.last_contact_date = Some(date(2024, 2, 1));
    assert_eq!(
        messages(&validate_farm(&mut valid_draft, now)),
        vec!["You have provided last contact date. So you must also have date joined"]
    );
}

#[rstest]
fn all_rules_are_reported_together(now: NaiveDateTime) {
    let mut draft = FarmDraft {
        postal_code: Some("12345".into()),
        home_phone: Some("12".into()),
        last_contact_date: Some(date(2031, 1, 1)),
        ..FarmDraft::default()
    };
    let failures = validate_farm(&mut draft, now);
    assert_eq!(failures.len(), 6, "failures: {failures:?}");
}

#[rstest]
fn details_require_validated_fields(valid_draft: FarmDraft) {
    let details = FarmDetails::from_validated(valid_draft.clone()).expect("details");
    assert_eq!(details.name, "Maple Acres");
    assert_eq!(FarmDraft::from(details), valid_draft);
    assert!(FarmDetails::from_validated(FarmDraft::default()).is_none());
}

fn listing(id: i32, name: &str, province: Option<&str>) -> FarmListing {
    FarmListing {
        farm: Farm {
            id: FarmId::new(id).expect("positive id"),
            details: FarmDetails {
                name: name.into(),
                address: None,
                town: Some("Town".into()),
                county: None,
                province_code: None,
                postal_code: "A1B 2C3".into(),
                home_phone: None,
                cell_phone: None,
                directions: None,
                date_joined: None,
                last_contact_date: None,
            },
        },
        province_name: province.map(str::to_owned),
    }
}

#[rstest]
fn listings_sort_by_province_then_name() {
    let mut listings = vec![
        listing(1, "Zed Farm", Some("Ontario")),
        listing(2, "No Province", None),
        listing(3, "Alpha Farm", Some("Ontario")),
        listing(4, "Prairie", Some("Alberta")),
    ];
    sort_listings(&mut listings);
    let ids: Vec<i32> = listings.iter().map(|item| item.farm.id.get()).collect();
    assert_eq!(ids, vec![4, 3, 1, 2]);
}

#[rstest]
fn farm_serialises_flat_camel_case() {
    let value = serde_json::to_value(listing(9, "Maple", Some("Ontario"))).expect("serialise");
    assert_eq!(value["id"], 9);
    assert_eq!(value["postalCode"], "A1B 2C3");
    assert_eq!(value["provinceName"], "Ontario");
}
