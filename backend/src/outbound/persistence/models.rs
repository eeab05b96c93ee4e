//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{farms, password_reset_tokens, provinces, roles, users};

/// Row struct for reading from the provinces table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = provinces)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProvinceRow {
    pub code: String,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Farm models
// ---------------------------------------------------------------------------

/// Row struct for reading from the farms table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = farms)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct FarmRow {
    pub id: i32,
    pub name: String,
    pub address: Option<String>,
    pub town: Option<String>,
    pub county: Option<String>,
    pub province_code: Option<String>,
    pub postal_code: String,
    pub home_phone: Option<String>,
    pub cell_phone: Option<String>,
    pub directions: Option<String>,
    pub date_joined: Option<NaiveDate>,
    pub last_contact_date: Option<NaiveDate>,
}

/// Insertable and changeset struct for farm writes.
///
/// `treat_none_as_null` makes updates replace the whole record, clearing
/// fields the administrator emptied.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = farms)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct FarmWrite<'a> {
    pub name: &'a str,
    pub address: Option<&'a str>,
    pub town: Option<&'a str>,
    pub county: Option<&'a str>,
    pub province_code: Option<&'a str>,
    pub postal_code: &'a str,
    pub home_phone: Option<&'a str>,
    pub cell_phone: Option<&'a str>,
    pub directions: Option<&'a str>,
    pub date_joined: Option<NaiveDate>,
    pub last_contact_date: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// Identity models
// ---------------------------------------------------------------------------

/// Row struct for reading from the roles table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = roles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RoleRow {
    pub id: Uuid,
    pub name: String,
}

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub user_name: String,
    pub lockout_enabled: bool,
    pub lockout_end: Option<DateTime<Utc>>,
}

/// Insertable struct for password reset tokens.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = password_reset_tokens)]
pub(crate) struct NewPasswordResetTokenRow<'a> {
    pub token_digest: &'a str,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}
