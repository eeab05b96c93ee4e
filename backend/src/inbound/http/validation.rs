//! Shared validation helpers for inbound HTTP adapters.
//!
//! Path identifiers arrive as raw strings so that a malformed value becomes
//! a structured `invalid_request` payload instead of Actix's plain-text 404.

use serde_json::json;
use uuid::Uuid;

use crate::domain::{Error, FarmId, FarmIdError, RoleId, UserId};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidId,
    InvalidUuid,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidId => "invalid_id",
            ErrorCode::InvalidUuid => "invalid_uuid",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: String,
    message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("missing required field: {field}"))
        .with_code(ErrorCode::MissingField)
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must be a valid UUID"))
        .with_value(ErrorCode::InvalidUuid, value)
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    if value.trim().is_empty() {
        return Err(missing_field_error(field));
    }
    Uuid::parse_str(value.trim()).map_err(|_| invalid_uuid_error(field, value))
}

/// Parse a farm id from a path segment.
pub(crate) fn parse_farm_id(value: &str) -> Result<FarmId, Error> {
    const FIELD: FieldName = FieldName::new("id");
    FarmId::parse(Some(value)).map_err(|err| match err {
        FarmIdError::Missing => missing_field_error(FIELD),
        FarmIdError::Invalid => ValidationError::new(FIELD.as_str(), err.to_string())
            .with_value(ErrorCode::InvalidId, value),
    })
}

/// Parse a role id from a path segment.
pub(crate) fn parse_role_id(value: &str) -> Result<RoleId, Error> {
    parse_uuid(value, FieldName::new("id")).map(RoleId::from_uuid)
}

/// Parse a user id from a path segment or body field.
pub(crate) fn parse_user_id(value: &str, field: FieldName) -> Result<UserId, Error> {
    parse_uuid(value, field).map(UserId::from_uuid)
}
