//! Domain primitives, services and ports.
//!
//! Purpose: define strongly typed farm, role and user entities, the rules that
//! govern them, and the ports through which adapters reach them. Nothing here
//! depends on Actix or Diesel.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - Farm types and [`validate_farm`]: the farm form rules.
//! - Role, user and notice types shared by the maintenance screens.
//! - [`FarmService`], [`RoleService`], [`UserAdminService`]: driving port
//!   implementations.

pub mod error;
pub mod farm;
mod farm_service;
pub mod notice;
pub mod ports;
pub mod province;
pub mod role;
mod role_service;
pub mod trace_id;
pub mod user;
mod user_admin_service;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::farm::{
    Farm, FarmDetails, FarmDraft, FarmField, FarmId, FarmIdError, FarmListing, FieldFailure,
    normalise_phone, normalise_postal_code, sort_listings, validate_farm,
};
pub use self::farm_service::FarmService;
pub use self::notice::{Notice, NoticeKind};
pub use self::province::{
    PROVINCE_CODE_LENGTH, Province, ProvinceCodeCheck, province_lookup_key,
};
pub use self::role::{DEFAULT_PROTECTED_ROLE, ProtectedRoles, Role, RoleId};
pub use self::role_service::RoleService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    PASSWORD_MAX, PASSWORD_MIN, PasswordFailure, PasswordField, PasswordResetForm, UserAccount,
    UserId, UserSummary, sort_summaries,
};
pub use self::user_admin_service::UserAdminService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use farm_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::not_found("farm 7 not found"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
