//! Remote province-code check used by the farm forms.
//!
//! ```text
//! GET /api/v1/provinces/check?provinceCode=on
//! ```
//!
//! Answers `true` when the code may be used, otherwise the message to show
//! next to the field.

use actix_web::{get, web};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::ProvinceVerdict;
use crate::inbound::http::state::HttpState;

/// Query string of the province check.
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProvinceCheckQuery {
    /// Code typed into the form; missing is treated as empty.
    pub province_code: Option<String>,
}

/// Register the province check route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(check_province_code);
}

/// Check a province code against the province table.
#[utoipa::path(
    get,
    path = "/api/v1/provinces/check",
    params(ProvinceCheckQuery),
    responses(
        (status = 200, description = "`true` or the rejection message", body = ProvinceVerdict)
    ),
    tags = ["farms"],
    operation_id = "checkProvinceCode"
)]
#[get("/provinces/check")]
pub async fn check_province_code(
    state: web::Data<HttpState>,
    query: web::Query<ProvinceCheckQuery>,
) -> web::Json<ProvinceVerdict> {
    let code = query.into_inner().province_code.unwrap_or_default();
    web::Json(state.farms.check_province_code(&code).await)
}
