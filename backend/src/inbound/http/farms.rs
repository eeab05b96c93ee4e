//! Farm maintenance handlers.
//!
//! ```text
//! GET  /api/v1/farms
//! GET  /api/v1/farms/form-options
//! POST /api/v1/farms {"name":"Maple Acres","postalCode":"n1g2w1",...}
//! GET  /api/v1/farms/{id}
//! PUT  /api/v1/farms/{id}
//! GET  /api/v1/farms/{id}/delete
//! POST /api/v1/farms/{id}/delete
//! ```
//!
//! Successful mutations redirect to the list with `303 See Other` and flash
//! a notice; failed submissions answer with the normalised form.

use actix_web::{HttpResponse, get, post, put, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::ports::FarmSubmission;
use crate::domain::{Error, Farm, FarmDraft, FarmListing, FieldFailure, Notice, Province};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_farm_id;

/// Location of the farm list.
pub const FARMS_PATH: &str = "/api/v1/farms";

/// Farm list with the pending notice.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FarmListView {
    /// Farms sorted by province name, then farm name.
    pub farms: Vec<FarmListing>,
    /// Flash notice left by the previous action, if any.
    pub notice: Option<Notice>,
}

/// Choices offered by the farm forms.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FarmFormOptions {
    /// Province drop-down entries ordered by name.
    pub provinces: Vec<Province>,
}

/// Rejected submission echoed back to the administrator.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FarmFormView {
    /// The form after normalisation.
    pub form: FarmDraft,
    /// Field-tagged validation messages.
    pub failures: Vec<FieldFailure>,
    /// Set when the store refused an otherwise valid form.
    pub notice: Option<Notice>,
}

/// Register the farm routes. `form-options` precedes `{id}`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_farms)
        .service(farm_form_options)
        .service(create_farm)
        .service(get_farm)
        .service(edit_farm)
        .service(farm_deletion_preview)
        .service(delete_farm);
}

fn submission_response(
    session: &SessionContext,
    submission: FarmSubmission,
) -> ApiResult<HttpResponse> {
    match submission {
        FarmSubmission::Saved { notice, .. } => session.redirect_with_notice(FARMS_PATH, &notice),
        FarmSubmission::Invalid { draft, failures } => {
            Ok(HttpResponse::BadRequest().json(FarmFormView {
                form: draft,
                failures,
                notice: None,
            }))
        }
        FarmSubmission::Failed { draft, notice } => {
            Ok(HttpResponse::InternalServerError().json(FarmFormView {
                form: draft,
                failures: Vec::new(),
                notice: Some(notice),
            }))
        }
    }
}

/// List farms with their province names.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use farm_backend::inbound::http::farms::list_farms;
///
/// let app = App::new().service(list_farms);
/// ```
#[utoipa::path(
    get,
    path = "/api/v1/farms",
    responses(
        (status = 200, description = "Farms ordered by province then name", body = FarmListView),
        (status = 500, description = "Internal server error", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["farms"],
    operation_id = "listFarms"
)]
#[get("/farms")]
pub async fn list_farms(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<FarmListView>> {
    let farms = state.farms.list_farms().await?;
    Ok(web::Json(FarmListView {
        farms,
        notice: session.take_notice(),
    }))
}

/// Provinces for the create and edit forms.
#[utoipa::path(
    get,
    path = "/api/v1/farms/form-options",
    responses(
        (status = 200, description = "Provinces ordered by name", body = FarmFormOptions),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["farms"],
    operation_id = "farmFormOptions"
)]
#[get("/farms/form-options")]
pub async fn farm_form_options(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<FarmFormOptions>> {
    let provinces = state.farms.form_options().await?;
    Ok(web::Json(FarmFormOptions { provinces }))
}

/// Create a farm.
#[utoipa::path(
    post,
    path = "/api/v1/farms",
    request_body = FarmDraft,
    responses(
        (status = 303, description = "Created; redirect to the list"),
        (status = 400, description = "Validation failed", body = FarmFormView),
        (status = 500, description = "Store rejected the farm", body = FarmFormView)
    ),
    tags = ["farms"],
    operation_id = "createFarm"
)]
#[post("/farms")]
pub async fn create_farm(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<FarmDraft>,
) -> ApiResult<HttpResponse> {
    let submission = state.farms.create_farm(payload.into_inner()).await?;
    submission_response(&session, submission)
}

/// Fetch one farm.
#[utoipa::path(
    get,
    path = "/api/v1/farms/{id}",
    params(("id" = i32, Path, description = "Farm identifier")),
    responses(
        (status = 200, description = "Farm", body = Farm),
        (status = 400, description = "Malformed id", body = Error),
        (status = 404, description = "Unknown farm", body = Error)
    ),
    tags = ["farms"],
    operation_id = "getFarm"
)]
#[get("/farms/{id}")]
pub async fn get_farm(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Farm>> {
    let id = parse_farm_id(&path)?;
    Ok(web::Json(state.farms.get_farm(id).await?))
}

/// Replace a farm.
#[utoipa::path(
    put,
    path = "/api/v1/farms/{id}",
    params(("id" = i32, Path, description = "Farm identifier")),
    request_body = FarmDraft,
    responses(
        (status = 303, description = "Updated; redirect to the list"),
        (status = 400, description = "Validation failed or malformed id", body = FarmFormView),
        (status = 404, description = "Unknown farm", body = Error),
        (status = 500, description = "Store rejected the farm", body = FarmFormView)
    ),
    tags = ["farms"],
    operation_id = "editFarm"
)]
#[put("/farms/{id}")]
pub async fn edit_farm(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<FarmDraft>,
) -> ApiResult<HttpResponse> {
    let id = parse_farm_id(&path)?;
    let submission = state.farms.edit_farm(id, payload.into_inner()).await?;
    submission_response(&session, submission)
}

/// Farm shown on the delete confirmation screen.
#[utoipa::path(
    get,
    path = "/api/v1/farms/{id}/delete",
    params(("id" = i32, Path, description = "Farm identifier")),
    responses(
        (status = 200, description = "Farm to delete", body = Farm),
        (status = 400, description = "Malformed id", body = Error),
        (status = 404, description = "Unknown farm", body = Error)
    ),
    tags = ["farms"],
    operation_id = "farmDeletionPreview"
)]
#[get("/farms/{id}/delete")]
pub async fn farm_deletion_preview(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Farm>> {
    let id = parse_farm_id(&path)?;
    Ok(web::Json(state.farms.get_farm(id).await?))
}

/// Delete a farm and redirect to the list.
#[utoipa::path(
    post,
    path = "/api/v1/farms/{id}/delete",
    params(("id" = i32, Path, description = "Farm identifier")),
    responses(
        (status = 303, description = "Redirect to the list with a notice"),
        (status = 400, description = "Malformed id", body = Error),
        (status = 404, description = "Unknown farm", body = Error)
    ),
    tags = ["farms"],
    operation_id = "deleteFarm"
)]
#[post("/farms/{id}/delete")]
pub async fn delete_farm(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_farm_id(&path)?;
    let notice = state.farms.delete_farm(id).await?;
    session.redirect_with_notice(FARMS_PATH, &notice)
}
