//! User maintenance handlers.
//!
//! ```text
//! GET  /api/v1/users
//! POST /api/v1/users/{id}/lock
//! GET  /api/v1/users/{id}/password-reset
//! POST /api/v1/users/{id}/password-reset {"code":"...","password":"...","confirmPassword":"..."}
//! GET  /api/v1/users/{id}/delete
//! POST /api/v1/users/{id}/delete
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::ports::{PasswordReset, PasswordResetTicket, UserDeletion};
use crate::domain::{Error, Notice, PasswordFailure, PasswordResetForm, UserId, UserSummary};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_user_id};

/// Location of the user list.
pub const USERS_PATH: &str = "/api/v1/users";

/// User list with the pending notice.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserListView {
    /// Accounts ordered by user name.
    pub users: Vec<UserSummary>,
    /// Flash notice left by the previous action, if any.
    pub notice: Option<Notice>,
}

/// Rejected password reset.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetView {
    /// Reasons the new password was refused.
    pub failures: Vec<PasswordFailure>,
    /// Banner shown above the form.
    pub notice: Option<Notice>,
}

/// User kept after a failed deletion.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDeletionView {
    /// The account that still exists.
    pub user: UserSummary,
    /// Why the deletion failed.
    pub notice: Notice,
}

/// Register the user routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_users)
        .service(toggle_lock)
        .service(issue_password_reset)
        .service(reset_password)
        .service(user_deletion_preview)
        .service(delete_user);
}

fn user_id(raw: &str) -> Result<UserId, Error> {
    parse_user_id(raw, FieldName::new("id"))
}

/// List users, unlocked first.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use farm_backend::inbound::http::users::list_users;
///
/// let app = App::new().service(list_users);
/// ```
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "Users", body = UserListView),
        (status = 500, description = "Internal server error", body = Error),
        (status = 503, description = "Identity store unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UserListView>> {
    let users = state.users.list_users().await?;
    Ok(web::Json(UserListView {
        users,
        notice: session.take_notice(),
    }))
}

/// Lock an unlocked user or unlock a locked one.
#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/lock",
    params(("id" = String, Path, description = "User identifier")),
    responses(
        (status = 303, description = "Redirect to the user list with a notice"),
        (status = 400, description = "Malformed id", body = Error),
        (status = 404, description = "Unknown user", body = Error)
    ),
    tags = ["users"],
    operation_id = "toggleUserLock"
)]
#[post("/users/{id}/lock")]
pub async fn toggle_lock(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let notice = state.users.toggle_lock(user_id(&path)?).await?;
    session.redirect_with_notice(USERS_PATH, &notice)
}

/// Issue a password reset token.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/password-reset",
    params(("id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Reset token and account email", body = PasswordResetTicket),
        (status = 400, description = "Malformed id", body = Error),
        (status = 404, description = "Unknown user", body = Error)
    ),
    tags = ["users"],
    operation_id = "issuePasswordReset"
)]
#[get("/users/{id}/password-reset")]
pub async fn issue_password_reset(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<PasswordResetTicket>> {
    let ticket = state.users.issue_password_reset(user_id(&path)?).await?;
    Ok(web::Json(ticket))
}

/// Replace a password using a reset token.
#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/password-reset",
    params(("id" = String, Path, description = "User identifier")),
    request_body = PasswordResetForm,
    responses(
        (status = 303, description = "Changed; redirect to the user list"),
        (status = 400, description = "Form invalid or token refused", body = PasswordResetView),
        (status = 404, description = "Unknown user", body = Error)
    ),
    tags = ["users"],
    operation_id = "resetPassword"
)]
#[post("/users/{id}/password-reset")]
pub async fn reset_password(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<PasswordResetForm>,
) -> ApiResult<HttpResponse> {
    let id = user_id(&path)?;
    match state.users.reset_password(id, payload.into_inner()).await? {
        PasswordReset::Changed(notice) => session.redirect_with_notice(USERS_PATH, &notice),
        PasswordReset::Invalid(failures) => {
            Ok(HttpResponse::BadRequest().json(PasswordResetView {
                failures,
                notice: None,
            }))
        }
        PasswordReset::Failed(notice) => Ok(HttpResponse::BadRequest().json(PasswordResetView {
            failures: Vec::new(),
            notice: Some(notice),
        })),
    }
}

/// User shown on the delete confirmation screen.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/delete",
    params(("id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User to delete", body = UserSummary),
        (status = 400, description = "Malformed id", body = Error),
        (status = 404, description = "Unknown user", body = Error)
    ),
    tags = ["users"],
    operation_id = "userDeletionPreview"
)]
#[get("/users/{id}/delete")]
pub async fn user_deletion_preview(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<UserSummary>> {
    let summary = state.users.deletion_preview(user_id(&path)?).await?;
    Ok(web::Json(summary))
}

/// Delete a user with their role memberships.
#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/delete",
    params(("id" = String, Path, description = "User identifier")),
    responses(
        (status = 303, description = "Deleted; redirect to the user list"),
        (status = 400, description = "Malformed id", body = Error),
        (status = 404, description = "Unknown user", body = Error),
        (status = 500, description = "Store failure", body = UserDeletionView)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[post("/users/{id}/delete")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    match state.users.delete_user(user_id(&path)?).await? {
        UserDeletion::Deleted(notice) => session.redirect_with_notice(USERS_PATH, &notice),
        UserDeletion::Failed { user, notice } => {
            Ok(HttpResponse::InternalServerError().json(UserDeletionView { user, notice }))
        }
    }
}
