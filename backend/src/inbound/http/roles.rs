//! Role maintenance handlers.
//!
//! ```text
//! GET  /api/v1/roles
//! POST /api/v1/roles {"roleName":"Inspector"}
//! GET  /api/v1/roles/{id}/delete
//! POST /api/v1/roles/delete {"roleName":"Inspector","removeAllUsersFromRole":true}
//! GET  /api/v1/roles/{id}/users
//! POST /api/v1/roles/{id}/users {"userId":"..."}
//! POST /api/v1/roles/{id}/users/{userId}/remove
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{RoleDeletion, RoleMembers, RoleMembership};
use crate::domain::{Error, Notice, Role, RoleId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_role_id, parse_user_id};

/// Location of the role list.
pub const ROLES_PATH: &str = "/api/v1/roles";

fn membership_path(role: RoleId) -> String {
    format!("{ROLES_PATH}/{role}/users")
}

/// Role list with the pending notice.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleListView {
    /// Roles ordered by name.
    pub roles: Vec<Role>,
    /// Flash notice left by the previous action, if any.
    pub notice: Option<Notice>,
}

/// Membership screen of one role.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleMembershipView {
    /// The role with its members and candidates.
    #[serde(flatten)]
    pub membership: RoleMembership,
    /// Flash notice left by the previous action, if any.
    pub notice: Option<Notice>,
}

/// Body of `POST /roles`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoleRequest {
    /// Requested name; missing is treated as empty.
    #[serde(default)]
    pub role_name: String,
}

/// Body of `POST /roles/delete`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmRoleDeletionRequest {
    /// Name of the role being deleted.
    pub role_name: String,
    /// Consent to strip the role from its members first.
    #[serde(default)]
    pub remove_all_users_from_role: bool,
}

/// Body of `POST /roles/{id}/users`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddRoleMemberRequest {
    /// Identifier of the user to add.
    pub user_id: String,
}

/// Register the role routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_roles)
        .service(create_role)
        .service(confirm_role_deletion)
        .service(request_role_deletion)
        .service(role_membership)
        .service(add_role_member)
        .service(remove_role_member);
}

fn deletion_response(
    session: &SessionContext,
    deletion: RoleDeletion,
) -> ApiResult<HttpResponse> {
    match deletion {
        RoleDeletion::Deleted(notice) | RoleDeletion::Refused(notice) => {
            session.redirect_with_notice(ROLES_PATH, &notice)
        }
        RoleDeletion::ConfirmationRequired(members) => Ok(HttpResponse::Ok().json(members)),
    }
}

/// List roles ordered by name.
#[utoipa::path(
    get,
    path = "/api/v1/roles",
    responses(
        (status = 200, description = "Roles", body = RoleListView),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["roles"],
    operation_id = "listRoles"
)]
#[get("/roles")]
pub async fn list_roles(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<RoleListView>> {
    let roles = state.roles.list_roles().await?;
    Ok(web::Json(RoleListView {
        roles,
        notice: session.take_notice(),
    }))
}

/// Create a role; the outcome is flashed on the role list.
#[utoipa::path(
    post,
    path = "/api/v1/roles",
    request_body = CreateRoleRequest,
    responses(
        (status = 303, description = "Redirect to the role list with a notice"),
        (status = 400, description = "Malformed body", body = Error)
    ),
    tags = ["roles"],
    operation_id = "createRole"
)]
#[post("/roles")]
pub async fn create_role(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateRoleRequest>,
) -> ApiResult<HttpResponse> {
    let notice = state.roles.create_role(&payload.role_name).await;
    session.redirect_with_notice(ROLES_PATH, &notice)
}

/// Ask to delete a role; members must be confirmed first.
#[utoipa::path(
    get,
    path = "/api/v1/roles/{id}/delete",
    params(("id" = String, Path, description = "Role identifier")),
    responses(
        (status = 200, description = "Members to remove before deleting", body = RoleMembers),
        (status = 303, description = "Deleted or refused; redirect to the role list"),
        (status = 400, description = "Malformed id", body = Error),
        (status = 404, description = "Unknown role", body = Error)
    ),
    tags = ["roles"],
    operation_id = "requestRoleDeletion"
)]
#[get("/roles/{id}/delete")]
pub async fn request_role_deletion(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_role_id(&path)?;
    let deletion = state.roles.request_role_deletion(id).await?;
    deletion_response(&session, deletion)
}

/// Answer the member-removal confirmation.
#[utoipa::path(
    post,
    path = "/api/v1/roles/delete",
    request_body = ConfirmRoleDeletionRequest,
    responses(
        (status = 200, description = "Removal not confirmed", body = RoleMembers),
        (status = 303, description = "Deleted or refused; redirect to the role list"),
        (status = 404, description = "Unknown role", body = Error)
    ),
    tags = ["roles"],
    operation_id = "confirmRoleDeletion"
)]
#[post("/roles/delete")]
pub async fn confirm_role_deletion(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ConfirmRoleDeletionRequest>,
) -> ApiResult<HttpResponse> {
    let ConfirmRoleDeletionRequest {
        role_name,
        remove_all_users_from_role,
    } = payload.into_inner();
    let deletion = state
        .roles
        .confirm_role_deletion(&role_name, remove_all_users_from_role)
        .await?;
    deletion_response(&session, deletion)
}

/// Users inside and outside a role.
#[utoipa::path(
    get,
    path = "/api/v1/roles/{id}/users",
    params(("id" = String, Path, description = "Role identifier")),
    responses(
        (status = 200, description = "Membership", body = RoleMembershipView),
        (status = 400, description = "Malformed id", body = Error),
        (status = 404, description = "Unknown role", body = Error)
    ),
    tags = ["roles"],
    operation_id = "roleMembership"
)]
#[get("/roles/{id}/users")]
pub async fn role_membership(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<RoleMembershipView>> {
    let id = parse_role_id(&path)?;
    let membership = state.roles.role_membership(id).await?;
    Ok(web::Json(RoleMembershipView {
        membership,
        notice: session.take_notice(),
    }))
}

/// Grant a role to a user.
#[utoipa::path(
    post,
    path = "/api/v1/roles/{id}/users",
    params(("id" = String, Path, description = "Role identifier")),
    request_body = AddRoleMemberRequest,
    responses(
        (status = 303, description = "Redirect to the membership screen with a notice"),
        (status = 400, description = "Malformed id", body = Error),
        (status = 404, description = "Unknown role", body = Error)
    ),
    tags = ["roles"],
    operation_id = "addRoleMember"
)]
#[post("/roles/{id}/users")]
pub async fn add_role_member(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<AddRoleMemberRequest>,
) -> ApiResult<HttpResponse> {
    let id = parse_role_id(&path)?;
    let user = parse_user_id(&payload.user_id, FieldName::new("userId"))?;
    let notice = state.roles.add_user_to_role(id, user).await?;
    session.redirect_with_notice(membership_path(id), &notice)
}

/// Revoke a role from a user.
#[utoipa::path(
    post,
    path = "/api/v1/roles/{id}/users/{userId}/remove",
    params(
        ("id" = String, Path, description = "Role identifier"),
        ("userId" = String, Path, description = "User identifier")
    ),
    responses(
        (status = 303, description = "Redirect to the membership screen with a notice"),
        (status = 400, description = "Malformed id", body = Error),
        (status = 404, description = "Unknown role", body = Error)
    ),
    tags = ["roles"],
    operation_id = "removeRoleMember"
)]
#[post("/roles/{id}/users/{user_id}/remove")]
pub async fn remove_role_member(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let (role, user) = path.into_inner();
    let id = parse_role_id(&role)?;
    let user = parse_user_id(&user, FieldName::new("userId"))?;
    let notice = state.roles.remove_user_from_role(id, user).await?;
    session.redirect_with_notice(membership_path(id), &notice)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use serde_json::{Value, json};

    use crate::domain::ports::{
        MockFarmAdministration, MockRoleAdministration, MockUserAdministration,
    };
    use crate::domain::{UserId, UserSummary};
    use crate::inbound::http::test_utils::{location, mocked_state, session_cookie, test_app};

    fn state(roles: MockRoleAdministration) -> HttpState {
        mocked_state(
            MockFarmAdministration::new(),
            roles,
            MockUserAdministration::new(),
        )
    }

    fn member(name: &str) -> UserSummary {
        UserSummary {
            user_id: UserId::random(),
            email: format!("{name}@example.com"),
            user_name: name.into(),
            is_locked_out: false,
            is_authorized_locally: true,
            is_admin: false,
            roles: vec!["Inspector".into()],
        }
    }

    #[actix_web::test]
    async fn create_flashes_notice_on_role_list() {
        let mut roles = MockRoleAdministration::new();
        roles
            .expect_create_role()
            .withf(|name| name == " Inspector ")
            .returning(|_| Notice::success("Role - Inspector created successfully"));
        roles
            .expect_list_roles()
            .returning(|| Ok(vec![Role::new(RoleId::random(), "Inspector")]));
        let app = actix_test::init_service(test_app(state(roles), configure)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/roles")
                .set_json(json!({ "roleName": " Inspector " }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&res), Some(ROLES_PATH));

        let list = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/roles")
                .cookie(session_cookie(&res))
                .to_request(),
        )
        .await;
        let body: Value = actix_test::read_body_json(list).await;
        assert_eq!(
            body["notice"]["message"],
            "Role - Inspector created successfully"
        );
        assert_eq!(body["roles"][0]["name"], "Inspector");
    }

    #[actix_web::test]
    async fn deletion_with_members_shows_confirmation() {
        let mut roles = MockRoleAdministration::new();
        roles.expect_request_role_deletion().returning(|_| {
            Ok(RoleDeletion::ConfirmationRequired(RoleMembers {
                role_name: "Inspector".into(),
                members: vec![member("ada")],
                notice: Notice::info(
                    "You have to remove all the user from Inspector role before deleting it",
                ),
            }))
        });
        let app = actix_test::init_service(test_app(state(roles), configure)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/v1/roles/{}/delete", RoleId::random()))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["roleName"], "Inspector");
        assert_eq!(body["members"][0]["userName"], "ada");
        assert_eq!(body["notice"]["kind"], "info");
    }

    #[actix_web::test]
    async fn refused_deletion_redirects_to_list() {
        let mut roles = MockRoleAdministration::new();
        roles
            .expect_confirm_role_deletion()
            .withf(|name, remove| name == "Administrator" && *remove)
            .returning(|name, _| {
                Ok(RoleDeletion::Refused(Notice::danger(format!(
                    "You cannot delete {name} role"
                ))))
            });
        let app = actix_test::init_service(test_app(state(roles), configure)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/roles/delete")
                .set_json(json!({
                    "roleName": "Administrator",
                    "removeAllUsersFromRole": true
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&res), Some(ROLES_PATH));
    }

    #[actix_web::test]
    async fn confirmation_flag_defaults_to_false() {
        let mut roles = MockRoleAdministration::new();
        roles
            .expect_confirm_role_deletion()
            .withf(|_, remove| !*remove)
            .returning(|name, _| {
                Ok(RoleDeletion::ConfirmationRequired(RoleMembers {
                    role_name: name.to_owned(),
                    members: Vec::new(),
                    notice: Notice::danger(
                        "You have to remove all the users from this role before deleting it",
                    ),
                }))
            });
        let app = actix_test::init_service(test_app(state(roles), configure)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/roles/delete")
                .set_json(json!({ "roleName": "Inspector" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn add_member_redirects_to_membership() {
        let role = RoleId::random();
        let user = UserId::random();
        let mut roles = MockRoleAdministration::new();
        roles
            .expect_add_user_to_role()
            .withf(move |id, member| *id == role && *member == user)
            .returning(|_, _| Ok(Notice::success("User added to Inspector Role successfully")));
        let app = actix_test::init_service(test_app(state(roles), configure)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/v1/roles/{role}/users"))
                .set_json(json!({ "userId": user.to_string() }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        let expected = format!("/api/v1/roles/{role}/users");
        assert_eq!(location(&res), Some(expected.as_str()));
    }

    #[actix_web::test]
    async fn malformed_member_id_is_bad_request() {
        let app =
            actix_test::init_service(test_app(state(MockRoleAdministration::new()), configure))
                .await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!(
                    "/api/v1/roles/{}/users/not-a-uuid/remove",
                    RoleId::random()
                ))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["details"]["field"], "userId");
    }
}
