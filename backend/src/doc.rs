//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every maintenance endpoint plus the health checks.
//! Request and response bodies are collected from the path annotations;
//! the shared error and notice types are listed explicitly so they appear
//! even when no path references them directly.
//!
//! The generated specification is served by Swagger UI in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode, Notice, NoticeKind};

/// Document the session cookie that carries flash notices.
struct SessionCookieAddon;

impl Modify for SessionCookieAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Private cookie carrying the one-shot notice set by the last mutation.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SessionCookieAddon),
    info(
        title = "Farm administration API",
        description = "Maintenance of farms, provinces, roles and user accounts."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::farms::list_farms,
        crate::inbound::http::farms::farm_form_options,
        crate::inbound::http::farms::create_farm,
        crate::inbound::http::farms::get_farm,
        crate::inbound::http::farms::edit_farm,
        crate::inbound::http::farms::farm_deletion_preview,
        crate::inbound::http::farms::delete_farm,
        crate::inbound::http::provinces::check_province_code,
        crate::inbound::http::roles::list_roles,
        crate::inbound::http::roles::create_role,
        crate::inbound::http::roles::request_role_deletion,
        crate::inbound::http::roles::confirm_role_deletion,
        crate::inbound::http::roles::role_membership,
        crate::inbound::http::roles::add_role_member,
        crate::inbound::http::roles::remove_role_member,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::toggle_lock,
        crate::inbound::http::users::issue_password_reset,
        crate::inbound::http::users::reset_password,
        crate::inbound::http::users::user_deletion_preview,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(Error, ErrorCode, Notice, NoticeKind)),
    tags(
        (name = "farms", description = "Farm maintenance"),
        (name = "provinces", description = "Province code checks"),
        (name = "roles", description = "Role and membership maintenance"),
        (name = "users", description = "User account maintenance"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the registered paths and shared schemas.

    use super::*;
    use crate::inbound::http::farms::{FarmFormOptions, FarmListView};
    use crate::inbound::http::roles::{CreateRoleRequest, RoleListView};
    use crate::inbound::http::users::UserListView;
    use rstest::rstest;
    use utoipa::PartialSchema;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    fn field_description(schema: &RefOr<Schema>, field: &str) -> Option<String> {
        let RefOr::T(Schema::Object(obj)) = schema else {
            panic!("expected Object schema");
        };
        match obj.properties.get(field)? {
            RefOr::T(Schema::Array(array)) => array.description.clone(),
            RefOr::T(Schema::Object(inner)) => inner.description.clone(),
            _ => None,
        }
    }

    #[rstest]
    #[case::farm_list(FarmListView::schema(), "farms")]
    #[case::farm_options(FarmFormOptions::schema(), "provinces")]
    #[case::role_list(RoleListView::schema(), "roles")]
    #[case::user_list(UserListView::schema(), "users")]
    #[case::role_request(CreateRoleRequest::schema(), "roleName")]
    fn view_fields_carry_descriptions(#[case] schema: RefOr<Schema>, #[case] field: &str) {
        let description = field_description(&schema, field);
        assert!(
            description.is_some_and(|text| !text.is_empty()),
            "{field} should be described"
        );
    }

    #[rstest]
    #[case("/api/v1/farms")]
    #[case("/api/v1/farms/{id}/delete")]
    #[case("/api/v1/provinces/check")]
    #[case("/api/v1/roles/delete")]
    #[case("/api/v1/roles/{id}/users/{userId}/remove")]
    #[case("/api/v1/users/{id}/password-reset")]
    #[case("/health/ready")]
    fn documented_paths_are_registered(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(
            doc.paths.paths.contains_key(path),
            "missing path {path}"
        );
    }

    #[rstest]
    fn error_schema_has_code_and_message() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get("Error").expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "message");
    }

    #[rstest]
    fn notice_schema_is_registered() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        assert!(schemas.contains_key("Notice"));
        assert!(schemas.contains_key("NoticeKind"));
    }
}
