//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::header;
use actix_web::{App, web};

use crate::domain::ports::{
    MockFarmAdministration, MockRoleAdministration, MockUserAdministration,
};
use crate::inbound::http::error::{json_error_handler, query_error_handler};
use crate::inbound::http::state::HttpState;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Session cookie set by `res`.
///
/// # Panics
/// When the response does not set the cookie.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie")
}

/// `Location` header of a redirect.
pub fn location<B>(res: &ServiceResponse<B>) -> Option<&str> {
    res.headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
}

/// Shared state over mocked driving ports.
pub fn mocked_state(
    farms: MockFarmAdministration,
    roles: MockRoleAdministration,
    users: MockUserAdministration,
) -> HttpState {
    HttpState::new(Arc::new(farms), Arc::new(roles), Arc::new(users))
}

/// App mounting `configure` under `/api/v1` with the production extractor
/// error handlers and a test session.
pub fn test_app(
    state: HttpState,
    configure: fn(&mut web::ServiceConfig),
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .wrap(test_session_middleware())
        .service(web::scope("/api/v1").configure(configure))
}
