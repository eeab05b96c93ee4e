//! Shared helpers for HTTP integration tests running on the in-memory store.
//!
//! The app mirrors the production wiring: trace middleware, the extractor
//! error handlers and a private session cookie scoped to `/api/v1`.

#![allow(dead_code, reason = "each journey file uses a subset of the helpers")]

use std::sync::Arc;

use actix_http::Request;
use actix_session::SessionMiddleware;
use actix_session::config::CookieContentSecurity;
use actix_session::storage::CookieSessionStore;
use actix_web::cookie::{Cookie, Key, SameSite};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::header;
use actix_web::{App, body::BoxBody, test as actix_test, web};
use farm_backend::Trace;
use farm_backend::domain::{
    FarmService, ProtectedRoles, RoleService, UserAccount, UserAdminService, UserId,
};
use farm_backend::inbound::http::configure_api;
use farm_backend::inbound::http::error::{json_error_handler, query_error_handler};
use farm_backend::inbound::http::state::HttpState;
use farm_backend::outbound::memory::MemoryStore;
use mockable::DefaultClock;
use serde_json::Value;

/// Store plus the HTTP state built over it.
pub struct Backend {
    pub store: Arc<MemoryStore>,
    pub state: web::Data<HttpState>,
}

/// Seeded in-memory backend protecting `protected`.
pub fn backend(protected: &str) -> Backend {
    let store = Arc::new(MemoryStore::seeded());
    let protected = ProtectedRoles::parse(protected);
    for role in protected.iter() {
        store.insert_role(role).expect("protected role seeded");
    }
    let state = HttpState::new(
        Arc::new(FarmService::new(
            store.clone(),
            store.clone(),
            Arc::new(DefaultClock),
        )),
        Arc::new(RoleService::new(
            store.clone(),
            store.clone(),
            protected.clone(),
        )),
        Arc::new(UserAdminService::new(store.clone(), protected)),
    );
    Backend {
        store,
        state: web::Data::new(state),
    }
}

/// Register an account with local sign-in only.
pub fn add_user(store: &MemoryStore, user_name: &str, roles: &[&str]) -> UserId {
    let id = UserId::random();
    store
        .insert_user(UserAccount {
            id,
            email: format!("{user_name}@farms.example"),
            user_name: user_name.to_owned(),
            lockout_enabled: false,
            lockout_end: None,
            external_logins: Vec::new(),
            roles: roles.iter().map(|role| (*role).to_owned()).collect(),
        })
        .expect("user stored");
    id
}

/// Initialise the application service.
pub async fn init_app(
    state: web::Data<HttpState>,
) -> impl Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error> {
    let session = SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_path("/".to_owned())
        .cookie_secure(false)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(SameSite::Lax)
        .build();

    actix_test::init_service(
        App::new()
            .app_data(state)
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .wrap(Trace)
            .service(web::scope("/api/v1").wrap(session).configure(configure_api)),
    )
    .await
}

/// Status, JSON body and session cookie of a response.
#[derive(Debug)]
pub struct Snapshot {
    pub status: u16,
    pub location: Option<String>,
    pub body: Option<Value>,
    pub cookie: Option<Cookie<'static>>,
}

/// Send `request` and capture the parts the journeys assert on.
pub async fn send<S>(app: &S, request: Request) -> Snapshot
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let res = actix_test::call_service(app, request).await;
    let status = res.status().as_u16();
    let location = res
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let cookie = res
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned);
    let bytes = actix_test::read_body(res).await;
    let body = if bytes.is_empty() {
        None
    } else {
        Some(serde_json::from_slice(&bytes).expect("json body"))
    };
    Snapshot {
        status,
        location,
        body,
        cookie,
    }
}

/// Follow a `303` redirect, presenting the session cookie it set.
pub async fn follow<S>(app: &S, redirect: &Snapshot) -> Snapshot
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    assert_eq!(redirect.status, 303, "expected a redirect: {redirect:?}");
    let location = redirect.location.as_deref().expect("location header");
    let mut request = actix_test::TestRequest::get().uri(location);
    if let Some(cookie) = &redirect.cookie {
        request = request.cookie(cookie.clone());
    }
    send(app, request.to_request()).await
}

/// Message of the notice carried by a view body.
pub fn notice_message(body: &Value) -> Option<&str> {
    body.get("notice")?.get("message")?.as_str()
}

/// Kind of the notice carried by a view body.
pub fn notice_kind(body: &Value) -> Option<&str> {
    body.get("notice")?.get("kind")?.as_str()
}
