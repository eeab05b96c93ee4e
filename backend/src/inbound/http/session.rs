//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! The session cookie carries one-shot [`Notice`]s across the `303 See Other`
//! that follows every mutation. List and view handlers take the notice so it
//! is shown exactly once.

use actix_session::Session;
use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Error, Notice};

pub(crate) const NOTICE_KEY: &str = "notice";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Store a notice for the next view, replacing any pending one.
    pub fn push_notice(&self, notice: &Notice) -> Result<(), Error> {
        self.0
            .insert(NOTICE_KEY, notice)
            .map_err(|error| Error::internal(format!("failed to persist notice: {error}")))
    }

    /// Remove and return the pending notice.
    ///
    /// A notice that no longer deserialises is dropped rather than failing
    /// the view.
    pub fn take_notice(&self) -> Option<Notice> {
        match self.0.remove_as::<Notice>(NOTICE_KEY) {
            Some(Ok(notice)) => Some(notice),
            Some(Err(raw)) => {
                warn!(raw = %raw, "discarding unreadable notice in session cookie");
                None
            }
            None => None,
        }
    }

    /// Store `notice` and redirect to `location` with `303 See Other`.
    pub fn redirect_with_notice(
        &self,
        location: impl Into<String>,
        notice: &Notice,
    ) -> Result<HttpResponse, Error> {
        self.push_notice(notice)?;
        Ok(see_other(location))
    }
}

/// `303 See Other` pointing at `location`.
pub fn see_other(location: impl Into<String>) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location.into()))
        .finish()
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test, web};

    use crate::inbound::http::test_utils::{session_cookie, test_session_middleware};

    #[actix_web::test]
    async fn notice_survives_redirect_once() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route(
                    "/mutate",
                    web::post().to(|session: SessionContext| async move {
                        session.redirect_with_notice("/view", &Notice::success("done"))
                    }),
                )
                .route(
                    "/view",
                    web::get().to(|session: SessionContext| async move {
                        HttpResponse::Ok().json(session.take_notice())
                    }),
                ),
        )
        .await;

        let res =
            test::call_service(&app, test::TestRequest::post().uri("/mutate").to_request()).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            res.headers()
                .get(header::LOCATION)
                .and_then(|value| value.to_str().ok()),
            Some("/view")
        );
        let cookie = session_cookie(&res);

        let first = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/view")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let cleared = session_cookie(&first);
        let notice: Option<Notice> = test::read_body_json(first).await;
        assert_eq!(notice, Some(Notice::success("done")));

        let second = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/view")
                .cookie(cleared)
                .to_request(),
        )
        .await;
        let notice: Option<Notice> = test::read_body_json(second).await;
        assert_eq!(notice, None);
    }

    #[actix_web::test]
    async fn unreadable_notice_is_dropped() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route(
                    "/corrupt",
                    web::get().to(|session: Session| async move {
                        session
                            .insert(NOTICE_KEY, 42)
                            .expect("insert corrupt notice");
                        HttpResponse::Ok().finish()
                    }),
                )
                .route(
                    "/view",
                    web::get().to(|session: SessionContext| async move {
                        HttpResponse::Ok().json(session.take_notice())
                    }),
                ),
        )
        .await;

        let res =
            test::call_service(&app, test::TestRequest::get().uri("/corrupt").to_request()).await;
        let cookie = session_cookie(&res);
        let view = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/view")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let notice: Option<Notice> = test::read_body_json(view).await;
        assert_eq!(notice, None);
    }
}
