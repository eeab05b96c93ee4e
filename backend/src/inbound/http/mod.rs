//! HTTP inbound adapter exposing the maintenance endpoints.

pub mod error;
pub mod farms;
pub mod health;
pub mod provinces;
pub mod roles;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub(crate) mod validation;

pub use error::ApiResult;

use actix_web::web;

/// Register every `/api/v1` route.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.configure(farms::configure)
        .configure(provinces::configure)
        .configure(roles::configure)
        .configure(users::configure);
}
