//! Farm administration backend: farms, provinces, roles and user accounts.
//!
//! The crate is laid out hexagonally. `domain` holds entities, validation,
//! services and ports; `inbound::http` adapts Actix Web requests onto the
//! driving ports; `outbound` provides the Diesel and in-memory adapters for
//! the driven ports.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
