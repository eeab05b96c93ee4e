//! Liveness and readiness checks.
//!
//! Both checks answer with a small JSON report naming the storage backend so an
//! operator can tell at a glance whether the server fell back to the
//! in-memory store.

use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{HttpResponse, get, http::header, web};
use serde::Serialize;
use utoipa::ToSchema;

/// Storage the server was started with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// PostgreSQL through the Diesel adapters.
    Postgres,
    /// Process-local in-memory adapters.
    Memory,
}

/// Lifecycle phase reported by the health checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Accepting traffic.
    Ok,
    /// Still starting up.
    Starting,
    /// Shutting down.
    Draining,
}

/// Body returned by both checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    /// Lifecycle phase of the server.
    pub status: HealthStatus,
    /// Store backing the administration services.
    pub storage: StorageBackend,
}

/// Shared readiness and liveness flags.
#[derive(Debug)]
pub struct HealthState {
    ready: AtomicBool,
    live: AtomicBool,
    storage: StorageBackend,
}

impl HealthState {
    /// Create a state that is live but not yet ready.
    pub fn new(storage: StorageBackend) -> Self {
        Self {
            ready: AtomicBool::new(false),
            live: AtomicBool::new(true),
            storage,
        }
    }

    /// Mark the service as ready.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Fail liveness checks from now on, e.g. while draining.
    pub fn mark_unhealthy(&self) {
        self.live.store(false, Ordering::Release);
    }

    /// Return readiness state.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Return liveness state.
    pub fn is_alive(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    /// Storage backend in use.
    pub fn storage(&self) -> StorageBackend {
        self.storage
    }

    fn check_response(&self, healthy: bool, failing: HealthStatus) -> HttpResponse {
        let (mut response, status) = if healthy {
            (HttpResponse::Ok(), HealthStatus::Ok)
        } else {
            (HttpResponse::ServiceUnavailable(), failing)
        };
        response
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .json(HealthReport {
                status,
                storage: self.storage,
            })
    }
}

/// Readiness check. 200 once the server is bound, 503 before.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    responses(
        (status = 200, description = "Server is ready to handle traffic", body = HealthReport),
        (status = 503, description = "Server is not ready", body = HealthReport)
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    state.check_response(state.is_ready(), HealthStatus::Starting)
}

/// Liveness check. 200 while alive, 503 once draining.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    responses(
        (status = 200, description = "Server is alive", body = HealthReport),
        (status = 503, description = "Server is shutting down", body = HealthReport)
    )
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    state.check_response(state.is_alive(), HealthStatus::Draining)
}
