use serde::Serialize;
use utoipa::ToSchema;

/// Health payload returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// Presenter sessions currently open in this process.
    pub open_sessions: usize,
}

impl HealthResponse {
    /// Storage is reachable.
    pub fn ok(open_sessions: usize) -> Self {
        Self {
            status: "ok".to_string(),
            open_sessions,
        }
    }

    /// Storage is unreachable; storage-backed routes answer 503.
    pub fn degraded(open_sessions: usize) -> Self {
        Self {
            status: "degraded".to_string(),
            open_sessions,
        }
    }
}
