// Response envelope types
// One explicit struct per response shape; no free-form maps.

use serde::Serialize;

/// Envelope for `GET /` describing the service and its endpoints.
#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub message: &'static str,
    pub version: &'static str,
    pub endpoints: EndpointMap,
}

/// Known endpoint paths advertised by the root envelope.
#[derive(Debug, Serialize)]
pub struct EndpointMap {
    pub test: &'static str,
    pub health: &'static str,
}

/// Envelope for `GET /test` echoing request details.
#[derive(Debug, Serialize)]
pub struct TestEcho {
    pub message: &'static str,
    pub timestamp: String,
    pub method: String,
    pub url: String,
}

/// Envelope for `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub timestamp: String,
    /// Seconds since the server started. Fractional, never negative.
    pub uptime: f64,
}

/// Degraded health envelope, used when the health handler itself faults.
#[derive(Debug, Serialize)]
pub struct Unhealthy {
    pub status: &'static str,
    pub error: &'static str,
}

/// Envelope for unmatched routes.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteNotFound {
    pub error: &'static str,
    pub message: String,
    pub available_routes: Vec<&'static str>,
}

/// Generic error envelope. Never carries internal fault detail.
#[derive(Debug, Serialize)]
pub struct ServerError {
    pub error: &'static str,
    pub message: &'static str,
}
