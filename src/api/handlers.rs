// Endpoint handlers
//
// Every handler is a free function registered into the router by pointer.
// Handlers are stateless; the only ambient inputs are the clock and the
// server start instant carried by `AppState`.

use crate::api::response;
use crate::api::types::{EndpointMap, HealthStatus, ServerError, ServiceInfo, TestEcho, Unhealthy};
use crate::config::AppState;
use crate::error::RequestFault;
use crate::logger;
use crate::middleware::RequestContext;
use chrono::{SecondsFormat, Utc};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

/// Version string advertised by the root endpoint.
const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// ISO-8601 timestamp with millisecond precision, UTC.
fn iso_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `GET /` - service description and endpoint map.
pub fn root(_ctx: &RequestContext, _state: &AppState) -> Result<Response<Full<Bytes>>, RequestFault> {
    Ok(response::json(
        StatusCode::OK,
        &ServiceInfo {
            message: "Welcome to the API server",
            version: SERVICE_VERSION,
            endpoints: EndpointMap {
                test: "/test",
                health: "/health",
            },
        },
    ))
}

/// `GET /test` - echoes method, path and current timestamp.
///
/// Faults are caught at the handler boundary and converted to a fixed 500
/// envelope; the fault detail only reaches the server-side log.
pub fn test(ctx: &RequestContext, _state: &AppState) -> Result<Response<Full<Bytes>>, RequestFault> {
    match build_test_echo(ctx) {
        Ok(resp) => Ok(resp),
        Err(fault) => {
            logger::log_error(&format!("test handler fault: {fault}"));
            Ok(response::json(
                StatusCode::INTERNAL_SERVER_ERROR,
                &ServerError {
                    error: "Internal server error",
                    message: "Something went wrong while processing your request",
                },
            ))
        }
    }
}

fn build_test_echo(ctx: &RequestContext) -> Result<Response<Full<Bytes>>, RequestFault> {
    response::try_json(
        StatusCode::OK,
        &TestEcho {
            message: "Test endpoint is working",
            timestamp: iso_timestamp(),
            method: ctx.method.to_string(),
            url: ctx.path.clone(),
        },
    )
}

/// `GET /health` - liveness probe with process uptime.
pub fn health(
    _ctx: &RequestContext,
    state: &AppState,
) -> Result<Response<Full<Bytes>>, RequestFault> {
    match build_health_status(state) {
        Ok(resp) => Ok(resp),
        Err(fault) => {
            logger::log_error(&format!("health check fault: {fault}"));
            Ok(response::json(
                StatusCode::INTERNAL_SERVER_ERROR,
                &Unhealthy {
                    status: "unhealthy",
                    error: "Health check failed",
                },
            ))
        }
    }
}

fn build_health_status(state: &AppState) -> Result<Response<Full<Bytes>>, RequestFault> {
    response::try_json(
        StatusCode::OK,
        &HealthStatus {
            status: "healthy",
            timestamp: iso_timestamp(),
            uptime: state.uptime(),
        },
    )
}
