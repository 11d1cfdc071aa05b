//! Middleware chain
//!
//! Entry point for HTTP request processing. Interceptors run in registration
//! order: body parsing, CORS (with OPTIONS short-circuit), route dispatch,
//! the 404 fallback, and the terminal error handler. Every response leaving
//! the chain carries the CORS headers.

pub mod body;
pub mod cors;

use crate::api::response;
use crate::config::AppState;
use crate::error::RequestFault;
use crate::logger;
use crate::logger::AccessLogEntry;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{Method, Request, Response, StatusCode, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

/// Per-request context handed to handlers.
///
/// Created at request arrival, dropped after the response is sent; nothing
/// outlives the request.
pub struct RequestContext {
    pub method: Method,
    pub path: String,
    /// Parsed body for declared JSON/form content types, `None` otherwise.
    pub body: Option<serde_json::Value>,
}

/// Serve one request and emit the access log entry.
///
/// This is the function wired into hyper's connection service; `dispatch`
/// below is the logging-free chain that tests drive directly.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: hyper::body::Body,
    B::Error: std::fmt::Display,
{
    let started = std::time::Instant::now();

    let mut entry = AccessLogEntry::new(
        remote_addr.to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = version_label(req.version()).to_string();
    entry.referer = header_string(&req, "referer");
    entry.user_agent = header_string(&req, "user-agent");

    let response = dispatch(req, &state).await;

    if state.config.logging.access_log {
        entry.status = response.status().as_u16();
        entry.body_bytes = response_body_bytes(&response);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Run a request through the middleware chain.
///
/// Total: every outcome, including faults, becomes a JSON response with
/// CORS headers applied.
pub async fn dispatch<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: hyper::body::Body,
    B::Error: std::fmt::Display,
{
    // OPTIONS preflight short-circuits before body parsing so it always
    // succeeds regardless of payload.
    if req.method() == Method::OPTIONS {
        return cors::preflight();
    }

    let ctx = match read_context(req).await {
        Ok(ctx) => ctx,
        Err(fault) => return cors::apply(fault_response(&fault)),
    };

    let response = match state.router.lookup(&ctx.method, &ctx.path) {
        Some(handler) => match handler(&ctx, state) {
            Ok(response) => response,
            Err(fault) => fault_response(&fault),
        },
        None => response::not_found(&ctx.path, state.router.paths()),
    };

    cors::apply(response)
}

/// Collect the body and build the request context (body-parsing step).
async fn read_context<B>(req: Request<B>) -> Result<RequestContext, RequestFault>
where
    B: hyper::body::Body,
    B::Error: std::fmt::Display,
{
    let (parts, body_stream) = req.into_parts();

    let bytes = body_stream
        .collect()
        .await
        .map_err(|e| RequestFault::MalformedBody(format!("failed to read request body: {e}")))?
        .to_bytes();

    let parsed = body::parse(parts.headers.get(hyper::header::CONTENT_TYPE), &bytes)?;

    Ok(RequestContext {
        method: parts.method,
        path: parts.uri.path().to_string(),
        body: parsed,
    })
}

/// Terminal error handler: log the fault with full detail, answer with a
/// generic envelope only.
fn fault_response(fault: &RequestFault) -> Response<Full<Bytes>> {
    logger::log_error(&format!("request fault: {fault}"));
    if fault.status() == StatusCode::BAD_REQUEST {
        response::bad_request()
    } else {
        response::internal_error()
    }
}

fn header_string<B>(req: &Request<B>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        _ => "1.1",
    }
}

fn response_body_bytes(response: &Response<Full<Bytes>>) -> usize {
    usize::try_from(
        hyper::body::Body::size_hint(response.body())
            .exact()
            .unwrap_or(0),
    )
    .unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::router::Router;

    fn test_state() -> AppState {
        AppState::new(Config::for_tests(), Router::with_service_routes())
    }

    fn request(method: Method, path: &str) -> Request<Full<Bytes>> {
        Request::builder()
            .method(method)
            .uri(path)
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    fn request_with_body(
        method: Method,
        path: &str,
        content_type: &str,
        body: &str,
    ) -> Request<Full<Bytes>> {
        Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", content_type)
            .body(Full::new(Bytes::from(body.to_string())))
            .unwrap()
    }

    async fn into_json(response: Response<Full<Bytes>>) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn assert_cors_headers(response: &Response<Full<Bytes>>) {
        let headers = response.headers();
        assert_eq!(headers.get("Access-Control-Allow-Origin").unwrap(), "*");
        assert_eq!(
            headers.get("Access-Control-Allow-Methods").unwrap(),
            "GET, POST, PUT, DELETE, OPTIONS"
        );
        assert_eq!(
            headers.get("Access-Control-Allow-Headers").unwrap(),
            "Origin, X-Requested-With, Content-Type, Accept, Authorization"
        );
    }

    #[tokio::test]
    async fn test_root_returns_service_info() {
        let state = test_state();
        let response = dispatch(request(Method::GET, "/"), &state).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_cors_headers(&response);
        let body = into_json(response).await;
        assert_eq!(body["version"], "1.0.0");
        assert_eq!(body["endpoints"]["test"], "/test");
        assert_eq!(body["endpoints"]["health"], "/health");
    }

    #[tokio::test]
    async fn test_test_endpoint_echoes_request() {
        let state = test_state();
        let response = dispatch(request(Method::GET, "/test"), &state).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_cors_headers(&response);
        let body = into_json(response).await;
        assert_eq!(body["method"], "GET");
        assert_eq!(body["url"], "/test");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_health_reports_uptime() {
        let state = test_state();
        let first = into_json(dispatch(request(Method::GET, "/health"), &state).await).await;
        let second = into_json(dispatch(request(Method::GET, "/health"), &state).await).await;

        assert_eq!(first["status"], "healthy");
        let u1 = first["uptime"].as_f64().unwrap();
        let u2 = second["uptime"].as_f64().unwrap();
        assert!(u1 >= 0.0);
        assert!(u2 >= u1);
    }

    #[tokio::test]
    async fn test_unmatched_route_gets_404_with_route_list() {
        let state = test_state();
        let response = dispatch(request(Method::GET, "/nonexistent"), &state).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_cors_headers(&response);
        let body = into_json(response).await;
        assert_eq!(body["error"], "Route not found");
        assert_eq!(
            body["message"],
            "The requested route /nonexistent does not exist"
        );
        assert_eq!(
            body["availableRoutes"],
            serde_json::json!(["/", "/test", "/health"])
        );
    }

    #[tokio::test]
    async fn test_wrong_method_on_known_path_is_404() {
        let state = test_state();
        let response = dispatch(request(Method::POST, "/test"), &state).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_options_preflight_is_empty_200_anywhere() {
        let state = test_state();
        for path in ["/", "/test", "/health", "/whatever"] {
            let response = dispatch(request(Method::OPTIONS, path), &state).await;
            assert_eq!(response.status(), StatusCode::OK);
            assert_cors_headers(&response);
            let bytes = response.into_body().collect().await.unwrap().to_bytes();
            assert!(bytes.is_empty(), "preflight body not empty for {path}");
        }
    }

    #[tokio::test]
    async fn test_malformed_json_body_is_generic_400() {
        let state = test_state();
        let response = dispatch(
            request_with_body(Method::POST, "/test", "application/json", "{not json"),
            &state,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_cors_headers(&response);
        let body = into_json(response).await;
        assert_eq!(
            body,
            serde_json::json!({"error": "Bad request", "message": "Malformed request body"})
        );
    }

    #[tokio::test]
    async fn test_handler_fault_never_leaks_detail() {
        fn failing(
            _ctx: &RequestContext,
            _state: &AppState,
        ) -> Result<Response<Full<Bytes>>, RequestFault> {
            let err = serde_json::from_str::<serde_json::Value>("{boom").unwrap_err();
            Err(RequestFault::ResponseEncoding(err))
        }

        let mut router = Router::new();
        router.register(Method::GET, "/fragile", failing);
        let state = AppState::new(Config::for_tests(), router);

        let response = dispatch(request(Method::GET, "/fragile"), &state).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_cors_headers(&response);
        let body = into_json(response).await;
        assert_eq!(
            body,
            serde_json::json!({
                "error": "Internal server error",
                "message": "Something went wrong on the server"
            })
        );
    }

    #[tokio::test]
    async fn test_repeated_get_is_idempotent_up_to_timestamp() {
        let state = test_state();
        let mut first = into_json(dispatch(request(Method::GET, "/test"), &state).await).await;
        let mut second = into_json(dispatch(request(Method::GET, "/test"), &state).await).await;

        first.as_object_mut().unwrap().remove("timestamp");
        second.as_object_mut().unwrap().remove("timestamp");
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_valid_json_body_reaches_handler() {
        fn echo_body(
            ctx: &RequestContext,
            _state: &AppState,
        ) -> Result<Response<Full<Bytes>>, RequestFault> {
            let body = ctx.body.clone().unwrap_or(serde_json::Value::Null);
            response::try_json(StatusCode::OK, &body)
        }

        let mut router = Router::new();
        router.register(Method::POST, "/echo", echo_body);
        let state = AppState::new(Config::for_tests(), router);

        let response = dispatch(
            request_with_body(Method::POST, "/echo", "application/json", r#"{"k":"v"}"#),
            &state,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = into_json(response).await;
        assert_eq!(body["k"], "v");
    }
}
