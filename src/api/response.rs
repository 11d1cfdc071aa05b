// JSON response builders

use crate::api::types::{RouteNotFound, ServerError};
use crate::error::RequestFault;
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;

/// Canned body used when even the fallback envelope cannot be built.
const FALLBACK_BODY: &str = r#"{"error":"Internal server error"}"#;

/// Build a JSON response, surfacing serialization/build failures to the caller.
pub fn try_json<T: Serialize>(
    status: StatusCode,
    body: &T,
) -> Result<Response<Full<Bytes>>, RequestFault> {
    let json = serde_json::to_string(body)?;
    let response = Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(json)))?;
    Ok(response)
}

/// Build a JSON response, falling back to a canned 500 body on failure.
///
/// Used on paths that must always produce a response (fallbacks, terminal
/// error handling), where propagating a build failure has nowhere to go.
pub fn json<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    try_json(status, body).unwrap_or_else(|e| {
        logger::log_error(&format!("Failed to build response: {e}"));
        let mut response = Response::new(Full::new(Bytes::from(FALLBACK_BODY)));
        *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        response
    })
}

/// 404 Not Found envelope listing the registered routes.
pub fn not_found(path: &str, available_routes: Vec<&'static str>) -> Response<Full<Bytes>> {
    json(
        StatusCode::NOT_FOUND,
        &RouteNotFound {
            error: "Route not found",
            message: format!("The requested route {path} does not exist"),
            available_routes,
        },
    )
}

/// Generic 500 envelope produced by the terminal error handler.
pub fn internal_error() -> Response<Full<Bytes>> {
    json(
        StatusCode::INTERNAL_SERVER_ERROR,
        &ServerError {
            error: "Internal server error",
            message: "Something went wrong on the server",
        },
    )
}

/// Generic 400 envelope for unparseable request bodies.
pub fn bad_request() -> Response<Full<Bytes>> {
    json(
        StatusCode::BAD_REQUEST,
        &ServerError {
            error: "Bad request",
            message: "Malformed request body",
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response<Full<Bytes>>) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_json_sets_status_and_content_type() {
        let response = json(StatusCode::OK, &serde_json::json!({"ok": true}));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("Content-Type").unwrap(),
            "application/json"
        );
        let body = body_json(response).await;
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn test_not_found_lists_routes() {
        let response = not_found("/missing", vec!["/", "/test", "/health"]);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Route not found");
        assert_eq!(
            body["message"],
            "The requested route /missing does not exist"
        );
        assert_eq!(
            body["availableRoutes"],
            serde_json::json!(["/", "/test", "/health"])
        );
    }

    #[tokio::test]
    async fn test_internal_error_is_generic() {
        let response = internal_error();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Internal server error");
        assert_eq!(body["message"], "Something went wrong on the server");
    }
}
