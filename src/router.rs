//! Route table and dispatch
//!
//! Exact-match dispatch on (method, path) pairs. No patterns, no path
//! parameters. The table is built explicitly at startup and owned by the
//! application state; an unmatched request is a normal outcome that the
//! middleware chain turns into the 404 envelope.

use crate::api::handlers;
use crate::config::AppState;
use crate::error::RequestFault;
use crate::middleware::RequestContext;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Response};

/// Handler function registered for a route.
pub type HandlerFn = fn(&RequestContext, &AppState) -> Result<Response<Full<Bytes>>, RequestFault>;

/// A single (method, path) -> handler registration.
struct Route {
    method: Method,
    path: &'static str,
    handler: HandlerFn,
}

/// Exact-match route table.
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Register a handler for a (method, path) pair.
    pub fn register(&mut self, method: Method, path: &'static str, handler: HandlerFn) {
        self.routes.push(Route {
            method,
            path,
            handler,
        });
    }

    /// The route table for this service.
    pub fn with_service_routes() -> Self {
        let mut router = Self::new();
        router.register(Method::GET, "/", handlers::root);
        router.register(Method::GET, "/test", handlers::test);
        router.register(Method::GET, "/health", handlers::health);
        router
    }

    /// Find the handler registered for the given method and path.
    /// Exact string equality only.
    pub fn lookup(&self, method: &Method, path: &str) -> Option<HandlerFn> {
        self.routes
            .iter()
            .find(|route| route.method == *method && route.path == path)
            .map(|route| route.handler)
    }

    /// Registered paths in registration order, for the 404 envelope.
    pub fn paths(&self) -> Vec<&'static str> {
        self.routes.iter().map(|route| route.path).collect()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_exact_match() {
        let router = Router::with_service_routes();
        assert!(router.lookup(&Method::GET, "/").is_some());
        assert!(router.lookup(&Method::GET, "/test").is_some());
        assert!(router.lookup(&Method::GET, "/health").is_some());
    }

    #[test]
    fn test_lookup_rejects_wrong_method() {
        let router = Router::with_service_routes();
        assert!(router.lookup(&Method::POST, "/test").is_none());
        assert!(router.lookup(&Method::DELETE, "/health").is_none());
    }

    #[test]
    fn test_lookup_is_not_prefix_match() {
        let router = Router::with_service_routes();
        assert!(router.lookup(&Method::GET, "/test/").is_none());
        assert!(router.lookup(&Method::GET, "/testing").is_none());
        assert!(router.lookup(&Method::GET, "/health/live").is_none());
    }

    #[test]
    fn test_paths_in_registration_order() {
        let router = Router::with_service_routes();
        assert_eq!(router.paths(), vec!["/", "/test", "/health"]);
    }
}
