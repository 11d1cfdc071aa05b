// Application state
// Immutable per-process state shared by all connections.

use crate::config::Config;
use crate::router::Router;
use std::time::Instant;

/// State constructed once at startup and shared read-only across requests.
pub struct AppState {
    pub config: Config,
    pub router: Router,
    started_at: Instant,
}

impl AppState {
    pub fn new(config: Config, router: Router) -> Self {
        Self {
            config,
            router,
            started_at: Instant::now(),
        }
    }

    /// Seconds since this state was created, i.e. process uptime as far as
    /// the service is concerned. Monotonic within one server lifetime.
    pub fn uptime(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }
}
