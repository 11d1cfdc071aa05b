// Server module entry point
//
// An explicit server value: construct with configuration and a route table,
// then run until told to shut down. No ambient globals.

pub mod connection;
pub mod listener;
pub mod signal;

pub use listener::create_reusable_listener;
pub use signal::{start_signal_handler, SignalHandler};

use crate::config::{AppState, Config};
use crate::logger;
use crate::router::Router;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Notify;

/// How long shutdown waits for in-flight connections to finish.
const DRAIN_DEADLINE: std::time::Duration = std::time::Duration::from_secs(5);

/// The HTTP server: a bound listener plus shared application state.
pub struct Server {
    listener: TcpListener,
    state: Arc<AppState>,
    active_connections: Arc<AtomicUsize>,
}

impl Server {
    /// Bind the configured address and assemble the application state.
    /// Must be called from within the tokio runtime.
    pub fn bind(
        config: Config,
        router: Router,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let addr = config.socket_addr()?;
        let listener = create_reusable_listener(addr)?;
        let state = Arc::new(AppState::new(config, router));
        Ok(Self {
            listener,
            state,
            active_connections: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// The address actually bound (resolves port 0 to the assigned port).
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Accept connections until the shutdown notification fires, then stop
    /// accepting and drain in-flight connections.
    pub async fn run(
        self,
        shutdown: Arc<Notify>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let Self {
            listener,
            state,
            active_connections,
        } = self;

        loop {
            tokio::select! {
                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((stream, peer_addr)) => {
                            connection::accept_connection(
                                stream,
                                peer_addr,
                                &state,
                                &active_connections,
                            );
                        }
                        Err(e) => {
                            logger::log_error(&format!("Failed to accept connection: {e}"));
                        }
                    }
                }

                () = shutdown.notified() => {
                    logger::log_shutdown_started();
                    break;
                }
            }
        }

        // Closing the listener stops new connections; in-flight ones finish
        // on their own tasks.
        drop(listener);
        drain_connections(&active_connections).await;
        logger::log_shutdown_complete();
        Ok(())
    }
}

/// Wait for active connections to reach zero, up to the drain deadline.
async fn drain_connections(active_connections: &Arc<AtomicUsize>) {
    let deadline = tokio::time::Instant::now() + DRAIN_DEADLINE;
    while active_connections.load(Ordering::SeqCst) > 0 {
        if tokio::time::Instant::now() >= deadline {
            logger::log_warning(&format!(
                "Drain deadline reached with {} connection(s) still active",
                active_connections.load(Ordering::SeqCst)
            ));
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn ephemeral_config() -> Config {
        let mut cfg = Config::for_tests();
        cfg.server.port = 0;
        cfg
    }

    #[tokio::test]
    async fn test_bind_reports_local_addr() {
        let server = Server::bind(ephemeral_config(), Router::with_service_routes()).unwrap();
        let addr = server.local_addr().unwrap();
        assert!(addr.port() > 0);
    }

    #[tokio::test]
    async fn test_serves_health_over_tcp_and_shuts_down() {
        let server = Server::bind(ephemeral_config(), Router::with_service_routes()).unwrap();
        let addr = server.local_addr().unwrap();
        let shutdown = Arc::new(Notify::new());
        let handle = tokio::spawn(server.run(Arc::clone(&shutdown)));

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut raw = Vec::new();
        stream.read_to_end(&mut raw).await.unwrap();
        let text = String::from_utf8_lossy(&raw).to_lowercase();

        assert!(text.starts_with("http/1.1 200"), "unexpected response: {text}");
        assert!(text.contains(r#""status":"healthy""#));
        assert!(text.contains("access-control-allow-origin: *"));

        shutdown.notify_one();
        tokio::time::timeout(std::time::Duration::from_secs(10), handle)
            .await
            .expect("server did not shut down")
            .unwrap()
            .unwrap();
    }
}
