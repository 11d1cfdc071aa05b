// Main entry point.
// Loads configuration, builds the tokio runtime, and runs the server until
// a termination signal arrives. `--check-config` (or `-t`) validates the
// configuration and exits without serving, for use as a deployment gate.

mod api;
mod config;
mod error;
mod logger;
mod middleware;
mod router;
mod server;

use std::sync::Arc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let check_only = std::env::args()
        .skip(1)
        .any(|arg| arg == "--check-config" || arg == "-t");

    let cfg = config::Config::load_from("config")?;

    if check_only {
        return check_config(&cfg);
    }

    logger::init(&cfg)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg)).map_err(|e| -> Box<dyn std::error::Error> { e })
}

/// Validate configuration and listen address, nginx `-t` style.
/// Any failure propagates to a non-zero process exit.
fn check_config(cfg: &config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.socket_addr()?;

    println!("Configuration test:");
    println!("  Listen address: {addr}");
    match cfg.server.workers {
        Some(workers) => println!("  Worker threads: {workers}"),
        None => println!("  Worker threads: default (CPU cores)"),
    }
    println!("  Access log: {}", cfg.logging.access_log);
    println!("  Access log format: {}", cfg.logging.access_log_format);
    println!("Configuration test is successful");
    Ok(())
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let srv = server::Server::bind(cfg, router::Router::with_service_routes())?;
    let addr = srv.local_addr()?;
    let state = srv.state();
    logger::log_server_start(&addr, &state.config);

    let signals = Arc::new(server::SignalHandler::new());
    server::start_signal_handler(Arc::clone(&signals));

    Ok(srv.run(Arc::clone(&signals.shutdown)).await?)
}
