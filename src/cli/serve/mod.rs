//! Development server that purges HTML responses on the fly.

mod lifecycle;
mod path;
mod response;

pub use response::HttpSink;

use crate::{
    config::{AppConfig, cfg},
    debug, log,
};
use anyhow::{Context, Result};
use crossbeam::channel;
use std::sync::Arc;
use tiny_http::{Request, Server};

/// Bound server ready to accept requests
pub struct BoundServer {
    server: Arc<Server>,
}

/// Bind the HTTP server without starting the request loop
pub fn bind_server() -> Result<BoundServer> {
    let config = cfg();
    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);

    lifecycle::register_server_for_shutdown(Arc::clone(&server));

    log!("serve"; "http://{}", addr);
    debug!("serve"; "root {}", config.serve.root.display());

    Ok(BoundServer { server })
}

impl BoundServer {
    /// Start the request loop (blocking until shutdown).
    pub fn run(self) -> Result<()> {
        run_request_loop(&self.server)
    }
}

fn run_request_loop(server: &Server) -> Result<()> {
    let config = cfg();
    // Each request gets its own task and its own interceptor
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .build()
        .context("failed to create thread pool")?;

    let (in_flight, drained) = channel::unbounded::<()>();

    for request in server.incoming_requests() {
        let config = Arc::clone(&config);
        let in_flight = in_flight.clone();
        pool.spawn(move || {
            let _in_flight = in_flight;
            if let Err(e) = handle_request(request, &config) {
                log!("serve"; "request error: {e:#}");
            }
        });
    }

    drop(in_flight);
    lifecycle::wait_for_in_flight(&drained);
    Ok(())
}

/// Handle a single HTTP request
fn handle_request(request: Request, config: &AppConfig) -> Result<()> {
    if crate::core::is_shutdown() {
        return response::respond_unavailable(request);
    }

    debug!("serve"; "{} {}", request.method(), request.url());

    match path::resolve_path(request.url(), &config.serve.root) {
        Some(path) => response::respond_file(request, &path, &config.purge),
        None => response::respond_not_found(request, config),
    }
}

#[cfg(test)]
mod tests;
