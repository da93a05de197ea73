//! Server lifecycle management.

use crate::{core::register_server, log};
use anyhow::Result;
use crossbeam::channel::{Receiver, RecvTimeoutError};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tiny_http::Server;

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

/// How long shutdown waits for in-flight responses.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Bind to the specified interface and port, with automatic port retry.
pub fn bind_with_retry(
    interface: std::net::IpAddr,
    base_port: u16,
) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;

    for offset in 0..MAX_PORT_RETRIES {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow::anyhow!(
        "Failed to bind after {} attempts (ports {}-{}): {}",
        MAX_PORT_RETRIES,
        base_port,
        base_port.saturating_add(MAX_PORT_RETRIES - 1),
        last_error.map_or_else(String::new, |e| e.to_string())
    ))
}

/// Register server for graceful shutdown.
///
/// When Ctrl+C is pressed, the handler set up in main() unblocks the server.
pub fn register_server_for_shutdown(server: Arc<Server>) {
    register_server(server);
}

/// Wait until every request task has dropped its sender (max 2 seconds).
///
/// Tasks never send; the channel only disconnects once the last one is done.
pub fn wait_for_in_flight(drained: &Receiver<()>) {
    loop {
        match drained.recv_timeout(DRAIN_TIMEOUT) {
            Ok(()) => continue,
            Err(RecvTimeoutError::Disconnected) => return,
            Err(RecvTimeoutError::Timeout) => {
                log!("serve"; "gave up waiting for in-flight requests");
                return;
            }
        }
    }
}
