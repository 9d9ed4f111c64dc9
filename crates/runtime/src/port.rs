//! Localhost port helpers for the driver lifecycle.

use std::net::TcpListener;

use crate::error::{Result, RuntimeError};

/// Asks the OS for an unused localhost port.
///
/// The listener is dropped before returning, so the port is only very
/// likely to still be free when the driver binds it.
pub fn free_port() -> Result<u16> {
	let listener = TcpListener::bind(("127.0.0.1", 0)).map_err(RuntimeError::NoFreePort)?;
	let port = listener.local_addr().map_err(RuntimeError::NoFreePort)?.port();
	Ok(port)
}

/// Returns `true` when something accepts TCP connections on `port`.
pub async fn port_accepting(port: u16) -> bool {
	tokio::net::TcpStream::connect(("127.0.0.1", port)).await.is_ok()
}
