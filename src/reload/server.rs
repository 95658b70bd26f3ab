//! WebSocket server for live reload.
//!
//! Accepts TCP connections and hands them to the WsActor, which does the
//! websocket handshake.

use std::net::{IpAddr, TcpListener};
use std::time::Duration;

use anyhow::{Result, anyhow};
use tokio::sync::mpsc;

use crate::actor::messages::WsMsg;

/// Ports tried: the configured one and the next nine.
pub const MAX_PORT_RETRIES: u16 = 10;

/// Bind the reload listener and start the acceptor thread.
///
/// Returns the port actually bound.
pub fn start_ws_server(
    interface: IpAddr,
    base_port: u16,
    ws_tx: mpsc::Sender<WsMsg>,
) -> Result<u16> {
    let (listener, port) = try_bind_port(interface, base_port, MAX_PORT_RETRIES)?;
    listener.set_nonblocking(true)?;

    std::thread::spawn(move || {
        loop {
            if crate::core::is_shutdown() {
                break;
            }
            match listener.accept() {
                Ok((stream, addr)) => {
                    crate::debug!("reload"; "client connected: {}", addr);
                    // The handshake and the first frames are blocking.
                    let _ = stream.set_nonblocking(false);
                    if ws_tx.blocking_send(WsMsg::AddClient(stream)).is_err() {
                        break;
                    }
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    std::thread::sleep(Duration::from_millis(100));
                }
                Err(e) => {
                    crate::log!("reload"; "accept error: {}", e);
                    std::thread::sleep(Duration::from_millis(100));
                }
            }
        }
    });

    Ok(port)
}

/// Bind `base_port`, or the next free one within `attempts` ports.
pub fn try_bind_port(
    interface: IpAddr,
    base_port: u16,
    attempts: u16,
) -> Result<(TcpListener, u16)> {
    let mut last_error = None;

    for offset in 0..attempts {
        let port = base_port.saturating_add(offset);
        match TcpListener::bind((interface, port)) {
            Ok(listener) => {
                let bound = listener.local_addr()?.port();
                return Ok((listener, bound));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow!(
        "failed to bind live reload server on ports {}-{}: {}",
        base_port,
        base_port.saturating_add(attempts - 1),
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    #[test]
    fn test_busy_port_moves_on() {
        let (held, port) = try_bind_port(LOCALHOST, 0, 1).unwrap();
        assert_ne!(port, 0);

        // Either the next port is free, or it is busy too and a later one is used.
        if let Ok((_, next)) = try_bind_port(LOCALHOST, port, MAX_PORT_RETRIES) {
            assert!(next > port);
            assert!(u32::from(next) < u32::from(port) + u32::from(MAX_PORT_RETRIES));
        }
        drop(held);
    }

    #[test]
    fn test_all_ports_busy() {
        let (held, port) = try_bind_port(LOCALHOST, 0, 1).unwrap();
        let err = try_bind_port(LOCALHOST, port, 1).unwrap_err();
        assert!(err.to_string().contains(&format!("ports {port}-{port}")));
        drop(held);
    }
}
