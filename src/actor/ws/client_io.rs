use std::io::ErrorKind;
use std::net::TcpStream;
use std::time::Duration;

use tungstenite::protocol::Message;

use super::{Clients, WsActor};
use crate::reload::message::ReloadMessage;

impl WsActor {
    /// Upgrade a raw connection and greet it.
    pub(super) fn add_client(&self, stream: TcpStream) {
        // Blocking during the handshake, polled afterwards.
        let mut ws = match tungstenite::accept(stream) {
            Ok(ws) => ws,
            Err(e) => {
                crate::log!("ws"; "handshake failed: {}", e);
                return;
            }
        };
        let _ = ws.get_ref().set_nonblocking(true);

        let hello = ReloadMessage::connected().to_json();
        if let Err(e) = ws.send(Message::Text(hello.into())) {
            crate::debug!("ws"; "client gone before greeting: {}", e);
            return;
        }

        let mut clients = self.clients.lock();
        clients.push(ws);
        crate::debug!("ws"; "client connected (total: {})", clients.len());
    }

    /// Poll every client for close frames and dead sockets. Reading also
    /// answers pings.
    pub(super) fn client_reader_loop(clients: &Clients) {
        loop {
            std::thread::sleep(Duration::from_millis(100));
            if crate::core::is_shutdown() {
                break;
            }

            let mut clients = clients.lock();
            let before = clients.len();
            clients.retain_mut(|ws| match ws.read() {
                Ok(Message::Close(_)) => false,
                Ok(_) => true,
                Err(tungstenite::Error::Io(ref e)) if e.kind() == ErrorKind::WouldBlock => true,
                Err(_) => false,
            });
            if clients.len() < before {
                crate::debug!("ws"; "client disconnected (total: {})", clients.len());
            }
        }
    }
}
