use tungstenite::protocol::Message;

use super::WsActor;

impl WsActor {
    /// Send `msg` to every client; clients that fail are dropped.
    pub(super) fn broadcast(&self, msg: &Message) {
        let mut clients = self.clients.lock();
        if clients.is_empty() {
            crate::debug!("ws"; "no clients connected");
            return;
        }

        let count = clients.len();
        clients.retain_mut(|ws| match ws.send(msg.clone()) {
            Ok(()) => true,
            Err(e) => {
                crate::debug!("ws"; "client dropped: {}", e);
                false
            }
        });
        crate::debug!("ws"; "broadcast to {}/{} clients", clients.len(), count);
    }
}
