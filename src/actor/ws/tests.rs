use std::io::Write;
use std::net::{TcpListener, TcpStream};
use std::time::Duration;

use tokio::sync::mpsc;
use tungstenite::protocol::Message;

use super::WsActor;
use crate::reload::message::ReloadMessage;

fn listener() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

fn actor() -> WsActor {
    let (_tx, rx) = mpsc::channel(4);
    WsActor::new(rx)
}

#[test]
fn test_client_greeted_then_reloaded() {
    let (listener, port) = listener();
    let client = std::thread::spawn(move || {
        let (mut ws, _) = tungstenite::connect(format!("ws://127.0.0.1:{port}")).unwrap();
        let hello = ws.read().unwrap().into_text().unwrap().as_str().to_string();
        let reload = ws.read().unwrap().into_text().unwrap().as_str().to_string();
        (hello, reload)
    });

    let (stream, _) = listener.accept().unwrap();
    let actor = actor();
    actor.add_client(stream);
    assert_eq!(actor.client_count(), 1);

    let text = ReloadMessage::reload("rebuilt 1 file").to_json();
    actor.broadcast(&Message::Text(text.into()));

    let (hello, reload) = client.join().unwrap();
    assert_eq!(
        ReloadMessage::from_json(&hello),
        Some(ReloadMessage::connected())
    );
    assert_eq!(
        ReloadMessage::from_json(&reload),
        Some(ReloadMessage::reload("rebuilt 1 file"))
    );
}

#[test]
fn test_failed_handshake_not_registered() {
    let (listener, port) = listener();
    let mut raw = TcpStream::connect(("127.0.0.1", port)).unwrap();
    raw.write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n").unwrap();

    let (stream, _) = listener.accept().unwrap();
    let actor = actor();
    actor.add_client(stream);
    assert_eq!(actor.client_count(), 0);
}

#[test]
fn test_dead_client_dropped_on_send() {
    let (listener, port) = listener();
    let client = std::thread::spawn(move || {
        let (mut ws, _) = tungstenite::connect(format!("ws://127.0.0.1:{port}")).unwrap();
        let _ = ws.read();
        // Dropped without a close frame.
    });

    let (stream, _) = listener.accept().unwrap();
    let actor = actor();
    actor.add_client(stream);
    client.join().unwrap();

    let msg = Message::Text(ReloadMessage::reload("x").to_json().into());
    for _ in 0..20 {
        actor.broadcast(&msg);
        if actor.client_count() == 0 {
            break;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
    assert_eq!(actor.client_count(), 0);
}

#[test]
fn test_broadcast_without_clients() {
    let actor = actor();
    actor.broadcast(&Message::Text("{}".into()));
    assert_eq!(actor.client_count(), 0);
}
