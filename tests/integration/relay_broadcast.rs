//! Integration tests for transfer broadcast over the WebSocket transport.
//!
//! Exercises the full path: WebSocket frames in, room registry and transfer
//! session mutation in the controller loop, framed broadcast back out.
//!
//! Verification command: `cargo test --test relay_broadcast`

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite;

use shareroom_relay::relay::start_server;

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// Starts a relay server on a random port for testing.
async fn start_relay() -> (std::net::SocketAddr, tokio::task::JoinHandle<()>) {
    start_server("127.0.0.1:0")
        .await
        .expect("failed to start test relay")
}

/// Connects a WebSocket client to the relay.
async fn connect(addr: std::net::SocketAddr) -> WsStream {
    let url = format!("ws://{addr}/ws");
    let (ws, _) = tokio_tungstenite::connect_async(&url).await.unwrap();
    ws
}

/// Sends one wire message.
async fn send(ws: &mut WsStream, text: &str) {
    ws.send(tungstenite::Message::Text(text.into()))
        .await
        .unwrap();
}

/// Receives one wire message, with a timeout.
async fn recv(ws: &mut WsStream) -> String {
    let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
        .await
        .expect("recv timed out")
        .unwrap()
        .unwrap();
    msg.into_text().unwrap().to_string()
}

/// Asserts that no frame arrives within a short window.
async fn assert_silent(ws: &mut WsStream) {
    let result = tokio::time::timeout(Duration::from_millis(300), ws.next()).await;
    assert!(result.is_err(), "expected silence, got {result:?}");
}

/// Give the server a moment to process frames already in flight.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(200)).await;
}

#[tokio::test]
async fn broadcast_reaches_everyone_but_the_originator() {
    let (addr, _handle) = start_relay().await;

    let mut ws_a = connect(addr).await;
    let mut ws_b = connect(addr).await;
    let mut ws_c = connect(addr).await;
    send(&mut ws_a, "1,party").await;
    send(&mut ws_b, "1,party").await;
    send(&mut ws_c, "1,party").await;
    settle().await;

    send(&mut ws_a, "100").await;
    send(&mut ws_a, "101,x").await;
    send(&mut ws_a, "101,y").await;
    send(&mut ws_a, "102").await;

    for ws in [&mut ws_b, &mut ws_c] {
        assert_eq!(recv(ws).await, "100");
        assert_eq!(recv(ws).await, "101,x");
        assert_eq!(recv(ws).await, "101,y");
        assert_eq!(recv(ws).await, "102");
    }
    assert_silent(&mut ws_a).await;
}

#[tokio::test]
async fn payload_commas_survive_the_relay() {
    let (addr, _handle) = start_relay().await;

    let mut ws_a = connect(addr).await;
    let mut ws_b = connect(addr).await;
    send(&mut ws_a, "1,party").await;
    send(&mut ws_b, "1,party").await;
    settle().await;

    send(&mut ws_a, "100").await;
    send(&mut ws_a, "101,one,two,three").await;
    send(&mut ws_a, "102").await;

    assert_eq!(recv(&mut ws_b).await, "100");
    assert_eq!(recv(&mut ws_b).await, "101,one,two,three");
    assert_eq!(recv(&mut ws_b).await, "102");
}

#[tokio::test]
async fn transfer_from_roomless_connection_goes_nowhere() {
    let (addr, _handle) = start_relay().await;

    let mut ws_member = connect(addr).await;
    let mut ws_stray = connect(addr).await;
    send(&mut ws_member, "1,party").await;
    settle().await;

    // The stray connection never joined a room.
    send(&mut ws_stray, "100").await;
    send(&mut ws_stray, "101,lost").await;
    send(&mut ws_stray, "102").await;

    assert_silent(&mut ws_member).await;

    // The relay keeps serving: the stray can join and transfer normally.
    send(&mut ws_stray, "1,party").await;
    settle().await;
    send(&mut ws_stray, "100").await;
    send(&mut ws_stray, "101,found").await;
    send(&mut ws_stray, "102").await;

    assert_eq!(recv(&mut ws_member).await, "100");
    assert_eq!(recv(&mut ws_member).await, "101,found");
    assert_eq!(recv(&mut ws_member).await, "102");
}

#[tokio::test]
async fn back_to_back_transfers_are_framed_separately() {
    let (addr, _handle) = start_relay().await;

    let mut ws_a = connect(addr).await;
    let mut ws_b = connect(addr).await;
    send(&mut ws_a, "1,party").await;
    send(&mut ws_b, "1,party").await;
    settle().await;

    send(&mut ws_a, "100").await;
    send(&mut ws_a, "101,first").await;
    send(&mut ws_a, "102").await;
    send(&mut ws_a, "100").await;
    send(&mut ws_a, "101,second").await;
    send(&mut ws_a, "102").await;

    assert_eq!(recv(&mut ws_b).await, "100");
    assert_eq!(recv(&mut ws_b).await, "101,first");
    assert_eq!(recv(&mut ws_b).await, "102");
    assert_eq!(recv(&mut ws_b).await, "100");
    assert_eq!(recv(&mut ws_b).await, "101,second");
    assert_eq!(recv(&mut ws_b).await, "102");
}
