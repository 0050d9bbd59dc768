//! WebSocket transport adapter for the relay server.
//!
//! Accepts WebSocket connections, assigns each one a [`ConnectionId`], and
//! turns its lifecycle into [`TransportEvent`]s — connect, data, disconnect.
//! All events from all connections funnel through a single channel into the
//! [`RelayController`] loop, which applies them one at a time. Outbound
//! frames travel the other way over a per-connection channel drained by the
//! connection's writer task.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::config::RelayConfig;
use crate::controller::{RelayController, TransportEvent};

/// Shared transport state handed to axum handlers.
pub struct RelayState {
    /// Funnel for transport events; the controller loop is the sole consumer.
    events: mpsc::UnboundedSender<TransportEvent>,
    /// Next connection id to hand out.
    next_connection_id: AtomicU64,
    /// Maximum allowed inbound message size in bytes.
    max_message_size: usize,
}

/// Handles an upgraded WebSocket connection for a single client.
///
/// The connection lifecycle:
/// 1. Allocate a connection id and announce `Connect` to the controller.
/// 2. Spawn a writer task draining the outbound channel into the socket.
/// 3. Read frames, forwarding text frames as `Data` events.
/// 4. On close or error, announce `Disconnect`.
pub async fn handle_socket(socket: WebSocket, state: Arc<RelayState>) {
    let id = state.next_connection_id.fetch_add(1, Ordering::Relaxed);
    let (mut ws_sender, mut ws_receiver) = socket.split();

    // Outbound channel for this connection, owned by the controller.
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
    if state
        .events
        .send(TransportEvent::Connect { id, sender: tx })
        .is_err()
    {
        tracing::error!(connection_id = id, "controller loop gone, dropping connection");
        return;
    }

    // Writer task: forwards controller output to the WebSocket.
    let mut write_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if ws_sender.send(msg).await.is_err() {
                tracing::warn!(connection_id = id, "WebSocket write failed");
                break;
            }
        }
    });

    // Reader loop: turn incoming text frames into Data events.
    let reader_events = state.events.clone();
    let max_message_size = state.max_message_size;
    let mut read_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = ws_receiver.next().await {
            match msg {
                Message::Text(text) => {
                    if text.len() > max_message_size {
                        tracing::warn!(
                            connection_id = id,
                            size = text.len(),
                            max = max_message_size,
                            "message exceeds size limit, dropped"
                        );
                        continue;
                    }
                    let event = TransportEvent::Data {
                        id,
                        text: text.to_string(),
                    };
                    if reader_events.send(event).is_err() {
                        break;
                    }
                }
                Message::Close(_) => {
                    tracing::info!(connection_id = id, "received close frame");
                    break;
                }
                _ => {
                    // Ignore binary, ping, pong frames.
                }
            }
        }
    });

    // Wait for either task to finish, then abort the other.
    tokio::select! {
        _ = &mut read_task => {
            write_task.abort();
        }
        _ = &mut write_task => {
            read_task.abort();
        }
    }

    let _ = state.events.send(TransportEvent::Disconnect { id });
}

/// Starts the relay server on the given address with default settings and
/// returns the bound address and a join handle.
///
/// This is the primary entry point used by test code; `main` resolves a
/// [`RelayConfig`] first and calls [`start_server_with_config`].
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server(
    addr: &str,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    start_server_with_config(addr, &RelayConfig::default()).await
}

/// Starts the relay server with a resolved [`RelayConfig`].
///
/// Spawns the controller event loop (the single writer over room state) and
/// serves WebSocket upgrades on `GET /ws`.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server_with_config(
    addr: &str,
    config: &RelayConfig,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let state = Arc::new(RelayState {
        events: events_tx,
        next_connection_id: AtomicU64::new(1),
        max_message_size: config.max_message_size,
    });

    // The controller exclusively owns the room registry; it stops once the
    // server (and with it every event sender) is dropped.
    tokio::spawn(RelayController::new().run(events_rx));

    let app = axum::Router::new()
        .route("/ws", axum::routing::get(ws_handler))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "relay server error");
        }
    });

    Ok((bound_addr, handle))
}

/// axum handler that upgrades an HTTP request to a WebSocket connection.
async fn ws_handler(
    ws: axum::extract::ws::WebSocketUpgrade,
    axum::extract::State(state): axum::extract::State<Arc<RelayState>>,
) -> impl axum::response::IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}
