//! Relay controller: applies transport events to the room registry.
//!
//! The controller is the single owner of all mutable relay state — the
//! [`RoomRegistry`] and the table of outbound senders. Transport tasks
//! funnel their events through one channel and the controller loop applies
//! them one at a time, so room and transfer state never sees concurrent
//! mutation.
//!
//! Every recognized failure degrades to "log, drop the message, keep
//! serving". Nothing here terminates a connection or the process.

use std::collections::HashMap;

use axum::extract::ws::Message;
use shareroom_proto::codec::{self, DecodeError};
use shareroom_proto::command::Command;
use tokio::sync::mpsc;

use crate::rooms::{ConnectionId, RoomRegistry, TransferSession};

/// Delivery class for outbound sends.
///
/// All relay traffic is sent reliably. The class exists because the
/// transport contract carries one; the WebSocket transport delivers every
/// frame reliably regardless, so it only shows up in trace output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reliability {
    /// Delivery and ordering guaranteed by the transport.
    Reliable,
    /// Best-effort delivery.
    Unreliable,
}

/// A transport event, delivered to the controller one at a time.
#[derive(Debug)]
pub enum TransportEvent {
    /// A client connected. `sender` is the outbound channel for its frames.
    Connect {
        /// Transport-assigned connection id.
        id: ConnectionId,
        /// Channel the connection's writer task drains.
        sender: mpsc::UnboundedSender<Message>,
    },
    /// A client delivered one text payload.
    Data {
        /// Sending connection.
        id: ConnectionId,
        /// Raw wire message, not yet decoded.
        text: String,
    },
    /// A client disconnected.
    Disconnect {
        /// The connection that went away.
        id: ConnectionId,
    },
}

/// Errors raised while handling a data event.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// The message did not decode into a command.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// A transfer command arrived from a connection not in any room.
    #[error("connection {0} is not in any room")]
    NoActiveRoom(ConnectionId),
    /// Transfer data or end arrived without a preceding start.
    #[error("room {0:?} has no transfer in progress")]
    NoActiveTransfer(String),
}

/// Orchestrates the room registry and transfer sessions in response to
/// transport events, and issues the outbound broadcast sends.
pub struct RelayController {
    registry: RoomRegistry,
    connections: HashMap<ConnectionId, mpsc::UnboundedSender<Message>>,
}

impl Default for RelayController {
    fn default() -> Self {
        Self::new()
    }
}

impl RelayController {
    /// Creates a controller with no rooms and no connections.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: RoomRegistry::new(),
            connections: HashMap::new(),
        }
    }

    /// Runs the controller loop, pulling one event at a time until the
    /// transport side drops all event senders.
    pub async fn run(mut self, mut events: mpsc::UnboundedReceiver<TransportEvent>) {
        while let Some(event) = events.recv().await {
            self.handle_event(event);
        }
        tracing::debug!("transport event channel closed, controller stopping");
    }

    /// Applies a single transport event to completion.
    pub fn handle_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Connect { id, sender } => {
                self.connections.insert(id, sender);
                tracing::info!(connection_id = id, "client connected");
            }
            TransportEvent::Data { id, text } => {
                tracing::debug!(connection_id = id, msg = %text, "message received");
                if let Err(e) = self.handle_data(id, &text) {
                    tracing::warn!(connection_id = id, error = %e, "message dropped");
                }
            }
            TransportEvent::Disconnect { id } => {
                self.connections.remove(&id);
                self.registry.remove_member(id);
                tracing::info!(
                    connection_id = id,
                    rooms = self.registry.room_count(),
                    "client disconnected"
                );
            }
        }
    }

    /// Decodes one wire message and applies the command.
    fn handle_data(&mut self, id: ConnectionId, raw: &str) -> Result<(), RelayError> {
        match codec::decode(raw)? {
            Command::JoinRoom { name } => {
                self.registry.join_room(id, &name);
                tracing::info!(
                    connection_id = id,
                    room = %name,
                    rooms = self.registry.room_count(),
                    "joined room"
                );
                Ok(())
            }
            Command::TransferStart => {
                let room = self
                    .registry
                    .find_room_by_member_mut(id)
                    .ok_or(RelayError::NoActiveRoom(id))?;
                // A new start supersedes any session already collecting.
                room.active_transfer = Some(TransferSession::new(id));
                tracing::debug!(connection_id = id, room = %room.name, "transfer started");
                Ok(())
            }
            Command::TransferData { payload } => {
                let room = self
                    .registry
                    .find_room_by_member_mut(id)
                    .ok_or(RelayError::NoActiveRoom(id))?;
                let session = room
                    .active_transfer
                    .as_mut()
                    .ok_or_else(|| RelayError::NoActiveTransfer(room.name.clone()))?;
                session.chunks.push(payload);
                Ok(())
            }
            Command::TransferEnd => self.finish_transfer(id),
        }
    }

    /// Consumes the room's transfer session and broadcasts it to every
    /// member except the originator.
    ///
    /// The comparison is against the session's originator, not the sender of
    /// the end message; normally they are the same connection, but a stale
    /// session can be ended by another member after the originator left.
    fn finish_transfer(&mut self, id: ConnectionId) -> Result<(), RelayError> {
        let room = self
            .registry
            .find_room_by_member_mut(id)
            .ok_or(RelayError::NoActiveRoom(id))?;
        let session = room
            .active_transfer
            .take()
            .ok_or_else(|| RelayError::NoActiveTransfer(room.name.clone()))?;
        let members = room.members.clone();
        let room_name = room.name.clone();

        let chunk_count = session.chunks.len();
        let mut frames = Vec::with_capacity(chunk_count + 2);
        frames.push(codec::encode(&Command::TransferStart));
        for payload in session.chunks {
            frames.push(codec::encode(&Command::TransferData { payload }));
        }
        frames.push(codec::encode(&Command::TransferEnd));

        let mut receivers = 0;
        for member in members {
            if member == session.originator {
                continue;
            }
            for frame in &frames {
                self.send(member, frame.clone(), Reliability::Reliable);
            }
            receivers += 1;
        }
        tracing::info!(
            room = %room_name,
            chunks = chunk_count,
            receivers,
            "transfer broadcast"
        );
        Ok(())
    }

    /// Fire-and-forget send of one frame to one connection.
    ///
    /// Delivery is the transport's problem from here on; the controller
    /// never waits for acknowledgment and never retries.
    fn send(&self, id: ConnectionId, frame: String, reliability: Reliability) {
        let Some(sender) = self.connections.get(&id) else {
            tracing::debug!(connection_id = id, "dropping frame for unknown connection");
            return;
        };
        tracing::trace!(connection_id = id, ?reliability, frame = %frame, "send");
        let _ = sender.send(Message::Text(frame.into()));
    }
}
