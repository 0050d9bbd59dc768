//! ShareRoom relay server library.
//!
//! Exposes the relay server for use in tests and embedding. The relay
//! accepts WebSocket connections, tracks which room each connection belongs
//! to, and rebroadcasts multi-part transfers to the rest of the room.

pub mod config;
pub mod controller;
pub mod relay;
pub mod rooms;
