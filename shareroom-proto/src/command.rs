//! Typed commands for the ShareRoom relay wire protocol.
//!
//! Every wire message starts with an integer signifier field identifying the
//! command, followed by command-specific arguments. The [`Command`] enum is
//! the decoded form; [`crate::codec`] maps it to and from the comma-delimited
//! text format.

/// Client → server signifier values.
pub mod client {
    /// Join (or create) a named sharing room.
    pub const JOIN_ROOM: i64 = 1;
    /// Begin buffering a multi-part transfer for the sender's room.
    pub const TRANSFER_START: i64 = 100;
    /// One opaque chunk of an in-flight transfer.
    pub const TRANSFER_DATA: i64 = 101;
    /// Finish the transfer and broadcast it to the rest of the room.
    pub const TRANSFER_END: i64 = 102;
}

/// Server → client signifier values.
///
/// These deliberately alias their client → server counterparts so that the
/// broadcast frames a receiver sees are byte-for-byte the frames a sender
/// produced. Deployed clients depend on the numeric values; do not renumber.
pub mod server {
    /// Broadcast framing: transfer begins.
    pub const TRANSFER_START: i64 = super::client::TRANSFER_START;
    /// Broadcast framing: one transfer chunk.
    pub const TRANSFER_DATA: i64 = super::client::TRANSFER_DATA;
    /// Broadcast framing: transfer complete.
    pub const TRANSFER_END: i64 = super::client::TRANSFER_END;
}

/// A decoded wire message.
///
/// `TransferData` payloads are opaque to the relay: they may contain commas
/// and are never re-parsed after the signifier field is split off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Join the room with the given name, creating it if absent.
    JoinRoom {
        /// Room name, a case-sensitive key. No normalization is applied.
        name: String,
    },
    /// Start a fresh transfer session for the sender's room.
    TransferStart,
    /// Append one chunk to the sender's in-flight transfer.
    TransferData {
        /// Opaque chunk contents.
        payload: String,
    },
    /// End the transfer and broadcast the buffered chunks.
    TransferEnd,
}
