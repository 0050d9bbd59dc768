//! Serialization and deserialization for the ShareRoom wire protocol.
//!
//! Wire format: comma-separated text fields. Field 0 is the integer
//! signifier, remaining fields are command-specific arguments:
//!
//! ```text
//! <signifier:int>,<field1>,<field2>,...
//! ```
//!
//! `TransferData` is special-cased: its payload is everything after the
//! first comma, taken verbatim. Payloads may themselves contain commas and
//! are never re-parsed by the relay.

use crate::command::{Command, client, server};

/// Error type for codec decode operations.
///
/// Decoding never panics; malformed input from a client degrades to one of
/// these variants so the caller can log it and keep serving.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The message was empty, so there is no signifier field to read.
    #[error("empty message, missing signifier field")]
    MissingSignifier,
    /// Field 0 was present but did not parse as an integer.
    #[error("signifier is not an integer: {0:?}")]
    InvalidSignifier(String),
    /// Field 0 parsed as an integer but names no known command.
    #[error("unknown signifier {0}")]
    UnknownSignifier(i64),
    /// A command was recognized but a required argument was absent.
    #[error("missing required argument: {0}")]
    MissingArgument(&'static str),
}

/// Decodes a raw wire message into a [`Command`].
///
/// # Errors
///
/// Returns a [`DecodeError`] when the signifier field is missing, not an
/// integer, or unrecognized, or when a required argument is absent.
pub fn decode(raw: &str) -> Result<Command, DecodeError> {
    let (signifier_field, args) = match raw.split_once(',') {
        Some((head, tail)) => (head, Some(tail)),
        None => (raw, None),
    };
    if signifier_field.is_empty() {
        return Err(DecodeError::MissingSignifier);
    }
    let signifier: i64 = signifier_field
        .parse()
        .map_err(|_| DecodeError::InvalidSignifier(signifier_field.to_string()))?;

    match signifier {
        client::JOIN_ROOM => {
            let args = args.ok_or(DecodeError::MissingArgument("roomName"))?;
            // The room name is field 1; any further fields are ignored.
            let name = match args.split_once(',') {
                Some((name, _)) => name,
                None => args,
            };
            Ok(Command::JoinRoom {
                name: name.to_string(),
            })
        }
        client::TRANSFER_START => Ok(Command::TransferStart),
        client::TRANSFER_DATA => {
            let payload = args.ok_or(DecodeError::MissingArgument("payload"))?;
            Ok(Command::TransferData {
                payload: payload.to_string(),
            })
        }
        client::TRANSFER_END => Ok(Command::TransferEnd),
        other => Err(DecodeError::UnknownSignifier(other)),
    }
}

/// Encodes a [`Command`] into its wire text form.
///
/// Transfer frames use the server → client signifiers, which alias the
/// client → server values, so the same encoder serves both directions.
#[must_use]
pub fn encode(command: &Command) -> String {
    match command {
        Command::JoinRoom { name } => format!("{},{name}", client::JOIN_ROOM),
        Command::TransferStart => server::TRANSFER_START.to_string(),
        Command::TransferData { payload } => format!("{},{payload}", server::TRANSFER_DATA),
        Command::TransferEnd => server::TRANSFER_END.to_string(),
    }
}
