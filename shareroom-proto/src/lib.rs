//! Shared wire protocol definitions for the ShareRoom relay.

pub mod codec;
pub mod command;
