//! Property-based codec tests.
//!
//! Uses proptest to verify:
//! 1. Any `TransferData` payload (commas included) survives encode → decode.
//! 2. Any comma-free room name survives encode → decode.
//! 3. Arbitrary input never causes a panic in `decode`.
//! 4. Arbitrary signifier values decode only for the known command set.

use proptest::prelude::*;
use shareroom_proto::codec::{self, DecodeError};
use shareroom_proto::command::Command;

proptest! {
    #[test]
    fn transfer_data_payload_round_trips(payload in ".*") {
        let cmd = Command::TransferData { payload };
        let decoded = codec::decode(&codec::encode(&cmd));
        prop_assert_eq!(decoded.unwrap(), cmd);
    }

    #[test]
    fn comma_free_room_name_round_trips(name in "[^,]*") {
        let cmd = Command::JoinRoom { name };
        let decoded = codec::decode(&codec::encode(&cmd));
        prop_assert_eq!(decoded.unwrap(), cmd);
    }

    #[test]
    fn decode_never_panics(raw in ".*") {
        // Malformed input must degrade to an error, never a panic.
        let _ = codec::decode(&raw);
    }

    #[test]
    fn only_known_signifiers_decode(signifier in any::<i64>(), args in "[^,]*") {
        let raw = format!("{signifier},{args}");
        match codec::decode(&raw) {
            Ok(_) => prop_assert!(matches!(signifier, 1 | 100..=102)),
            Err(e) => prop_assert!(!matches!(e, DecodeError::MissingSignifier)),
        }
    }
}
