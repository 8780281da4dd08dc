// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Name Service wire constants.
//!
//! Fixed byte vectors and reply offsets for protocol version 1 of the
//! `NameServiceProtocol` channel carried over `MessagingProtocol` v2.
//! A protocol bump on the remote side only touches this module.
//!
//! ```text
//! TCP connect
//!   -> MULTIPLEXED_SOCKET (raw)      5A C1 E0 00
//!   -> NAME_SERVICE_SUBPORT (raw)    00 00 00 03
//!   -> [frame] CONNECTION_OPEN
//!   -> [frame] CHANNEL_OPEN
//!   <- [frame] connection ack        (discarded)
//!   <- [frame] channel reply         channel id at [8 .. len-1)
//! ```

/// Multiplexed socket protocol identifier, sent raw right after connect.
pub const MULTIPLEXED_SOCKET: [u8; 4] = [0x5A, 0xC1, 0xE0, 0x00];

/// Sub-port selector for the Name Service, sent raw after the identifier.
pub const NAME_SERVICE_SUBPORT: [u8; 4] = [0x00, 0x00, 0x00, 0x03];

/// Connection open request (framed).
///
/// POF-encoded protocol negotiation advertising `MessagingProtocol` v2 and
/// `NameServiceProtocol` v1, with member identity `Cluster` / `localhost` /
/// process `20233` / `CoherenceConsole`.
pub const CONNECTION_OPEN: [u8; 212] = [
    0x00, 0x01, 0x02, 0x00, 0x42, 0x00, 0x01, 0x0E, 0x00, 0x00, 0x42, 0xA6,
    0xB6, 0x9F, 0xDE, 0xB2, 0x51, 0x01, 0x41, 0xE3, 0xF3, 0xE4, 0xDD, 0x0F,
    0x02, 0x41, 0x8F, 0xF6, 0xBA, 0x99, 0x01, 0x03, 0x41, 0xF8, 0xB4, 0xE5,
    0xF2, 0x04, 0x04, 0x41, 0xC4, 0xFE, 0xDC, 0xF5, 0x05, 0x05, 0x41, 0xD7,
    0xCE, 0xC3, 0x8D, 0x07, 0x06, 0x41, 0xDB, 0x89, 0xDC, 0xD5, 0x0A, 0x40,
    0x02, 0x6E, 0x03, 0x5D, 0x4E, 0x57, 0x02, 0x11, 0x4D, 0x65, 0x73, 0x73,
    0x61, 0x67, 0x69, 0x6E, 0x67, 0x50, 0x72, 0x6F, 0x74, 0x6F, 0x63, 0x6F,
    0x6C, 0x02, 0x41, 0x02, 0x41, 0x02, 0x13, 0x4E, 0x61, 0x6D, 0x65, 0x53,
    0x65, 0x72, 0x76, 0x69, 0x63, 0x65, 0x50, 0x72, 0x6F, 0x74, 0x6F, 0x63,
    0x6F, 0x6C, 0x02, 0x41, 0x01, 0x41, 0x01, 0x05, 0xA0, 0x02, 0x00, 0x00,
    0x0E, 0x00, 0x00, 0x42, 0xAE, 0x89, 0x9E, 0xDE, 0xB2, 0x51, 0x01, 0x41,
    0x81, 0x80, 0x80, 0xF0, 0x0F, 0x05, 0x41, 0x98, 0x9F, 0x81, 0x80, 0x08,
    0x06, 0x41, 0x93, 0x9E, 0x01, 0x40, 0x01, 0x6A, 0x02, 0x6E, 0x03, 0x6A,
    0x04, 0x71, 0x05, 0x71, 0x06, 0x4E, 0x08, 0x43, 0x6C, 0x75, 0x73, 0x74,
    0x65, 0x72, 0x42, 0x09, 0x4E, 0x09, 0x6C, 0x6F, 0x63, 0x61, 0x6C, 0x68,
    0x6F, 0x73, 0x74, 0x0A, 0x4E, 0x05, 0x32, 0x30, 0x32, 0x33, 0x33, 0x0C,
    0x4E, 0x10, 0x43, 0x6F, 0x68, 0x65, 0x72, 0x65, 0x6E, 0x63, 0x65, 0x43,
    0x6F, 0x6E, 0x73, 0x6F, 0x6C, 0x65, 0x40, 0x40,
];

/// Channel open request for the `NameService` channel (framed).
pub const CHANNEL_OPEN: [u8; 43] = [
    0x00, 0x0B, 0x02, 0x00, 0x42, 0x01, 0x01, 0x4E, 0x13, 0x4E, 0x61, 0x6D,
    0x65, 0x53, 0x65, 0x72, 0x76, 0x69, 0x63, 0x65, 0x50, 0x72, 0x6F, 0x74,
    0x6F, 0x63, 0x6F, 0x6C, 0x02, 0x4E, 0x0B, 0x4E, 0x61, 0x6D, 0x65, 0x53,
    0x65, 0x72, 0x76, 0x69, 0x63, 0x65, 0x40,
];

/// Marker following the channel id in every lookup request.
pub const NS_LOOKUP_REQID: [u8; 7] = [0x01, 0x01, 0x00, 0x42, 0x00, 0x01, 0x4E];

/// Terminates a lookup request.
pub const REQ_END_MARKER: u8 = 0x40;

/// Start of the channel id inside the channel open reply.
pub const CHANNEL_ID_OFFSET: usize = 8;

/// Bytes after the channel id in the channel open reply.
pub const CHANNEL_ID_TRAILER: usize = 1;

/// Request id byte echoed after the channel id in every reply.
pub const REQUEST_ID_LEN: usize = 1;

/// Replies whose tail (after channel id and request id) is no longer than
/// this carry no value.
pub const REPLY_EMPTY_MAX_LEN: usize = 7;

/// Offset of the value length (packed int) inside the reply tail.
pub const REPLY_VALUE_LEN_OFFSET: usize = 6;

#[cfg(test)]
mod tests {
    use super::*;

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn test_connection_open_identity() {
        assert_eq!(CONNECTION_OPEN.len(), 212);
        assert!(contains(&CONNECTION_OPEN, b"MessagingProtocol"));
        assert!(contains(&CONNECTION_OPEN, b"NameServiceProtocol"));
        assert!(contains(&CONNECTION_OPEN, b"localhost"));
        assert!(contains(&CONNECTION_OPEN, b"20233"));
        assert!(contains(&CONNECTION_OPEN, b"CoherenceConsole"));
        assert_eq!(&CONNECTION_OPEN[CONNECTION_OPEN.len() - 2..], &[0x40, 0x40]);
    }

    #[test]
    fn test_channel_open_names_service() {
        assert_eq!(CHANNEL_OPEN.len(), 43);
        assert!(contains(&CHANNEL_OPEN, b"NameServiceProtocol"));
        assert!(contains(&CHANNEL_OPEN, b"NameService"));
        assert_eq!(CHANNEL_OPEN[CHANNEL_OPEN.len() - 1], REQ_END_MARKER);
    }

    #[test]
    fn test_preambles() {
        assert_eq!(u32::from_be_bytes(MULTIPLEXED_SOCKET), 0x5AC1_E000);
        assert_eq!(u32::from_be_bytes(NAME_SERVICE_SUBPORT), 3);
    }
}
