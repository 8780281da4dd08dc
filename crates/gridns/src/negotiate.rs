// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Connection and channel negotiation.
//!
//! Opens the multiplexed connection, selects the Name Service sub-port and
//! asks the remote to allocate a `NameService` channel. The reply carries the
//! channel id that prefixes every later request on the session.

use crate::codec::wire::{
    CHANNEL_ID_OFFSET, CHANNEL_ID_TRAILER, CHANNEL_OPEN, CONNECTION_OPEN, MULTIPLEXED_SOCKET,
    NAME_SERVICE_SUBPORT,
};
use crate::error::NsError;
use crate::transport::FrameTransport;
use std::fmt;

/// Opaque channel identifier allocated by the remote.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ChannelId(Vec<u8>);

impl ChannelId {
    /// Wrap raw channel id bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Bytes prefixed to every request on the channel.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the id has no bytes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for ChannelId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChannelId(")?;
        for b in &self.0 {
            write!(f, "{:02x}", b)?;
        }
        write!(f, ")")
    }
}

/// Run the handshake and return the allocated channel id.
pub fn negotiate(transport: &mut FrameTransport) -> Result<ChannelId, NsError> {
    transport.send_raw(&MULTIPLEXED_SOCKET)?;
    transport.send_raw(&NAME_SERVICE_SUBPORT)?;
    transport.send_frame(&CONNECTION_OPEN)?;
    transport.send_frame(&CHANNEL_OPEN)?;

    // Acknowledgement of CONNECTION_OPEN carries nothing we need.
    let ack = transport.recv_frame()?;
    log::trace!("[gridns] connection ack {} bytes", ack.len());

    let reply = transport.recv_frame()?;
    let channel = extract_channel_id(&reply)?;
    log::debug!(
        "[gridns] negotiated channel {:?} with {}",
        channel,
        transport.peer_addr()
    );
    Ok(channel)
}

/// Pull the channel id out of the channel open reply.
pub fn extract_channel_id(reply: &[u8]) -> Result<ChannelId, NsError> {
    let end = reply
        .len()
        .checked_sub(CHANNEL_ID_TRAILER)
        .filter(|end| *end > CHANNEL_ID_OFFSET)
        .ok_or_else(|| {
            NsError::Protocol(format!(
                "channel open reply too short: {} bytes",
                reply.len()
            ))
        })?;

    Ok(ChannelId(reply[CHANNEL_ID_OFFSET..end].to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_channel_id() {
        let mut reply = vec![0u8; CHANNEL_ID_OFFSET];
        reply.extend_from_slice(&[0x07, 0x81, 0x02]);
        reply.push(0x40);

        let channel = extract_channel_id(&reply).unwrap();
        assert_eq!(channel.as_bytes(), &[0x07, 0x81, 0x02]);
        assert_eq!(channel.len(), 3);
    }

    #[test]
    fn test_extract_channel_id_too_short() {
        for len in 0..=CHANNEL_ID_OFFSET + CHANNEL_ID_TRAILER {
            let reply = vec![0u8; len];
            assert!(
                matches!(extract_channel_id(&reply), Err(NsError::Protocol(_))),
                "{} byte reply should be rejected",
                len
            );
        }
    }

    #[test]
    fn test_channel_id_debug_is_hex() {
        let channel = ChannelId::new(vec![0xDE, 0xAD]);
        assert_eq!(format!("{:?}", channel), "ChannelId(dead)");
    }
}
