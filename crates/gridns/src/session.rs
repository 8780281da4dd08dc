// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Name Service session.
//!
//! A session owns one TCP connection and one negotiated channel. Lookups
//! on a session are strictly request/reply; a session is not re-entrant,
//! but any number of sessions can run side by side on separate threads.

use crate::address::NsAddress;
use crate::config::LookupConfig;
use crate::error::NsError;
use crate::lookup::{build_request, parse_reply};
use crate::negotiate::{negotiate, ChannelId};
use crate::transport::FrameTransport;

/// Client session for one Name Service endpoint.
pub struct Session {
    address: NsAddress,
    config: LookupConfig,
    state: SessionState,
}

/// Internal session state.
enum SessionState {
    /// Created, no socket yet.
    Unconnected,
    /// Handshake done, lookups allowed.
    Negotiated {
        transport: FrameTransport,
        channel: ChannelId,
    },
    /// Socket released. Terminal.
    Closed,
}

impl Session {
    /// Create an unconnected session. Performs no I/O.
    pub fn new(address: NsAddress, config: LookupConfig) -> Self {
        Self {
            address,
            config,
            state: SessionState::Unconnected,
        }
    }

    /// Parse `address`, connect and negotiate a channel.
    pub fn open(address: &str, config: &LookupConfig) -> Result<Self, NsError> {
        config.validate()?;
        let address = NsAddress::parse(address)?;
        let mut session = Self::new(address, config.clone());
        session.connect()?;
        Ok(session)
    }

    /// Dial the endpoint and run the handshake.
    ///
    /// Only valid on an unconnected session. On failure the session is
    /// closed and cannot be retried.
    pub fn connect(&mut self) -> Result<(), NsError> {
        if !matches!(self.state, SessionState::Unconnected) {
            return Err(NsError::NotConnected);
        }
        self.state = SessionState::Closed;
        self.config.validate()?;

        let mut transport = FrameTransport::dial(&self.address, &self.config)?;
        let channel = match negotiate(&mut transport) {
            Ok(channel) => channel,
            Err(e) => {
                log::debug!("[gridns] handshake with {} failed: {}", self.address, e);
                transport.shutdown();
                return Err(e);
            }
        };

        log::debug!(
            "[gridns] session to {} negotiated {:?}",
            self.address,
            channel
        );
        self.state = SessionState::Negotiated { transport, channel };
        Ok(())
    }

    /// Look up `name` and return its string value.
    ///
    /// An unbound name yields an empty string. Any failure closes the
    /// session, since the reply stream is no longer in step.
    pub fn lookup(&mut self, name: &str) -> Result<String, NsError> {
        let result = match &mut self.state {
            SessionState::Negotiated { transport, channel } => {
                let armed = if self.config.refresh_deadline {
                    transport.refresh_deadline()
                } else {
                    Ok(())
                };
                armed.and_then(|()| Self::exchange(transport, channel, name))
            }
            _ => return Err(NsError::NotConnected),
        };

        match &result {
            Ok(value) => log::debug!("[gridns] {} {} -> {:?}", self.address, name, value),
            Err(e) => {
                log::debug!("[gridns] lookup {} on {} failed: {}", name, self.address, e);
                self.close();
            }
        }
        result
    }

    fn exchange(
        transport: &mut FrameTransport,
        channel: &ChannelId,
        name: &str,
    ) -> Result<String, NsError> {
        transport.send_frame(&build_request(channel, name))?;
        let reply = transport.recv_frame()?;
        log::trace!("[gridns] reply frame {} bytes", reply.len());
        parse_reply(channel, &reply)
    }

    /// Release the socket. Idempotent.
    pub fn close(&mut self) {
        if let SessionState::Negotiated { mut transport, .. } =
            std::mem::replace(&mut self.state, SessionState::Closed)
        {
            transport.shutdown();
            log::debug!("[gridns] session to {} closed", self.address);
        }
    }

    /// Target host.
    pub fn host(&self) -> &str {
        &self.address.host
    }

    /// Target port.
    pub fn port(&self) -> u16 {
        self.address.port
    }

    /// Target address.
    pub fn address(&self) -> &NsAddress {
        &self.address
    }

    /// Lookup configuration in force.
    pub fn config(&self) -> &LookupConfig {
        &self.config
    }

    /// Check if the handshake completed and the session is usable.
    pub fn is_negotiated(&self) -> bool {
        matches!(self.state, SessionState::Negotiated { .. })
    }

    /// Check if the session has been closed.
    pub fn is_closed(&self) -> bool {
        matches!(self.state, SessionState::Closed)
    }

    /// Channel negotiated for this session, if any.
    pub fn channel_id(&self) -> Option<&ChannelId> {
        match &self.state {
            SessionState::Negotiated { channel, .. } => Some(channel),
            _ => None,
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &self.state {
            SessionState::Unconnected => "unconnected",
            SessionState::Negotiated { .. } => "negotiated",
            SessionState::Closed => "closed",
        };
        f.debug_struct("Session")
            .field("address", &self.address)
            .field("state", &state)
            .finish()
    }
}
