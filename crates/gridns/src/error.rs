// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error type surfaced by Name Service lookups and cluster discovery.

use crate::codec::frame::is_timeout_kind;
use crate::codec::{FrameError, PackedIntError};
use crate::config::ConfigError;
use std::io;

/// Name Service error types.
#[derive(Debug)]
pub enum NsError {
    /// Malformed `host:port`, port out of range, or unresolvable host.
    AddressInvalid(String),

    /// TCP connect failed.
    DialFailed { address: String, reason: String },

    /// I/O did not complete before the session deadline.
    DeadlineExceeded,

    /// Bad frame length, truncated frame, malformed packed int, short reply.
    Protocol(String),

    /// A lookup expected a specific value shape and got something else.
    LookupValueMalformed { name: String, value: String },

    /// Operation attempted on a session that is not negotiated.
    NotConnected,

    /// Discovery found no Name Service endpoints to query.
    NoEndpoints,

    /// Invalid lookup configuration.
    Config(String),
}

impl std::fmt::Display for NsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AddressInvalid(s) => write!(f, "Invalid address: {}", s),
            Self::DialFailed { address, reason } => {
                write!(f, "Unable to connect to {}: {}", address, reason)
            }
            Self::DeadlineExceeded => write!(f, "Deadline exceeded waiting for Name Service"),
            Self::Protocol(s) => write!(f, "Protocol error: {}", s),
            Self::LookupValueMalformed { name, value } => {
                write!(f, "Malformed value for lookup {}: {:?}", name, value)
            }
            Self::NotConnected => write!(f, "Session is not connected"),
            Self::NoEndpoints => write!(f, "No valid Name Service endpoints found"),
            Self::Config(s) => write!(f, "Configuration error: {}", s),
        }
    }
}

impl std::error::Error for NsError {}

impl From<io::Error> for NsError {
    fn from(e: io::Error) -> Self {
        if is_timeout_kind(e.kind()) {
            Self::DeadlineExceeded
        } else {
            Self::Protocol(e.to_string())
        }
    }
}

impl From<PackedIntError> for NsError {
    fn from(e: PackedIntError) -> Self {
        match e {
            PackedIntError::Io(inner) => inner.into(),
            other => Self::Protocol(other.to_string()),
        }
    }
}

impl From<FrameError> for NsError {
    fn from(e: FrameError) -> Self {
        match e {
            FrameError::Io(inner) => inner.into(),
            FrameError::PackedInt(inner) => inner.into(),
            other => Self::Protocol(other.to_string()),
        }
    }
}

impl From<ConfigError> for NsError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeouts_map_to_deadline() {
        let err: NsError = io::Error::new(io::ErrorKind::WouldBlock, "EAGAIN").into();
        assert!(matches!(err, NsError::DeadlineExceeded));

        let err: NsError = FrameError::PackedInt(PackedIntError::Io(io::Error::new(
            io::ErrorKind::TimedOut,
            "slow",
        )))
        .into();
        assert!(matches!(err, NsError::DeadlineExceeded));
    }

    #[test]
    fn test_frame_errors_map_to_protocol() {
        let err: NsError = FrameError::NonPositiveLength(-1).into();
        assert!(matches!(err, NsError::Protocol(ref s) if s.contains("negative")));

        let err: NsError = io::Error::new(io::ErrorKind::ConnectionReset, "reset").into();
        assert!(matches!(err, NsError::Protocol(_)));
    }

    #[test]
    fn test_display() {
        let err = NsError::LookupValueMalformed {
            name: "NameService/string/Cluster/foreign/c2/NameService/localPort".into(),
            value: "abc".into(),
        };
        assert!(err.to_string().contains("\"abc\""));
        assert!(NsError::NotConnected.to_string().contains("not connected"));
    }
}
