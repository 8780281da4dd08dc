// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Name Service address parsing.
//!
//! Accepted forms:
//!
//! - `""` → `localhost:7574`
//! - `"host"` → `host:7574`
//! - `"host:port"` with `1024 <= port <= 65535`
//!
//! Anything else (extra colons, empty host, non-numeric or out-of-range
//! port) is rejected before any socket is opened.

use crate::error::NsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Host used when no address is given.
pub const DEFAULT_HOST: &str = "localhost";

/// Well-known Name Service port.
pub const DEFAULT_PORT: u16 = 7574;

/// Lowest port accepted from user input.
pub const MIN_PORT: u16 = 1024;

/// Highest port accepted from user input.
pub const MAX_PORT: u16 = 65535;

/// A Name Service endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NsAddress {
    pub host: String,
    pub port: u16,
}

impl NsAddress {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Parse a user-supplied `host[:port]`.
    pub fn parse(address: &str) -> Result<Self, NsError> {
        if address.is_empty() {
            return Ok(Self::default());
        }

        let parts: Vec<&str> = address.split(':').collect();
        match parts.as_slice() {
            [host] => Ok(Self::new(*host, DEFAULT_PORT)),
            [host, port] => {
                if host.is_empty() {
                    return Err(NsError::AddressInvalid(format!(
                        "missing host in [{}]",
                        address
                    )));
                }
                let port: u32 = port.parse().map_err(|_| {
                    NsError::AddressInvalid(format!("invalid port value of [{}]", port))
                })?;
                if port < u32::from(MIN_PORT) || port > u32::from(MAX_PORT) {
                    return Err(NsError::AddressInvalid(format!(
                        "value for port of {} is invalid",
                        port
                    )));
                }
                Ok(Self::new(*host, port as u16))
            }
            _ => Err(NsError::AddressInvalid(format!(
                "invalid value for host/port of [{}]",
                address
            ))),
        }
    }
}

impl Default for NsAddress {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

impl FromStr for NsAddress {
    type Err = NsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for NsAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(NsAddress::parse("").unwrap(), NsAddress::new("localhost", 7574));
        assert_eq!(NsAddress::parse("grid01").unwrap(), NsAddress::new("grid01", 7574));
    }

    #[test]
    fn test_parse_valid() {
        assert_eq!(
            NsAddress::parse("server:8000").unwrap(),
            NsAddress::new("server", 8000)
        );
        assert_eq!(NsAddress::parse("h:1024").unwrap().port, 1024);
        assert_eq!(NsAddress::parse("h:65535").unwrap().port, 65535);
    }

    #[test]
    fn test_parse_invalid() {
        for bad in [
            "host:123:123",
            "host:1233f",
            "host:-1",
            "host:1023",
            "host:65536",
            "host:",
            ":8000",
            "host:99999999999",
        ] {
            assert!(
                matches!(NsAddress::parse(bad), Err(NsError::AddressInvalid(_))),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_every_valid_port_roundtrips() {
        for port in MIN_PORT..=MAX_PORT {
            let text = format!("h:{}", port);
            let parsed: NsAddress = text.parse().unwrap();
            assert_eq!(parsed, NsAddress::new("h", port));
            assert_eq!(parsed.to_string(), text);
        }
    }

    #[test]
    fn test_out_of_range_ports() {
        for port in [0u32, 1, 80, 1023, 65536, 70000] {
            assert!(NsAddress::parse(&format!("h:{}", port)).is_err());
        }
    }
}
