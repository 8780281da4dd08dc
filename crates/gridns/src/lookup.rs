// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Name Service lookup requests and replies.
//!
//! Request layout:
//!
//! ```text
//! +------------+-----------------+-------------------+-------------+------+
//! | channel id | NS_LOOKUP_REQID | name len (packed) | name (UTF-8)| 0x40 |
//! +------------+-----------------+-------------------+-------------+------+
//! ```
//!
//! Reply layout:
//!
//! ```text
//! +------------+--------+--------------------------------------------------+
//! | channel id | req id | tail                                             |
//! +------------+--------+--------------------------------------------------+
//! tail: [6 header bytes][value len (packed)][value bytes]...
//! ```
//!
//! A tail of 7 bytes or fewer means the name is not bound.

use crate::codec::packed::{decode_packed_int, encode_packed_int_array};
use crate::codec::wire::{
    NS_LOOKUP_REQID, REPLY_EMPTY_MAX_LEN, REPLY_VALUE_LEN_OFFSET, REQUEST_ID_LEN, REQ_END_MARKER,
};
use crate::error::NsError;
use crate::negotiate::ChannelId;

/// Prefix for string-valued Name Service bindings.
pub const NS_PREFIX: &str = "NameService/string/";

/// Name of the cluster owning the port.
pub const CLUSTER_NAME: &str = "Cluster/name";

/// Human readable cluster description.
pub const CLUSTER_INFO: &str = "Cluster/info";

/// Bracketed list of foreign clusters sharing the port.
pub const CLUSTER_FOREIGN: &str = "NameService/string/Cluster/foreign";

/// Management over REST endpoints.
pub const MANAGEMENT_URL: &str = "NameService/string/management/HTTPManagementURL";

/// JMX service URLs.
pub const JMX_URL: &str = "management/JMXServiceURL";

/// Metrics endpoints.
pub const METRICS_URL: &str = "NameService/string/metrics/HTTPMetricsURL";

/// Health check endpoints.
pub const HEALTH_URL: &str = "NameService/string/health/HTTPHealthURL";

/// gRPC proxy endpoints.
pub const GRPC_PROXY: &str = "NameService/string/$GRPC:GrpcProxy";

/// Fixed lookup names, in display order.
pub const WELL_KNOWN_LOOKUPS: &[&str] = &[
    CLUSTER_NAME,
    CLUSTER_INFO,
    CLUSTER_FOREIGN,
    MANAGEMENT_URL,
    JMX_URL,
    METRICS_URL,
    HEALTH_URL,
    GRPC_PROXY,
];

/// Lookup name for the local Name Service port of a foreign cluster.
pub fn foreign_local_port(cluster: &str) -> String {
    format!("{}/{}/NameService/localPort", CLUSTER_FOREIGN, cluster)
}

/// Build the request payload for `name` on `channel`.
pub fn build_request(channel: &ChannelId, name: &str) -> Vec<u8> {
    let name = name.as_bytes();
    let (len_prefix, prefix_len) = encode_packed_int_array(name.len() as i64);

    let mut request =
        Vec::with_capacity(channel.len() + NS_LOOKUP_REQID.len() + prefix_len + name.len() + 1);
    request.extend_from_slice(channel.as_bytes());
    request.extend_from_slice(&NS_LOOKUP_REQID);
    request.extend_from_slice(&len_prefix[..prefix_len]);
    request.extend_from_slice(name);
    request.push(REQ_END_MARKER);
    request
}

/// Decode a reply frame into its string value.
///
/// Returns an empty string when the name is not bound.
pub fn parse_reply(channel: &ChannelId, reply: &[u8]) -> Result<String, NsError> {
    let header = channel.len() + REQUEST_ID_LEN;
    let tail = reply.get(header..).ok_or_else(|| {
        NsError::Protocol(format!(
            "reply of {} bytes shorter than {} byte header",
            reply.len(),
            header
        ))
    })?;

    if tail.len() <= REPLY_EMPTY_MAX_LEN {
        return Ok(String::new());
    }

    let (value_len, continuation) = decode_packed_int(&tail[REPLY_VALUE_LEN_OFFSET..])?;
    let value_len = usize::try_from(value_len)
        .map_err(|_| NsError::Protocol(format!("negative value length {}", value_len)))?;

    let start = REPLY_VALUE_LEN_OFFSET + continuation + 1;
    let value = start
        .checked_add(value_len)
        .and_then(|end| tail.get(start..end))
        .ok_or_else(|| {
            NsError::Protocol(format!(
                "value length {} overruns {} byte reply",
                value_len,
                tail.len()
            ))
        })?;

    Ok(String::from_utf8_lossy(value).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::packed::encode_packed_int;

    fn channel() -> ChannelId {
        ChannelId::new(vec![0x03, 0x9A, 0x11])
    }

    /// Reply frame as the Name Service lays it out for a string value.
    fn reply_for(channel: &ChannelId, value: &str) -> Vec<u8> {
        let mut reply = channel.as_bytes().to_vec();
        reply.push(0x01);
        reply.extend_from_slice(&[0x00, 0x42, 0x00, 0x01, 0x4E, 0x02]);
        reply.extend_from_slice(&encode_packed_int(value.len() as i64));
        reply.extend_from_slice(value.as_bytes());
        reply.push(0x40);
        reply
    }

    #[test]
    fn test_build_request_layout() {
        let request = build_request(&channel(), CLUSTER_NAME);

        let mut expected = vec![0x03, 0x9A, 0x11];
        expected.extend_from_slice(&NS_LOOKUP_REQID);
        expected.push(12);
        expected.extend_from_slice(b"Cluster/name");
        expected.push(0x40);
        assert_eq!(request, expected);
    }

    #[test]
    fn test_build_request_long_name() {
        let name = "x".repeat(100);
        let request = build_request(&channel(), &name);
        let len_at = 3 + NS_LOOKUP_REQID.len();
        assert_eq!(&request[len_at..len_at + 2], &[0xA4, 0x01]);
        assert_eq!(request.len(), len_at + 2 + 100 + 1);
    }

    #[test]
    fn test_parse_reply_value() {
        let ch = channel();
        assert_eq!(parse_reply(&ch, &reply_for(&ch, "cluster1")).unwrap(), "cluster1");
    }

    #[test]
    fn test_parse_reply_multibyte_length() {
        let ch = channel();
        let value = "[http://127.0.0.1:30000/management/coherence/cluster]".repeat(3);
        assert!(value.len() > 63);
        assert_eq!(parse_reply(&ch, &reply_for(&ch, &value)).unwrap(), value);
    }

    #[test]
    fn test_parse_reply_not_found() {
        let ch = channel();
        let mut reply = ch.as_bytes().to_vec();
        reply.push(0x01);
        assert_eq!(parse_reply(&ch, &reply).unwrap(), "");

        reply.extend_from_slice(&[0u8; REPLY_EMPTY_MAX_LEN]);
        assert_eq!(parse_reply(&ch, &reply).unwrap(), "");
    }

    #[test]
    fn test_parse_reply_shorter_than_header() {
        let ch = channel();
        assert!(matches!(parse_reply(&ch, &[0x03]), Err(NsError::Protocol(_))));
    }

    #[test]
    fn test_parse_reply_overrun() {
        let ch = channel();
        let mut reply = reply_for(&ch, "abc");
        // Claim 40 bytes of value where only 4 remain.
        let len_at = ch.len() + 1 + REPLY_VALUE_LEN_OFFSET;
        reply[len_at] = 40;
        assert!(matches!(parse_reply(&ch, &reply), Err(NsError::Protocol(_))));
    }

    #[test]
    fn test_parse_reply_negative_length() {
        let ch = channel();
        let mut reply = reply_for(&ch, "abc");
        let len_at = ch.len() + 1 + REPLY_VALUE_LEN_OFFSET;
        reply[len_at] = 0x41;
        assert!(matches!(parse_reply(&ch, &reply), Err(NsError::Protocol(_))));
    }

    #[test]
    fn test_parse_reply_invalid_utf8_is_lossy() {
        let ch = channel();
        let mut reply = reply_for(&ch, "ab");
        let value_at = ch.len() + 1 + REPLY_VALUE_LEN_OFFSET + 1;
        reply[value_at] = 0xFF;
        assert_eq!(parse_reply(&ch, &reply).unwrap(), "\u{FFFD}b");
    }

    #[test]
    fn test_foreign_local_port_name() {
        assert_eq!(
            foreign_local_port("cluster2"),
            "NameService/string/Cluster/foreign/cluster2/NameService/localPort"
        );
        assert!(CLUSTER_FOREIGN.starts_with(NS_PREFIX));
        assert!(MANAGEMENT_URL.starts_with(NS_PREFIX));
    }
}
