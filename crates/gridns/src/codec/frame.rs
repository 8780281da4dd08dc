// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Length-prefix framing for the multiplexed Name Service stream.
//!
//! ```text
//! +----------------------+-------------------+
//! | Length (packed int)  | Payload           |
//! +----------------------+-------------------+
//! ```
//!
//! The declared length must be at least 1. Zero or negative lengths are a
//! protocol error and end the session. Lengths above the configured ceiling
//! are rejected before the payload buffer is allocated.

use super::packed::{encode_packed_int_array, read_packed_int, PackedIntError};
use std::io::{self, Read, Write};

/// Default maximum frame size (16 MB).
pub const DEFAULT_MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

/// Framing error types.
#[derive(Debug)]
pub enum FrameError {
    /// Attempt to send a zero-length frame.
    Empty,
    /// Peer declared a zero or negative length.
    NonPositiveLength(i64),
    /// Declared length exceeds the ceiling.
    TooLarge { len: u64, max: usize },
    /// Stream ended before the declared length was delivered.
    Truncated { expected: usize, received: usize },
    /// Length prefix could not be decoded.
    PackedInt(PackedIntError),
    /// Underlying stream failed.
    Io(io::Error),
}

impl FrameError {
    /// True when the failure was the socket deadline expiring.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Io(e) | Self::PackedInt(PackedIntError::Io(e)) => is_timeout_kind(e.kind()),
            _ => false,
        }
    }
}

pub(crate) fn is_timeout_kind(kind: io::ErrorKind) -> bool {
    matches!(kind, io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock)
}

impl std::fmt::Display for FrameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "refusing to send an empty frame"),
            Self::NonPositiveLength(0) => write!(f, "received a message with a length of zero"),
            Self::NonPositiveLength(n) => {
                write!(f, "received a message with a negative length ({})", n)
            }
            Self::TooLarge { len, max } => write!(f, "frame too large: {} > {}", len, max),
            Self::Truncated { expected, received } => write!(
                f,
                "frame truncated: expected {} bytes, received {}",
                expected, received
            ),
            Self::PackedInt(e) => write!(f, "invalid frame length: {}", e),
            Self::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for FrameError {}

impl From<PackedIntError> for FrameError {
    fn from(e: PackedIntError) -> Self {
        Self::PackedInt(e)
    }
}

impl From<io::Error> for FrameError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// Write `payload` as one frame.
///
/// Prefix and payload are assembled first so they leave in a single write.
pub fn write_frame<W: Write + ?Sized>(w: &mut W, payload: &[u8]) -> Result<(), FrameError> {
    if payload.is_empty() {
        return Err(FrameError::Empty);
    }
    let len = i64::try_from(payload.len()).map_err(|_| FrameError::TooLarge {
        len: payload.len() as u64,
        max: i64::MAX as usize,
    })?;

    let (prefix, prefix_len) = encode_packed_int_array(len);
    let mut frame = Vec::with_capacity(prefix_len + payload.len());
    frame.extend_from_slice(&prefix[..prefix_len]);
    frame.extend_from_slice(payload);

    w.write_all(&frame)?;
    w.flush()?;
    Ok(())
}

/// Read one frame, enforcing `max_size` on the declared length.
pub fn read_frame<R: Read + ?Sized>(r: &mut R, max_size: usize) -> Result<Vec<u8>, FrameError> {
    let (len, _) = read_packed_int(r)?;
    if len <= 0 {
        return Err(FrameError::NonPositiveLength(len));
    }

    let len = match usize::try_from(len) {
        Ok(len) if len <= max_size => len,
        _ => {
            return Err(FrameError::TooLarge {
                len: len as u64,
                max: max_size,
            })
        }
    };

    let mut buf = vec![0u8; len];
    let mut filled = 0;
    while filled < len {
        match r.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(FrameError::Truncated {
                    expected: len,
                    received: filled,
                })
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(FrameError::Io(e)),
        }
    }

    Ok(buf)
}
