// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Packed (variable-length, signed) integer encoding.
//!
//! Every length on the Name Service wire is a packed integer, as is the
//! length of each string value embedded in a lookup reply.
//!
//! # Encoding Rules
//!
//! ```text
//! first byte:        [C][S][d5 d4 d3 d2 d1 d0]   C = continuation, S = sign
//! continuation byte: [C][d6 d5 d4 d3 d2 d1 d0]
//! ```
//!
//! - The first byte carries the low 6 magnitude bits, each continuation byte
//!   the next 7 (shifted by 6, 13, 20, ...).
//! - Negative values are written as the bitwise complement of the value with
//!   the sign bit set, so `-1` encodes as `0x40`.
//! - Any `i64` fits in at most 10 bytes.
//!
//! # Examples
//!
//! ```
//! use gridns::codec::packed::{decode_packed_int, encode_packed_int};
//!
//! let buf = encode_packed_int(64);
//! assert_eq!(buf, [0x80, 0x01]);
//!
//! let (value, continuation) = decode_packed_int(&buf).unwrap();
//! assert_eq!(value, 64);
//! assert_eq!(continuation, 1);
//! ```

use std::io::{self, Read, Write};

/// Maximum bytes needed to encode an i64.
pub const MAX_PACKED_INT_LEN: usize = 10;

const CONTINUATION_BIT: u8 = 0x80;
const SIGN_BIT: u8 = 0x40;
const FIRST_DATA_MASK: u8 = 0x3F;
const DATA_MASK: u8 = 0x7F;
const FIRST_DATA_BITS: u32 = 6;
const DATA_BITS: u32 = 7;

/// Magnitude width once negatives have been complemented.
const MAGNITUDE_BITS: u32 = 63;

/// Error returned when packed integer decoding fails.
#[derive(Debug)]
pub enum PackedIntError {
    /// Input ended before the terminating byte.
    UnexpectedEof,
    /// Magnitude does not fit in 63 bits.
    Overflow,
    /// Underlying reader failed.
    Io(io::Error),
}

impl std::fmt::Display for PackedIntError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedEof => write!(f, "unexpected end of input while reading packed int"),
            Self::Overflow => write!(f, "packed int overflow (magnitude exceeds 63 bits)"),
            Self::Io(e) => write!(f, "unable to read packed int: {}", e),
        }
    }
}

impl std::error::Error for PackedIntError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PackedIntError> for io::Error {
    fn from(e: PackedIntError) -> Self {
        match e {
            PackedIntError::Io(inner) => inner,
            PackedIntError::UnexpectedEof => io::Error::new(io::ErrorKind::UnexpectedEof, e),
            PackedIntError::Overflow => io::Error::new(io::ErrorKind::InvalidData, e),
        }
    }
}

/// Encode `n` into a fixed array, returning the array and the encoded length.
#[inline]
pub fn encode_packed_int_array(n: i64) -> ([u8; MAX_PACKED_INT_LEN], usize) {
    let mut buf = [0u8; MAX_PACKED_INT_LEN];

    let (mut magnitude, mut byte) = if n < 0 {
        ((!n) as u64, SIGN_BIT)
    } else {
        (n as u64, 0)
    };

    byte |= (magnitude as u8) & FIRST_DATA_MASK;
    magnitude >>= FIRST_DATA_BITS;

    let mut len = 0;
    while magnitude != 0 {
        buf[len] = byte | CONTINUATION_BIT;
        len += 1;
        byte = (magnitude as u8) & DATA_MASK;
        magnitude >>= DATA_BITS;
    }
    buf[len] = byte;

    (buf, len + 1)
}

/// Encode `n` into a freshly allocated buffer.
pub fn encode_packed_int(n: i64) -> Vec<u8> {
    let (buf, len) = encode_packed_int_array(n);
    buf[..len].to_vec()
}

/// Write `n` to `w` as a packed integer.
pub fn write_packed_int<W: Write + ?Sized>(w: &mut W, n: i64) -> io::Result<()> {
    let (buf, len) = encode_packed_int_array(n);
    w.write_all(&buf[..len])
}

/// Number of bytes `n` occupies once encoded.
#[must_use]
pub const fn packed_int_len(n: i64) -> usize {
    let magnitude = if n < 0 { !n as u64 } else { n as u64 };
    let bits = (64 - magnitude.leading_zeros()) as usize;
    if bits <= FIRST_DATA_BITS as usize {
        1
    } else {
        1 + (bits - FIRST_DATA_BITS as usize).div_ceil(DATA_BITS as usize)
    }
}

/// Read one packed integer from `r`.
///
/// Returns `(value, continuation_bytes)`; the total bytes consumed is
/// `continuation_bytes + 1`. Callers decoding embedded strings need the
/// count to locate the bytes that follow the length.
pub fn read_packed_int<R: Read + ?Sized>(r: &mut R) -> Result<(i64, usize), PackedIntError> {
    let mut byte = read_byte(r)?;
    let negative = byte & SIGN_BIT != 0;
    let mut magnitude = u64::from(byte & FIRST_DATA_MASK);
    let mut shift = FIRST_DATA_BITS;
    let mut continuation = 0;

    while byte & CONTINUATION_BIT != 0 {
        if continuation + 1 >= MAX_PACKED_INT_LEN {
            return Err(PackedIntError::Overflow);
        }
        byte = read_byte(r)?;
        continuation += 1;

        let data = u64::from(byte & DATA_MASK);

        // Only the bits below MAGNITUDE_BITS may be set in the last chunk.
        if shift + DATA_BITS > MAGNITUDE_BITS && data >> (MAGNITUDE_BITS - shift) != 0 {
            return Err(PackedIntError::Overflow);
        }

        magnitude |= data << shift;
        shift += DATA_BITS;
    }

    let value = magnitude as i64;
    Ok((if negative { !value } else { value }, continuation))
}

/// Decode one packed integer from the front of `buf`.
///
/// Same return convention as [`read_packed_int`]; trailing bytes are ignored.
pub fn decode_packed_int(buf: &[u8]) -> Result<(i64, usize), PackedIntError> {
    let mut cursor = buf;
    read_packed_int(&mut cursor)
}

fn read_byte<R: Read + ?Sized>(r: &mut R) -> Result<u8, PackedIntError> {
    let mut b = [0u8; 1];
    match r.read_exact(&mut b) {
        Ok(()) => Ok(b[0]),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(PackedIntError::UnexpectedEof),
        Err(e) => Err(PackedIntError::Io(e)),
    }
}
