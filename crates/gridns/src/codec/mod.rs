// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Name Service wire codec.
//!
//! - [`packed`]: variable-length signed integers
//! - [`frame`]: length-prefixed frames over a byte stream
//! - [`wire`]: fixed handshake vectors and reply offsets

pub mod frame;
pub mod packed;
pub mod wire;

pub use frame::{read_frame, write_frame, FrameError, DEFAULT_MAX_FRAME_SIZE};
pub use packed::{
    decode_packed_int, encode_packed_int, read_packed_int, write_packed_int, PackedIntError,
    MAX_PACKED_INT_LEN,
};
