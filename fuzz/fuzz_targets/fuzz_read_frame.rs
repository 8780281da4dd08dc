// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use gridns::codec::read_frame;
use libfuzzer_sys::fuzz_target;

// Small ceiling so hostile lengths are rejected rather than allocated.
const MAX_FRAME: usize = 64 * 1024;

fuzz_target!(|data: &[u8]| {
    let mut cursor = data;
    while let Ok(frame) = read_frame(&mut cursor, MAX_FRAME) {
        assert!(!frame.is_empty() && frame.len() <= MAX_FRAME);
    }
});
