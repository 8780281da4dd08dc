// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use gridns::codec::{decode_packed_int, encode_packed_int, MAX_PACKED_INT_LEN};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok((value, continuation)) = decode_packed_int(data) {
        assert!(continuation < MAX_PACKED_INT_LEN);
        // Re-encoding yields the canonical form, never longer than the input.
        let encoded = encode_packed_int(value);
        assert!(encoded.len() <= continuation + 1);
        assert_eq!(decode_packed_int(&encoded).ok(), Some((value, encoded.len() - 1)));
    }
});
