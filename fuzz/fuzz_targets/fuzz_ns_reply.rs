// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use gridns::lookup::parse_reply;
use gridns::negotiate::extract_channel_id;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Fuzz CHANNEL_OPEN reply parser
    if let Ok(channel) = extract_channel_id(data) {
        assert!(!channel.is_empty());

        // Fuzz lookup reply parser with the channel it yielded
        let _ = parse_reply(&channel, data);
    }

    // And with a fixed two-byte channel
    let channel = gridns::ChannelId::new(vec![0x03, 0x9A]);
    let _ = parse_reply(&channel, data);
});
