//! Fuzz target for vision-service reply parsing.
//!
//! Replies are free-form model output, so parsing must never panic and every
//! kept item must satisfy the item rules.
//!
//! Run with:
//!   cargo +nightly fuzz run detection_reply_parse

#![no_main]

use freshcrop::capture::parse_detection_response;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 1024 * 1024 {
        return;
    }
    let Ok(reply) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(items) = parse_detection_response(reply) {
        for item in items {
            assert!(!item.name.trim().is_empty());
            assert!(item.quantity.is_finite() && item.quantity > 0.0);
        }
    }
});
