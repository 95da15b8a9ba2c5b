//! Fuzz target for detector bounding-box parsing and crop geometry.
//!
//! Any JSON value that parses as a box must yield a crop region inside the
//! image, for any image size.
//!
//! Run with:
//!   cargo +nightly fuzz run bbox_json_parse

#![no_main]

use freshcrop::geom::{CropRegion, DetectionBox, Dimensions};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 || data.len() > 64 * 1024 {
        return;
    }

    let width = u16::from_le_bytes([data[0], data[1]]) as u32;
    let height = u16::from_le_bytes([data[2], data[3]]) as u32;
    let Some(dims) = Dimensions::new(width, height) else {
        return;
    };

    let Ok(value) = serde_json::from_slice::<serde_json::Value>(&data[4..]) else {
        return;
    };
    let Ok(bbox) = DetectionBox::try_from_json(&value) else {
        return;
    };

    if let Some(region) = CropRegion::from_bounding_box(&bbox, dims) {
        assert!(region.fits_within(dims), "{region:?} escapes {dims}");
    }
});
