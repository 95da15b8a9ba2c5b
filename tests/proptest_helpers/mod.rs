#![allow(dead_code)]

use freshcrop::geom::{DetectionBox, Dimensions};
use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// Fewer cases for properties that run the codecs.
pub fn codec_proptest_config() -> ProptestConfig {
    let mut config = proptest_config();
    config.cases = config.cases.min(16);
    config
}

pub fn arb_dimensions(max: u32) -> BoxedStrategy<Dimensions> {
    (1u32..=max, 1u32..=max)
        .prop_filter_map("non-zero dimensions", |(w, h)| Dimensions::new(w, h))
        .boxed()
}

/// Ordered boxes with every coordinate inside `0..=1000`.
pub fn arb_ordered_box() -> BoxedStrategy<DetectionBox> {
    (0u32..1000, 0u32..1000, 1u32..=1000, 1u32..=1000)
        .prop_map(|(ymin, xmin, h, w)| {
            let ymax = (ymin + h).min(1000).max(ymin + 1);
            let xmax = (xmin + w).min(1000).max(xmin + 1);
            DetectionBox::from_yxyx(ymin as f64, xmin as f64, ymax as f64, xmax as f64)
        })
        .boxed()
}

/// Any four finite numbers, including out-of-range and inverted boxes.
pub fn arb_any_box() -> BoxedStrategy<DetectionBox> {
    prop::array::uniform4(-2000.0f64..3000.0)
        .prop_map(|[ymin, xmin, ymax, xmax]| DetectionBox::from_yxyx(ymin, xmin, ymax, xmax))
        .boxed()
}
