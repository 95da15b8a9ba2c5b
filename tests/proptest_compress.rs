use freshcrop::media::{compress_blocking, CompressionOptions, ImageReference, OutputFormat};
use proptest::prelude::*;

mod common;
mod proptest_helpers;

fn arb_options() -> impl Strategy<Value = CompressionOptions> {
    (1u32..=100, 1u32..=256, any::<bool>(), any::<bool>()).prop_map(
        |(quality, max_width, png, payload)| CompressionOptions {
            quality: quality as f32 / 100.0,
            max_width,
            format: if png {
                OutputFormat::Png
            } else {
                OutputFormat::Jpeg
            },
            return_encoded_payload: payload,
        },
    )
}

proptest! {
    #![proptest_config(proptest_helpers::proptest_config())]

    #[test]
    fn arbitrary_bytes_never_escape_as_errors(
        bytes in prop::collection::vec(any::<u8>(), 0..256),
        options in arb_options(),
    ) {
        let reference = ImageReference::from_bytes(bytes);
        let result = compress_blocking(&reference, &options);
        if result.is_fallback() {
            prop_assert_eq!(&result.reference, &reference);
            prop_assert!(result.encoded_payload.is_none());
        }
    }
}

proptest! {
    #![proptest_config(proptest_helpers::codec_proptest_config())]

    #[test]
    fn resize_only_when_wider_than_max(
        width in 1u32..=200,
        height in 1u32..=200,
        options in arb_options(),
    ) {
        let reference = ImageReference::from_bytes(common::png_bytes(width, height));
        let result = compress_blocking(&reference, &options);
        prop_assert!(!result.is_fallback(), "{:?}", result.failure_reason);

        let out_width = result.width.expect("width");
        if width <= options.max_width {
            prop_assert_eq!(out_width, width);
            prop_assert_eq!(result.height, Some(height));
        } else {
            prop_assert!(out_width <= options.max_width);
        }
        prop_assert_eq!(result.encoded_payload.is_some(), options.return_encoded_payload);
    }
}
