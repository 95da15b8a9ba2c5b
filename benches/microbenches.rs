//! Criterion microbenches for freshcrop geometry, reply parsing and codecs.
//!
//! Run with: `cargo bench`
//!
//! These benchmarks measure the performance of:
//! - Crop region computation (CropRegion::from_bounding_box)
//! - Vision reply parsing (parse_detection_response)
//! - Compression and thumbnail rendering on a small in-memory photo

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::hint::black_box;
use std::io::Cursor;

use freshcrop::capture::parse_detection_response;
use freshcrop::geom::{CropRegion, DetectionBox, Dimensions};
use freshcrop::media::{compress_blocking, render_thumbnail, CompressionOptions, ImageReference};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

const REPLY_FIXTURE: &str = r#"```json
{"items": [
  {"name": "사과", "quantity": 3, "unit": "개", "category": "과일", "box_2d": [100, 200, 400, 600]},
  {"name": "우유", "quantity": "1", "unit": "팩", "category": "유제품", "box_2d": [450, 50, 900, 300]},
  {"name": "당근", "quantity": 2, "category": "채소", "box_2d": [5]},
  {"name": "", "quantity": 1}
]}
```"#;

fn photo(width: u32, height: u32) -> ImageReference {
    let img = RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 90]));
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, ImageFormat::Jpeg)
        .unwrap();
    ImageReference::from_bytes(buf.into_inner())
}

/// Benchmark crop geometry for a handful of representative boxes.
fn bench_crop_region(c: &mut Criterion) {
    let dims = Dimensions::new(1920, 1440).unwrap();
    let boxes: Vec<DetectionBox> = [
        [100.0, 200.0, 400.0, 600.0],
        [0.0, 0.0, 20.0, 20.0],
        [900.0, 900.0, 1000.0, 1000.0],
        [0.0, 0.0, 1000.0, 1000.0],
    ]
    .iter()
    .map(|v| DetectionBox::try_from_values(v).unwrap())
    .collect();

    let mut group = c.benchmark_group("crop_region");
    group.throughput(Throughput::Elements(boxes.len() as u64));

    group.bench_function("from_bounding_box", |b| {
        b.iter(|| {
            for bbox in &boxes {
                black_box(CropRegion::from_bounding_box(black_box(bbox), dims));
            }
        })
    });

    group.finish();
}

/// Benchmark parsing a fenced model reply.
fn bench_reply_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("reply_parse");
    group.throughput(Throughput::Bytes(REPLY_FIXTURE.len() as u64));

    group.bench_function("parse_detection_response", |b| {
        b.iter(|| {
            let items = parse_detection_response(black_box(REPLY_FIXTURE)).unwrap();
            black_box(items)
        })
    });

    group.finish();
}

/// Benchmark the AI-submission profile on a photo that needs downscaling.
fn bench_compress(c: &mut Criterion) {
    let reference = photo(960, 720);
    let options = CompressionOptions {
        max_width: 640,
        ..Default::default()
    };

    let mut group = c.benchmark_group("compress");
    group.sample_size(20);

    group.bench_function("compress_blocking_960_to_640", |b| {
        b.iter(|| black_box(compress_blocking(black_box(&reference), &options)))
    });

    group.finish();
}

/// Benchmark rendering one thumbnail with known dimensions.
fn bench_thumbnail(c: &mut Criterion) {
    let reference = photo(960, 720);
    let dims = Dimensions::new(960, 720).unwrap();
    let bbox = DetectionBox::try_from_values(&[100.0, 200.0, 400.0, 600.0]).unwrap();

    let mut group = c.benchmark_group("thumbnail");
    group.sample_size(20);

    group.bench_function("render_thumbnail_100", |b| {
        b.iter(|| {
            let thumb = render_thumbnail(black_box(&reference), &bbox, 100, Some(dims)).unwrap();
            black_box(thumb)
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_crop_region,
    bench_reply_parse,
    bench_compress,
    bench_thumbnail,
);
criterion_main!(benches);
