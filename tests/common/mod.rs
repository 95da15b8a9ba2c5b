#![allow(dead_code)]

use std::fs;
use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

/// A solid-color image with a brighter square in the middle, so crops of
/// different regions decode to different pixels.
pub fn photo(width: u32, height: u32) -> DynamicImage {
    let mut img = RgbImage::from_pixel(width, height, Rgb([40, 90, 40]));
    let (x0, y0) = (width / 4, height / 4);
    for y in y0..(y0 + height / 2) {
        for x in x0..(x0 + width / 2) {
            img.put_pixel(x, y, Rgb([230, 60, 50]));
        }
    }
    DynamicImage::ImageRgb8(img)
}

pub fn encoded(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    photo(width, height)
        .write_to(&mut buf, format)
        .expect("encode test photo");
    buf.into_inner()
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encoded(width, height, ImageFormat::Png)
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    encoded(width, height, ImageFormat::Jpeg)
}

pub fn write_png(path: &Path, width: u32, height: u32) {
    write_bytes(path, &png_bytes(width, height));
}

pub fn write_jpeg(path: &Path, width: u32, height: u32) {
    write_bytes(path, &jpeg_bytes(width, height));
}

pub fn write_bytes(path: &Path, bytes: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, bytes).expect("write test file");
}

/// A vision-service reply in the shape the model actually sends: fenced,
/// with one usable box, one malformed box and one item without a box.
pub const FENCED_REPLY: &str = r#"Sure! Here are the items:
```json
{
  "items": [
    {"name": "사과", "quantity": 3, "unit": "개", "category": "과일", "box_2d": [100, 200, 400, 600]},
    {"name": "우유", "quantity": "1", "unit": "팩", "category": "유제품", "box_2d": [5]},
    {"name": "당근", "quantity": 2, "category": "채소"},
    {"name": "", "quantity": 1}
  ]
}
```"#;
