//! Square crop regions derived from detector boxes.

use serde::Serialize;
use tracing::debug;

use super::bbox::DetectionBox;
use super::dimensions::Dimensions;

/// Padding applied around the detected box, as a multiplier on its longer side.
pub const CROP_PADDING: f64 = 1.1;

/// A square pixel region that lies entirely inside its image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CropRegion {
    pub origin_x: u32,
    pub origin_y: u32,
    pub size: u32,
}

impl CropRegion {
    /// Computes the padded square crop for `bbox` on an image of `dims`.
    ///
    /// The square is centered on the box, 10% larger than its longer side,
    /// pushed back inside the image when it would overhang an edge, and
    /// shrunk when it is larger than the image itself. Returns `None` when the
    /// result would be empty, which happens when neither side of the box
    /// spans a whole pixel.
    pub fn from_bounding_box(bbox: &DetectionBox, dims: Dimensions) -> Option<CropRegion> {
        if !bbox.is_finite() {
            return None;
        }

        let image_w = dims.width() as f64;
        let image_h = dims.height() as f64;

        let px = bbox.to_pixel(dims);
        let box_w = px.width();
        let box_h = px.height();
        let center = px.center();

        let crop_size = box_w.max(box_h) * CROP_PADDING;

        let crop_x = (center.x - crop_size / 2.0)
            .min(image_w - crop_size)
            .max(0.0);
        let crop_y = (center.y - crop_size / 2.0)
            .min(image_h - crop_size)
            .max(0.0);

        let final_size = crop_size.min(image_w - crop_x).min(image_h - crop_y);

        debug!(
            image = %dims,
            box_w,
            box_h,
            center_x = center.x,
            center_y = center.y,
            crop_size,
            crop_x,
            crop_y,
            final_size,
            "computed crop region"
        );

        if final_size.is_nan() || final_size < 1.0 {
            return None;
        }

        // Flooring each part keeps origin + size within the float bounds above.
        Some(CropRegion {
            origin_x: crop_x.floor() as u32,
            origin_y: crop_y.floor() as u32,
            size: final_size.floor() as u32,
        })
    }

    /// Returns true if the region lies within an image of `dims`.
    pub fn fits_within(&self, dims: Dimensions) -> bool {
        self.size > 0
            && u64::from(self.origin_x) + u64::from(self.size) <= u64::from(dims.width())
            && u64::from(self.origin_y) + u64::from(self.size) <= u64::from(dims.height())
    }
}
