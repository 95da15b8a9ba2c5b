//! Geometry for detector boxes and thumbnail crops.
//!
//! Detector boxes arrive in a normalized `0..=1000` space and are converted
//! to pixel space against the dimensions of whichever copy of the photo is
//! being cropped. Marker types keep the two spaces apart:
//!
//! ```
//! use freshcrop::geom::{CropRegion, Dimensions, DetectionBox};
//!
//! let bbox = DetectionBox::try_from_values(&[100.0, 200.0, 400.0, 600.0]).unwrap();
//! let dims = Dimensions::new(1000, 1000).unwrap();
//! let region = CropRegion::from_bounding_box(&bbox, dims).unwrap();
//! assert_eq!(region.size, 440);
//! ```

mod bbox;
mod coord;
mod dimensions;
mod region;
mod space;

pub use bbox::{BoundingBox, DetectionBox, InvalidBoundingBox};
pub use coord::Coord;
pub use dimensions::Dimensions;
pub use region::{CropRegion, CROP_PADDING};
pub use space::{CoordSpace, Normalized, Pixel, NORMALIZED_EXTENT};
