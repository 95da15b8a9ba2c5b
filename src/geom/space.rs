//! The two coordinate spaces a box can live in.
//!
//! Neither type has a value; they only appear as the `TSpace` parameter of
//! [`Coord`](super::Coord) and [`BoundingBox`](super::BoundingBox).

/// Extent of each axis in [`Normalized`] space.
pub const NORMALIZED_EXTENT: f64 = 1000.0;

/// A coordinate space, named for `Debug` output.
pub trait CoordSpace {
    const LABEL: &'static str;
}

/// Whole pixels of one decoded copy of a photo, origin at the top left.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Pixel {}

/// Detector output in `0..=NORMALIZED_EXTENT`, relative to the analyzed
/// image. One box applies to every resized copy of the same photo.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Normalized {}

impl CoordSpace for Pixel {
    const LABEL: &'static str = "pixel";
}

impl CoordSpace for Normalized {
    const LABEL: &'static str = "normalized";
}
