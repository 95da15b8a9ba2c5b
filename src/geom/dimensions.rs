//! Pixel dimensions of an encoded image.

use serde::Serialize;
use std::fmt;

/// Width and height of an image in pixels. Both are always positive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Dimensions {
    width: u32,
    height: u32,
}

impl Dimensions {
    /// Creates dimensions, returning `None` if either side is zero.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            None
        } else {
            Some(Self { width, height })
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Dimensions after shrinking to `max_width`, preserving aspect ratio.
    ///
    /// Returns `self` unchanged when the image is already narrow enough;
    /// images are never upscaled.
    pub fn fit_width(&self, max_width: u32) -> Dimensions {
        if max_width == 0 || self.width <= max_width {
            return *self;
        }
        let scaled = (self.height as f64 * max_width as f64 / self.width as f64).round();
        Dimensions {
            width: max_width,
            height: (scaled as u32).max(1),
        }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
