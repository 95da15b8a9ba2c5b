//! Image I/O: dimension probing, compression and thumbnail cropping.
//!
//! Every stage takes an [`ImageReference`] and produces new in-memory
//! references; inputs are never modified. Codec work runs on tokio's
//! blocking pool so that many crops can be in flight at once.

mod compress;
mod error;
mod probe;
mod reference;
mod thumbnail;

pub use compress::{
    compress, compress_blocking, try_compress, CompressionOptions, CompressionResult,
};
pub use error::MediaError;
pub use probe::{probe, ProbeError};
pub use reference::{ImageReference, OutputFormat};
pub use thumbnail::{
    crop_bounding_box, crop_to_thumbnail, render_thumbnail, Thumbnail, DEFAULT_THUMBNAIL_SIZE,
    THUMBNAIL_QUALITY,
};
