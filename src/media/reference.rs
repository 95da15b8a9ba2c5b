//! Handles to encoded image bytes.

use std::borrow::Cow;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// An opaque, immutable handle to encoded image bytes.
///
/// Inputs usually arrive as files from the camera or gallery; everything the
/// pipeline produces is an in-memory blob. Cloning is cheap.
#[derive(Clone, PartialEq, Eq)]
pub enum ImageReference {
    /// An encoded image on the local filesystem.
    File(PathBuf),
    /// Encoded image bytes held in memory.
    Blob(Arc<[u8]>),
}

impl ImageReference {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self::Blob(bytes.into())
    }

    /// Returns the path for file references.
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Self::File(path) => Some(path),
            Self::Blob(_) => None,
        }
    }

    /// Returns the bytes for in-memory references without touching the disk.
    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            Self::File(_) => None,
            Self::Blob(bytes) => Some(bytes),
        }
    }

    /// Reads the encoded bytes, borrowing when they are already in memory.
    pub fn read_bytes(&self) -> io::Result<Cow<'_, [u8]>> {
        match self {
            Self::File(path) => fs::read(path).map(Cow::Owned),
            Self::Blob(bytes) => Ok(Cow::Borrowed(bytes)),
        }
    }
}

impl fmt::Debug for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => f.debug_tuple("File").field(path).finish(),
            Self::Blob(bytes) => write!(f, "Blob({} bytes)", bytes.len()),
        }
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Blob(bytes) => write!(f, "<{} byte blob>", bytes.len()),
        }
    }
}

/// Encodings the pipeline can write.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Jpeg => write!(f, "jpeg"),
            Self::Png => write!(f, "png"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            other => Err(format!("'{}' (supported: jpeg, png)", other)),
        }
    }
}
