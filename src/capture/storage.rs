//! Naming for uploaded thumbnails.
//!
//! Thumbnails are stored under `{user_id}/{file_name}`; file names embed the
//! capture time and a short random suffix so concurrent uploads never collide.

use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

use crate::media::OutputFormat;

const SUFFIX_LEN: usize = 6;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("User id must not be empty")]
    EmptyUserId,

    #[error("{what} must not contain '/': {value:?}")]
    PathSeparator { what: &'static str, value: String },

    #[error("File name must not be empty")]
    EmptyFileName,
}

/// Generates `{prefix}_{unix_millis}_{suffix}.{ext}` with a lowercase
/// base-36 suffix.
pub fn generate_image_file_name(prefix: &str, format: OutputFormat) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();

    let mut bits: u64 = rand::random();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| {
            let digit = (bits % 36) as usize;
            bits /= 36;
            char::from(BASE36[digit])
        })
        .collect();

    format!("{prefix}_{millis}_{suffix}.{}", format.extension())
}

/// Joins a user id and file name into an object-storage path.
pub fn storage_object_path(user_id: &str, file_name: &str) -> Result<String, StorageError> {
    if user_id.is_empty() {
        return Err(StorageError::EmptyUserId);
    }
    if file_name.is_empty() {
        return Err(StorageError::EmptyFileName);
    }
    if user_id.contains('/') {
        return Err(StorageError::PathSeparator {
            what: "User id",
            value: user_id.to_string(),
        });
    }
    if file_name.contains('/') {
        return Err(StorageError::PathSeparator {
            what: "File name",
            value: file_name.to_string(),
        });
    }
    Ok(format!("{user_id}/{file_name}"))
}

/// Approximate decoded size in MiB of a base64 payload, to two decimals.
pub fn payload_size_mb(base64_payload: &str) -> f64 {
    let bytes = base64_payload.len() as f64 * 3.0 / 4.0;
    let mb = bytes / (1024.0 * 1024.0);
    (mb * 100.0).round() / 100.0
}
