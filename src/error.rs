//! Error kinds for loading, exporting and settings.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to load a background image
#[derive(Error, Debug)]
pub enum ImageLoadError {
    /// The file could not be opened or read
    #[error("Cannot read image {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Extension or content is neither PNG nor JPEG
    #[error("Unsupported image format: {0}")]
    Unsupported(PathBuf),

    /// The codec rejected the data
    #[error("Cannot decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Failure to flatten and write the PNG export
#[derive(Error, Debug)]
pub enum ExportError {
    /// The canvas has no visible area yet
    #[error("Nothing to export: canvas is {0}x{1}")]
    EmptyCanvas(u32, u32),

    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failure to read or write the settings file
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Settings I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed settings: {0}")]
    Json(#[from] serde_json::Error),
}
