//! Error types for the tiling pipeline.
//!
//! Every stage fails fast: errors surface to the caller immediately, with no
//! retry and no skip-and-continue.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A directory could not be listed or a file could not be read.
    #[error("cannot read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file was read but is not a decodable image.
    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Margins outside [0, 1), opposing margins summing to 1 or more, or a
    /// crop rectangle with no area.
    #[error("invalid margin: {reason}")]
    InvalidMargin { reason: String },

    #[error("invalid tile size {width}x{height}: both dimensions must be non-zero")]
    InvalidTileSize { width: u32, height: u32 },

    /// Tile index outside the `columns x rows` grid of the image.
    #[error("tile ({x}, {y}) is outside the {columns}x{rows} tile grid")]
    OutOfBounds {
        x: u32,
        y: u32,
        columns: u32,
        rows: u32,
    },

    #[error("got {directories} directories but {labels} labels")]
    MismatchedInput { directories: usize, labels: usize },

    #[error("tile buffer does not match its shape: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("cannot read dataset config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed dataset config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Dataset config parsed but describes no usable dataset.
    #[error("invalid dataset config {path}: {reason}")]
    Config { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Maps an image decoding failure to `Unreadable` or `Decode` depending on
    /// whether the bytes could be read at all.
    pub(crate) fn from_image(path: PathBuf, err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(source) => Error::Unreadable { path, source },
            source => Error::Decode { path, source },
        }
    }
}
