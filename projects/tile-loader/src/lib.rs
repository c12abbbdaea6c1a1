//! Turns directories of labeled images into normalized fixed-size tiles.
//!
//! Each image is decoded, optionally reduced to one luma channel, cropped by
//! fractional margins and cut into a centered grid of tiles. [`load_and_tile`]
//! yields the tiles lazily with their directory's label and
//! [`get_number_of_tiles`] counts them without extracting any pixel data.

pub mod dataset;
pub mod error;
pub mod pipeline;
pub mod summary;

pub use dataset::DatasetConfig;
pub use error::{Error, Result};
pub use pipeline::counter::{count_tiles_per_directory, get_number_of_tiles};
pub use pipeline::crop::crop_to_margin;
pub use pipeline::slicing::{get_tile, TileGrid};
pub use pipeline::stream::{load_and_tile, TileStream};
pub use pipeline::types::{
    Label, LabeledDirectory, MarginSpec, Tile, TileGridPosition, TileOptions, TileSize,
};
