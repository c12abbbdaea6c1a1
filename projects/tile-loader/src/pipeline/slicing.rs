use crate::error::{Error, Result};
use crate::pipeline::types::{Tile, TileGridPosition, TileSize};
use image::{DynamicImage, GenericImageView};
use ndarray::Array3;

/// Layout of non-overlapping tiles inside an image.
///
/// Pixels left over after fitting `columns x rows` whole tiles are split
/// evenly between both sides as an unused border; the extra pixel of an odd
/// remainder goes to the right/bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileGrid {
    pub tile_size: TileSize,
    pub columns: u32,
    pub rows: u32,
    pub offset_x: u32,
    pub offset_y: u32,
}

impl TileGrid {
    pub fn new(width: u32, height: u32, tile_size: TileSize) -> Self {
        let (tw, th) = (tile_size.width(), tile_size.height());
        Self {
            tile_size,
            columns: width / tw,
            rows: height / th,
            offset_x: (width % tw) / 2,
            offset_y: (height % th) / 2,
        }
    }

    pub fn for_image(image: &DynamicImage, tile_size: TileSize) -> Self {
        let (width, height) = image.dimensions();
        Self::new(width, height, tile_size)
    }

    /// Number of tiles in the grid
    pub fn len(&self) -> usize {
        self.columns as usize * self.rows as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, position: TileGridPosition) -> bool {
        position.x < self.columns && position.y < self.rows
    }

    /// Top-left pixel of the tile at `position`.
    pub fn origin(&self, position: TileGridPosition) -> (u32, u32) {
        (
            position.x * self.tile_size.width() + self.offset_x,
            position.y * self.tile_size.height() + self.offset_y,
        )
    }

    /// All positions, column by column: `x` is the outer loop, `y` the inner one.
    pub fn positions(&self) -> impl Iterator<Item = TileGridPosition> {
        let rows = self.rows;
        (0..self.columns).flat_map(move |x| (0..rows).map(move |y| TileGridPosition { x, y }))
    }
}

/// Interleaved 8-bit samples of an image and the number of channels per pixel.
fn raw_samples(image: &DynamicImage) -> (usize, Vec<u8>) {
    let color = image.color();
    match (color.has_color(), color.has_alpha()) {
        (false, false) => (1, image.to_luma8().into_raw()),
        (false, true) => (2, image.to_luma_alpha8().into_raw()),
        (true, false) => (3, image.to_rgb8().into_raw()),
        (true, true) => (4, image.to_rgba8().into_raw()),
    }
}

/// Extracts one tile of the centered grid and normalizes it to [0, 1].
///
/// The result is shaped `(tile_height, tile_width, channels)`; single-channel
/// images keep a trailing axis of length 1.
pub fn get_tile(
    image: &DynamicImage,
    tile_size: TileSize,
    position: TileGridPosition,
) -> Result<Tile> {
    let grid = TileGrid::for_image(image, tile_size);
    extract_tile(image, &grid, position)
}

/// Same as [`get_tile`] for callers that already computed the grid.
pub(crate) fn extract_tile(
    image: &DynamicImage,
    grid: &TileGrid,
    position: TileGridPosition,
) -> Result<Tile> {
    if !grid.contains(position) {
        return Err(Error::OutOfBounds {
            x: position.x,
            y: position.y,
            columns: grid.columns,
            rows: grid.rows,
        });
    }

    let (x0, y0) = grid.origin(position);
    let (tw, th) = (grid.tile_size.width(), grid.tile_size.height());
    let region = image.crop_imm(x0, y0, tw, th);
    let (channels, samples) = raw_samples(&region);

    let raw = Array3::from_shape_vec((th as usize, tw as usize, channels), samples)?;
    Ok(raw.mapv(|v| f32::from(v) / 255.0))
}
