use crate::error::{Error, Result};
use crate::pipeline::reader::{CroppedImage, CroppedImages};
use crate::pipeline::slicing::extract_tile;
use crate::pipeline::types::{Tile, TileGridPosition, TileOptions};
use std::path::Path;

/// Lazy sequence of `(tile, label)` pairs over labeled image directories.
///
/// Nothing is read from disk until the first `next()`. Each image is decoded
/// when its first tile is requested and dropped after its last one. Errors end
/// the stream: the failing item is an `Err` and every later call returns `None`.
pub struct TileStream<L> {
    sources: CroppedImages,
    labels: Vec<L>,
    current: Option<(CroppedImage, std::vec::IntoIter<TileGridPosition>)>,
    failed: bool,
}

/// Tiles every matching image of `directories[i]` and tags the tiles with `labels[i]`.
///
/// Directories are visited in the order given. Within a grid, tiles are
/// emitted with `x` in the outer loop and `y` in the inner loop.
pub fn load_and_tile<P, L>(
    directories: &[P],
    labels: &[L],
    options: &TileOptions,
) -> Result<TileStream<L>>
where
    P: AsRef<Path>,
    L: Clone,
{
    if directories.len() != labels.len() {
        return Err(Error::MismatchedInput {
            directories: directories.len(),
            labels: labels.len(),
        });
    }

    Ok(TileStream {
        sources: CroppedImages::new(directories, options),
        labels: labels.to_vec(),
        current: None,
        failed: false,
    })
}

impl<L: Clone> Iterator for TileStream<L> {
    type Item = Result<(Tile, L)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            if let Some((source, positions)) = self.current.as_mut() {
                if let Some(position) = positions.next() {
                    return match extract_tile(&source.image, &source.grid, position) {
                        Ok(tile) => Some(Ok((tile, self.labels[source.directory].clone()))),
                        Err(e) => {
                            self.failed = true;
                            self.current = None;
                            Some(Err(e))
                        }
                    };
                }
                self.current = None;
            }

            match self.sources.next()? {
                Ok(source) => {
                    let positions: Vec<TileGridPosition> = source.grid.positions().collect();
                    self.current = Some((source, positions.into_iter()));
                }
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }
    }
}
