use crate::error::Result;
use crate::pipeline::reader::CroppedImages;
use crate::pipeline::types::TileOptions;
use std::path::Path;

/// Number of tiles found in each directory, in the order given.
pub fn count_tiles_per_directory<P: AsRef<Path>>(
    directories: &[P],
    options: &TileOptions,
) -> Result<Vec<usize>> {
    let mut counts = vec![0usize; directories.len()];
    for source in CroppedImages::new(directories, options) {
        let source = source?;
        counts[source.directory] += source.grid.len();
    }
    Ok(counts)
}

/// Total number of tiles `load_and_tile` yields for the same directories and options.
pub fn get_number_of_tiles<P: AsRef<Path>>(
    directories: &[P],
    options: &TileOptions,
) -> Result<usize> {
    let total: usize = count_tiles_per_directory(directories, options)?
        .into_iter()
        .sum();
    tracing::info!("{} tiles across {} directories", total, directories.len());
    Ok(total)
}
