// Source walker: lists labeled directories, decodes and crops each image.
//
// Both the tile stream and the tile counter are built on this walk, so the
// number of tiles they see for a given set of inputs is always the same.

use crate::error::{Error, Result};
use crate::pipeline::crop::crop_to_margin;
use crate::pipeline::slicing::TileGrid;
use crate::pipeline::types::TileOptions;
use image::{DynamicImage, GenericImageView, GrayImage, ImageReader, Luma};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// A decoded image after conversion and margin cropping.
pub struct CroppedImage {
    /// Index of the directory the file was found in
    pub directory: usize,
    pub path: PathBuf,
    pub image: DynamicImage,
    pub grid: TileGrid,
}

/// Lazy walk over every matching image of every directory, in order.
///
/// Directory listing and decoding happen on `next()`. The first error is
/// yielded once and ends the walk.
pub struct CroppedImages {
    directories: Vec<PathBuf>,
    options: TileOptions,
    next_directory: usize,
    current: Option<(usize, walkdir::IntoIter)>,
    failed: bool,
}

impl CroppedImages {
    pub fn new<P: AsRef<Path>>(directories: &[P], options: &TileOptions) -> Self {
        Self {
            directories: directories
                .iter()
                .map(|d| d.as_ref().to_path_buf())
                .collect(),
            options: options.clone(),
            next_directory: 0,
            current: None,
            failed: false,
        }
    }

    fn open_directory(&self, index: usize) -> Result<walkdir::IntoIter> {
        let dir = &self.directories[index];
        let unreadable = |source: io::Error| Error::Unreadable {
            path: dir.clone(),
            source,
        };
        let metadata = fs::metadata(dir).map_err(unreadable)?;
        if !metadata.is_dir() {
            return Err(unreadable(io::Error::new(
                io::ErrorKind::InvalidInput,
                "not a directory",
            )));
        }

        tracing::info!(
            "Reading '{}' images from {:?} (directory {} of {})",
            self.options.extension,
            dir,
            index + 1,
            self.directories.len()
        );

        let mut walk = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true);
        if self.options.sort_files {
            walk = walk.sort_by_file_name();
        }
        Ok(walk.into_iter())
    }

    fn is_candidate(&self, entry: &DirEntry) -> bool {
        entry.file_type().is_file()
            && entry
                .file_name()
                .as_encoded_bytes()
                .ends_with(self.options.extension.as_bytes())
    }

    fn load(&self, directory: usize, path: &Path) -> Result<CroppedImage> {
        let mut image = decode(path)?;
        if self.options.convert_bw {
            image = DynamicImage::ImageLuma8(to_single_channel(&image));
        }

        let (width, height) = image.dimensions();
        let cropped = crop_to_margin(&image, &self.options.margins)?;
        let grid = TileGrid::for_image(&cropped, self.options.tile_size);

        tracing::debug!(
            "{:?}: {}x{} cropped to {}x{}, {}x{} tiles",
            path,
            width,
            height,
            cropped.width(),
            cropped.height(),
            grid.columns,
            grid.rows
        );
        if grid.is_empty() {
            tracing::warn!(
                "{:?} is smaller than one {}x{} tile after cropping",
                path,
                self.options.tile_size.width(),
                self.options.tile_size.height()
            );
        }

        Ok(CroppedImage {
            directory,
            path: path.to_path_buf(),
            image: cropped,
            grid,
        })
    }

    fn fail(&mut self, err: Error) -> Option<Result<CroppedImage>> {
        self.failed = true;
        self.current = None;
        Some(Err(err))
    }
}

/// Decodes a file, detecting the format from its content. The extension is
/// only a fallback, so a PNG named `*.jpg` still loads.
pub fn decode(path: &Path) -> Result<DynamicImage> {
    let unreadable = |source: io::Error| Error::Unreadable {
        path: path.to_path_buf(),
        source,
    };
    ImageReader::open(path)
        .map_err(unreadable)?
        .with_guessed_format()
        .map_err(unreadable)?
        .decode()
        .map_err(|e| Error::from_image(path.to_path_buf(), e))
}

/// Luma from ITU-R 601-2 weights (`0.299 R + 0.587 G + 0.114 B`) in 16-bit
/// fixed point, rounded. Alpha is dropped.
pub fn to_single_channel(image: &DynamicImage) -> GrayImage {
    if !image.color().has_color() {
        return image.to_luma8();
    }
    let rgb = image.to_rgb8();
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        let l = u32::from(r) * 19595 + u32::from(g) * 38470 + u32::from(b) * 7471 + 0x8000;
        Luma([(l >> 16) as u8])
    })
}

impl Iterator for CroppedImages {
    type Item = Result<CroppedImage>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.failed {
                return None;
            }

            if self.current.is_none() {
                if self.next_directory >= self.directories.len() {
                    return None;
                }
                let index = self.next_directory;
                self.next_directory += 1;
                match self.open_directory(index) {
                    Ok(walk) => self.current = Some((index, walk)),
                    Err(e) => return self.fail(e),
                }
            }

            let Some((index, walk)) = self.current.as_mut() else {
                continue;
            };
            let index = *index;

            match walk.next() {
                None => self.current = None,
                Some(Err(e)) => {
                    let path = e
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| self.directories[index].clone());
                    return self.fail(Error::Unreadable {
                        path,
                        source: e.into(),
                    });
                }
                Some(Ok(entry)) => {
                    if !self.is_candidate(&entry) {
                        continue;
                    }
                    return match self.load(index, entry.path()) {
                        Ok(cropped) => Some(Ok(cropped)),
                        Err(e) => self.fail(e),
                    };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::types::{MarginSpec, TileSize};
    use image::GrayImage;
    use tempfile::TempDir;

    fn options() -> TileOptions {
        TileOptions::new(TileSize::new(10, 10).unwrap())
            .with_extension(".png")
            .with_margins(MarginSpec::NONE)
            .with_sort_files(true)
    }

    fn write_gray(dir: &Path, name: &str, w: u32, h: u32) {
        GrayImage::new(w, h).save(dir.join(name)).unwrap();
    }

    #[test]
    fn test_walk_filters_by_exact_suffix() {
        let dir = TempDir::new().unwrap();
        write_gray(dir.path(), "a.png", 20, 20);
        write_gray(dir.path(), "b.png", 30, 10);
        fs::write(dir.path().join("notes.txt"), "not an image").unwrap();
        fs::write(dir.path().join("upper.PNG"), "wrong case").unwrap();
        fs::create_dir(dir.path().join("nested.png")).unwrap();
        write_gray(&dir.path().join("nested.png"), "deep.png", 20, 20);

        let found: Vec<CroppedImage> = CroppedImages::new(&[dir.path()], &options())
            .collect::<Result<_>>()
            .unwrap();

        let names: Vec<String> = found
            .iter()
            .map(|c| c.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.png", "b.png"]);
        assert_eq!(found[0].grid.len(), 4);
        assert_eq!(found[1].grid.len(), 3);
        assert!(found.iter().all(|c| c.directory == 0));
    }

    #[test]
    fn test_walk_converts_to_single_channel() {
        let dir = TempDir::new().unwrap();
        image::RgbImage::new(12, 12)
            .save(dir.path().join("color.png"))
            .unwrap();

        let mut walk = CroppedImages::new(&[dir.path()], &options());
        let cropped = walk.next().unwrap().unwrap();
        assert_eq!(cropped.image.color(), image::ColorType::L8);

        let mut walk = CroppedImages::new(&[dir.path()], &options().with_convert_bw(false));
        let cropped = walk.next().unwrap().unwrap();
        assert_eq!(cropped.image.color(), image::ColorType::Rgb8);
    }

    #[test]
    fn test_single_channel_uses_601_weights() {
        let image = DynamicImage::ImageRgb8(image::RgbImage::from_fn(4, 1, |x, _| {
            image::Rgb(match x {
                0 => [255, 0, 0],
                1 => [0, 255, 0],
                2 => [0, 0, 255],
                _ => [255, 255, 255],
            })
        }));
        let gray = to_single_channel(&image);
        let values: Vec<u8> = gray.pixels().map(|p| p.0[0]).collect();
        assert_eq!(values, vec![76, 150, 29, 255]);

        // Already single channel: passed through untouched
        let luma = DynamicImage::ImageLuma8(GrayImage::from_pixel(2, 2, Luma([77])));
        assert_eq!(to_single_channel(&luma).get_pixel(1, 1).0[0], 77);
    }

    #[test]
    fn test_walk_detects_format_from_content() {
        let dir = TempDir::new().unwrap();
        let mut buffer = std::io::Cursor::new(Vec::new());
        GrayImage::new(40, 40)
            .write_to(&mut buffer, image::ImageFormat::Png)
            .unwrap();
        fs::write(dir.path().join("a.jpg"), buffer.get_ref()).unwrap();
        fs::write(dir.path().join("b.tile"), buffer.get_ref()).unwrap();

        let jpg = options().with_extension(".jpg");
        let found: Vec<CroppedImage> = CroppedImages::new(&[dir.path()], &jpg)
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].grid.len(), 16);

        let tile = options().with_extension(".tile");
        let found: Vec<CroppedImage> = CroppedImages::new(&[dir.path()], &tile)
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(found.len(), 1);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_walk_matches_non_utf8_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = TempDir::new().unwrap();
        let name = OsStr::from_bytes(b"caf\xe9.png");
        GrayImage::new(20, 20).save(dir.path().join(name)).unwrap();

        let found: Vec<CroppedImage> = CroppedImages::new(&[dir.path()], &options())
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path.file_name(), Some(name));
    }

    #[test]
    fn test_walk_missing_directory_fails_once() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing");

        let mut walk = CroppedImages::new(&[missing.clone()], &options());
        match walk.next() {
            Some(Err(Error::Unreadable { path, .. })) => assert_eq!(path, missing),
            _ => panic!("expected an unreadable directory error"),
        }
        assert!(walk.next().is_none());
    }

    #[test]
    fn test_walk_rejects_file_as_directory() {
        let dir = TempDir::new().unwrap();
        write_gray(dir.path(), "a.png", 20, 20);
        let file = dir.path().join("a.png");

        let mut walk = CroppedImages::new(&[file], &options());
        assert!(matches!(walk.next(), Some(Err(Error::Unreadable { .. }))));
    }

    #[test]
    fn test_walk_corrupt_image_is_decode_error() {
        let dir = TempDir::new().unwrap();
        write_gray(dir.path(), "a.png", 20, 20);
        fs::write(dir.path().join("b.png"), b"definitely not a png").unwrap();
        write_gray(dir.path(), "c.png", 20, 20);

        let mut walk = CroppedImages::new(&[dir.path()], &options());
        assert!(walk.next().unwrap().is_ok());
        assert!(matches!(walk.next(), Some(Err(Error::Decode { .. }))));
        // c.png is never reached
        assert!(walk.next().is_none());
    }
}
