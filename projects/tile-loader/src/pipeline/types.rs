use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// A normalized tile shaped `(tile_height, tile_width, channels)` with values in [0, 1].
pub type Tile = ndarray::Array3<f32>;

/// Fractions of width/height discarded from each edge before tiling.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(try_from = "RawMargins")]
pub struct MarginSpec {
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
}

#[derive(Deserialize)]
struct RawMargins {
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
}

impl TryFrom<RawMargins> for MarginSpec {
    type Error = Error;

    fn try_from(raw: RawMargins) -> Result<Self> {
        MarginSpec::new(raw.left, raw.right, raw.top, raw.bottom)
    }
}

impl MarginSpec {
    pub const NONE: MarginSpec = MarginSpec {
        left: 0.0,
        right: 0.0,
        top: 0.0,
        bottom: 0.0,
    };

    /// Each margin must lie in [0, 1) and opposing margins must leave some
    /// of the image behind.
    pub fn new(left: f64, right: f64, top: f64, bottom: f64) -> Result<Self> {
        for (side, value) in [
            ("left", left),
            ("right", right),
            ("top", top),
            ("bottom", bottom),
        ] {
            if !(0.0..1.0).contains(&value) {
                return Err(Error::InvalidMargin {
                    reason: format!("{} margin {} is outside [0, 1)", side, value),
                });
            }
        }
        if left + right >= 1.0 {
            return Err(Error::InvalidMargin {
                reason: format!("left + right = {} leaves no width", left + right),
            });
        }
        if top + bottom >= 1.0 {
            return Err(Error::InvalidMargin {
                reason: format!("top + bottom = {} leaves no height", top + bottom),
            });
        }
        Ok(Self {
            left,
            right,
            top,
            bottom,
        })
    }

    pub fn uniform(margin: f64) -> Result<Self> {
        Self::new(margin, margin, margin, margin)
    }

    pub fn left(&self) -> f64 {
        self.left
    }

    pub fn right(&self) -> f64 {
        self.right
    }

    pub fn top(&self) -> f64 {
        self.top
    }

    pub fn bottom(&self) -> f64 {
        self.bottom
    }
}

/// Tile dimensions in pixels, both non-zero.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(try_from = "RawTileSize")]
pub struct TileSize {
    width: u32,
    height: u32,
}

#[derive(Deserialize)]
struct RawTileSize {
    width: u32,
    height: u32,
}

impl TryFrom<RawTileSize> for TileSize {
    type Error = Error;

    fn try_from(raw: RawTileSize) -> Result<Self> {
        TileSize::new(raw.width, raw.height)
    }
}

impl TileSize {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidTileSize { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Column (`x`) and row (`y`) index of a tile within a cropped image.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileGridPosition {
    pub x: u32,
    pub y: u32,
}

/// Scalar label attached to every tile of a directory.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(untagged)]
pub enum Label {
    Int(i64),
    Real(f64),
}

impl FromStr for Label {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if let Ok(v) = s.parse::<i64>() {
            return Ok(Label::Int(v));
        }
        s.parse::<f64>()
            .map(Label::Real)
            .map_err(|_| format!("label must be an integer or a real number, got '{}'", s))
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Int(v) => write!(f, "{}", v),
            Label::Real(v) => write!(f, "{}", v),
        }
    }
}

/// A directory of images together with the label its tiles receive.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LabeledDirectory {
    pub path: PathBuf,
    pub label: Label,
}

fn default_extension() -> String {
    ".jpg".to_string()
}

fn default_convert_bw() -> bool {
    true
}

fn default_margins() -> MarginSpec {
    MarginSpec {
        left: 0.2,
        right: 0.2,
        top: 0.2,
        bottom: 0.2,
    }
}

/// Everything that decides which files are read and how they are tiled.
///
/// The counter and the stream take the same options so that their results
/// always agree.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TileOptions {
    pub tile_size: TileSize,
    /// Case-sensitive file name suffix, e.g. `.jpg`
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Convert every image to a single luma channel before cropping
    #[serde(default = "default_convert_bw")]
    pub convert_bw: bool,
    #[serde(default = "default_margins")]
    pub margins: MarginSpec,
    /// Visit files in file name order instead of directory listing order
    #[serde(default)]
    pub sort_files: bool,
}

impl TileOptions {
    pub fn new(tile_size: TileSize) -> Self {
        Self {
            tile_size,
            extension: default_extension(),
            convert_bw: default_convert_bw(),
            margins: default_margins(),
            sort_files: false,
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_convert_bw(mut self, convert_bw: bool) -> Self {
        self.convert_bw = convert_bw;
        self
    }

    pub fn with_margins(mut self, margins: MarginSpec) -> Self {
        self.margins = margins;
        self
    }

    pub fn with_sort_files(mut self, sort_files: bool) -> Self {
        self.sort_files = sort_files;
        self
    }
}
