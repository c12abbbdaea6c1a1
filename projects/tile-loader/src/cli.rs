use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tile_loader::{DatasetConfig, Label, MarginSpec, TileOptions, TileSize};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Log every decoded file
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Count the tiles of every directory without extracting them
    Count(DatasetArgs),
    /// Extract every tile and print summary statistics
    Summarize(DatasetArgs),
}

#[derive(clap::Args, Debug)]
pub struct DatasetArgs {
    /// JSON dataset description; replaces the directory and tiling flags
    #[arg(long, conflicts_with_all = ["dirs", "labels"])]
    pub config: Option<PathBuf>,

    /// Image directory, repeat once per class
    #[arg(long = "dir")]
    pub dirs: Vec<PathBuf>,

    /// Label of the matching --dir (integer or real)
    #[arg(long = "label")]
    pub labels: Vec<Label>,

    #[arg(long, default_value_t = 64)]
    pub tile_width: u32,

    #[arg(long, default_value_t = 64)]
    pub tile_height: u32,

    /// Case-sensitive file name suffix
    #[arg(long, default_value = ".jpg")]
    pub extension: String,

    /// Keep the native channels instead of converting to grayscale
    #[arg(long)]
    pub keep_color: bool,

    #[arg(long, default_value_t = 0.2)]
    pub margin_left: f64,

    #[arg(long, default_value_t = 0.2)]
    pub margin_right: f64,

    #[arg(long, default_value_t = 0.2)]
    pub margin_top: f64,

    #[arg(long, default_value_t = 0.2)]
    pub margin_bottom: f64,

    /// Visit files in name order for reproducible output
    #[arg(long)]
    pub sort: bool,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl DatasetArgs {
    pub fn into_config(self) -> tile_loader::Result<DatasetConfig> {
        if let Some(path) = &self.config {
            return DatasetConfig::load(path);
        }

        let margins = MarginSpec::new(
            self.margin_left,
            self.margin_right,
            self.margin_top,
            self.margin_bottom,
        )?;
        let tiling = TileOptions::new(TileSize::new(self.tile_width, self.tile_height)?)
            .with_extension(self.extension)
            .with_convert_bw(!self.keep_color)
            .with_margins(margins)
            .with_sort_files(self.sort);

        DatasetConfig::from_parallel(self.dirs, self.labels, tiling)
    }
}
