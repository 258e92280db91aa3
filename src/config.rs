//! Configuration management for Subject Stacker.
//!
//! This module provides the command-line interface:
//! - Subcommands for exporting subjects, exporting tiles, and uploading
//! - Environment variables with `STACKER_` prefix
//! - Sensible defaults for all optional settings
//!
//! # Example
//!
//! ```ignore
//! use subject_stacker::config::{Cli, Command};
//!
//! let cli = Cli::parse();
//! match cli.into_command() {
//!     Command::Subjects(config) => println!("span {}", config.span),
//!     Command::Tiles(config) => println!("{}x{}", config.tiles_x, config.tiles_y),
//!     Command::Upload(config) => println!("{:?}", config.backend),
//! }
//! ```
//!
//! # Environment Variables
//!
//! - `STACKER_SPAN` - Slices either side of the centre (default: 1)
//! - `STACKER_STEP` - Spacing between slices (default: 1)
//! - `STACKER_GROUP_SIZE` - Centre advance per window (default: 3)
//! - `STACKER_PREFIX` - File name prefix (default: derived from the first slice)
//! - `STACKER_JPEG_QUALITY` - JPEG quality (default: 80)
//! - `STACKER_TILES_X` / `STACKER_TILES_Y` - Tile counts per axis
//! - `STACKER_BACKEND` - Upload backend: dry-run, local or panoptes
//! - `STACKER_CATALOG_DIR` - Root of a local catalog
//! - `STACKER_PANOPTES_URL` - Panoptes API base URL
//! - `STACKER_PROJECT_ID` - Zooniverse project id
//! - `STACKER_PANOPTES_TOKEN` - Bearer token for Panoptes
//! - `STACKER_BATCH_SIZE` - Images per subject (default: 0, whole set)

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::catalog::DEFAULT_PANOPTES_URL;
use crate::error::{TileError, WindowError};
use crate::tile::{
    is_valid_quality, TileSpec, DEFAULT_JPEG_QUALITY, MAX_JPEG_QUALITY, MIN_JPEG_QUALITY,
};
use crate::window::WindowSpec;

// =============================================================================
// Default Values
// =============================================================================

/// Default number of slices either side of the centre.
pub const DEFAULT_SPAN: usize = 1;

/// Default spacing between slices.
pub const DEFAULT_STEP: usize = 1;

/// Default centre advance between windows.
pub const DEFAULT_GROUP_SIZE: usize = 3;

/// Default tile count per axis for the `tiles` command.
pub const DEFAULT_TILE_COUNT: u32 = 2;

// =============================================================================
// CLI Structure
// =============================================================================

/// Subject Stacker - prepare microscopy z-stacks for crowdsourced annotation.
#[derive(Parser, Debug, Clone)]
#[command(name = "subject-stacker")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn into_command(self) -> Command {
        self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Export windowed subject sets from a z-stack
    Subjects(SubjectsConfig),

    /// Export every slice of a z-stack as tiles
    Tiles(TilesConfig),

    /// Upload an export tree to a subject catalog
    Upload(UploadConfig),
}

// =============================================================================
// Subjects Command
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct SubjectsConfig {
    /// Directory of slice images, read in file name order.
    pub input: PathBuf,

    /// Output root; one directory per subject set is created below it.
    #[arg(short, long, env = "STACKER_OUTPUT")]
    pub output: PathBuf,

    /// Slices either side of the centre slice.
    #[arg(long, default_value_t = DEFAULT_SPAN, env = "STACKER_SPAN")]
    pub span: usize,

    /// Spacing between slices in a window.
    #[arg(long, default_value_t = DEFAULT_STEP, env = "STACKER_STEP")]
    pub step: usize,

    /// Distance between consecutive window centres.
    ///
    /// Values below the window extent produce overlapping sets, values above
    /// it leave gaps.
    #[arg(long, default_value_t = DEFAULT_GROUP_SIZE, env = "STACKER_GROUP_SIZE")]
    pub group_size: usize,

    /// File name prefix. Derived from the first slice when omitted.
    #[arg(long, env = "STACKER_PREFIX")]
    pub prefix: Option<String>,

    /// Also tile each subject into this many columns.
    ///
    /// Tiles go to `{set}/Tiles_X*_Y*/`; `upload` sends each grid as its own
    /// subject set named `{set}_Tiles_X*_Y*`.
    #[arg(long, env = "STACKER_TILES_X", requires = "tiles_y")]
    pub tiles_x: Option<u32>,

    /// Also tile each subject into this many rows.
    #[arg(long, env = "STACKER_TILES_Y", requires = "tiles_x")]
    pub tiles_y: Option<u32>,

    /// Add a half-tile offset grid (one extra tile per axis).
    #[arg(long, default_value_t = false)]
    pub offset: bool,

    /// JPEG quality (1-100).
    #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY, env = "STACKER_JPEG_QUALITY")]
    pub jpeg_quality: u8,

    /// Print a JSON summary on stdout.
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl SubjectsConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        self.window_spec().map_err(|e| e.to_string())?;

        if self.tiles_x.is_some() != self.tiles_y.is_some() {
            return Err("--tiles-x and --tiles-y must be given together".to_string());
        }
        if let Some(result) = self.tile_spec() {
            result.map_err(|e| e.to_string())?;
        }

        validate_quality(self.jpeg_quality)?;
        validate_prefix(self.prefix.as_deref())
    }

    pub fn window_spec(&self) -> Result<WindowSpec, WindowError> {
        WindowSpec::new(self.span, self.step, self.group_size)
    }

    /// Tile layout, if tiling was requested.
    pub fn tile_spec(&self) -> Option<Result<TileSpec, TileError>> {
        match (self.tiles_x, self.tiles_y) {
            (Some(x), Some(y)) => Some(TileSpec::new(x, y, self.offset)),
            _ => None,
        }
    }
}

// =============================================================================
// Tiles Command
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct TilesConfig {
    /// Directory of slice images, read in file name order.
    pub input: PathBuf,

    /// Output root; tiles are written to a `Tiles_X*_Y*` directory below it.
    #[arg(short, long, env = "STACKER_OUTPUT")]
    pub output: PathBuf,

    /// Number of tile columns.
    #[arg(long, default_value_t = DEFAULT_TILE_COUNT, env = "STACKER_TILES_X")]
    pub tiles_x: u32,

    /// Number of tile rows.
    #[arg(long, default_value_t = DEFAULT_TILE_COUNT, env = "STACKER_TILES_Y")]
    pub tiles_y: u32,

    /// Add a half-tile offset grid (one extra tile per axis).
    #[arg(long, default_value_t = false)]
    pub offset: bool,

    /// Value used for tile pixels outside the image.
    #[arg(long, default_value_t = 0)]
    pub fill: u8,

    /// File name prefix. Derived from the first slice when omitted.
    #[arg(long, env = "STACKER_PREFIX")]
    pub prefix: Option<String>,

    /// JPEG quality (1-100).
    #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY, env = "STACKER_JPEG_QUALITY")]
    pub jpeg_quality: u8,

    /// Print a JSON summary on stdout.
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl TilesConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        self.tile_spec().map_err(|e| e.to_string())?;
        validate_quality(self.jpeg_quality)?;
        validate_prefix(self.prefix.as_deref())
    }

    pub fn tile_spec(&self) -> Result<TileSpec, TileError> {
        TileSpec::new(self.tiles_x, self.tiles_y, self.offset)
    }
}

// =============================================================================
// Upload Command
// =============================================================================

/// Where uploads go.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Backend {
    /// Record everything in memory and report what would happen
    #[default]
    DryRun,

    /// Mirror subject sets into a local directory
    Local,

    /// Zooniverse Panoptes API
    Panoptes,
}

#[derive(Args, Debug, Clone)]
pub struct UploadConfig {
    /// Export root produced by the `subjects` command.
    pub input: PathBuf,

    /// Catalog backend.
    #[arg(long, value_enum, default_value_t = Backend::DryRun, env = "STACKER_BACKEND")]
    pub backend: Backend,

    /// Root directory of the local catalog.
    #[arg(long, env = "STACKER_CATALOG_DIR")]
    pub catalog_dir: Option<PathBuf>,

    /// Panoptes API base URL.
    #[arg(long, default_value = DEFAULT_PANOPTES_URL, env = "STACKER_PANOPTES_URL")]
    pub api_url: String,

    /// Zooniverse project id.
    #[arg(long, env = "STACKER_PROJECT_ID")]
    pub project_id: Option<String>,

    /// Panoptes bearer token.
    #[arg(long, env = "STACKER_PANOPTES_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Maximum images per subject; 0 uploads each set as one subject.
    #[arg(long, default_value_t = 0, env = "STACKER_BATCH_SIZE")]
    pub batch_size: usize,

    /// Print a JSON report on stdout.
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl UploadConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        match self.backend {
            Backend::DryRun => Ok(()),
            Backend::Local => {
                if self.catalog_dir.is_none() {
                    return Err(
                        "Local backend needs a catalog directory. \
                         Set --catalog-dir or STACKER_CATALOG_DIR"
                            .to_string(),
                    );
                }
                Ok(())
            }
            Backend::Panoptes => {
                if self.project_id.as_deref().map_or(true, str::is_empty) {
                    return Err(
                        "Panoptes backend needs a project id. \
                         Set --project-id or STACKER_PROJECT_ID"
                            .to_string(),
                    );
                }
                if self.token.as_deref().map_or(true, str::is_empty) {
                    return Err(
                        "Panoptes backend needs a token. \
                         Set --token or STACKER_PANOPTES_TOKEN"
                            .to_string(),
                    );
                }
                if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
                    return Err(format!("api_url must be an http(s) URL: {}", self.api_url));
                }
                Ok(())
            }
        }
    }
}

// =============================================================================
// Shared validation
// =============================================================================

fn validate_quality(quality: u8) -> Result<(), String> {
    if !is_valid_quality(quality) {
        return Err(format!(
            "jpeg_quality must be between {} and {}",
            MIN_JPEG_QUALITY, MAX_JPEG_QUALITY
        ));
    }
    Ok(())
}

fn validate_prefix(prefix: Option<&str>) -> Result<(), String> {
    match prefix {
        Some(p) if p.is_empty() => Err("prefix must not be empty".to_string()),
        Some(p) if p.contains(['/', '\\']) => {
            Err(format!("prefix must not contain path separators: {}", p))
        }
        _ => Ok(()),
    }
}

// =============================================================================
// Tests
// =============================================================================
