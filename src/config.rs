use image::Rgba;
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::role::RoleMatch;

const DEFAULT_WIDTH: u32 = 1600;
const DEFAULT_MARGIN: f64 = 0.05;
const DEFAULT_BACKGROUND: [u8; 3] = [0, 0, 0];

/// Run-wide montage settings.
///
/// Loaded from JSON with every field optional, then overridden by command-line
/// flags. Geometry is checked when a [`MontageLayout`](crate::layout::MontageLayout)
/// is built from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MontageConfig {
    /// Canvas width in pixels. Height is always `width / 2`.
    pub width: u32,
    /// Margin as a fraction of half the canvas width.
    pub margin: f64,
    /// Opaque background colour.
    pub background: [u8; 3],
    pub role_match: RoleMatch,
    pub extension: SecondaryExtension,
    pub naming: MontageNaming,
    pub filter: ResizeFilter,
}

impl Default for MontageConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            margin: DEFAULT_MARGIN,
            background: DEFAULT_BACKGROUND,
            role_match: RoleMatch::default(),
            extension: SecondaryExtension::default(),
            naming: MontageNaming::default(),
            filter: ResizeFilter::default(),
        }
    }
}

impl MontageConfig {
    /// Reads a JSON config file. Missing fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn background_rgba(&self) -> Rgba<u8> {
        let [r, g, b] = self.background;
        Rgba([r, g, b, 255])
    }
}

/// Which secondary files may join a group.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum SecondaryExtension {
    /// Any extension the image decoder understands.
    #[default]
    Any,
    /// Only files whose extension equals the primary's.
    MatchPrimary,
}

/// Output file naming.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum MontageNaming {
    /// `<key>_montage.png`
    #[default]
    Underscore,
    /// `<prefix>montage.png`, the raw prefix as found before the `map` tag.
    Legacy,
}

/// Resampling filter used when scaling images into their cells.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeFilter {
    Nearest,
    Triangle,
    #[default]
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Gaussian => FilterType::Gaussian,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Invalid configuration. Always fatal, raised before any image is read.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("montage width must be positive")]
    ZeroWidth,

    #[error("margin fraction must be in [0, 1), got {0}")]
    MarginOutOfRange(f64),

    #[error("{cell} cell is empty: {available}px available, margins take {margins}px")]
    EmptyCell {
        cell: &'static str,
        available: u32,
        margins: u32,
    },

    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
