//! Fixed five-cell montage geometry.
//!
//! The canvas is twice as wide as it is tall. The left half holds the map; the
//! right half is a 2x2 grid for the secondary images:
//!
//! ```text
//! +-----------+-----+-----+
//! |           | sq  | i1  |
//! |    map    +-----+-----+
//! |           | hole| i2  |
//! +-----------+-----+-----+
//! ```

use image::Rgba;
use serde::Serialize;

use crate::config::{ConfigError, MontageConfig};

/// A square target area on the canvas, top-left anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
    pub side: u32,
}

impl Placement {
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.x + self.side && y >= self.y && y < self.y + self.side
    }
}

/// Pixel geometry derived once per run from a [`MontageConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct MontageLayout {
    pub width: u32,
    pub height: u32,
    pub margin: u32,
    pub background: Rgba<u8>,
    pub primary: Placement,
    /// Indexed like [`RoleTag::SECONDARY`](crate::role::RoleTag::SECONDARY).
    pub secondary: [Placement; 4],
}

impl MontageLayout {
    pub fn new(config: &MontageConfig) -> Result<Self, ConfigError> {
        let width = config.width;
        if width == 0 {
            return Err(ConfigError::ZeroWidth);
        }
        if !config.margin.is_finite() || !(0.0..1.0).contains(&config.margin) {
            return Err(ConfigError::MarginOutOfRange(config.margin));
        }

        let height = width / 2;
        let half = width / 2;
        let quarter = width / 4;
        let margin = (config.margin * f64::from(width) / 2.0).floor() as u32;

        let primary_side = inset_side("primary", half, margin)?;
        let secondary_side = inset_side("secondary", quarter, margin)?;

        let primary = Placement {
            x: margin,
            y: margin,
            side: primary_side,
        };
        let secondary = std::array::from_fn(|i| {
            let x = half + if i > 1 { quarter } else { 0 };
            let y = (height / 2) * (i as u32 % 2);
            Placement {
                x: x + margin,
                y: y + margin,
                side: secondary_side,
            }
        });

        Ok(Self {
            width,
            height,
            margin,
            background: config.background_rgba(),
            primary,
            secondary,
        })
    }

    /// All five placements, primary first.
    pub fn placements(&self) -> impl Iterator<Item = &Placement> {
        std::iter::once(&self.primary).chain(self.secondary.iter())
    }
}

fn inset_side(cell: &'static str, available: u32, margin: u32) -> Result<u32, ConfigError> {
    let margins = margin.saturating_mul(2);
    match available.checked_sub(margins) {
        Some(side) if side > 0 => Ok(side),
        _ => Err(ConfigError::EmptyCell {
            cell,
            available,
            margins,
        }),
    }
}
