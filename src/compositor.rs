//! Renders one [`ImageSet`] into the fixed montage layout.

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use std::path::{Path, PathBuf};

use crate::config::{ConfigError, MontageConfig, MontageNaming};
use crate::grouper::ImageSet;
use crate::layout::{MontageLayout, Placement};
use crate::role::RoleTag;

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Errors that fail a single montage. Other groups are unaffected.
#[derive(Debug, thiserror::Error)]
pub enum CompositeError {
    #[error("map image for `{key}` is empty ({width}x{height})")]
    EmptyPrimary { key: String, width: u32, height: u32 },

    #[error("failed to save {}: {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Secondary images that will actually be drawn, with their slot index.
///
/// Slots are walked in order and the walk stops at the first empty one, so an
/// `i1` image is dropped when `hole` is missing. A zero-sized image counts as
/// empty.
pub fn drawable_secondaries(set: &ImageSet) -> impl Iterator<Item = (usize, &DynamicImage)> {
    set.secondary
        .iter()
        .enumerate()
        .map_while(|(slot, image)| image.as_ref().filter(|i| has_pixels(i)).map(|i| (slot, i)))
}

/// Roles that end up on the montage for `set`, primary first.
pub fn placed_roles(set: &ImageSet) -> Vec<RoleTag> {
    std::iter::once(RoleTag::Map)
        .chain(drawable_secondaries(set).map(|(slot, _)| RoleTag::SECONDARY[slot]))
        .collect()
}

/// Output file name for `set`.
pub fn montage_file_name(set: &ImageSet, naming: MontageNaming) -> String {
    match naming {
        MontageNaming::Underscore => format!("{}_montage.png", set.key),
        MontageNaming::Legacy => format!("{}montage.png", set.prefix),
    }
}

fn has_pixels(image: &DynamicImage) -> bool {
    image.width() > 0 && image.height() > 0
}

/// Scales images into a [`MontageLayout`] and writes the result as PNG.
#[derive(Debug, Clone)]
pub struct Compositor {
    layout: MontageLayout,
    filter: FilterType,
    naming: MontageNaming,
}

impl Compositor {
    pub fn new(layout: MontageLayout, filter: FilterType, naming: MontageNaming) -> Self {
        Self {
            layout,
            filter,
            naming,
        }
    }

    /// Builds the layout from `config`, failing on invalid geometry.
    pub fn from_config(config: &MontageConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(
            MontageLayout::new(config)?,
            config.filter.into(),
            config.naming,
        ))
    }

    pub fn layout(&self) -> &MontageLayout {
        &self.layout
    }

    /// Canvas filled with the background colour.
    pub fn blank_canvas(&self) -> RgbaImage {
        let MontageLayout { width, height, .. } = self.layout;
        let mut canvas = RgbaImage::from_pixel(width, height, TRANSPARENT);
        draw_filled_rect_mut(
            &mut canvas,
            Rect::at(0, 0).of_size(width, height),
            self.layout.background,
        );
        canvas
    }

    pub fn compose(&self, set: &ImageSet) -> Result<RgbaImage, CompositeError> {
        if !has_pixels(&set.primary) {
            return Err(CompositeError::EmptyPrimary {
                key: set.key.clone(),
                width: set.primary.width(),
                height: set.primary.height(),
            });
        }

        let mut canvas = self.blank_canvas();
        self.paste(&mut canvas, &set.primary, self.layout.primary);
        for (slot, image) in drawable_secondaries(set) {
            self.paste(&mut canvas, image, self.layout.secondary[slot]);
        }
        Ok(canvas)
    }

    /// Composes `set` and saves it into `dir`, returning the written path.
    pub fn write(&self, set: &ImageSet, dir: &Path) -> Result<PathBuf, CompositeError> {
        let canvas = self.compose(set)?;
        let path = dir.join(self.file_name(set));
        canvas
            .save_with_format(&path, ImageFormat::Png)
            .map_err(|source| CompositeError::Save {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }

    pub fn file_name(&self, set: &ImageSet) -> String {
        montage_file_name(set, self.naming)
    }

    /// Resizes to the placement's square, ignoring the source aspect ratio,
    /// and overwrites the canvas pixels there.
    fn paste(&self, canvas: &mut RgbaImage, image: &DynamicImage, at: Placement) {
        let resized = image.resize_exact(at.side, at.side, self.filter).to_rgba8();
        imageops::replace(canvas, &resized, i64::from(at.x), i64::from(at.y));
    }
}
