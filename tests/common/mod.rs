#![allow(dead_code)]

use std::collections::HashMap;
use std::io;
use std::path::Path;

use freeze_montage::{ImageSource, OpenFailure};
use image::{DynamicImage, Rgba, RgbaImage};

pub const RED: [u8; 4] = [220, 30, 30, 255];
pub const GREEN: [u8; 4] = [30, 200, 60, 255];
pub const BLUE: [u8; 4] = [40, 70, 230, 255];
pub const YELLOW: [u8; 4] = [240, 220, 20, 255];
pub const CYAN: [u8; 4] = [20, 210, 220, 255];

pub fn solid(width: u32, height: u32, color: [u8; 4]) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(color)))
}

pub fn write_solid(dir: &Path, name: &str, color: [u8; 4]) {
    solid(24, 16, color)
        .to_rgb8()
        .save(dir.join(name))
        .expect("write test image");
}

/// In-memory image source; names not present fail to open.
#[derive(Default)]
pub struct MemorySource(HashMap<String, DynamicImage>);

impl MemorySource {
    pub fn with(mut self, name: &str, image: DynamicImage) -> Self {
        self.0.insert(name.to_string(), image);
        self
    }
}

impl ImageSource for MemorySource {
    fn open(&self, name: &str) -> Result<DynamicImage, OpenFailure> {
        self.0.get(name).cloned().ok_or_else(|| OpenFailure {
            name: name.to_string(),
            source: image::ImageError::IoError(io::Error::new(
                io::ErrorKind::NotFound,
                "not in memory source",
            )),
        })
    }
}
