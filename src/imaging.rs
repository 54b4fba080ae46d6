use image::DynamicImage;
use std::fs;
use std::io;
use std::path::PathBuf;

/// A file that could not be decoded as an image.
#[derive(Debug, thiserror::Error)]
#[error("cannot open {name}: {source}")]
pub struct OpenFailure {
    pub name: String,
    #[source]
    pub source: image::ImageError,
}

/// Where the grouper gets decoded images from, by file name.
pub trait ImageSource {
    fn open(&self, name: &str) -> Result<DynamicImage, OpenFailure>;
}

/// Reads images from one directory on disk.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Names of the regular files in the directory, sorted.
    ///
    /// Entries whose name is not valid UTF-8 are skipped.
    pub fn list(&self) -> io::Result<Vec<String>> {
        let mut names: Vec<String> = fs::read_dir(&self.dir)?
            .filter_map(Result::ok)
            .filter(|e| e.path().is_file())
            .filter_map(|e| match e.file_name().into_string() {
                Ok(name) => Some(name),
                Err(raw) => {
                    tracing::debug!("skipping non UTF-8 file name {raw:?}");
                    None
                }
            })
            .collect();
        names.sort();
        Ok(names)
    }
}

impl ImageSource for DirectorySource {
    fn open(&self, name: &str) -> Result<DynamicImage, OpenFailure> {
        image::open(self.dir.join(name)).map_err(|source| OpenFailure {
            name: name.to_string(),
            source,
        })
    }
}
