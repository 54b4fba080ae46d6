//! Directory-level driver: list, group, compose, report.

use bytesize::ByteSize;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::compositor::{CompositeError, Compositor, placed_roles};
use crate::config::{ConfigError, MontageConfig};
use crate::grouper::{Grouper, ImageSet};
use crate::imaging::DirectorySource;

/// Where to read from and write to, and how.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub dir: PathBuf,
    /// Defaults to `dir`.
    pub output_dir: Option<PathBuf>,
    /// Worker threads used for composing. `1` composes on the calling thread,
    /// `0` uses one thread per core.
    pub jobs: usize,
    /// Group and report without writing any montage.
    pub dry_run: bool,
}

impl RunOptions {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            output_dir: None,
            jobs: 1,
            dry_run: false,
        }
    }

    pub fn output_dir(&self) -> &Path {
        self.output_dir.as_deref().unwrap_or(&self.dir)
    }
}

/// A montage that was written, or would be in a dry run.
#[derive(Debug, Clone, Serialize)]
pub struct MontageRecord {
    pub key: String,
    pub prefix: String,
    pub path: PathBuf,
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedGroup {
    pub key: String,
    pub prefix: String,
    pub reason: String,
}

/// Outcome of one run.
#[derive(Debug, Default, Serialize)]
pub struct RunSummary {
    pub groups: usize,
    pub written: Vec<MontageRecord>,
    pub planned: Vec<MontageRecord>,
    pub failed: Vec<FailedGroup>,
    pub orphaned: Vec<String>,
    pub unreadable: Vec<String>,
}

impl RunSummary {
    pub fn write_json(&self, path: &Path) -> Result<(), RunError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| RunError::Report {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Failures that stop the whole run before or outside per-group work.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot read directory {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("cannot write report {}: {source}", path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot serialize report: {0}")]
    ReportJson(#[from] serde_json::Error),
}

/// Builds one montage per group found in `options.dir`.
///
/// Geometry is validated before the directory is touched. A group that fails
/// to compose or save is recorded in [`RunSummary::failed`] and the run goes on.
pub fn run(config: &MontageConfig, options: &RunOptions) -> Result<RunSummary, RunError> {
    let compositor = Compositor::from_config(config)?;
    let layout = compositor.layout();
    debug!(
        "canvas {}x{}, margin {}px",
        layout.width, layout.height, layout.margin
    );
    for placement in layout.placements() {
        debug!(
            "cell at ({}, {}) side {}",
            placement.x, placement.y, placement.side
        );
    }

    let source = DirectorySource::new(&options.dir);
    let names = source.list().map_err(|source| RunError::ReadDir {
        path: options.dir.clone(),
        source,
    })?;

    info!("loading images from {}", options.dir.display());
    let grouping = Grouper::from_config(config).group(&names, &source);
    info!(
        "{} group(s), {} orphaned, {} unreadable",
        grouping.sets.len(),
        grouping.orphaned.len(),
        grouping.unreadable.len()
    );

    let mut summary = RunSummary {
        groups: grouping.sets.len(),
        orphaned: grouping.orphaned,
        unreadable: grouping.unreadable,
        ..RunSummary::default()
    };
    let out_dir = options.output_dir();

    // Distinct prefixes can map to one file name (`A_map` and `Amap` under
    // underscore naming). The first set in prefix order keeps the name.
    let mut claimed: HashMap<String, &str> = HashMap::new();
    let mut sets: Vec<&ImageSet> = Vec::with_capacity(grouping.sets.len());
    for set in grouping.sets.values() {
        let file_name = compositor.file_name(set);
        if let Some(owner) = claimed.get(&file_name) {
            warn!("skipping `{}`: {file_name} already belongs to `{owner}`", set.prefix);
            summary.failed.push(FailedGroup {
                key: set.key.clone(),
                prefix: set.prefix.clone(),
                reason: format!("{file_name} already belongs to prefix `{owner}`"),
            });
            continue;
        }
        claimed.insert(file_name, &set.prefix);
        sets.push(set);
    }

    if options.dry_run {
        summary.planned = sets
            .iter()
            .map(|set| record(set, out_dir.join(compositor.file_name(set))))
            .collect();
        for planned in &summary.planned {
            info!("would write {} ({})", planned.path.display(), planned.roles.join(", "));
        }
        return Ok(summary);
    }

    if !sets.is_empty() {
        fs::create_dir_all(out_dir).map_err(|source| RunError::OutputDir {
            path: out_dir.to_path_buf(),
            source,
        })?;
    }

    info!("mounting images...");
    let results: Vec<Result<PathBuf, CompositeError>> = if options.jobs == 1 {
        sets.iter().map(|set| compositor.write(set, out_dir)).collect()
    } else {
        rayon::ThreadPoolBuilder::new()
            .num_threads(options.jobs)
            .build()?
            .install(|| {
                sets.par_iter()
                    .map(|set| compositor.write(set, out_dir))
                    .collect()
            })
    };

    for (set, result) in sets.iter().zip(results) {
        match result {
            Ok(path) => {
                let size = fs::metadata(&path).map(|m| ByteSize(m.len())).ok();
                match size {
                    Some(size) => info!("{} saved ({size}).", path.display()),
                    None => info!("{} saved.", path.display()),
                }
                summary.written.push(record(set, path));
            }
            Err(e) => {
                warn!("skipping `{}`: {e}", set.key);
                summary.failed.push(FailedGroup {
                    key: set.key.clone(),
                    prefix: set.prefix.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(summary)
}

fn record(set: &ImageSet, path: PathBuf) -> MontageRecord {
    MontageRecord {
        key: set.key.clone(),
        prefix: set.prefix.clone(),
        path,
        roles: placed_roles(set).iter().map(ToString::to_string).collect(),
    }
}
