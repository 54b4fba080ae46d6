use clap::Parser;
use std::error::Error;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use freeze_montage::config::{MontageNaming, ResizeFilter, SecondaryExtension};
use freeze_montage::{MontageConfig, RoleMatch, RunOptions, run};

/// Files that belong together share a name and differ by a role tag:
/// `<name>_map.<ext>`, `<name>_square.<ext>`, `<name>_hole.<ext>`,
/// `<name>_i1.<ext>`, `<name>_i2.<ext>`. Every group with a map file gets a
/// montage; groups without one are skipped.
#[derive(Parser, Debug)]
#[command(
    name = "freeze_mf",
    about = "Make montages of cryo-EM screening images",
    version
)]
struct Cli {
    /// Path to the directory containing your images
    #[arg(short = 'p', long = "path")]
    path: PathBuf,

    /// Width in px of the montage [default: 1600]
    #[arg(short = 'w', long = "width")]
    width: Option<u32>,

    /// Margin as decimal fraction (e.g. 0.05 for 5% margin) [default: 0.05]
    #[arg(short = 'm', long = "margin")]
    margin: Option<f64>,

    /// Background color as rgb value (e.g. 255 255 255 for white) [default: 0 0 0]
    #[arg(short = 'c', long = "color", num_args = 3, value_names = ["R", "G", "B"])]
    color: Option<Vec<u8>>,

    /// How role tags must appear in file names
    #[arg(long = "match-mode", value_enum)]
    match_mode: Option<RoleMatch>,

    /// Which secondary files may join a map's group
    #[arg(long = "extension", value_enum)]
    extension: Option<SecondaryExtension>,

    /// Output file naming
    #[arg(long = "naming", value_enum)]
    naming: Option<MontageNaming>,

    /// Resampling filter
    #[arg(long = "filter", value_enum)]
    filter: Option<ResizeFilter>,

    /// JSON file with montage settings; flags override it
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// Write montages here instead of next to the inputs
    #[arg(short = 'o', long = "output-dir")]
    output_dir: Option<PathBuf>,

    /// Worker threads (0 = one per core)
    #[arg(short = 'j', long = "jobs", default_value_t = 1)]
    jobs: usize,

    /// List the montages that would be written, write nothing
    #[arg(long = "dry-run")]
    dry_run: bool,

    /// Write a JSON run summary to this file
    #[arg(long = "report")]
    report: Option<PathBuf>,
}

impl Cli {
    fn montage_config(&self) -> Result<MontageConfig, Box<dyn Error>> {
        let mut config = match &self.config {
            Some(path) => MontageConfig::from_json_file(path)?,
            None => MontageConfig::default(),
        };
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(margin) = self.margin {
            config.margin = margin;
        }
        if let Some([r, g, b]) = self.color.as_deref() {
            config.background = [*r, *g, *b];
        }
        if let Some(mode) = self.match_mode {
            config.role_match = mode;
        }
        if let Some(extension) = self.extension {
            config.extension = extension;
        }
        if let Some(naming) = self.naming {
            config.naming = naming;
        }
        if let Some(filter) = self.filter {
            config.filter = filter;
        }
        Ok(config)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let cli = Cli::parse();

    if !cli.path.is_dir() {
        return Err(format!("Not a directory: {}", cli.path.display()).into());
    }

    let config = cli.montage_config()?;
    let options = RunOptions {
        dir: cli.path.clone(),
        output_dir: cli.output_dir.clone(),
        jobs: cli.jobs,
        dry_run: cli.dry_run,
    };

    let summary = run(&config, &options)?;

    if let Some(report) = &cli.report {
        summary.write_json(report)?;
    }

    if summary.groups == 0 {
        eprintln!("No map files found in {}", cli.path.display());
    } else if cli.dry_run {
        println!("{} montage(s) planned", summary.planned.len());
    } else {
        println!(
            "{} of {} montage(s) written, {} failed",
            summary.written.len(),
            summary.groups,
            summary.failed.len()
        );
    }

    Ok(())
}
