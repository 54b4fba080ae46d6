mod common;

use std::fs;

use common::{BLUE, GREEN, RED, write_solid};
use freeze_montage::config::{MontageNaming, ResizeFilter};
use freeze_montage::{ConfigError, MontageConfig, RunError, RunOptions, run};
use tempfile::tempdir;

fn small() -> MontageConfig {
    MontageConfig {
        width: 200,
        ..MontageConfig::default()
    }
}

fn populate(dir: &std::path::Path) {
    write_solid(dir, "A_map.png", RED);
    write_solid(dir, "A_square.png", GREEN);
    write_solid(dir, "A_hole.bmp", BLUE);
    write_solid(dir, "B_map.png", BLUE);
    write_solid(dir, "C_square.png", GREEN);
    fs::write(dir.join("D_map.png"), b"not an image").expect("write junk");
    fs::write(dir.join("notes.txt"), b"session 4").expect("write notes");
}

#[test]
fn writes_one_montage_per_map() {
    let dir = tempdir().expect("tempdir");
    populate(dir.path());

    let summary = run(&small(), &RunOptions::new(dir.path())).expect("run");

    assert_eq!(summary.groups, 2);
    assert!(summary.failed.is_empty());
    let keys: Vec<&str> = summary.written.iter().map(|m| m.key.as_str()).collect();
    assert_eq!(keys, ["A", "B"]);
    assert_eq!(summary.written[0].roles, ["map", "square", "hole"]);
    assert_eq!(summary.orphaned, ["C_square.png"]);
    assert_eq!(summary.unreadable, ["D_map.png"]);

    let montage = image::open(dir.path().join("A_montage.png")).expect("montage readable");
    assert_eq!((montage.width(), montage.height()), (200, 100));
    assert!(dir.path().join("B_montage.png").is_file());
    assert!(!dir.path().join("C_montage.png").exists());
}

#[test]
fn rerun_ignores_previous_montages() {
    let dir = tempdir().expect("tempdir");
    populate(dir.path());

    run(&small(), &RunOptions::new(dir.path())).expect("first run");
    let second = run(&small(), &RunOptions::new(dir.path())).expect("second run");

    assert_eq!(second.groups, 2);
    assert_eq!(second.written.len(), 2);
}

#[test]
fn invalid_geometry_aborts_before_writing() {
    let dir = tempdir().expect("tempdir");
    populate(dir.path());
    let config = MontageConfig {
        margin: 1.0,
        ..small()
    };

    let err = run(&config, &RunOptions::new(dir.path())).unwrap_err();

    assert!(matches!(err, RunError::Config(ConfigError::MarginOutOfRange(_))));
    assert!(!dir.path().join("A_montage.png").exists());
}

#[test]
fn missing_directory_is_fatal() {
    let dir = tempdir().expect("tempdir");
    let err = run(&small(), &RunOptions::new(dir.path().join("absent"))).unwrap_err();
    assert!(matches!(err, RunError::ReadDir { .. }));
}

#[test]
fn dry_run_plans_without_writing() {
    let dir = tempdir().expect("tempdir");
    populate(dir.path());
    let options = RunOptions {
        dry_run: true,
        ..RunOptions::new(dir.path())
    };

    let summary = run(&small(), &options).expect("dry run");

    assert_eq!(summary.planned.len(), 2);
    assert!(summary.written.is_empty());
    assert_eq!(summary.planned[0].path, dir.path().join("A_montage.png"));
    assert!(!summary.planned[0].path.exists());
}

#[test]
fn parallel_run_matches_sequential_order() {
    let dir = tempdir().expect("tempdir");
    let out = tempdir().expect("tempdir");
    populate(dir.path());
    let options = RunOptions {
        output_dir: Some(out.path().join("montages")),
        jobs: 3,
        ..RunOptions::new(dir.path())
    };

    let summary = run(&small(), &options).expect("parallel run");

    let paths: Vec<_> = summary.written.iter().map(|m| m.path.clone()).collect();
    assert_eq!(
        paths,
        [
            out.path().join("montages/A_montage.png"),
            out.path().join("montages/B_montage.png"),
        ]
    );
    assert!(paths.iter().all(|p| p.is_file()));
    assert!(!dir.path().join("A_montage.png").exists());
}

#[test]
fn report_is_written_as_json() {
    let dir = tempdir().expect("tempdir");
    populate(dir.path());
    let summary = run(&small(), &RunOptions::new(dir.path())).expect("run");

    let report = dir.path().join("report.json");
    summary.write_json(&report).expect("write report");

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report).expect("read report")).expect("json");
    assert_eq!(value["groups"], 2);
    assert_eq!(value["written"][1]["key"], "B");
    assert_eq!(value["orphaned"][0], "C_square.png");
}

#[test]
fn failed_save_does_not_stop_other_groups() {
    let dir = tempdir().expect("tempdir");
    populate(dir.path());
    fs::create_dir(dir.path().join("A_montage.png")).expect("block output path");

    let summary = run(&small(), &RunOptions::new(dir.path())).expect("run");

    assert_eq!(summary.groups, 2);
    assert_eq!(summary.written.len(), 1);
    assert_eq!(summary.written[0].key, "B");
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].key, "A");
    assert_eq!(summary.failed[0].prefix, "A_");
    assert!(dir.path().join("B_montage.png").is_file());
    assert!(dir.path().join("A_montage.png").is_dir());
}

fn populate_shared_key(dir: &std::path::Path) {
    write_solid(dir, "A_map.png", RED);
    write_solid(dir, "Amap.png", BLUE);
    write_solid(dir, "A-square.png", GREEN);
}

#[test]
fn legacy_naming_writes_each_prefix() {
    let dir = tempdir().expect("tempdir");
    populate_shared_key(dir.path());
    let config = MontageConfig {
        naming: MontageNaming::Legacy,
        ..small()
    };

    let summary = run(&config, &RunOptions::new(dir.path())).expect("run");

    assert_eq!(summary.groups, 2);
    let paths: Vec<_> = summary.written.iter().map(|m| m.path.clone()).collect();
    assert_eq!(
        paths,
        [dir.path().join("Amontage.png"), dir.path().join("A_montage.png")]
    );
    assert!(summary.written.iter().all(|m| m.roles == ["map"]));
    assert_eq!(summary.orphaned, ["A-square.png"]);
}

#[test]
fn clashing_output_name_fails_later_prefix() {
    let dir = tempdir().expect("tempdir");
    populate_shared_key(dir.path());
    let config = MontageConfig {
        filter: ResizeFilter::Nearest,
        ..small()
    };

    let summary = run(&config, &RunOptions::new(dir.path())).expect("run");

    assert_eq!(summary.groups, 2);
    assert_eq!(summary.written.len(), 1);
    assert_eq!(summary.written[0].prefix, "A");
    assert_eq!(summary.written[0].path, dir.path().join("A_montage.png"));
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].prefix, "A_");
    assert!(summary.failed[0].reason.contains("A_montage.png"));

    let montage = image::open(dir.path().join("A_montage.png"))
        .expect("montage readable")
        .to_rgba8();
    let margin = 5;
    assert_eq!(montage.get_pixel(margin, margin).0, BLUE);
}
