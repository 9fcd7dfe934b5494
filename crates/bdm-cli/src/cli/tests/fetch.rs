use super::parse;
use crate::cli::commands::batch_dirs;
use crate::cli::{Cli, CliCommand};
use bdm_core::config::BdmConfig;
use clap::Parser;
use std::path::PathBuf;

#[test]
fn cli_fetch_urls_only() {
    match parse(&["bdm", "fetch", "https://a.example/x.iso", "https://b.example/y.iso"]) {
        CliCommand::Fetch(args) => {
            assert_eq!(
                args.urls,
                vec!["https://a.example/x.iso", "https://b.example/y.iso"]
            );
            assert!(args.staging_dir.is_none());
            assert!(args.dest_dir.is_none());
            assert!(args.max_retries.is_none());
            assert!(!args.json);
        }
        other => panic!("expected Fetch, got {:?}", other),
    }
}

#[test]
fn cli_fetch_requires_a_url() {
    assert!(Cli::try_parse_from(["bdm", "fetch"]).is_err());
}

#[test]
fn cli_fetch_all_flags() {
    let cmd = parse(&[
        "bdm",
        "fetch",
        "--staging-dir",
        "/tmp/s",
        "--dest-dir",
        "/tmp/d",
        "--max-retries",
        "7",
        "--connect-timeout",
        "3",
        "--timeout",
        "120",
        "--progress-threshold",
        "10",
        "--max-concurrent",
        "2",
        "--json",
        "https://a.example/x.iso",
    ]);
    let CliCommand::Fetch(args) = cmd else {
        panic!("expected Fetch");
    };
    assert_eq!(args.staging_dir, Some(PathBuf::from("/tmp/s")));
    assert_eq!(args.dest_dir, Some(PathBuf::from("/tmp/d")));
    assert_eq!(args.max_retries, Some(7));
    assert_eq!(args.connect_timeout, Some(3));
    assert_eq!(args.total_timeout, Some(120));
    assert_eq!(args.progress_threshold, Some(10));
    assert_eq!(args.max_concurrent, Some(2));
    assert!(args.json);
}

#[test]
fn flags_override_config() {
    let CliCommand::Fetch(args) = parse(&[
        "bdm",
        "fetch",
        "--max-retries",
        "0",
        "--dest-dir",
        "/srv/out",
        "https://a.example/x.iso",
    ]) else {
        panic!("expected Fetch");
    };
    let base = BdmConfig {
        total_timeout_secs: 5,
        ..BdmConfig::default()
    };
    let cfg = args.merged_config(&base);
    assert_eq!(cfg.max_retries, 0);
    assert_eq!(cfg.total_timeout_secs, 5);
    assert_eq!(cfg.destination_dir, Some(PathBuf::from("/srv/out")));

    let dirs = batch_dirs(&cfg);
    assert_eq!(dirs.destination, PathBuf::from("/srv/out"));
    assert_eq!(dirs.staging, PathBuf::from("/srv/out/.staging"));
}

#[test]
fn config_dirs_used_without_flags() {
    let CliCommand::Fetch(args) = parse(&["bdm", "fetch", "https://a.example/x.iso"]) else {
        panic!("expected Fetch");
    };
    let base = BdmConfig {
        staging_dir: Some(PathBuf::from("/var/tmp/bdm")),
        ..BdmConfig::default()
    };
    let dirs = batch_dirs(&args.merged_config(&base));
    assert_eq!(dirs.staging, PathBuf::from("/var/tmp/bdm"));
    assert_eq!(dirs.destination, PathBuf::from("downloads"));
}
