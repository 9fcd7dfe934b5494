//! CLI parse tests.

use super::{Cli, CliCommand};
use clap::Parser;

pub(super) fn parse(args: &[&str]) -> CliCommand {
    let cli = Cli::try_parse_from(args).unwrap();
    cli.command
}

mod fetch;

#[test]
fn cli_completions_bash() {
    match parse(&["bdm", "completions", "bash"]) {
        CliCommand::Completions { shell } => assert_eq!(shell, clap_complete::Shell::Bash),
        other => panic!("expected Completions, got {:?}", other),
    }
}

#[test]
fn cli_rejects_unknown_shell() {
    assert!(Cli::try_parse_from(["bdm", "completions", "tcsh"]).is_err());
}
