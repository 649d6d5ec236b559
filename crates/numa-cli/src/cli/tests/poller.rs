//! Tests for run and check.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;

#[test]
fn cli_parse_run() {
    match parse(&["numa-updater", "run"]) {
        CliCommand::Run { token } => assert!(token.is_none()),
        _ => panic!("expected Run"),
    }
}

#[test]
fn cli_parse_run_with_token() {
    match parse(&["numa-updater", "run", "--token", "abc"]) {
        CliCommand::Run { token } => assert_eq!(token.as_deref(), Some("abc")),
        _ => panic!("expected Run with token"),
    }
}

#[test]
fn cli_parse_check() {
    match parse(&["numa-updater", "check"]) {
        CliCommand::Check { token, no_install } => {
            assert!(token.is_none());
            assert!(!no_install);
        }
        _ => panic!("expected Check"),
    }
}

#[test]
fn cli_parse_check_no_install_with_token() {
    match parse(&["numa-updater", "check", "--no-install", "--token", "t"]) {
        CliCommand::Check { token, no_install } => {
            assert_eq!(token.as_deref(), Some("t"));
            assert!(no_install);
        }
        _ => panic!("expected Check with --no-install"),
    }
}

#[test]
fn cli_rejects_unknown_subcommand() {
    assert!(Cli::try_parse_from(["numa-updater", "pause"]).is_err());
}

#[test]
fn cli_requires_subcommand() {
    assert!(Cli::try_parse_from(["numa-updater"]).is_err());
}
