// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn defaults_apply_without_flags() {
    let cli = Cli::parse_from(["ckpoold"]);
    assert_eq!(cli.name_or_default(), "ckpool");
    assert_eq!(cli.loglevel, ckp_core::LOG_NOTICE);
    assert_eq!(cli.sockdir_or_default(), std::path::PathBuf::from("/tmp/ckpool/"));
    assert_eq!(cli.config_or_default(), std::path::PathBuf::from("ckpool.conf"));
}

#[test]
fn proxy_mode_defaults_name_to_ckproxy() {
    let cli = Cli::parse_from(["ckpoold", "-p"]);
    assert_eq!(cli.name_or_default(), "ckproxy");
    assert_eq!(cli.sockdir_or_default(), std::path::PathBuf::from("/tmp/ckproxy/"));
}

#[test]
fn explicit_name_overrides_proxy_default() {
    let cli = Cli::parse_from(["ckpoold", "-p", "-n", "t1"]);
    assert_eq!(cli.name_or_default(), "t1");
}

#[test]
fn explicit_sockdir_and_config_are_honored() {
    let cli = Cli::parse_from(["ckpoold", "-n", "t1", "-s", "/tmp/t1", "-c", "/tmp/t1.conf"]);
    assert_eq!(cli.sockdir_or_default(), std::path::PathBuf::from("/tmp/t1"));
    assert_eq!(cli.config_or_default(), std::path::PathBuf::from("/tmp/t1.conf"));
}

#[test]
fn raw_flags_mirror_cli_booleans() {
    let cli = Cli::parse_from(["ckpoold", "-B", "-k"]);
    let raw = cli.raw_flags();
    assert!(raw.btcsolo);
    assert!(raw.kill_old);
    assert!(!raw.proxy);
}

#[test]
fn handover_flag_parses() {
    let cli = Cli::parse_from(["ckpoold", "-H"]);
    assert!(cli.handover);
}
