// SPDX-License-Identifier: MIT

use super::*;
use tempfile::tempdir;

#[test]
fn missing_file_yields_defaults() {
    let dir = tempdir().unwrap();
    let cfg = ConfigFile::load(&dir.path().join("nope.conf")).unwrap();
    assert_eq!(cfg.btcaddress.as_deref(), Some(DONATION_ADDRESS));
    assert_eq!(cfg.blockpoll, Some(500));
    assert_eq!(cfg.update_interval, Some(30));
    assert_eq!(cfg.mindiff, Some(1));
    assert_eq!(cfg.startdiff, Some(42));
    assert_eq!(cfg.logdir.as_deref(), Some("logs"));
}

#[test]
fn malformed_json_is_reported() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.conf");
    std::fs::write(&path, "{ not json").unwrap();
    let err = ConfigFile::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Json(_, _)));
}

#[test]
fn unknown_keys_are_ignored() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ok.conf");
    std::fs::write(&path, r#"{"startdiff": 100, "totally_unknown_key": 42}"#).unwrap();
    let cfg = ConfigFile::load(&path).unwrap();
    assert_eq!(cfg.startdiff, Some(100));
}

#[test]
fn btcsig_is_truncated_to_38_bytes() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sig.conf");
    let long_sig = "x".repeat(100);
    std::fs::write(&path, format!(r#"{{"btcsig": "{long_sig}"}}"#)).unwrap();
    let cfg = ConfigFile::load(&path).unwrap();
    assert_eq!(cfg.btcsig.unwrap().len(), MAX_BTCSIG_LEN);
}

#[test]
fn btcsig_truncation_does_not_panic_mid_multibyte_char() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sig_mb.conf");
    // 37 ASCII bytes followed by a 3-byte '€', so the 38-byte cut point
    // falls inside the multi-byte character.
    let long_sig = format!("{}€{}", "a".repeat(37), "x".repeat(20));
    std::fs::write(&path, serde_json::json!({ "btcsig": long_sig }).to_string()).unwrap();
    let cfg = ConfigFile::load(&path).unwrap();
    let sig = cfg.btcsig.unwrap();
    assert!(sig.len() <= MAX_BTCSIG_LEN);
    assert!(sig.starts_with(&"a".repeat(37)));
}

#[test]
fn ensure_btcd_default_skipped_in_proxy_mode() {
    let mut cfg = ConfigFile::default();
    cfg.ensure_btcd_default(true);
    assert!(cfg.btcd.is_empty());
}

#[test]
fn ensure_btcd_default_fills_solo_mode() {
    let mut cfg = ConfigFile::default();
    cfg.ensure_btcd_default(false);
    assert_eq!(cfg.btcd.len(), 1);
    assert_eq!(cfg.btcd[0].url.as_deref(), Some("localhost:8332"));
    assert_eq!(cfg.btcd[0].auth.as_deref(), Some("user"));
    assert_eq!(cfg.btcd[0].pass.as_deref(), Some("pass"));
}

#[test]
fn btcd_array_parsed_from_config() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("btcd.conf");
    std::fs::write(
        &path,
        r#"{"btcd": [{"url": "node1:8332", "auth": "u", "pass": "p"}]}"#,
    )
    .unwrap();
    let cfg = ConfigFile::load(&path).unwrap();
    assert_eq!(cfg.btcd.len(), 1);
    assert_eq!(cfg.btcd[0].url.as_deref(), Some("node1:8332"));
}
