// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn btcsolo_implies_standalone() {
    let mode = Mode::from_flags(RawFlags { btcsolo: true, ..Default::default() }).unwrap();
    assert!(mode.standalone);
    assert!(mode.btcsolo);
}

#[test]
fn passthrough_implies_proxy_and_standalone() {
    let mode = Mode::from_flags(RawFlags { passthrough: true, ..Default::default() }).unwrap();
    assert!(mode.proxy);
    assert!(mode.standalone);
    assert!(mode.passthrough);
}

#[test]
fn handover_implies_kill_old() {
    let mode = Mode::from_flags(RawFlags { handover: true, ..Default::default() }).unwrap();
    assert!(mode.kill_old);
    assert!(mode.handover);
}

#[test]
fn proxy_and_passthrough_conflict() {
    let err =
        Mode::from_flags(RawFlags { proxy: true, passthrough: true, ..Default::default() })
            .unwrap_err();
    assert_eq!(err, ModeError::ProxyAndPassthrough);
}

#[test]
fn btcsolo_and_proxy_conflict() {
    let err = Mode::from_flags(RawFlags { proxy: true, btcsolo: true, ..Default::default() })
        .unwrap_err();
    assert_eq!(err, ModeError::ProxyAndBtcsolo);
}

#[test]
fn btcsolo_and_passthrough_conflict() {
    let err =
        Mode::from_flags(RawFlags { passthrough: true, btcsolo: true, ..Default::default() })
            .unwrap_err();
    assert_eq!(err, ModeError::ProxyAndBtcsolo);
}

#[test]
fn plain_standalone_is_unaffected() {
    let mode = Mode::from_flags(RawFlags { standalone: true, ..Default::default() }).unwrap();
    assert!(mode.standalone);
    assert!(!mode.proxy);
    assert!(!mode.btcsolo);
}
