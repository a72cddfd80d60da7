//! Integration tests for signal dispatch
#![cfg(unix)]

use std::time::Duration;
use tokio::sync::mpsc;
use webob::ControlEvent;
use webob_cli::{Signals, TERMINATE_EXIT_CODE, dispatch};

fn raise(signal: libc::c_int) {
    // SAFETY: raising a signal the test has installed a handler for.
    let rc = unsafe { libc::raise(signal) };
    assert_eq!(rc, 0);
}

#[tokio::test]
async fn test_signals_drive_monitor_control() {
    let signals = Signals::new().unwrap();
    let (control_tx, mut control_rx) = mpsc::channel(8);
    let handle = tokio::spawn(dispatch(signals, control_tx));

    raise(libc::SIGHUP);
    let event = tokio::time::timeout(Duration::from_secs(5), control_rx.recv())
        .await
        .expect("Timeout waiting for reload")
        .expect("Channel closed");
    assert_eq!(event, ControlEvent::Reload);

    raise(libc::SIGTERM);
    let code = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("Timeout waiting for dispatch to return")
        .unwrap();
    assert_eq!(code, TERMINATE_EXIT_CODE);
}
