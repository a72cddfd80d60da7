//! Signal dispatch while the monitor is busy
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
async fn test_terminate_is_handled_while_reload_queue_is_full() {
    let signals = Signals::new().unwrap();
    // A monitor stuck in a check never drains its queue.
    let (control_tx, mut control_rx) = mpsc::channel(1);
    control_tx.try_send(ControlEvent::Reload).unwrap();
    let handle = tokio::spawn(dispatch(signals, control_tx));

    raise(libc::SIGHUP);
    tokio::time::sleep(Duration::from_millis(200)).await;
    raise(libc::SIGHUP);
    tokio::time::sleep(Duration::from_millis(200)).await;
    raise(libc::SIGTERM);

    let code = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("Terminate blocked behind a pending reload")
        .unwrap();
    assert_eq!(code, TERMINATE_EXIT_CODE);

    // The queued reload is still the only one.
    assert_eq!(control_rx.recv().await, Some(ControlEvent::Reload));
    assert_eq!(control_rx.recv().await, None);
}
