//! OS signal binding.
//!
//! SIGHUP becomes a [`ControlEvent::Reload`] for the monitor. SIGINT and
//! SIGTERM end the process without waiting for the monitor to drain.

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info, warn};
use webob::ControlEvent;

/// Process exit status after a terminate signal.
pub const TERMINATE_EXIT_CODE: i32 = 1;

/// What a received signal asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalAction {
    Reload,
    Terminate,
}

/// Registered signal streams
#[cfg(unix)]
pub struct Signals {
    hangup: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
    interrupt: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl Signals {
    /// Register handlers. From here on the signals no longer kill the process.
    pub fn new() -> Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};

        Ok(Self {
            hangup: signal(SignalKind::hangup())?,
            terminate: signal(SignalKind::terminate())?,
            interrupt: signal(SignalKind::interrupt())?,
        })
    }

    /// Wait for the next signal
    pub async fn recv(&mut self) -> SignalAction {
        tokio::select! {
            _ = self.hangup.recv() => SignalAction::Reload,
            _ = self.terminate.recv() => SignalAction::Terminate,
            _ = self.interrupt.recv() => SignalAction::Terminate,
        }
    }
}

/// Registered signal streams
#[cfg(not(unix))]
pub struct Signals;

#[cfg(not(unix))]
impl Signals {
    pub fn new() -> Result<Self> {
        Ok(Self)
    }

    /// Wait for Ctrl-C; there is no reload signal on this platform
    pub async fn recv(&mut self) -> SignalAction {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
        SignalAction::Terminate
    }
}

/// Forward signals to the monitor until a terminate signal arrives.
///
/// Returns the exit status the process should end with. Forwarding never
/// waits on the monitor: a reload that finds the queue full is already
/// pending, and one that finds the monitor gone is dropped.
pub async fn dispatch(mut signals: Signals, control: mpsc::Sender<ControlEvent>) -> i32 {
    loop {
        match signals.recv().await {
            SignalAction::Reload => {
                info!("Got SIGHUP, reloading configuration");
                match control.try_send(ControlEvent::Reload) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => debug!("Reload already pending"),
                    Err(TrySendError::Closed(_)) => {
                        warn!("Monitor is no longer accepting reload requests")
                    }
                }
            }
            SignalAction::Terminate => {
                info!("Got SIGINT/SIGTERM, exiting");
                return TERMINATE_EXIT_CODE;
            }
        }
    }
}
