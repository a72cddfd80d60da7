//! webob binary

use clap::Parser;
use std::sync::Arc;
use tokio::sync::mpsc;
use webob::{Monitor, ReqwestClient, TracingLogger};
use webob_cli::{Cli, Signals, dispatch, init_logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    tracing::info!("webob starting");

    // Register before the first check so an early SIGHUP is not fatal.
    let signals = Signals::new()?;

    let store = cli.config_store();
    if let Some(path) = store.path() {
        tracing::debug!("Configuration file: {}", path.display());
    }

    let monitor = Monitor::new(
        Arc::new(store),
        Arc::new(ReqwestClient::new(cli.request_timeout)?),
        Arc::new(TracingLogger),
    );

    let (control_tx, control_rx) = mpsc::channel(8);

    tokio::select! {
        result = monitor.run(control_rx) => {
            if let Err(e) = &result {
                tracing::error!(error = %e, "Monitor stopped");
            }
            result?;
        }
        code = dispatch(signals, control_tx) => {
            // Terminate skips draining; any in-flight request is abandoned.
            std::process::exit(code);
        }
    }

    tracing::info!("webob stopped");
    Ok(())
}
