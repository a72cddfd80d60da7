//! webob command line front end
//!
//! Binds the monitor library to the outside world:
//! - **cli**: flags layered over the configuration file
//! - **signals**: SIGHUP reload, SIGINT/SIGTERM exit
//! - log sink selection (stdout or a file, text or JSON)

pub mod cli;
pub mod signals;

pub use cli::Cli;
pub use signals::{SignalAction, Signals, TERMINATE_EXIT_CODE, dispatch};

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

/// Route tracing output to `log_file`, or stdout when unset.
pub fn init_logging(cli: &Cli) -> common::Result<()> {
    match &cli.log_file {
        Some(path) => {
            let file = open_log_file(path)?;
            common::logging::init_with_writer(cli.log_format, Mutex::new(file));
        }
        None => common::logging::init_with_writer(cli.log_format, std::io::stdout),
    }
    Ok(())
}

fn open_log_file(path: &Path) -> common::Result<File> {
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}
