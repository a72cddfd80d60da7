//! Periodic HTTP response monitoring with live configuration reload.
//!
//! On every tick the [`Monitor`] issues a GET against the configured URL and
//! compares the response against the expected values:
//! - status code
//! - `Server` header
//! - `Content-Type` header
//! - `User-Agent` header
//!
//! Each field that differs produces one log line. A reload request re-reads
//! the configuration file and swaps it in only if it validates; checks that
//! already started keep the configuration they began with.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tokio::sync::mpsc;
//! use webob::{ConfigStore, ControlEvent, Monitor, Overrides, ReqwestClient, TracingLogger};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let overrides = Overrides {
//!     url: Some("http://localhost:8080/health".to_string()),
//!     ..Overrides::default()
//! };
//! let store = ConfigStore::with_default_path(overrides);
//!
//! let monitor = Monitor::new(
//!     Arc::new(store),
//!     Arc::new(ReqwestClient::new(None)?),
//!     Arc::new(TracingLogger),
//! );
//!
//! let (control, rx) = mpsc::channel(8);
//! control.send(ControlEvent::Reload).await?;
//! monitor.run(rx).await?;
//! # Ok(())
//! # }
//! ```

pub mod checkers;
pub mod config;
pub mod monitor;
pub mod types;

pub use checkers::{HttpClient, Logger, ReqwestClient, TracingLogger, evaluate};
pub use config::{ConfigSource, ConfigStore, FileConfig, Overrides};
pub use monitor::Monitor;
pub use types::{CheckResult, Config, ControlEvent, Field, Mismatch, MonitorState, Response};
