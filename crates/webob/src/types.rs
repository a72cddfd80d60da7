//! Monitor types and structures.

use std::fmt;
use std::time::Duration;
use validator::{Validate, ValidationError};

/// Polling interval used when no source sets one.
pub const DEFAULT_TICK: Duration = Duration::from_secs(60);

/// Expected status code used when no source sets one.
pub const DEFAULT_STATUS_CODE: u16 = 200;

/// Expectations for a single monitored URL.
///
/// A `Config` is never mutated once built. Reloading replaces the whole
/// value, so a check always compares against one consistent set of
/// expectations.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct Config {
    /// Target to poll
    #[validate(custom = "validate_url")]
    pub url: String,

    /// Expected response status code
    pub status_code: u16,

    /// Expected `Content-Type` header value
    pub content_type: String,

    /// Expected `Server` header value
    pub server: String,

    /// Expected `User-Agent` header value
    pub user_agent: String,

    /// Interval between checks
    #[validate(custom = "validate_tick")]
    pub tick: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: String::new(),
            status_code: DEFAULT_STATUS_CODE,
            content_type: String::new(),
            server: String::new(),
            user_agent: String::new(),
            tick: DEFAULT_TICK,
        }
    }
}

fn validate_url(url: &str) -> Result<(), ValidationError> {
    if url.trim().is_empty() {
        return Err(ValidationError::new("url_empty"));
    }
    Ok(())
}

fn validate_tick(tick: &Duration) -> Result<(), ValidationError> {
    if tick.is_zero() {
        return Err(ValidationError::new("tick_not_positive"));
    }
    Ok(())
}

/// Response metadata observed by a check.
///
/// Headers that were absent from the response are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    pub status_code: u16,
    pub server: String,
    pub content_type: String,
    pub user_agent: String,
}

/// A compared response field, in comparison order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    StatusCode,
    Server,
    ContentType,
    UserAgent,
}

impl Field {
    /// All fields in the order they are checked.
    pub const ALL: [Field; 4] = [
        Field::StatusCode,
        Field::Server,
        Field::ContentType,
        Field::UserAgent,
    ];

    /// Human-readable message logged when this field does not match.
    pub fn mismatch_message(&self) -> &'static str {
        match self {
            Field::StatusCode => "Status code mismatch",
            Field::Server => "Server header mismatch",
            Field::ContentType => "Content-Type header mismatch",
            Field::UserAgent => "User-Agent header mismatch",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::StatusCode => write!(f, "status_code"),
            Field::Server => write!(f, "server"),
            Field::ContentType => write!(f, "content_type"),
            Field::UserAgent => write!(f, "user_agent"),
        }
    }
}

/// A single field whose observed value differs from the expectation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub field: Field,
    pub received: String,
    pub expected: String,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (received: {:?}, expected: {:?})",
            self.field.mismatch_message(),
            self.received,
            self.expected
        )
    }
}

/// Outcome of one check. Lives for a single tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    /// What the server sent back
    pub observed: Response,

    /// Fields that did not match, in comparison order
    pub mismatches: Vec<Mismatch>,
}

impl CheckResult {
    /// Check if every field matched
    pub fn is_match(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Lifecycle of a [`Monitor`](crate::monitor::Monitor).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    /// Loading the first configuration
    Initializing,
    /// Checking on every tick
    Running,
    /// Cancellation observed, no new check will start
    Draining,
    /// Terminal
    Stopped,
}

impl fmt::Display for MonitorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonitorState::Initializing => write!(f, "INITIALIZING"),
            MonitorState::Running => write!(f, "RUNNING"),
            MonitorState::Draining => write!(f, "DRAINING"),
            MonitorState::Stopped => write!(f, "STOPPED"),
        }
    }
}

/// External request delivered to the monitor's control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    /// Re-read the configuration file and swap it in if valid
    Reload,
    /// Stop after the current check, if any
    Shutdown,
}
