//! Response checking: the HTTP client seam, field comparison and mismatch logging.

use crate::types::{CheckResult, Config, Field, Mismatch, Response};
use async_trait::async_trait;
use common::{Error, Result};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, SERVER, USER_AGENT};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Issues the GET request behind every check
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Fetch `url` and return its status and headers. The body is not read.
    async fn get(&self, url: &str) -> Result<Response>;
}

/// Receives one line per mismatch or rejected reload
#[cfg_attr(test, mockall::automock)]
pub trait Logger: Send + Sync {
    fn log(&self, line: &str);
}

/// HTTP client backed by reqwest
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Create a new client.
    ///
    /// Without a `timeout` a request waits as long as the server keeps the
    /// connection open.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(Error::transport)?;

        Ok(Self { client })
    }
}

fn header_value(headers: &HeaderMap, name: HeaderName) -> String {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get(&self, url: &str) -> Result<Response> {
        let start = Instant::now();

        match self.client.get(url).send().await {
            Ok(response) => {
                let headers = response.headers();
                let observed = Response {
                    status_code: response.status().as_u16(),
                    server: header_value(headers, SERVER),
                    content_type: header_value(headers, CONTENT_TYPE),
                    user_agent: header_value(headers, USER_AGENT),
                };
                debug!(url = %url, status = observed.status_code,
                       duration_ms = start.elapsed().as_millis(), "HTTP request completed");
                Ok(observed)
            }
            Err(e) => {
                warn!(url = %url, error = %e, "HTTP request failed");
                Err(Error::transport(format!("GET {}: {}", url, e)))
            }
        }
    }
}

/// Logger that emits each line as a tracing warning
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, line: &str) {
        warn!(target: "webob::check", "{}", line);
    }
}

/// Compare a response against the expectations of `config`.
///
/// Every field is compared, in [`Field::ALL`] order, even after a mismatch.
pub fn evaluate(config: &Config, observed: Response) -> CheckResult {
    let mut mismatches = Vec::new();

    for field in Field::ALL {
        let (received, expected) = match field {
            Field::StatusCode => (
                observed.status_code.to_string(),
                config.status_code.to_string(),
            ),
            Field::Server => (observed.server.clone(), config.server.clone()),
            Field::ContentType => (observed.content_type.clone(), config.content_type.clone()),
            Field::UserAgent => (observed.user_agent.clone(), config.user_agent.clone()),
        };

        if received != expected {
            mismatches.push(Mismatch {
                field,
                received,
                expected,
            });
        }
    }

    CheckResult {
        observed,
        mismatches,
    }
}
