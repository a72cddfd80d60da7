//! Command line flags.

use clap::Parser;
use common::LogFormat;
use std::path::PathBuf;
use std::time::Duration;
use webob::{ConfigStore, Overrides};

/// Poll a URL and log every response field that differs from expectations.
///
/// Values set here take precedence over the configuration file. Send SIGHUP
/// to re-read the file without restarting.
#[derive(Debug, Parser)]
#[command(name = "webob", version)]
pub struct Cli {
    #[arg(long, env = "WEBOB_URL", help = "Request URL")]
    pub url: Option<String>,

    #[arg(
        long = "status_code",
        visible_alias = "status-code",
        env = "WEBOB_STATUS_CODE",
        help = "HTTP response status code"
    )]
    pub status_code: Option<u16>,

    #[arg(
        long = "content_type",
        visible_alias = "content-type",
        env = "WEBOB_CONTENT_TYPE",
        help = "Content-Type HTTP response header value"
    )]
    pub content_type: Option<String>,

    #[arg(long, env = "WEBOB_SERVER", help = "Server HTTP response header value")]
    pub server: Option<String>,

    #[arg(
        long = "user_agent",
        visible_alias = "user-agent",
        env = "WEBOB_USER_AGENT",
        help = "User-Agent HTTP response header value"
    )]
    pub user_agent: Option<String>,

    #[arg(
        long,
        env = "WEBOB_TICK",
        value_parser = humantime::parse_duration,
        help = "Ticking interval, e.g. 30s or 1m [default: 60s]"
    )]
    pub tick: Option<Duration>,

    #[arg(
        long,
        env = "WEBOB_CONFIG",
        help = "Configuration file [default: <user config dir>/webob/config.yaml]"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        env = "WEBOB_REQUEST_TIMEOUT",
        value_parser = humantime::parse_duration,
        help = "Abort a request after this long; unset waits indefinitely"
    )]
    pub request_timeout: Option<Duration>,

    #[arg(long, env = "WEBOB_LOG_FORMAT", default_value_t = LogFormat::Text, help = "text or json")]
    pub log_format: LogFormat,

    #[arg(long, env = "WEBOB_LOG_FILE", help = "Append logs to this file instead of stdout")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Flag values to layer over the configuration file
    pub fn overrides(&self) -> Overrides {
        Overrides {
            url: self.url.clone(),
            status_code: self.status_code,
            content_type: self.content_type.clone(),
            server: self.server.clone(),
            user_agent: self.user_agent.clone(),
            tick: self.tick,
        }
    }

    /// Configuration store honoring `--config`
    pub fn config_store(&self) -> ConfigStore {
        match &self.config {
            Some(path) => ConfigStore::new(Some(path.clone()), self.overrides()),
            None => ConfigStore::with_default_path(self.overrides()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
