//! Monitor control loop.

use crate::checkers::{HttpClient, Logger, evaluate};
use crate::config::ConfigSource;
use crate::types::{CheckResult, Config, ControlEvent, MonitorState};
use common::Result;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, sleep};
use tracing::{debug, error, info};

/// Polls a URL on every tick and reports fields that differ from expectations.
///
/// All state changes happen on the task running [`Monitor::run`]. Reload and
/// shutdown requests arrive as [`ControlEvent`]s and are handled between
/// checks, never during one.
pub struct Monitor {
    source: Arc<dyn ConfigSource>,
    client: Arc<dyn HttpClient>,
    logger: Arc<dyn Logger>,
    state: watch::Sender<MonitorState>,
}

impl Monitor {
    /// Create a new monitor
    pub fn new(
        source: Arc<dyn ConfigSource>,
        client: Arc<dyn HttpClient>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        let (state, _) = watch::channel(MonitorState::Initializing);
        Self {
            source,
            client,
            logger,
            state,
        }
    }

    /// Watch lifecycle transitions
    pub fn subscribe(&self) -> watch::Receiver<MonitorState> {
        self.state.subscribe()
    }

    /// Get current lifecycle state
    pub fn state(&self) -> MonitorState {
        *self.state.borrow()
    }

    fn transition(&self, next: MonitorState) {
        debug!(from = %self.state(), to = %next, "Monitor state transition");
        self.state.send_replace(next);
    }

    /// Run until cancelled or until a check cannot reach the server.
    ///
    /// Cancellation is either [`ControlEvent::Shutdown`] or every sender of
    /// `control` being dropped; both return `Ok(())`. A failure to load the
    /// initial configuration or a transport error returns that error.
    pub async fn run(&self, mut control: mpsc::Receiver<ControlEvent>) -> Result<()> {
        self.transition(MonitorState::Initializing);

        let mut active = match self.source.load() {
            Ok(config) => Arc::new(config),
            Err(e) => {
                error!(error = %e, "Failed to load initial configuration");
                self.transition(MonitorState::Stopped);
                return Err(e);
            }
        };

        info!(url = %active.url, tick = ?active.tick, "Monitor started");
        self.transition(MonitorState::Running);

        let mut armed_at = Instant::now();
        let next_tick = sleep(active.tick);
        tokio::pin!(next_tick);

        loop {
            tokio::select! {
                biased;

                event = control.recv() => match event {
                    Some(ControlEvent::Reload) => {
                        let previous_tick = active.tick;
                        // The pending deadline stands unless the interval changed.
                        if self.reload(&mut active) && active.tick != previous_tick {
                            next_tick.as_mut().reset(armed_at + active.tick);
                        }
                    }
                    Some(ControlEvent::Shutdown) | None => break,
                },
                _ = &mut next_tick => {
                    let snapshot = Arc::clone(&active);
                    if let Err(e) = self.check(&snapshot).await {
                        error!(url = %snapshot.url, error = %e, "Check failed, stopping monitor");
                        self.transition(MonitorState::Stopped);
                        return Err(e);
                    }
                    armed_at = Instant::now();
                    next_tick.as_mut().reset(armed_at + active.tick);
                }
            }
        }

        self.transition(MonitorState::Draining);
        info!("Monitor stopping");
        self.transition(MonitorState::Stopped);
        Ok(())
    }

    /// Perform one check against `snapshot` and log every mismatch.
    pub async fn check(&self, snapshot: &Config) -> Result<CheckResult> {
        let observed = self.client.get(&snapshot.url).await?;
        let result = evaluate(snapshot, observed);

        for mismatch in &result.mismatches {
            self.logger.log(&mismatch.to_string());
        }

        debug!(
            url = %snapshot.url,
            status = result.observed.status_code,
            mismatches = result.mismatches.len(),
            "Check completed"
        );
        Ok(result)
    }

    /// Swap in the file configuration. Returns whether the swap happened.
    fn reload(&self, active: &mut Arc<Config>) -> bool {
        match self.source.reload_from_file() {
            Ok(config) => {
                info!(url = %config.url, tick = ?config.tick, "Configuration reloaded");
                *active = Arc::new(config);
                true
            }
            Err(e) => {
                self.logger.log(&format!(
                    "Reload rejected: {}; keeping configuration for {}",
                    e, active.url
                ));
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkers::{MockHttpClient, MockLogger};
    use crate::config::MockConfigSource;
    use crate::types::Response;
    use common::Error;
    use std::sync::Mutex;
    use std::time::Duration;

    fn config(status_code: u16) -> Config {
        Config {
            url: "http://x".to_string(),
            status_code,
            tick: Duration::from_secs(1),
            ..Config::default()
        }
    }

    fn ok_response() -> Response {
        Response {
            status_code: 200,
            ..Response::default()
        }
    }

    fn recording_logger() -> (MockLogger, Arc<Mutex<Vec<String>>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = lines.clone();
        let mut logger = MockLogger::new();
        logger
            .expect_log()
            .returning(move |line| sink.lock().unwrap().push(line.to_string()));
        (logger, lines)
    }

    #[tokio::test]
    async fn test_initial_load_failure_is_fatal() {
        let mut source = MockConfigSource::new();
        source
            .expect_load()
            .returning(|| Err(Error::invalid_config("url is empty")));
        let mut client = MockHttpClient::new();
        client.expect_get().never();

        let monitor = Monitor::new(Arc::new(source), Arc::new(client), Arc::new(MockLogger::new()));
        let (_tx, rx) = mpsc::channel(1);

        let err = monitor.run(rx).await.unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
        assert_eq!(monitor.state(), MonitorState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_while_waiting_makes_no_request() {
        let mut source = MockConfigSource::new();
        source.expect_load().returning(|| Ok(config(200)));
        let mut client = MockHttpClient::new();
        client.expect_get().never();

        let monitor = Monitor::new(Arc::new(source), Arc::new(client), Arc::new(MockLogger::new()));
        let (tx, rx) = mpsc::channel(1);
        tx.send(ControlEvent::Shutdown).await.unwrap();

        monitor.run(rx).await.unwrap();
        assert_eq!(monitor.state(), MonitorState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_sender_cancels() {
        let mut source = MockConfigSource::new();
        source.expect_load().returning(|| Ok(config(200)));
        let mut client = MockHttpClient::new();
        client.expect_get().never();

        let monitor = Monitor::new(Arc::new(source), Arc::new(client), Arc::new(MockLogger::new()));
        let (tx, rx) = mpsc::channel(1);
        drop(tx);

        assert!(monitor.run(rx).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_error_stops_the_run() {
        let mut source = MockConfigSource::new();
        source.expect_load().returning(|| Ok(config(200)));
        let mut client = MockHttpClient::new();
        client
            .expect_get()
            .times(1)
            .returning(|_| Err(Error::transport("connection refused")));

        let monitor = Monitor::new(Arc::new(source), Arc::new(client), Arc::new(MockLogger::new()));
        let (_tx, rx) = mpsc::channel(1);

        let err = monitor.run(rx).await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        assert_eq!(monitor.state(), MonitorState::Stopped);
    }

    #[tokio::test]
    async fn test_check_logs_each_mismatch() {
        let mut client = MockHttpClient::new();
        client
            .expect_get()
            .withf(|url| url == "http://x")
            .returning(|_| {
                Ok(Response {
                    status_code: 404,
                    server: "Apache".to_string(),
                    ..Response::default()
                })
            });
        let (logger, lines) = recording_logger();

        let monitor = Monitor::new(
            Arc::new(MockConfigSource::new()),
            Arc::new(client),
            Arc::new(logger),
        );
        let result = monitor.check(&config(200)).await.unwrap();

        assert_eq!(result.mismatches.len(), 2);
        let lines = lines.lock().unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Status code mismatch"));
        assert!(lines[0].contains("\"404\"") && lines[0].contains("\"200\""));
        assert!(lines[1].starts_with("Server header mismatch"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_reload_keeps_active_config() {
        let mut source = MockConfigSource::new();
        source.expect_load().returning(|| Ok(config(200)));
        source
            .expect_reload_from_file()
            .returning(|| Err(Error::invalid_config("tick must be positive")));

        let (seen_tx, mut seen_rx) = mpsc::unbounded_channel();
        let mut client = MockHttpClient::new();
        client.expect_get().returning(move |_| {
            let _ = seen_tx.send(());
            Ok(ok_response())
        });
        let (logger, lines) = recording_logger();

        let monitor = Arc::new(Monitor::new(
            Arc::new(source),
            Arc::new(client),
            Arc::new(logger),
        ));
        let (tx, rx) = mpsc::channel(4);
        let handle = tokio::spawn({
            let monitor = monitor.clone();
            async move { monitor.run(rx).await }
        });

        tx.send(ControlEvent::Reload).await.unwrap();
        seen_rx.recv().await.unwrap();
        seen_rx.recv().await.unwrap();
        tx.send(ControlEvent::Shutdown).await.unwrap();
        handle.await.unwrap().unwrap();

        let lines = lines.lock().unwrap();
        assert_eq!(lines.len(), 1, "only the rejected reload is logged: {:?}", lines);
        assert!(lines[0].starts_with("Reload rejected"));
    }
}
