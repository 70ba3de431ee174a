// ABOUTME: SMPP keep-alive for long-running sessions: enquire_link timing and liveness tracking
// ABOUTME: A silent peer past the timeout closes the connection and sends the session into reconnect

use crate::client::error::SmppError;
use crate::connection::Connection;
use crate::pdu::Pdu;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Configuration for SMPP keep-alive functionality
///
/// Controls the periodic enquire_link PDUs sent while a session is bound.
/// Every enquire_link_resp from the SMSC refreshes the session's liveness;
/// if none arrives for `timeout`, the connection is treated as dead.
///
/// # Example
///
/// ```rust
/// use smpp_client::client::KeepAliveConfig;
/// use std::time::Duration;
///
/// // Default configuration (10s interval, 30s timeout)
/// let config = KeepAliveConfig::default();
/// assert_eq!(config.response_timeout(), Duration::from_secs(30));
///
/// // Custom configuration
/// let config = KeepAliveConfig::new(Duration::from_secs(60))
///     .with_timeout(Duration::from_secs(90));
///
/// // Disabled keep-alive
/// let config = KeepAliveConfig::disabled();
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeepAliveConfig {
    /// Interval between enquire_link PDUs (default: 10 seconds)
    pub interval: Duration,

    /// How long the session may go without an enquire_link_resp.
    /// `None` means three intervals.
    pub timeout: Option<Duration>,

    /// Whether keep-alive is enabled (default: true)
    ///
    /// When false, no enquire_link PDUs are sent and the session is only
    /// declared lost on transport errors.
    pub enabled: bool,
}

impl Default for KeepAliveConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            timeout: None,
            enabled: true,
        }
    }
}

impl KeepAliveConfig {
    /// Create a new keep-alive configuration with custom interval
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            ..Default::default()
        }
    }

    /// Set the timeout for enquire_link responses
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Create a disabled keep-alive configuration
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// The effective response timeout
    pub fn response_timeout(&self) -> Duration {
        self.timeout.unwrap_or(self.interval * 3)
    }
}

/// Status information about keep-alive state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeepAliveStatus {
    /// Total enquire_link PDUs sent on the current connection
    pub total_pings: u32,

    /// Total enquire_link_resp PDUs received on the current connection
    pub total_pongs: u32,

    /// Time since the last enquire_link_resp, or since the bind completed
    pub since_last_response: Duration,
}

/// Liveness bookkeeping shared by the heartbeat task and the read loop.
#[derive(Debug)]
pub(crate) struct KeepAliveMonitor {
    last_response: Instant,
    total_pings: u32,
    total_pongs: u32,
}

impl KeepAliveMonitor {
    pub(crate) fn new() -> Self {
        Self {
            last_response: Instant::now(),
            total_pings: 0,
            total_pongs: 0,
        }
    }

    /// Start over for a freshly bound connection.
    pub(crate) fn reset(&mut self) {
        *self = Self::new();
    }

    pub(crate) fn on_ping_sent(&mut self) {
        self.total_pings = self.total_pings.wrapping_add(1);
    }

    pub(crate) fn on_pong(&mut self) {
        self.last_response = Instant::now();
        self.total_pongs = self.total_pongs.wrapping_add(1);
    }

    pub(crate) fn since_last_response(&self) -> Duration {
        self.last_response.elapsed()
    }

    pub(crate) fn status(&self) -> KeepAliveStatus {
        KeepAliveStatus {
            total_pings: self.total_pings,
            total_pongs: self.total_pongs,
            since_last_response: self.since_last_response(),
        }
    }
}

/// Sends enquire_link every `interval` until the connection fails or the
/// peer stays silent past the timeout. Returns why it stopped; on timeout
/// the connection has already been closed.
pub(crate) async fn run_heartbeat(
    conn: Arc<Connection>,
    config: KeepAliveConfig,
    monitor: Arc<Mutex<KeepAliveMonitor>>,
) -> SmppError {
    let timeout = config.response_timeout();
    let mut ticker = tokio::time::interval(config.interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // the first tick completes immediately
    ticker.tick().await;

    loop {
        ticker.tick().await;

        let silent_for = monitor
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .since_last_response();
        if silent_for >= timeout {
            warn!(?silent_for, ?timeout, "no enquire_link_resp, dropping connection");
            conn.close().await;
            return SmppError::HeartbeatTimeout(timeout);
        }

        let ping = Pdu::new_enquire_link();
        if let Err(e) = conn.write_pdu(&ping).await {
            return e;
        }
        debug!(sequence_number = ping.sequence_number(), "enquire_link sent");
        monitor
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .on_ping_sent();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatypes::CommandId;
    use tokio::io::duplex;

    #[test]
    fn test_keep_alive_config_default() {
        let config = KeepAliveConfig::default();
        assert_eq!(config.interval, Duration::from_secs(10));
        assert_eq!(config.response_timeout(), Duration::from_secs(30));
        assert!(config.enabled);
    }

    #[test]
    fn test_keep_alive_config_custom() {
        let config = KeepAliveConfig::new(Duration::from_secs(60)).with_timeout(Duration::from_secs(5));
        assert_eq!(config.interval, Duration::from_secs(60));
        assert_eq!(config.response_timeout(), Duration::from_secs(5));
        assert!(!KeepAliveConfig::disabled().enabled);
    }

    #[test]
    fn test_keep_alive_monitor_counts() {
        let mut monitor = KeepAliveMonitor::new();
        monitor.on_ping_sent();
        monitor.on_ping_sent();
        monitor.on_pong();
        let status = monitor.status();
        assert_eq!(status.total_pings, 2);
        assert_eq!(status.total_pongs, 1);

        monitor.reset();
        assert_eq!(monitor.status().total_pings, 0);
    }

    #[tokio::test]
    async fn test_keep_alive_pings_then_times_out() {
        let (near, far) = duplex(4096);
        let near = Arc::new(Connection::new(near));
        let far = Connection::new(far);
        let monitor = Arc::new(Mutex::new(KeepAliveMonitor::new()));

        let config = KeepAliveConfig::new(Duration::from_millis(20))
            .with_timeout(Duration::from_millis(70));
        let heartbeat = tokio::spawn(run_heartbeat(Arc::clone(&near), config, Arc::clone(&monitor)));

        let ping = far.read_pdu().await.unwrap();
        assert_eq!(ping.command_id(), CommandId::EnquireLink);

        // nobody answers, so the heartbeat gives up and closes the connection
        let reason = heartbeat.await.unwrap();
        assert!(matches!(reason, SmppError::HeartbeatTimeout(t) if t == Duration::from_millis(70)));
        assert!(near.is_closed());
        assert!(monitor.lock().unwrap().status().total_pings >= 1);
    }
}
