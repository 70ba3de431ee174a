// ABOUTME: Session configuration and the builder that turns it into a role client
// ABOUTME: Collects address, credentials, keep-alive, retry timing and TLS before the first bind

use crate::client::keepalive::KeepAliveConfig;
use crate::client::receiver::Receiver;
use crate::client::transceiver::Transceiver;
use crate::client::transmitter::Transmitter;
use crate::client::types::{BindCredentials, Handler};
use crate::connection::TlsConfig;
use std::time::Duration;

/// Everything a session needs to dial, bind and stay bound.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// SMSC address as `host:port`
    pub addr: String,
    pub credentials: BindCredentials,
    pub keep_alive: KeepAliveConfig,
    /// Delay between a failed attempt and the next one (default: 5 seconds)
    pub bind_interval: Duration,
    /// How long to wait for a bind or request response (default: 10 seconds)
    pub response_timeout: Duration,
    /// Wrap the TCP stream in TLS when set
    pub tls: Option<TlsConfig>,
}

impl SessionConfig {
    pub fn new(addr: impl Into<String>, credentials: BindCredentials) -> Self {
        SessionConfig {
            addr: addr.into(),
            credentials,
            keep_alive: KeepAliveConfig::default(),
            bind_interval: Duration::from_secs(5),
            response_timeout: Duration::from_secs(10),
            tls: None,
        }
    }
}

/// Builder for the three role clients.
///
/// Nothing touches the network until `bind()` is called on the client.
///
/// ```rust,no_run
/// use smpp_client::client::{BindCredentials, ClientBuilder, KeepAliveConfig};
/// use std::time::Duration;
///
/// # async fn example() {
/// let receiver = ClientBuilder::new("localhost:2775", BindCredentials::new("system_id", "password"))
///     .keep_alive(KeepAliveConfig::new(Duration::from_secs(30)))
///     .bind_interval(Duration::from_secs(10))
///     .receiver(|pdu: smpp_client::pdu::Pdu| println!("{}", pdu.command_id()));
///
/// let mut status = receiver.bind();
/// while let Some(status) = status.next().await {
///     println!("{:?}", status.state());
/// }
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    config: SessionConfig,
}

impl ClientBuilder {
    pub fn new(addr: impl Into<String>, credentials: BindCredentials) -> Self {
        ClientBuilder {
            config: SessionConfig::new(addr, credentials),
        }
    }

    /// Start from a complete configuration
    pub fn from_config(config: SessionConfig) -> Self {
        ClientBuilder { config }
    }

    pub fn keep_alive(mut self, keep_alive: KeepAliveConfig) -> Self {
        self.config.keep_alive = keep_alive;
        self
    }

    pub fn bind_interval(mut self, interval: Duration) -> Self {
        self.config.bind_interval = interval;
        self
    }

    pub fn response_timeout(mut self, timeout: Duration) -> Self {
        self.config.response_timeout = timeout;
        self
    }

    pub fn tls(mut self, tls: TlsConfig) -> Self {
        self.config.tls = Some(tls);
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// A client that binds as transmitter
    pub fn transmitter(self) -> Transmitter {
        Transmitter::new(self.config)
    }

    /// A client that binds as receiver and passes inbound PDUs to `handler`
    pub fn receiver(self, handler: impl Handler) -> Receiver {
        Receiver::new(self.config, handler)
    }

    /// A client that binds as transceiver and passes inbound PDUs to `handler`
    pub fn transceiver(self, handler: impl Handler) -> Transceiver {
        Transceiver::new(self.config, handler)
    }
}
