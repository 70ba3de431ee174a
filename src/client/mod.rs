// ABOUTME: SMPP client module: role clients over a self-healing bind session
// ABOUTME: Exports the builder, role clients, configuration, status stream and error types

//! SMPP Client Module
//!
//! An ESME side of SMPP v3.4 built around a long-lived session:
//!
//! * **Role clients** - [`Transmitter`], [`Receiver`] and [`Transceiver`]
//!   bind with the matching bind PDU
//! * **Self-healing** - a failed bind or a lost connection is retried every
//!   `bind_interval` until `close()` is called
//! * **Status stream** - lifecycle changes are published to a single-slot
//!   [`StatusStream`] that never blocks the session
//! * **Keep-alive** - enquire_link heartbeat with a liveness timeout
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use smpp_client::client::{BindCredentials, ClientBuilder, SessionState};
//! use smpp_client::datatypes::{DataCoding, FieldName, Text};
//! use smpp_client::pdu::Pdu;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let tx = ClientBuilder::new("localhost:2775", BindCredentials::new("system_id", "password"))
//!     .transmitter();
//!
//! let mut status = tx.bind();
//! status.wait_for(SessionState::Connected).await;
//!
//! let mut sm = Pdu::new_submit_sm();
//! sm.set(FieldName::SourceAddr, "1234")?
//!     .set(FieldName::DestinationAddr, "5678")?
//!     .set(FieldName::ShortMessage, Text::encode(DataCoding::Latin1, "Olá")?)?;
//! let message_id = tx.submit_message_id(&sm).await?;
//! println!("submitted: {message_id}");
//!
//! tx.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod error;
pub mod keepalive;
pub mod receiver;
mod session;
pub mod transceiver;
pub mod transmitter;
pub mod types;

pub use builder::{ClientBuilder, SessionConfig};
pub use error::{SmppError, SmppResult};
pub use keepalive::{KeepAliveConfig, KeepAliveStatus};
pub use receiver::Receiver;
pub use session::{ConnStatus, SessionState, StatusStream};
pub use transceiver::Transceiver;
pub use transmitter::Transmitter;
pub use types::{BindCredentials, BindType, Handler};
