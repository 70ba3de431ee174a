//! An SMPP v3.4 ESME client.
//!
//! The crate is layered bottom-up:
//!
//! * [`text`] converts between UTF-8 and the character sets selected by
//!   `data_coding` (GSM 7-bit, Latin-1, ISO-8859-5, UCS-2, raw octets, silent).
//! * [`datatypes`] holds the wire enums, the field model and TLVs.
//! * [`pdu`] is the generic PDU, driven by a static field table per
//!   command_id, with [`codec`] providing the header and error types.
//! * [`connection`] moves whole PDUs over TCP or TLS.
//! * [`client`] runs the bind/retry session and exposes the transmitter,
//!   receiver and transceiver roles.
//!
//! # Examples
//!
//! Receiving deliveries until the process is stopped:
//!
//! ```rust,no_run
//! use smpp_client::client::{BindCredentials, ClientBuilder};
//! use smpp_client::pdu::Pdu;
//!
//! #[tokio::main]
//! async fn main() {
//!     let rx = ClientBuilder::new("localhost:2775", BindCredentials::new("system_id", "password"))
//!         .receiver(|pdu: Pdu| {
//!             if let Some(Ok(text)) = pdu.short_message().map(|sm| sm.to_string_lossy()) {
//!                 println!("{}: {text}", pdu.command_id());
//!             }
//!         });
//!
//!     let mut status = rx.bind();
//!     while let Some(status) = status.next().await {
//!         match status.error() {
//!             Some(e) => eprintln!("{:?}: {e}", status.state()),
//!             None => println!("{:?}", status.state()),
//!         }
//!     }
//! }
//! ```
//!
//! Building and serializing a PDU by hand:
//!
//! ```rust
//! use smpp_client::datatypes::{FieldName, InterfaceVersion};
//! use smpp_client::pdu::Pdu;
//!
//! let mut bind = Pdu::new_bind_transmitter();
//! bind.set(FieldName::SystemId, "smppclient1").unwrap()
//!     .set(FieldName::Password, "password").unwrap()
//!     .set(FieldName::InterfaceVersion, InterfaceVersion::SmppV34).unwrap();
//!
//! let bytes = bind.serialize().unwrap();
//! assert_eq!(bytes.len(), 42);
//!
//! let decoded = Pdu::decode(&bytes).unwrap();
//! assert_eq!(decoded.get_str(FieldName::SystemId), Some("smppclient1"));
//! assert_eq!(decoded.sequence_number(), bind.sequence_number());
//! ```

pub mod client;
pub mod codec;
pub mod connection;
pub mod datatypes;
mod macros;
pub mod pdu;
pub mod text;

#[cfg(test)]
mod tests;

pub use client::{
    BindCredentials, ClientBuilder, ConnStatus, Receiver, SessionState, SmppError, SmppResult,
    StatusStream, Transceiver, Transmitter,
};
pub use codec::{CodecError, PduHeader};
pub use pdu::Pdu;
