// ABOUTME: Transceiver role client: one bind_transceiver session that both sends and receives
// ABOUTME: Combines the transmitter's request API with the receiver's acknowledged dispatch

use crate::client::SessionConfig;
use crate::client::error::SmppResult;
use crate::client::keepalive::KeepAliveStatus;
use crate::client::session::{Role, Session, StatusStream};
use crate::client::types::{BindType, Handler};
use crate::pdu::Pdu;
use std::sync::Arc;

/// An ESME bound as transceiver.
///
/// Responses to [`Transceiver::submit`] are matched by sequence number and
/// returned to the caller; every other inbound PDU goes to the handler,
/// deliver_sm after it has been acknowledged.
pub struct Transceiver {
    session: Session,
}

impl Transceiver {
    pub(crate) fn new(config: SessionConfig, handler: impl Handler) -> Self {
        let role = Role {
            bind_type: BindType::Transceiver,
            ack_deliveries: true,
            handler: Some(Arc::new(handler)),
        };
        Transceiver {
            session: Session::new(config, role),
        }
    }

    pub fn bind(&self) -> StatusStream {
        self.session.bind()
    }

    pub async fn close(&self) -> SmppResult<()> {
        self.session.close().await
    }

    /// Sends a request and waits for the response with its sequence number.
    pub async fn submit(&self, pdu: &Pdu) -> SmppResult<Pdu> {
        self.session.request(pdu).await
    }

    pub async fn send(&self, pdu: &Pdu) -> SmppResult<()> {
        self.session.send(pdu).await
    }

    pub fn keep_alive_status(&self) -> KeepAliveStatus {
        self.session.keep_alive_status()
    }
}
