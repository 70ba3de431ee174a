// ABOUTME: Transmitter role client: binds with bind_transmitter and sends outbound PDUs
// ABOUTME: submit() waits for the correlated response, send() is fire-and-forget

use crate::client::SessionConfig;
use crate::client::error::SmppResult;
use crate::client::keepalive::KeepAliveStatus;
use crate::client::session::{Role, Session, StatusStream};
use crate::client::types::BindType;
use crate::datatypes::FieldName;
use crate::pdu::Pdu;

/// An ESME bound as transmitter.
///
/// Created by [`crate::client::ClientBuilder::transmitter`]. Sending before
/// the session reports `Connected` fails with
/// [`crate::client::SmppError::NotConnected`].
pub struct Transmitter {
    session: Session,
}

impl Transmitter {
    pub(crate) fn new(config: SessionConfig) -> Self {
        let role = Role {
            bind_type: BindType::Transmitter,
            ack_deliveries: false,
            handler: None,
        };
        Transmitter {
            session: Session::new(config, role),
        }
    }

    /// Start binding in the background and return the status stream.
    /// Calling it again returns another view of the same session.
    pub fn bind(&self) -> StatusStream {
        self.session.bind()
    }

    /// Unbind and release the connection. The session does not reconnect.
    pub async fn close(&self) -> SmppResult<()> {
        self.session.close().await
    }

    /// Sends a request and waits for its response, e.g. submit_sm and
    /// submit_sm_resp. A response with an error status is returned as
    /// [`crate::client::SmppError::Protocol`].
    pub async fn submit(&self, pdu: &Pdu) -> SmppResult<Pdu> {
        self.session.request(pdu).await
    }

    /// Like [`Transmitter::submit`], returning the SMSC's message_id.
    pub async fn submit_message_id(&self, pdu: &Pdu) -> SmppResult<String> {
        let response = self.submit(pdu).await?;
        Ok(response
            .get_str(FieldName::MessageId)
            .unwrap_or_default()
            .to_owned())
    }

    /// Writes a PDU without waiting for a response.
    pub async fn send(&self, pdu: &Pdu) -> SmppResult<()> {
        self.session.send(pdu).await
    }

    pub fn keep_alive_status(&self) -> KeepAliveStatus {
        self.session.keep_alive_status()
    }
}
