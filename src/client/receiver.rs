// ABOUTME: Receiver role client: binds with bind_receiver and dispatches inbound PDUs
// ABOUTME: Every deliver_sm is acknowledged before the handler sees it

use crate::client::SessionConfig;
use crate::client::error::SmppResult;
use crate::client::keepalive::KeepAliveStatus;
use crate::client::session::{Role, Session, StatusStream};
use crate::client::types::{BindType, Handler};
use std::sync::Arc;

/// An ESME bound as receiver.
///
/// Inbound deliver_sm PDUs are answered with deliver_sm_resp and then
/// passed to the handler, one at a time in arrival order. enquire_link
/// traffic is handled by the session and never reaches the handler.
pub struct Receiver {
    session: Session,
}

impl Receiver {
    pub(crate) fn new(config: SessionConfig, handler: impl Handler) -> Self {
        let role = Role {
            bind_type: BindType::Receiver,
            ack_deliveries: true,
            handler: Some(Arc::new(handler)),
        };
        Receiver {
            session: Session::new(config, role),
        }
    }

    /// Start binding in the background and return the status stream.
    pub fn bind(&self) -> StatusStream {
        self.session.bind()
    }

    /// Unbind and release the connection. The session does not reconnect.
    pub async fn close(&self) -> SmppResult<()> {
        self.session.close().await
    }

    pub fn keep_alive_status(&self) -> KeepAliveStatus {
        self.session.keep_alive_status()
    }
}
