// ABOUTME: Supporting types for SMPP sessions: bind credentials, bind roles and inbound handlers
// ABOUTME: Credentials become the mandatory fields of the role's bind PDU on every attempt

use crate::codec::CodecError;
use crate::datatypes::{CommandId, FieldName, InterfaceVersion, NumericPlanIndicator, TypeOfNumber};
use crate::pdu::Pdu;

/// SMPP bind operation credentials
///
/// Contains the authentication and addressing values written into the
/// bind PDU. The role client decides which bind PDU that is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindCredentials {
    /// System identifier for authentication
    pub system_id: String,
    /// Password for authentication
    pub password: String,
    /// System type (defaults to empty string)
    pub system_type: String,
    /// SMPP interface version to announce
    pub interface_version: InterfaceVersion,
    pub addr_ton: TypeOfNumber,
    pub addr_npi: NumericPlanIndicator,
    /// Addresses served by this ESME, as a regular expression (receivers)
    pub address_range: String,
}

impl BindCredentials {
    /// Create new bind credentials (defaults to SMPP v3.4)
    pub fn new(system_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            system_id: system_id.into(),
            password: password.into(),
            system_type: String::new(),
            interface_version: InterfaceVersion::SmppV34,
            addr_ton: TypeOfNumber::default(),
            addr_npi: NumericPlanIndicator::default(),
            address_range: String::new(),
        }
    }

    /// Set system type
    pub fn with_system_type(mut self, system_type: impl Into<String>) -> Self {
        self.system_type = system_type.into();
        self
    }

    /// Set SMPP interface version
    pub fn with_version(mut self, interface_version: InterfaceVersion) -> Self {
        self.interface_version = interface_version;
        self
    }

    /// Set the address range and its numbering
    pub fn with_address_range(
        mut self,
        ton: TypeOfNumber,
        npi: NumericPlanIndicator,
        range: impl Into<String>,
    ) -> Self {
        self.addr_ton = ton;
        self.addr_npi = npi;
        self.address_range = range.into();
        self
    }

    /// Builds the bind PDU for `bind_type` with the next sequence number.
    pub fn bind_pdu(&self, bind_type: BindType) -> Result<Pdu, CodecError> {
        let mut pdu = Pdu::new(bind_type.command_id());
        pdu.set(FieldName::SystemId, self.system_id.as_str())?
            .set(FieldName::Password, self.password.as_str())?
            .set(FieldName::SystemType, self.system_type.as_str())?
            .set(FieldName::InterfaceVersion, self.interface_version)?
            .set(FieldName::AddrTon, self.addr_ton)?
            .set(FieldName::AddrNpi, self.addr_npi)?
            .set(FieldName::AddressRange, self.address_range.as_str())?;
        Ok(pdu)
    }
}

/// Type of SMPP bind operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindType {
    /// Bind as transmitter (can send submit_sm)
    Transmitter,
    /// Bind as receiver (can receive deliver_sm)
    Receiver,
    /// Bind as transceiver (both transmitter and receiver capabilities)
    Transceiver,
}

impl BindType {
    pub fn command_id(&self) -> CommandId {
        match self {
            BindType::Transmitter => CommandId::BindTransmitter,
            BindType::Receiver => CommandId::BindReceiver,
            BindType::Transceiver => CommandId::BindTransceiver,
        }
    }

    /// The only response that completes this bind
    pub fn response_id(&self) -> CommandId {
        match self {
            BindType::Transmitter => CommandId::BindTransmitterResp,
            BindType::Receiver => CommandId::BindReceiverResp,
            BindType::Transceiver => CommandId::BindTransceiverResp,
        }
    }
}

/// Receives inbound PDUs for a receiver or transceiver session.
///
/// Called once per PDU, in the order the PDUs were read, on the session's
/// read task. A slow handler delays reading the next PDU; deliveries are
/// acknowledged before the handler runs either way.
///
/// Any `Fn(Pdu) + Send + Sync` closure is a handler.
pub trait Handler: Send + Sync + 'static {
    fn handle(&self, pdu: Pdu);
}

impl<F> Handler for F
where
    F: Fn(Pdu) + Send + Sync + 'static,
{
    fn handle(&self, pdu: Pdu) {
        self(pdu)
    }
}
