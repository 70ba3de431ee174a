// ABOUTME: The generic SMPP PDU: header, table-driven mandatory fields and optional TLVs
// ABOUTME: Serializes to and parses from the v3.4 wire format, and allocates sequence numbers

mod table;

pub use table::field_table;

use crate::codec::{CodecError, PduHeader, check_command_length};
use crate::datatypes::{
    CommandId, CommandStatus, DataCoding, Field, FieldKind, FieldMap, FieldName, Text, TlvMap,
};
use crate::macros::{request_constructors, response_constructors};
use bytes::{BufMut, Bytes, BytesMut};
use std::io::Cursor;
use std::sync::atomic::{AtomicU32, Ordering};

/// Largest sequence number handed out before wrapping back to 1.
pub const MAX_SEQUENCE_NUMBER: u32 = 0x7FFF_FFFF;

static SEQUENCE: AtomicU32 = AtomicU32::new(0);

fn step(n: u32) -> u32 {
    if n >= MAX_SEQUENCE_NUMBER { 1 } else { n + 1 }
}

/// Returns the next request sequence number for this process. Never 0.
pub fn next_sequence_number() -> u32 {
    // the closure never declines, so both arms carry the previous value
    let previous = SEQUENCE
        .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| Some(step(n)))
        .unwrap_or_else(|n| n);
    step(previous)
}

/// One SMPP message.
///
/// A PDU is built empty by one of the `new_*` constructors, filled in with
/// [`Pdu::set`] and optional parameters from [`Pdu::tlvs_mut`], then written
/// with [`Pdu::serialize`]. Unset mandatory fields go out as their zero value.
///
/// # Example
///
/// ```
/// use smpp_client::datatypes::{DataCoding, FieldName, Text};
/// use smpp_client::pdu::Pdu;
///
/// let mut pdu = Pdu::new_submit_sm();
/// pdu.set(FieldName::SourceAddr, "123")?
///     .set(FieldName::DestinationAddr, "456")?
///     .set(FieldName::ShortMessage, Text::encode(DataCoding::Latin1, "olá")?)?;
///
/// let wire = pdu.serialize()?;
/// let parsed = Pdu::decode(&wire)?;
/// assert_eq!(parsed.get_str(FieldName::DestinationAddr), Some("456"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pdu {
    header: PduHeader,
    fields: FieldMap,
    tlvs: TlvMap,
}

impl Pdu {
    /// Creates an empty PDU with the next sequence number.
    pub fn new(command_id: CommandId) -> Self {
        Self::with_sequence(command_id, next_sequence_number())
    }

    /// Creates an empty PDU carrying `sequence_number`.
    pub fn with_sequence(command_id: CommandId, sequence_number: u32) -> Self {
        Pdu {
            header: PduHeader {
                command_length: PduHeader::SIZE as u32,
                command_id,
                command_status: CommandStatus::Ok,
                sequence_number,
            },
            fields: FieldMap::new(),
            tlvs: TlvMap::new(),
        }
    }

    request_constructors! {
        new_bind_transmitter => BindTransmitter,
        new_bind_receiver => BindReceiver,
        new_bind_transceiver => BindTransceiver,
        new_outbind => Outbind,
        new_submit_sm => SubmitSm,
        new_deliver_sm => DeliverSm,
        new_data_sm => DataSm,
        new_query_sm => QuerySm,
        new_cancel_sm => CancelSm,
        new_enquire_link => EnquireLink,
        new_unbind => Unbind,
        new_alert_notification => AlertNotification,
    }

    response_constructors! {
        new_bind_transmitter_resp_seq => BindTransmitterResp,
        new_bind_receiver_resp_seq => BindReceiverResp,
        new_bind_transceiver_resp_seq => BindTransceiverResp,
        new_submit_sm_resp_seq => SubmitSmResp,
        new_deliver_sm_resp_seq => DeliverSmResp,
        new_data_sm_resp_seq => DataSmResp,
        new_query_sm_resp_seq => QuerySmResp,
        new_cancel_sm_resp_seq => CancelSmResp,
        new_enquire_link_resp_seq => EnquireLinkResp,
        new_unbind_resp_seq => UnbindResp,
    }

    /// A generic_nack answering `sequence_number` with `status`.
    pub fn new_generic_nack_seq(sequence_number: u32, status: CommandStatus) -> Self {
        let mut pdu = Self::with_sequence(CommandId::GenericNack, sequence_number);
        pdu.header.command_status = status;
        pdu
    }

    /// An empty response to this request, sharing its sequence number.
    /// Returns `None` for responses and for requests that have no response PDU.
    pub fn response(&self) -> Option<Pdu> {
        let command_id = self.command_id().response_id()?;
        Some(Self::with_sequence(command_id, self.sequence_number()))
    }

    pub fn header(&self) -> &PduHeader {
        &self.header
    }

    pub fn command_id(&self) -> CommandId {
        self.header.command_id
    }

    pub fn command_status(&self) -> CommandStatus {
        self.header.command_status
    }

    pub fn set_command_status(&mut self, status: CommandStatus) {
        self.header.command_status = status;
    }

    pub fn sequence_number(&self) -> u32 {
        self.header.sequence_number
    }

    pub fn set_sequence_number(&mut self, sequence_number: u32) {
        self.header.sequence_number = sequence_number;
    }

    /// The mandatory fields of this PDU, in wire order.
    pub fn field_table(&self) -> &'static [(FieldName, FieldKind)] {
        field_table(self.command_id())
    }

    fn kind_of(&self, name: FieldName) -> Option<FieldKind> {
        self.field_table()
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, kind)| *kind)
    }

    /// Sets a mandatory field, validating it against the field table.
    ///
    /// Setting short_message from a [`Text`] also sets data_coding to the
    /// text's coding. Raw octets given for short_message are taken to be in
    /// the current data_coding already.
    pub fn set(&mut self, name: FieldName, value: impl Into<Field>) -> Result<&mut Self, CodecError> {
        let kind = self.kind_of(name).ok_or(CodecError::UnknownField {
            command_id: self.command_id(),
            field: name,
        })?;

        let value: Field = value.into();
        let value = match (kind, value) {
            (FieldKind::ShortMessage, Field::Octets(data) | Field::CString(data)) => {
                Field::Text(Text::from_wire(self.data_coding(), data))
            }
            (_, value) => value,
        };
        let value = kind.accept(name, value)?;

        if let Field::Text(text) = &value {
            if self.kind_of(FieldName::DataCoding).is_some() {
                self.fields
                    .insert(FieldName::DataCoding, Field::U8(text.coding().to_byte()));
            }
        }
        self.fields.insert(name, value);
        Ok(self)
    }

    pub fn get(&self, name: FieldName) -> Option<&Field> {
        self.fields.get(&name)
    }

    /// A C-Octet String field as text, if set and valid UTF-8.
    pub fn get_str(&self, name: FieldName) -> Option<&str> {
        self.get(name).and_then(Field::as_str)
    }

    pub fn get_u8(&self, name: FieldName) -> Option<u8> {
        self.get(name).and_then(Field::as_u8)
    }

    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    pub fn short_message(&self) -> Option<&Text> {
        self.get(FieldName::ShortMessage).and_then(Field::as_text)
    }

    /// The data_coding field, or the SMSC default when unset.
    pub fn data_coding(&self) -> DataCoding {
        self.get_u8(FieldName::DataCoding)
            .map(DataCoding::from_byte)
            .unwrap_or_default()
    }

    pub fn tlvs(&self) -> &TlvMap {
        &self.tlvs
    }

    pub fn tlvs_mut(&mut self) -> &mut TlvMap {
        &mut self.tlvs
    }

    /// Writes the PDU in wire format. command_length is computed from the
    /// written size and sm_length from the short_message octets.
    ///
    /// Fails with [`CodecError::InvalidPduLength`] when the encoded PDU is
    /// larger than a peer would accept.
    pub fn serialize(&self) -> Result<Bytes, CodecError> {
        let mut buf = BytesMut::with_capacity(64);
        self.header.encode(&mut buf);

        for (name, kind) in self.field_table() {
            if *name == FieldName::SmLength {
                let length = self.short_message().map_or(0, Text::len);
                // bounded by MAX_SHORT_MESSAGE when set
                buf.put_u8(length as u8);
                continue;
            }
            kind.encode(self.fields.get(name), &mut buf);
        }
        self.tlvs.encode(&mut buf);

        let length = u32::try_from(buf.len()).unwrap_or(u32::MAX);
        check_command_length(length)?;
        buf[0..4].copy_from_slice(&length.to_be_bytes());
        Ok(buf.freeze())
    }

    /// Parses one PDU from the front of `data`.
    pub fn decode(data: &[u8]) -> Result<Self, CodecError> {
        let header = PduHeader::decode(&mut Cursor::new(data))?;
        let length = header.command_length as usize;
        if data.len() < length {
            return Err(CodecError::Truncated { field: "body" });
        }
        Self::decode_body(header, &data[PduHeader::SIZE..length])
    }

    /// Parses the body that follows an already decoded header. `body` must
    /// hold exactly `command_length - 16` octets.
    pub fn decode_body(header: PduHeader, body: &[u8]) -> Result<Self, CodecError> {
        let mut buf = Cursor::new(body);
        let mut fields = FieldMap::new();

        // Error responses may omit the body entirely.
        let bodiless_error =
            body.is_empty() && header.command_id.is_response() && !header.command_status.is_ok();

        if !bodiless_error {
            for (name, kind) in field_table(header.command_id) {
                let field = kind.decode(*name, &mut buf, &fields)?;
                fields.insert(*name, field);
            }
        }
        let tlvs = TlvMap::decode(&mut buf)?;

        Ok(Pdu {
            header,
            fields,
            tlvs,
        })
    }
}
