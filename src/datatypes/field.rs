// ABOUTME: Typed mandatory PDU fields and the per-kind rules for writing and reading them
// ABOUTME: Field kinds are referenced by the per-command field tables in the pdu module

use crate::codec::CodecError;
use crate::datatypes::{DataCoding, InterfaceVersion, NumericPlanIndicator, TypeOfNumber};
use crate::text::{self, TextError};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::collections::HashMap;
use std::fmt;
use std::io::Cursor;

/// Largest short_message the one-octet sm_length can describe. SMPP v3.4
/// reserves 255, so 254 octets is the practical ceiling.
pub const MAX_SHORT_MESSAGE: usize = 254;

/// Mandatory field values of a PDU, keyed by name.
pub type FieldMap = HashMap<FieldName, Field>;

macro_rules! field_names {
    ($($variant:ident => $wire:literal,)*) => {
        /// Names of the mandatory PDU fields, as used in the SMPP v3.4 document.
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum FieldName {
            $($variant,)*
        }

        impl FieldName {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(FieldName::$variant => $wire,)*
                }
            }
        }
    };
}

field_names! {
    SystemId => "system_id",
    Password => "password",
    SystemType => "system_type",
    InterfaceVersion => "interface_version",
    AddrTon => "addr_ton",
    AddrNpi => "addr_npi",
    AddressRange => "address_range",
    ServiceType => "service_type",
    SourceAddrTon => "source_addr_ton",
    SourceAddrNpi => "source_addr_npi",
    SourceAddr => "source_addr",
    DestAddrTon => "dest_addr_ton",
    DestAddrNpi => "dest_addr_npi",
    DestinationAddr => "destination_addr",
    EsmClass => "esm_class",
    ProtocolId => "protocol_id",
    PriorityFlag => "priority_flag",
    ScheduleDeliveryTime => "schedule_delivery_time",
    ValidityPeriod => "validity_period",
    RegisteredDelivery => "registered_delivery",
    ReplaceIfPresentFlag => "replace_if_present_flag",
    DataCoding => "data_coding",
    SmDefaultMsgId => "sm_default_msg_id",
    SmLength => "sm_length",
    ShortMessage => "short_message",
    MessageId => "message_id",
    FinalDate => "final_date",
    MessageState => "message_state",
    ErrorCode => "error_code",
    EsmeAddrTon => "esme_addr_ton",
    EsmeAddrNpi => "esme_addr_npi",
    EsmeAddr => "esme_addr",
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message text together with the data_coding its octets are written in.
///
/// The octets are kept in wire form; [`Text::decode`] converts them to
/// UTF-8 on demand.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Text {
    coding: DataCoding,
    data: Bytes,
}

impl Text {
    /// Encodes UTF-8 `text` into the wire form of `coding`.
    ///
    /// # Example
    ///
    /// ```
    /// use smpp_client::datatypes::{DataCoding, Text};
    ///
    /// let text = Text::encode(DataCoding::Latin1, "moço").unwrap();
    /// assert_eq!(text.as_bytes(), b"mo\xe7o");
    /// ```
    pub fn encode(coding: DataCoding, text: &str) -> Result<Self, TextError> {
        Ok(Text {
            coding,
            data: text::encode(coding, text.as_bytes())?,
        })
    }

    /// Wraps octets that are already in the wire form of `coding`.
    pub fn from_wire(coding: DataCoding, data: impl Into<Bytes>) -> Self {
        Text {
            coding,
            data: data.into(),
        }
    }

    pub fn coding(&self) -> DataCoding {
        self.coding
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Converts the wire octets back to UTF-8.
    pub fn decode(&self) -> Result<Bytes, TextError> {
        text::decode(self.coding, &self.data)
    }

    /// Decodes to a `String`, replacing anything that is not valid UTF-8.
    pub fn to_string_lossy(&self) -> Result<String, TextError> {
        Ok(String::from_utf8_lossy(&self.decode()?).into_owned())
    }
}

/// A mandatory field value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Field {
    /// Fixed-width octets
    Octets(Bytes),
    /// C-Octet String content, without the terminating NUL
    CString(Bytes),
    U8(u8),
    U16(u16),
    U32(u32),
    Text(Text),
}

impl Field {
    pub fn as_u8(&self) -> Option<u8> {
        match self {
            Field::U8(v) => Some(*v),
            Field::Octets(b) if b.len() == 1 => Some(b[0]),
            _ => None,
        }
    }

    pub fn as_u16(&self) -> Option<u16> {
        match self {
            Field::U16(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Field::U32(v) => Some(*v),
            _ => None,
        }
    }

    /// The content of a C-Octet String field, if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Field::CString(b) => std::str::from_utf8(b).ok(),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Field::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Field::Octets(b) | Field::CString(b) => Some(b),
            Field::Text(t) => Some(t.as_bytes()),
            _ => None,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Field::Octets(_) => "octets",
            Field::CString(_) => "C-Octet String",
            Field::U8(_) => "u8",
            Field::U16(_) => "u16",
            Field::U32(_) => "u32",
            Field::Text(_) => "text",
        }
    }
}

impl From<&str> for Field {
    fn from(value: &str) -> Self {
        Field::CString(Bytes::copy_from_slice(value.as_bytes()))
    }
}

impl From<String> for Field {
    fn from(value: String) -> Self {
        Field::CString(Bytes::from(value))
    }
}

impl From<Bytes> for Field {
    fn from(value: Bytes) -> Self {
        Field::Octets(value)
    }
}

impl From<u8> for Field {
    fn from(value: u8) -> Self {
        Field::U8(value)
    }
}

impl From<u16> for Field {
    fn from(value: u16) -> Self {
        Field::U16(value)
    }
}

impl From<u32> for Field {
    fn from(value: u32) -> Self {
        Field::U32(value)
    }
}

impl From<Text> for Field {
    fn from(value: Text) -> Self {
        Field::Text(value)
    }
}

impl From<DataCoding> for Field {
    fn from(value: DataCoding) -> Self {
        Field::U8(value.to_byte())
    }
}

impl From<InterfaceVersion> for Field {
    fn from(value: InterfaceVersion) -> Self {
        Field::U8(value.into())
    }
}

impl From<TypeOfNumber> for Field {
    fn from(value: TypeOfNumber) -> Self {
        Field::U8(value.into())
    }
}

impl From<NumericPlanIndicator> for Field {
    fn from(value: NumericPlanIndicator) -> Self {
        Field::U8(value.into())
    }
}

/// How a mandatory field is laid out on the wire.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// Exactly this many octets, zero padded or truncated
    Octets(usize),
    /// NUL-terminated; `max` counts the terminator
    CString { max: usize },
    U8,
    U16,
    U32,
    /// Length taken from sm_length, coding taken from data_coding
    ShortMessage,
}

impl FieldKind {
    /// Checks `value` against this kind and brings it into canonical form.
    pub fn accept(&self, name: FieldName, value: Field) -> Result<Field, CodecError> {
        match (self, value) {
            (FieldKind::Octets(width), Field::Octets(bytes)) => Ok(Field::Octets(fit(bytes, *width))),
            (FieldKind::Octets(width), Field::U8(v)) => {
                Ok(Field::Octets(fit(Bytes::copy_from_slice(&[v]), *width)))
            }
            (FieldKind::CString { max }, Field::CString(bytes)) => {
                if bytes.contains(&0) {
                    return Err(CodecError::FieldValidation {
                        field: name.as_str(),
                        reason: "contains a NUL octet".to_string(),
                    });
                }
                if bytes.len() >= *max {
                    return Err(CodecError::FieldValidation {
                        field: name.as_str(),
                        reason: format!("{} octets exceeds the limit of {}", bytes.len(), max - 1),
                    });
                }
                Ok(Field::CString(bytes))
            }
            (FieldKind::U8, value @ Field::U8(_))
            | (FieldKind::U16, value @ Field::U16(_))
            | (FieldKind::U32, value @ Field::U32(_)) => Ok(value),
            (FieldKind::ShortMessage, Field::Text(text)) => {
                if text.len() > MAX_SHORT_MESSAGE {
                    return Err(CodecError::FieldValidation {
                        field: name.as_str(),
                        reason: format!(
                            "{} octets exceeds the limit of {MAX_SHORT_MESSAGE}",
                            text.len()
                        ),
                    });
                }
                Ok(Field::Text(text))
            }
            (kind, value) => Err(CodecError::FieldType {
                field: name,
                expected: kind.type_name(),
                actual: value.type_name(),
            }),
        }
    }

    /// Writes `value`, or the kind's zero value when the field is unset.
    pub fn encode(&self, value: Option<&Field>, buf: &mut BytesMut) {
        match (self, value) {
            (FieldKind::Octets(width), Some(Field::Octets(bytes))) => {
                let n = bytes.len().min(*width);
                buf.put_slice(&bytes[..n]);
                buf.put_bytes(0, width - n);
            }
            (FieldKind::Octets(width), _) => buf.put_bytes(0, *width),
            (FieldKind::CString { .. }, Some(Field::CString(bytes))) => {
                buf.put_slice(bytes);
                buf.put_u8(0);
            }
            (FieldKind::CString { .. }, _) => buf.put_u8(0),
            (FieldKind::U8, value) => buf.put_u8(value.and_then(Field::as_u8).unwrap_or(0)),
            (FieldKind::U16, value) => buf.put_u16(value.and_then(Field::as_u16).unwrap_or(0)),
            (FieldKind::U32, value) => buf.put_u32(value.and_then(Field::as_u32).unwrap_or(0)),
            (FieldKind::ShortMessage, Some(Field::Text(text))) => buf.put_slice(text.as_bytes()),
            (FieldKind::ShortMessage, _) => {}
        }
    }

    /// Reads one field starting at the cursor. `decoded` holds the fields
    /// read so far, which supply sm_length and data_coding to short_message.
    pub fn decode(
        &self,
        name: FieldName,
        buf: &mut Cursor<&[u8]>,
        decoded: &FieldMap,
    ) -> Result<Field, CodecError> {
        let truncated = || CodecError::Truncated {
            field: name.as_str(),
        };
        match self {
            FieldKind::Octets(width) => {
                if buf.remaining() < *width {
                    return Err(truncated());
                }
                Ok(Field::Octets(buf.copy_to_bytes(*width)))
            }
            FieldKind::CString { .. } => {
                let end = buf.chunk().iter().position(|&b| b == 0).ok_or_else(truncated)?;
                let value = buf.copy_to_bytes(end);
                buf.advance(1);
                Ok(Field::CString(value))
            }
            FieldKind::U8 => {
                if buf.remaining() < 1 {
                    return Err(truncated());
                }
                Ok(Field::U8(buf.get_u8()))
            }
            FieldKind::U16 => {
                if buf.remaining() < 2 {
                    return Err(truncated());
                }
                Ok(Field::U16(buf.get_u16()))
            }
            FieldKind::U32 => {
                if buf.remaining() < 4 {
                    return Err(truncated());
                }
                Ok(Field::U32(buf.get_u32()))
            }
            FieldKind::ShortMessage => {
                let length = decoded
                    .get(&FieldName::SmLength)
                    .and_then(Field::as_u8)
                    .map_or(0, usize::from);
                let coding = decoded
                    .get(&FieldName::DataCoding)
                    .and_then(Field::as_u8)
                    .map(DataCoding::from_byte)
                    .unwrap_or_default();
                if buf.remaining() < length {
                    return Err(truncated());
                }
                Ok(Field::Text(Text::from_wire(coding, buf.copy_to_bytes(length))))
            }
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Octets(_) => "octets",
            FieldKind::CString { .. } => "C-Octet String",
            FieldKind::U8 => "u8",
            FieldKind::U16 => "u16",
            FieldKind::U32 => "u32",
            FieldKind::ShortMessage => "text",
        }
    }
}

fn fit(bytes: Bytes, width: usize) -> Bytes {
    if bytes.len() == width {
        return bytes;
    }
    let mut out = BytesMut::with_capacity(width);
    let n = bytes.len().min(width);
    out.put_slice(&bytes[..n]);
    out.put_bytes(0, width - n);
    out.freeze()
}
