// ABOUTME: Optional (TLV) parameters that follow the mandatory body of an SMPP PDU
// ABOUTME: Provides the tag registry and an insertion-ordered container with typed accessors

use crate::codec::CodecError;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::fmt;
use std::io::Cursor;

/// Identifies an optional parameter. Unregistered tags are carried as-is.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TlvTag(pub u16);

macro_rules! tlv_tags {
    ($($name:ident = $value:literal, $wire:literal;)*) => {
        impl TlvTag {
            $(pub const $name: TlvTag = TlvTag($value);)*

            /// The parameter name from the SMPP v3.4 registry, if the tag is known
            pub fn name(&self) -> Option<&'static str> {
                match self.0 {
                    $($value => Some($wire),)*
                    _ => None,
                }
            }
        }
    };
}

tlv_tags! {
    DEST_ADDR_SUBUNIT = 0x0005, "dest_addr_subunit";
    DEST_NETWORK_TYPE = 0x0006, "dest_network_type";
    DEST_BEARER_TYPE = 0x0007, "dest_bearer_type";
    DEST_TELEMATICS_ID = 0x0008, "dest_telematics_id";
    SOURCE_ADDR_SUBUNIT = 0x000D, "source_addr_subunit";
    SOURCE_NETWORK_TYPE = 0x000E, "source_network_type";
    SOURCE_BEARER_TYPE = 0x000F, "source_bearer_type";
    SOURCE_TELEMATICS_ID = 0x0010, "source_telematics_id";
    QOS_TIME_TO_LIVE = 0x0017, "qos_time_to_live";
    PAYLOAD_TYPE = 0x0019, "payload_type";
    ADDITIONAL_STATUS_INFO_TEXT = 0x001D, "additional_status_info_text";
    RECEIPTED_MESSAGE_ID = 0x001E, "receipted_message_id";
    MS_MSG_WAIT_FACILITIES = 0x0030, "ms_msg_wait_facilities";
    PRIVACY_INDICATOR = 0x0201, "privacy_indicator";
    SOURCE_SUBADDRESS = 0x0202, "source_subaddress";
    DEST_SUBADDRESS = 0x0203, "dest_subaddress";
    USER_MESSAGE_REFERENCE = 0x0204, "user_message_reference";
    USER_RESPONSE_CODE = 0x0205, "user_response_code";
    SOURCE_PORT = 0x020A, "source_port";
    DESTINATION_PORT = 0x020B, "destination_port";
    SAR_MSG_REF_NUM = 0x020C, "sar_msg_ref_num";
    LANGUAGE_INDICATOR = 0x020D, "language_indicator";
    SAR_TOTAL_SEGMENTS = 0x020E, "sar_total_segments";
    SAR_SEGMENT_SEQNUM = 0x020F, "sar_segment_seqnum";
    SC_INTERFACE_VERSION = 0x0210, "sc_interface_version";
    CALLBACK_NUM_PRES_IND = 0x0302, "callback_num_pres_ind";
    CALLBACK_NUM_ATAG = 0x0303, "callback_num_atag";
    NUMBER_OF_MESSAGES = 0x0304, "number_of_messages";
    CALLBACK_NUM = 0x0381, "callback_num";
    DPF_RESULT = 0x0420, "dpf_result";
    SET_DPF = 0x0421, "set_dpf";
    MS_AVAILABILITY_STATUS = 0x0422, "ms_availability_status";
    NETWORK_ERROR_CODE = 0x0423, "network_error_code";
    MESSAGE_PAYLOAD = 0x0424, "message_payload";
    DELIVERY_FAILURE_REASON = 0x0425, "delivery_failure_reason";
    MORE_MESSAGES_TO_SEND = 0x0426, "more_messages_to_send";
    MESSAGE_STATE = 0x0427, "message_state";
    USSD_SERVICE_OP = 0x0501, "ussd_service_op";
    DISPLAY_TIME = 0x1201, "display_time";
    SMS_SIGNAL = 0x1203, "sms_signal";
    MS_VALIDITY = 0x1204, "ms_validity";
    ALERT_ON_MESSAGE_DELIVERY = 0x130C, "alert_on_message_delivery";
    ITS_REPLY_TYPE = 0x1380, "its_reply_type";
    ITS_SESSION_INFO = 0x1383, "its_session_info";
}

impl fmt::Debug for TlvTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name}(0x{:04X})", self.0),
            None => write!(f, "TlvTag(0x{:04X})", self.0),
        }
    }
}

impl From<u16> for TlvTag {
    fn from(value: u16) -> Self {
        TlvTag(value)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tlv {
    /// The Tag field is used to uniquely identify the particular optional parameter in question.
    pub tag: TlvTag,

    /// The Value field contains the actual data for the optional parameter in question.
    /// Its length is written on the wire ahead of it.
    pub value: Bytes,
}

impl Tlv {
    pub fn encode(&self, buf: &mut BytesMut) {
        buf.put_u16(self.tag.0);
        buf.put_u16(self.value.len() as u16);
        buf.put_slice(&self.value);
    }

    pub fn decode(buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        if buf.remaining() < 4 {
            return Err(CodecError::Truncated { field: "tlv header" });
        }
        let tag = TlvTag(buf.get_u16());
        let length = buf.get_u16() as usize;
        if buf.remaining() < length {
            return Err(CodecError::Truncated { field: "tlv value" });
        }
        Ok(Tlv {
            tag,
            value: buf.copy_to_bytes(length),
        })
    }
}

/// The optional parameters of one PDU, kept in the order they were added or
/// read so that re-serializing reproduces the original bytes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TlvMap {
    entries: Vec<Tlv>,
}

impl TlvMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a parameter to raw bytes. An existing value for the tag is
    /// replaced in place.
    pub fn set(&mut self, tag: TlvTag, value: impl Into<Bytes>) -> Result<(), CodecError> {
        let value = value.into();
        if value.len() > u16::MAX as usize {
            return Err(CodecError::Tlv(format!(
                "value for {tag:?} is {} octets, limit is {}",
                value.len(),
                u16::MAX
            )));
        }
        match self.entries.iter_mut().find(|tlv| tlv.tag == tag) {
            Some(tlv) => tlv.value = value,
            None => self.entries.push(Tlv { tag, value }),
        }
        Ok(())
    }

    /// Sets a C-Octet String parameter. The terminating NUL is appended.
    pub fn set_cstring(&mut self, tag: TlvTag, value: &str) -> Result<(), CodecError> {
        if value.as_bytes().contains(&0) {
            return Err(CodecError::Tlv(format!("value for {tag:?} contains a NUL octet")));
        }
        let mut bytes = BytesMut::with_capacity(value.len() + 1);
        bytes.put_slice(value.as_bytes());
        bytes.put_u8(0);
        self.set(tag, bytes.freeze())
    }

    pub fn set_u8(&mut self, tag: TlvTag, value: u8) -> Result<(), CodecError> {
        self.set(tag, Bytes::copy_from_slice(&[value]))
    }

    pub fn set_u16(&mut self, tag: TlvTag, value: u16) -> Result<(), CodecError> {
        self.set(tag, Bytes::copy_from_slice(&value.to_be_bytes()))
    }

    pub fn set_u32(&mut self, tag: TlvTag, value: u32) -> Result<(), CodecError> {
        self.set(tag, Bytes::copy_from_slice(&value.to_be_bytes()))
    }

    pub fn get(&self, tag: TlvTag) -> Option<&Bytes> {
        self.entries.iter().find(|tlv| tlv.tag == tag).map(|tlv| &tlv.value)
    }

    /// Reads a C-Octet String parameter without its terminator. Returns
    /// `None` when the tag is absent or the value is not UTF-8.
    pub fn get_cstring(&self, tag: TlvTag) -> Option<&str> {
        let value = self.get(tag)?;
        let end = value.iter().position(|&b| b == 0).unwrap_or(value.len());
        std::str::from_utf8(&value[..end]).ok()
    }

    pub fn get_u8(&self, tag: TlvTag) -> Option<u8> {
        match self.get(tag)?.as_ref() {
            [b] => Some(*b),
            _ => None,
        }
    }

    pub fn get_u16(&self, tag: TlvTag) -> Option<u16> {
        let bytes: [u8; 2] = self.get(tag)?.as_ref().try_into().ok()?;
        Some(u16::from_be_bytes(bytes))
    }

    pub fn get_u32(&self, tag: TlvTag) -> Option<u32> {
        let bytes: [u8; 4] = self.get(tag)?.as_ref().try_into().ok()?;
        Some(u32::from_be_bytes(bytes))
    }

    pub fn remove(&mut self, tag: TlvTag) -> Option<Bytes> {
        let index = self.entries.iter().position(|tlv| tlv.tag == tag)?;
        Some(self.entries.remove(index).value)
    }

    pub fn contains(&self, tag: TlvTag) -> bool {
        self.get(tag).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tlv> {
        self.entries.iter()
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        for tlv in &self.entries {
            tlv.encode(buf);
        }
    }

    /// Reads parameters until the buffer is exhausted. A repeated tag keeps
    /// both occurrences.
    pub fn decode(buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        let mut entries = Vec::new();
        while buf.has_remaining() {
            entries.push(Tlv::decode(buf)?);
        }
        Ok(TlvMap { entries })
    }
}
