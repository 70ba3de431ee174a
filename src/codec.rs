// SMPP v3.4 Codec - header framing and the error type shared by every decoder
//
// The 16-octet header is common to all PDUs. Bodies are handled by the field
// tables in `crate::pdu`, which lean on the `FieldKind` rules in `datatypes`.

use crate::datatypes::{CommandId, CommandStatus, FieldName};
use crate::text::TextError;
use bytes::{Buf, BufMut, BytesMut};
use std::io::Cursor;
use thiserror::Error;

/// Maximum allowed PDU size to prevent memory exhaustion attacks
pub const MAX_PDU_SIZE: u32 = 65536; // 64KB

/// SMPP v3.4 PDU Header (16 bytes, common to all PDUs)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PduHeader {
    pub command_length: u32,
    pub command_id: CommandId,
    pub command_status: CommandStatus,
    pub sequence_number: u32,
}

impl PduHeader {
    pub const SIZE: usize = 16;

    /// Decode PDU header from buffer with validation.
    ///
    /// An unregistered command_id is reported with the raw header values so
    /// the caller can still answer with a generic_nack.
    pub fn decode(buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        if buf.remaining() < Self::SIZE {
            return Err(CodecError::Truncated { field: "header" });
        }

        let command_length = buf.get_u32();
        let command_id_raw = buf.get_u32();
        let command_status = CommandStatus::from(buf.get_u32());
        let sequence_number = buf.get_u32();

        check_command_length(command_length)?;

        let command_id =
            CommandId::try_from(command_id_raw).map_err(|_| CodecError::UnknownCommandId {
                command_id: command_id_raw,
                command_status: command_status.code(),
                sequence_number,
            })?;

        Ok(PduHeader {
            command_length,
            command_id,
            command_status,
            sequence_number,
        })
    }

    /// Encode PDU header to buffer
    pub fn encode(&self, buf: &mut BytesMut) {
        buf.put_u32(self.command_length);
        buf.put_u32(self.command_id as u32);
        buf.put_u32(self.command_status.code());
        buf.put_u32(self.sequence_number);
    }
}

/// Rejects a command_length that cannot frame a PDU.
pub fn check_command_length(command_length: u32) -> Result<(), CodecError> {
    if command_length < PduHeader::SIZE as u32 || command_length > MAX_PDU_SIZE {
        return Err(CodecError::InvalidPduLength {
            length: command_length,
            min: PduHeader::SIZE as u32,
            max: MAX_PDU_SIZE,
        });
    }
    Ok(())
}

/// Codec errors with detailed context for debugging
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("PDU truncated while reading {field}")]
    Truncated { field: &'static str },

    #[error("Invalid PDU length: {length}, must be {min}-{max}")]
    InvalidPduLength { length: u32, min: u32, max: u32 },

    #[error("Unknown command_id: {command_id:#010x} (sequence {sequence_number})")]
    UnknownCommandId {
        command_id: u32,
        command_status: u32,
        sequence_number: u32,
    },

    #[error("{command_id} has no field {field}")]
    UnknownField {
        command_id: CommandId,
        field: FieldName,
    },

    #[error("Field '{field}' expects {expected}, got {actual}")]
    FieldType {
        field: FieldName,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Field '{field}' validation failed: {reason}")]
    FieldValidation { field: &'static str, reason: String },

    #[error("TLV error: {0}")]
    Tlv(String),

    #[error("Text encoding error: {0}")]
    Text(#[from] TextError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convert codec errors to appropriate SMPP command_status codes
impl CodecError {
    pub fn to_command_status(&self) -> CommandStatus {
        match self {
            CodecError::InvalidPduLength { .. } | CodecError::Truncated { .. } => {
                CommandStatus::InvalidCommandLength
            }
            CodecError::UnknownCommandId { .. } => CommandStatus::InvalidCommandId,
            CodecError::FieldValidation { field, .. } => {
                // Map specific field errors to appropriate status codes
                match *field {
                    "source_addr" => CommandStatus::InvalidSourceAddress,
                    "destination_addr" => CommandStatus::InvalidDestinationAddress,
                    "short_message" => CommandStatus::InvalidMsgLength,
                    "system_id" => CommandStatus::InvalidSystemId,
                    "password" => CommandStatus::InvalidPassword,
                    _ => CommandStatus::SystemError,
                }
            }
            CodecError::Tlv(_) => CommandStatus::InvalidOptionalParameterValue,
            _ => CommandStatus::SystemError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_round_trip() {
        let header = PduHeader {
            command_length: 16,
            command_id: CommandId::EnquireLink,
            command_status: CommandStatus::Ok,
            sequence_number: 7,
        };
        let mut buf = BytesMut::new();
        header.encode(&mut buf);
        assert_eq!(
            &buf[..],
            b"\x00\x00\x00\x10\x00\x00\x00\x15\x00\x00\x00\x00\x00\x00\x00\x07"
        );

        let mut cursor = Cursor::new(&buf[..]);
        assert_eq!(PduHeader::decode(&mut cursor).unwrap(), header);
    }

    #[test]
    fn unknown_command_id_keeps_raw_header() {
        let data = b"\x00\x00\x00\x10\x00\x00\x00\x0a\x00\x00\x00\x00\x00\x00\x00\x2a";
        let err = PduHeader::decode(&mut Cursor::new(&data[..])).unwrap_err();
        assert!(matches!(
            err,
            CodecError::UnknownCommandId {
                command_id: 0x0A,
                command_status: 0,
                sequence_number: 42
            }
        ));
        assert_eq!(err.to_command_status(), CommandStatus::InvalidCommandId);
    }

    #[test]
    fn length_bounds() {
        assert!(check_command_length(16).is_ok());
        assert!(check_command_length(MAX_PDU_SIZE).is_ok());
        assert!(matches!(
            check_command_length(15),
            Err(CodecError::InvalidPduLength { length: 15, .. })
        ));
        assert!(check_command_length(MAX_PDU_SIZE + 1).is_err());
    }

    #[test]
    fn short_header_is_truncated() {
        let err = PduHeader::decode(&mut Cursor::new(&[0u8; 10][..])).unwrap_err();
        assert!(matches!(err, CodecError::Truncated { field: "header" }));
    }
}
