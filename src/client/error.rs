// ABOUTME: SMPP client error types for connection, session and request failures
// ABOUTME: Provides structured error reporting with automatic conversion from I/O and codec errors

use crate::codec::CodecError;
use crate::datatypes::{CommandId, CommandStatus};
use std::io;
use thiserror::Error;

/// Error type for SMPP client operations
///
/// Request-level failures are returned from the call that caused them.
/// Session-level failures (bind rejection, lost connection, heartbeat
/// timeout) are only reported through the status stream.
#[derive(Debug, Error)]
pub enum SmppError {
    /// I/O error during network operations (connection, read, write)
    #[error("Connection error: {0}")]
    Connection(#[from] io::Error),

    /// Malformed PDU on the wire, or a PDU that could not be encoded
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// SMPP protocol error indicated by command_status field
    #[error("Protocol error: {0}")]
    Protocol(CommandStatus),

    /// Unexpected PDU received (wrong response type for request)
    #[error("Unexpected PDU: expected {expected}, got {actual}")]
    UnexpectedPdu { expected: CommandId, actual: CommandId },

    /// No response arrived in time
    #[error("Operation timeout")]
    Timeout,

    /// No enquire_link_resp arrived within the keep-alive timeout
    #[error("No enquire_link_resp within {0:?}")]
    HeartbeatTimeout(std::time::Duration),

    /// The transport was closed while the operation was pending
    #[error("Connection closed")]
    ConnectionClosed,

    /// The session has no bound connection
    #[error("Not connected")]
    NotConnected,

    /// close() was already called on this session
    #[error("Session already closed")]
    AlreadyClosed,

    /// request() was given a PDU that has no response to wait for
    #[error("{0} has no response PDU")]
    NotARequest(CommandId),

    /// TLS setup failed before the handshake could start
    #[error("TLS error: {0}")]
    Tls(String),
}

/// Result type alias for SMPP operations
pub type SmppResult<T> = Result<T, SmppError>;
