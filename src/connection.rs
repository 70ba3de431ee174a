// ABOUTME: Owns one transport stream and moves whole SMPP PDUs across it
// ABOUTME: Writes are serialized per PDU; reads are length-framed by the 16-octet header

use crate::client::{SmppError, SmppResult};
use crate::codec::{PduHeader, check_command_length};
use crate::pdu::Pdu;
use std::io::Cursor;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{Mutex, watch};
use tokio_rustls::TlsConnector;
use tokio_rustls::rustls::pki_types::ServerName;
use tracing::{debug, trace};

/// How long close() waits for the transport to flush its shutdown.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// Any ordered, reliable byte stream a session can run over.
pub trait Transport: AsyncRead + AsyncWrite + Send + Unpin + 'static {}

impl<T> Transport for T where T: AsyncRead + AsyncWrite + Send + Unpin + 'static {}

/// TLS settings used when dialling the SMSC.
///
/// The connector carries the rustls client configuration (roots,
/// certificates, ALPN); the server name is what the certificate is verified
/// against.
#[derive(Clone)]
pub struct TlsConfig {
    connector: TlsConnector,
    server_name: ServerName<'static>,
}

impl TlsConfig {
    pub fn new(connector: TlsConnector, server_name: &str) -> SmppResult<Self> {
        let server_name = ServerName::try_from(server_name.to_owned())
            .map_err(|e| SmppError::Tls(format!("invalid server name {server_name:?}: {e}")))?;
        Ok(TlsConfig {
            connector,
            server_name,
        })
    }
}

impl std::fmt::Debug for TlsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsConfig")
            .field("server_name", &self.server_name)
            .finish_non_exhaustive()
    }
}

/// SMPP v3.4 Connection Management
///
/// Handles PDU framing over a single transport for one SMPP session. The
/// connection does not track session state (bound, unbound); that is the
/// job of the session in `crate::client`.
///
/// The connection is shared between tasks behind an `Arc`:
///
/// * Any task may write. Each PDU is written and flushed while holding the
///   write lock, so two PDUs never interleave on the wire.
/// * Reads are single-consumer; only the session read loop calls
///   [`Connection::read_pdu`].
/// * [`Connection::close`] wakes every pending read or write, which then
///   fails with [`SmppError::ConnectionClosed`].
pub struct Connection {
    reader: Mutex<ReadHalf<Box<dyn Transport>>>,
    writer: Mutex<WriteHalf<Box<dyn Transport>>>,
    closed: watch::Sender<bool>,
}

impl Connection {
    /// Create a new `Connection` backed by an established stream.
    pub fn new(stream: impl Transport) -> Connection {
        let stream: Box<dyn Transport> = Box::new(stream);
        let (reader, writer) = tokio::io::split(stream);
        let (closed, _) = watch::channel(false);
        Connection {
            reader: Mutex::new(reader),
            writer: Mutex::new(writer),
            closed,
        }
    }

    /// Connects to `addr`, wrapping the socket in TLS when `tls` is given.
    pub async fn dial(addr: &str, tls: Option<&TlsConfig>) -> SmppResult<Connection> {
        debug!(addr, tls = tls.is_some(), "dialling SMSC");
        let socket = TcpStream::connect(addr).await?;
        socket.set_nodelay(true)?;

        match tls {
            Some(tls) => {
                let stream = tls
                    .connector
                    .connect(tls.server_name.clone(), socket)
                    .await?;
                Ok(Connection::new(stream))
            }
            None => Ok(Connection::new(socket)),
        }
    }

    /// Write a single PDU to the stream and flush it.
    pub async fn write_pdu(&self, pdu: &Pdu) -> SmppResult<()> {
        let bytes = pdu.serialize()?;
        trace!(
            command_id = %pdu.command_id(),
            sequence_number = pdu.sequence_number(),
            len = bytes.len(),
            "write pdu"
        );

        if self.is_closed() {
            return Err(SmppError::ConnectionClosed);
        }
        let mut writer = self.writer.lock().await;
        tokio::select! {
            biased;
            _ = self.wait_closed() => Err(SmppError::ConnectionClosed),
            result = async {
                writer.write_all(&bytes).await?;
                writer.flush().await
            } => result.map_err(SmppError::from),
        }
    }

    /// Read a single PDU from the stream.
    ///
    /// Waits until the header and the full body it announces have arrived.
    /// A command_id this client does not know is reported as
    /// [`crate::codec::CodecError::UnknownCommandId`] after its body has
    /// been consumed, so the stream stays in sync.
    pub async fn read_pdu(&self) -> SmppResult<Pdu> {
        if self.is_closed() {
            return Err(SmppError::ConnectionClosed);
        }
        let mut reader = self.reader.lock().await;
        tokio::select! {
            biased;
            _ = self.wait_closed() => Err(SmppError::ConnectionClosed),
            result = Self::read_frame(&mut reader) => result,
        }
    }

    async fn read_frame(reader: &mut ReadHalf<Box<dyn Transport>>) -> SmppResult<Pdu> {
        let mut header = [0u8; PduHeader::SIZE];
        reader.read_exact(&mut header).await.map_err(eof_is_closed)?;

        let command_length = u32::from_be_bytes([header[0], header[1], header[2], header[3]]);
        check_command_length(command_length)?;

        let mut body = vec![0u8; command_length as usize - PduHeader::SIZE];
        reader.read_exact(&mut body).await.map_err(eof_is_closed)?;

        let header = PduHeader::decode(&mut Cursor::new(&header[..]))?;
        trace!(
            command_id = %header.command_id,
            sequence_number = header.sequence_number,
            len = command_length,
            "read pdu"
        );
        Ok(Pdu::decode_body(header, &body)?)
    }

    /// Closes the transport. Pending and future reads and writes fail.
    pub async fn close(&self) {
        if self.closed.send_replace(true) {
            return;
        }
        debug!("closing connection");
        let mut writer = self.writer.lock().await;
        let _ = tokio::time::timeout(SHUTDOWN_GRACE, writer.shutdown()).await;
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    async fn wait_closed(&self) {
        let mut closed = self.closed.subscribe();
        while !*closed.borrow_and_update() {
            if closed.changed().await.is_err() {
                return;
            }
        }
    }
}

fn eof_is_closed(err: std::io::Error) -> SmppError {
    if err.kind() == std::io::ErrorKind::UnexpectedEof {
        SmppError::ConnectionClosed
    } else {
        SmppError::Connection(err)
    }
}
