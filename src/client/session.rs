// ABOUTME: The bind/retry state machine behind every role client
// ABOUTME: Owns the current connection, the status stream, request correlation and the read loop

use crate::client::error::{SmppError, SmppResult};
use crate::client::keepalive::{KeepAliveMonitor, KeepAliveStatus, run_heartbeat};
use crate::client::types::{BindType, Handler};
use crate::client::SessionConfig;
use crate::codec::CodecError;
use crate::connection::Connection;
use crate::datatypes::{CommandId, CommandStatus};
use crate::pdu::Pdu;
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

/// How long close() gives the unbind PDU to reach the wire.
const UNBIND_GRACE: Duration = Duration::from_secs(1);

/// Lifecycle states of a session.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Binding,
    Connected,
    Closed,
}

/// One status update: the state entered and the error that caused it, if any.
#[derive(Clone, Debug)]
pub struct ConnStatus {
    state: SessionState,
    error: Option<Arc<SmppError>>,
}

impl ConnStatus {
    fn new(state: SessionState) -> Self {
        ConnStatus { state, error: None }
    }

    fn failed(error: SmppError) -> Self {
        ConnStatus {
            state: SessionState::Disconnected,
            error: Some(Arc::new(error)),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn error(&self) -> Option<&SmppError> {
        self.error.as_deref()
    }
}

/// Single-slot view of a session's status.
///
/// Only the most recent status is kept: a consumer that falls behind sees
/// the latest state, never a backlog, and the session never waits on it.
#[derive(Clone, Debug)]
pub struct StatusStream {
    rx: watch::Receiver<ConnStatus>,
}

impl StatusStream {
    /// Waits for a status newer than the last one returned. Returns `None`
    /// once the session has been dropped.
    pub async fn next(&mut self) -> Option<ConnStatus> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// The current status, without waiting.
    pub fn latest(&self) -> ConnStatus {
        self.rx.borrow().clone()
    }

    /// Waits until the session reaches `state` or the session is dropped.
    pub async fn wait_for(&mut self, state: SessionState) -> Option<ConnStatus> {
        if self.rx.borrow_and_update().state == state {
            return Some(self.latest());
        }
        loop {
            let status = self.next().await?;
            if status.state == state {
                return Some(status);
            }
        }
    }
}

/// Decides what the read loop does with PDUs the session does not consume.
pub(crate) struct Role {
    pub(crate) bind_type: BindType,
    /// Answer deliver_sm with deliver_sm_resp before dispatching
    pub(crate) ack_deliveries: bool,
    pub(crate) handler: Option<Arc<dyn Handler>>,
}

#[derive(Default)]
struct Inner {
    conn: Option<Arc<Connection>>,
    started: bool,
    closed: bool,
}

struct Shared {
    config: SessionConfig,
    role: Role,
    inner: Mutex<Inner>,
    status: watch::Sender<ConnStatus>,
    shutdown: watch::Sender<bool>,
    inflight: Mutex<HashMap<u32, oneshot::Sender<Pdu>>>,
    monitor: Arc<Mutex<KeepAliveMonitor>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Aborts the task when dropped, so cancelling the session tears down the
/// read loop and heartbeat with it.
struct TaskGuard(JoinHandle<SmppError>);

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Resolves once shutdown is requested or every sender is gone.
async fn stopped(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}

async fn join(task: &mut TaskGuard) -> SmppError {
    (&mut task.0).await.unwrap_or(SmppError::ConnectionClosed)
}

/// A long-lived SMPP session that binds, keeps the link alive and rebinds
/// after every failure until closed.
pub(crate) struct Session {
    shared: Arc<Shared>,
}

impl Session {
    pub(crate) fn new(config: SessionConfig, role: Role) -> Self {
        let (status, _) = watch::channel(ConnStatus::new(SessionState::Disconnected));
        let (shutdown, _) = watch::channel(false);
        Session {
            shared: Arc::new(Shared {
                config,
                role,
                inner: Mutex::new(Inner::default()),
                status,
                shutdown,
                inflight: Mutex::new(HashMap::new()),
                monitor: Arc::new(Mutex::new(KeepAliveMonitor::new())),
            }),
        }
    }

    /// Starts the bind/retry loop on first call; later calls only hand out
    /// another view of the same status stream.
    ///
    /// # Panics
    ///
    /// The first call spawns a task and must be made inside a tokio runtime.
    pub(crate) fn bind(&self) -> StatusStream {
        let mut inner = lock(&self.shared.inner);
        if !inner.started && !inner.closed {
            inner.started = true;
            tokio::spawn(Arc::clone(&self.shared).run());
        }
        StatusStream {
            rx: self.shared.status.subscribe(),
        }
    }

    pub(crate) async fn close(&self) -> SmppResult<()> {
        let conn = {
            let mut inner = lock(&self.shared.inner);
            if inner.closed {
                return Err(SmppError::AlreadyClosed);
            }
            if !inner.started {
                return Err(SmppError::NotConnected);
            }
            inner.closed = true;
            inner.conn.take()
        };

        self.shared.status.send_replace(ConnStatus::new(SessionState::Closed));
        self.shared.shutdown.send_replace(true);

        if let Some(conn) = conn {
            let unbind = Pdu::new_unbind();
            match tokio::time::timeout(UNBIND_GRACE, conn.write_pdu(&unbind)).await {
                Ok(Ok(())) => debug!("unbind sent"),
                Ok(Err(e)) => debug!(error = %e, "unbind not sent"),
                Err(_) => debug!("unbind timed out"),
            }
            conn.close().await;
        }
        self.shared.fail_inflight();
        info!("session closed");
        Ok(())
    }

    fn connection(&self) -> SmppResult<Arc<Connection>> {
        lock(&self.shared.inner)
            .conn
            .clone()
            .ok_or(SmppError::NotConnected)
    }

    /// Writes `pdu` on the current connection without waiting for an answer.
    pub(crate) async fn send(&self, pdu: &Pdu) -> SmppResult<()> {
        self.connection()?.write_pdu(pdu).await
    }

    /// Writes a request and waits for the response with the same sequence
    /// number, up to the configured response timeout.
    pub(crate) async fn request(&self, pdu: &Pdu) -> SmppResult<Pdu> {
        let expected = pdu
            .command_id()
            .response_id()
            .ok_or(SmppError::NotARequest(pdu.command_id()))?;
        let conn = self.connection()?;
        let sequence_number = pdu.sequence_number();

        let (tx, rx) = oneshot::channel();
        lock(&self.shared.inflight).insert(sequence_number, tx);

        if let Err(e) = conn.write_pdu(pdu).await {
            lock(&self.shared.inflight).remove(&sequence_number);
            return Err(e);
        }

        let response = match tokio::time::timeout(self.shared.config.response_timeout, rx).await {
            Ok(Ok(response)) => response,
            Ok(Err(_)) => return Err(SmppError::ConnectionClosed),
            Err(_) => {
                lock(&self.shared.inflight).remove(&sequence_number);
                return Err(SmppError::Timeout);
            }
        };

        if !response.command_status().is_ok() {
            return Err(SmppError::Protocol(response.command_status()));
        }
        if response.command_id() != expected {
            return Err(SmppError::UnexpectedPdu {
                expected,
                actual: response.command_id(),
            });
        }
        Ok(response)
    }

    pub(crate) fn keep_alive_status(&self) -> KeepAliveStatus {
        lock(&self.shared.monitor).status()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // stops the retry loop; the loop's own cleanup closes the transport
        self.shared.shutdown.send_replace(true);
    }
}

impl Shared {
    /// Publishes a status unless the session has been closed.
    fn notify(&self, status: ConnStatus) {
        let inner = lock(&self.inner);
        if inner.closed {
            return;
        }
        self.status.send_replace(status);
    }

    fn is_closed(&self) -> bool {
        lock(&self.inner).closed
    }

    fn fail_inflight(&self) {
        // dropping the senders wakes every waiter with ConnectionClosed
        lock(&self.inflight).clear();
    }

    async fn run(self: Arc<Self>) {
        let mut shutdown = self.shutdown.subscribe();
        loop {
            let reason = tokio::select! {
                biased;
                _ = stopped(&mut shutdown) => break,
                reason = self.connect_and_serve() => reason,
            };
            self.detach().await;
            if self.is_closed() {
                break;
            }

            warn!(error = %reason, retry_in = ?self.config.bind_interval, "session down");
            self.notify(ConnStatus::failed(reason));

            tokio::select! {
                biased;
                _ = stopped(&mut shutdown) => break,
                _ = tokio::time::sleep(self.config.bind_interval) => {}
            }
        }
        self.detach().await;
        debug!("retry loop stopped");
    }

    /// Drops the current connection, if any, and fails pending requests.
    async fn detach(&self) {
        let conn = lock(&self.inner).conn.take();
        if let Some(conn) = conn {
            conn.close().await;
        }
        self.fail_inflight();
    }

    /// One connection lifetime: dial, bind, then serve until it fails.
    /// Always returns the reason the connection ended.
    async fn connect_and_serve(self: &Arc<Self>) -> SmppError {
        self.notify(ConnStatus::new(SessionState::Connecting));
        let conn = match Connection::dial(&self.config.addr, self.config.tls.as_ref()).await {
            Ok(conn) => Arc::new(conn),
            Err(e) => return e,
        };

        self.notify(ConnStatus::new(SessionState::Binding));
        if let Err(e) = self.bind_on(&conn).await {
            conn.close().await;
            return e;
        }

        let installed = {
            let mut inner = lock(&self.inner);
            if !inner.closed {
                inner.conn = Some(Arc::clone(&conn));
            }
            !inner.closed
        };
        if !installed {
            conn.close().await;
            return SmppError::AlreadyClosed;
        }
        lock(&self.monitor).reset();
        info!(addr = %self.config.addr, bind = ?self.role.bind_type, "bound");
        self.notify(ConnStatus::new(SessionState::Connected));

        let mut reader = TaskGuard(tokio::spawn(Arc::clone(self).read_loop(Arc::clone(&conn))));
        if !self.config.keep_alive.enabled {
            return join(&mut reader).await;
        }
        let mut heartbeat = TaskGuard(tokio::spawn(run_heartbeat(
            Arc::clone(&conn),
            self.config.keep_alive.clone(),
            Arc::clone(&self.monitor),
        )));

        tokio::select! {
            reason = join(&mut heartbeat) => reason,
            reason = join(&mut reader) => reason,
        }
    }

    async fn bind_on(&self, conn: &Connection) -> SmppResult<()> {
        let bind_type = self.role.bind_type;
        let request = self.config.credentials.bind_pdu(bind_type)?;
        debug!(
            system_id = %self.config.credentials.system_id,
            sequence_number = request.sequence_number(),
            "sending {}",
            request.command_id()
        );
        conn.write_pdu(&request).await?;

        let response = tokio::time::timeout(self.config.response_timeout, conn.read_pdu())
            .await
            .map_err(|_| SmppError::Timeout)??;

        if response.command_id() != bind_type.response_id() {
            // a generic_nack still tells us why
            if !response.command_status().is_ok() {
                return Err(SmppError::Protocol(response.command_status()));
            }
            return Err(SmppError::UnexpectedPdu {
                expected: bind_type.response_id(),
                actual: response.command_id(),
            });
        }
        if !response.command_status().is_ok() {
            warn!(status = %response.command_status(), "bind rejected");
            return Err(SmppError::Protocol(response.command_status()));
        }
        Ok(())
    }

    /// Reads until the connection fails. Returns the failure.
    async fn read_loop(self: Arc<Self>, conn: Arc<Connection>) -> SmppError {
        loop {
            let pdu = match conn.read_pdu().await {
                Ok(pdu) => pdu,
                Err(SmppError::Codec(CodecError::UnknownCommandId {
                    command_id,
                    sequence_number,
                    ..
                })) => {
                    warn!(command_id = format_args!("{command_id:#010x}"), "unknown PDU, sending generic_nack");
                    let nack = Pdu::new_generic_nack_seq(sequence_number, CommandStatus::InvalidCommandId);
                    if let Err(e) = conn.write_pdu(&nack).await {
                        return e;
                    }
                    continue;
                }
                Err(e) => return e,
            };
            trace!(command_id = %pdu.command_id(), sequence_number = pdu.sequence_number(), "inbound");

            match pdu.command_id() {
                CommandId::EnquireLink => {
                    let resp = Pdu::new_enquire_link_resp_seq(pdu.sequence_number());
                    if let Err(e) = conn.write_pdu(&resp).await {
                        return e;
                    }
                }
                CommandId::EnquireLinkResp => lock(&self.monitor).on_pong(),
                CommandId::Unbind => {
                    info!("SMSC requested unbind");
                    let resp = Pdu::new_unbind_resp_seq(pdu.sequence_number());
                    if let Err(e) = conn.write_pdu(&resp).await {
                        debug!(error = %e, "unbind_resp not sent");
                    }
                    return SmppError::ConnectionClosed;
                }
                id if id.is_response() => {
                    let waiter = lock(&self.inflight).remove(&pdu.sequence_number());
                    match waiter {
                        Some(waiter) => {
                            let _ = waiter.send(pdu);
                        }
                        None => self.dispatch(pdu),
                    }
                }
                CommandId::DeliverSm if self.role.ack_deliveries => {
                    let resp = Pdu::new_deliver_sm_resp_seq(pdu.sequence_number());
                    if let Err(e) = conn.write_pdu(&resp).await {
                        return e;
                    }
                    self.dispatch(pdu);
                }
                _ => self.dispatch(pdu),
            }
        }
    }

    fn dispatch(&self, pdu: Pdu) {
        let Some(handler) = &self.role.handler else {
            debug!(command_id = %pdu.command_id(), "no handler, dropping PDU");
            return;
        };
        let command_id = pdu.command_id();
        if catch_unwind(AssertUnwindSafe(|| handler.handle(pdu))).is_err() {
            error!(%command_id, "handler panicked");
        }
    }
}
