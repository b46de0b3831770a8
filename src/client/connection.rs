//! Connection lifecycle state machine.
//!
//! Owns the candidate port list, the attempt counters, the live socket, and
//! the buffered channel, and orchestrates connect attempts, timeout
//! detection, error recovery, and steady-state send/receive. The host drives
//! it forward by calling [`Connection::tick`] at a regular cadence; nothing
//! here blocks the caller.
//!
//! Connect attempts run as spawned tasks that post their outcome into a
//! single-consumer completion queue drained only by `tick()`, so all state
//! mutation happens on the tick context. Every attempt carries a generation
//! tag; completions from canceled attempts are detected by generation
//! mismatch and discarded.

use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Instant;

use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::core::ClientError;
use crate::transport::{
    self, AttemptCounters, BufferedChannel, TransportError, resolve_host,
};

use super::config::ClientConfig;

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not yet connecting.
    Initialized,
    /// A connect attempt to the current candidate port is in flight.
    Connecting,
    /// Connected; send and receive are active.
    Connected,
    /// The current attempt exceeded its per-attempt timeout.
    TimedOut,
    /// The current attempt (or the established stream) hit a socket error.
    Error,
    /// No candidate port can be reached; terminal.
    Failed,
}

/// Outcome of one spawned connect attempt, tagged with its generation.
#[derive(Debug)]
struct ConnectOutcome {
    generation: u64,
    result: io::Result<TcpStream>,
}

/// A resilient client connection over an ordered list of candidate ports.
///
/// # Example
///
/// ```ignore
/// use sockline::prelude::*;
///
/// let mut conn = Connection::new(ClientConfig::new("127.0.0.1", vec![4567, 4568]));
/// conn.connect()?;
///
/// // From the host tick loop:
/// conn.tick();
/// if conn.is_connected() {
///     conn.send_text("hello")?;
///     for line in conn.poll() {
///         println!("got line: {line}");
///     }
/// }
/// ```
#[derive(Debug)]
pub struct Connection {
    config: ClientConfig,
    state: ConnectionState,
    /// Ordered candidate ports still eligible for an attempt; shrinks
    /// permanently when a port fails with a non-timeout socket error.
    candidates: Vec<u16>,
    current_port: u16,
    /// Resolved once per connect cycle; reconnects reuse it.
    target_ip: IpAddr,
    counters: AttemptCounters,
    /// Bumped for every attempt; stale completions carry an older value.
    generation: u64,
    /// When `connect()` was called; drives the overall deadline.
    connect_started: Option<Instant>,
    /// When the current attempt was issued; drives the per-attempt deadline.
    attempt_started: Option<Instant>,
    /// The in-flight connect task, aborted on cancellation.
    attempt: Option<JoinHandle<()>>,
    outcome_tx: mpsc::UnboundedSender<ConnectOutcome>,
    outcome_rx: mpsc::UnboundedReceiver<ConnectOutcome>,
    channel: Option<BufferedChannel>,
    /// Decoded payloads awaiting `poll()`, in arrival order.
    inbox: Vec<String>,
}

impl Connection {
    /// Create a connection in the `Initialized` state.
    pub fn new(config: ClientConfig) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        Self {
            config,
            state: ConnectionState::Initialized,
            candidates: Vec::new(),
            current_port: 0,
            target_ip: IpAddr::V4(Ipv4Addr::LOCALHOST),
            counters: AttemptCounters::new(),
            generation: 0,
            connect_started: None,
            attempt_started: None,
            attempt: None,
            outcome_tx,
            outcome_rx,
            channel: None,
            inbox: Vec::new(),
        }
    }

    /// Start connecting.
    ///
    /// Valid only from `Initialized`. Records the candidate list, resolves
    /// the host (blocking for DNS names), starts the overall deadline
    /// clock, and issues the first attempt. Must be called from within a
    /// tokio runtime.
    pub fn connect(&mut self) -> Result<(), ClientError> {
        if self.state != ConnectionState::Initialized {
            return Err(ClientError::Config(
                "connect is only valid from the Initialized state".into(),
            ));
        }
        if self.config.ports.is_empty() {
            return Err(ClientError::Config("candidate port list is empty".into()));
        }

        self.candidates = self.config.ports.clone();
        self.target_ip = resolve_host(&self.config.host)?;
        self.connect_started = Some(Instant::now());
        self.start_attempt();
        Ok(())
    }

    /// Advance the machine by one host-driven cycle.
    ///
    /// Never blocks; callable at any rate of roughly once per second or
    /// faster with no behavior change other than timeout granularity.
    pub fn tick(&mut self) {
        match self.state {
            ConnectionState::Connecting => self.tick_connecting(),
            ConnectionState::Connected => self.tick_connected(),
            _ => {}
        }
    }

    /// Queue one payload for sending as a single frame.
    ///
    /// Valid only while `Connected`; at most one frame may be in flight, so
    /// a call while the previous frame is still flushing is rejected with
    /// `SendInProgress`. A socket error demotes the connection and re-enters
    /// the reconnect path.
    pub fn send(&mut self, payload: &[u8]) -> Result<(), ClientError> {
        if self.state == ConnectionState::Failed {
            return Err(ClientError::ConnectionFailed);
        }
        if self.state != ConnectionState::Connected {
            return Err(ClientError::NotConnected);
        }
        let Some(channel) = self.channel.as_mut() else {
            return Err(ClientError::NotConnected);
        };

        match channel.queue(payload) {
            Ok(()) => Ok(()),
            Err(TransportError::ConnectionLost(cause)) => {
                self.on_stream_error(&cause);
                Err(TransportError::ConnectionLost(cause).into())
            }
            // Framing rejections are local and leave the connection intact.
            Err(e) => Err(e.into()),
        }
    }

    /// Queue one text payload for sending as a single frame.
    pub fn send_text(&mut self, line: &str) -> Result<(), ClientError> {
        self.send(line.as_bytes())
    }

    /// Drain every payload decoded since the previous call, in arrival
    /// order.
    pub fn poll(&mut self) -> Vec<String> {
        std::mem::take(&mut self.inbox)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Whether the connection is established.
    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Whether the connection has failed permanently.
    pub fn is_failed(&self) -> bool {
        self.state == ConnectionState::Failed
    }

    /// Candidate ports still eligible for connect attempts.
    pub fn candidates(&self) -> &[u16] {
        &self.candidates
    }

    /// Snapshot of the attempt counters.
    pub fn counters(&self) -> AttemptCounters {
        self.counters
    }

    /// The port of the current (or most recent) connect attempt.
    pub fn current_port(&self) -> u16 {
        self.current_port
    }

    /// Issue an asynchronous connect to the next scheduled port.
    fn start_attempt(&mut self) {
        let port = match transport::next_port(&self.candidates, &self.counters) {
            Ok(port) => port,
            Err(_) => {
                error!(host = %self.config.host, "no candidate ports remain");
                self.state = ConnectionState::Failed;
                return;
            }
        };

        self.current_port = port;
        self.generation += 1;
        self.state = ConnectionState::Connecting;
        self.attempt_started = Some(Instant::now());

        let addr = SocketAddr::new(self.target_ip, port);
        info!(host = %self.config.host, port, "connecting");

        let generation = self.generation;
        let outcome_tx = self.outcome_tx.clone();
        self.attempt = Some(tokio::spawn(async move {
            let result = TcpStream::connect(addr).await;
            // The receiver only goes away when the Connection is dropped.
            let _ = outcome_tx.send(ConnectOutcome { generation, result });
        }));
    }

    /// Abort the in-flight connect task, if any.
    ///
    /// A completion that already raced past the abort is discarded later by
    /// its generation tag.
    fn cancel_attempt(&mut self) {
        if let Some(handle) = self.attempt.take() {
            handle.abort();
        }
    }

    /// Record a reconnect and issue the next attempt.
    fn reconnect(&mut self) {
        self.counters.on_reconnect(self.candidates.len());
        self.start_attempt();
    }

    fn tick_connecting(&mut self) {
        self.drain_outcomes();
        if self.state != ConnectionState::Connecting {
            return;
        }

        let overall = self
            .connect_started
            .map(|started| started.elapsed())
            .unwrap_or_default();
        if overall > self.config.connect_timeout {
            error!(host = %self.config.host, elapsed = ?overall, "overall connect deadline elapsed");
            self.cancel_attempt();
            self.state = ConnectionState::Failed;
            return;
        }

        let allowed = transport::attempt_timeout(self.counters.backoff, self.config.connect_timeout);
        let attempt_elapsed = self
            .attempt_started
            .map(|started| started.elapsed())
            .unwrap_or_default();
        if attempt_elapsed > allowed {
            warn!(
                host = %self.config.host,
                port = self.current_port,
                elapsed = ?attempt_elapsed,
                "connect attempt timed out"
            );
            self.state = ConnectionState::TimedOut;
            self.counters.on_timeout();
            self.cancel_attempt();
            self.reconnect();
        }
    }

    /// Apply queued connect completions, discarding stale generations.
    fn drain_outcomes(&mut self) {
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            if outcome.generation != self.generation {
                debug!(
                    generation = outcome.generation,
                    current = self.generation,
                    "discarding stale connect completion"
                );
                continue;
            }

            match outcome.result {
                Ok(stream) => {
                    info!(host = %self.config.host, port = self.current_port, "connected");
                    let _ = stream.set_nodelay(true);
                    self.channel =
                        Some(BufferedChannel::new(stream, self.config.buffer_capacity));
                    self.attempt = None;
                    self.state = ConnectionState::Connected;
                }
                Err(cause) => {
                    warn!(
                        host = %self.config.host,
                        port = self.current_port,
                        error = %cause,
                        "connect failed, removing port"
                    );
                    // The port refused or errored: remove it permanently.
                    if let Some(index) =
                        self.candidates.iter().position(|&p| p == self.current_port)
                    {
                        self.candidates.remove(index);
                    }
                    self.counters.on_port_removed();
                    self.attempt = None;

                    if self.candidates.is_empty() {
                        error!(host = %self.config.host, "all candidate ports failed");
                        self.state = ConnectionState::Failed;
                    } else {
                        self.state = ConnectionState::Error;
                        self.reconnect();
                    }
                }
            }
        }
    }

    fn tick_connected(&mut self) {
        let Some(channel) = self.channel.as_mut() else {
            return;
        };

        let result = channel
            .flush_send()
            .and_then(|()| channel.pump_receive(&mut self.inbox));
        match result {
            Ok(()) => {}
            Err(TransportError::FrameTooLarge { len, capacity }) => {
                // Local: the decoder already resynchronized.
                warn!(len, capacity, "dropped oversized inbound frame");
            }
            Err(TransportError::ConnectionLost(cause)) => self.on_stream_error(&cause),
            Err(err) => debug!(error = %err, "ignoring transport error while pumping"),
        }
    }

    /// A mid-stream socket error: demote and re-enter the reconnect path.
    ///
    /// The port is kept; removal stays a connect-time-refusal signal.
    fn on_stream_error(&mut self, cause: &io::Error) {
        warn!(
            host = %self.config.host,
            port = self.current_port,
            error = %cause,
            "connection lost, reconnecting"
        );
        self.channel = None;
        self.state = ConnectionState::Error;
        // A session may have outlived the overall deadline; each reconnect
        // cycle after an established connection gets a fresh budget.
        self.connect_started = Some(Instant::now());
        self.reconnect();
    }
}
