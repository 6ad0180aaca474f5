//! One WebSocket session: connect, optional handshake, send/ack loop, teardown.
//!
//! # State Machine
//!
//! ```text
//! Connecting ──► (Handshaking) ──► Ready ⇄ Sending ⇄ AwaitingAck
//!      │               │             │
//!      └───────────────┴─────────────┴──► Closed(Clean | Error)
//! ```
//!
//! # Send Loop
//!
//! Each iteration drains the frame slot. A payload goes out as one binary
//! message; in ack-wait mode the session then blocks for one inbound message
//! and folds the round trip into its RTT estimate, otherwise it pauses for the
//! send interval while draining inbound traffic. With nothing pending it waits
//! for the next publish, inbound traffic, stop, or the idle tick. Stop is
//! checked once per iteration, and the connect, handshake, send and
//! acknowledgment waits end early when it is set. Writes are bounded by the
//! send timeout.
//!
//! Any transport failure ends the session. The payload in flight is dropped.

// ============================================================================
// Imports
// ============================================================================

use std::time::{Duration, Instant};

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout};
use tokio_tungstenite::tungstenite::{Bytes, Error as WsError, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, trace, warn};

use crate::error::{Error, Result};

use super::rtt::RttEstimate;
use super::supervisor::SupervisorContext;

// ============================================================================
// Constants
// ============================================================================

/// Upper bound on the close handshake once stop is requested.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

// ============================================================================
// Types
// ============================================================================

/// Client WebSocket stream.
type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Outbound half.
type WsWriter = SplitSink<WsStream, Message>;

/// Inbound half.
type WsReader = SplitStream<WsStream>;

/// One item read from the inbound half.
type Inbound = Option<std::result::Result<Message, WsError>>;

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Stop was requested.
    Clean,
    /// Connection or transport failure.
    Error,
}

/// Lifecycle state of one WebSocket session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Opening the WebSocket.
    Connecting,
    /// Waiting for the greeting message.
    Handshaking,
    /// Idle, polling the frame slot.
    Ready,
    /// Writing a payload.
    Sending,
    /// Waiting for the per-send acknowledgment.
    AwaitingAck,
    /// Terminal.
    Closed(SessionEnd),
}

impl SessionState {
    /// Returns `true` for either closed state.
    #[inline]
    #[must_use]
    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Closed(_))
    }
}

// ============================================================================
// Session
// ============================================================================

/// The lifetime of one connection to the destination.
///
/// Borrows the supervisor's shared state; the supervisor runs at most one
/// session at a time.
pub(crate) struct Session<'a> {
    /// Attempt number, for logs.
    id: u64,
    /// Shared supervisor state.
    context: &'a SupervisorContext,
    /// Current state.
    state: SessionState,
    /// Whether the session reached `Ready`.
    handshake_completed: bool,
    /// Send+ack latency, ack-wait mode only.
    rtt: RttEstimate,
}

impl<'a> Session<'a> {
    /// Creates a session in the `Connecting` state.
    pub(crate) fn new(id: u64, context: &'a SupervisorContext) -> Self {
        Self {
            id,
            context,
            state: SessionState::Connecting,
            handshake_completed: false,
            rtt: RttEstimate::new(),
        }
    }

    /// Current state.
    #[inline]
    pub(crate) fn state(&self) -> SessionState {
        self.state
    }

    /// Returns `true` once the session got past the optional handshake.
    #[inline]
    pub(crate) fn handshake_completed(&self) -> bool {
        self.handshake_completed
    }

    /// Current RTT estimate.
    #[inline]
    pub(crate) fn rtt(&self) -> RttEstimate {
        self.rtt
    }

    /// Runs the session to completion.
    ///
    /// Returns `Ok(())` when stop was requested. A connection that cannot be
    /// established fails immediately; a failure after connecting is followed
    /// by the error backoff before returning.
    pub(crate) async fn run(&mut self) -> Result<()> {
        let ws_stream = match self.connect().await {
            Ok(Some(ws_stream)) => ws_stream,
            Ok(None) => {
                self.state = SessionState::Closed(SessionEnd::Clean);
                debug!(session_id = self.id, "Stopped while connecting");
                return Ok(());
            }
            Err(e) => {
                self.state = SessionState::Closed(SessionEnd::Error);
                warn!(session_id = self.id, error = %e, "Could not connect to destination");
                return Err(e);
            }
        };

        info!(session_id = self.id, url = %self.context.destination, "Started new WebSocket session");

        match self.drive(ws_stream).await {
            Ok(()) => {
                self.state = SessionState::Closed(SessionEnd::Clean);
                debug!(session_id = self.id, "Session closed on stop");
                Ok(())
            }
            Err(e) => {
                self.state = SessionState::Closed(SessionEnd::Error);
                warn!(
                    session_id = self.id,
                    error = %e,
                    rtt_ms = self.rtt.estimate_ms(),
                    "WebSocket session failed"
                );
                self.context
                    .signal
                    .sleep(self.context.options.backoff.error)
                    .await;
                Err(e)
            }
        }
    }

    /// Opens the WebSocket within the connect timeout.
    ///
    /// Returns `None` if stop is requested first.
    async fn connect(&mut self) -> Result<Option<WsStream>> {
        self.state = SessionState::Connecting;
        let context = self.context;
        let limit = context.options.connect_timeout;

        let attempt = timeout(limit, connect_async(context.destination.as_str()));
        let connected = tokio::select! {
            result = attempt => result,
            () = context.signal.stopped() => return Ok(None),
        };

        let (ws_stream, _response) = connected
            .map_err(|_| Error::connection_timeout(millis(limit)))?
            .map_err(|e| Error::connection(e.to_string()))?;

        Ok(Some(ws_stream))
    }

    /// Handshake plus send loop over an open connection.
    async fn drive(&mut self, ws_stream: WsStream) -> Result<()> {
        let (mut ws_write, mut ws_read) = ws_stream.split();
        let context = self.context;
        let options = &context.options;

        if options.handshake {
            self.state = SessionState::Handshaking;
            if let Some(bytes) = self.receive(&mut ws_read, "handshake").await? {
                debug!(session_id = self.id, bytes, "Handshake message consumed");
            }
        }

        if !context.signal.is_stopped() {
            self.handshake_completed = true;
            self.state = SessionState::Ready;
        }
        let mut last_ping = Instant::now();

        while !context.signal.is_stopped() {
            if let Some(payload) = context.slot.take_if_present() {
                self.send_frame(payload, &mut ws_write, &mut ws_read).await?;
            } else {
                self.idle(&mut ws_read).await?;
            }

            if last_ping.elapsed() >= options.ping_interval {
                let ping = Message::Ping(Bytes::new());
                if self.write(ping, &mut ws_write, &mut ws_read, true).await? {
                    trace!(session_id = self.id, "Keep-alive ping sent");
                }
                last_ping = Instant::now();
            }
        }

        match timeout(CLOSE_TIMEOUT, ws_write.close()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!(session_id = self.id, error = %e, "Close handshake failed"),
            Err(_) => debug!(session_id = self.id, "Close handshake timed out"),
        }
        Ok(())
    }

    /// Sends one payload and, in ack-wait mode, waits for its acknowledgment.
    async fn send_frame(
        &mut self,
        payload: Bytes,
        ws_write: &mut WsWriter,
        ws_read: &mut WsReader,
    ) -> Result<()> {
        self.state = SessionState::Sending;
        let len = payload.len();
        let sent_at = Instant::now();
        let ack_wait = self.context.options.ack_wait;

        // With ack-wait on, the next inbound message is the acknowledgment.
        if !self
            .write(Message::Binary(payload), ws_write, ws_read, !ack_wait)
            .await?
        {
            return Ok(());
        }
        self.context.stats.frame_sent();
        trace!(session_id = self.id, bytes = len, "Frame sent");

        if ack_wait {
            self.state = SessionState::AwaitingAck;
            let Some(ack_bytes) = self.receive(ws_read, "acknowledgment").await? else {
                return Ok(());
            };

            self.rtt.update(sent_at.elapsed());
            self.context.stats.ack_received(self.rtt.estimate());
            trace!(
                session_id = self.id,
                ack_bytes,
                rtt_ms = self.rtt.estimate_ms(),
                "Frame acknowledged"
            );
        } else {
            self.pace(ws_read).await?;
        }

        self.state = SessionState::Ready;
        Ok(())
    }

    /// Writes one message within the send timeout.
    ///
    /// With `drain` set, inbound data is read and discarded while the write
    /// is pending, so a remote that replies cannot stall it. Returns `false`
    /// if stop is requested first.
    async fn write(
        &self,
        message: Message,
        ws_write: &mut WsWriter,
        ws_read: &mut WsReader,
        drain: bool,
    ) -> Result<bool> {
        let context = self.context;
        let limit = context.options.send_timeout;

        let send = ws_write.send(message);
        let expired = async move {
            match limit {
                Some(limit) => sleep(limit).await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(send, expired);

        loop {
            tokio::select! {
                result = &mut send => {
                    result?;
                    return Ok(true);
                }
                () = context.signal.stopped() => return Ok(false),
                () = &mut expired => {
                    let timeout_ms = limit.map_or(u64::MAX, millis);
                    return Err(Error::timeout("send", timeout_ms));
                }
                inbound = ws_read.next(), if drain => self.discard(inbound)?,
            }
        }
    }

    /// Holds off the next send for the send interval, draining inbound data.
    async fn pace(&self, ws_read: &mut WsReader) -> Result<()> {
        let context = self.context;
        let interval = sleep(context.options.send_interval);
        tokio::pin!(interval);

        loop {
            tokio::select! {
                () = &mut interval => return Ok(()),
                () = context.signal.stopped() => return Ok(()),
                inbound = ws_read.next() => self.discard(inbound)?,
            }
        }
    }

    /// Drops one unsolicited inbound item; a close surfaces as an error.
    fn discard(&self, inbound: Inbound) -> Result<()> {
        if let Some(bytes) = classify(inbound)? {
            trace!(session_id = self.id, bytes, "Discarded unsolicited message");
        }
        Ok(())
    }

    /// Waits for a publish, stop, inbound traffic, or the idle tick.
    ///
    /// Unsolicited inbound data is discarded; a close surfaces as an error.
    async fn idle(&self, ws_read: &mut WsReader) -> Result<()> {
        let context = self.context;

        tokio::select! {
            () = context.slot.wait_ready() => Ok(()),
            () = context.signal.stopped() => Ok(()),
            () = sleep(context.options.idle_poll_interval) => Ok(()),
            inbound = ws_read.next() => self.discard(inbound),
        }
    }

    /// Reads the next data message, skipping control frames.
    ///
    /// Bounded by the receive timeout when one is configured. Returns `None`
    /// if stop is requested first.
    async fn receive(&self, ws_read: &mut WsReader, operation: &str) -> Result<Option<usize>> {
        let context = self.context;

        let received = match context.options.recv_timeout {
            Some(limit) => tokio::select! {
                result = timeout(limit, next_data(ws_read)) => result
                    .map_err(|_| Error::timeout(operation, millis(limit)))?,
                () = context.signal.stopped() => return Ok(None),
            },
            None => tokio::select! {
                result = next_data(ws_read) => result,
                () = context.signal.stopped() => return Ok(None),
            },
        };

        received.map(Some)
    }
}

/// Reads until the next data message.
async fn next_data(ws_read: &mut WsReader) -> Result<usize> {
    loop {
        if let Some(bytes) = classify(ws_read.next().await)? {
            return Ok(bytes);
        }
    }
}

/// Maps one inbound item to its data length, `None` for control frames.
fn classify(inbound: Inbound) -> Result<Option<usize>> {
    match inbound {
        Some(Ok(Message::Binary(bytes))) => Ok(Some(bytes.len())),
        Some(Ok(Message::Text(text))) => Ok(Some(text.len())),
        Some(Ok(Message::Ping(_) | Message::Pong(_))) => Ok(None),
        Some(Ok(Message::Frame(_))) => Err(Error::protocol("Unexpected raw frame")),
        Some(Ok(Message::Close(_))) | None => Err(Error::ConnectionClosed),
        Some(Err(e)) => Err(e.into()),
    }
}

/// Whole milliseconds, saturating.
fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::net::{IpAddr, Ipv4Addr, SocketAddr};
    use std::sync::Arc;

    use tokio::net::TcpListener;
    use tokio::sync::mpsc;
    use url::Url;

    use crate::transmitter::TransmitterOptions;
    use crate::transport::{FrameSlot, StopSignal, TransmitterStats};

    /// How the stub display behaves after accepting a client.
    #[derive(Clone, Copy, Default)]
    struct Stub {
        greeting: bool,
        ack_delay: Option<Duration>,
        close_after: Option<usize>,
        stall_reads: bool,
    }

    /// Accepts one client and reports every binary message it receives.
    async fn spawn_stub(stub: Stub) -> (Url, mpsc::UnboundedReceiver<Vec<u8>>) {
        let listener = TcpListener::bind(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0))
            .await
            .expect("bind should succeed");
        let port = listener.local_addr().expect("local addr").port();
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.expect("accept");
            let mut ws = tokio_tungstenite::accept_async(stream)
                .await
                .expect("upgrade");

            if stub.greeting {
                ws.send(Message::Text("ready".into())).await.expect("greet");
            }
            if stub.stall_reads {
                sleep(Duration::from_secs(30)).await;
                return;
            }

            let mut received = 0;
            while let Some(Ok(message)) = ws.next().await {
                if let Message::Binary(bytes) = message {
                    received += 1;
                    let _ = tx.send(bytes.to_vec());

                    if stub.close_after == Some(received) {
                        let _ = ws.close(None).await;
                        return;
                    }
                    if let Some(delay) = stub.ack_delay {
                        sleep(delay).await;
                        let _ = ws.send(Message::Binary(bytes)).await;
                    }
                }
            }
        });

        let url = Url::parse(&format!("ws://127.0.0.1:{port}/wall")).expect("valid url");
        (url, rx)
    }

    fn context(url: Url, options: TransmitterOptions) -> SupervisorContext {
        SupervisorContext {
            destination: url,
            options: Arc::new(options),
            slot: Arc::new(FrameSlot::new()),
            signal: Arc::new(StopSignal::new()),
            stats: Arc::new(TransmitterStats::default()),
        }
    }

    fn fast() -> TransmitterOptions {
        TransmitterOptions::new()
            .with_send_interval(Duration::from_millis(5))
            .with_idle_poll_interval(Duration::from_millis(5))
            .with_error_backoff(Duration::from_millis(10))
            .with_recv_timeout(Some(Duration::from_millis(500)))
    }

    #[test]
    fn test_closed_states() {
        assert!(SessionState::Closed(SessionEnd::Clean).is_closed());
        assert!(SessionState::Closed(SessionEnd::Error).is_closed());
        assert!(!SessionState::Ready.is_closed());
    }

    #[test]
    fn test_classify_control_frames_skipped() {
        assert_eq!(classify(Some(Ok(Message::Ping(Bytes::new())))).ok(), Some(None));
        assert_eq!(classify(Some(Ok(Message::Pong(Bytes::new())))).ok(), Some(None));
        assert_eq!(
            classify(Some(Ok(Message::Binary(Bytes::from_static(b"ok"))))).ok(),
            Some(Some(2))
        );
        assert!(matches!(classify(None), Err(Error::ConnectionClosed)));
        assert!(matches!(
            classify(Some(Ok(Message::Close(None)))),
            Err(Error::ConnectionClosed)
        ));
    }

    #[test]
    fn test_millis_saturates() {
        assert_eq!(millis(Duration::from_millis(1500)), 1500);
        assert_eq!(millis(Duration::MAX), u64::MAX);
    }

    #[tokio::test]
    async fn test_handshake_then_send() {
        let (url, mut received) = spawn_stub(Stub {
            greeting: true,
            ack_delay: Some(Duration::ZERO),
            close_after: None,
            stall_reads: false,
        })
        .await;
        let ctx = context(url, fast().with_handshake().with_ack_wait());
        ctx.slot.publish(vec![1u8, 2, 3]);

        let signal = Arc::clone(&ctx.signal);
        let stopper = tokio::spawn(async move {
            let frame = received.recv().await;
            signal.stop();
            frame
        });

        let mut session = Session::new(1, &ctx);
        timeout(Duration::from_secs(5), session.run())
            .await
            .expect("session should stop")
            .expect("clean stop");

        assert_eq!(session.state(), SessionState::Closed(SessionEnd::Clean));
        assert!(session.handshake_completed());
        let frame = stopper.await.expect("stopper");
        assert_eq!(frame, Some(vec![1, 2, 3]));
        assert_eq!(ctx.stats.snapshot().frames_sent, 1);
    }

    #[tokio::test]
    async fn test_no_phantom_sends() {
        let (url, mut received) = spawn_stub(Stub {
            greeting: false,
            ack_delay: None,
            close_after: None,
            stall_reads: false,
        })
        .await;
        let ctx = context(url, fast());

        let signal = Arc::clone(&ctx.signal);
        tokio::spawn(async move {
            sleep(Duration::from_millis(200)).await;
            signal.stop();
        });

        let mut session = Session::new(1, &ctx);
        session.run().await.expect("clean stop");

        assert!(received.try_recv().is_err());
        assert_eq!(ctx.stats.snapshot().frames_sent, 0);
    }

    #[tokio::test]
    async fn test_rtt_tracks_ack_delay() {
        let delay = Duration::from_millis(20);
        let (url, mut received) = spawn_stub(Stub {
            greeting: false,
            ack_delay: Some(delay),
            close_after: None,
            stall_reads: false,
        })
        .await;
        let ctx = context(url, fast().with_ack_wait());

        let slot = Arc::clone(&ctx.slot);
        let signal = Arc::clone(&ctx.signal);
        tokio::spawn(async move {
            for i in 0..60u8 {
                slot.publish(vec![i]);
                if received.recv().await.is_none() {
                    break;
                }
                // Let the ack land before the next publish.
                sleep(delay + Duration::from_millis(5)).await;
            }
            signal.stop();
        });

        let mut session = Session::new(1, &ctx);
        timeout(Duration::from_secs(10), session.run())
            .await
            .expect("session should stop")
            .expect("clean stop");

        let rtt = session.rtt();
        assert!(rtt.samples() >= 50, "samples {}", rtt.samples());
        // EWMA from zero: after 50 samples within ~1% of the delay, plus scheduling noise.
        let estimate = rtt.estimate_ms();
        assert!(estimate > 15.0 && estimate < 40.0, "estimate {estimate}ms");
    }

    #[tokio::test]
    async fn test_ack_timeout_fails_session() {
        let (url, _received) = spawn_stub(Stub {
            greeting: false,
            ack_delay: None,
            close_after: None,
            stall_reads: false,
        })
        .await;
        let ctx = context(
            url,
            fast()
                .with_ack_wait()
                .with_recv_timeout(Some(Duration::from_millis(50))),
        );
        ctx.slot.publish(vec![42u8]);

        let mut session = Session::new(1, &ctx);
        let result = timeout(Duration::from_secs(2), session.run())
            .await
            .expect("session should fail quickly");

        assert!(matches!(result, Err(Error::Timeout { .. })));
        assert_eq!(session.state(), SessionState::Closed(SessionEnd::Error));
    }

    #[tokio::test]
    async fn test_remote_close_fails_session() {
        let (url, _received) = spawn_stub(Stub {
            greeting: false,
            ack_delay: None,
            close_after: Some(1),
            stall_reads: false,
        })
        .await;
        let ctx = context(url, fast());
        ctx.slot.publish(vec![1u8]);

        let mut session = Session::new(1, &ctx);
        let result = timeout(Duration::from_secs(2), session.run())
            .await
            .expect("session should notice the close");

        let err = result.expect_err("remote close is a failure");
        assert!(err.is_recoverable());
        assert!(session.handshake_completed());
    }

    #[tokio::test]
    async fn test_unreachable_fails_without_error_backoff() {
        let listener = TcpListener::bind(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0))
            .await
            .expect("bind should succeed");
        let port = listener.local_addr().expect("local addr").port();
        drop(listener);

        let url = Url::parse(&format!("ws://127.0.0.1:{port}/")).expect("valid url");
        let ctx = context(url, fast().with_error_backoff(Duration::from_secs(30)));

        let mut session = Session::new(1, &ctx);
        let result = timeout(Duration::from_secs(5), session.run())
            .await
            .expect("unreachable should not wait the error backoff");

        assert!(result.expect_err("refused").is_connection_error());
        assert!(!session.handshake_completed());
    }

    #[tokio::test]
    async fn test_stop_interrupts_unbounded_ack_wait() {
        let (url, mut received) = spawn_stub(Stub {
            greeting: false,
            ack_delay: None,
            close_after: None,
            stall_reads: false,
        })
        .await;
        let ctx = context(url, fast().with_ack_wait().with_recv_timeout(None));
        ctx.slot.publish(vec![1u8]);

        let signal = Arc::clone(&ctx.signal);
        tokio::spawn(async move {
            let _ = received.recv().await;
            sleep(Duration::from_millis(50)).await;
            signal.stop();
        });

        let mut session = Session::new(1, &ctx);
        timeout(Duration::from_secs(2), session.run())
            .await
            .expect("stop should end the ack wait")
            .expect("clean stop");

        assert_eq!(session.state(), SessionState::Closed(SessionEnd::Clean));
        assert_eq!(session.rtt().samples(), 0);
    }

    #[tokio::test]
    async fn test_missing_greeting_times_out_handshake() {
        let (url, mut received) = spawn_stub(Stub::default()).await;
        let ctx = context(
            url,
            fast()
                .with_handshake()
                .with_recv_timeout(Some(Duration::from_millis(50))),
        );
        ctx.slot.publish(vec![1u8]);

        let mut session = Session::new(1, &ctx);
        let result = timeout(Duration::from_secs(2), session.run())
            .await
            .expect("handshake should time out");

        match result {
            Err(Error::Timeout { operation, .. }) => assert_eq!(operation, "handshake"),
            other => panic!("expected handshake timeout, got {other:?}"),
        }
        assert!(!session.handshake_completed());
        assert!(received.try_recv().is_err());
        assert!(ctx.slot.is_pending());
    }

    #[tokio::test]
    async fn test_fire_and_forget_paces_sends() {
        let interval = Duration::from_millis(50);
        let (url, _received) = spawn_stub(Stub::default()).await;
        let ctx = context(url, fast().with_send_interval(interval));

        let slot = Arc::clone(&ctx.slot);
        let signal = Arc::clone(&ctx.signal);
        tokio::spawn(async move {
            for i in 0..300u32 {
                slot.publish(i.to_be_bytes().to_vec());
                sleep(Duration::from_millis(2)).await;
            }
            signal.stop();
        });

        let started = Instant::now();
        let mut session = Session::new(1, &ctx);
        timeout(Duration::from_secs(5), session.run())
            .await
            .expect("session should stop")
            .expect("clean stop");
        let elapsed = started.elapsed();

        let sent = ctx.stats.snapshot().frames_sent;
        let ceiling = elapsed.as_millis() / interval.as_millis() + 1;
        assert!(sent >= 3, "sent {sent}");
        assert!(u128::from(sent) <= ceiling, "sent {sent} in {elapsed:?}");
    }

    #[tokio::test]
    async fn test_send_timeout_fails_session() {
        let (url, _received) = spawn_stub(Stub {
            stall_reads: true,
            ..Stub::default()
        })
        .await;
        let ctx = context(
            url,
            fast()
                .with_ack_wait()
                .with_send_timeout(Some(Duration::from_millis(200))),
        );
        ctx.slot.publish(vec![0u8; 64 * 1024 * 1024]);

        let mut session = Session::new(1, &ctx);
        let result = timeout(Duration::from_secs(5), session.run())
            .await
            .expect("blocked send should time out");

        match result {
            Err(Error::Timeout { operation, .. }) => assert_eq!(operation, "send"),
            other => panic!("expected send timeout, got {other:?}"),
        }
        assert_eq!(session.state(), SessionState::Closed(SessionEnd::Error));
        assert_eq!(ctx.stats.snapshot().frames_sent, 0);
    }

    #[tokio::test]
    async fn test_stop_interrupts_blocked_send() {
        let (url, _received) = spawn_stub(Stub {
            stall_reads: true,
            ..Stub::default()
        })
        .await;
        let ctx = context(url, fast().with_send_timeout(None));
        ctx.slot.publish(vec![0u8; 64 * 1024 * 1024]);

        let signal = Arc::clone(&ctx.signal);
        tokio::spawn(async move {
            sleep(Duration::from_millis(200)).await;
            signal.stop();
        });

        let mut session = Session::new(1, &ctx);
        timeout(Duration::from_secs(3), session.run())
            .await
            .expect("stop should end the blocked send")
            .expect("clean stop");

        assert_eq!(session.state(), SessionState::Closed(SessionEnd::Clean));
        assert_eq!(ctx.stats.snapshot().frames_sent, 0);
    }
}
