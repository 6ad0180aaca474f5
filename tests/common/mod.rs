//! In-process stub display for integration tests.
//!
//! Accepts any number of WebSocket clients and reports what it sees through
//! a channel: connections, binary frames, and closes it initiates.

#![allow(dead_code)]

// ============================================================================
// Imports
// ============================================================================

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::{Duration, Instant};

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::{sleep, timeout};
use tokio_tungstenite::tungstenite::Message;
use tracing_subscriber::EnvFilter;

// ============================================================================
// Types
// ============================================================================

/// How the stub behaves per connection.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubConfig {
    /// Send a text greeting right after the upgrade.
    pub greeting: bool,
    /// Echo every binary frame back after this delay.
    pub ack_delay: Option<Duration>,
    /// Close the first connection after this many frames.
    pub close_first_after: Option<usize>,
    /// Accept TCP but never answer the WebSocket upgrade.
    pub stall_upgrade: bool,
}

/// Something the stub observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StubEvent {
    /// A client connected; index counts from zero.
    Connected { conn: usize, at: Instant },
    /// A binary frame arrived.
    Frame {
        conn: usize,
        bytes: Vec<u8>,
        at: Instant,
    },
    /// The stub closed a connection.
    Closed { conn: usize, at: Instant },
}

/// Handle to a running stub.
pub struct StubDisplay {
    /// `ws://` URL to connect to.
    pub url: String,
    events: mpsc::UnboundedReceiver<StubEvent>,
}

// ============================================================================
// StubDisplay
// ============================================================================

impl StubDisplay {
    /// Binds to a random localhost port and starts accepting.
    pub async fn spawn(config: StubConfig) -> Self {
        let listener = TcpListener::bind(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0))
            .await
            .expect("bind should succeed");
        let port = listener.local_addr().expect("local addr").port();
        let (tx, events) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            let mut stalled = Vec::new();
            let mut conn = 0;

            while let Ok((stream, _)) = listener.accept().await {
                let _ = tx.send(StubEvent::Connected {
                    conn,
                    at: Instant::now(),
                });

                if config.stall_upgrade {
                    stalled.push(stream);
                } else {
                    tokio::spawn(serve(stream, conn, config, tx.clone()));
                }
                conn += 1;
            }
        });

        Self {
            url: format!("ws://127.0.0.1:{port}/frames"),
            events,
        }
    }

    /// Next event of any kind.
    pub async fn next_event(&mut self, within: Duration) -> Option<StubEvent> {
        timeout(within, self.events.recv()).await.ok().flatten()
    }

    /// Next binary frame, skipping other events.
    pub async fn next_frame(&mut self, within: Duration) -> Option<(usize, Vec<u8>)> {
        let (conn, bytes, _) = self.next_frame_at(within).await?;
        Some((conn, bytes))
    }

    /// Next binary frame with the instant the stub received it.
    pub async fn next_frame_at(&mut self, within: Duration) -> Option<(usize, Vec<u8>, Instant)> {
        let deadline = Instant::now() + within;
        loop {
            let remaining = deadline.checked_duration_since(Instant::now())?;
            match self.next_event(remaining).await? {
                StubEvent::Frame { conn, bytes, at } => return Some((conn, bytes, at)),
                _ => continue,
            }
        }
    }

    /// Counts frames arriving within `window` without keeping them.
    pub async fn frame_count_within(&mut self, window: Duration) -> usize {
        let deadline = Instant::now() + window;
        let mut count = 0;
        while let Some(remaining) = deadline.checked_duration_since(Instant::now()) {
            match self.next_event(remaining).await {
                Some(StubEvent::Frame { .. }) => count += 1,
                Some(_) => {}
                None => break,
            }
        }
        count
    }

    /// Collects all frames arriving within `window`.
    pub async fn frames_within(&mut self, window: Duration) -> Vec<(usize, Vec<u8>)> {
        let deadline = Instant::now() + window;
        let mut frames = Vec::new();
        while let Some(remaining) = deadline.checked_duration_since(Instant::now()) {
            match self.next_event(remaining).await {
                Some(StubEvent::Frame { conn, bytes, .. }) => frames.push((conn, bytes)),
                Some(_) => {}
                None => break,
            }
        }
        frames
    }
}

/// Serves one upgraded connection.
async fn serve(
    stream: tokio::net::TcpStream,
    conn: usize,
    config: StubConfig,
    tx: mpsc::UnboundedSender<StubEvent>,
) {
    let Ok(mut ws) = tokio_tungstenite::accept_async(stream).await else {
        return;
    };

    if config.greeting && ws.send(Message::Text("ready".into())).await.is_err() {
        return;
    }

    let mut received = 0;
    while let Some(Ok(message)) = ws.next().await {
        let Message::Binary(bytes) = message else {
            continue;
        };
        received += 1;
        let _ = tx.send(StubEvent::Frame {
            conn,
            bytes: bytes.to_vec(),
            at: Instant::now(),
        });

        if conn == 0 && config.close_first_after == Some(received) {
            let _ = tx.send(StubEvent::Closed {
                conn,
                at: Instant::now(),
            });
            let _ = ws.close(None).await;
            return;
        }

        if let Some(delay) = config.ack_delay {
            sleep(delay).await;
            if ws.send(Message::Binary(bytes)).await.is_err() {
                return;
            }
        }
    }
}

/// Installs a test subscriber once; honors `RUST_LOG`.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("wall_frame_transmitter=debug")),
        )
        .with_test_writer()
        .try_init();
}
