//! Sends one solid red frame to a display.
//!
//! Demonstrates:
//! - Building a transmitter from `DESTINATION_URI`
//! - Publishing an encoded frame
//! - Stopping with a bounded join
//!
//! Usage:
//!   DESTINATION_URI=ws://127.0.0.1:8765/frames cargo run --example red_frame
//!   DESTINATION_URI=ws://127.0.0.1:8765/frames cargo run --example red_frame -- --ack
//!   DESTINATION_URI=ws://127.0.0.1:8765/frames cargo run --example red_frame -- --debug

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use tracing_subscriber::EnvFilter;
use wall_frame_transmitter::{Error, Frame, Result, Transmitter};

// ============================================================================
// Constants
// ============================================================================

const WIDTH: u32 = 64;
const HEIGHT: u32 = 32;
const GAIN: i32 = 30;

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().collect();
    let debug = args.iter().any(|a| a == "--debug");
    let ack = args.iter().any(|a| a == "--ack");

    let filter = if debug {
        "wall_frame_transmitter=debug"
    } else {
        "wall_frame_transmitter=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    if let Err(e) = run(ack).await {
        eprintln!("\n[ERROR] {e}");
        std::process::exit(1);
    }
}

async fn run(ack: bool) -> Result<()> {
    let destination = std::env::var("DESTINATION_URI")
        .map_err(|_| Error::config("DESTINATION_URI is not set"))?;

    println!("[1] Connecting to {destination}...");
    let mut transmitter = Transmitter::builder()
        .destination(destination)
        .handshake(ack)
        .ack_wait(ack)
        .build()?;
    transmitter.start()?;

    println!("[2] Sending {WIDTH}x{HEIGHT} red frame (gain {GAIN})...");
    transmitter.send_frame(&Frame::solid(GAIN, WIDTH, HEIGHT, [255, 0, 0]));

    tokio::time::sleep(Duration::from_secs(1)).await;

    let stats = transmitter.stats();
    println!(
        "    sessions={} sent={} acks={} rtt={:?}",
        stats.sessions_started, stats.frames_sent, stats.acks_received, stats.rtt
    );

    println!("[3] Stopping...");
    transmitter.stop().await?;
    println!("    Done");
    Ok(())
}
