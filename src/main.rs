//! Skelcast daemon entry point.
//!
//! # Usage
//!
//! ```bash
//! skelcast --replay frames.jsonl
//! skelcast --replay frames.jsonl --port 8081 --depth-width 1920 --depth-height 1080
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use skelcast::frame::Resolution;
use skelcast::synth::LogSynth;
use skelcast::{
    handle_connection, normalize_frame, BodySensor, CommandDispatcher, Config, GestureTracker,
    ReplaySensor, ServerMessage, SessionRegistry, SkelcastError,
};

/// Body-tracking WebSocket bridge
#[derive(Parser, Debug)]
#[command(name = "skelcast")]
#[command(about = "Broadcasts body-tracking frames and derives gesture input commands")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8081")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// JSONL recording of raw body frames to replay as the sensor feed
    #[arg(long)]
    replay: PathBuf,

    /// Replay playback rate, frames per second
    #[arg(long, default_value = "30")]
    fps: u32,

    /// Output width for the depth-to-pixel mapping, sent to clients
    #[arg(long, default_value = "512")]
    depth_width: u32,

    /// Output height for the depth-to-pixel mapping, sent to clients
    #[arg(long, default_value = "424")]
    depth_height: u32,

    /// Minimum interval between repeated pulse commands, in milliseconds
    #[arg(long, default_value = "500")]
    min_interval_ms: u64,

    /// Virtual screen width the pointer is clamped to
    #[arg(long, default_value = "1920")]
    screen_width: f64,

    /// Virtual screen height the pointer is clamped to
    #[arg(long, default_value = "1080")]
    screen_height: f64,

    /// Horizontal pointer step for one turn pulse, in pixels
    #[arg(long, default_value = "40")]
    turn_step: f64,
}

impl Args {
    fn config(&self) -> Config {
        Config {
            host: self.host.clone(),
            port: self.port,
            resolution: Resolution {
                width: self.depth_width,
                height: self.depth_height,
            },
            min_interval: Duration::from_millis(self.min_interval_ms),
            screen_width: self.screen_width,
            screen_height: self.screen_height,
            turn_step: self.turn_step,
            replay_fps: self.fps,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("skelcast=info".parse().unwrap()),
        )
        .init();

    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            e.exit_code()
        }
    }
}

async fn run(args: Args) -> skelcast::Result<()> {
    let config = args.config();

    let (frame_tx, mut frame_rx) = mpsc::channel(16);
    let sensor = ReplaySensor::from_path(&args.replay, config.replay_fps, frame_tx)?;
    if !sensor.open() {
        return Err(SkelcastError::SensorUnavailable);
    }
    let sensor: Arc<dyn BodySensor> = Arc::new(sensor);

    let registry = Arc::new(SessionRegistry::new(sensor.clone()));
    let dispatcher = Arc::new(CommandDispatcher::new(Arc::new(LogSynth), &config));

    // Frame pump: normalize, evaluate gestures, dispatch, broadcast. Runs
    // for the life of the process; the channel only yields frames while
    // the body reader is open.
    let pump_registry = Arc::clone(&registry);
    let pump_dispatcher = Arc::clone(&dispatcher);
    let resolution = config.resolution;
    let min_interval = config.min_interval;
    tokio::spawn(async move {
        let mut tracker = GestureTracker::new(min_interval);
        while let Some(raw) = frame_rx.recv().await {
            let frame = normalize_frame(&raw, resolution);
            for cmd in tracker.evaluate(&frame, Instant::now()) {
                pump_dispatcher.dispatch(cmd);
            }
            pump_registry.broadcast(&ServerMessage::body_frame(frame));
        }
    });

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| SkelcastError::Bind {
            addr: addr.clone(),
            source: e,
        })?;
    tracing::info!("skelcast listening on ws://{addr}");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                if let Err(e) = sensor.close_body_reader() {
                    tracing::warn!("failed to close body reader: {e}");
                }
                return Ok(());
            }

            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer)) => {
                        tracing::debug!("accepted connection from {peer}");
                        let registry = Arc::clone(&registry);
                        let dispatcher = Arc::clone(&dispatcher);
                        let config = config.clone();
                        tokio::spawn(async move {
                            handle_connection(stream, registry, dispatcher, config).await;
                        });
                    }
                    Err(e) => {
                        tracing::error!("failed to accept connection: {e}");
                    }
                }
            }
        }
    }
}
