//! Body-tracking sensor seam.
//!
//! The hardware driver is an external collaborator; the daemon only talks
//! to it through [`BodySensor`]. Frames arrive over a `tokio::sync::mpsc`
//! channel while the body reader is open — the channel is the Rust shape
//! of the driver's frame-ready callback.
//!
//! [`ReplaySensor`] is the bundled backend: it plays a JSONL recording of
//! raw frames at a fixed rate, looping when the recording ends. It keeps
//! the daemon runnable (and testable) without the device attached.

use std::fs;
use std::path::Path;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{Result, SkelcastError};
use crate::frame::RawFrame;

/// The sensor collaborator: lifecycle probes plus body-reader control.
///
/// `open_body_reader` starts frame production into the channel handed to
/// the implementation at construction time; `close_body_reader` stops it.
/// Both are driven strictly by the session count (0→1 opens, 1→0 closes).
pub trait BodySensor: Send + Sync {
    /// Probe the device. `false` means the sensor is unavailable, which is
    /// fatal at startup.
    fn open(&self) -> bool;

    fn open_body_reader(&self) -> anyhow::Result<()>;

    fn close_body_reader(&self) -> anyhow::Result<()>;
}

/// Sensor backend that replays a JSONL frame recording at a fixed fps.
#[derive(Debug)]
pub struct ReplaySensor {
    frames: Vec<RawFrame>,
    fps: u32,
    tx: mpsc::Sender<RawFrame>,
    reader: Mutex<Option<JoinHandle<()>>>,
}

impl ReplaySensor {
    /// Load a recording: one JSON raw frame per line, blank lines skipped.
    pub fn from_path(path: &Path, fps: u32, tx: mpsc::Sender<RawFrame>) -> Result<Self> {
        let load_err = |message: String| SkelcastError::ReplayLoad {
            path: path.display().to_string(),
            message,
        };

        let text = fs::read_to_string(path).map_err(|e| load_err(e.to_string()))?;
        let mut frames = Vec::new();
        for (lineno, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let frame: RawFrame = serde_json::from_str(line)
                .map_err(|e| load_err(format!("line {}: {}", lineno + 1, e)))?;
            frames.push(frame);
        }
        if frames.is_empty() {
            return Err(load_err("recording contains no frames".to_string()));
        }

        Ok(Self {
            frames,
            fps: fps.max(1),
            tx,
            reader: Mutex::new(None),
        })
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

impl BodySensor for ReplaySensor {
    fn open(&self) -> bool {
        // The recording was validated at load time.
        true
    }

    fn open_body_reader(&self) -> anyhow::Result<()> {
        let mut reader = self.reader.lock();
        if reader.is_some() {
            return Ok(());
        }

        let frames = self.frames.clone();
        let tx = self.tx.clone();
        let period = Duration::from_millis((1000 / u64::from(self.fps)).max(1));
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            let mut idx = 0usize;
            loop {
                ticker.tick().await;
                let frame = frames[idx % frames.len()].clone();
                idx += 1;
                if tx.send(frame).await.is_err() {
                    // Pipeline gone; nothing left to feed.
                    return;
                }
            }
        });
        *reader = Some(handle);
        tracing::info!("body reader opened ({} recorded frames)", self.frames.len());
        Ok(())
    }

    fn close_body_reader(&self) -> anyhow::Result<()> {
        if let Some(handle) = self.reader.lock().take() {
            handle.abort();
            tracing::info!("body reader closed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn recording(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file
    }

    #[test]
    fn test_load_rejects_malformed_line() {
        let file = recording(&[r#"{"bodies":[]}"#, "not json"]);
        let (tx, _rx) = mpsc::channel(4);
        let err = ReplaySensor::from_path(file.path(), 30, tx).unwrap_err();
        assert!(matches!(err, SkelcastError::ReplayLoad { .. }));
    }

    #[test]
    fn test_load_rejects_empty_recording() {
        let file = recording(&[]);
        let (tx, _rx) = mpsc::channel(4);
        let err = ReplaySensor::from_path(file.path(), 30, tx).unwrap_err();
        assert!(matches!(err, SkelcastError::ReplayLoad { .. }));
    }

    #[test]
    fn test_load_skips_blank_lines() {
        let file = recording(&[r#"{"bodies":[]}"#, "", r#"{"bodies":[]}"#]);
        let (tx, _rx) = mpsc::channel(4);
        let sensor = ReplaySensor::from_path(file.path(), 30, tx).unwrap();
        assert_eq!(sensor.frame_count(), 2);
    }

    #[tokio::test]
    async fn test_reader_delivers_frames_until_closed() {
        let file = recording(&[r#"{"bodies":[]}"#]);
        let (tx, mut rx) = mpsc::channel(4);
        let sensor = ReplaySensor::from_path(file.path(), 200, tx).unwrap();

        sensor.open_body_reader().unwrap();
        let frame = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(frame.bodies.is_empty());

        sensor.close_body_reader().unwrap();
        // Drain whatever was in flight; the channel then stays quiet.
        while rx.try_recv().is_ok() {}
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_open_body_reader_is_idempotent() {
        let file = recording(&[r#"{"bodies":[]}"#]);
        let (tx, _rx) = mpsc::channel(4);
        let sensor = ReplaySensor::from_path(file.path(), 30, tx).unwrap();
        sensor.open_body_reader().unwrap();
        sensor.open_body_reader().unwrap();
        sensor.close_body_reader().unwrap();
    }
}
