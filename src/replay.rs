use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::error::{GeoError, Result};
use crate::geofence::parse_target;
use crate::position::{sleep_while_alive, PositionSource, PositionUpdate};

/// Parse a replay script. One update per line:
///
/// ```text
/// # comment
/// 48.8674, 2.2945
/// 31U DQ 48251 11932
/// !Position unavailable
/// ```
///
/// A line starting with `!` replays a position error with the rest of the
/// line as its message.
pub fn parse_replay<R: BufRead>(reader: R) -> Result<Vec<PositionUpdate>> {
    let mut updates = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(message) = line.strip_prefix('!') {
            updates.push(PositionUpdate::Error(message.trim().to_string()));
            continue;
        }
        let (coords, _) = parse_target(line).map_err(|e| {
            GeoError::InvalidTarget(format!("replay line {}: {}", index + 1, e))
        })?;
        updates.push(PositionUpdate::Fix(coords));
    }
    Ok(updates)
}

/// Replays a fixed list of updates at a steady interval, then ends the
/// stream.
pub struct ReplaySource {
    updates: Vec<PositionUpdate>,
    interval: Duration,
    alive: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ReplaySource {
    pub fn new(updates: Vec<PositionUpdate>, interval: Duration) -> ReplaySource {
        ReplaySource {
            updates,
            interval,
            alive: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P, interval: Duration) -> Result<ReplaySource> {
        let file = File::open(path)?;
        let updates = parse_replay(BufReader::new(file))?;
        Ok(ReplaySource::new(updates, interval))
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }
}

impl PositionSource for ReplaySource {
    fn subscribe(&mut self) -> Receiver<PositionUpdate> {
        self.stop();

        let (tx, rx) = mpsc::channel();
        let alive = Arc::new(AtomicBool::new(true));
        self.alive = alive.clone();
        let updates = self.updates.clone();
        let interval = self.interval;

        self.handle = Some(thread::spawn(move || {
            for (index, update) in updates.into_iter().enumerate() {
                if index > 0 && !sleep_while_alive(&alive, interval) {
                    return;
                }
                if tx.send(update).is_err() {
                    return;
                }
            }
            tracing::debug!("Replay finished");
        }));
        rx
    }

    fn stop(&mut self) {
        self.alive.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ReplaySource {
    fn drop(&mut self) {
        self.stop();
    }
}
