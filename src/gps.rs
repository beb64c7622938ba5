use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::net::{IpAddr, SocketAddr, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde::Deserialize;

use crate::error::Result;
use crate::geofence::Coordinates;
use crate::position::{sleep_while_alive, PositionSource, PositionUpdate};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);
const READ_TIMEOUT: Duration = Duration::from_millis(500);
const RECONNECT_DELAY: Duration = Duration::from_secs(5);
const WATCH_COMMAND: &[u8] = b"?WATCH={\"enable\":true,\"json\":true}\n";

#[derive(Debug, Deserialize)]
struct GpsdReport {
    class: String,
    #[serde(default)]
    mode: Option<u8>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

/// Extract a position from one line of gpsd JSON output.
///
/// Only `TPV` reports with at least a 2D fix yield a position; everything
/// else (VERSION, DEVICES, SKY, TPV without fix) is `Ok(None)`.
pub fn parse_gpsd_line(line: &str) -> Result<Option<Coordinates>> {
    let report: GpsdReport = serde_json::from_str(line.trim())?;
    if report.class != "TPV" {
        return Ok(None);
    }
    match (report.mode, report.lat, report.lon) {
        (Some(mode), Some(lat), Some(lon)) if mode >= 2 => Coordinates::new(lat, lon).map(Some),
        _ => Ok(None),
    }
}

/// Live positions from a gpsd daemon over TCP.
pub struct GpsdSource {
    host: IpAddr,
    port: u16,
    reconnect_delay: Duration,
    alive: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl GpsdSource {
    pub fn new(host: IpAddr, port: u16) -> GpsdSource {
        GpsdSource {
            host,
            port,
            reconnect_delay: RECONNECT_DELAY,
            alive: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> GpsdSource {
        self.reconnect_delay = delay;
        self
    }

    pub fn address(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl PositionSource for GpsdSource {
    fn subscribe(&mut self) -> Receiver<PositionUpdate> {
        self.stop();

        let (tx, rx) = mpsc::channel();
        let alive = Arc::new(AtomicBool::new(true));
        self.alive = alive.clone();
        let addr = self.address();
        let delay = self.reconnect_delay;
        self.handle = Some(thread::spawn(move || watch_gpsd(addr, delay, &alive, &tx)));
        rx
    }

    fn stop(&mut self) {
        self.alive.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for GpsdSource {
    fn drop(&mut self) {
        self.stop();
    }
}

fn watch_gpsd(
    addr: SocketAddr,
    reconnect_delay: Duration,
    alive: &AtomicBool,
    tx: &Sender<PositionUpdate>,
) {
    while alive.load(Ordering::SeqCst) {
        let reason = match read_gpsd_stream(addr, alive, tx) {
            Ok(StreamEnd::Stopped) => return,
            Ok(StreamEnd::Closed) => format!("gpsd at {addr} closed the connection"),
            Err(e) => format!("Unable to read from gpsd at {addr}: {e}"),
        };
        tracing::warn!(%addr, %reason, "gpsd stream interrupted");
        if tx.send(PositionUpdate::Error(reason)).is_err() {
            return;
        }
        if !sleep_while_alive(alive, reconnect_delay) {
            return;
        }
    }
}

enum StreamEnd {
    /// Stop requested or the subscriber went away.
    Stopped,
    Closed,
}

fn read_gpsd_stream(
    addr: SocketAddr,
    alive: &AtomicBool,
    tx: &Sender<PositionUpdate>,
) -> std::io::Result<StreamEnd> {
    let mut stream = TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT)?;
    stream.set_read_timeout(Some(READ_TIMEOUT))?;
    stream.write_all(WATCH_COMMAND)?;
    tracing::info!(%addr, "Connected to gpsd");

    let mut reader = BufReader::new(stream);
    let mut buf: Vec<u8> = Vec::new();
    while alive.load(Ordering::SeqCst) {
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => return Ok(StreamEnd::Closed),
            Ok(_) => {
                if buf.last() != Some(&b'\n') {
                    // Partial line; the rest follows on the next read.
                    continue;
                }
                let line = String::from_utf8_lossy(&buf).into_owned();
                buf.clear();
                match parse_gpsd_line(&line) {
                    Ok(Some(coords)) => {
                        if tx.send(PositionUpdate::Fix(coords)).is_err() {
                            return Ok(StreamEnd::Stopped);
                        }
                    }
                    Ok(None) => {}
                    Err(e) => tracing::debug!(%e, "Skipping unparseable gpsd line"),
                }
            }
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {}
            Err(e) => return Err(e),
        }
    }
    Ok(StreamEnd::Stopped)
}
