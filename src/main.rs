use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::RecvTimeoutError;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use tracing_appender::rolling;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

use geoalert::config::Arguments;
use geoalert::gps::GpsdSource;
use geoalert::replay::ReplaySource;
use geoalert::status::{MessageLog, MessageType, StatusMessage};
use geoalert::util::{format_local_time, format_optional_distance, parse_ip_address_port};
use geoalert::{PositionSource, Session};

const DEFAULT_GPSD: &str = "127.0.0.1:2947";

fn main() -> Result<()> {
    let env_filter = EnvFilter::from_env("GEOALERT_LOG_LEVEL");
    let file_appender = rolling::daily("./logs", "geoalert.log");

    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    Registry::default()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking))
        .init();

    let cli = Arguments::parse();

    let geofence = cli.geofence().context("Invalid geofence")?;

    let mut source: Box<dyn PositionSource> = if let Some(path) = &cli.replay {
        let replay = ReplaySource::from_file(path, Duration::from_millis(cli.interval))
            .with_context(|| format!("Could not load replay file {}", path.display()))?;
        println!("💲 Replaying {} positions from {}", replay.len(), path.display());
        Box::new(replay)
    } else {
        let (host, port) = match parse_ip_address_port(&cli.gpsd) {
            Ok(addr) => addr,
            Err(e) => {
                tracing::warn!(%cli.gpsd, %e, "GPSD argument not valid, using default.");
                println!("GPSD argument {} not valid... ignoring.", cli.gpsd);
                parse_ip_address_port(DEFAULT_GPSD)?
            }
        };
        println!("💲 Watching GPSD at {}:{}", host, port);
        Box::new(GpsdSource::new(host, port))
    };

    let mut session = Session::new(MessageLog::new(true, Some(500)));
    session.activate(geofence);

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .context("Error setting Ctrl-C handler")?;

    let updates = source.subscribe();
    let mut exit_on_trigger = false;

    while running.load(Ordering::SeqCst) {
        match updates.recv_timeout(Duration::from_millis(250)) {
            Ok(update) => {
                if session.handle_update(update).is_some() && cli.autoexit {
                    exit_on_trigger = true;
                    running.store(false, Ordering::SeqCst);
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                session.status_log.add_message(StatusMessage::new(
                    MessageType::Info,
                    "Position source finished.".to_string(),
                ));
                break;
            }
        }
    }

    source.stop();

    if exit_on_trigger {
        println!("💲 Auto Exit Initiated");
    }

    let snapshot = session.snapshot();
    println!();
    println!(
        "Final status: {} | Distance: {}",
        snapshot.status_label(),
        format_optional_distance(snapshot.distance_meters)
    );

    let log = session.event_log();
    if log.is_empty() {
        println!("No events were triggered.");
    } else {
        println!("========= Event Log =========");
        for entry in log.latest_first() {
            println!(" {} | {}", format_local_time(&entry.timestamp), entry.message);
        }
        println!("========== Total: {:<2} ==========", log.len());
    }

    Ok(())
}
