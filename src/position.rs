use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Receiver;
use std::thread;
use std::time::{Duration, Instant};

use crate::geofence::Coordinates;

/// One delivery from a position source.
#[derive(Debug, Clone, PartialEq)]
pub enum PositionUpdate {
    Fix(Coordinates),
    /// Human-readable reason there is no fix (no device, permission, ...).
    Error(String),
}

/// A push-based stream of positions.
///
/// At most one subscription is live per source: subscribing again ends the
/// previous stream. Implementations stop their worker on drop.
pub trait PositionSource {
    fn subscribe(&mut self) -> Receiver<PositionUpdate>;
    fn stop(&mut self);
}

/// Sleep for `duration`, waking early once `alive` is cleared. Returns the
/// final value of `alive`.
pub(crate) fn sleep_while_alive(alive: &AtomicBool, duration: Duration) -> bool {
    let step = Duration::from_millis(50);
    let start = Instant::now();
    while alive.load(Ordering::SeqCst) {
        let elapsed = start.elapsed();
        if elapsed >= duration {
            return true;
        }
        thread::sleep(step.min(duration - elapsed));
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sleep_returns_early_when_stopped() {
        let alive = AtomicBool::new(false);
        let start = Instant::now();
        assert!(!sleep_while_alive(&alive, Duration::from_secs(10)));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_sleep_completes_while_alive() {
        let alive = AtomicBool::new(true);
        assert!(sleep_while_alive(&alive, Duration::from_millis(60)));
    }
}
