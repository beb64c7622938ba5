use chrono::{DateTime, Local};
use uuid::Uuid;

use crate::evaluator::TriggerEvent;

/// Receives fired triggers. The evaluator only decides whether and when;
/// a sink decides how the user hears about it.
pub trait TriggerSink {
    fn deliver(&mut self, event: &TriggerEvent);
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Local>,
    pub message: String,
}

/// Append-only record of fired triggers for the lifetime of a session.
#[derive(Debug, Default)]
pub struct EventLog {
    entries: Vec<LogEntry>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Newest first, for display.
    pub fn latest_first(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TriggerSink for EventLog {
    fn deliver(&mut self, event: &TriggerEvent) {
        self.entries.push(LogEntry {
            id: Uuid::new_v4(),
            timestamp: event.timestamp,
            message: event.message(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::GeofenceStatus;

    fn event(title: &str) -> TriggerEvent {
        TriggerEvent {
            geofence_id: Uuid::new_v4(),
            title: title.to_string(),
            description: "desc".to_string(),
            timestamp: Local::now(),
            from: GeofenceStatus::Outside,
            to: GeofenceStatus::Inside,
        }
    }

    #[test]
    fn test_entries_keep_insertion_order() {
        let mut log = EventLog::new();
        assert!(log.is_empty());
        log.deliver(&event("first"));
        log.deliver(&event("second"));

        assert_eq!(log.len(), 2);
        assert!(log.entries()[0].message.contains("'first'"));
        assert!(log.entries()[1].message.contains("'second'"));
        assert!(log.entries()[0].timestamp <= log.entries()[1].timestamp);
        assert_ne!(log.entries()[0].id, log.entries()[1].id);

        let newest: Vec<&str> = log.latest_first().map(|e| e.message.as_str()).collect();
        assert!(newest[0].contains("'second'"));
    }
}
