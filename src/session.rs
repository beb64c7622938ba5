use crate::evaluator::{GeofenceEvaluator, GeofenceStatus, TriggerEvent};
use crate::eventlog::{EventLog, TriggerSink};
use crate::geofence::{Coordinates, Geofence};
use crate::position::PositionUpdate;
use crate::status::{MessageLog, MessageType, StatusMessage};
use crate::util::format_distance;

/// What a display shows after each processed update.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplaySnapshot {
    pub active: bool,
    pub status: GeofenceStatus,
    pub distance_meters: Option<f64>,
    pub position: Option<Coordinates>,
    pub position_error: Option<String>,
}

impl DisplaySnapshot {
    pub fn status_label(&self) -> String {
        if self.active {
            self.status.to_string()
        } else {
            "inactive".to_string()
        }
    }
}

/// Owns the active geofence and everything that reacts to it.
///
/// All mutation goes through `&mut self`, so replacing the geofence and
/// evaluating a sample can never interleave.
pub struct Session {
    geofence: Option<Geofence>,
    evaluator: GeofenceEvaluator,
    last_position: Option<Coordinates>,
    position_error: Option<String>,
    event_log: EventLog,
    pub status_log: MessageLog,
    sinks: Vec<Box<dyn TriggerSink + Send>>,
}

impl Session {
    pub fn new(status_log: MessageLog) -> Self {
        Session {
            geofence: None,
            evaluator: GeofenceEvaluator::new(),
            last_position: None,
            position_error: None,
            event_log: EventLog::new(),
            status_log,
            sinks: Vec::new(),
        }
    }

    pub fn add_sink(&mut self, sink: Box<dyn TriggerSink + Send>) {
        self.sinks.push(sink);
    }

    pub fn geofence(&self) -> Option<&Geofence> {
        self.geofence.as_ref()
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    /// Replace the active geofence and start over from an unknown status.
    /// A position already on hand is classified right away to set the
    /// baseline; that first classification never fires.
    pub fn activate(&mut self, geofence: Geofence) {
        tracing::info!(
            id = %geofence.id,
            name = %geofence.target_location_name,
            radius = geofence.radius,
            trigger = %geofence.trigger_type,
            "Geofence activated"
        );
        self.status_log.add_message(StatusMessage::new(
            MessageType::Info,
            format!(
                "Geofence set: {} ({}) radius {} | alert {} for '{}'",
                geofence.target_location_name,
                geofence.format_position(&geofence.target_location),
                format_distance(geofence.radius),
                geofence.trigger_type,
                geofence.event_title,
            ),
        ));

        self.evaluator.reset();
        self.geofence = Some(geofence);

        if let Some(position) = self.last_position {
            self.evaluate(position);
        }
    }

    pub fn clear(&mut self) {
        if self.geofence.is_none() && !self.evaluator.status().is_known() {
            return;
        }
        if let Some(geofence) = self.geofence.take() {
            tracing::info!(id = %geofence.id, "Geofence cleared");
            self.status_log.add_message(StatusMessage::new(
                MessageType::Info,
                format!("Geofence cleared: {}", geofence.target_location_name),
            ));
        }
        self.evaluator.reset();
    }

    /// Feed one update from the position source. Errors only hold the last
    /// published state; fixes are evaluated when a geofence is active.
    #[tracing::instrument(skip(self))]
    pub fn handle_update(&mut self, update: PositionUpdate) -> Option<TriggerEvent> {
        match update {
            PositionUpdate::Fix(position) => {
                self.last_position = Some(position);
                self.position_error = None;
                self.evaluate(position)
            }
            PositionUpdate::Error(message) => {
                if self.position_error.as_ref() != Some(&message) {
                    self.status_log.add_message(StatusMessage::new(
                        MessageType::Warning,
                        format!("Location error: {message}"),
                    ));
                }
                self.position_error = Some(message);
                None
            }
        }
    }

    pub fn snapshot(&self) -> DisplaySnapshot {
        DisplaySnapshot {
            active: self.geofence.is_some(),
            status: self.evaluator.status(),
            distance_meters: self.evaluator.distance(),
            position: self.last_position,
            position_error: self.position_error.clone(),
        }
    }

    fn evaluate(&mut self, position: Coordinates) -> Option<TriggerEvent> {
        let geofence = self.geofence.as_ref()?;
        let evaluation = self.evaluator.evaluate(geofence, &position);

        if evaluation.changed() {
            tracing::debug!(
                from = %evaluation.previous,
                to = %evaluation.status,
                distance = evaluation.distance,
                "Geofence status changed"
            );
        }
        self.status_log.add_message(StatusMessage::new(
            MessageType::Status,
            format!(
                "Position: {} | Distance: {} | Status: {}",
                geofence.format_position(&position),
                format_distance(evaluation.distance),
                evaluation.status,
            ),
        ));

        let event = evaluation.trigger?;
        tracing::info!(
            id = %event.geofence_id,
            title = %event.title,
            from = %event.from,
            to = %event.to,
            "Geofence trigger fired"
        );
        self.event_log.deliver(&event);
        self.status_log.deliver(&event);
        for sink in self.sinks.iter_mut() {
            sink.deliver(&event);
        }
        Some(event)
    }
}
