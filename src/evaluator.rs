//! Geofence status transitions.
//!
//! The evaluator classifies each position sample against the active
//! geofence and decides whether the change in status since the previous
//! sample is the edge the geofence is waiting for. It does no I/O: a fired
//! trigger is returned to the caller as a [`TriggerEvent`].

use std::fmt;

use chrono::{DateTime, Local};
use uuid::Uuid;

use crate::geofence::{Coordinates, Geofence, TriggerType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GeofenceStatus {
    /// No baseline has been established since the geofence was set.
    #[default]
    Unknown,
    Inside,
    Outside,
}

impl fmt::Display for GeofenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                GeofenceStatus::Unknown => "UNKNOWN",
                GeofenceStatus::Inside => "INSIDE",
                GeofenceStatus::Outside => "OUTSIDE",
            }
        )
    }
}

impl GeofenceStatus {
    pub fn is_known(&self) -> bool {
        !matches!(self, GeofenceStatus::Unknown)
    }
}

/// A fired trigger, handed to sinks for notification and logging.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerEvent {
    pub geofence_id: Uuid,
    pub title: String,
    pub description: String,
    pub timestamp: DateTime<Local>,
    pub from: GeofenceStatus,
    pub to: GeofenceStatus,
}

impl TriggerEvent {
    pub fn message(&self) -> String {
        format!(
            "Event: '{}'. Calendar reminder created. ({})",
            self.title, self.description
        )
    }
}

/// Result of evaluating a single sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub distance: f64,
    pub status: GeofenceStatus,
    pub previous: GeofenceStatus,
    pub trigger: Option<TriggerEvent>,
}

impl Evaluation {
    pub fn changed(&self) -> bool {
        self.status != self.previous
    }
}

/// Per-geofence transition state. The geofence itself is owned elsewhere
/// and passed in on each call; swapping it must be paired with [`reset`].
///
/// [`reset`]: GeofenceEvaluator::reset
#[derive(Debug, Default)]
pub struct GeofenceEvaluator {
    status: GeofenceStatus,
    distance: Option<f64>,
}

impl GeofenceEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> GeofenceStatus {
        self.status
    }

    pub fn distance(&self) -> Option<f64> {
        self.distance
    }

    /// Forget the baseline. Not a transition: nothing fires.
    pub fn reset(&mut self) {
        self.status = GeofenceStatus::Unknown;
        self.distance = None;
    }

    pub fn evaluate(&mut self, geofence: &Geofence, sample: &Coordinates) -> Evaluation {
        let (distance, inside) = geofence.locate(sample);
        let status = if inside {
            GeofenceStatus::Inside
        } else {
            GeofenceStatus::Outside
        };
        let previous = self.status;

        let trigger = if previous.is_known() && previous != status {
            let fired = match geofence.trigger_type {
                TriggerType::Enter => {
                    previous == GeofenceStatus::Outside && status == GeofenceStatus::Inside
                }
                TriggerType::Leave => {
                    previous == GeofenceStatus::Inside && status == GeofenceStatus::Outside
                }
            };
            fired.then(|| TriggerEvent {
                geofence_id: geofence.id,
                title: geofence.event_title.clone(),
                description: geofence.event_description.clone(),
                timestamp: Local::now(),
                from: previous,
                to: status,
            })
        } else {
            None
        };

        self.status = status;
        self.distance = Some(distance);

        Evaluation {
            distance,
            status,
            previous,
            trigger,
        }
    }
}
