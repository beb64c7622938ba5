pub mod config;
pub mod error;
pub mod evaluator;
pub mod eventlog;
pub mod geofence;
pub mod gps;
pub mod position;
pub mod replay;
pub mod session;
pub mod status;
pub mod util;

pub use error::{GeoError, Result};
pub use evaluator::{Evaluation, GeofenceEvaluator, GeofenceStatus, TriggerEvent};
pub use eventlog::{EventLog, LogEntry, TriggerSink};
pub use geofence::{distance, parse_target, Coordinates, Geofence, TargetFormat, TriggerType};
pub use position::{PositionSource, PositionUpdate};
pub use session::{DisplaySnapshot, Session};
