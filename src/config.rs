use std::path::PathBuf;

use clap::Parser;

use crate::error::Result;
use crate::geofence::{parse_target, Geofence, TargetFormat, TriggerType};

#[derive(Parser, Debug)]
#[command(name = "geoalert")]
#[command(about = "Fires a one-time alert when you enter or leave a target zone.", long_about = None)]
#[command(version)]
pub struct Arguments {
    /// Target location as "LAT,LNG" or an MGRS grid.
    #[arg(short, long, help_heading = "Geofence", allow_hyphen_values = true)]
    pub target: String,

    /// Optional - Name shown for the target (defaults to the target text).
    #[arg(short, long, help_heading = "Geofence")]
    pub name: Option<String>,

    /// Optional - Radius of the zone in meters.
    #[arg(short, long, default_value_t = 500.0, help_heading = "Geofence")]
    pub radius: f64,

    /// Optional - Fire when entering or when leaving the zone.
    #[arg(long, value_enum, default_value_t = TriggerType::Enter, help_heading = "Geofence")]
    pub trigger: TriggerType,

    /// Title of the event announced by the alert.
    #[arg(long, help_heading = "Event")]
    pub title: String,

    /// Optional - Description of the event.
    #[arg(short, long, default_value = "", help_heading = "Event")]
    pub description: String,

    /// Optional - Alter default HOST:Port for GPSD connection.
    #[arg(
        long,
        default_value = "127.0.0.1:2947",
        help_heading = "Position Source",
        help = "IP:PORT"
    )]
    pub gpsd: String,

    /// Optional - Replay positions from a file instead of GPSD.
    #[arg(long, help_heading = "Position Source", name = "replay")]
    pub replay: Option<PathBuf>,

    /// Optional - Milliseconds between replayed positions.
    #[arg(long, default_value_t = 1000, help_heading = "Position Source")]
    pub interval: u64,

    /// Optional - Exit after the first alert fires.
    #[arg(long, help_heading = "Advanced Options")]
    pub autoexit: bool,
}

impl Arguments {
    /// Build the geofence described by the command line.
    pub fn geofence(&self) -> Result<Geofence> {
        let (location, format) = parse_target(&self.target)?;
        let name = match (&self.name, format) {
            (Some(name), _) => name.clone(),
            (None, TargetFormat::Mgrs) => self.target.trim().to_string(),
            (None, TargetFormat::LatLng) => location.to_string(),
        };
        Geofence::new(
            location,
            name,
            self.radius,
            self.trigger,
            self.title.clone(),
            self.description.clone(),
        )
        .map(|fence| fence.with_mgrs(format == TargetFormat::Mgrs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args =
            Arguments::try_parse_from(["geoalert", "--target", "48.8584,2.2945", "--title", "Hi"])
                .unwrap();
        assert_eq!(args.radius, 500.0);
        assert_eq!(args.trigger, TriggerType::Enter);
        assert_eq!(args.gpsd, "127.0.0.1:2947");
        assert!(args.replay.is_none());

        let fence = args.geofence().unwrap();
        assert_eq!(fence.target_location_name, "48.8584, 2.2945");
        assert_eq!(fence.event_title, "Hi");
        assert_eq!(fence.event_description, "");
        assert!(!fence.mgrs);
    }

    #[test]
    fn test_mgrs_target_displays_as_mgrs() {
        let grid = crate::geofence::Coordinates::new(48.8584, 2.2945)
            .unwrap()
            .to_mgrs(5)
            .unwrap();
        let args =
            Arguments::try_parse_from(["geoalert", "--target", grid.as_str(), "--title", "Hi"])
                .unwrap();
        let fence = args.geofence().unwrap();
        assert!(fence.mgrs);
        assert_eq!(fence.target_location_name, grid);
    }

    #[test]
    fn test_leave_with_negative_coordinates() {
        let args = Arguments::try_parse_from([
            "geoalert",
            "--target",
            "-33.8568,151.2153",
            "--name",
            "Opera House",
            "--trigger",
            "leave",
            "--radius",
            "250",
            "--title",
            "Left",
        ])
        .unwrap();
        let fence = args.geofence().unwrap();
        assert_eq!(fence.trigger_type, TriggerType::Leave);
        assert_eq!(fence.radius, 250.0);
        assert_eq!(fence.target_location_name, "Opera House");
    }

    #[test]
    fn test_bad_radius_is_rejected() {
        let args = Arguments::try_parse_from([
            "geoalert", "--target", "1,2", "--radius", "0", "--title", "x",
        ])
        .unwrap();
        assert!(args.geofence().is_err());
    }
}
