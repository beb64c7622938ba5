use std::fmt;

use geo::algorithm::haversine_distance::HaversineDistance;
use geo_types::Point;
use geoconvert::{LatLon, Mgrs};
use uuid::Uuid;

use crate::error::{GeoError, Result};

/// A latitude/longitude pair in signed degrees.
///
/// Only finite values can be constructed. Range checking is left to the
/// caller: an out-of-range latitude still yields a numeric distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Coordinates> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(GeoError::NonFiniteCoordinate {
                latitude,
                longitude,
            });
        }
        Ok(Coordinates {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// MGRS grid string at the given precision, if the point is within the
    /// range MGRS can represent.
    pub fn to_mgrs(&self, precision: i32) -> Option<String> {
        LatLon::create(self.latitude, self.longitude)
            .ok()
            .map(|coord| coord.to_mgrs(precision).to_string())
    }

    fn to_point(self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Great-circle (haversine) distance in meters on a sphere of the mean
/// Earth radius.
pub fn distance(a: &Coordinates, b: &Coordinates) -> f64 {
    a.to_point().haversine_distance(&b.to_point())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum TriggerType {
    /// Fire when crossing from outside to inside.
    Enter,
    /// Fire when crossing from inside to outside.
    Leave,
}

impl fmt::Display for TriggerType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                TriggerType::Enter => "on enter",
                TriggerType::Leave => "on leave",
            }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetFormat {
    LatLng,
    Mgrs,
}

/// Parse a target given either as `lat,lng` or as an MGRS grid reference.
pub fn parse_target(target: &str) -> Result<(Coordinates, TargetFormat)> {
    let target = target.trim();
    if let Ok(grid) = Mgrs::parse_str(target) {
        let coord = LatLon::from_mgrs(&grid);
        return Ok((
            Coordinates::new(coord.latitude(), coord.longitude())?,
            TargetFormat::Mgrs,
        ));
    }

    let parts: Vec<&str> = target.split(',').collect();
    if parts.len() != 2 {
        return Err(GeoError::InvalidTarget(format!(
            "'{target}' should be in 'lat,lng' format or a MGRS grid"
        )));
    }
    let latitude = parts[0]
        .trim()
        .parse::<f64>()
        .map_err(|_| GeoError::InvalidTarget(format!("invalid latitude '{}'", parts[0])))?;
    let longitude = parts[1]
        .trim()
        .parse::<f64>()
        .map_err(|_| GeoError::InvalidTarget(format!("invalid longitude '{}'", parts[1])))?;
    Ok((Coordinates::new(latitude, longitude)?, TargetFormat::LatLng))
}

/// A circular target zone with the event it announces.
#[derive(Debug, Clone, PartialEq)]
pub struct Geofence {
    pub id: Uuid,
    pub target_location: Coordinates,
    pub target_location_name: String,
    pub radius: f64,
    pub trigger_type: TriggerType,
    pub event_title: String,
    pub event_description: String,
    /// Show positions as MGRS grids instead of lat/lng.
    pub mgrs: bool,
}

impl Geofence {
    pub fn new(
        target_location: Coordinates,
        target_location_name: impl Into<String>,
        radius: f64,
        trigger_type: TriggerType,
        event_title: impl Into<String>,
        event_description: impl Into<String>,
    ) -> Result<Geofence> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(GeoError::InvalidRadius(radius));
        }
        Ok(Geofence {
            id: Uuid::new_v4(),
            target_location,
            target_location_name: target_location_name.into(),
            radius,
            trigger_type,
            event_title: event_title.into(),
            event_description: event_description.into(),
            mgrs: false,
        })
    }

    pub fn with_mgrs(mut self, mgrs: bool) -> Geofence {
        self.mgrs = mgrs;
        self
    }

    /// A position the way the user entered the target: MGRS at 1m
    /// precision for MGRS targets, lat/lng otherwise.
    pub fn format_position(&self, position: &Coordinates) -> String {
        if self.mgrs {
            if let Some(grid) = position.to_mgrs(5) {
                return grid;
            }
        }
        position.to_string()
    }

    pub fn distance_to(&self, position: &Coordinates) -> f64 {
        distance(position, &self.target_location)
    }

    /// Distance to the target and whether the position is in the zone.
    /// Being exactly on the radius counts as inside.
    pub fn locate(&self, position: &Coordinates) -> (f64, bool) {
        let distance = self.distance_to(position);
        (distance, distance <= self.radius)
    }

    pub fn contains(&self, position: &Coordinates) -> bool {
        self.locate(position).1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EIFFEL_LAT: f64 = 48.8584;
    const EIFFEL_LNG: f64 = 2.2945;

    fn coord(lat: f64, lng: f64) -> Coordinates {
        Coordinates::new(lat, lng).unwrap()
    }

    #[test]
    fn test_distance_one_degree_of_longitude_at_equator() {
        let d = distance(&coord(0.0, 0.0), &coord(0.0, 1.0));
        assert!((d - 111_195.0).abs() < 111_195.0 * 0.01, "got {d}");
    }

    #[test]
    fn test_distance_is_symmetric() {
        let pairs = [
            (coord(EIFFEL_LAT, EIFFEL_LNG), coord(51.5007, -0.1246)),
            (coord(-33.8568, 151.2153), coord(40.6892, -74.0445)),
            (coord(89.9, 10.0), coord(-89.9, -170.0)),
        ];
        for (a, b) in pairs {
            let ab = distance(&a, &b);
            let ba = distance(&b, &a);
            assert!((ab - ba).abs() <= ab.abs() * 1e-6, "{ab} != {ba}");
        }
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        for c in [
            coord(0.0, 0.0),
            coord(EIFFEL_LAT, EIFFEL_LNG),
            coord(90.0, 0.0),
            coord(-45.0, -179.9),
        ] {
            assert_eq!(distance(&c, &c), 0.0);
        }
    }

    #[test]
    fn test_distance_extremes_are_finite() {
        let antipodal = distance(&coord(0.0, 0.0), &coord(0.0, 180.0));
        assert!(antipodal.is_finite());
        // Half the circumference of the mean-radius sphere.
        assert!((antipodal - 20_015_000.0).abs() < 20_000.0);

        let poles = distance(&coord(90.0, 0.0), &coord(-90.0, 0.0));
        assert!(poles.is_finite());
        assert!((poles - antipodal).abs() < 1.0);
    }

    #[test]
    fn test_out_of_range_coordinates_still_produce_a_number() {
        let d = distance(&coord(95.0, 0.0), &coord(0.0, 200.0));
        assert!(d.is_finite());
    }

    #[test]
    fn test_non_finite_coordinates_are_rejected() {
        assert!(matches!(
            Coordinates::new(f64::NAN, 0.0),
            Err(GeoError::NonFiniteCoordinate { .. })
        ));
        assert!(Coordinates::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_parse_target_lat_lng() {
        let (c, format) = parse_target(" 48.8584, 2.2945 ").unwrap();
        assert_eq!(format, TargetFormat::LatLng);
        assert_eq!(c, coord(EIFFEL_LAT, EIFFEL_LNG));
    }

    #[test]
    fn test_parse_target_mgrs() {
        let eiffel = coord(EIFFEL_LAT, EIFFEL_LNG);
        let grid = eiffel.to_mgrs(5).unwrap();
        let (c, format) = parse_target(&grid).unwrap();
        assert_eq!(format, TargetFormat::Mgrs);
        // 5-digit precision is a 1m square.
        assert!(distance(&c, &eiffel) < 5.0);
    }

    #[test]
    fn test_parse_target_rejects_garbage() {
        assert!(matches!(
            parse_target("somewhere"),
            Err(GeoError::InvalidTarget(_))
        ));
        assert!(parse_target("48.8,abc").is_err());
        assert!(parse_target("1,2,3").is_err());
    }

    #[test]
    fn test_geofence_rejects_bad_radius() {
        let target = coord(EIFFEL_LAT, EIFFEL_LNG);
        for radius in [0.0, -10.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                Geofence::new(target, "Eiffel", radius, TriggerType::Enter, "t", "d"),
                Err(GeoError::InvalidRadius(_))
            ));
        }
    }

    #[test]
    fn test_geofence_boundary_is_inside() {
        let target = coord(EIFFEL_LAT, EIFFEL_LNG);
        let edge = coord(EIFFEL_LAT + 0.0045, EIFFEL_LNG);
        let radius = distance(&edge, &target);
        let fence = Geofence::new(target, "Eiffel", radius, TriggerType::Enter, "t", "d").unwrap();
        assert!(fence.contains(&edge));
        assert!(!fence.contains(&coord(EIFFEL_LAT + 0.0046, EIFFEL_LNG)));
    }

    #[test]
    fn test_format_position_follows_target_format() {
        let target = coord(EIFFEL_LAT, EIFFEL_LNG);
        let fence = Geofence::new(target, "Eiffel", 100.0, TriggerType::Enter, "t", "d").unwrap();
        assert_eq!(fence.format_position(&target), "48.8584, 2.2945");

        let fence = fence.with_mgrs(true);
        let grid = fence.format_position(&target);
        assert_eq!(Some(grid.clone()), target.to_mgrs(5));
        let (parsed, format) = parse_target(&grid).unwrap();
        assert_eq!(format, TargetFormat::Mgrs);
        assert!(distance(&parsed, &target) < 5.0);
    }

    #[test]
    fn test_geofence_ids_are_unique() {
        let target = coord(EIFFEL_LAT, EIFFEL_LNG);
        let a = Geofence::new(target, "a", 100.0, TriggerType::Leave, "t", "d").unwrap();
        let b = Geofence::new(target, "a", 100.0, TriggerType::Leave, "t", "d").unwrap();
        assert_ne!(a.id, b.id);
    }
}
