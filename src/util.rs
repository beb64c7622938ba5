use std::net::IpAddr;
use std::str::FromStr;

use chrono::{DateTime, Local};

use crate::error::{GeoError, Result};

pub fn parse_ip_address_port(input: &str) -> Result<(IpAddr, u16)> {
    let parts: Vec<&str> = input.split(':').collect();

    // Check if there are exactly two parts
    if parts.len() != 2 {
        return Err(GeoError::InvalidAddress(
            "Input should be in the format IP_ADDRESS:PORT".to_string(),
        ));
    }

    let ip = IpAddr::from_str(parts[0])
        .map_err(|_| GeoError::InvalidAddress(format!("Invalid IP address '{}'", parts[0])))?;

    let port = parts[1]
        .parse::<u16>()
        .map_err(|_| GeoError::InvalidAddress(format!("Invalid port number '{}'", parts[1])))?;

    Ok((ip, port))
}

/// Whole meters, the way distances are shown to the user.
pub fn format_distance(meters: f64) -> String {
    format!("{} m", meters.round())
}

pub fn format_optional_distance(meters: Option<f64>) -> String {
    match meters {
        Some(m) => format_distance(m),
        None => "calculating...".to_string(),
    }
}

pub fn format_local_time(timestamp: &DateTime<Local>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
}
