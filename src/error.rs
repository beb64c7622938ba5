use thiserror::Error;

pub type Result<T> = std::result::Result<T, GeoError>;

#[derive(Error, Debug)]
pub enum GeoError {
    /// Latitude or longitude was NaN or infinite.
    #[error("Non-finite coordinate: ({latitude}, {longitude})")]
    NonFiniteCoordinate { latitude: f64, longitude: f64 },

    #[error("Invalid radius: {0} (must be positive and finite)")]
    InvalidRadius(f64),

    /// Neither `lat,lng` nor a valid MGRS grid.
    #[error("Invalid target location: {0}")]
    InvalidTarget(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
