use serde::{Deserialize, Serialize};

/// Mean earth radius (IUGG), meters.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeoError {
	NonFinite,
	LongitudeOutOfRange(String),
	LatitudeOutOfRange(String),
}
impl std::fmt::Display for GeoError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::NonFinite => write!(f, "Coordinates must be finite numbers."),
			Self::LongitudeOutOfRange(value) => {
				write!(f, "Longitude {value} is outside the range -180 to 180.")
			},
			Self::LatitudeOutOfRange(value) => {
				write!(f, "Latitude {value} is outside the range -90 to 90.")
			},
		}
	}
}

impl std::error::Error for GeoError {}

/// A WGS84 point. `address` is a display hint only and never takes part in matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
	pub longitude: f64,
	pub latitude: f64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub address: Option<String>,
}
impl GeoPoint {
	pub fn new(longitude: f64, latitude: f64) -> Result<Self, GeoError> {
		validate(longitude, latitude)?;

		Ok(Self { longitude, latitude, address: None })
	}

	pub fn with_address(mut self, address: impl Into<String>) -> Self {
		self.address = Some(address.into());

		self
	}

	pub fn validate(&self) -> Result<(), GeoError> {
		validate(self.longitude, self.latitude)
	}

	pub fn distance_m(&self, other: &GeoPoint) -> f64 {
		haversine_m(self.latitude, self.longitude, other.latitude, other.longitude)
	}

	pub fn is_within(&self, center: &GeoPoint, radius_m: f64) -> bool {
		self.distance_m(center) <= radius_m
	}
}

pub fn haversine_m(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
	let d_lat = (lat2 - lat1).to_radians();
	let d_lng = (lng2 - lng1).to_radians();
	let a = (d_lat / 2.0).sin().powi(2)
		+ lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);

	2.0 * EARTH_RADIUS_M * a.sqrt().min(1.0).asin()
}

/// Coordinate rendering used whenever no geocoder produced an address.
pub fn format_coordinates(latitude: f64, longitude: f64) -> String {
	format!("{latitude:.4}, {longitude:.4}")
}

fn validate(longitude: f64, latitude: f64) -> Result<(), GeoError> {
	if !longitude.is_finite() || !latitude.is_finite() {
		return Err(GeoError::NonFinite);
	}
	if !(-180.0..=180.0).contains(&longitude) {
		return Err(GeoError::LongitudeOutOfRange(longitude.to_string()));
	}
	if !(-90.0..=90.0).contains(&latitude) {
		return Err(GeoError::LatitudeOutOfRange(latitude.to_string()));
	}

	Ok(())
}
