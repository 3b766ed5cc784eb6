use serde::{Deserialize, Serialize};

use bookloop_domain::{GeoPoint, geo};

use crate::{BookloopService, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocateRequest {
	pub lat: f64,
	pub lng: f64,
	/// Used as-is when present; no provider is called.
	pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocateResponse {
	pub location: GeoPoint,
}

impl BookloopService {
	/// Builds a validated location, filling a blank address through reverse geocoding.
	pub async fn locate(&self, req: LocateRequest) -> Result<LocateResponse> {
		let point = GeoPoint::new(req.lng, req.lat)?;
		let address = match req.address.map(|address| address.trim().to_string()) {
			Some(address) if !address.is_empty() => address,
			_ => self.reverse_geocode(req.lat, req.lng).await,
		};

		Ok(LocateResponse { location: point.with_address(address) })
	}

	/// Human-readable address for a point. Never fails: when every provider fails or finds
	/// nothing, the coordinates are formatted to four decimals.
	pub async fn reverse_geocode(&self, lat: f64, lng: f64) -> String {
		for geocoder in &self.providers.geocoders {
			match geocoder.reverse(lat, lng).await {
				Ok(Some(address)) if !address.trim().is_empty() => return address,
				Ok(_) => {
					tracing::debug!(provider = geocoder.name(), "Reverse geocoder found no address.");
				},
				Err(err) => {
					tracing::warn!(provider = geocoder.name(), error = %err, "Reverse geocoder failed.");
				},
			}
		}

		geo::format_coordinates(lat, lng)
	}
}
