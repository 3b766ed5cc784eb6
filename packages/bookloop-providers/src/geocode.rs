use std::time::Duration;

use reqwest::{Client, header::USER_AGENT};
use serde_json::Value;

use bookloop_config::{Geocoding, GeocodingProvider, GeocodingProviderKind};

use crate::{Error, Result};

/// Asks one reverse geocoding service for a human readable place name.
///
/// `Ok(None)` means the service answered but had nothing usable.
pub async fn reverse(
	cfg: &Geocoding,
	provider: &GeocodingProvider,
	lat: f64,
	lng: f64,
) -> Result<Option<String>> {
	let client = Client::builder()
		.timeout(Duration::from_millis(cfg.timeout_ms))
		.build()
		.map_err(geocoding_failed)?;
	let request = match provider.kind {
		GeocodingProviderKind::Nominatim => client
			.get(format!("{}/reverse", provider.api_base))
			.query(&[
				("format", "json".to_string()),
				("lat", lat.to_string()),
				("lon", lng.to_string()),
				("zoom", "18".to_string()),
				("addressdetails", "1".to_string()),
			]),
		GeocodingProviderKind::Bigdatacloud => client
			.get(format!("{}/data/reverse-geocode-client", provider.api_base))
			.query(&[
				("latitude", lat.to_string()),
				("longitude", lng.to_string()),
				("localityLanguage", "en".to_string()),
			]),
	};
	let json: Value = request
		.header(USER_AGENT, cfg.user_agent.as_str())
		.send()
		.await
		.map_err(geocoding_failed)?
		.error_for_status()
		.map_err(geocoding_failed)?
		.json()
		.await
		.map_err(geocoding_failed)?;

	Ok(match provider.kind {
		GeocodingProviderKind::Nominatim => parse_nominatim(&json),
		GeocodingProviderKind::Bigdatacloud => parse_bigdatacloud(&json),
	})
}

/// Most specific settlement, then district or state, then country.
pub fn parse_nominatim(json: &Value) -> Option<String> {
	let address = json.get("address")?;
	let mut parts = Vec::new();

	if let Some(place) = first_field(address, &["village", "town", "city", "suburb"]) {
		parts.push(place);
	}
	if let Some(region) = first_field(address, &["county", "state"]) {
		parts.push(region);
	}
	if let Some(country) = first_field(address, &["country"]) {
		parts.push(country);
	}

	join_parts(parts)
}

pub fn parse_bigdatacloud(json: &Value) -> Option<String> {
	let mut parts = Vec::new();

	if let Some(place) = first_field(json, &["locality", "city"]) {
		parts.push(place);
	}
	if let Some(region) = first_field(json, &["principalSubdivision"]) {
		parts.push(region);
	}
	if let Some(country) = first_field(json, &["countryName"]) {
		parts.push(country);
	}

	join_parts(parts)
}

fn first_field<'a>(object: &'a Value, keys: &[&str]) -> Option<&'a str> {
	keys.iter()
		.filter_map(|key| object.get(*key).and_then(Value::as_str))
		.map(str::trim)
		.find(|value| !value.is_empty())
}

fn join_parts(parts: Vec<&str>) -> Option<String> {
	if parts.is_empty() { None } else { Some(parts.join(", ")) }
}

fn geocoding_failed(err: reqwest::Error) -> Error {
	Error::Geocoding { message: err.to_string() }
}
