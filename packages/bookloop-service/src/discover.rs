//! Radius discovery. A listing is near when its own location is inside the radius, or when its
//! owner lives inside the radius.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use bookloop_domain::{GeoPoint, Listing, ListingKind};

use crate::{BookloopService, Error, Result};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DiscoverRequest {
	pub lat: Option<f64>,
	pub lng: Option<f64>,
	/// Meters. Defaults to `discovery.default_radius_m`.
	pub radius: Option<f64>,
	pub exclude_owner_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DiscoveryScope {
	/// No center was supplied, so every listing of the kind is returned.
	Everywhere,
	Within { center: GeoPoint, radius_m: f64 },
}

#[derive(Debug, Clone)]
pub struct CandidateSet {
	pub scope: DiscoveryScope,
	pub listings: Vec<Listing>,
}
impl CandidateSet {
	pub fn ids(&self) -> Vec<String> {
		self.listings.iter().map(|listing| listing.id.clone()).collect()
	}
}

#[derive(Debug, Clone, Serialize)]
pub struct DiscoverResponse {
	pub scope: DiscoveryScope,
	pub ids: Vec<String>,
	pub listings: Vec<Listing>,
}
impl From<CandidateSet> for DiscoverResponse {
	fn from(set: CandidateSet) -> Self {
		let ids = set.ids();

		Self { scope: set.scope, ids, listings: set.listings }
	}
}

impl BookloopService {
	pub async fn discover(&self, kind: ListingKind, req: DiscoverRequest) -> Result<DiscoverResponse> {
		// A center needs both coordinates; one alone means "no center".
		let center = match (req.lat, req.lng) {
			(Some(lat), Some(lng)) => Some(GeoPoint::new(lng, lat)?),
			_ => None,
		};
		let radius_m = req.radius.unwrap_or(self.cfg.discovery.default_radius_m);
		let exclude_owner_id =
			req.exclude_owner_id.as_deref().map(str::trim).filter(|id| !id.is_empty());
		let set = self.find_nearby(kind, center.as_ref(), radius_m, exclude_owner_id).await?;

		Ok(set.into())
	}

	/// Listings of `kind` near `center`, direct hits first and nearest first, then owner hits.
	pub async fn find_nearby(
		&self,
		kind: ListingKind,
		center: Option<&GeoPoint>,
		radius_m: f64,
		exclude_owner_id: Option<&str>,
	) -> Result<CandidateSet> {
		if !radius_m.is_finite() || radius_m <= 0.0 {
			return Err(Error::InvalidQuery {
				message: "radius must be a positive finite number of meters.".to_string(),
			});
		}
		if radius_m > self.cfg.discovery.max_radius_m {
			return Err(Error::InvalidQuery {
				message: format!(
					"radius must be at most {} meters.",
					self.cfg.discovery.max_radius_m
				),
			});
		}

		let Some(center) = center else {
			let listings = self.store_call("all_listings", self.store.all_listings(kind)).await?;

			tracing::debug!(kind = kind.as_str(), count = listings.len(), "Discovery without center.");

			return Ok(CandidateSet {
				scope: DiscoveryScope::Everywhere,
				listings: merge_hits(listings, Vec::new(), exclude_owner_id),
			});
		};

		center.validate()?;

		let direct = self
			.store_call("listings_within", self.store.listings_within(kind, center, radius_m))
			.await?;
		let owners =
			self.store_call("owners_within", self.store.owners_within(center, radius_m)).await?;
		let owner_hits = if owners.is_empty() {
			Vec::new()
		} else {
			self.store_call("listings_by_owners", self.store.listings_by_owners(kind, &owners))
				.await?
		};
		let direct_count = direct.len();
		let owner_count = owner_hits.len();
		let listings = merge_hits(direct, owner_hits, exclude_owner_id);

		tracing::debug!(
			kind = kind.as_str(),
			radius_m,
			direct_count,
			owner_count,
			merged_count = listings.len(),
			"Discovery merged hits."
		);

		Ok(CandidateSet {
			scope: DiscoveryScope::Within { center: center.clone(), radius_m },
			listings,
		})
	}
}

/// Concatenates direct hits and owner hits, keeping the first occurrence of each id and dropping
/// listings owned by `exclude_owner_id`.
pub fn merge_hits(
	direct: Vec<Listing>,
	owner_hits: Vec<Listing>,
	exclude_owner_id: Option<&str>,
) -> Vec<Listing> {
	let mut seen = HashSet::new();

	direct
		.into_iter()
		.chain(owner_hits)
		.filter(|listing| exclude_owner_id != Some(listing.owner_id.as_str()))
		.filter(|listing| seen.insert(listing.id.clone()))
		.collect()
}
