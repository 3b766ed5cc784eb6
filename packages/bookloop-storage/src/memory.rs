//! Process-local store for development runs and tests.

use std::{collections::HashSet, fs, path::Path, sync::RwLock};

use bookloop_domain::{GeoPoint, Listing, ListingKind, UserContext};

use crate::{
	BoxFuture, Error, GeoIndex, ProfileStore, Result,
	models::{Seed, UserRecord},
};

#[derive(Default)]
struct Records {
	users: Vec<UserRecord>,
	listings: Vec<Listing>,
}

#[derive(Default)]
pub struct MemoryStore {
	records: RwLock<Records>,
}
impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn from_seed(seed: Seed) -> Result<Self> {
		let store = Self::new();

		for user in seed.users {
			store.insert_user(user)?;
		}
		for listing in seed.listings {
			store.insert_listing(listing)?;
		}

		Ok(store)
	}

	pub fn load(path: &Path) -> Result<Self> {
		let raw = fs::read_to_string(path)
			.map_err(|err| Error::ReadSeed { path: path.to_path_buf(), source: err })?;
		let seed: Seed = serde_json::from_str(&raw)
			.map_err(|err| Error::ParseSeed { path: path.to_path_buf(), source: err })?;
		let store = Self::from_seed(seed)?;

		tracing::info!(path = %path.display(), "Loaded in-memory store seed.");

		Ok(store)
	}

	/// Inserts or replaces a user by id.
	pub fn insert_user(&self, user: UserRecord) -> Result<()> {
		if let Some(location) = user.location.as_ref() {
			location.validate().map_err(|err| Error::InvalidArgument(err.to_string()))?;
		}

		let mut records = self.records.write().unwrap_or_else(|err| err.into_inner());

		match records.users.iter_mut().find(|existing| existing.id == user.id) {
			Some(existing) => *existing = user,
			None => records.users.push(user),
		}

		Ok(())
	}

	/// Inserts or replaces a listing by kind and id.
	pub fn insert_listing(&self, listing: Listing) -> Result<()> {
		if let Some(location) = listing.location.as_ref() {
			location.validate().map_err(|err| Error::InvalidArgument(err.to_string()))?;
		}

		let mut records = self.records.write().unwrap_or_else(|err| err.into_inner());

		match records
			.listings
			.iter_mut()
			.find(|existing| existing.kind() == listing.kind() && existing.id == listing.id)
		{
			Some(existing) => *existing = listing,
			None => records.listings.push(listing),
		}

		Ok(())
	}

	fn listings<F>(&self, kind: ListingKind, filter: F) -> Vec<Listing>
	where
		F: Fn(&Listing) -> bool,
	{
		let records = self.records.read().unwrap_or_else(|err| err.into_inner());

		records
			.listings
			.iter()
			.filter(|listing| listing.kind() == kind && filter(listing))
			.cloned()
			.collect()
	}
}

impl GeoIndex for MemoryStore {
	fn listings_within<'a>(
		&'a self,
		kind: ListingKind,
		center: &'a GeoPoint,
		radius_m: f64,
	) -> BoxFuture<'a, Result<Vec<Listing>>> {
		let mut hits: Vec<(f64, Listing)> = self
			.listings(kind, |listing| {
				listing.location.as_ref().map(|point| point.is_within(center, radius_m)).unwrap_or(false)
			})
			.into_iter()
			.map(|listing| {
				let distance =
					listing.location.as_ref().map(|point| point.distance_m(center)).unwrap_or(0.0);

				(distance, listing)
			})
			.collect();

		hits.sort_by(|(lhs, _), (rhs, _)| lhs.total_cmp(rhs));

		Box::pin(async move { Ok(hits.into_iter().map(|(_, listing)| listing).collect()) })
	}

	fn owners_within<'a>(
		&'a self,
		center: &'a GeoPoint,
		radius_m: f64,
	) -> BoxFuture<'a, Result<Vec<String>>> {
		let records = self.records.read().unwrap_or_else(|err| err.into_inner());
		let ids: Vec<String> = records
			.users
			.iter()
			.filter(|user| {
				user.location.as_ref().map(|point| point.is_within(center, radius_m)).unwrap_or(false)
			})
			.map(|user| user.id.clone())
			.collect();

		Box::pin(async move { Ok(ids) })
	}

	fn listings_by_owners<'a>(
		&'a self,
		kind: ListingKind,
		owner_ids: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Listing>>> {
		let owners: HashSet<&str> = owner_ids.iter().map(String::as_str).collect();
		let listings = self.listings(kind, |listing| owners.contains(listing.owner_id.as_str()));

		Box::pin(async move { Ok(listings) })
	}

	fn all_listings<'a>(&'a self, kind: ListingKind) -> BoxFuture<'a, Result<Vec<Listing>>> {
		let listings = self.listings(kind, |_| true);

		Box::pin(async move { Ok(listings) })
	}
}

impl ProfileStore for MemoryStore {
	fn load_user<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, Result<Option<UserContext>>> {
		let records = self.records.read().unwrap_or_else(|err| err.into_inner());
		let context = records.users.iter().find(|user| user.id == user_id).cloned().map(|user| {
			let joined: HashSet<&str> = user.circles_joined.iter().map(String::as_str).collect();
			let owned = records.listings.iter().filter(|listing| {
				listing.kind() == ListingKind::Book && listing.owner_id == user.id
			});
			let circles = records.listings.iter().filter(|listing| {
				listing.kind() == ListingKind::Circle && joined.contains(listing.id.as_str())
			});

			user.clone().into_context(owned, circles)
		});

		drop(records);

		Box::pin(async move { Ok(context) })
	}
}
