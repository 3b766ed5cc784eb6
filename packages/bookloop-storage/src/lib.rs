pub mod db;
pub mod memory;
pub mod models;
pub mod queries;
pub mod schema;

mod error;

pub use error::Error;

use std::{future::Future, pin::Pin};

use bookloop_domain::{GeoPoint, Listing, ListingKind, UserContext};

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Radius queries over stored locations. Distances are great-circle meters.
pub trait GeoIndex
where
	Self: Send + Sync,
{
	/// Listings whose own location lies within `radius_m` of `center`, nearest first.
	fn listings_within<'a>(
		&'a self,
		kind: ListingKind,
		center: &'a GeoPoint,
		radius_m: f64,
	) -> BoxFuture<'a, Result<Vec<Listing>>>;

	/// Ids of users whose profile location lies within `radius_m` of `center`.
	fn owners_within<'a>(
		&'a self,
		center: &'a GeoPoint,
		radius_m: f64,
	) -> BoxFuture<'a, Result<Vec<String>>>;

	fn listings_by_owners<'a>(
		&'a self,
		kind: ListingKind,
		owner_ids: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Listing>>>;

	fn all_listings<'a>(&'a self, kind: ListingKind) -> BoxFuture<'a, Result<Vec<Listing>>>;
}

pub trait ProfileStore
where
	Self: Send + Sync,
{
	fn load_user<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, Result<Option<UserContext>>>;
}

pub trait Store: GeoIndex + ProfileStore {}

impl<T> Store for T where T: GeoIndex + ProfileStore {}
