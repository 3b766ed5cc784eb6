pub mod cache;
pub mod discover;
pub mod geocode;
pub mod recommend;

mod error;

pub use bookloop_storage::BoxFuture;
pub use cache::{RecommendationCache, RecommendationCacheEntry};
pub use discover::{CandidateSet, DiscoverRequest, DiscoverResponse, DiscoveryScope};
pub use error::{Error, Result};
pub use geocode::{LocateRequest, LocateResponse};
pub use recommend::{RecommendRequest, RecommendResponse, RecommendUser, RecommendationSource};

use std::{future::Future, sync::Arc, time::Duration};

use bookloop_config::{Config, Geocoding, GeocodingProvider, OracleConfig};
use bookloop_providers::{geocode as provider_geocode, oracle, oracle::RankingRequest};
use bookloop_storage::Store;

pub trait RankingOracle
where
	Self: Send + Sync,
{
	fn rank<'a>(
		&'a self,
		cfg: Option<&'a OracleConfig>,
		request: &'a RankingRequest,
	) -> BoxFuture<'a, bookloop_providers::Result<Vec<String>>>;
}

/// One reverse geocoding strategy. `Ok(None)` and `Err` both hand over to the next strategy.
pub trait ReverseGeocoder
where
	Self: Send + Sync,
{
	fn name(&self) -> &str;

	fn reverse<'a>(
		&'a self,
		lat: f64,
		lng: f64,
	) -> BoxFuture<'a, bookloop_providers::Result<Option<String>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub oracle: Arc<dyn RankingOracle>,
	/// Tried in order; the first non-empty answer wins.
	pub geocoders: Vec<Arc<dyn ReverseGeocoder>>,
}
impl Providers {
	pub fn from_config(cfg: &Config) -> Self {
		let geocoders = cfg
			.geocoding
			.providers
			.iter()
			.map(|provider| {
				Arc::new(HttpGeocoder { cfg: cfg.geocoding.clone(), provider: provider.clone() })
					as Arc<dyn ReverseGeocoder>
			})
			.collect();

		Self { oracle: Arc::new(HttpOracle), geocoders }
	}
}

pub struct BookloopService {
	pub cfg: Config,
	pub store: Arc<dyn Store>,
	pub providers: Providers,
	pub cache: Arc<RecommendationCache>,
}
impl BookloopService {
	pub fn new(
		cfg: Config,
		store: Arc<dyn Store>,
		providers: Providers,
		cache: Arc<RecommendationCache>,
	) -> Self {
		Self { cfg, store, providers, cache }
	}

	/// Bounds one store call by `storage.timeout_ms`.
	pub(crate) async fn store_call<T, F>(&self, operation: &str, fut: F) -> Result<T>
	where
		F: Future<Output = bookloop_storage::Result<T>>,
	{
		let timeout = Duration::from_millis(self.cfg.storage.timeout_ms);

		match tokio::time::timeout(timeout, fut).await {
			Ok(result) => result.map_err(|err| {
				tracing::error!(operation, error = %err, "Store call failed.");

				Error::from(err)
			}),
			Err(_) => {
				tracing::error!(operation, timeout_ms = self.cfg.storage.timeout_ms, "Store call timed out.");

				Err(Error::StoreUnavailable { message: format!("{operation} timed out.") })
			},
		}
	}
}

struct HttpOracle;
impl RankingOracle for HttpOracle {
	fn rank<'a>(
		&'a self,
		cfg: Option<&'a OracleConfig>,
		request: &'a RankingRequest,
	) -> BoxFuture<'a, bookloop_providers::Result<Vec<String>>> {
		Box::pin(oracle::rank(cfg, request))
	}
}

struct HttpGeocoder {
	cfg: Geocoding,
	provider: GeocodingProvider,
}
impl ReverseGeocoder for HttpGeocoder {
	fn name(&self) -> &str {
		self.provider.api_base.as_str()
	}

	fn reverse<'a>(
		&'a self,
		lat: f64,
		lng: f64,
	) -> BoxFuture<'a, bookloop_providers::Result<Option<String>>> {
		Box::pin(provider_geocode::reverse(&self.cfg, &self.provider, lat, lng))
	}
}
