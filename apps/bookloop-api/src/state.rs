use std::sync::Arc;

use color_eyre::eyre;

use bookloop_config::{Config, StorageBackend};
use bookloop_service::{BookloopService, Providers, RecommendationCache};
use bookloop_storage::{Store, db::Db, memory::MemoryStore};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<BookloopService>,
}
impl AppState {
	pub async fn new(config: Config) -> color_eyre::Result<Self> {
		let store: Arc<dyn Store> = match config.storage.backend {
			StorageBackend::Postgres => {
				let Some(postgres) = config.storage.postgres.as_ref() else {
					return Err(eyre::eyre!("storage.postgres is required for the postgres backend."));
				};
				let db = Db::connect(postgres).await?;

				db.ensure_schema().await?;

				Arc::new(db)
			},
			StorageBackend::Memory => {
				match config.storage.memory.as_ref().and_then(|memory| memory.seed_path.as_deref()) {
					Some(path) => Arc::new(MemoryStore::load(path)?),
					None => {
						tracing::warn!("In-memory store started without a seed.");

						Arc::new(MemoryStore::new())
					},
				}
			},
		};
		let providers = Providers::from_config(&config);

		Ok(Self::from_parts(config, store, providers))
	}

	/// Wires a service with a fresh recommendation cache.
	pub fn from_parts(config: Config, store: Arc<dyn Store>, providers: Providers) -> Self {
		let cache = Arc::new(RecommendationCache::new());
		let service = BookloopService::new(config, store, providers, cache);

		Self { service: Arc::new(service) }
	}
}
