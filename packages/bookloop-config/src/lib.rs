mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, Discovery, Geocoding, GeocodingProvider, GeocodingProviderKind, MemoryStorage,
	OracleConfig, Postgres, Recommend, Service, Storage, StorageBackend,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;
	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "storage.timeout_ms must be greater than zero.".to_string(),
		});
	}

	match cfg.storage.backend {
		StorageBackend::Postgres => {
			let Some(postgres) = cfg.storage.postgres.as_ref() else {
				return Err(Error::Validation {
					message: "storage.postgres is required when storage.backend is postgres."
						.to_string(),
				});
			};

			if postgres.dsn.trim().is_empty() {
				return Err(Error::Validation {
					message: "storage.postgres.dsn must be non-empty.".to_string(),
				});
			}
			if postgres.pool_max_conns == 0 {
				return Err(Error::Validation {
					message: "storage.postgres.pool_max_conns must be greater than zero."
						.to_string(),
				});
			}
		},
		StorageBackend::Memory => {},
	}

	for (label, value) in [
		("discovery.default_radius_m", cfg.discovery.default_radius_m),
		("discovery.max_radius_m", cfg.discovery.max_radius_m),
	] {
		if !value.is_finite() || value <= 0.0 {
			return Err(Error::Validation {
				message: format!("{label} must be a positive finite number."),
			});
		}
	}

	if cfg.discovery.default_radius_m > cfg.discovery.max_radius_m {
		return Err(Error::Validation {
			message: "discovery.default_radius_m must not exceed discovery.max_radius_m."
				.to_string(),
		});
	}
	if cfg.recommend.max_top_k == 0 {
		return Err(Error::Validation {
			message: "recommend.max_top_k must be greater than zero.".to_string(),
		});
	}

	for (label, value) in [
		("recommend.items_top_k", cfg.recommend.items_top_k),
		("recommend.groups_top_k", cfg.recommend.groups_top_k),
	] {
		if value == 0 || value > cfg.recommend.max_top_k {
			return Err(Error::Validation {
				message: format!("{label} must be in the range 1-recommend.max_top_k."),
			});
		}
	}

	if let Some(oracle) = cfg.oracle.as_ref() {
		for (label, value) in [
			("oracle.provider_id", &oracle.provider_id),
			("oracle.api_base", &oracle.api_base),
			("oracle.model", &oracle.model),
		] {
			if value.trim().is_empty() {
				return Err(Error::Validation { message: format!("{label} must be non-empty.") });
			}
		}

		if oracle.timeout_ms == 0 {
			return Err(Error::Validation {
				message: "oracle.timeout_ms must be greater than zero.".to_string(),
			});
		}
		if !oracle.temperature.is_finite() || !(0.0..=2.0).contains(&oracle.temperature) {
			return Err(Error::Validation {
				message: "oracle.temperature must be in the range 0.0-2.0.".to_string(),
			});
		}
		if oracle.default_headers.values().any(|value| !value.is_string()) {
			return Err(Error::Validation {
				message: "oracle.default_headers values must be strings.".to_string(),
			});
		}
	}

	if cfg.geocoding.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "geocoding.timeout_ms must be greater than zero.".to_string(),
		});
	}

	for provider in &cfg.geocoding.providers {
		if provider.api_base.trim().is_empty() {
			return Err(Error::Validation {
				message: "geocoding.providers.api_base must be non-empty.".to_string(),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if let Some(oracle) = cfg.oracle.as_mut()
		&& oracle.api_key.as_deref().map(|key| key.trim().is_empty()).unwrap_or(false)
	{
		oracle.api_key = None;
	}
	if let Some(memory) = cfg.storage.memory.as_mut()
		&& memory.seed_path.as_ref().map(|path| path.as_os_str().is_empty()).unwrap_or(false)
	{
		memory.seed_path = None;
	}

	for provider in &mut cfg.geocoding.providers {
		provider.api_base = provider.api_base.trim_end_matches('/').to_string();
	}
}
