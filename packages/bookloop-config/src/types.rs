use std::path::PathBuf;

use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	#[serde(default)]
	pub discovery: Discovery,
	#[serde(default)]
	pub recommend: Recommend,
	/// Optional. Without it, or with a blank `api_key`, recommendations use the local heuristic.
	pub oracle: Option<OracleConfig>,
	#[serde(default)]
	pub geocoding: Geocoding,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub backend: StorageBackend,
	#[serde(default = "default_store_timeout_ms")]
	pub timeout_ms: u64,
	pub postgres: Option<Postgres>,
	pub memory: Option<MemoryStorage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
	Postgres,
	Memory,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Default, Deserialize)]
pub struct MemoryStorage {
	/// JSON document with `users` and `listings` arrays loaded at startup.
	pub seed_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
pub struct Discovery {
	#[serde(default = "default_radius_m")]
	pub default_radius_m: f64,
	#[serde(default = "default_max_radius_m")]
	pub max_radius_m: f64,
}
impl Default for Discovery {
	fn default() -> Self {
		Self { default_radius_m: default_radius_m(), max_radius_m: default_max_radius_m() }
	}
}

#[derive(Debug, Deserialize)]
pub struct Recommend {
	#[serde(default = "default_items_top_k")]
	pub items_top_k: u32,
	#[serde(default = "default_groups_top_k")]
	pub groups_top_k: u32,
	#[serde(default = "default_max_top_k")]
	pub max_top_k: u32,
}
impl Default for Recommend {
	fn default() -> Self {
		Self {
			items_top_k: default_items_top_k(),
			groups_top_k: default_groups_top_k(),
			max_top_k: default_max_top_k(),
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct OracleConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: Option<String>,
	pub path: String,
	pub model: String,
	#[serde(default = "default_temperature")]
	pub temperature: f32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}
impl OracleConfig {
	pub fn is_configured(&self) -> bool {
		self.api_key.as_deref().map(|key| !key.trim().is_empty()).unwrap_or(false)
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Geocoding {
	#[serde(default = "default_geocoding_timeout_ms")]
	pub timeout_ms: u64,
	#[serde(default = "default_user_agent")]
	pub user_agent: String,
	#[serde(default)]
	pub providers: Vec<GeocodingProvider>,
}
impl Default for Geocoding {
	fn default() -> Self {
		Self {
			timeout_ms: default_geocoding_timeout_ms(),
			user_agent: default_user_agent(),
			providers: Vec::new(),
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingProvider {
	pub kind: GeocodingProviderKind,
	pub api_base: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeocodingProviderKind {
	Nominatim,
	Bigdatacloud,
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_store_timeout_ms() -> u64 {
	5_000
}

fn default_radius_m() -> f64 {
	5_000.0
}

fn default_max_radius_m() -> f64 {
	100_000.0
}

fn default_items_top_k() -> u32 {
	8
}

fn default_groups_top_k() -> u32 {
	6
}

fn default_max_top_k() -> u32 {
	50
}

fn default_temperature() -> f32 {
	0.2
}

fn default_geocoding_timeout_ms() -> u64 {
	4_000
}

fn default_user_agent() -> String {
	concat!("bookloop/", env!("CARGO_PKG_VERSION")).to_string()
}
