use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use bookloop_config::{Config, GeocodingProviderKind, StorageBackend};

const SAMPLE_CONFIG_TEMPLATE_TOML: &str = include_str!("fixtures/sample_config.template.toml");

fn sample_toml() -> String {
	SAMPLE_CONFIG_TEMPLATE_TOML.to_string()
}

fn sample_toml_with(section: &str, key: &str, value: Value) -> String {
	let mut root: Value =
		toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse template config.");
	let table = root
		.as_table_mut()
		.expect("Template config must be a table.")
		.get_mut(section)
		.and_then(Value::as_table_mut)
		.expect("Template config must include the requested section.");

	table.insert(key.to_string(), value);

	toml::to_string(&root).expect("Failed to render template config.")
}

fn write_temp_config(payload: String) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("bookloop_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn load_payload(payload: String) -> bookloop_config::Result<Config> {
	let path = write_temp_config(payload);
	let result = bookloop_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	result
}

fn base_config() -> Config {
	toml::from_str(&sample_toml()).expect("Failed to parse test config.")
}

#[test]
fn sample_config_loads_and_normalizes() {
	let cfg = load_payload(sample_toml()).expect("Sample config must be valid.");

	assert_eq!(cfg.storage.backend, StorageBackend::Memory);
	assert_eq!(cfg.recommend.items_top_k, 8);
	assert_eq!(cfg.recommend.groups_top_k, 6);

	let oracle = cfg.oracle.as_ref().expect("Sample config declares an oracle.");

	assert!(oracle.api_key.is_none(), "Blank api_key must normalize to None.");
	assert!(!oracle.is_configured());
	assert!(cfg.storage.memory.as_ref().and_then(|memory| memory.seed_path.as_ref()).is_none());
	assert_eq!(cfg.geocoding.providers.len(), 2);
	assert_eq!(cfg.geocoding.providers[0].kind, GeocodingProviderKind::Nominatim);
	assert_eq!(cfg.geocoding.providers[0].api_base, "https://nominatim.openstreetmap.org");
}

#[test]
fn oracle_with_key_is_configured() {
	let payload = sample_toml_with("oracle", "api_key", Value::String("secret".to_string()));
	let cfg = load_payload(payload).expect("Config must be valid.");

	assert!(cfg.oracle.as_ref().map(|oracle| oracle.is_configured()).unwrap_or(false));
}

#[test]
fn oracle_timeout_must_be_positive() {
	let payload = sample_toml_with("oracle", "timeout_ms", Value::Integer(0));
	let err = load_payload(payload).expect_err("Expected oracle timeout validation error.");

	assert!(
		err.to_string().contains("oracle.timeout_ms must be greater than zero."),
		"Unexpected error: {err}"
	);
}

#[test]
fn missing_sections_fall_back_to_defaults() {
	let payload = "\
[service]
http_bind = \"127.0.0.1:0\"

[storage]
backend = \"memory\"
"
	.to_string();
	let cfg = load_payload(payload).expect("Minimal config must be valid.");

	assert_eq!(cfg.service.log_level, "info");
	assert_eq!(cfg.storage.timeout_ms, 5_000);
	assert_eq!(cfg.discovery.default_radius_m, 5_000.0);
	assert!(cfg.oracle.is_none());
	assert!(cfg.geocoding.providers.is_empty());
}

#[test]
fn postgres_backend_requires_postgres_section() {
	let mut cfg = base_config();

	cfg.storage.backend = StorageBackend::Postgres;
	cfg.storage.postgres = None;

	let err = bookloop_config::validate(&cfg).expect_err("Expected postgres validation error.");

	assert!(
		err.to_string()
			.contains("storage.postgres is required when storage.backend is postgres."),
		"Unexpected error: {err}"
	);
}

#[test]
fn discovery_radius_must_be_positive_and_finite() {
	let mut cfg = base_config();

	cfg.discovery.default_radius_m = f64::NAN;

	let err = bookloop_config::validate(&cfg).expect_err("Expected radius validation error.");

	assert!(
		err.to_string().contains("discovery.default_radius_m must be a positive finite number."),
		"Unexpected error: {err}"
	);

	cfg = base_config();
	cfg.discovery.default_radius_m = 200_000.0;

	let err = bookloop_config::validate(&cfg).expect_err("Expected radius bound error.");

	assert!(
		err.to_string()
			.contains("discovery.default_radius_m must not exceed discovery.max_radius_m."),
		"Unexpected error: {err}"
	);
}

#[test]
fn recommend_defaults_must_fit_max_top_k() {
	let mut cfg = base_config();

	cfg.recommend.items_top_k = 51;

	let err = bookloop_config::validate(&cfg).expect_err("Expected top_k validation error.");

	assert!(
		err.to_string().contains("recommend.items_top_k must be in the range 1-recommend.max_top_k."),
		"Unexpected error: {err}"
	);
}

#[test]
fn oracle_default_headers_must_be_strings() {
	let mut cfg = base_config();
	let oracle = cfg.oracle.as_mut().expect("Sample config declares an oracle.");

	oracle.default_headers.insert("X-Retries".to_string(), serde_json::json!(3));

	let err = bookloop_config::validate(&cfg).expect_err("Expected header validation error.");

	assert!(
		err.to_string().contains("oracle.default_headers values must be strings."),
		"Unexpected error: {err}"
	);
}

#[test]
fn unknown_storage_backend_is_a_parse_error() {
	let payload = sample_toml_with("storage", "backend", Value::String("mongo".to_string()));
	let err = load_payload(payload).expect_err("Expected parse error.");

	assert!(matches!(err, bookloop_config::Error::ParseConfig { .. }), "Unexpected error: {err}");
}
