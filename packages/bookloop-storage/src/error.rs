#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Sqlx(#[from] sqlx::Error),
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),
	#[error("Failed to read seed file at {path:?}.")]
	ReadSeed { path: std::path::PathBuf, source: std::io::Error },
	#[error("Failed to parse seed file at {path:?}.")]
	ParseSeed { path: std::path::PathBuf, source: serde_json::Error },
}
