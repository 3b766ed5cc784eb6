pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Scratch database {name} failed: {source}")]
	Admin { name: String, source: sqlx::Error },

	#[error(transparent)]
	Storage(#[from] bookloop_storage::Error),
}
