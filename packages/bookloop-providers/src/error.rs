pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// No oracle endpoint or credential is configured. Callers fall back to local ranking.
	#[error("Ranking oracle is not configured.")]
	OracleUnavailable,
	#[error("Ranking oracle call failed: {message}")]
	OracleCallFailed { message: String },
	#[error("Ranking oracle returned a malformed response: {message}")]
	OracleMalformedResponse { message: String },
	#[error("Geocoding failed: {message}")]
	Geocoding { message: String },
	#[error(transparent)]
	InvalidHeaderName(#[from] reqwest::header::InvalidHeaderName),
	#[error(transparent)]
	InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),
	#[error("{message}")]
	InvalidConfig { message: String },
}
