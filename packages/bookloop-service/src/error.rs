pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid query: {message}")]
	InvalidQuery { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Ranking oracle call failed: {message}")]
	OracleCallFailed { message: String },
	#[error("Ranking oracle returned a malformed response: {message}")]
	OracleMalformedResponse { message: String },
	#[error("Store unavailable: {message}")]
	StoreUnavailable { message: String },
}
impl From<bookloop_storage::Error> for Error {
	fn from(err: bookloop_storage::Error) -> Self {
		match err {
			bookloop_storage::Error::InvalidArgument(message) => Self::InvalidQuery { message },
			other => Self::StoreUnavailable { message: other.to_string() },
		}
	}
}

impl From<bookloop_domain::GeoError> for Error {
	fn from(err: bookloop_domain::GeoError) -> Self {
		Self::InvalidQuery { message: err.to_string() }
	}
}
