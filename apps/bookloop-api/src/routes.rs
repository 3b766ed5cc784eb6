use axum::{
	Json, Router,
	extract::{
		Query, State,
		rejection::{JsonRejection, QueryRejection},
	},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;

use bookloop_domain::{BookCandidate, CircleCandidate, ListingKind};
use bookloop_service::{
	DiscoverRequest, DiscoverResponse, Error as ServiceError, LocateRequest, LocateResponse,
	RecommendRequest, RecommendResponse,
};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/discover", get(discover_items))
		.route("/discover/groups", get(discover_groups))
		.route("/recommend/items", post(recommend_items))
		.route("/recommend/groups", post(recommend_groups))
		.route("/geocode/reverse", get(reverse_geocode))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn discover_items(
	State(state): State<AppState>,
	query: Result<Query<DiscoverRequest>, QueryRejection>,
) -> Result<Json<DiscoverResponse>, ApiError> {
	let Query(req) = query?;
	let response = state.service.discover(ListingKind::Book, req).await?;

	Ok(Json(response))
}

async fn discover_groups(
	State(state): State<AppState>,
	query: Result<Query<DiscoverRequest>, QueryRejection>,
) -> Result<Json<DiscoverResponse>, ApiError> {
	let Query(req) = query?;
	let response = state.service.discover(ListingKind::Circle, req).await?;

	Ok(Json(response))
}

async fn recommend_items(
	State(state): State<AppState>,
	payload: Result<Json<RecommendRequest<BookCandidate>>, JsonRejection>,
) -> Result<Json<RecommendResponse>, ApiError> {
	let Json(req) = payload?;
	let response = state.service.recommend(req).await?;

	Ok(Json(response))
}

async fn recommend_groups(
	State(state): State<AppState>,
	payload: Result<Json<RecommendRequest<CircleCandidate>>, JsonRejection>,
) -> Result<Json<RecommendResponse>, ApiError> {
	let Json(req) = payload?;
	let response = state.service.recommend(req).await?;

	Ok(Json(response))
}

async fn reverse_geocode(
	State(state): State<AppState>,
	query: Result<Query<LocateRequest>, QueryRejection>,
) -> Result<Json<LocateResponse>, ApiError> {
	let Query(req) = query?;
	let response = state.service.locate(req).await?;

	Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}
impl ApiError {
	fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.into(), message: message.into() }
	}
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::InvalidQuery { message } => {
				ApiError::new(StatusCode::BAD_REQUEST, "INVALID_QUERY", message)
			},
			ServiceError::NotFound { message } => {
				ApiError::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
			},
			ServiceError::OracleCallFailed { message } => {
				ApiError::new(StatusCode::BAD_GATEWAY, "ORACLE_CALL_FAILED", message)
			},
			ServiceError::OracleMalformedResponse { message } => {
				ApiError::new(StatusCode::BAD_GATEWAY, "ORACLE_MALFORMED_RESPONSE", message)
			},
			ServiceError::StoreUnavailable { message } => {
				ApiError::new(StatusCode::SERVICE_UNAVAILABLE, "STORE_UNAVAILABLE", message)
			},
		}
	}
}

impl From<JsonRejection> for ApiError {
	fn from(err: JsonRejection) -> Self {
		ApiError::new(StatusCode::BAD_REQUEST, "INVALID_QUERY", err.body_text())
	}
}

impl From<QueryRejection> for ApiError {
	fn from(err: QueryRejection) -> Self {
		ApiError::new(StatusCode::BAD_REQUEST, "INVALID_QUERY", err.body_text())
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		if self.status.is_server_error() {
			tracing::warn!(
				status = self.status.as_u16(),
				error_code = %self.error_code,
				message = %self.message,
				"Request failed."
			);
		}

		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}
