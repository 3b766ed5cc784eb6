//! Client for the external ranking oracle, an OpenAI-compatible chat completion endpoint that
//! orders candidate ids for one user.

use std::{collections::HashSet, time::Duration};

use reqwest::Client;
use serde::Serialize;
use serde_json::{Map, Value};

use bookloop_config::OracleConfig;
use bookloop_domain::{Candidate, ListingKind, PreferenceProfile, UserContext};

use crate::{Error, Result};

const BOOK_INSTRUCTIONS: &str = "\
You rank books for a peer-to-peer book sharing app.
Rules:
1. Reply with one JSON object and nothing else. No prose, no markdown.
2. The object has exactly one key, \"bookIds\", holding an array of strings.
3. Order ids from best to worst match and return at most \"topK\" of them.
4. Every id must be copied from \"candidates\". Never invent ids.
Schema: {\"bookIds\": [\"<candidate id>\", ...]}";
const CIRCLE_INSTRUCTIONS: &str = "\
You rank reading circles for a peer-to-peer book sharing app.
Rules:
1. Reply with one JSON object and nothing else. No prose, no markdown.
2. The object has exactly one key, \"circleIds\", holding an array of strings.
3. Order ids from best to worst match and return at most \"topK\" of them.
4. Every id must be copied from \"candidates\". Never invent ids.
Schema: {\"circleIds\": [\"<candidate id>\", ...]}";

#[derive(Debug, Clone, Serialize)]
pub struct RankingUser {
	pub id: String,
	#[serde(flatten)]
	pub profile: PreferenceProfile,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankingCandidate {
	pub id: String,
	#[serde(flatten)]
	pub fields: Map<String, Value>,
}

#[derive(Debug, Clone)]
pub struct RankingRequest {
	pub kind: ListingKind,
	pub top_k: usize,
	pub user: RankingUser,
	pub candidates: Vec<RankingCandidate>,
}
impl RankingRequest {
	pub fn new<C>(user: &UserContext, candidates: &[C], top_k: usize) -> Self
	where
		C: Candidate,
	{
		Self {
			kind: C::KIND,
			top_k,
			user: RankingUser { id: user.user_id.clone(), profile: user.profile.clone() },
			candidates: candidates
				.iter()
				.map(|candidate| RankingCandidate {
					id: candidate.id().to_string(),
					fields: candidate.oracle_fields(),
				})
				.collect(),
		}
	}
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OraclePayload<'a> {
	model: &'a str,
	instructions: &'a str,
	top_k: usize,
	user: &'a RankingUser,
	candidates: &'a [RankingCandidate],
}

pub fn instructions(kind: ListingKind) -> &'static str {
	match kind {
		ListingKind::Book => BOOK_INSTRUCTIONS,
		ListingKind::Circle => CIRCLE_INSTRUCTIONS,
	}
}

/// Ranks the request's candidates through the oracle.
///
/// Fails with [`Error::OracleUnavailable`] when no oracle or credential is configured. Any
/// returned list is non-empty, duplicate-free, limited to `top_k` and drawn from the request's
/// candidate ids.
pub async fn rank(cfg: Option<&OracleConfig>, request: &RankingRequest) -> Result<Vec<String>> {
	let Some(cfg) = cfg else {
		return Err(Error::OracleUnavailable);
	};
	let Some(api_key) = cfg.api_key.as_deref().filter(|key| !key.trim().is_empty()) else {
		return Err(Error::OracleUnavailable);
	};
	let client = Client::builder()
		.timeout(Duration::from_millis(cfg.timeout_ms))
		.build()
		.map_err(call_failed)?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let instructions = instructions(request.kind);
	let payload = OraclePayload {
		model: cfg.model.as_str(),
		instructions,
		top_k: request.top_k,
		user: &request.user,
		candidates: &request.candidates,
	};
	let content = serde_json::to_string(&payload)
		.map_err(|err| Error::InvalidConfig { message: format!("Failed to encode payload: {err}") })?;
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"messages": [
			{ "role": "system", "content": instructions },
			{ "role": "user", "content": content },
		],
	});

	tracing::debug!(
		provider_id = %cfg.provider_id,
		kind = request.kind.as_str(),
		user_id = %request.user.id,
		candidates = request.candidates.len(),
		top_k = request.top_k,
		"Sending ranking oracle request."
	);

	let res = client
		.post(url)
		.headers(crate::auth_headers(api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await
		.map_err(call_failed)?;

	tracing::debug!(status = res.status().as_u16(), "Ranking oracle responded.");

	let raw = res.error_for_status().map_err(call_failed)?.bytes().await.map_err(call_failed)?;
	let json: Value = serde_json::from_slice(&raw).map_err(|err| Error::OracleMalformedResponse {
		message: format!("Response body is not JSON: {err}"),
	})?;
	let ids = parse_ranking_response(&json, request.kind)?;

	validate_ranked_ids(ids, request)
}

/// Extracts the ranked ids from a chat completion body.
pub fn parse_ranking_response(json: &Value, kind: ListingKind) -> Result<Vec<String>> {
	let content = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
		.ok_or_else(|| malformed("Response is missing choices[0].message.content."))?;

	parse_ranked_ids(content, kind)
}

/// Parses message content that must hold exactly one object keyed by the kind's response key.
pub fn parse_ranked_ids(content: &str, kind: ListingKind) -> Result<Vec<String>> {
	let (Some(start), Some(end)) = (content.find('{'), content.rfind('}')) else {
		return Err(malformed("Content does not contain a JSON object."));
	};

	if end <= start {
		return Err(malformed("Content does not contain a JSON object."));
	}

	let parsed: Value = serde_json::from_str(&content[start..=end])
		.map_err(|err| malformed(format!("Content is not valid JSON: {err}")))?;
	let Value::Object(object) = parsed else {
		return Err(malformed("Content is not a JSON object."));
	};
	let key = kind.response_key();

	if object.len() != 1 {
		return Err(malformed(format!("Expected exactly one key {key:?}, found {}.", object.len())));
	}

	let Some(Value::Array(items)) = object.get(key) else {
		return Err(malformed(format!("Expected key {key:?} holding an array.")));
	};

	items
		.iter()
		.map(|item| {
			item.as_str().map(str::to_string).ok_or_else(|| malformed("Ranked ids must be strings."))
		})
		.collect()
}

/// Drops ids absent from the request, collapses duplicates keeping the first occurrence, and
/// truncates to `top_k`. An empty outcome is a malformed response, never an empty success.
pub fn validate_ranked_ids(ids: Vec<String>, request: &RankingRequest) -> Result<Vec<String>> {
	let known: HashSet<&str> =
		request.candidates.iter().map(|candidate| candidate.id.as_str()).collect();
	let mut seen = HashSet::new();
	let mut dropped = 0_usize;
	let mut ranked = Vec::new();

	for id in ids {
		if !known.contains(id.as_str()) {
			dropped += 1;

			continue;
		}
		if ranked.len() < request.top_k && seen.insert(id.clone()) {
			ranked.push(id);
		}
	}

	if dropped > 0 {
		tracing::warn!(dropped, kind = request.kind.as_str(), "Oracle returned unknown ids.");
	}
	if ranked.is_empty() {
		return Err(malformed("No usable ids remain after validation."));
	}

	Ok(ranked)
}

fn call_failed(err: reqwest::Error) -> Error {
	Error::OracleCallFailed { message: err.to_string() }
}

fn malformed(message: impl Into<String>) -> Error {
	Error::OracleMalformedResponse { message: message.into() }
}
