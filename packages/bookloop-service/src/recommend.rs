//! Personalized ranking of caller-supplied candidates.
//!
//! Order of work: resolve the user, reuse a cached ranking under an unchanged signature, drop the
//! user's own candidates, ask the oracle, fall back to the local heuristic only when no oracle is
//! configured, then cache the result.

use serde::{Deserialize, Serialize};

use bookloop_domain::{Candidate, ListingKind, build_signature, heuristic};
use bookloop_providers::oracle::RankingRequest;

use crate::{BookloopService, Error, RecommendationCacheEntry, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RecommendUser {
	pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RecommendRequest<C> {
	pub user: RecommendUser,
	#[serde(default = "Vec::new")]
	pub candidates: Vec<C>,
	pub top_k: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationSource {
	Cache,
	Oracle,
	Heuristic,
	/// Every candidate belonged to the user, or none were supplied.
	NoCandidates,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecommendResponse {
	pub ids: Vec<String>,
	pub source: RecommendationSource,
}

impl BookloopService {
	pub async fn recommend<C>(&self, req: RecommendRequest<C>) -> Result<RecommendResponse>
	where
		C: Candidate,
	{
		let kind = C::KIND;
		let top_k = self.resolve_top_k(kind, req.top_k)?;
		let user_id = req.user.id.trim();

		if user_id.is_empty() {
			return Err(Error::InvalidQuery { message: "user.id must be non-empty.".to_string() });
		}

		let Some(user) = self.store_call("load_user", self.store.load_user(user_id)).await? else {
			return Err(Error::NotFound { message: format!("User {user_id} does not exist.") });
		};
		let signature = build_signature(&user.profile);

		if let Some(entry) =
			self.cache.get(kind, user_id).filter(|entry| entry.is_valid_for(&signature))
		{
			tracing::info!(kind = kind.as_str(), user_id, "Serving cached recommendations.");

			let mut ids = entry.ranked_ids;

			ids.truncate(top_k);

			return Ok(RecommendResponse { ids, source: RecommendationSource::Cache });
		}

		let candidates: Vec<C> =
			req.candidates.into_iter().filter(|candidate| !candidate.belongs_to(&user)).collect();

		if candidates.is_empty() {
			tracing::info!(kind = kind.as_str(), user_id, "No candidates left after self-exclusion.");

			return Ok(RecommendResponse {
				ids: Vec::new(),
				source: RecommendationSource::NoCandidates,
			});
		}

		let request = RankingRequest::new(&user, &candidates, top_k);
		let (mut ids, source) =
			match self.providers.oracle.rank(self.cfg.oracle.as_ref(), &request).await {
				Ok(ids) => (ids, RecommendationSource::Oracle),
				Err(bookloop_providers::Error::OracleUnavailable) => {
					tracing::info!(
						kind = kind.as_str(),
						user_id,
						"Ranking oracle is not configured. Using heuristic ranking."
					);

					(heuristic::rank(&user.profile, &candidates, top_k), RecommendationSource::Heuristic)
				},
				Err(err) => {
					tracing::warn!(kind = kind.as_str(), user_id, error = %err, "Ranking oracle failed.");

					return Err(oracle_error(err));
				},
			};

		if !ids.is_empty() {
			self.cache.put(kind, RecommendationCacheEntry::new(user_id, signature, ids.clone()));

			tracing::info!(
				kind = kind.as_str(),
				user_id,
				count = ids.len(),
				source = ?source,
				"Cached recommendations."
			);
		}

		ids.truncate(top_k);

		Ok(RecommendResponse { ids, source })
	}

	fn resolve_top_k(&self, kind: ListingKind, requested: Option<u32>) -> Result<usize> {
		let recommend = &self.cfg.recommend;
		let top_k = requested.unwrap_or(match kind {
			ListingKind::Book => recommend.items_top_k,
			ListingKind::Circle => recommend.groups_top_k,
		});

		if top_k == 0 || top_k > recommend.max_top_k {
			return Err(Error::InvalidQuery {
				message: format!("topK must be between 1 and {}.", recommend.max_top_k),
			});
		}

		Ok(top_k as usize)
	}
}

fn oracle_error(err: bookloop_providers::Error) -> Error {
	match err {
		bookloop_providers::Error::OracleMalformedResponse { message } => {
			Error::OracleMalformedResponse { message }
		},
		bookloop_providers::Error::OracleCallFailed { message } => Error::OracleCallFailed { message },
		other => Error::OracleCallFailed { message: other.to_string() },
	}
}
