//! Deterministic local ranking used whenever no ranking oracle is configured.

use std::cmp::Ordering;

use crate::{candidate::Candidate, profile::PreferenceProfile};

/// Ids of the `top_k` best-scoring candidates, best first. Equal scores keep input order.
pub fn rank<C>(profile: &PreferenceProfile, candidates: &[C], top_k: usize) -> Vec<String>
where
	C: Candidate,
{
	let mut scored: Vec<(usize, f64)> = candidates
		.iter()
		.enumerate()
		.map(|(position, candidate)| (position, candidate.heuristic_score(profile)))
		.collect();

	scored.sort_by(|(lhs_pos, lhs), (rhs_pos, rhs)| {
		rhs.partial_cmp(lhs).unwrap_or(Ordering::Equal).then(lhs_pos.cmp(rhs_pos))
	});

	scored
		.into_iter()
		.take(top_k)
		.map(|(position, _)| candidates[position].id().to_string())
		.collect()
}
