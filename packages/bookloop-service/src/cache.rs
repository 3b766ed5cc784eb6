use std::{collections::HashMap, sync::RwLock};

use time::OffsetDateTime;

use bookloop_domain::{ListingKind, PreferenceSignature};

/// A ranking computed for one user under one preference signature.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationCacheEntry {
	pub user_id: String,
	pub signature: PreferenceSignature,
	pub ranked_ids: Vec<String>,
	pub stored_at: OffsetDateTime,
}
impl RecommendationCacheEntry {
	pub fn new(
		user_id: impl Into<String>,
		signature: PreferenceSignature,
		ranked_ids: Vec<String>,
	) -> Self {
		Self {
			user_id: user_id.into(),
			signature,
			ranked_ids,
			stored_at: OffsetDateTime::now_utc(),
		}
	}

	/// Usable only under the same signature and only when it holds at least one id.
	pub fn is_valid_for(&self, signature: &PreferenceSignature) -> bool {
		&self.signature == signature && !self.ranked_ids.is_empty()
	}
}

/// Process-local, last-write-wins map from (kind, user) to the latest ranking.
///
/// Entries are never expired by time. A changed signature makes the old entry unusable, and the
/// next successful ranking overwrites it.
#[derive(Debug, Default)]
pub struct RecommendationCache {
	entries: RwLock<HashMap<(ListingKind, String), RecommendationCacheEntry>>,
}
impl RecommendationCache {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, kind: ListingKind, user_id: &str) -> Option<RecommendationCacheEntry> {
		let entries = self.entries.read().unwrap_or_else(|err| err.into_inner());

		entries.get(&(kind, user_id.to_string())).cloned()
	}

	/// Stores `entry` under its own user id, replacing any previous entry.
	pub fn put(&self, kind: ListingKind, entry: RecommendationCacheEntry) {
		let mut entries = self.entries.write().unwrap_or_else(|err| err.into_inner());

		entries.insert((kind, entry.user_id.clone()), entry);
	}

	pub fn len(&self) -> usize {
		self.entries.read().unwrap_or_else(|err| err.into_inner()).len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}
