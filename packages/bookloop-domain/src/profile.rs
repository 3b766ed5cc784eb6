use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

const SIGNATURE_SCHEMA_VERSION: u64 = 1;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
	/// Tag preferences. Matched against book genres and circle descriptions.
	#[serde(default)]
	pub genres: BTreeSet<String>,
	#[serde(default)]
	pub authors: BTreeSet<String>,
	#[serde(default)]
	pub languages: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OwnedItemSummary {
	pub id: String,
	pub title: String,
	pub category: String,
	pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupSummary {
	pub id: String,
	pub name: String,
}

/// Read-only view of everything that shapes a user's recommendations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceProfile {
	#[serde(default)]
	pub bio: String,
	#[serde(default)]
	pub preferences: Preferences,
	#[serde(default)]
	pub owned_items: Vec<OwnedItemSummary>,
	#[serde(default)]
	pub joined_groups: Vec<GroupSummary>,
}
impl PreferenceProfile {
	/// Same logical profile with every sequence in identity order.
	pub fn canonical(&self) -> Self {
		let mut owned_items = self.owned_items.clone();
		let mut joined_groups = self.joined_groups.clone();

		// Derived Ord compares `id` first, so this is identity order with a total tie-break.
		owned_items.sort();
		joined_groups.sort();

		Self {
			bio: self.bio.clone(),
			preferences: self.preferences.clone(),
			owned_items,
			joined_groups,
		}
	}
}

/// A profile plus the raw identifiers the self-exclusion filter needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContext {
	pub user_id: String,
	pub profile: PreferenceProfile,
	/// Membership as recorded on the user, including circles that no longer resolve.
	pub joined_group_ids: BTreeSet<String>,
}
impl UserContext {
	pub fn owns_item(&self, item_id: &str) -> bool {
		self.profile.owned_items.iter().any(|item| item.id == item_id)
	}

	pub fn has_joined(&self, group_id: &str) -> bool {
		self.joined_group_ids.contains(group_id)
			|| self.profile.joined_groups.iter().any(|group| group.id == group_id)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreferenceSignature(String);
impl PreferenceSignature {
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl std::fmt::Display for PreferenceSignature {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}

pub fn build_signature(profile: &PreferenceProfile) -> PreferenceSignature {
	let canonical = profile.canonical();
	let mut hasher = SignatureHasher::default();

	hasher.number(SIGNATURE_SCHEMA_VERSION);
	hasher.text(&canonical.bio);

	for set in
		[&canonical.preferences.genres, &canonical.preferences.authors, &canonical.preferences.languages]
	{
		hasher.number(set.len() as u64);

		for value in set {
			hasher.text(value);
		}
	}

	hasher.number(canonical.owned_items.len() as u64);

	for item in &canonical.owned_items {
		for field in [&item.id, &item.title, &item.category, &item.language] {
			hasher.text(field);
		}
	}

	hasher.number(canonical.joined_groups.len() as u64);

	for group in &canonical.joined_groups {
		hasher.text(&group.id);
		hasher.text(&group.name);
	}

	PreferenceSignature(hasher.0.finalize().to_hex().to_string())
}

/// Length-prefixed field encoding, so adjacent fields never run together.
#[derive(Default)]
struct SignatureHasher(blake3::Hasher);
impl SignatureHasher {
	fn number(&mut self, value: u64) {
		self.0.update(&value.to_le_bytes());
	}

	fn text(&mut self, value: &str) {
		self.number(value.len() as u64);
		self.0.update(value.as_bytes());
	}
}
