use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
	listing::ListingKind,
	profile::{PreferenceProfile, UserContext},
};

/// An item eligible for ranking in one recommendation request.
pub trait Candidate {
	const KIND: ListingKind;

	fn id(&self) -> &str;

	/// True when the item belongs to the requesting user and must never be recommended to them.
	fn belongs_to(&self, user: &UserContext) -> bool;

	fn heuristic_score(&self, profile: &PreferenceProfile) -> f64;

	/// Fields shared with the ranking oracle, without `id`.
	fn oracle_fields(&self) -> Map<String, Value>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BookCandidate {
	pub id: String,
	pub owner_id: String,
	pub title: String,
	pub author: String,
	pub genre: String,
	pub language: String,
	#[serde(default)]
	pub rating: Option<f64>,
	#[serde(default)]
	pub reviews: Option<u32>,
	#[serde(default)]
	pub available: Option<bool>,
}
impl Candidate for BookCandidate {
	const KIND: ListingKind = ListingKind::Book;

	fn id(&self) -> &str {
		&self.id
	}

	fn belongs_to(&self, user: &UserContext) -> bool {
		self.owner_id == user.user_id || user.owns_item(&self.id)
	}

	fn heuristic_score(&self, profile: &PreferenceProfile) -> f64 {
		let mut score = 0.0;

		if contains_any(&self.genre, &profile.preferences.genres) {
			score += 2.0;
		}
		if contains_any(&self.author, &profile.preferences.authors) {
			score += 2.0;
		}

		score += sanitize(self.rating.unwrap_or(0.0)) * 0.2;
		score += f64::from(self.reviews.unwrap_or(0)) * 0.01;

		if self.available.unwrap_or(false) {
			score += 0.5;
		}

		score
	}

	fn oracle_fields(&self) -> Map<String, Value> {
		let mut fields = Map::new();

		fields.insert("title".to_string(), Value::from(self.title.as_str()));
		fields.insert("author".to_string(), Value::from(self.author.as_str()));
		fields.insert("genre".to_string(), Value::from(self.genre.as_str()));
		fields.insert("language".to_string(), Value::from(self.language.as_str()));
		fields.insert("rating".to_string(), Value::from(sanitize(self.rating.unwrap_or(0.0))));
		fields.insert("reviews".to_string(), Value::from(self.reviews.unwrap_or(0)));
		fields.insert("available".to_string(), Value::from(self.available.unwrap_or(false)));

		fields
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CircleCandidate {
	pub id: String,
	#[serde(default)]
	pub creator_id: Option<String>,
	pub name: String,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub privacy: Option<String>,
	#[serde(default)]
	pub member_count: Option<u32>,
}
impl Candidate for CircleCandidate {
	const KIND: ListingKind = ListingKind::Circle;

	fn id(&self) -> &str {
		&self.id
	}

	fn belongs_to(&self, user: &UserContext) -> bool {
		user.has_joined(&self.id) || self.creator_id.as_deref() == Some(user.user_id.as_str())
	}

	fn heuristic_score(&self, profile: &PreferenceProfile) -> f64 {
		let mut score = 0.0;

		if contains_any(&self.description, &profile.preferences.genres) {
			score += 2.0;
		}

		score + f64::from(self.member_count.unwrap_or(0)) * 0.01
	}

	fn oracle_fields(&self) -> Map<String, Value> {
		let mut fields = Map::new();

		fields.insert("name".to_string(), Value::from(self.name.as_str()));
		fields.insert("description".to_string(), Value::from(self.description.as_str()));
		fields.insert(
			"privacy".to_string(),
			Value::from(self.privacy.as_deref().unwrap_or("public")),
		);
		fields.insert("memberCount".to_string(), Value::from(self.member_count.unwrap_or(0)));

		fields
	}
}

/// Case-insensitive substring match of `haystack` against any non-blank needle.
fn contains_any<'a, I>(haystack: &str, needles: I) -> bool
where
	I: IntoIterator<Item = &'a String>,
{
	let haystack = haystack.to_lowercase();

	needles.into_iter().any(|needle| {
		let needle = needle.trim().to_lowercase();

		!needle.is_empty() && haystack.contains(&needle)
	})
}

fn sanitize(value: f64) -> f64 {
	if value.is_finite() { value } else { 0.0 }
}

#[cfg(test)]
mod tests {
	use std::collections::BTreeSet;

	use super::*;
	use crate::profile::{OwnedItemSummary, Preferences};

	fn user(user_id: &str) -> UserContext {
		UserContext {
			user_id: user_id.to_string(),
			profile: PreferenceProfile {
				owned_items: vec![OwnedItemSummary {
					id: "owned-elsewhere".to_string(),
					title: "Dune".to_string(),
					category: "Sci-Fi".to_string(),
					language: "English".to_string(),
				}],
				..Default::default()
			},
			joined_group_ids: BTreeSet::from(["joined".to_string()]),
		}
	}

	fn book(id: &str, owner_id: &str) -> BookCandidate {
		BookCandidate {
			id: id.to_string(),
			owner_id: owner_id.to_string(),
			title: "Title".to_string(),
			author: "Author".to_string(),
			genre: "Genre".to_string(),
			language: "English".to_string(),
			rating: None,
			reviews: None,
			available: None,
		}
	}

	#[test]
	fn books_owned_by_user_belong_to_user() {
		let user = user("u1");

		assert!(book("b1", "u1").belongs_to(&user));
		assert!(book("owned-elsewhere", "someone").belongs_to(&user));
		assert!(!book("b2", "u2").belongs_to(&user));
	}

	#[test]
	fn joined_or_created_circles_belong_to_user() {
		let user = user("u1");
		let circle = |id: &str, creator: Option<&str>| CircleCandidate {
			id: id.to_string(),
			creator_id: creator.map(str::to_string),
			name: "Circle".to_string(),
			description: String::new(),
			privacy: None,
			member_count: None,
		};

		assert!(circle("joined", None).belongs_to(&user));
		assert!(circle("c1", Some("u1")).belongs_to(&user));
		assert!(!circle("c2", Some("u2")).belongs_to(&user));
	}

	#[test]
	fn book_score_follows_weights() {
		let profile = PreferenceProfile {
			preferences: Preferences {
				genres: BTreeSet::from(["fantasy".to_string()]),
				authors: BTreeSet::from(["tolkien".to_string()]),
				..Default::default()
			},
			..Default::default()
		};
		let mut candidate = book("b1", "u2");

		candidate.genre = "Epic Fantasy".to_string();
		candidate.author = "J.R.R. Tolkien".to_string();
		candidate.rating = Some(4.5);
		candidate.reviews = Some(120);
		candidate.available = Some(true);

		let score = candidate.heuristic_score(&profile);

		assert!((score - (2.0 + 2.0 + 0.9 + 1.2 + 0.5)).abs() < 1e-9, "Unexpected score {score}.");
	}

	#[test]
	fn blank_preferences_never_match() {
		let profile = PreferenceProfile {
			preferences: Preferences {
				genres: BTreeSet::from(["  ".to_string()]),
				..Default::default()
			},
			..Default::default()
		};

		assert_eq!(book("b1", "u2").heuristic_score(&profile), 0.0);
	}

	#[test]
	fn unknown_candidate_fields_are_rejected() {
		let raw = serde_json::json!({
			"id": "b1",
			"ownerId": "u2",
			"title": "T",
			"author": "A",
			"genre": "G",
			"language": "L",
			"cover": "https://example.invalid/cover.png"
		});

		assert!(serde_json::from_value::<BookCandidate>(raw).is_err());
	}
}
