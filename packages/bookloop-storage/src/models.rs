use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use bookloop_domain::{
	BookDetails, CircleDetails, GeoPoint, GroupSummary, Listing, ListingDetails,
	OwnedItemSummary, PreferenceProfile, Preferences, UserContext,
};

/// A user as the discovery core sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
	pub id: String,
	pub name: String,
	#[serde(default)]
	pub bio: Option<String>,
	#[serde(default)]
	pub location: Option<GeoPoint>,
	#[serde(default)]
	pub preferences: Preferences,
	#[serde(default)]
	pub circles_joined: Vec<String>,
}
impl UserRecord {
	/// Joins the user with the listings they own and the circles they belong to.
	pub fn into_context<'a, B, C>(self, owned_books: B, joined_circles: C) -> UserContext
	where
		B: IntoIterator<Item = &'a Listing>,
		C: IntoIterator<Item = &'a Listing>,
	{
		let owned_items = owned_books
			.into_iter()
			.filter_map(|listing| match &listing.details {
				ListingDetails::Book(book) => Some(OwnedItemSummary {
					id: listing.id.clone(),
					title: book.title.clone(),
					category: book.genre.clone(),
					language: book.language.clone(),
				}),
				ListingDetails::Circle(_) => None,
			})
			.collect();
		let joined_groups = joined_circles
			.into_iter()
			.filter_map(|listing| match &listing.details {
				ListingDetails::Circle(circle) => {
					Some(GroupSummary { id: listing.id.clone(), name: circle.name.clone() })
				},
				ListingDetails::Book(_) => None,
			})
			.collect();

		UserContext {
			user_id: self.id,
			profile: PreferenceProfile {
				bio: self.bio.unwrap_or_default(),
				preferences: self.preferences,
				owned_items,
				joined_groups,
			},
			joined_group_ids: self.circles_joined.into_iter().collect::<BTreeSet<_>>(),
		}
	}
}

/// Seed document accepted by the in-memory store.
#[derive(Debug, Default, Deserialize)]
pub struct Seed {
	#[serde(default)]
	pub users: Vec<UserRecord>,
	#[serde(default)]
	pub listings: Vec<Listing>,
}

#[derive(Debug, sqlx::FromRow)]
pub struct UserRow {
	pub user_id: String,
	pub name: String,
	pub bio: Option<String>,
	pub longitude: Option<f64>,
	pub latitude: Option<f64>,
	pub address: Option<String>,
	pub preferred_genres: Vec<String>,
	pub preferred_authors: Vec<String>,
	pub preferred_languages: Vec<String>,
}
impl UserRow {
	pub fn into_record(self, circles_joined: Vec<String>) -> UserRecord {
		UserRecord {
			id: self.user_id,
			name: self.name,
			bio: self.bio,
			location: location(self.longitude, self.latitude, self.address),
			preferences: Preferences {
				genres: self.preferred_genres.into_iter().collect(),
				authors: self.preferred_authors.into_iter().collect(),
				languages: self.preferred_languages.into_iter().collect(),
			},
			circles_joined,
		}
	}
}

#[derive(Debug, sqlx::FromRow)]
pub struct BookRow {
	pub book_id: String,
	pub owner_id: String,
	pub title: String,
	pub author: String,
	pub genre: String,
	pub language: String,
	pub rating: f64,
	pub reviews: i32,
	pub available: bool,
	pub description: String,
	pub longitude: Option<f64>,
	pub latitude: Option<f64>,
	pub address: Option<String>,
}
impl From<BookRow> for Listing {
	fn from(row: BookRow) -> Self {
		Listing {
			id: row.book_id,
			owner_id: row.owner_id,
			location: location(row.longitude, row.latitude, row.address),
			details: ListingDetails::Book(BookDetails {
				title: row.title,
				author: row.author,
				genre: row.genre,
				language: row.language,
				rating: row.rating,
				reviews: u32::try_from(row.reviews).unwrap_or(0),
				available: row.available,
				description: row.description,
			}),
		}
	}
}

#[derive(Debug, sqlx::FromRow)]
pub struct CircleRow {
	pub circle_id: String,
	pub creator_id: String,
	pub name: String,
	pub description: String,
	pub privacy: String,
	pub member_count: i64,
	pub longitude: Option<f64>,
	pub latitude: Option<f64>,
	pub address: Option<String>,
}
impl From<CircleRow> for Listing {
	fn from(row: CircleRow) -> Self {
		Listing {
			id: row.circle_id,
			owner_id: row.creator_id,
			location: location(row.longitude, row.latitude, row.address),
			details: ListingDetails::Circle(CircleDetails {
				name: row.name,
				description: row.description,
				privacy: row.privacy,
				member_count: u32::try_from(row.member_count).unwrap_or(u32::MAX),
			}),
		}
	}
}

fn location(
	longitude: Option<f64>,
	latitude: Option<f64>,
	address: Option<String>,
) -> Option<GeoPoint> {
	let point = GeoPoint::new(longitude?, latitude?).ok()?;

	Some(GeoPoint { address, ..point })
}
