use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingKind {
	Book,
	Circle,
}
impl ListingKind {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Book => "book",
			Self::Circle => "circle",
		}
	}

	/// The single key an oracle response must carry for this kind.
	pub fn response_key(self) -> &'static str {
		match self {
			Self::Book => "bookIds",
			Self::Circle => "circleIds",
		}
	}
}

/// A book or a reading circle as stored. `owner_id` is the book owner or the circle creator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
	pub id: String,
	pub owner_id: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub location: Option<GeoPoint>,
	#[serde(flatten)]
	pub details: ListingDetails,
}
impl Listing {
	pub fn kind(&self) -> ListingKind {
		match self.details {
			ListingDetails::Book(_) => ListingKind::Book,
			ListingDetails::Circle(_) => ListingKind::Circle,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ListingDetails {
	Book(BookDetails),
	Circle(CircleDetails),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDetails {
	pub title: String,
	pub author: String,
	pub genre: String,
	pub language: String,
	#[serde(default)]
	pub rating: f64,
	#[serde(default)]
	pub reviews: u32,
	#[serde(default = "default_available")]
	pub available: bool,
	#[serde(default)]
	pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircleDetails {
	pub name: String,
	#[serde(default)]
	pub description: String,
	#[serde(default = "default_privacy")]
	pub privacy: String,
	#[serde(default)]
	pub member_count: u32,
}

fn default_available() -> bool {
	true
}

fn default_privacy() -> String {
	"public".to_string()
}
