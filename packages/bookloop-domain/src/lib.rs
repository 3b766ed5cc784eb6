pub mod candidate;
pub mod geo;
pub mod heuristic;
pub mod listing;
pub mod profile;

pub use candidate::{BookCandidate, Candidate, CircleCandidate};
pub use geo::{GeoError, GeoPoint};
pub use listing::{BookDetails, CircleDetails, Listing, ListingDetails, ListingKind};
pub use profile::{
	GroupSummary, OwnedItemSummary, PreferenceProfile, PreferenceSignature, Preferences,
	UserContext, build_signature,
};
