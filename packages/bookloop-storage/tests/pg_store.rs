use bookloop_domain::{
	BookDetails, CircleDetails, GeoPoint, Listing, ListingDetails, ListingKind, Preferences,
};
use bookloop_storage::{GeoIndex, ProfileStore, db::Db, models::UserRecord, queries};

fn point(lng: f64, lat: f64) -> GeoPoint {
	GeoPoint::new(lng, lat).expect("valid point")
}

fn user(id: &str, location: Option<GeoPoint>, circles_joined: &[&str]) -> UserRecord {
	UserRecord {
		id: id.to_string(),
		name: id.to_string(),
		bio: Some(format!("{id} likes books")),
		location,
		preferences: Preferences::default(),
		circles_joined: circles_joined.iter().map(|id| id.to_string()).collect(),
	}
}

fn book(id: &str, owner_id: &str, location: Option<GeoPoint>) -> Listing {
	Listing {
		id: id.to_string(),
		owner_id: owner_id.to_string(),
		location,
		details: ListingDetails::Book(BookDetails {
			title: format!("Title {id}"),
			author: "Author".to_string(),
			genre: "Mystery".to_string(),
			language: "English".to_string(),
			rating: 4.0,
			reviews: 2,
			available: true,
			description: String::new(),
		}),
	}
}

fn circle(id: &str, creator_id: &str, location: Option<GeoPoint>) -> Listing {
	Listing {
		id: id.to_string(),
		owner_id: creator_id.to_string(),
		location,
		details: ListingDetails::Circle(CircleDetails {
			name: format!("Circle {id}"),
			description: "Weekly mystery reads".to_string(),
			privacy: "public".to_string(),
			member_count: 0,
		}),
	}
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set BOOKLOOP_PG_DSN to run."]
async fn radius_queries_and_profiles_round_trip() {
	let Some(base_dsn) = bookloop_testkit::env_dsn() else {
		eprintln!("Skipping radius_queries_and_profiles_round_trip; set BOOKLOOP_PG_DSN to run.");

		return;
	};

	let scratch = bookloop_testkit::ScratchDb::create(&base_dsn)
		.await
		.expect("Failed to create test database.");

	exercise_store(scratch.db()).await;
	scratch.drop_database().await.expect("Failed to drop test database.");
}

async fn exercise_store(db: &Db) {
	db.ensure_schema().await.expect("Schema bootstrap must be idempotent.");

	let center = point(77.59, 12.97);

	queries::insert_listing(db, &circle("c1", "near-user", Some(point(77.60, 12.97))))
		.await
		.expect("insert circle");
	queries::insert_user(db, &user("near-user", Some(point(77.595, 12.972)), &["c1"]))
		.await
		.expect("insert user");
	queries::insert_user(db, &user("far-user", Some(point(80.0, 15.0)), &[]))
		.await
		.expect("insert user");
	queries::insert_listing(db, &book("b-near", "far-user", Some(point(77.591, 12.971))))
		.await
		.expect("insert book");
	queries::insert_listing(db, &book("b-owner", "near-user", None))
		.await
		.expect("insert book");

	let direct = db
		.listings_within(ListingKind::Book, &center, 5_000.0)
		.await
		.expect("books within");

	assert_eq!(direct.iter().map(|l| l.id.as_str()).collect::<Vec<_>>(), vec!["b-near"]);

	let owners = db.owners_within(&center, 5_000.0).await.expect("owners within");

	assert_eq!(owners, vec!["near-user".to_string()]);

	let by_owner = db
		.listings_by_owners(ListingKind::Book, &owners)
		.await
		.expect("books by owner");

	assert_eq!(by_owner.iter().map(|l| l.id.as_str()).collect::<Vec<_>>(), vec!["b-owner"]);

	let circles = db.all_listings(ListingKind::Circle).await.expect("all circles");

	match &circles[0].details {
		ListingDetails::Circle(details) => assert_eq!(details.member_count, 1),
		ListingDetails::Book(_) => panic!("Expected a circle."),
	}

	let context = db.load_user("near-user").await.expect("load user").expect("user exists");

	assert_eq!(context.profile.owned_items.len(), 1);
	assert_eq!(context.profile.joined_groups[0].id, "c1");
	assert!(context.joined_group_ids.contains("c1"));
	assert!(db.load_user("ghost").await.expect("load user").is_none());

	let mut oversized = book("b-popular", "near-user", None);

	if let ListingDetails::Book(details) = &mut oversized.details {
		details.reviews = u32::MAX;
	}

	let err = queries::insert_listing(db, &oversized).await.expect_err("reviews out of range");

	assert!(matches!(err, bookloop_storage::Error::InvalidArgument(_)));
}
