use bookloop_domain::{GeoPoint, Listing, ListingDetails, ListingKind, UserContext};

use crate::{
	Error, Result,
	db::Db,
	models::{BookRow, CircleRow, UserRecord, UserRow},
};

// Haversine over the mean earth radius; $1 is longitude, $2 is latitude.
const DISTANCE_M: &str = "\
2 * 6371008.8 * asin(least(1.0, sqrt(
	power(sin(radians(latitude - $2) / 2), 2)
	+ cos(radians($2)) * cos(radians(latitude)) * power(sin(radians(longitude - $1) / 2), 2)
)))";
const BOOK_COLUMNS: &str = "\
book_id, owner_id, title, author, genre, language, rating, reviews, available, description, \
longitude, latitude, address";
const CIRCLE_COLUMNS: &str = "\
c.circle_id, c.creator_id, c.name, c.description, c.privacy, \
(SELECT count(*) FROM circle_members m WHERE m.circle_id = c.circle_id) AS member_count, \
c.longitude, c.latitude, c.address";

pub async fn listings_within(
	db: &Db,
	kind: ListingKind,
	center: &GeoPoint,
	radius_m: f64,
) -> Result<Vec<Listing>> {
	match kind {
		ListingKind::Book => {
			let sql = format!(
				"\
SELECT {BOOK_COLUMNS}
FROM (SELECT *, {DISTANCE_M} AS distance_m FROM books WHERE latitude IS NOT NULL) b
WHERE distance_m <= $3
ORDER BY distance_m, book_id"
			);
			let rows: Vec<BookRow> = sqlx::query_as(&sql)
				.bind(center.longitude)
				.bind(center.latitude)
				.bind(radius_m)
				.fetch_all(&db.pool)
				.await?;

			Ok(rows.into_iter().map(Listing::from).collect())
		},
		ListingKind::Circle => {
			let sql = format!(
				"\
SELECT {CIRCLE_COLUMNS}
FROM (SELECT *, {DISTANCE_M} AS distance_m FROM circles WHERE latitude IS NOT NULL) c
WHERE c.distance_m <= $3
ORDER BY c.distance_m, c.circle_id"
			);
			let rows: Vec<CircleRow> = sqlx::query_as(&sql)
				.bind(center.longitude)
				.bind(center.latitude)
				.bind(radius_m)
				.fetch_all(&db.pool)
				.await?;

			Ok(rows.into_iter().map(Listing::from).collect())
		},
	}
}

pub async fn users_within(db: &Db, center: &GeoPoint, radius_m: f64) -> Result<Vec<String>> {
	let sql = format!(
		"\
SELECT user_id
FROM (SELECT user_id, {DISTANCE_M} AS distance_m FROM users WHERE latitude IS NOT NULL) u
WHERE distance_m <= $3
ORDER BY distance_m, user_id"
	);
	let ids: Vec<String> = sqlx::query_scalar(&sql)
		.bind(center.longitude)
		.bind(center.latitude)
		.bind(radius_m)
		.fetch_all(&db.pool)
		.await?;

	Ok(ids)
}

pub async fn listings_by_owners(
	db: &Db,
	kind: ListingKind,
	owner_ids: &[String],
) -> Result<Vec<Listing>> {
	if owner_ids.is_empty() {
		return Ok(Vec::new());
	}

	match kind {
		ListingKind::Book => {
			let sql =
				format!("SELECT {BOOK_COLUMNS} FROM books WHERE owner_id = ANY($1) ORDER BY book_id");
			let rows: Vec<BookRow> =
				sqlx::query_as(&sql).bind(owner_ids).fetch_all(&db.pool).await?;

			Ok(rows.into_iter().map(Listing::from).collect())
		},
		ListingKind::Circle => {
			let sql = format!(
				"SELECT {CIRCLE_COLUMNS} FROM circles c WHERE c.creator_id = ANY($1) ORDER BY c.circle_id"
			);
			let rows: Vec<CircleRow> =
				sqlx::query_as(&sql).bind(owner_ids).fetch_all(&db.pool).await?;

			Ok(rows.into_iter().map(Listing::from).collect())
		},
	}
}

pub async fn all_listings(db: &Db, kind: ListingKind) -> Result<Vec<Listing>> {
	match kind {
		ListingKind::Book => {
			let sql = format!("SELECT {BOOK_COLUMNS} FROM books ORDER BY book_id");
			let rows: Vec<BookRow> = sqlx::query_as(&sql).fetch_all(&db.pool).await?;

			Ok(rows.into_iter().map(Listing::from).collect())
		},
		ListingKind::Circle => {
			let sql = format!("SELECT {CIRCLE_COLUMNS} FROM circles c ORDER BY c.circle_id");
			let rows: Vec<CircleRow> = sqlx::query_as(&sql).fetch_all(&db.pool).await?;

			Ok(rows.into_iter().map(Listing::from).collect())
		},
	}
}

pub async fn load_user(db: &Db, user_id: &str) -> Result<Option<UserContext>> {
	let row: Option<UserRow> = sqlx::query_as(
		"\
SELECT
	user_id,
	name,
	bio,
	longitude,
	latitude,
	address,
	preferred_genres,
	preferred_authors,
	preferred_languages
FROM users
WHERE user_id = $1",
	)
	.bind(user_id)
	.fetch_optional(&db.pool)
	.await?;
	let Some(row) = row else {
		return Ok(None);
	};
	let circles_joined: Vec<String> = sqlx::query_scalar(
		"SELECT circle_id FROM circle_members WHERE user_id = $1 ORDER BY joined_at, circle_id",
	)
	.bind(user_id)
	.fetch_all(&db.pool)
	.await?;
	let owned = listings_by_owners(db, ListingKind::Book, &[user_id.to_string()]).await?;
	let joined_sql = format!(
		"SELECT {CIRCLE_COLUMNS} FROM circles c WHERE c.circle_id = ANY($1) ORDER BY c.circle_id"
	);
	let joined: Vec<CircleRow> =
		sqlx::query_as(&joined_sql).bind(&circles_joined).fetch_all(&db.pool).await?;
	let joined: Vec<Listing> = joined.into_iter().map(Listing::from).collect();

	Ok(Some(row.into_record(circles_joined).into_context(&owned, &joined)))
}

pub async fn insert_user(db: &Db, user: &UserRecord) -> Result<()> {
	let genres: Vec<String> = user.preferences.genres.iter().cloned().collect();
	let authors: Vec<String> = user.preferences.authors.iter().cloned().collect();
	let languages: Vec<String> = user.preferences.languages.iter().cloned().collect();

	sqlx::query(
		"\
INSERT INTO users (
	user_id,
	name,
	bio,
	longitude,
	latitude,
	address,
	preferred_genres,
	preferred_authors,
	preferred_languages
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
	)
	.bind(user.id.as_str())
	.bind(user.name.as_str())
	.bind(user.bio.as_deref())
	.bind(user.location.as_ref().map(|point| point.longitude))
	.bind(user.location.as_ref().map(|point| point.latitude))
	.bind(user.location.as_ref().and_then(|point| point.address.as_deref()))
	.bind(&genres)
	.bind(&authors)
	.bind(&languages)
	.execute(&db.pool)
	.await?;

	for circle_id in &user.circles_joined {
		sqlx::query(
			"INSERT INTO circle_members (circle_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
		)
		.bind(circle_id.as_str())
		.bind(user.id.as_str())
		.execute(&db.pool)
		.await?;
	}

	Ok(())
}

pub async fn insert_listing(db: &Db, listing: &Listing) -> Result<()> {
	let longitude = listing.location.as_ref().map(|point| point.longitude);
	let latitude = listing.location.as_ref().map(|point| point.latitude);
	let address = listing.location.as_ref().and_then(|point| point.address.as_deref());

	match &listing.details {
		ListingDetails::Book(book) => {
			sqlx::query(
				"\
INSERT INTO books (
	book_id,
	owner_id,
	title,
	author,
	genre,
	language,
	rating,
	reviews,
	available,
	description,
	longitude,
	latitude,
	address
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
			)
			.bind(listing.id.as_str())
			.bind(listing.owner_id.as_str())
			.bind(book.title.as_str())
			.bind(book.author.as_str())
			.bind(book.genre.as_str())
			.bind(book.language.as_str())
			.bind(book.rating)
			.bind(reviews_column(book.reviews)?)
			.bind(book.available)
			.bind(book.description.as_str())
			.bind(longitude)
			.bind(latitude)
			.bind(address)
			.execute(&db.pool)
			.await?;
		},
		ListingDetails::Circle(circle) => {
			sqlx::query(
				"\
INSERT INTO circles (
	circle_id,
	creator_id,
	name,
	description,
	privacy,
	longitude,
	latitude,
	address
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
			)
			.bind(listing.id.as_str())
			.bind(listing.owner_id.as_str())
			.bind(circle.name.as_str())
			.bind(circle.description.as_str())
			.bind(circle.privacy.as_str())
			.bind(longitude)
			.bind(latitude)
			.bind(address)
			.execute(&db.pool)
			.await?;
		},
	}

	Ok(())
}

fn reviews_column(reviews: u32) -> Result<i32> {
	i32::try_from(reviews).map_err(|_| {
		Error::InvalidArgument(format!("reviews must be at most {}; got {reviews}.", i32::MAX))
	})
}
