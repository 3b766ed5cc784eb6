use sqlx::{PgPool, postgres::PgPoolOptions};

use bookloop_domain::{GeoPoint, Listing, ListingKind, UserContext};

use crate::{BoxFuture, GeoIndex, ProfileStore, Result, queries, schema};

pub struct Db {
	pub pool: PgPool,
}
impl Db {
	pub async fn connect(cfg: &bookloop_config::Postgres) -> Result<Self> {
		let pool =
			PgPoolOptions::new().max_connections(cfg.pool_max_conns).connect(&cfg.dsn).await?;

		Ok(Self { pool })
	}

	pub async fn ensure_schema(&self) -> Result<()> {
		let lock_id: i64 = 4_220_118;
		// Advisory locks are held per connection, so keep the lock and the DDL on one transaction.
		let mut tx = self.pool.begin().await?;

		sqlx::query("SELECT pg_advisory_xact_lock($1)").bind(lock_id).execute(&mut *tx).await?;

		for statement in schema::SCHEMA_SQL.split(';') {
			let trimmed = statement.trim();

			if trimmed.is_empty() {
				continue;
			}

			sqlx::query(trimmed).execute(&mut *tx).await?;
		}

		tx.commit().await?;

		Ok(())
	}
}

impl GeoIndex for Db {
	fn listings_within<'a>(
		&'a self,
		kind: ListingKind,
		center: &'a GeoPoint,
		radius_m: f64,
	) -> BoxFuture<'a, Result<Vec<Listing>>> {
		Box::pin(queries::listings_within(self, kind, center, radius_m))
	}

	fn owners_within<'a>(
		&'a self,
		center: &'a GeoPoint,
		radius_m: f64,
	) -> BoxFuture<'a, Result<Vec<String>>> {
		Box::pin(queries::users_within(self, center, radius_m))
	}

	fn listings_by_owners<'a>(
		&'a self,
		kind: ListingKind,
		owner_ids: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Listing>>> {
		Box::pin(queries::listings_by_owners(self, kind, owner_ids))
	}

	fn all_listings<'a>(&'a self, kind: ListingKind) -> BoxFuture<'a, Result<Vec<Listing>>> {
		Box::pin(queries::all_listings(self, kind))
	}
}

impl ProfileStore for Db {
	fn load_user<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, Result<Option<UserContext>>> {
		Box::pin(queries::load_user(self, user_id))
	}
}
