//! Scratch Postgres databases for the storage tests that need a live server.

mod error;

pub use error::{Error, Result};

use std::{env, str::FromStr};

use sqlx::{
	ConnectOptions, Connection,
	postgres::{PgConnectOptions, PgConnection},
};
use uuid::Uuid;

use bookloop_config::Postgres;
use bookloop_storage::db::Db;

pub const DSN_ENV: &str = "BOOKLOOP_PG_DSN";

pub fn env_dsn() -> Option<String> {
	env::var(DSN_ENV).ok()
}

/// A uniquely named database with the BookLoop schema installed.
///
/// Nothing is dropped implicitly. Call [`ScratchDb::drop_database`] when the test is done.
pub struct ScratchDb {
	name: String,
	admin: PgConnectOptions,
	db: Db,
}
impl ScratchDb {
	/// Creates the database on the server behind `base_dsn`, then runs `Db::ensure_schema` on it.
	pub async fn create(base_dsn: &str) -> Result<Self> {
		let name = format!("bookloop_test_{}", Uuid::new_v4().simple());
		let admin =
			PgConnectOptions::from_str(base_dsn).map_err(|source| admin_error(&name, source))?;

		admin_execute(&admin, &name, &format!(r#"CREATE DATABASE "{name}""#)).await?;

		let cfg = Postgres {
			dsn: admin.clone().database(&name).to_url_lossy().to_string(),
			pool_max_conns: 2,
		};
		let db = Db::connect(&cfg).await?;

		db.ensure_schema().await?;

		Ok(Self { name, admin, db })
	}

	pub fn db(&self) -> &Db {
		&self.db
	}

	pub async fn drop_database(self) -> Result<()> {
		self.db.pool.close().await;

		admin_execute(
			&self.admin,
			&self.name,
			&format!(r#"DROP DATABASE IF EXISTS "{}" WITH (FORCE)"#, self.name),
		)
		.await
	}
}

async fn admin_execute(admin: &PgConnectOptions, name: &str, sql: &str) -> Result<()> {
	let mut conn =
		PgConnection::connect_with(admin).await.map_err(|source| admin_error(name, source))?;

	sqlx::query(sql).execute(&mut conn).await.map_err(|source| admin_error(name, source))?;
	conn.close().await.map_err(|source| admin_error(name, source))?;

	Ok(())
}

fn admin_error(name: &str, source: sqlx::Error) -> Error {
	Error::Admin { name: name.to_string(), source }
}
