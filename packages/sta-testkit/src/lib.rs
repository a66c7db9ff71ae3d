//! Throwaway Postgres databases for integration tests.
//!
//! Every [`TestDatabase`] is a fresh, uniquely named database created next to the one named by
//! `STA_PG_DSN`. It is dropped again by [`TestDatabase::cleanup`], or on `Drop` as a fallback.

mod error;

pub use error::{Error, Result};

use std::{env, str::FromStr, thread};

use sqlx::{
	ConnectOptions, Connection, Executor,
	postgres::{PgConnectOptions, PgConnection},
};
use uuid::Uuid;

pub const DSN_ENV: &str = "STA_PG_DSN";

/// Databases tried, in order, for `CREATE DATABASE` and `DROP DATABASE`.
const ADMIN_DATABASES: [&str; 2] = ["postgres", "template1"];

pub struct TestDatabase {
	name: String,
	dsn: String,
	admin: PgConnectOptions,
	dropped: bool,
}
impl TestDatabase {
	pub async fn new(base_dsn: &str) -> Result<Self> {
		let base = PgConnectOptions::from_str(base_dsn)
			.map_err(|source| Error::InvalidDsn { env: DSN_ENV, source })?;
		let (admin, mut conn) = admin_connection(&base).await?;
		let name = format!("sta_test_{}", Uuid::new_v4().simple());

		conn.execute(format!(r#"CREATE DATABASE "{name}""#).as_str()).await?;

		let dsn = base.database(&name).to_url_lossy().to_string();

		Ok(Self { name, dsn, admin, dropped: false })
	}

	/// A fresh database when `STA_PG_DSN` is set, `None` otherwise.
	pub async fn from_env() -> Result<Option<Self>> {
		match env_dsn() {
			Some(base_dsn) => Self::new(&base_dsn).await.map(Some),
			None => Ok(None),
		}
	}

	pub fn dsn(&self) -> &str {
		&self.dsn
	}

	pub async fn cleanup(mut self) -> Result<()> {
		drop_database(&self.name, &self.admin).await?;

		self.dropped = true;

		Ok(())
	}
}
impl Drop for TestDatabase {
	fn drop(&mut self) {
		if self.dropped {
			return;
		}

		let name = self.name.clone();
		let admin = self.admin.clone();
		// The caller's runtime may be shutting down; use a private one on a fresh thread.
		let dropper = thread::spawn(move || {
			let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build();

			match runtime {
				Ok(runtime) =>
					if let Err(err) = runtime.block_on(drop_database(&name, &admin)) {
						eprintln!("Failed to drop test database {name}: {err}.");
					},
				Err(err) => eprintln!("Failed to drop test database {name}: {err}."),
			}
		});

		if dropper.join().is_err() {
			eprintln!("Test database drop thread panicked.");
		}
	}
}

pub fn env_dsn() -> Option<String> {
	env::var(DSN_ENV).ok().filter(|dsn| !dsn.trim().is_empty())
}

async fn admin_connection(base: &PgConnectOptions) -> Result<(PgConnectOptions, PgConnection)> {
	let mut failure = None;

	for database in ADMIN_DATABASES {
		let options = base.clone().database(database);

		match PgConnection::connect_with(&options).await {
			Ok(conn) => return Ok((options, conn)),
			Err(err) => failure = Some(err),
		}
	}

	let source = failure.unwrap_or(sqlx::Error::PoolClosed);

	Err(Error::AdminUnreachable { tried: ADMIN_DATABASES.join(", "), source })
}

async fn drop_database(name: &str, admin: &PgConnectOptions) -> Result<()> {
	let mut conn = PgConnection::connect_with(admin).await?;

	// Pools from the test may still hold connections.
	sqlx::query(
		"SELECT pg_terminate_backend(pid) FROM pg_stat_activity \
		 WHERE datname = $1 AND pid <> pg_backend_pid()",
	)
	.bind(name)
	.fetch_all(&mut conn)
	.await?;
	conn.execute(format!(r#"DROP DATABASE IF EXISTS "{name}""#).as_str()).await?;

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn malformed_dsn_is_reported() {
		let err = TestDatabase::new("not a dsn").await.err().expect("Expected an error.");

		assert!(matches!(err, Error::InvalidDsn { env: DSN_ENV, .. }));
	}
}
