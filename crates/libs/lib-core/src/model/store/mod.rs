//! # Database Store
//!
//! Database connection pool, schema setup, per-request sessions and repositories.

// region: --- Modules
pub mod models;
pub mod user_repository;
// endregion: --- Modules

// region: --- Re-exports
pub use models::{User, UserForCreate};
pub use user_repository::UserRepository;
// endregion: --- Re-exports

// region: --- Types and Functions
use sqlx::{
    migrate::Migrator,
    pool::PoolConnection,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Sqlite, SqliteConnection, SqlitePool,
};
use std::ops::{Deref, DerefMut};
use std::time::Duration;

use crate::error::Result;

/// Type alias for SQLite connection pool.
pub type DbPool = SqlitePool;

/// Migrations embedded at compile time; creates the `users` table if absent.
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Create a new SQLite connection pool, creating the database file if missing.
pub async fn create_pool(database_url: &str) -> Result<DbPool> {
    let options = database_url
        .parse::<SqliteConnectOptions>()?
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Apply pending migrations.
pub async fn init_schema(pool: &DbPool) -> Result<()> {
    MIGRATOR.run(pool).await?;
    Ok(())
}

/// A database connection scoped to one unit of work.
///
/// The connection returns to the pool when the session is dropped, whichever
/// way the owning request ends.
pub struct DbSession {
    conn: PoolConnection<Sqlite>,
}

impl DbSession {
    /// Acquire a connection from the pool.
    pub async fn acquire(pool: &DbPool) -> Result<Self> {
        let conn = pool.acquire().await?;
        Ok(Self { conn })
    }
}

impl Deref for DbSession {
    type Target = SqliteConnection;

    fn deref(&self) -> &Self::Target {
        &self.conn
    }
}

impl DerefMut for DbSession {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.conn
    }
}
// endregion: --- Types and Functions
