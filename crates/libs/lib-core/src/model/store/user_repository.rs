//! # User Repository
//!
//! Provides database access layer for user-related operations.
//!
//! Every method works on a borrowed connection, normally a request-scoped
//! [`DbSession`](super::DbSession):
//!
//! ```rust,no_run
//! # use lib_core::model::store::{DbSession, UserForCreate, UserRepository};
//! # async fn example(pool: &lib_core::DbPool) -> lib_core::Result<()> {
//! let mut session = DbSession::acquire(pool).await?;
//!
//! let user = UserRepository::create(
//!     &mut session,
//!     UserForCreate::new("Alice".into(), "alice".into(), "$argon2id$...".into()),
//! ).await?;
//!
//! let found = UserRepository::find_by_username(&mut session, "alice").await?;
//! assert_eq!(found.map(|u| u.id), Some(user.id));
//! # Ok(())
//! # }
//! ```

use super::models::{User, UserForCreate};
use crate::error::Result;
use sqlx::{query_as, SqliteConnection};

/// User repository for database operations.
pub struct UserRepository;

impl UserRepository {
    /// Find a user by their username.
    ///
    /// Matching is exact and case-sensitive: `Alice` and `alice` are different users.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(User))` - User found with matching username
    /// * `Ok(None)` - No user found with that username
    /// * `Err(AppError)` - Database error occurred
    pub async fn find_by_username(conn: &mut SqliteConnection, username: &str) -> Result<Option<User>> {
        let user = query_as::<_, User>("SELECT id, name, username, password FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(conn)
            .await?;

        Ok(user)
    }

    /// Find a user by id.
    pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> Result<Option<User>> {
        let user = query_as::<_, User>("SELECT id, name, username, password FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(user)
    }

    /// Create a new user in the database.
    ///
    /// # Errors
    ///
    /// * `AppError::Conflict` - Username already exists (UNIQUE constraint violation);
    ///   nothing is written
    /// * `AppError::Internal` - Any other database failure
    pub async fn create(conn: &mut SqliteConnection, user_data: UserForCreate) -> Result<User> {
        let result = sqlx::query("INSERT INTO users (name, username, password) VALUES (?, ?, ?)")
            .bind(&user_data.name)
            .bind(&user_data.username)
            .bind(&user_data.password_hash)
            .execute(&mut *conn)
            .await?;

        let id = result.last_insert_rowid();

        let user = query_as::<_, User>("SELECT id, name, username, password FROM users WHERE id = ?")
            .bind(id)
            .fetch_one(&mut *conn)
            .await?;

        Ok(user)
    }

    /// Count registered users.
    pub async fn count(conn: &mut SqliteConnection) -> Result<i64> {
        let (count,): (i64,) = query_as("SELECT COUNT(*) FROM users")
            .fetch_one(conn)
            .await?;

        Ok(count)
    }
}
