//! # Request Extractors
//!
//! [`DbConn`] hands each handler its own database session for the duration of the
//! request:
//!
//! ```rust,ignore
//! use lib_web::extract::DbConn;
//!
//! async fn handler(DbConn(mut session): DbConn) {
//!     // `session` derefs to `SqliteConnection`; it goes back to the pool when dropped.
//! }
//! ```

use axum::{extract::FromRef, http::request::Parts, extract::FromRequestParts};
use lib_core::{AppError, DbPool, DbSession};
use tracing::error;

/// Request-scoped database session acquired from the pool in application state.
pub struct DbConn(pub DbSession);

impl<S> FromRequestParts<S> for DbConn
where
    DbPool: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(_parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let pool = DbPool::from_ref(state);

        let session = DbSession::acquire(&pool).await.map_err(|e| {
            error!("[DB] Failed to acquire connection: {}", e);
            e
        })?;

        Ok(Self(session))
    }
}
