//! # Authentication Middleware
//!
//! Axum middleware guarding routes behind a bearer token.
//!
//! The guard reads the `Authorization` header, parses it as `Bearer <token>`,
//! verifies the token with the [`TokenService`] in application state and injects a
//! [`CurrentUser`] into the request extensions.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let protected = Router::new()
//!     .route("/protected", get(protected_handler))
//!     .route_layer(axum::middleware::from_fn_with_state(state.clone(), require_auth));
//! ```
//!
//! Handlers then extract the user with `Extension<CurrentUser>`:
//!
//! ```rust,ignore
//! async fn protected_handler(Extension(user): Extension<CurrentUser>) -> String {
//!     format!("Hello, user {}!", user.user_id)
//! }
//! ```
//!
//! ## Failures
//!
//! | Header | Response |
//! |---|---|
//! | absent | 401 `Token missing` |
//! | not `Bearer <token>` | 401 `Invalid token` |
//! | bad signature / expired / garbage | 401 `Invalid token` |

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use lib_auth::TokenService;
use lib_core::AppError;
use tracing::{debug, warn};

pub const TOKEN_MISSING: &str = "Token missing";
pub const INVALID_TOKEN: &str = "Invalid token";

/// Identity of the caller, available to handlers behind [`require_auth`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub user_id: i64,
}

/// Why an `Authorization` header could not be turned into a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthHeaderError {
    /// No header at all.
    Missing,
    /// Header present but not `Bearer <token>` (or not valid UTF-8).
    Malformed,
}

/// Parse an `Authorization` header value of the form `Bearer <token>`.
///
/// The scheme is matched case-insensitively. Exactly one non-empty token must follow it.
pub fn parse_bearer(header: Option<&str>) -> Result<&str, AuthHeaderError> {
    let header = header.ok_or(AuthHeaderError::Missing)?;

    let mut parts = header.split_whitespace();
    let scheme = parts.next().ok_or(AuthHeaderError::Malformed)?;
    let token = parts.next().ok_or(AuthHeaderError::Malformed)?;

    if !scheme.eq_ignore_ascii_case("bearer") || parts.next().is_some() {
        return Err(AuthHeaderError::Malformed);
    }

    Ok(token)
}

/// Authentication middleware that validates bearer tokens.
///
/// - **Valid token**: continues with [`CurrentUser`] in the request extensions
/// - **Missing header**: `401 Token missing`
/// - **Malformed header or invalid token**: `401 Invalid token`
pub async fn require_auth(
    State(tokens): State<TokenService>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = match req.headers().get(AUTHORIZATION) {
        // A header that is not visible ASCII is treated like any other malformed header.
        Some(value) => Some(value.to_str().unwrap_or("")),
        None => None,
    };

    let token = parse_bearer(header).map_err(|e| match e {
        AuthHeaderError::Missing => {
            warn!("[AUTH] Missing Authorization header");
            AppError::Unauthorized(TOKEN_MISSING.to_string())
        }
        AuthHeaderError::Malformed => {
            warn!("[AUTH] Invalid Authorization header format");
            AppError::Unauthorized(INVALID_TOKEN.to_string())
        }
    })?;

    let user_id = tokens.verify(token).ok_or_else(|| {
        warn!("[AUTH] Token verification failed");
        AppError::Unauthorized(INVALID_TOKEN.to_string())
    })?;

    debug!("[AUTH] Authenticated user id: {}", user_id);

    req.extensions_mut().insert(CurrentUser { user_id });

    Ok(next.run(req).await)
}
