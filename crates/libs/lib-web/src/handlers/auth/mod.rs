//! # Authentication Handlers
//!
//! - `POST /signup` registers a user. No token is issued; the client logs in next.
//! - `POST /login` verifies credentials and returns a bearer token.
//! - `GET /protected` echoes the id of the authenticated caller.
//!
//! Unknown usernames and wrong passwords produce the same 401 response, and the
//! unknown-user path still runs one Argon2 verification so both take similar time.

use std::sync::LazyLock;

use axum::extract::{Extension, Json, State};
use lib_auth::{hash_password, verify_password, TokenService};
use lib_core::dto::{
    LoginRequest, MessageResponse, ProtectedResponse, SignupRequest, TokenResponse,
    PROTECTED_MESSAGE, SIGNUP_SUCCESS_MESSAGE,
};
use lib_core::model::store::{UserForCreate, UserRepository};
use lib_core::{AppError, Result};
use lib_utils::validate_not_empty;
use tracing::{debug, info, instrument, warn};

use crate::extract::DbConn;
use crate::middleware::CurrentUser;

pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
pub const USERNAME_TAKEN: &str = "Username already taken";

/// Hash checked against when the username does not exist.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("authgate-timing-equalizer").ok());

/// Run CPU-bound password work off the async worker threads.
async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(format!("Blocking task failed: {}", e)))
}

#[instrument(skip_all, fields(username = %req.username))]
pub async fn signup(
    DbConn(mut session): DbConn,
    Json(req): Json<SignupRequest>,
) -> Result<Json<MessageResponse>> {
    info!("[SIGNUP] New user signup request");

    validate_not_empty(&req.name, "name")?;
    validate_not_empty(&req.username, "username")?;
    validate_not_empty(&req.password, "password")?;

    if UserRepository::find_by_username(&mut session, &req.username).await?.is_some() {
        warn!("[SIGNUP] Username already taken");
        return Err(AppError::Conflict(USERNAME_TAKEN.to_string()));
    }

    debug!("[SIGNUP] Hashing password...");
    let password = req.password;
    let password_hash = run_blocking(move || hash_password(&password))
        .await?
        .map_err(|e| AppError::Internal(e.to_string()))?;

    // A concurrent signup can still win the race; the UNIQUE constraint turns that into Conflict.
    let user = UserRepository::create(
        &mut session,
        UserForCreate::new(req.name, req.username, password_hash),
    )
    .await?;

    info!("[SIGNUP] User created with id {}", user.id);

    Ok(Json(MessageResponse {
        message: SIGNUP_SUCCESS_MESSAGE.to_string(),
    }))
}

#[instrument(skip_all, fields(username = %req.username))]
pub async fn login(
    State(tokens): State<TokenService>,
    DbConn(mut session): DbConn,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>> {
    info!("[LOGIN] Login attempt");

    let user = UserRepository::find_by_username(&mut session, &req.username).await?;
    drop(session);

    let stored_hash = user.as_ref().map(|u| u.password_hash.clone());
    let password = req.password;
    let is_valid = run_blocking(move || match stored_hash {
        Some(hash) => verify_password(&password, &hash),
        None => {
            if let Some(dummy) = DUMMY_HASH.as_deref() {
                let _ = verify_password(&password, dummy);
            }
            false
        }
    })
    .await?;

    let user = match user {
        Some(user) if is_valid => user,
        Some(_) => {
            warn!("[LOGIN] Wrong password");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }
        None => {
            warn!("[LOGIN] Unknown username");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }
    };

    let token = tokens
        .issue(user.id)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    info!("[LOGIN] User {} authenticated", user.id);

    Ok(Json(TokenResponse { token }))
}

pub async fn protected(Extension(user): Extension<CurrentUser>) -> Json<ProtectedResponse> {
    debug!("[PROTECTED] Access by user {}", user.user_id);

    Json(ProtectedResponse {
        message: PROTECTED_MESSAGE.to_string(),
        user_id: user.user_id,
    })
}

#[cfg(test)]
mod tests;
