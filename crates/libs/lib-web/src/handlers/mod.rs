//! # HTTP Request Handlers
//!
//! Axum HTTP request handlers organized by feature domain.
//!
//! ## Handler Modules
//!
//! - **[`auth`]**: Account and token endpoints
//!   - `POST /signup` - Register a new user
//!   - `POST /login` - Exchange username/password for a bearer token
//!   - `GET /protected` - Example route behind the bearer token guard
//!
//! ## Authentication
//!
//! Protected endpoints use `Extension<CurrentUser>` to get the caller's id.
//! The [`require_auth`](crate::middleware::require_auth) middleware validates the
//! token before the handler runs.
//!
//! ## Error Handling
//!
//! Handlers return [`lib_core::Result<T>`]; the `Err` side is an
//! [`AppError`](lib_core::AppError), which renders itself as a status code plus a
//! JSON [`ErrorResponse`](lib_core::dto::ErrorResponse) body.
//!
//! ## Request/Response Flow
//!
//! ```text
//! Client Request
//!     ↓
//! CORS / Trace / Request stamp / Logging
//!     ↓
//! Auth Middleware (protected routes only)
//!     ↓
//! Handler (DbConn extractor acquires a session)
//!     ↓
//! Response (JSON serialization, session released)
//! ```

pub mod auth;
