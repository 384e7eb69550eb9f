//! # Data Transfer Objects (DTOs)
//!
//! Data structures exchanged with clients over the REST API.

pub mod auth;

pub use auth::*;
