//! # Core Library
//!
//! Configuration, errors, DTOs and the user store.

pub mod config;
pub mod error;
pub mod model;
pub mod dto;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, Result};
pub use model::store::{DbPool, DbSession, create_pool, init_schema};
