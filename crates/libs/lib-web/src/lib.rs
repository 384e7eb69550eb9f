//! # Web Library
//!
//! HTTP handlers, middleware, extractors and server startup.

pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod server;

pub use server::{create_router, start_server, AppState, ServerConfig};
