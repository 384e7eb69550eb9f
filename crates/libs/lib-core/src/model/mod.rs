//! # Model Layer
//!
//! Persistent entities and their repositories.

pub mod store;
