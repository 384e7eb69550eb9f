//! # Validation Utilities
//!
//! Input validation helpers.

/// A field failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field} cannot be empty")]
pub struct ValidationError {
    pub field: &'static str,
}

/// Validate that a string is not empty or whitespace only.
pub fn validate_not_empty(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError { field })
    } else {
        Ok(())
    }
}
