use std::fmt;
use thiserror::Error;

/// The HTTP-facing error type shared by every salon crate.
///
/// Domain errors (agenda, store) convert into this at the HTTP boundary;
/// each variant maps to one status code through [`HttpStatusCode`].
#[derive(Error, Debug)]
pub enum SalonError {
    /// Error occurred during validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// The caller may not perform the operation right now
    #[error("Forbidden: {0}")]
    ForbiddenError(String),

    /// Error occurred during database operation
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Error occurred due to a conflict (e.g., slot already taken)
    #[error("Conflict: {0}")]
    ConflictError(String),

    /// Error occurred due to a resource not being found
    #[error("Not found: {0}")]
    NotFoundError(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for SalonError {
    fn status_code(&self) -> u16 {
        match self {
            SalonError::ValidationError(_) => 400,
            SalonError::ForbiddenError(_) => 403,
            SalonError::DatabaseError(_) => 500,
            SalonError::ConflictError(_) => 409,
            SalonError::NotFoundError(_) => 404,
        }
    }
}

// Shorthands used by the HTTP handlers
pub fn validation_error<T: fmt::Display>(message: T) -> SalonError {
    SalonError::ValidationError(message.to_string())
}

pub fn not_found<T: fmt::Display>(message: T) -> SalonError {
    SalonError::NotFoundError(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(not_found("gone").status_code(), 404);
        assert_eq!(validation_error("bad").status_code(), 400);
        assert_eq!(SalonError::ConflictError("taken".into()).status_code(), 409);
        assert_eq!(SalonError::ForbiddenError("off".into()).status_code(), 403);
        assert_eq!(SalonError::DatabaseError("down".into()).status_code(), 500);
    }

    #[test]
    fn test_message_carries_the_detail() {
        let err = not_found("No client with this CPF");
        assert_eq!(err.to_string(), "Not found: No client with this CPF");
    }
}
