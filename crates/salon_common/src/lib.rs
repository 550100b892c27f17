// --- File: crates/salon_common/src/lib.rs ---

// Declare modules within this crate
pub mod error; // Error handling
pub mod http; // HTTP error mapping
pub mod logging; // Logging utilities
pub mod models; // Agenda data structures
pub mod services; // Store abstractions

// Re-export error types and utilities for easier access
pub use error::{not_found, validation_error, HttpStatusCode, SalonError};

// Re-export HTTP utilities for easier access
pub use http::IntoHttpResponse;

// Re-export logging utilities for easier access
pub use logging::{init, init_with_level, level_from_str};

// This crate holds what the agenda, the SQL store and the backend share:
// the agenda models, the store trait, the HTTP-facing error and logging setup.
