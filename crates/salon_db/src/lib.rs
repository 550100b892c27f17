//! SQL persistence for the salon agenda
//!
//! This crate implements the agenda store on top of SQLx's `Any` driver.
//! SQLite is the default backend; other backends are enabled through
//! feature flags.
//!
//! # Example
//!
//! ```rust,no_run
//! use salon_db::{AgendaStoreFactory, DbClient, RepositoryFactory};
//!
//! async fn setup_store() -> Result<salon_db::SqlAgendaStore, salon_db::error::DbError> {
//!     let db_client = DbClient::from_url("sqlite://data/salon.db").await?;
//!     let store = AgendaStoreFactory::new().create_repository(db_client);
//!     store.init_schema().await?;
//!     Ok(store)
//! }
//! ```

pub mod client;
pub mod error;
pub mod factory;
pub mod repositories;
pub mod repository;

// Re-export the client, factory, and repository traits for ease of use
pub use client::DbClient;
pub use error::DbError;
pub use factory::DbClientFactory;
pub use repository::RepositoryFactory;

pub use repositories::{AgendaStoreFactory, SqlAgendaStore};
