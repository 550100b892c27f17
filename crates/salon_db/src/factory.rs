//! Factory for creating database clients

use crate::client::DbClient;
use crate::error::DbError;
use salon_config::AppConfig;
use tracing::debug;

/// Builds [`DbClient`]s from the different configuration sources.
#[derive(Debug, Clone, Default)]
pub struct DbClientFactory;

impl DbClientFactory {
    pub fn new() -> Self {
        Self
    }

    /// Create a client from the application configuration.
    ///
    /// # Errors
    ///
    /// Fails when `database` is missing from the configuration or the
    /// connection cannot be opened.
    pub async fn from_app_config(&self, config: &AppConfig) -> Result<DbClient, DbError> {
        debug!("Creating database client from application configuration");
        DbClient::new(config).await
    }
}
