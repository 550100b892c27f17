//! Factory for the SQL agenda store

use crate::client::DbClient;
use crate::repositories::agenda_sql::SqlAgendaStore;
use crate::repository::RepositoryFactory;

/// Creates [`SqlAgendaStore`]s from a database client.
#[derive(Debug, Clone, Default)]
pub struct AgendaStoreFactory;

impl AgendaStoreFactory {
    pub fn new() -> Self {
        Self
    }
}

impl RepositoryFactory<SqlAgendaStore, DbClient> for AgendaStoreFactory {
    fn create_repository(&self, db_client: DbClient) -> SqlAgendaStore {
        SqlAgendaStore::new(db_client)
    }
}
