//! Repository modules for database access

pub mod agenda_factory;
pub mod agenda_sql;

pub use agenda_factory::AgendaStoreFactory;
pub use agenda_sql::SqlAgendaStore;
