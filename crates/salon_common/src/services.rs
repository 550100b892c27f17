// --- File: crates/salon_common/src/services.rs ---
//! Store abstraction for the agenda.
//!
//! The agenda engine never talks to a database directly. It goes through
//! [`AgendaStore`], which the in-memory store (tests, demo mode) and the SQL
//! store both implement. Operations that must be atomic, committing a booking
//! into a slot and counting a client visit, are pushed down into the store so
//! that its own locking (a mutex, or a unique index) decides who wins a race.

use chrono::NaiveDate;
use std::future::Future;
use std::pin::Pin;

use crate::models::{
    Appointment, AppointmentStatus, ClientRecord, ClientVisit, DayOverride, ScheduleConfig,
    ServiceItem,
};

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Result of trying to commit a booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(Appointment),
    /// Another active appointment already holds the slot.
    Occupied { holder_id: String },
}

/// Result of a status update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusOutcome {
    Updated(Appointment),
    NotFound,
    /// Restoring a cancelled appointment would collide with `holder_id`.
    Occupied { holder_id: String },
}

/// Persistence operations used by the agenda service.
pub trait AgendaStore: Send + Sync {
    /// Error type returned by store operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// The saved weekly schedule, if one was ever saved.
    fn get_schedule(&self) -> BoxFuture<'_, Option<ScheduleConfig>, Self::Error>;

    fn save_schedule(&self, config: ScheduleConfig) -> BoxFuture<'_, (), Self::Error>;

    fn get_override(&self, date: NaiveDate) -> BoxFuture<'_, Option<DayOverride>, Self::Error>;

    /// Overrides with `from <= date <= to`, ordered by date.
    fn list_overrides(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> BoxFuture<'_, Vec<DayOverride>, Self::Error>;

    /// Insert or replace the override for its date.
    fn upsert_override(&self, day_override: DayOverride) -> BoxFuture<'_, (), Self::Error>;

    /// Returns `false` when there was nothing to delete.
    fn delete_override(&self, date: NaiveDate) -> BoxFuture<'_, bool, Self::Error>;

    /// Appointments with `from <= date <= to`, ordered by date then time.
    fn list_appointments(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        include_cancelled: bool,
    ) -> BoxFuture<'_, Vec<Appointment>, Self::Error>;

    fn get_appointment(&self, id: &str) -> BoxFuture<'_, Option<Appointment>, Self::Error>;

    /// Atomically insert `appointment` unless an active appointment holds
    /// the same date and time.
    fn insert_appointment_if_free(
        &self,
        appointment: Appointment,
    ) -> BoxFuture<'_, InsertOutcome, Self::Error>;

    /// Set the status of an appointment. Moving a cancelled appointment back
    /// to an active status re-checks its slot in the same atomic step.
    fn update_appointment_status(
        &self,
        id: &str,
        status: AppointmentStatus,
    ) -> BoxFuture<'_, StatusOutcome, Self::Error>;

    fn delete_appointment(&self, id: &str) -> BoxFuture<'_, bool, Self::Error>;

    fn get_service(&self, id: &str) -> BoxFuture<'_, Option<ServiceItem>, Self::Error>;

    fn save_service(&self, service: ServiceItem) -> BoxFuture<'_, (), Self::Error>;

    /// Lookup by normalised CPF.
    fn find_client_by_cpf(&self, cpf: &str) -> BoxFuture<'_, Option<ClientRecord>, Self::Error>;

    /// Count a visit against the client with `visit.cpf`, creating the
    /// record on first visit. Read and write happen in one atomic step so
    /// concurrent bookings by the same client all count.
    fn record_visit(&self, visit: ClientVisit) -> BoxFuture<'_, ClientRecord, Self::Error>;
}
