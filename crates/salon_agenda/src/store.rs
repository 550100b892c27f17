// --- File: crates/salon_agenda/src/store.rs ---
//! In-memory agenda store.
//!
//! Used when the backend runs without a database and as the store behind
//! every agenda test. All collections sit behind one mutex, so the
//! check-then-insert of a booking happens under a single guard.

use chrono::NaiveDate;
use salon_common::models::{
    Appointment, AppointmentStatus, ClientRecord, ClientVisit, DayOverride, ScheduleConfig,
    ServiceItem, SlotTime,
};
use salon_common::services::{AgendaStore, BoxFuture, InsertOutcome, StatusOutcome};
use std::collections::{BTreeMap, HashMap};
use std::future;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InMemoryStoreError {
    #[error("agenda store lock poisoned")]
    Poisoned,
}

#[derive(Default)]
struct AgendaData {
    schedule: Option<ScheduleConfig>,
    overrides: BTreeMap<NaiveDate, DayOverride>,
    appointments: HashMap<String, Appointment>,
    services: HashMap<String, ServiceItem>,
    clients: HashMap<String, ClientRecord>,
    /// CPF -> client id.
    clients_by_cpf: HashMap<String, String>,
}

impl AgendaData {
    fn active_holder(&self, date: NaiveDate, time: SlotTime, except: &str) -> Option<String> {
        self.appointments
            .values()
            .find(|a| a.id != except && a.date == date && a.time == time && a.is_active())
            .map(|a| a.id.clone())
    }
}

#[derive(Default)]
pub struct InMemoryAgendaStore {
    data: Mutex<AgendaData>,
}

impl InMemoryAgendaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with a service catalog.
    pub fn with_services(services: impl IntoIterator<Item = ServiceItem>) -> Self {
        let store = Self::new();
        if let Ok(mut data) = store.data.lock() {
            for service in services {
                data.services.insert(service.id.clone(), service);
            }
        }
        store
    }

    fn with_data<T, F>(&self, f: F) -> BoxFuture<'_, T, InMemoryStoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut AgendaData) -> T,
    {
        let result = self.lock().map(|mut data| f(&mut *data));
        Box::pin(future::ready(result))
    }

    fn lock(&self) -> Result<MutexGuard<'_, AgendaData>, InMemoryStoreError> {
        self.data.lock().map_err(|_| InMemoryStoreError::Poisoned)
    }
}

impl AgendaStore for InMemoryAgendaStore {
    type Error = InMemoryStoreError;

    fn get_schedule(&self) -> BoxFuture<'_, Option<ScheduleConfig>, Self::Error> {
        self.with_data(|data| data.schedule.clone())
    }

    fn save_schedule(&self, config: ScheduleConfig) -> BoxFuture<'_, (), Self::Error> {
        self.with_data(move |data| data.schedule = Some(config))
    }

    fn get_override(&self, date: NaiveDate) -> BoxFuture<'_, Option<DayOverride>, Self::Error> {
        self.with_data(move |data| data.overrides.get(&date).cloned())
    }

    fn list_overrides(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> BoxFuture<'_, Vec<DayOverride>, Self::Error> {
        self.with_data(move |data| {
            if from > to {
                return Vec::new();
            }
            data.overrides.range(from..=to).map(|(_, o)| o.clone()).collect()
        })
    }

    fn upsert_override(&self, day_override: DayOverride) -> BoxFuture<'_, (), Self::Error> {
        self.with_data(move |data| {
            data.overrides.insert(day_override.date, day_override);
        })
    }

    fn delete_override(&self, date: NaiveDate) -> BoxFuture<'_, bool, Self::Error> {
        self.with_data(move |data| data.overrides.remove(&date).is_some())
    }

    fn list_appointments(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        include_cancelled: bool,
    ) -> BoxFuture<'_, Vec<Appointment>, Self::Error> {
        self.with_data(move |data| {
            let mut found: Vec<Appointment> = data
                .appointments
                .values()
                .filter(|a| from <= a.date && a.date <= to)
                .filter(|a| include_cancelled || a.is_active())
                .cloned()
                .collect();
            found.sort_by(|a, b| (a.date, a.time, a.created_at).cmp(&(b.date, b.time, b.created_at)));
            found
        })
    }

    fn get_appointment(&self, id: &str) -> BoxFuture<'_, Option<Appointment>, Self::Error> {
        let id = id.to_string();
        self.with_data(move |data| data.appointments.get(&id).cloned())
    }

    fn insert_appointment_if_free(
        &self,
        appointment: Appointment,
    ) -> BoxFuture<'_, InsertOutcome, Self::Error> {
        self.with_data(move |data| {
            if appointment.is_active() {
                if let Some(holder_id) =
                    data.active_holder(appointment.date, appointment.time, &appointment.id)
                {
                    return InsertOutcome::Occupied { holder_id };
                }
            }
            data.appointments
                .insert(appointment.id.clone(), appointment.clone());
            InsertOutcome::Inserted(appointment)
        })
    }

    fn update_appointment_status(
        &self,
        id: &str,
        status: AppointmentStatus,
    ) -> BoxFuture<'_, StatusOutcome, Self::Error> {
        let id = id.to_string();
        self.with_data(move |data| {
            let Some(current) = data.appointments.get(&id) else {
                return StatusOutcome::NotFound;
            };
            if !current.is_active() && status.is_active() {
                if let Some(holder_id) = data.active_holder(current.date, current.time, &id) {
                    return StatusOutcome::Occupied { holder_id };
                }
            }
            match data.appointments.get_mut(&id) {
                Some(appointment) => {
                    appointment.status = status;
                    StatusOutcome::Updated(appointment.clone())
                }
                None => StatusOutcome::NotFound,
            }
        })
    }

    fn delete_appointment(&self, id: &str) -> BoxFuture<'_, bool, Self::Error> {
        let id = id.to_string();
        self.with_data(move |data| data.appointments.remove(&id).is_some())
    }

    fn get_service(&self, id: &str) -> BoxFuture<'_, Option<ServiceItem>, Self::Error> {
        let id = id.to_string();
        self.with_data(move |data| data.services.get(&id).cloned())
    }

    fn save_service(&self, service: ServiceItem) -> BoxFuture<'_, (), Self::Error> {
        self.with_data(move |data| {
            data.services.insert(service.id.clone(), service);
        })
    }

    fn find_client_by_cpf(&self, cpf: &str) -> BoxFuture<'_, Option<ClientRecord>, Self::Error> {
        let cpf = cpf.to_string();
        self.with_data(move |data| {
            data.clients_by_cpf
                .get(&cpf)
                .and_then(|id| data.clients.get(id))
                .cloned()
        })
    }

    fn record_visit(&self, visit: ClientVisit) -> BoxFuture<'_, ClientRecord, Self::Error> {
        self.with_data(move |data| {
            let existing = data
                .clients_by_cpf
                .get(&visit.cpf)
                .and_then(|id| data.clients.get_mut(id));
            match existing {
                Some(record) => {
                    record.apply_visit(&visit);
                    record.clone()
                }
                None => {
                    let record = ClientRecord::first_visit(&visit);
                    data.clients_by_cpf
                        .insert(record.cpf.clone(), record.id.clone());
                    data.clients.insert(record.id.clone(), record.clone());
                    record
                }
            }
        })
    }
}
