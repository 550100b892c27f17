//! Builders shared by the unit tests of this crate.

use crate::clock::FixedClock;
use crate::logic::BookSlotRequest;
use crate::service::AgendaService;
use crate::store::InMemoryAgendaStore;
use chrono::{NaiveDate, Utc};
use salon_common::models::{
    Appointment, AppointmentStatus, BookingOrigin, ClientDetails, ClientRecord, ClientVisit,
    DayOverride, PaymentMethod, ScheduleConfig, ServiceItem, SlotTime,
};
use salon_common::services::{AgendaStore, BoxFuture, InsertOutcome, StatusOutcome};
use std::sync::Arc;

/// Monday 2025-05-05.
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 5, 5).unwrap()
}

/// Tuesday 2025-05-06.
pub fn tuesday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 5, 6).unwrap()
}

/// Sunday 2025-05-11.
pub fn sunday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 5, 11).unwrap()
}

pub fn slot(hour: u8) -> SlotTime {
    SlotTime::from_hour(hour).unwrap()
}

pub fn hours(slots: &[SlotTime]) -> Vec<u8> {
    slots.iter().map(|s| s.hour()).collect()
}

pub fn haircut() -> ServiceItem {
    ServiceItem {
        id: "1".to_string(),
        name: "Corte Feminino".to_string(),
        category: "Cabelo".to_string(),
        duration_minutes: 60,
        price_cents: 8_000,
        price_pix_cents: Some(7_500),
        price_credit_cents: None,
        price_debit_cents: None,
        price_cash_cents: None,
        active: true,
    }
}

pub fn client() -> ClientDetails {
    ClientDetails {
        first_name: "Ana".to_string(),
        last_name: "Souza".to_string(),
        phone: "(11) 99999-0000".to_string(),
        cpf: "123.456.789-00".to_string(),
        address: None,
        notes: None,
    }
}

pub fn booking(date: NaiveDate, time: &str) -> BookSlotRequest {
    BookSlotRequest {
        date,
        time: time.to_string(),
        client: client(),
        service_id: "1".to_string(),
        payment_method: PaymentMethod::Pix,
        notes: None,
    }
}

pub fn appointment(id: &str, date: NaiveDate, hour: u8, status: AppointmentStatus) -> Appointment {
    Appointment {
        id: id.to_string(),
        date,
        time: slot(hour),
        status,
        client: client(),
        service_id: "1".to_string(),
        service_name: "Corte Feminino".to_string(),
        payment_method: PaymentMethod::Cash,
        total_cents: 8_000,
        notes: None,
        origin: BookingOrigin::AdminPanel,
        created_at: Utc::now(),
    }
}

pub fn service_with(store: Arc<InMemoryAgendaStore>) -> AgendaService<InMemoryAgendaStore> {
    AgendaService::new(store, Arc::new(FixedClock(today())), ScheduleConfig::default())
}

pub fn agenda() -> (Arc<InMemoryAgendaStore>, AgendaService<InMemoryAgendaStore>) {
    let store = Arc::new(InMemoryAgendaStore::with_services([haircut()]));
    (store.clone(), service_with(store))
}

/// Wraps a store and yields to the scheduler before every call, so that
/// concurrent service calls interleave between their reads and their commit.
pub struct YieldingStore<S> {
    inner: S,
}

impl<S> YieldingStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

impl<S: AgendaStore> AgendaStore for YieldingStore<S> {
    type Error = S::Error;

    fn get_schedule(&self) -> BoxFuture<'_, Option<ScheduleConfig>, Self::Error> {
        Box::pin(async move {
            tokio::task::yield_now().await;
            self.inner.get_schedule().await
        })
    }

    fn save_schedule(&self, config: ScheduleConfig) -> BoxFuture<'_, (), Self::Error> {
        Box::pin(async move {
            tokio::task::yield_now().await;
            self.inner.save_schedule(config).await
        })
    }

    fn get_override(&self, date: NaiveDate) -> BoxFuture<'_, Option<DayOverride>, Self::Error> {
        Box::pin(async move {
            tokio::task::yield_now().await;
            self.inner.get_override(date).await
        })
    }

    fn list_overrides(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> BoxFuture<'_, Vec<DayOverride>, Self::Error> {
        Box::pin(async move {
            tokio::task::yield_now().await;
            self.inner.list_overrides(from, to).await
        })
    }

    fn upsert_override(&self, day_override: DayOverride) -> BoxFuture<'_, (), Self::Error> {
        Box::pin(async move {
            tokio::task::yield_now().await;
            self.inner.upsert_override(day_override).await
        })
    }

    fn delete_override(&self, date: NaiveDate) -> BoxFuture<'_, bool, Self::Error> {
        Box::pin(async move {
            tokio::task::yield_now().await;
            self.inner.delete_override(date).await
        })
    }

    fn list_appointments(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        include_cancelled: bool,
    ) -> BoxFuture<'_, Vec<Appointment>, Self::Error> {
        Box::pin(async move {
            tokio::task::yield_now().await;
            self.inner.list_appointments(from, to, include_cancelled).await
        })
    }

    fn get_appointment(&self, id: &str) -> BoxFuture<'_, Option<Appointment>, Self::Error> {
        let id = id.to_string();
        Box::pin(async move {
            tokio::task::yield_now().await;
            self.inner.get_appointment(&id).await
        })
    }

    fn insert_appointment_if_free(
        &self,
        appointment: Appointment,
    ) -> BoxFuture<'_, InsertOutcome, Self::Error> {
        Box::pin(async move {
            tokio::task::yield_now().await;
            self.inner.insert_appointment_if_free(appointment).await
        })
    }

    fn update_appointment_status(
        &self,
        id: &str,
        status: AppointmentStatus,
    ) -> BoxFuture<'_, StatusOutcome, Self::Error> {
        let id = id.to_string();
        Box::pin(async move {
            tokio::task::yield_now().await;
            self.inner.update_appointment_status(&id, status).await
        })
    }

    fn delete_appointment(&self, id: &str) -> BoxFuture<'_, bool, Self::Error> {
        let id = id.to_string();
        Box::pin(async move {
            tokio::task::yield_now().await;
            self.inner.delete_appointment(&id).await
        })
    }

    fn get_service(&self, id: &str) -> BoxFuture<'_, Option<ServiceItem>, Self::Error> {
        let id = id.to_string();
        Box::pin(async move {
            tokio::task::yield_now().await;
            self.inner.get_service(&id).await
        })
    }

    fn save_service(&self, service: ServiceItem) -> BoxFuture<'_, (), Self::Error> {
        Box::pin(async move {
            tokio::task::yield_now().await;
            self.inner.save_service(service).await
        })
    }

    fn find_client_by_cpf(&self, cpf: &str) -> BoxFuture<'_, Option<ClientRecord>, Self::Error> {
        let cpf = cpf.to_string();
        Box::pin(async move {
            tokio::task::yield_now().await;
            self.inner.find_client_by_cpf(&cpf).await
        })
    }

    fn record_visit(&self, visit: ClientVisit) -> BoxFuture<'_, ClientRecord, Self::Error> {
        Box::pin(async move {
            tokio::task::yield_now().await;
            self.inner.record_visit(visit).await
        })
    }
}

/// An agenda whose store calls interleave under `tokio::join!`.
pub fn yielding_agenda() -> (
    Arc<YieldingStore<InMemoryAgendaStore>>,
    AgendaService<YieldingStore<InMemoryAgendaStore>>,
) {
    let store = Arc::new(YieldingStore::new(InMemoryAgendaStore::with_services([haircut()])));
    let service = AgendaService::new(
        store.clone(),
        Arc::new(FixedClock(today())),
        ScheduleConfig::default(),
    );
    (store, service)
}
