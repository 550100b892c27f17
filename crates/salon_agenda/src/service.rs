// --- File: crates/salon_agenda/src/service.rs ---
//! The agenda service.
//!
//! Every operation reads the schedule, overrides and bookings it needs from
//! the [`AgendaStore`] at call time and runs the pure engine in
//! [`crate::logic`] over them. Booking re-checks the slot right before
//! committing, and the commit itself is atomic inside the store.

use chrono::{NaiveDate, Utc};
use salon_common::models::{
    is_valid_cpf_format, normalize_cpf, Appointment, AppointmentStatus, BookingOrigin,
    ClientRecord, ClientVisit, DayOverride, DayOverview, ScheduleConfig, ScheduleConfigError,
    ServiceItem, SlotTime,
};
use salon_common::services::{AgendaStore, InsertOutcome, StatusOutcome};
use salon_common::SalonError;
use salon_config::AppConfig;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::logic::{
    blocked_hours, booked_times, classify_day, compute_available_slots, month_overview,
    AvailabilityResponse, BookSlotRequest, PreviewResponse,
};

/// Errors raised by [`AgendaService`]. Store failures are carried unmodified.
#[derive(Error, Debug)]
pub enum AgendaError<E: std::error::Error + 'static> {
    #[error("Invalid request: {0}")]
    Validation(String),
    #[error("Slot {date} {time} is already booked")]
    Conflict { date: NaiveDate, time: SlotTime },
    #[error("Slot {date} {time} is not available")]
    SlotUnavailable { date: NaiveDate, time: SlotTime },
    #[error("Online booking is disabled")]
    OnlineBookingDisabled,
    #[error("Cannot change appointment status from {from} to {to}")]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },
    #[error("{0} not found")]
    NotFound(String),
    #[error("Invalid schedule: {0}")]
    InvalidSchedule(ScheduleConfigError),
    #[error("Store error: {0}")]
    Store(#[source] E),
}

impl<E: std::error::Error + 'static> From<AgendaError<E>> for SalonError {
    fn from(err: AgendaError<E>) -> Self {
        match err {
            AgendaError::Validation(_)
            | AgendaError::SlotUnavailable { .. }
            | AgendaError::InvalidTransition { .. }
            | AgendaError::InvalidSchedule(_) => SalonError::ValidationError(err.to_string()),
            AgendaError::Conflict { .. } => SalonError::ConflictError(err.to_string()),
            AgendaError::OnlineBookingDisabled => SalonError::ForbiddenError(err.to_string()),
            AgendaError::NotFound(_) => SalonError::NotFoundError(err.to_string()),
            AgendaError::Store(e) => {
                error!("Agenda store failure: {}", e);
                SalonError::DatabaseError(e.to_string())
            }
        }
    }
}

pub type AgendaResult<T, S> = Result<T, AgendaError<<S as AgendaStore>::Error>>;

pub struct AgendaService<S: AgendaStore> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    /// Used until a schedule has been saved.
    default_schedule: ScheduleConfig,
}

impl<S: AgendaStore> AgendaService<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, default_schedule: ScheduleConfig) -> Self {
        Self {
            store,
            clock,
            default_schedule,
        }
    }

    /// Wall clock in the configured time zone, schedule defaults from config.
    pub fn from_config(store: Arc<S>, config: &AppConfig) -> Self {
        Self::new(
            store,
            Arc::new(SystemClock::from_name(&config.time_zone)),
            ScheduleConfig::from(&config.schedule),
        )
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// The schedule served while none has been saved.
    pub fn default_schedule(&self) -> &ScheduleConfig {
        &self.default_schedule
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    // --- Schedule ---

    pub async fn schedule(&self) -> AgendaResult<ScheduleConfig, S> {
        let saved = self.store.get_schedule().await.map_err(AgendaError::Store)?;
        Ok(saved.unwrap_or_else(|| self.default_schedule.clone()))
    }

    pub async fn update_schedule(&self, config: ScheduleConfig) -> AgendaResult<ScheduleConfig, S> {
        config.validate().map_err(AgendaError::InvalidSchedule)?;
        self.store
            .save_schedule(config.clone())
            .await
            .map_err(AgendaError::Store)?;
        info!(
            "Schedule updated: days {:?}, {}-{}h, lunch {}-{}h",
            config.working_days,
            config.open_hour,
            config.close_hour,
            config.lunch_start_hour,
            config.lunch_end_hour
        );
        Ok(config)
    }

    // --- Availability ---

    pub async fn available_slots(&self, date: NaiveDate) -> AgendaResult<Vec<SlotTime>, S> {
        Ok(self.availability(date).await?.slots)
    }

    /// Slots and calendar status for one day.
    pub async fn availability(&self, date: NaiveDate) -> AgendaResult<AvailabilityResponse, S> {
        let today = self.today();
        let config = self.schedule().await?;
        let day_override = self.load_override(date).await?;
        let appointments = self.load_active(date, date).await?;

        let booked = booked_times(&appointments);
        let slots = compute_available_slots(date, today, &config, day_override.as_ref(), &booked);
        let status = classify_day(date, today, &config, day_override.as_ref(), &appointments);
        Ok(AvailabilityResponse {
            date: date.to_string(),
            status,
            slots,
        })
    }

    pub async fn month_overview(&self, year: i32, month: u32) -> AgendaResult<Vec<DayOverview>, S> {
        let (first, last) = month_bounds(year, month)
            .ok_or_else(|| AgendaError::Validation(format!("invalid month {}-{}", year, month)))?;
        let config = self.schedule().await?;
        let overrides = self
            .store
            .list_overrides(first, last)
            .await
            .map_err(AgendaError::Store)?;
        let appointments = self.load_active(first, last).await?;
        Ok(month_overview(
            year,
            month,
            self.today(),
            &config,
            &overrides,
            &appointments,
        ))
    }

    // --- Booking ---

    /// Book one slot. The slot is re-checked against fresh store data and
    /// then committed atomically; losing a race yields `Conflict`.
    pub async fn book_slot(
        &self,
        request: BookSlotRequest,
        origin: BookingOrigin,
    ) -> AgendaResult<Appointment, S> {
        let time = validate_booking(&request).map_err(AgendaError::Validation)?;
        let date = request.date;

        let config = self.schedule().await?;
        if origin == BookingOrigin::PublicLink && !config.online_booking {
            warn!("Rejected public booking for {} {}: online booking is off", date, time);
            return Err(AgendaError::OnlineBookingDisabled);
        }

        let service = self.bookable_service(&request.service_id).await?;

        let day_override = self.load_override(date).await?;
        let booked = booked_times(&self.load_active(date, date).await?);
        if booked.contains(&time) {
            warn!("Slot {} {} is already booked", date, time);
            return Err(AgendaError::Conflict { date, time });
        }
        let slots = compute_available_slots(
            date,
            self.today(),
            &config,
            day_override.as_ref(),
            &booked,
        );
        if !slots.contains(&time) {
            warn!("Slot {} {} is not offered", date, time);
            return Err(AgendaError::SlotUnavailable { date, time });
        }

        let mut client = request.client;
        client.cpf = normalize_cpf(&client.cpf);
        let appointment = Appointment {
            id: Uuid::new_v4().to_string(),
            date,
            time,
            status: AppointmentStatus::Confirmed,
            client,
            service_id: service.id.clone(),
            service_name: service.name.clone(),
            payment_method: request.payment_method,
            total_cents: service.price_for(request.payment_method),
            notes: request.notes,
            origin,
            created_at: Utc::now(),
        };

        match self
            .store
            .insert_appointment_if_free(appointment)
            .await
            .map_err(AgendaError::Store)?
        {
            InsertOutcome::Inserted(appointment) => {
                info!(
                    "Booked {} {} for {} ({}, {})",
                    appointment.date,
                    appointment.time,
                    appointment.client.full_name(),
                    appointment.service_name,
                    origin.as_str()
                );
                self.record_visit(&appointment).await;
                Ok(appointment)
            }
            InsertOutcome::Occupied { holder_id } => {
                warn!(
                    "Slot {} {} was taken by {} before commit",
                    date, time, holder_id
                );
                Err(AgendaError::Conflict { date, time })
            }
        }
    }

    pub async fn list_appointments(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        include_cancelled: bool,
    ) -> AgendaResult<Vec<Appointment>, S> {
        check_range::<S::Error>(from, to)?;
        self.store
            .list_appointments(from, to, include_cancelled)
            .await
            .map_err(AgendaError::Store)
    }

    /// Move an appointment to `status`. Setting the current status is a no-op.
    pub async fn update_status(
        &self,
        id: &str,
        status: AppointmentStatus,
    ) -> AgendaResult<Appointment, S> {
        let current = self
            .store
            .get_appointment(id)
            .await
            .map_err(AgendaError::Store)?
            .ok_or_else(|| AgendaError::NotFound(format!("Appointment {}", id)))?;

        if current.status == status {
            return Ok(current);
        }
        if !current.status.can_transition_to(status) {
            return Err(AgendaError::InvalidTransition {
                from: current.status,
                to: status,
            });
        }

        match self
            .store
            .update_appointment_status(id, status)
            .await
            .map_err(AgendaError::Store)?
        {
            StatusOutcome::Updated(appointment) => {
                info!(
                    "Appointment {} moved from {} to {}",
                    id, current.status, appointment.status
                );
                Ok(appointment)
            }
            StatusOutcome::NotFound => Err(AgendaError::NotFound(format!("Appointment {}", id))),
            StatusOutcome::Occupied { holder_id } => {
                warn!(
                    "Cannot restore {}: slot {} {} now held by {}",
                    id, current.date, current.time, holder_id
                );
                Err(AgendaError::Conflict {
                    date: current.date,
                    time: current.time,
                })
            }
        }
    }

    pub async fn delete_appointment(&self, id: &str) -> AgendaResult<(), S> {
        if self
            .store
            .delete_appointment(id)
            .await
            .map_err(AgendaError::Store)?
        {
            info!("Appointment {} deleted", id);
            Ok(())
        } else {
            Err(AgendaError::NotFound(format!("Appointment {}", id)))
        }
    }

    // --- Overrides ---

    /// Insert or replace the override for its date. Malformed blocked
    /// ranges are stored as given and block nothing.
    pub async fn set_override(&self, day_override: DayOverride) -> AgendaResult<DayOverride, S> {
        if day_override.is_malformed() {
            warn!(
                "Override for {} has an unusable range {:?}-{:?}; it will block nothing",
                day_override.date, day_override.block_start_hour, day_override.block_end_hour
            );
        }
        self.store
            .upsert_override(day_override.clone())
            .await
            .map_err(AgendaError::Store)?;
        info!(
            "Override set for {}: {}",
            day_override.date,
            day_override.kind.as_str()
        );
        Ok(day_override)
    }

    pub async fn remove_override(&self, date: NaiveDate) -> AgendaResult<(), S> {
        if self
            .store
            .delete_override(date)
            .await
            .map_err(AgendaError::Store)?
        {
            info!("Override removed for {}", date);
            Ok(())
        } else {
            Err(AgendaError::NotFound(format!("Override for {}", date)))
        }
    }

    pub async fn list_overrides(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AgendaResult<Vec<DayOverride>, S> {
        check_range::<S::Error>(from, to)?;
        self.store
            .list_overrides(from, to)
            .await
            .map_err(AgendaError::Store)
    }

    /// Slots `date` would offer under `proposed`, without saving anything.
    pub async fn preview_slots(
        &self,
        date: NaiveDate,
        proposed: Option<DayOverride>,
    ) -> AgendaResult<PreviewResponse, S> {
        let config = self.schedule().await?;
        let booked = booked_times(&self.load_active(date, date).await?);
        let slots = compute_available_slots(date, self.today(), &config, proposed.as_ref(), &booked);
        Ok(PreviewResponse {
            date,
            slots,
            blocked_hours: proposed.as_ref().map(blocked_hours).unwrap_or_default(),
        })
    }

    // --- Catalog and clients ---

    pub async fn service(&self, id: &str) -> AgendaResult<ServiceItem, S> {
        self.store
            .get_service(id)
            .await
            .map_err(AgendaError::Store)?
            .ok_or_else(|| AgendaError::NotFound(format!("Service {}", id)))
    }

    pub async fn save_service(&self, service: ServiceItem) -> AgendaResult<ServiceItem, S> {
        if service.id.trim().is_empty() || service.name.trim().is_empty() {
            return Err(AgendaError::Validation(
                "service id and name are required".to_string(),
            ));
        }
        if service.price_cents < 0 {
            return Err(AgendaError::Validation(
                "service price cannot be negative".to_string(),
            ));
        }
        self.store
            .save_service(service.clone())
            .await
            .map_err(AgendaError::Store)?;
        info!("Service {} ({}) saved", service.id, service.name);
        Ok(service)
    }

    /// Look a client up by CPF; punctuation is ignored.
    pub async fn find_client_by_cpf(&self, cpf: &str) -> AgendaResult<Option<ClientRecord>, S> {
        if !is_valid_cpf_format(cpf) {
            return Err(AgendaError::Validation(
                "CPF must contain 11 digits".to_string(),
            ));
        }
        self.store
            .find_client_by_cpf(&normalize_cpf(cpf))
            .await
            .map_err(AgendaError::Store)
    }

    // --- Internals ---

    async fn bookable_service(&self, id: &str) -> AgendaResult<ServiceItem, S> {
        self.store
            .get_service(id)
            .await
            .map_err(AgendaError::Store)?
            .filter(|service| service.active)
            .ok_or_else(|| AgendaError::Validation(format!("service '{}' is not available", id)))
    }

    async fn load_override(&self, date: NaiveDate) -> AgendaResult<Option<DayOverride>, S> {
        self.store
            .get_override(date)
            .await
            .map_err(AgendaError::Store)
    }

    async fn load_active(&self, from: NaiveDate, to: NaiveDate) -> AgendaResult<Vec<Appointment>, S> {
        self.store
            .list_appointments(from, to, false)
            .await
            .map_err(AgendaError::Store)
    }

    /// Client directory bookkeeping after a booking. The booking already
    /// stands, so failures here are logged and swallowed.
    async fn record_visit(&self, appointment: &Appointment) {
        let visit = ClientVisit::from_appointment(Uuid::new_v4().to_string(), appointment, self.today());
        match self.store.record_visit(visit).await {
            Ok(record) => debug!("Recorded visit {} for client {}", record.visits, record.id),
            Err(e) => error!("Recording visit for {} failed: {}", appointment.client.cpf, e),
        }
    }
}

fn validate_booking(request: &BookSlotRequest) -> Result<SlotTime, String> {
    if !is_valid_cpf_format(&request.client.cpf) {
        return Err("CPF must contain 11 digits".to_string());
    }
    if request.client.first_name.trim().is_empty() {
        return Err("first name is required".to_string());
    }
    if request.client.phone.trim().is_empty() {
        return Err("phone is required".to_string());
    }
    if request.service_id.trim().is_empty() {
        return Err("a service must be selected".to_string());
    }
    request.time.parse::<SlotTime>().map_err(|e| e.to_string())
}

fn check_range<E: std::error::Error + 'static>(
    from: NaiveDate,
    to: NaiveDate,
) -> Result<(), AgendaError<E>> {
    if from > to {
        return Err(AgendaError::Validation(format!(
            "range start {} is after its end {}",
            from, to
        )));
    }
    Ok(())
}

fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next.pred_opt()?))
}
