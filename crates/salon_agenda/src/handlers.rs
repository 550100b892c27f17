// File: crates/salon_agenda/src/handlers.rs
use crate::logic::{
    AppointmentsQuery, AppointmentsResponse, AvailabilityQuery, AvailabilityResponse,
    BookSlotRequest, CalendarQuery, CalendarResponse, ClientLookupQuery, OverrideRequest,
    OverridesQuery, OverridesResponse, PreviewRequest, PreviewResponse, StatusUpdateRequest,
};
use crate::service::AgendaService;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::NaiveDate;
use salon_common::models::{
    Appointment, BookingOrigin, ClientRecord, DayOverride, DayStatus, ScheduleConfig, ServiceItem,
};
use salon_common::services::AgendaStore;
use salon_common::{not_found, validation_error, SalonError};
use std::sync::Arc;
use tracing::{debug, info};

// Shared state for the agenda handlers
pub struct AgendaState<S: AgendaStore> {
    pub service: AgendaService<S>,
}

type SharedState<S> = State<Arc<AgendaState<S>>>;

fn parse_date(raw: &str) -> Result<NaiveDate, SalonError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| validation_error(format!("Invalid date '{}' (YYYY-MM-DD)", raw)))
}

/// Handler to get the free slots of one day.
///
/// A malformed date is answered with an empty day rather than an error.
pub async fn get_availability_handler<S: AgendaStore + 'static>(
    State(state): SharedState<S>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, SalonError> {
    let Ok(date) = parse_date(&query.date) else {
        debug!("Availability asked for malformed date '{}'", query.date);
        return Ok(Json(AvailabilityResponse {
            date: query.date,
            status: DayStatus::PastOrNonworking,
            slots: Vec::new(),
        }));
    };
    Ok(Json(state.service.availability(date).await?))
}

pub async fn get_calendar_handler<S: AgendaStore + 'static>(
    State(state): SharedState<S>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<CalendarResponse>, SalonError> {
    let days = state.service.month_overview(query.year, query.month).await?;
    Ok(Json(CalendarResponse {
        year: query.year,
        month: query.month,
        days,
    }))
}

/// Booking through the public link.
pub async fn book_slot_handler<S: AgendaStore + 'static>(
    State(state): SharedState<S>,
    Json(request): Json<BookSlotRequest>,
) -> Result<(StatusCode, Json<Appointment>), SalonError> {
    info!("Public booking request for {} {}", request.date, request.time);
    let appointment = state
        .service
        .book_slot(request, BookingOrigin::PublicLink)
        .await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

/// Booking from the admin panel; not subject to the online-booking switch.
pub async fn admin_book_slot_handler<S: AgendaStore + 'static>(
    State(state): SharedState<S>,
    Json(request): Json<BookSlotRequest>,
) -> Result<(StatusCode, Json<Appointment>), SalonError> {
    info!("Admin booking request for {} {}", request.date, request.time);
    let appointment = state
        .service
        .book_slot(request, BookingOrigin::AdminPanel)
        .await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

pub async fn lookup_client_handler<S: AgendaStore + 'static>(
    State(state): SharedState<S>,
    Query(query): Query<ClientLookupQuery>,
) -> Result<Json<ClientRecord>, SalonError> {
    state
        .service
        .find_client_by_cpf(&query.cpf)
        .await?
        .map(Json)
        .ok_or_else(|| not_found("No client with this CPF"))
}

pub async fn list_appointments_handler<S: AgendaStore + 'static>(
    State(state): SharedState<S>,
    Query(query): Query<AppointmentsQuery>,
) -> Result<Json<AppointmentsResponse>, SalonError> {
    let appointments = state
        .service
        .list_appointments(
            query.from,
            query.to,
            query.include_cancelled.unwrap_or(false),
        )
        .await?;
    Ok(Json(AppointmentsResponse { appointments }))
}

pub async fn update_status_handler<S: AgendaStore + 'static>(
    State(state): SharedState<S>,
    Path(id): Path<String>,
    Json(request): Json<StatusUpdateRequest>,
) -> Result<Json<Appointment>, SalonError> {
    Ok(Json(state.service.update_status(&id, request.status).await?))
}

pub async fn delete_appointment_handler<S: AgendaStore + 'static>(
    State(state): SharedState<S>,
    Path(id): Path<String>,
) -> Result<StatusCode, SalonError> {
    state.service.delete_appointment(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_schedule_handler<S: AgendaStore + 'static>(
    State(state): SharedState<S>,
) -> Result<Json<ScheduleConfig>, SalonError> {
    Ok(Json(state.service.schedule().await?))
}

pub async fn update_schedule_handler<S: AgendaStore + 'static>(
    State(state): SharedState<S>,
    Json(config): Json<ScheduleConfig>,
) -> Result<Json<ScheduleConfig>, SalonError> {
    Ok(Json(state.service.update_schedule(config).await?))
}

pub async fn list_overrides_handler<S: AgendaStore + 'static>(
    State(state): SharedState<S>,
    Query(query): Query<OverridesQuery>,
) -> Result<Json<OverridesResponse>, SalonError> {
    let overrides = state.service.list_overrides(query.from, query.to).await?;
    Ok(Json(OverridesResponse { overrides }))
}

pub async fn put_override_handler<S: AgendaStore + 'static>(
    State(state): SharedState<S>,
    Path(date): Path<String>,
    Json(request): Json<OverrideRequest>,
) -> Result<Json<DayOverride>, SalonError> {
    let date = parse_date(&date)?;
    Ok(Json(state.service.set_override(request.for_date(date)).await?))
}

pub async fn delete_override_handler<S: AgendaStore + 'static>(
    State(state): SharedState<S>,
    Path(date): Path<String>,
) -> Result<StatusCode, SalonError> {
    let date = parse_date(&date)?;
    state.service.remove_override(date).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn preview_override_handler<S: AgendaStore + 'static>(
    State(state): SharedState<S>,
    Json(request): Json<PreviewRequest>,
) -> Result<Json<PreviewResponse>, SalonError> {
    let proposed = request.proposed.map(|p| p.for_date(request.date));
    Ok(Json(state.service.preview_slots(request.date, proposed).await?))
}

pub async fn get_service_handler<S: AgendaStore + 'static>(
    State(state): SharedState<S>,
    Path(id): Path<String>,
) -> Result<Json<ServiceItem>, SalonError> {
    Ok(Json(state.service.service(&id).await?))
}

/// Create or replace a catalog entry; the id in the path wins.
pub async fn put_service_handler<S: AgendaStore + 'static>(
    State(state): SharedState<S>,
    Path(id): Path<String>,
    Json(mut service): Json<ServiceItem>,
) -> Result<Json<ServiceItem>, SalonError> {
    service.id = id;
    Ok(Json(state.service.save_service(service).await?))
}
