// File: crates/salon_agenda/src/doc.rs

#![allow(dead_code)]
#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::logic::{
    AppointmentsResponse, AvailabilityResponse, BookSlotRequest, CalendarResponse,
    OverrideRequest, OverridesResponse, PreviewRequest, PreviewResponse, StatusUpdateRequest,
};
use salon_common::models::{
    Appointment, AppointmentStatus, BookingOrigin, ClientDetails, ClientRecord, DayOverride,
    DayOverview, DayStatus, OverrideKind, PaymentMethod, ScheduleConfig, ServiceItem,
};

#[utoipa::path(
    get,
    path = "/availability",
    params(
        ("date" = String, Query, description = "Day in YYYY-MM-DD format", example = "2025-05-06", format = "date")
    ),
    responses(
        (status = 200, description = "Free slots and day status; empty for past or malformed dates", body = AvailabilityResponse,
         example = json!({
             "date": "2025-05-06",
             "status": "OCCUPIED",
             "slots": ["09:00", "10:00", "11:00", "13:00", "15:00", "16:00", "17:00", "18:00"]
         })
        ),
        (status = 500, description = "Store failure")
    ),
    tag = "agenda"
)]
fn doc_get_availability_handler() {}

#[utoipa::path(
    get,
    path = "/calendar",
    params(
        ("year" = i32, Query, example = 2025),
        ("month" = u32, Query, example = 5)
    ),
    responses(
        (status = 200, description = "Status of every day in the month", body = CalendarResponse),
        (status = 400, description = "Invalid month")
    ),
    tag = "agenda"
)]
fn doc_get_calendar_handler() {}

#[utoipa::path(
    post,
    path = "/book",
    request_body(content = BookSlotRequest, example = json!({
        "date": "2025-05-06",
        "time": "14:00",
        "client": {
            "first_name": "Ana",
            "last_name": "Souza",
            "phone": "(11) 99999-0000",
            "cpf": "123.456.789-00"
        },
        "service_id": "1",
        "payment_method": "PIX"
    })),
    responses(
        (status = 201, description = "Appointment created", body = Appointment),
        (status = 400, description = "Invalid request or slot not offered"),
        (status = 403, description = "Online booking is disabled"),
        (status = 409, description = "Slot already booked",
         example = json!({"error": {"message": "Conflict: Slot 2025-05-06 14:00 is already booked", "code": 409}})
        )
    ),
    tag = "agenda"
)]
fn doc_book_slot_handler() {}

#[utoipa::path(
    get,
    path = "/clients/lookup",
    params(
        ("cpf" = String, Query, description = "CPF, punctuation allowed", example = "123.456.789-00")
    ),
    responses(
        (status = 200, description = "Known client", body = ClientRecord),
        (status = 400, description = "CPF does not have 11 digits"),
        (status = 404, description = "No client with this CPF")
    ),
    tag = "agenda"
)]
fn doc_lookup_client_handler() {}

#[utoipa::path(
    get,
    path = "/admin/appointments",
    params(
        ("from" = String, Query, format = "date", example = "2025-05-01"),
        ("to" = String, Query, format = "date", example = "2025-05-31"),
        ("include_cancelled" = bool, Query, example = false)
    ),
    responses(
        (status = 200, description = "Appointments ordered by date and time", body = AppointmentsResponse)
    ),
    tag = "admin"
)]
fn doc_list_appointments_handler() {}

#[utoipa::path(
    post,
    path = "/admin/appointments",
    request_body = BookSlotRequest,
    responses(
        (status = 201, description = "Appointment created", body = Appointment),
        (status = 400, description = "Invalid request or slot not offered"),
        (status = 409, description = "Slot already booked")
    ),
    tag = "admin"
)]
fn doc_admin_book_slot_handler() {}

#[utoipa::path(
    patch,
    path = "/admin/appointments/{id}/status",
    params(("id" = String, Path, description = "Appointment id")),
    request_body(content = StatusUpdateRequest, example = json!({"status": "COMPLETED"})),
    responses(
        (status = 200, description = "Updated appointment", body = Appointment),
        (status = 400, description = "Transition not allowed"),
        (status = 404, description = "Appointment not found"),
        (status = 409, description = "Restoring would double-book the slot")
    ),
    tag = "admin"
)]
fn doc_update_status_handler() {}

#[utoipa::path(
    delete,
    path = "/admin/appointments/{id}",
    params(("id" = String, Path, description = "Appointment id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Appointment not found")
    ),
    tag = "admin"
)]
fn doc_delete_appointment_handler() {}

#[utoipa::path(
    get,
    path = "/admin/schedule",
    responses((status = 200, description = "Current weekly schedule", body = ScheduleConfig)),
    tag = "admin"
)]
fn doc_get_schedule_handler() {}

#[utoipa::path(
    put,
    path = "/admin/schedule",
    request_body = ScheduleConfig,
    responses(
        (status = 200, description = "Saved schedule", body = ScheduleConfig),
        (status = 400, description = "Inconsistent hours or weekdays")
    ),
    tag = "admin"
)]
fn doc_update_schedule_handler() {}

#[utoipa::path(
    get,
    path = "/admin/overrides",
    params(
        ("from" = String, Query, format = "date"),
        ("to" = String, Query, format = "date")
    ),
    responses((status = 200, description = "Overrides ordered by date", body = OverridesResponse)),
    tag = "admin"
)]
fn doc_list_overrides_handler() {}

#[utoipa::path(
    put,
    path = "/admin/overrides/{date}",
    params(("date" = String, Path, format = "date", example = "2025-12-24")),
    request_body(content = OverrideRequest, example = json!({
        "kind": "BLOCKED_RANGE",
        "block_start_hour": 15,
        "block_end_hour": 17
    })),
    responses(
        (status = 200, description = "Saved override", body = DayOverride),
        (status = 400, description = "Invalid date")
    ),
    tag = "admin"
)]
fn doc_put_override_handler() {}

#[utoipa::path(
    delete,
    path = "/admin/overrides/{date}",
    params(("date" = String, Path, format = "date")),
    responses(
        (status = 204, description = "Removed"),
        (status = 404, description = "No override on that date")
    ),
    tag = "admin"
)]
fn doc_delete_override_handler() {}

#[utoipa::path(
    post,
    path = "/admin/overrides/preview",
    request_body = PreviewRequest,
    responses((status = 200, description = "Slots under the proposed override", body = PreviewResponse)),
    tag = "admin"
)]
fn doc_preview_override_handler() {}

#[utoipa::path(
    get,
    path = "/services/{id}",
    params(("id" = String, Path)),
    responses(
        (status = 200, description = "Catalog entry", body = ServiceItem),
        (status = 404, description = "Unknown service")
    ),
    tag = "agenda"
)]
fn doc_get_service_handler() {}

#[utoipa::path(
    put,
    path = "/admin/services/{id}",
    params(("id" = String, Path)),
    request_body = ServiceItem,
    responses(
        (status = 200, description = "Saved catalog entry", body = ServiceItem),
        (status = 400, description = "Missing name or negative price")
    ),
    tag = "admin"
)]
fn doc_put_service_handler() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        doc_get_availability_handler,
        doc_get_calendar_handler,
        doc_book_slot_handler,
        doc_lookup_client_handler,
        doc_list_appointments_handler,
        doc_admin_book_slot_handler,
        doc_update_status_handler,
        doc_delete_appointment_handler,
        doc_get_schedule_handler,
        doc_update_schedule_handler,
        doc_list_overrides_handler,
        doc_put_override_handler,
        doc_delete_override_handler,
        doc_preview_override_handler,
        doc_get_service_handler,
        doc_put_service_handler
    ),
    components(
        schemas(
            AvailabilityResponse,
            CalendarResponse,
            BookSlotRequest,
            StatusUpdateRequest,
            AppointmentsResponse,
            OverrideRequest,
            OverridesResponse,
            PreviewRequest,
            PreviewResponse,
            Appointment,
            AppointmentStatus,
            BookingOrigin,
            ClientDetails,
            ClientRecord,
            DayOverride,
            DayOverview,
            DayStatus,
            OverrideKind,
            PaymentMethod,
            ScheduleConfig,
            ServiceItem
        )
    ),
    tags(
        (name = "agenda", description = "Public availability and booking"),
        (name = "admin", description = "Appointments, schedule and overrides")
    ),
    servers(
        (url = "/api", description = "Salon agenda API")
    )
)]
pub struct AgendaApiDoc;
