// --- File: crates/salon_agenda/src/routes.rs ---

use crate::handlers::{
    admin_book_slot_handler, book_slot_handler, delete_appointment_handler,
    delete_override_handler, get_availability_handler, get_calendar_handler, get_schedule_handler,
    get_service_handler, list_appointments_handler, list_overrides_handler,
    lookup_client_handler, preview_override_handler, put_override_handler, put_service_handler,
    update_schedule_handler, update_status_handler, AgendaState,
};
use crate::service::AgendaService;
use axum::{
    routing::{get, patch, post, put},
    Router,
};
use salon_common::services::AgendaStore;
use std::sync::Arc;

/// Creates a router containing all agenda routes, public and admin.
/// The backend nests it under `/api`.
pub fn routes<S: AgendaStore + 'static>(service: AgendaService<S>) -> Router {
    let state = Arc::new(AgendaState { service });

    Router::new()
        .route("/availability", get(get_availability_handler::<S>))
        .route("/calendar", get(get_calendar_handler::<S>))
        .route("/book", post(book_slot_handler::<S>))
        .route("/clients/lookup", get(lookup_client_handler::<S>))
        .route("/services/{id}", get(get_service_handler::<S>))
        .route(
            "/admin/appointments",
            get(list_appointments_handler::<S>).post(admin_book_slot_handler::<S>),
        )
        .route(
            "/admin/appointments/{id}/status",
            patch(update_status_handler::<S>),
        )
        .route(
            "/admin/appointments/{id}",
            axum::routing::delete(delete_appointment_handler::<S>),
        )
        .route(
            "/admin/schedule",
            get(get_schedule_handler::<S>).put(update_schedule_handler::<S>),
        )
        .route("/admin/overrides", get(list_overrides_handler::<S>))
        .route(
            "/admin/overrides/preview",
            post(preview_override_handler::<S>),
        )
        .route(
            "/admin/overrides/{date}",
            put(put_override_handler::<S>).delete(delete_override_handler::<S>),
        )
        .route("/admin/services/{id}", put(put_service_handler::<S>))
        .with_state(state)
}
