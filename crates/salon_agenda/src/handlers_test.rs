#[cfg(test)]
mod tests {
    use crate::handlers::{
        book_slot_handler, get_availability_handler, lookup_client_handler,
        put_override_handler, AgendaState,
    };
    use crate::logic::{AvailabilityQuery, ClientLookupQuery, OverrideRequest};
    use crate::store::InMemoryAgendaStore;
    use crate::test_support::{agenda, booking, hours, tuesday};
    use axum::extract::{Path, Query, State};
    use axum::http::StatusCode;
    use axum::Json;
    use salon_common::models::{DayStatus, OverrideKind};
    use salon_common::HttpStatusCode;
    use std::sync::Arc;

    fn state() -> Arc<AgendaState<InMemoryAgendaStore>> {
        let (_, service) = agenda();
        Arc::new(AgendaState { service })
    }

    #[tokio::test]
    async fn test_get_availability_handler() {
        let state = state();
        let Json(response) = get_availability_handler(
            State(state),
            Query(AvailabilityQuery {
                date: "2025-05-06".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(response.status, DayStatus::Open);
        assert_eq!(hours(&response.slots), vec![9, 10, 11, 13, 14, 15, 16, 17, 18]);
    }

    #[tokio::test]
    async fn test_get_availability_handler_is_lenient() {
        for raw in ["not-a-date", "2025-02-30", "2025-05-01"] {
            let Json(response) = get_availability_handler(
                State(state()),
                Query(AvailabilityQuery {
                    date: raw.to_string(),
                }),
            )
            .await
            .unwrap();
            assert!(response.slots.is_empty(), "{} should have no slots", raw);
            assert_eq!(response.status, DayStatus::PastOrNonworking);
        }
    }

    #[tokio::test]
    async fn test_book_slot_handler() {
        let state = state();
        let (status, Json(appointment)) =
            book_slot_handler(State(state.clone()), Json(booking(tuesday(), "14:00")))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(appointment.time.to_string(), "14:00");

        let err = book_slot_handler(State(state), Json(booking(tuesday(), "14:00")))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 409);
    }

    #[tokio::test]
    async fn test_put_override_handler_rejects_bad_path_date() {
        let err = put_override_handler(
            State(state()),
            Path("24/12/2025".to_string()),
            Json(OverrideRequest {
                kind: OverrideKind::Closed,
                block_start_hour: None,
                block_end_hour: None,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_lookup_client_handler_not_found() {
        let err = lookup_client_handler(
            State(state()),
            Query(ClientLookupQuery {
                cpf: "111.222.333-44".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status_code(), 404);
    }
}
