#[cfg(test)]
mod tests {
    use crate::service::AgendaError;
    use crate::test_support::{agenda, booking, hours, slot, today, tuesday, yielding_agenda};
    use chrono::NaiveDate;
    use salon_common::models::{
        AppointmentStatus, BookingOrigin, DayOverride, PaymentMethod, ScheduleConfig,
    };
    use salon_common::services::AgendaStore;
    use salon_common::{HttpStatusCode, SalonError};

    #[tokio::test]
    async fn test_booking_removes_slot_and_cancel_restores_it() {
        let (_, service) = agenda();
        let appointment = service
            .book_slot(booking(tuesday(), "14:00"), BookingOrigin::PublicLink)
            .await
            .unwrap();
        assert_eq!(appointment.time, slot(14));
        assert_eq!(appointment.status, AppointmentStatus::Confirmed);
        assert_eq!(appointment.total_cents, 7_500, "pix price applies");
        assert_eq!(appointment.client.cpf, "12345678900");

        let slots = service.available_slots(tuesday()).await.unwrap();
        assert_eq!(hours(&slots), vec![9, 10, 11, 13, 15, 16, 17, 18]);

        service
            .update_status(&appointment.id, AppointmentStatus::Cancelled)
            .await
            .unwrap();
        let slots = service.available_slots(tuesday()).await.unwrap();
        assert_eq!(slots.len(), 9);
    }

    #[tokio::test]
    async fn test_second_booking_of_same_slot_conflicts() {
        let (store, service) = agenda();
        service
            .book_slot(booking(tuesday(), "14:00"), BookingOrigin::PublicLink)
            .await
            .unwrap();
        let err = service
            .book_slot(booking(tuesday(), "14:00"), BookingOrigin::AdminPanel)
            .await
            .unwrap_err();
        assert!(matches!(err, AgendaError::Conflict { .. }));
        assert_eq!(SalonError::from(err).status_code(), 409);

        let stored = store.list_appointments(tuesday(), tuesday(), true).await.unwrap();
        assert_eq!(stored.len(), 1, "the first booking is never overwritten");
    }

    #[tokio::test]
    async fn test_concurrent_bookings_yield_one_winner() {
        let (store, service) = yielding_agenda();
        let (first, second) = tokio::join!(
            service.book_slot(booking(tuesday(), "10:00"), BookingOrigin::PublicLink),
            service.book_slot(booking(tuesday(), "10:00"), BookingOrigin::PublicLink),
        );
        let results = [first, second];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(AgendaError::Conflict { .. }))));

        let stored = store.list_appointments(tuesday(), tuesday(), false).await.unwrap();
        assert_eq!(stored.len(), 1);
        let record = store.find_client_by_cpf("12345678900").await.unwrap().unwrap();
        assert_eq!(record.visits, 1, "the losing booking is not counted");
    }

    #[tokio::test]
    async fn test_concurrent_bookings_by_one_client_all_count() {
        let (store, service) = yielding_agenda();
        let (first, second) = tokio::join!(
            service.book_slot(booking(tuesday(), "10:00"), BookingOrigin::PublicLink),
            service.book_slot(booking(tuesday(), "11:00"), BookingOrigin::PublicLink),
        );
        first.unwrap();
        second.unwrap();

        let record = store.find_client_by_cpf("12345678900").await.unwrap().unwrap();
        assert_eq!(record.visits, 2);
        assert_eq!(record.total_spent_cents, 2 * 7_500);
    }

    #[tokio::test]
    async fn test_unoffered_slots_are_rejected() {
        let (_, service) = agenda();
        for time in ["12:00", "08:00", "19:00"] {
            let err = service
                .book_slot(booking(tuesday(), time), BookingOrigin::AdminPanel)
                .await
                .unwrap_err();
            assert!(
                matches!(err, AgendaError::SlotUnavailable { .. }),
                "{} should be unavailable",
                time
            );
        }

        let past = NaiveDate::from_ymd_opt(2025, 5, 3).unwrap();
        let err = service
            .book_slot(booking(past, "10:00"), BookingOrigin::AdminPanel)
            .await
            .unwrap_err();
        assert!(matches!(err, AgendaError::SlotUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_booking_validation() {
        let (_, service) = agenda();

        let mut request = booking(tuesday(), "14:00");
        request.client.cpf = "123".to_string();
        let err = service
            .book_slot(request, BookingOrigin::PublicLink)
            .await
            .unwrap_err();
        assert!(matches!(err, AgendaError::Validation(_)));

        let mut request = booking(tuesday(), "14:30");
        request.client.first_name = "Ana".to_string();
        let err = service
            .book_slot(request, BookingOrigin::PublicLink)
            .await
            .unwrap_err();
        assert!(matches!(err, AgendaError::Validation(_)));

        let mut request = booking(tuesday(), "14:00");
        request.client.phone = "  ".to_string();
        assert!(matches!(
            service.book_slot(request, BookingOrigin::PublicLink).await,
            Err(AgendaError::Validation(_))
        ));

        let mut request = booking(tuesday(), "14:00");
        request.service_id = "999".to_string();
        assert!(matches!(
            service.book_slot(request, BookingOrigin::PublicLink).await,
            Err(AgendaError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_public_booking_respects_online_switch() {
        let (_, service) = agenda();
        service
            .update_schedule(ScheduleConfig {
                online_booking: false,
                ..ScheduleConfig::default()
            })
            .await
            .unwrap();

        let err = service
            .book_slot(booking(tuesday(), "14:00"), BookingOrigin::PublicLink)
            .await
            .unwrap_err();
        assert!(matches!(err, AgendaError::OnlineBookingDisabled));
        assert_eq!(SalonError::from(err).status_code(), 403);

        let admin = service
            .book_slot(booking(tuesday(), "14:00"), BookingOrigin::AdminPanel)
            .await
            .unwrap();
        assert_eq!(admin.origin, BookingOrigin::AdminPanel);
    }

    #[tokio::test]
    async fn test_status_transitions() {
        let (_, service) = agenda();
        let appointment = service
            .book_slot(booking(tuesday(), "09:00"), BookingOrigin::AdminPanel)
            .await
            .unwrap();

        let same = service
            .update_status(&appointment.id, AppointmentStatus::Confirmed)
            .await
            .unwrap();
        assert_eq!(same, appointment);

        service
            .update_status(&appointment.id, AppointmentStatus::Cancelled)
            .await
            .unwrap();
        let err = service
            .update_status(&appointment.id, AppointmentStatus::Completed)
            .await
            .unwrap_err();
        assert!(matches!(err, AgendaError::InvalidTransition { .. }));

        let restored = service
            .update_status(&appointment.id, AppointmentStatus::Confirmed)
            .await
            .unwrap();
        assert_eq!(restored.status, AppointmentStatus::Confirmed);

        let err = service
            .update_status("missing", AppointmentStatus::Cancelled)
            .await
            .unwrap_err();
        assert!(matches!(err, AgendaError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_restore_into_taken_slot_conflicts() {
        let (_, service) = agenda();
        let first = service
            .book_slot(booking(tuesday(), "16:00"), BookingOrigin::AdminPanel)
            .await
            .unwrap();
        service
            .update_status(&first.id, AppointmentStatus::Cancelled)
            .await
            .unwrap();
        service
            .book_slot(booking(tuesday(), "16:00"), BookingOrigin::AdminPanel)
            .await
            .unwrap();

        let err = service
            .update_status(&first.id, AppointmentStatus::Confirmed)
            .await
            .unwrap_err();
        assert!(matches!(err, AgendaError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_delete_frees_slot() {
        let (_, service) = agenda();
        let appointment = service
            .book_slot(booking(tuesday(), "11:00"), BookingOrigin::AdminPanel)
            .await
            .unwrap();
        service.delete_appointment(&appointment.id).await.unwrap();
        assert_eq!(service.available_slots(tuesday()).await.unwrap().len(), 9);
        assert!(matches!(
            service.delete_appointment(&appointment.id).await,
            Err(AgendaError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_overrides_round_trip_through_service() {
        let (_, service) = agenda();
        service
            .set_override(DayOverride::blocked(tuesday(), 15, 17))
            .await
            .unwrap();
        let slots = service.available_slots(tuesday()).await.unwrap();
        assert_eq!(hours(&slots), vec![9, 10, 11, 13, 14, 17, 18]);

        service.set_override(DayOverride::closed(tuesday())).await.unwrap();
        assert!(service.available_slots(tuesday()).await.unwrap().is_empty());

        let listed = service.list_overrides(today(), tuesday()).await.unwrap();
        assert_eq!(listed, vec![DayOverride::closed(tuesday())]);

        service.remove_override(tuesday()).await.unwrap();
        assert_eq!(service.available_slots(tuesday()).await.unwrap().len(), 9);
        assert!(matches!(
            service.remove_override(tuesday()).await,
            Err(AgendaError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_malformed_override_is_stored_and_blocks_nothing() {
        let (_, service) = agenda();
        service
            .set_override(DayOverride::blocked(tuesday(), 17, 15))
            .await
            .unwrap();
        assert_eq!(service.available_slots(tuesday()).await.unwrap().len(), 9);
    }

    #[tokio::test]
    async fn test_preview_does_not_persist() {
        let (_, service) = agenda();
        let preview = service
            .preview_slots(tuesday(), Some(DayOverride::blocked(tuesday(), 9, 12)))
            .await
            .unwrap();
        assert_eq!(hours(&preview.slots), vec![13, 14, 15, 16, 17, 18]);
        assert_eq!(preview.blocked_hours, vec![9, 10, 11]);
        assert_eq!(service.available_slots(tuesday()).await.unwrap().len(), 9);
    }

    #[tokio::test]
    async fn test_schedule_update_is_validated() {
        let (_, service) = agenda();
        let err = service
            .update_schedule(ScheduleConfig {
                open_hour: 20,
                ..ScheduleConfig::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AgendaError::InvalidSchedule(_)));
        assert_eq!(service.schedule().await.unwrap(), ScheduleConfig::default());
    }

    #[tokio::test]
    async fn test_booking_records_client_visits() {
        let (_, service) = agenda();
        service
            .book_slot(booking(tuesday(), "09:00"), BookingOrigin::PublicLink)
            .await
            .unwrap();
        let mut second = booking(tuesday(), "10:00");
        second.payment_method = PaymentMethod::Cash;
        service
            .book_slot(second, BookingOrigin::PublicLink)
            .await
            .unwrap();

        let client = service
            .find_client_by_cpf("123.456.789-00")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(client.visits, 2);
        assert_eq!(client.total_spent_cents, 7_500 + 8_000);
        assert_eq!(client.last_visit, Some(tuesday()));
        assert_eq!(client.registered_on, today());
        assert_eq!(client.name, "Ana Souza");

        assert!(service
            .find_client_by_cpf("98765432100")
            .await
            .unwrap()
            .is_none());
        assert!(matches!(
            service.find_client_by_cpf("123").await,
            Err(AgendaError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_month_overview_rejects_bad_month() {
        let (_, service) = agenda();
        assert!(matches!(
            service.month_overview(2025, 0).await,
            Err(AgendaError::Validation(_))
        ));
        let days = service.month_overview(2025, 5).await.unwrap();
        assert_eq!(days.len(), 31);
    }
}
