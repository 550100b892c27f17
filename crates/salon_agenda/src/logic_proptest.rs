#[cfg(test)]
mod tests {
    use crate::logic::{classify_day, compute_available_slots};
    use chrono::{Datelike, Duration, NaiveDate};
    use proptest::collection::vec;
    use proptest::prelude::*;
    use salon_common::models::{DayOverride, DayStatus, ScheduleConfig, SlotTime};
    use std::collections::BTreeSet;

    fn base_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 5).unwrap()
    }

    // A schedule that always passes validation.
    fn schedule_strategy() -> impl Strategy<Value = ScheduleConfig> {
        (
            vec(any::<bool>(), 7),
            0u8..12,
            13u8..=24,
            0u8..4,
            0u8..3,
            1u32..12,
        )
            .prop_map(|(day_flags, open, close, lunch_offset, lunch_len, max)| {
                let days: BTreeSet<u8> = (0u8..7).filter(|d| day_flags[*d as usize]).collect();
                let lunch_start = (open + lunch_offset).min(close);
                let lunch_end = (lunch_start + lunch_len).min(close);
                ScheduleConfig {
                    working_days: days,
                    open_hour: open,
                    close_hour: close,
                    lunch_start_hour: lunch_start,
                    lunch_end_hour: lunch_end,
                    max_appointments_per_day: max,
                    online_booking: true,
                }
            })
    }

    fn override_strategy(date: NaiveDate) -> impl Strategy<Value = Option<DayOverride>> {
        prop_oneof![
            Just(None),
            Just(Some(DayOverride::closed(date))),
            (0u8..25, 0u8..25).prop_map(move |(start, end)| Some(DayOverride::blocked(
                date, start, end
            ))),
        ]
    }

    fn booked_strategy() -> impl Strategy<Value = BTreeSet<SlotTime>> {
        vec(0u8..24, 0..8).prop_map(|hours| {
            hours
                .into_iter()
                .filter_map(SlotTime::from_hour)
                .collect()
        })
    }

    proptest! {
        // Every offered slot respects hours, lunch, blocks and bookings
        #[test]
        fn test_slots_respect_every_exclusion(
            config in schedule_strategy(),
            offset in -3i64..30,
            seed in any::<u8>(),
            booked in booked_strategy(),
        ) {
            let date = base_day() + Duration::days(offset);
            let day_override = match seed % 3 {
                0 => None,
                1 => Some(DayOverride::closed(date)),
                _ => Some(DayOverride::blocked(date, seed % 24, (seed / 3) % 25)),
            };
            let slots = compute_available_slots(date, base_day(), &config, day_override.as_ref(), &booked);

            for slot in &slots {
                let hour = slot.hour();
                prop_assert!(config.open_hour <= hour && hour < config.close_hour);
                prop_assert!(!config.is_lunch_hour(hour));
                prop_assert!(!booked.contains(slot));
                if let Some(o) = &day_override {
                    prop_assert!(!o.blocks_hour(hour));
                }
            }
            prop_assert!(slots.windows(2).all(|w| w[0] < w[1]));
        }

        // Non-working weekdays never offer anything
        #[test]
        fn test_non_working_days_are_empty(
            config in schedule_strategy(),
            offset in 0i64..14,
            booked in booked_strategy(),
        ) {
            let date = base_day() + Duration::days(offset);
            let weekday = date.weekday().num_days_from_sunday() as u8;
            prop_assume!(!config.working_days.contains(&weekday));
            for day_override in [None, Some(DayOverride::blocked(date, 10, 12))] {
                let slots = compute_available_slots(date, base_day(), &config, day_override.as_ref(), &booked);
                prop_assert!(slots.is_empty());
            }
        }

        // Closed days are empty and classify as closed or past
        #[test]
        fn test_closed_override_always_wins(
            config in schedule_strategy(),
            offset in -5i64..14,
        ) {
            let date = base_day() + Duration::days(offset);
            let closed = DayOverride::closed(date);
            let slots = compute_available_slots(date, base_day(), &config, Some(&closed), &BTreeSet::new());
            prop_assert!(slots.is_empty());
            let status = classify_day(date, base_day(), &config, Some(&closed), &[]);
            prop_assert!(matches!(status, DayStatus::Closed | DayStatus::PastOrNonworking));
        }

        // Past dates are past whatever the override says
        #[test]
        fn test_past_dates_are_past_or_nonworking(
            config in schedule_strategy(),
            days_back in 1i64..400,
            day_override in override_strategy(base_day()),
        ) {
            let date = base_day() - Duration::days(days_back);
            let day_override = day_override.map(|o| DayOverride { date, ..o });
            let status = classify_day(date, base_day(), &config, day_override.as_ref(), &[]);
            prop_assert_eq!(status, DayStatus::PastOrNonworking);
        }

        // Recomputing gives the same answer
        #[test]
        fn test_computation_is_deterministic(
            config in schedule_strategy(),
            offset in 0i64..14,
            booked in booked_strategy(),
        ) {
            let date = base_day() + Duration::days(offset);
            let first = compute_available_slots(date, base_day(), &config, None, &booked);
            let second = compute_available_slots(date, base_day(), &config, None, &booked);
            prop_assert_eq!(first, second);
        }
    }
}
