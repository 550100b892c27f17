// --- File: crates/salon_agenda/src/logic.rs ---
use chrono::{Datelike, NaiveDate};
use salon_common::models::{
    Appointment, AppointmentStatus, ClientDetails, DayOverride, DayOverview, DayStatus,
    OverrideKind, PaymentMethod, ScheduleConfig, SlotTime,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

// --- Data Structures ---

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams, ToSchema))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct AvailabilityQuery {
    /// Day in YYYY-MM-DD format
    #[cfg_attr(feature = "openapi", schema(format = "date", example = "2025-05-06"))]
    pub date: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct AvailabilityResponse {
    #[cfg_attr(feature = "openapi", schema(example = "2025-05-06"))]
    pub date: String,
    pub status: DayStatus,
    #[cfg_attr(feature = "openapi", schema(value_type = Vec<String>, example = json!(["09:00", "10:00"])))]
    pub slots: Vec<SlotTime>,
}

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams, ToSchema))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct CalendarQuery {
    #[cfg_attr(feature = "openapi", schema(example = 2025))]
    pub year: i32,
    #[cfg_attr(feature = "openapi", schema(example = 5))]
    pub month: u32,
}

#[derive(Serialize, Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CalendarResponse {
    pub year: i32,
    pub month: u32,
    pub days: Vec<DayOverview>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct BookSlotRequest {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = Date, example = "2025-05-06"))]
    pub date: NaiveDate,
    /// Slot start as HH:00
    #[cfg_attr(feature = "openapi", schema(example = "14:00"))]
    pub time: String,
    pub client: ClientDetails,
    pub service_id: String,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct StatusUpdateRequest {
    pub status: AppointmentStatus,
}

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams, ToSchema))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct AppointmentsQuery {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = Date))]
    pub from: NaiveDate,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = Date))]
    pub to: NaiveDate,
    pub include_cancelled: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct AppointmentsResponse {
    pub appointments: Vec<Appointment>,
}

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams, ToSchema))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct OverridesQuery {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = Date))]
    pub from: NaiveDate,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = Date))]
    pub to: NaiveDate,
}

#[derive(Serialize, Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct OverridesResponse {
    pub overrides: Vec<DayOverride>,
}

/// Body of `PUT /admin/overrides/{date}`; the date comes from the path.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct OverrideRequest {
    pub kind: OverrideKind,
    #[serde(default)]
    pub block_start_hour: Option<u8>,
    #[serde(default)]
    pub block_end_hour: Option<u8>,
}

impl OverrideRequest {
    pub fn for_date(self, date: NaiveDate) -> DayOverride {
        DayOverride {
            date,
            kind: self.kind,
            block_start_hour: self.block_start_hour,
            block_end_hour: self.block_end_hour,
        }
    }
}

/// Slots a day would offer under a proposed override. No override means
/// "as if the day had none".
#[derive(Serialize, Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct PreviewRequest {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = Date))]
    pub date: NaiveDate,
    #[serde(default, rename = "override")]
    pub proposed: Option<OverrideRequest>,
}

#[derive(Serialize, Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct PreviewResponse {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = Date))]
    pub date: NaiveDate,
    #[cfg_attr(feature = "openapi", schema(value_type = Vec<String>))]
    pub slots: Vec<SlotTime>,
    /// Hours the proposed override blocks, empty when it blocks nothing.
    pub blocked_hours: Vec<u8>,
}

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams, ToSchema))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct ClientLookupQuery {
    #[cfg_attr(feature = "openapi", schema(example = "123.456.789-00"))]
    pub cpf: String,
}

// --- Availability Logic ---

/// Start times of the active appointments in `appointments`.
pub fn booked_times<'a, I>(appointments: I) -> BTreeSet<SlotTime>
where
    I: IntoIterator<Item = &'a Appointment>,
{
    appointments
        .into_iter()
        .filter(|a| a.is_active())
        .map(|a| a.time)
        .collect()
}

/// Hours an override takes out of the day. Closed days block every hour;
/// malformed ranges block none.
pub fn blocked_hours(day_override: &DayOverride) -> Vec<u8> {
    match day_override.kind {
        OverrideKind::Closed => (0..24).collect(),
        OverrideKind::BlockedRange => day_override
            .blocked_range()
            .map(|range| range.collect())
            .unwrap_or_default(),
    }
}

/// Whole-hour slots still bookable on `date`, in ascending order.
///
/// Nothing is offered before `today`, on a non-working weekday, or on a
/// closed day. Otherwise every hour in `[open_hour, close_hour)` is offered
/// unless it falls in lunch, in the override's blocked range, or in `booked`.
/// Earlier hours of `today` itself are still offered.
pub fn compute_available_slots(
    date: NaiveDate,
    today: NaiveDate,
    config: &ScheduleConfig,
    day_override: Option<&DayOverride>,
    booked: &BTreeSet<SlotTime>,
) -> Vec<SlotTime> {
    if date < today || !config.is_working_day(date) {
        debug!("No slots on {}: past or non-working day", date);
        return Vec::new();
    }
    if day_override.is_some_and(DayOverride::is_closed) {
        debug!("No slots on {}: closed by override", date);
        return Vec::new();
    }

    let slots: Vec<SlotTime> = (config.open_hour..config.close_hour.min(24))
        .filter(|hour| !config.is_lunch_hour(*hour))
        .filter(|hour| !day_override.is_some_and(|o| o.blocks_hour(*hour)))
        .filter_map(SlotTime::from_hour)
        .filter(|slot| !booked.contains(slot))
        .collect();

    debug!(
        "Computed {} slots for {} ({} booked)",
        slots.len(),
        date,
        booked.len()
    );
    slots
}

/// Colour of a day in the month calendar. The first matching rule wins:
/// past or non-working, closed, full, occupied, open.
pub fn classify_day(
    date: NaiveDate,
    today: NaiveDate,
    config: &ScheduleConfig,
    day_override: Option<&DayOverride>,
    appointments: &[Appointment],
) -> DayStatus {
    if date < today || !config.is_working_day(date) {
        return DayStatus::PastOrNonworking;
    }
    if day_override.is_some_and(DayOverride::is_closed) {
        return DayStatus::Closed;
    }
    let active = count_active(date, appointments);
    if active >= config.max_appointments_per_day {
        DayStatus::Full
    } else if active > 0 {
        DayStatus::Occupied
    } else {
        DayStatus::Open
    }
}

/// Classify every day of `year`-`month`. Returns an empty list for an
/// invalid month.
pub fn month_overview(
    year: i32,
    month: u32,
    today: NaiveDate,
    config: &ScheduleConfig,
    overrides: &[DayOverride],
    appointments: &[Appointment],
) -> Vec<DayOverview> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };

    let overrides_by_date: HashMap<NaiveDate, &DayOverride> =
        overrides.iter().map(|o| (o.date, o)).collect();
    let mut appointments_by_date: HashMap<NaiveDate, Vec<Appointment>> = HashMap::new();
    for appointment in appointments.iter().filter(|a| a.is_active()) {
        appointments_by_date
            .entry(appointment.date)
            .or_default()
            .push(appointment.clone());
    }

    first
        .iter_days()
        .take_while(|day| day.month() == month)
        .map(|date| {
            let on_day = appointments_by_date
                .get(&date)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            DayOverview {
                date,
                status: classify_day(
                    date,
                    today,
                    config,
                    overrides_by_date.get(&date).copied(),
                    on_day,
                ),
                active_appointments: on_day.len() as u32,
            }
        })
        .collect()
}

fn count_active(date: NaiveDate, appointments: &[Appointment]) -> u32 {
    appointments
        .iter()
        .filter(|a| a.date == date && a.is_active())
        .count() as u32
}
