// --- File: crates/salon_common/src/models.rs ---

// Agenda data shared by the engine, the stores and the HTTP layer:
// - the weekly schedule and per-day overrides
// - appointments and their lifecycle status
// - the client directory and the service catalog used while booking

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use salon_config::ScheduleSettings;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use thiserror::Error;

/// Slots are whole hours; service duration never changes the grid.
pub const SLOT_GRANULARITY_MINUTES: u32 = 60;

/// Number of digits in a normalised CPF.
pub const CPF_DIGITS: usize = 11;

// --- Slot time ---

/// An hour of the day on the slot grid, rendered and parsed as `HH:00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotTime(u8);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlotTimeError {
    #[error("slot time must look like HH:00, got '{0}'")]
    Format(String),
    #[error("slot hour {0} is outside 0..=23")]
    HourOutOfRange(u32),
    #[error("slots start on the hour, got minute {0}")]
    NotOnTheHour(u32),
}

impl SlotTime {
    /// Returns `None` for hours past 23.
    pub fn from_hour(hour: u8) -> Option<Self> {
        (hour < 24).then_some(Self(hour))
    }

    pub fn hour(self) -> u8 {
        self.0
    }
}

impl fmt::Display for SlotTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:00", self.0)
    }
}

impl FromStr for SlotTime {
    type Err = SlotTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (hour, minute) = trimmed
            .split_once(':')
            .ok_or_else(|| SlotTimeError::Format(s.to_string()))?;
        if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
            return Err(SlotTimeError::Format(s.to_string()));
        }
        let hour: u32 = hour
            .parse()
            .map_err(|_| SlotTimeError::Format(s.to_string()))?;
        let minute: u32 = minute
            .parse()
            .map_err(|_| SlotTimeError::Format(s.to_string()))?;
        if minute != 0 {
            return Err(SlotTimeError::NotOnTheHour(minute));
        }
        if hour > 23 {
            return Err(SlotTimeError::HourOutOfRange(hour));
        }
        Ok(Self(hour as u8))
    }
}

impl Serialize for SlotTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SlotTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

// --- Weekly schedule ---

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleConfigError {
    #[error("weekday {0} is not in 0 (Sunday) ..= 6 (Saturday)")]
    InvalidWeekday(u8),
    #[error("opening hour {open} must be before closing hour {close}")]
    InvertedHours { open: u8, close: u8 },
    #[error("closing hour {0} is past midnight")]
    CloseAfterMidnight(u8),
    #[error("lunch {start}-{end} must sit inside opening hours {open}-{close}")]
    LunchOutsideHours { start: u8, end: u8, open: u8, close: u8 },
}

/// The salon's standard week.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// 0 = Sunday .. 6 = Saturday.
    pub working_days: BTreeSet<u8>,
    pub open_hour: u8,
    pub close_hour: u8,
    pub lunch_start_hour: u8,
    pub lunch_end_hour: u8,
    pub max_appointments_per_day: u32,
    pub online_booking: bool,
}

impl ScheduleConfig {
    /// Whether `date` falls on one of the working weekdays.
    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        let weekday = date.weekday().num_days_from_sunday() as u8;
        self.working_days.contains(&weekday)
    }

    pub fn is_lunch_hour(&self, hour: u8) -> bool {
        self.lunch_start_hour <= hour && hour < self.lunch_end_hour
    }

    pub fn validate(&self) -> Result<(), ScheduleConfigError> {
        if let Some(day) = self.working_days.iter().find(|d| **d > 6) {
            return Err(ScheduleConfigError::InvalidWeekday(*day));
        }
        if self.close_hour > 24 {
            return Err(ScheduleConfigError::CloseAfterMidnight(self.close_hour));
        }
        if self.open_hour >= self.close_hour {
            return Err(ScheduleConfigError::InvertedHours {
                open: self.open_hour,
                close: self.close_hour,
            });
        }
        if !(self.open_hour <= self.lunch_start_hour
            && self.lunch_start_hour <= self.lunch_end_hour
            && self.lunch_end_hour <= self.close_hour)
        {
            return Err(ScheduleConfigError::LunchOutsideHours {
                start: self.lunch_start_hour,
                end: self.lunch_end_hour,
                open: self.open_hour,
                close: self.close_hour,
            });
        }
        Ok(())
    }
}

impl From<&ScheduleSettings> for ScheduleConfig {
    fn from(settings: &ScheduleSettings) -> Self {
        Self {
            working_days: settings.working_days.iter().copied().collect(),
            open_hour: settings.open_hour,
            close_hour: settings.close_hour,
            lunch_start_hour: settings.lunch_start_hour,
            lunch_end_hour: settings.lunch_end_hour,
            max_appointments_per_day: settings.max_appointments_per_day,
            online_booking: settings.online_booking,
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self::from(&ScheduleSettings::default())
    }
}

// --- Day overrides ---

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverrideKind {
    /// The whole day is off.
    Closed,
    /// `[block_start_hour, block_end_hour)` is off.
    BlockedRange,
}

impl OverrideKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OverrideKind::Closed => "CLOSED",
            OverrideKind::BlockedRange => "BLOCKED_RANGE",
        }
    }
}

impl FromStr for OverrideKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CLOSED" => Ok(OverrideKind::Closed),
            "BLOCKED_RANGE" => Ok(OverrideKind::BlockedRange),
            other => Err(format!("unknown override kind '{}'", other)),
        }
    }
}

/// An exception to the weekly schedule for one date. At most one per date.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayOverride {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = Date, example = "2025-12-24"))]
    pub date: NaiveDate,
    pub kind: OverrideKind,
    #[serde(default)]
    pub block_start_hour: Option<u8>,
    #[serde(default)]
    pub block_end_hour: Option<u8>,
}

impl DayOverride {
    pub fn closed(date: NaiveDate) -> Self {
        Self {
            date,
            kind: OverrideKind::Closed,
            block_start_hour: None,
            block_end_hour: None,
        }
    }

    pub fn blocked(date: NaiveDate, start_hour: u8, end_hour: u8) -> Self {
        Self {
            date,
            kind: OverrideKind::BlockedRange,
            block_start_hour: Some(start_hour),
            block_end_hour: Some(end_hour),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.kind == OverrideKind::Closed
    }

    /// The blocked hours, or `None` when this is not a usable block.
    ///
    /// A block with a missing bound or with `start >= end` blocks nothing.
    pub fn blocked_range(&self) -> Option<Range<u8>> {
        match (self.kind, self.block_start_hour, self.block_end_hour) {
            (OverrideKind::BlockedRange, Some(start), Some(end)) if start < end => {
                Some(start..end)
            }
            _ => None,
        }
    }

    /// A `BlockedRange` whose bounds are missing or inverted.
    pub fn is_malformed(&self) -> bool {
        self.kind == OverrideKind::BlockedRange && self.blocked_range().is_none()
    }

    pub fn blocks_hour(&self, hour: u8) -> bool {
        self.blocked_range().is_some_and(|range| range.contains(&hour))
    }
}

// --- Appointments ---

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Confirmed,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    /// Active appointments hold their slot; cancelled ones free it.
    pub fn is_active(self) -> bool {
        self != AppointmentStatus::Cancelled
    }

    /// Complete, cancel, reopen a completed one, restore a cancelled one.
    pub fn can_transition_to(self, next: AppointmentStatus) -> bool {
        use AppointmentStatus::*;
        matches!(
            (self, next),
            (Confirmed, Completed)
                | (Confirmed, Cancelled)
                | (Completed, Confirmed)
                | (Completed, Cancelled)
                | (Cancelled, Confirmed)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AppointmentStatus::Confirmed => "CONFIRMED",
            AppointmentStatus::Completed => "COMPLETED",
            AppointmentStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CONFIRMED" => Ok(AppointmentStatus::Confirmed),
            "COMPLETED" => Ok(AppointmentStatus::Completed),
            "CANCELLED" => Ok(AppointmentStatus::Cancelled),
            other => Err(format!("unknown appointment status '{}'", other)),
        }
    }
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Pix,
    Credit,
    Debit,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Cash => "CASH",
            PaymentMethod::Pix => "PIX",
            PaymentMethod::Credit => "CREDIT",
            PaymentMethod::Debit => "DEBIT",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CASH" => Ok(PaymentMethod::Cash),
            "PIX" => Ok(PaymentMethod::Pix),
            "CREDIT" => Ok(PaymentMethod::Credit),
            "DEBIT" => Ok(PaymentMethod::Debit),
            other => Err(format!("unknown payment method '{}'", other)),
        }
    }
}

/// Where a booking came from.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingOrigin {
    AdminPanel,
    PublicLink,
}

impl BookingOrigin {
    pub fn as_str(self) -> &'static str {
        match self {
            BookingOrigin::AdminPanel => "ADMIN_PANEL",
            BookingOrigin::PublicLink => "PUBLIC_LINK",
        }
    }
}

impl FromStr for BookingOrigin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN_PANEL" => Ok(BookingOrigin::AdminPanel),
            "PUBLIC_LINK" => Ok(BookingOrigin::PublicLink),
            other => Err(format!("unknown booking origin '{}'", other)),
        }
    }
}

/// Who the appointment is for, as typed into the booking form.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientDetails {
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub phone: String,
    pub cpf: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ClientDetails {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

/// Strip punctuation from a CPF ("123.456.789-00" -> "12345678900").
pub fn normalize_cpf(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

pub fn is_valid_cpf_format(raw: &str) -> bool {
    normalize_cpf(raw).len() == CPF_DIGITS
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = Date))]
    pub date: NaiveDate,
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "14:00"))]
    pub time: SlotTime,
    pub status: AppointmentStatus,
    pub client: ClientDetails,
    pub service_id: String,
    pub service_name: String,
    pub payment_method: PaymentMethod,
    /// Quoted price in centavos.
    pub total_cents: i64,
    #[serde(default)]
    pub notes: Option<String>,
    pub origin: BookingOrigin,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = DateTime))]
    pub created_at: DateTime<Utc>,
}

impl Appointment {
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

// --- Client directory ---

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub id: String,
    /// Digits only; the lookup key.
    pub cpf: String,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub visits: u32,
    pub total_spent_cents: i64,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = Date))]
    pub last_visit: Option<NaiveDate>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = Date))]
    pub registered_on: NaiveDate,
}

/// One committed booking to be counted against the client directory.
///
/// Stores apply it in a single atomic step: the first visit creates the
/// record under `client_id`, later visits add to the record found by CPF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientVisit {
    /// Id for the record if this CPF has none yet.
    pub client_id: String,
    pub cpf: String,
    pub name: String,
    pub phone: String,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub amount_cents: i64,
    pub date: NaiveDate,
    pub recorded_on: NaiveDate,
}

impl ClientVisit {
    pub fn from_appointment(client_id: String, appointment: &Appointment, today: NaiveDate) -> Self {
        let details = &appointment.client;
        Self {
            client_id,
            cpf: details.cpf.clone(),
            name: details.full_name(),
            phone: details.phone.clone(),
            address: details.address.clone(),
            notes: details.notes.clone(),
            amount_cents: appointment.total_cents,
            date: appointment.date,
            recorded_on: today,
        }
    }
}

impl ClientRecord {
    pub fn first_visit(visit: &ClientVisit) -> Self {
        Self {
            id: visit.client_id.clone(),
            cpf: visit.cpf.clone(),
            name: visit.name.clone(),
            phone: visit.phone.clone(),
            address: visit.address.clone(),
            notes: visit.notes.clone(),
            visits: 1,
            total_spent_cents: visit.amount_cents,
            last_visit: Some(visit.date),
            registered_on: visit.recorded_on,
        }
    }

    /// Count another visit. Contact details follow the latest booking; an
    /// address is only replaced, never cleared.
    pub fn apply_visit(&mut self, visit: &ClientVisit) {
        self.name = visit.name.clone();
        self.phone = visit.phone.clone();
        if visit.address.is_some() {
            self.address = visit.address.clone();
        }
        self.visits += 1;
        self.total_spent_cents += visit.amount_cents;
        self.last_visit = self.last_visit.max(Some(visit.date));
    }
}

// --- Service catalog ---

/// A bookable service. `duration_minutes` is informational only.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceItem {
    pub id: String,
    pub name: String,
    pub category: String,
    pub duration_minutes: u32,
    pub price_cents: i64,
    #[serde(default)]
    pub price_pix_cents: Option<i64>,
    #[serde(default)]
    pub price_credit_cents: Option<i64>,
    #[serde(default)]
    pub price_debit_cents: Option<i64>,
    #[serde(default)]
    pub price_cash_cents: Option<i64>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl ServiceItem {
    /// Base price: the list price, else the cash price, else zero.
    pub fn base_price_cents(&self) -> i64 {
        if self.price_cents > 0 {
            self.price_cents
        } else {
            positive(self.price_cash_cents).unwrap_or(0)
        }
    }

    /// Price charged for `method`; unset or zero method prices fall back to the base price.
    pub fn price_for(&self, method: PaymentMethod) -> i64 {
        let specific = match method {
            PaymentMethod::Pix => self.price_pix_cents,
            PaymentMethod::Credit => self.price_credit_cents,
            PaymentMethod::Debit => self.price_debit_cents,
            PaymentMethod::Cash => None,
        };
        positive(specific).unwrap_or_else(|| self.base_price_cents())
    }
}

fn positive(value: Option<i64>) -> Option<i64> {
    value.filter(|v| *v > 0)
}

// --- Day classification ---

/// How a day reads in the month overview.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayStatus {
    PastOrNonworking,
    Closed,
    Full,
    Occupied,
    Open,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayOverview {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = Date))]
    pub date: NaiveDate,
    pub status: DayStatus,
    /// Non-cancelled appointments on the day.
    pub active_appointments: u32,
}
