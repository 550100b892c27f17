// --- File: crates/salon_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8086,
        }
    }
}

// --- Database Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String, // e.g. "sqlite://data/salon.db", or "secret_from_env" to read DATABASE_URL
}

// --- Agenda Schedule ---
// Seeds the stored schedule on first start. Later edits go through the
// admin schedule route and live in the store.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ScheduleSettings {
    /// Weekday numbers the salon opens on, 0 = Sunday .. 6 = Saturday.
    #[serde(default = "default_working_days")]
    pub working_days: Vec<u8>,
    #[serde(default = "default_open_hour")]
    pub open_hour: u8,
    #[serde(default = "default_close_hour")]
    pub close_hour: u8,
    #[serde(default = "default_lunch_start_hour")]
    pub lunch_start_hour: u8,
    #[serde(default = "default_lunch_end_hour")]
    pub lunch_end_hour: u8,
    /// Active appointments at which a day reads as full in the month view.
    #[serde(default = "default_max_appointments_per_day")]
    pub max_appointments_per_day: u32,
    /// Whether the public booking link accepts bookings.
    #[serde(default = "default_true")]
    pub online_booking: bool,
}

fn default_working_days() -> Vec<u8> {
    vec![1, 2, 3, 4, 5, 6]
}
fn default_open_hour() -> u8 {
    9
}
fn default_close_hour() -> u8 {
    19
}
fn default_lunch_start_hour() -> u8 {
    12
}
fn default_lunch_end_hour() -> u8 {
    13
}
fn default_max_appointments_per_day() -> u32 {
    9
}
fn default_true() -> bool {
    true
}
fn default_time_zone() -> String {
    "America/Sao_Paulo".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            working_days: default_working_days(),
            open_hour: default_open_hour(),
            close_hour: default_close_hour(),
            lunch_start_hour: default_lunch_start_hour(),
            lunch_end_hour: default_lunch_end_hour(),
            max_appointments_per_day: default_max_appointments_per_day(),
            online_booking: true,
        }
    }
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_database: bool,

    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub schedule: ScheduleSettings,

    /// IANA zone deciding which calendar day counts as "today".
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            use_database: false,
            database: None,
            schedule: ScheduleSettings::default(),
            time_zone: default_time_zone(),
            log_level: default_log_level(),
        }
    }
}
