//! SQL implementation of the agenda store
//!
//! Values go through SQLx's `Any` driver, which only carries integers,
//! floats, text and booleans. Dates are stored as `YYYY-MM-DD` text (their
//! text order is their date order), slot times as `HH:00`, timestamps as
//! RFC 3339 and money as integer cents.
//!
//! Nullable columns are checked for `NULL` before decoding, since the `Any`
//! driver refuses to decode `NULL` into an `Option`.
//!
//! Every write is a single statement. A partial unique index on `(date, time)`
//! over non-cancelled rows settles booking races: a racing writer waits on
//! SQLite's write lock and then trips the index, which is reported as an
//! occupied slot. Client visits are counted with one upsert keyed on CPF.

use crate::error::DbError;
use crate::DbClient;
use chrono::{DateTime, NaiveDate, Utc};
use salon_common::models::{
    Appointment, AppointmentStatus, ClientDetails, ClientRecord, ClientVisit, DayOverride,
    ScheduleConfig, ServiceItem, SlotTime,
};
use salon_common::services::{AgendaStore, BoxFuture, InsertOutcome, StatusOutcome};
use sqlx::any::AnyRow;
use sqlx::{Row, ValueRef};
use std::str::FromStr;
use tracing::{debug, error, info, warn};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS schedule_config (
        id INTEGER PRIMARY KEY,
        working_days TEXT NOT NULL,
        open_hour INTEGER NOT NULL,
        close_hour INTEGER NOT NULL,
        lunch_start_hour INTEGER NOT NULL,
        lunch_end_hour INTEGER NOT NULL,
        max_appointments_per_day INTEGER NOT NULL,
        online_booking INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS day_overrides (
        date TEXT PRIMARY KEY,
        kind TEXT NOT NULL,
        block_start_hour INTEGER,
        block_end_hour INTEGER
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS appointments (
        id TEXT PRIMARY KEY,
        date TEXT NOT NULL,
        time TEXT NOT NULL,
        status TEXT NOT NULL,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        phone TEXT NOT NULL,
        cpf TEXT NOT NULL,
        address TEXT,
        client_notes TEXT,
        service_id TEXT NOT NULL,
        service_name TEXT NOT NULL,
        payment_method TEXT NOT NULL,
        total_cents INTEGER NOT NULL,
        notes TEXT,
        origin TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS appointments_active_slot
        ON appointments (date, time) WHERE status <> 'CANCELLED'
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS appointments_by_date ON appointments (date)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS services (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        category TEXT NOT NULL,
        duration_minutes INTEGER NOT NULL,
        price_cents INTEGER NOT NULL,
        price_pix_cents INTEGER,
        price_credit_cents INTEGER,
        price_debit_cents INTEGER,
        price_cash_cents INTEGER,
        active INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS clients (
        id TEXT PRIMARY KEY,
        cpf TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        phone TEXT NOT NULL,
        address TEXT,
        notes TEXT,
        visits INTEGER NOT NULL,
        total_spent_cents INTEGER NOT NULL,
        last_visit TEXT,
        registered_on TEXT NOT NULL
    )
    "#,
];

const APPOINTMENT_COLUMNS: &str = "id, date, time, status, first_name, last_name, phone, cpf, \
     address, client_notes, service_id, service_name, payment_method, total_cents, notes, \
     origin, created_at";

/// SQL implementation of the agenda store
#[derive(Debug, Clone)]
pub struct SqlAgendaStore {
    db_client: DbClient,
}

impl SqlAgendaStore {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    /// Create tables and indexes that do not exist yet.
    pub async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing agenda schema");
        for statement in SCHEMA {
            self.db_client.execute(statement).await?;
        }
        info!("Agenda schema initialized successfully");
        Ok(())
    }

    async fn active_holder(
        &self,
        date: NaiveDate,
        time: SlotTime,
        except_id: &str,
    ) -> Result<Option<String>, DbError> {
        let row = sqlx::query(
            "SELECT id FROM appointments \
             WHERE date = $1 AND time = $2 AND status <> 'CANCELLED' AND id <> $3 LIMIT 1",
        )
        .bind(date.to_string())
        .bind(time.to_string())
        .bind(except_id)
        .fetch_optional(self.db_client.pool())
        .await?;
        row.map(|r| r.try_get::<String, _>("id"))
            .transpose()
            .map_err(DbError::from)
    }

    async fn fetch_appointment(&self, id: &str) -> Result<Option<Appointment>, DbError> {
        let query = format!("SELECT {} FROM appointments WHERE id = $1", APPOINTMENT_COLUMNS);
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(self.db_client.pool())
            .await?;
        row.as_ref().map(appointment_from_row).transpose()
    }

    async fn fetch_client(&self, cpf: &str) -> Result<Option<ClientRecord>, DbError> {
        let row = sqlx::query(
            "SELECT id, cpf, name, phone, address, notes, visits, total_spent_cents, \
             last_visit, registered_on FROM clients WHERE cpf = $1",
        )
        .bind(cpf)
        .fetch_optional(self.db_client.pool())
        .await?;
        row.as_ref().map(client_from_row).transpose()
    }
}

impl AgendaStore for SqlAgendaStore {
    type Error = DbError;

    fn get_schedule(&self) -> BoxFuture<'_, Option<ScheduleConfig>, Self::Error> {
        Box::pin(async move {
            let row = sqlx::query(
                "SELECT working_days, open_hour, close_hour, lunch_start_hour, lunch_end_hour, \
                 max_appointments_per_day, online_booking FROM schedule_config WHERE id = 1",
            )
            .fetch_optional(self.db_client.pool())
            .await?;
            row.as_ref().map(schedule_from_row).transpose()
        })
    }

    fn save_schedule(&self, config: ScheduleConfig) -> BoxFuture<'_, (), Self::Error> {
        Box::pin(async move {
            let working_days = config
                .working_days
                .iter()
                .map(u8::to_string)
                .collect::<Vec<_>>()
                .join(",");
            sqlx::query(
                r#"
                INSERT INTO schedule_config (id, working_days, open_hour, close_hour,
                    lunch_start_hour, lunch_end_hour, max_appointments_per_day, online_booking)
                VALUES (1, $1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (id) DO UPDATE SET
                    working_days = excluded.working_days,
                    open_hour = excluded.open_hour,
                    close_hour = excluded.close_hour,
                    lunch_start_hour = excluded.lunch_start_hour,
                    lunch_end_hour = excluded.lunch_end_hour,
                    max_appointments_per_day = excluded.max_appointments_per_day,
                    online_booking = excluded.online_booking
                "#,
            )
            .bind(working_days)
            .bind(i64::from(config.open_hour))
            .bind(i64::from(config.close_hour))
            .bind(i64::from(config.lunch_start_hour))
            .bind(i64::from(config.lunch_end_hour))
            .bind(i64::from(config.max_appointments_per_day))
            .bind(i64::from(config.online_booking))
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to save schedule: {}", e);
                DbError::QueryError(e.to_string())
            })?;
            Ok(())
        })
    }

    fn get_override(&self, date: NaiveDate) -> BoxFuture<'_, Option<DayOverride>, Self::Error> {
        Box::pin(async move {
            let row = sqlx::query(
                "SELECT date, kind, block_start_hour, block_end_hour \
                 FROM day_overrides WHERE date = $1",
            )
            .bind(date.to_string())
            .fetch_optional(self.db_client.pool())
            .await?;
            row.as_ref().map(override_from_row).transpose()
        })
    }

    fn list_overrides(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> BoxFuture<'_, Vec<DayOverride>, Self::Error> {
        Box::pin(async move {
            let rows = sqlx::query(
                "SELECT date, kind, block_start_hour, block_end_hour FROM day_overrides \
                 WHERE date >= $1 AND date <= $2 ORDER BY date",
            )
            .bind(from.to_string())
            .bind(to.to_string())
            .fetch_all(self.db_client.pool())
            .await?;
            rows.iter().map(override_from_row).collect()
        })
    }

    fn upsert_override(&self, day_override: DayOverride) -> BoxFuture<'_, (), Self::Error> {
        Box::pin(async move {
            sqlx::query(
                r#"
                INSERT INTO day_overrides (date, kind, block_start_hour, block_end_hour)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (date) DO UPDATE SET
                    kind = excluded.kind,
                    block_start_hour = excluded.block_start_hour,
                    block_end_hour = excluded.block_end_hour
                "#,
            )
            .bind(day_override.date.to_string())
            .bind(day_override.kind.as_str())
            .bind(day_override.block_start_hour.map(i64::from))
            .bind(day_override.block_end_hour.map(i64::from))
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to save override for {}: {}", day_override.date, e);
                DbError::QueryError(e.to_string())
            })?;
            Ok(())
        })
    }

    fn delete_override(&self, date: NaiveDate) -> BoxFuture<'_, bool, Self::Error> {
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM day_overrides WHERE date = $1")
                .bind(date.to_string())
                .execute(self.db_client.pool())
                .await?;
            Ok(result.rows_affected() > 0)
        })
    }

    fn list_appointments(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        include_cancelled: bool,
    ) -> BoxFuture<'_, Vec<Appointment>, Self::Error> {
        Box::pin(async move {
            let status_filter = if include_cancelled {
                ""
            } else {
                "AND status <> 'CANCELLED'"
            };
            let query = format!(
                "SELECT {} FROM appointments WHERE date >= $1 AND date <= $2 {} \
                 ORDER BY date, time, created_at",
                APPOINTMENT_COLUMNS, status_filter
            );
            let rows = sqlx::query(&query)
                .bind(from.to_string())
                .bind(to.to_string())
                .fetch_all(self.db_client.pool())
                .await?;
            rows.iter().map(appointment_from_row).collect()
        })
    }

    fn get_appointment(&self, id: &str) -> BoxFuture<'_, Option<Appointment>, Self::Error> {
        let id = id.to_string();
        Box::pin(async move { self.fetch_appointment(&id).await })
    }

    fn insert_appointment_if_free(
        &self,
        appointment: Appointment,
    ) -> BoxFuture<'_, InsertOutcome, Self::Error> {
        Box::pin(async move {
            let query = format!(
                "INSERT INTO appointments ({}) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)",
                APPOINTMENT_COLUMNS
            );
            let client = &appointment.client;
            let inserted = sqlx::query(&query)
                .bind(appointment.id.as_str())
                .bind(appointment.date.to_string())
                .bind(appointment.time.to_string())
                .bind(appointment.status.as_str())
                .bind(client.first_name.as_str())
                .bind(client.last_name.as_str())
                .bind(client.phone.as_str())
                .bind(client.cpf.as_str())
                .bind(client.address.clone())
                .bind(client.notes.clone())
                .bind(appointment.service_id.as_str())
                .bind(appointment.service_name.as_str())
                .bind(appointment.payment_method.as_str())
                .bind(appointment.total_cents)
                .bind(appointment.notes.clone())
                .bind(appointment.origin.as_str())
                .bind(appointment.created_at.to_rfc3339())
                .execute(self.db_client.pool())
                .await;

            match inserted {
                Ok(_) => {
                    debug!(
                        "Inserted appointment {} at {} {}",
                        appointment.id, appointment.date, appointment.time
                    );
                    Ok(InsertOutcome::Inserted(appointment))
                }
                Err(e) if is_unique_violation(&e) => {
                    let holder_id = self
                        .active_holder(appointment.date, appointment.time, &appointment.id)
                        .await?
                        .unwrap_or_default();
                    warn!(
                        "Slot {} {} already held by {}",
                        appointment.date, appointment.time, holder_id
                    );
                    Ok(InsertOutcome::Occupied { holder_id })
                }
                Err(e) => {
                    error!("Failed to insert appointment: {}", e);
                    Err(DbError::QueryError(e.to_string()))
                }
            }
        })
    }

    fn update_appointment_status(
        &self,
        id: &str,
        status: AppointmentStatus,
    ) -> BoxFuture<'_, StatusOutcome, Self::Error> {
        let id = id.to_string();
        Box::pin(async move {
            // Restoring a cancelled row into a taken slot trips the active-slot index.
            let updated = sqlx::query("UPDATE appointments SET status = $1 WHERE id = $2")
                .bind(status.as_str())
                .bind(&id)
                .execute(self.db_client.pool())
                .await;
            match updated {
                Ok(result) if result.rows_affected() == 0 => return Ok(StatusOutcome::NotFound),
                Ok(_) => {}
                Err(e) if is_unique_violation(&e) => {
                    let Some(current) = self.fetch_appointment(&id).await? else {
                        return Ok(StatusOutcome::NotFound);
                    };
                    let holder_id = self
                        .active_holder(current.date, current.time, &id)
                        .await?
                        .unwrap_or_default();
                    warn!(
                        "Cannot restore {}: slot {} {} held by {}",
                        id, current.date, current.time, holder_id
                    );
                    return Ok(StatusOutcome::Occupied { holder_id });
                }
                Err(e) => {
                    error!("Failed to update appointment {}: {}", id, e);
                    return Err(DbError::QueryError(e.to_string()));
                }
            }

            match self.fetch_appointment(&id).await? {
                Some(appointment) => Ok(StatusOutcome::Updated(appointment)),
                None => Ok(StatusOutcome::NotFound),
            }
        })
    }

    fn delete_appointment(&self, id: &str) -> BoxFuture<'_, bool, Self::Error> {
        let id = id.to_string();
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM appointments WHERE id = $1")
                .bind(&id)
                .execute(self.db_client.pool())
                .await?;
            Ok(result.rows_affected() > 0)
        })
    }

    fn get_service(&self, id: &str) -> BoxFuture<'_, Option<ServiceItem>, Self::Error> {
        let id = id.to_string();
        Box::pin(async move {
            let row = sqlx::query(
                "SELECT id, name, category, duration_minutes, price_cents, price_pix_cents, \
                 price_credit_cents, price_debit_cents, price_cash_cents, active \
                 FROM services WHERE id = $1",
            )
            .bind(&id)
            .fetch_optional(self.db_client.pool())
            .await?;
            row.as_ref().map(service_from_row).transpose()
        })
    }

    fn save_service(&self, service: ServiceItem) -> BoxFuture<'_, (), Self::Error> {
        Box::pin(async move {
            sqlx::query(
                r#"
                INSERT INTO services (id, name, category, duration_minutes, price_cents,
                    price_pix_cents, price_credit_cents, price_debit_cents, price_cash_cents, active)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                ON CONFLICT (id) DO UPDATE SET
                    name = excluded.name,
                    category = excluded.category,
                    duration_minutes = excluded.duration_minutes,
                    price_cents = excluded.price_cents,
                    price_pix_cents = excluded.price_pix_cents,
                    price_credit_cents = excluded.price_credit_cents,
                    price_debit_cents = excluded.price_debit_cents,
                    price_cash_cents = excluded.price_cash_cents,
                    active = excluded.active
                "#,
            )
            .bind(service.id.as_str())
            .bind(service.name.as_str())
            .bind(service.category.as_str())
            .bind(i64::from(service.duration_minutes))
            .bind(service.price_cents)
            .bind(service.price_pix_cents)
            .bind(service.price_credit_cents)
            .bind(service.price_debit_cents)
            .bind(service.price_cash_cents)
            .bind(i64::from(service.active))
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to save service {}: {}", service.id, e);
                DbError::QueryError(e.to_string())
            })?;
            Ok(())
        })
    }

    fn find_client_by_cpf(&self, cpf: &str) -> BoxFuture<'_, Option<ClientRecord>, Self::Error> {
        let cpf = cpf.to_string();
        Box::pin(async move { self.fetch_client(&cpf).await })
    }

    fn record_visit(&self, visit: ClientVisit) -> BoxFuture<'_, ClientRecord, Self::Error> {
        Box::pin(async move {
            sqlx::query(
                r#"
                INSERT INTO clients (id, cpf, name, phone, address, notes, visits,
                    total_spent_cents, last_visit, registered_on)
                VALUES ($1, $2, $3, $4, $5, $6, 1, $7, $8, $9)
                ON CONFLICT (cpf) DO UPDATE SET
                    name = excluded.name,
                    phone = excluded.phone,
                    address = COALESCE(excluded.address, clients.address),
                    visits = clients.visits + 1,
                    total_spent_cents = clients.total_spent_cents + excluded.total_spent_cents,
                    last_visit = CASE
                        WHEN clients.last_visit IS NULL OR clients.last_visit < excluded.last_visit
                        THEN excluded.last_visit
                        ELSE clients.last_visit
                    END
                "#,
            )
            .bind(visit.client_id.as_str())
            .bind(visit.cpf.as_str())
            .bind(visit.name.as_str())
            .bind(visit.phone.as_str())
            .bind(visit.address.clone())
            .bind(visit.notes.clone())
            .bind(visit.amount_cents)
            .bind(visit.date.to_string())
            .bind(visit.recorded_on.to_string())
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to record visit for {}: {}", visit.cpf, e);
                DbError::QueryError(e.to_string())
            })?;

            self.fetch_client(&visit.cpf).await?.ok_or_else(|| {
                DbError::QueryError(format!("client {} missing after upsert", visit.cpf))
            })
        })
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

// --- Row mapping ---

fn parse_text<T>(row: &AnyRow, column: &str) -> Result<T, DbError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw: String = row.try_get(column)?;
    raw.parse::<T>()
        .map_err(|e| DbError::DecodeError(format!("{} '{}': {}", column, raw, e)))
}

fn parse_date(raw: &str) -> Result<NaiveDate, DbError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| DbError::DecodeError(format!("date '{}': {}", raw, e)))
}

fn small_int<T: TryFrom<i64>>(row: &AnyRow, column: &str) -> Result<T, DbError> {
    let value: i64 = row.try_get(column)?;
    T::try_from(value).map_err(|_| DbError::DecodeError(format!("{} out of range: {}", column, value)))
}

/// Read a column that may hold `NULL`.
fn nullable<T>(row: &AnyRow, column: &str) -> Result<Option<T>, DbError>
where
    T: for<'r> sqlx::Decode<'r, sqlx::Any> + sqlx::Type<sqlx::Any>,
{
    if row.try_get_raw(column)?.is_null() {
        return Ok(None);
    }
    Ok(Some(row.try_get(column)?))
}

fn optional_hour(row: &AnyRow, column: &str) -> Result<Option<u8>, DbError> {
    nullable::<i64>(row, column)?
        .map(|v| {
            u8::try_from(v).map_err(|_| DbError::DecodeError(format!("{} out of range: {}", column, v)))
        })
        .transpose()
}

fn schedule_from_row(row: &AnyRow) -> Result<ScheduleConfig, DbError> {
    let working_days: String = row.try_get("working_days")?;
    let working_days = working_days
        .split(',')
        .filter(|d| !d.trim().is_empty())
        .map(|d| {
            d.trim()
                .parse::<u8>()
                .map_err(|e| DbError::DecodeError(format!("working day '{}': {}", d, e)))
        })
        .collect::<Result<_, _>>()?;
    let online_booking: i64 = row.try_get("online_booking")?;
    Ok(ScheduleConfig {
        working_days,
        open_hour: small_int(row, "open_hour")?,
        close_hour: small_int(row, "close_hour")?,
        lunch_start_hour: small_int(row, "lunch_start_hour")?,
        lunch_end_hour: small_int(row, "lunch_end_hour")?,
        max_appointments_per_day: small_int(row, "max_appointments_per_day")?,
        online_booking: online_booking != 0,
    })
}

fn override_from_row(row: &AnyRow) -> Result<DayOverride, DbError> {
    let date: String = row.try_get("date")?;
    Ok(DayOverride {
        date: parse_date(&date)?,
        kind: parse_text(row, "kind")?,
        block_start_hour: optional_hour(row, "block_start_hour")?,
        block_end_hour: optional_hour(row, "block_end_hour")?,
    })
}

fn appointment_from_row(row: &AnyRow) -> Result<Appointment, DbError> {
    let date: String = row.try_get("date")?;
    let created_at: String = row.try_get("created_at")?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| DbError::DecodeError(format!("created_at '{}': {}", created_at, e)))?
        .with_timezone(&Utc);
    Ok(Appointment {
        id: row.try_get("id")?,
        date: parse_date(&date)?,
        time: parse_text::<SlotTime>(row, "time")?,
        status: parse_text(row, "status")?,
        client: ClientDetails {
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            phone: row.try_get("phone")?,
            cpf: row.try_get("cpf")?,
            address: nullable(row, "address")?,
            notes: nullable(row, "client_notes")?,
        },
        service_id: row.try_get("service_id")?,
        service_name: row.try_get("service_name")?,
        payment_method: parse_text(row, "payment_method")?,
        total_cents: row.try_get("total_cents")?,
        notes: nullable(row, "notes")?,
        origin: parse_text(row, "origin")?,
        created_at,
    })
}

fn service_from_row(row: &AnyRow) -> Result<ServiceItem, DbError> {
    let active: i64 = row.try_get("active")?;
    Ok(ServiceItem {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        category: row.try_get("category")?,
        duration_minutes: small_int(row, "duration_minutes")?,
        price_cents: row.try_get("price_cents")?,
        price_pix_cents: nullable(row, "price_pix_cents")?,
        price_credit_cents: nullable(row, "price_credit_cents")?,
        price_debit_cents: nullable(row, "price_debit_cents")?,
        price_cash_cents: nullable(row, "price_cash_cents")?,
        active: active != 0,
    })
}

fn client_from_row(row: &AnyRow) -> Result<ClientRecord, DbError> {
    let last_visit: Option<String> = nullable(row, "last_visit")?;
    let registered_on: String = row.try_get("registered_on")?;
    Ok(ClientRecord {
        id: row.try_get("id")?,
        cpf: row.try_get("cpf")?,
        name: row.try_get("name")?,
        phone: row.try_get("phone")?,
        address: nullable(row, "address")?,
        notes: nullable(row, "notes")?,
        visits: small_int(row, "visits")?,
        total_spent_cents: row.try_get("total_spent_cents")?,
        last_visit: last_visit.as_deref().map(parse_date).transpose()?,
        registered_on: parse_date(&registered_on)?,
    })
}
