use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::error::DatabaseError;
use sqlx::mysql::MySqlDatabaseError;
use sqlx::{FromRow, MySqlPool};
use tracing::debug;

use super::{AdvanceStore, AttendanceStore, EmployeeDirectory};
use crate::error::AppError;
use crate::model::OrgId;
use crate::model::advance::{AdvanceRecord, NewAdvance};
use crate::model::attendance::{AttendancePatch, AttendanceRecord, AttendanceStatus, LocationClaim};
use crate::model::employee::{CompensationConfig, RateType};

/// MySQL `ER_DUP_ENTRY`. SQLSTATE 23000 alone also covers NOT NULL and
/// foreign-key violations, which must not be merged.
const ER_DUP_ENTRY: u16 = 1062;

const ATTENDANCE_COLUMNS: &str = r#"
    id, employee_id, date, status, working_hours,
    check_in, check_out, latitude, longitude, location_mocked
"#;

fn is_duplicate_entry(err: &dyn DatabaseError) -> bool {
    err.try_downcast_ref::<MySqlDatabaseError>()
        .is_some_and(|e| e.number() == ER_DUP_ENTRY)
}

#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct AttendanceRow {
    id: u64,
    employee_id: u64,
    date: NaiveDate,
    status: String,
    working_hours: Decimal,
    check_in: Option<DateTime<Utc>>,
    check_out: Option<DateTime<Utc>>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    location_mocked: bool,
}

impl TryFrom<AttendanceRow> for AttendanceRecord {
    type Error = AppError;

    fn try_from(row: AttendanceRow) -> Result<Self, Self::Error> {
        let status = AttendanceStatus::from_str(&row.status).map_err(|_| {
            AppError::InvalidInput(format!(
                "unknown attendance status '{}' on record {}",
                row.status, row.id
            ))
        })?;

        let location = match (row.latitude, row.longitude) {
            (Some(latitude), Some(longitude)) => Some(LocationClaim {
                latitude,
                longitude,
                is_mock: row.location_mocked,
            }),
            _ => None,
        };

        Ok(AttendanceRecord {
            id: row.id,
            employee_id: row.employee_id,
            date: row.date,
            status,
            working_hours: row.working_hours,
            check_in: row.check_in,
            check_out: row.check_out,
            location,
        })
    }
}

fn into_records(rows: Vec<AttendanceRow>) -> Result<Vec<AttendanceRecord>, AppError> {
    rows.into_iter().map(AttendanceRecord::try_from).collect()
}

#[async_trait]
impl AttendanceStore for MySqlStore {
    async fn upsert(
        &self,
        org: OrgId,
        employee_id: u64,
        date: NaiveDate,
        patch: &AttendancePatch,
    ) -> Result<AttendanceRecord, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO attendance
                (org_id, employee_id, date, status, working_hours,
                 check_in, check_out, latitude, longitude, location_mocked)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(org)
        .bind(employee_id)
        .bind(date)
        .bind(patch.status.as_ref())
        .bind(patch.working_hours.unwrap_or(Decimal::ZERO))
        .bind(patch.check_in)
        .bind(patch.check_out)
        .bind(patch.location.map(|l| l.latitude))
        .bind(patch.location.map(|l| l.longitude))
        .bind(patch.location.is_some_and(|l| l.is_mock))
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {}
            // Another event for the same day got there first: merge into its row.
            Err(sqlx::Error::Database(db_err)) if is_duplicate_entry(db_err.as_ref()) => {
                debug!(org, employee_id, %date, "Attendance row exists, merging");

                sqlx::query(
                    r#"
                    UPDATE attendance
                    SET status = ?,
                        working_hours = COALESCE(?, working_hours),
                        check_out = COALESCE(?, check_out)
                    WHERE org_id = ?
                    AND employee_id = ?
                    AND date = ?
                    "#,
                )
                .bind(patch.status.as_ref())
                .bind(patch.working_hours)
                .bind(patch.check_out)
                .bind(org)
                .bind(employee_id)
                .bind(date)
                .execute(&self.pool)
                .await?;
            }
            Err(e) => return Err(e.into()),
        }

        self.find(org, employee_id, date).await?.ok_or_else(|| {
            AppError::NotFound(format!("attendance of employee {employee_id} on {date}"))
        })
    }

    async fn find(
        &self,
        org: OrgId,
        employee_id: u64,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, AppError> {
        let sql = format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM attendance WHERE org_id = ? AND employee_id = ? AND date = ?"
        );
        sqlx::query_as::<_, AttendanceRow>(&sql)
            .bind(org)
            .bind(employee_id)
            .bind(date)
            .fetch_optional(&self.pool)
            .await?
            .map(AttendanceRecord::try_from)
            .transpose()
    }

    async fn by_date(&self, org: OrgId, date: NaiveDate) -> Result<Vec<AttendanceRecord>, AppError> {
        let sql = format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM attendance WHERE org_id = ? AND date = ? ORDER BY employee_id"
        );
        let rows = sqlx::query_as::<_, AttendanceRow>(&sql)
            .bind(org)
            .bind(date)
            .fetch_all(&self.pool)
            .await?;
        into_records(rows)
    }

    async fn by_employee_range(
        &self,
        org: OrgId,
        employee_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, AppError> {
        let sql = format!(
            r#"
            SELECT {ATTENDANCE_COLUMNS}
            FROM attendance
            WHERE org_id = ?
            AND employee_id = ?
            AND date BETWEEN ? AND ?
            ORDER BY date ASC
            "#
        );
        let rows = sqlx::query_as::<_, AttendanceRow>(&sql)
            .bind(org)
            .bind(employee_id)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;
        into_records(rows)
    }
}

#[derive(Debug, FromRow)]
struct AdvanceRow {
    id: u64,
    employee_id: u64,
    amount: Decimal,
    date: NaiveDate,
    description: String,
}

impl From<AdvanceRow> for AdvanceRecord {
    fn from(row: AdvanceRow) -> Self {
        AdvanceRecord {
            id: row.id,
            employee_id: row.employee_id,
            amount: row.amount,
            date: row.date,
            description: row.description,
        }
    }
}

#[async_trait]
impl AdvanceStore for MySqlStore {
    async fn insert(&self, org: OrgId, advance: NewAdvance) -> Result<AdvanceRecord, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO advances (org_id, employee_id, amount, date, description)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(org)
        .bind(advance.employee_id)
        .bind(advance.amount)
        .bind(advance.date)
        .bind(&advance.description)
        .execute(&self.pool)
        .await?;

        Ok(AdvanceRecord {
            id: result.last_insert_id(),
            employee_id: advance.employee_id,
            amount: advance.amount,
            date: advance.date,
            description: advance.description,
        })
    }

    async fn by_employee_range(
        &self,
        org: OrgId,
        employee_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AdvanceRecord>, AppError> {
        let rows = sqlx::query_as::<_, AdvanceRow>(
            r#"
            SELECT id, employee_id, amount, date, description
            FROM advances
            WHERE org_id = ?
            AND employee_id = ?
            AND date BETWEEN ? AND ?
            ORDER BY date ASC, id ASC
            "#,
        )
        .bind(org)
        .bind(employee_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(AdvanceRecord::from).collect())
    }
}

#[async_trait]
impl EmployeeDirectory for MySqlStore {
    async fn compensation_config(
        &self,
        org: OrgId,
        employee_id: u64,
    ) -> Result<Option<CompensationConfig>, AppError> {
        let row = sqlx::query_as::<_, (Decimal, String)>(
            "SELECT rate, rate_type FROM employees WHERE org_id = ? AND id = ?",
        )
        .bind(org)
        .bind(employee_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some((rate, rate_type)) = row else {
            return Ok(None);
        };

        let rate_type = RateType::from_str(&rate_type).map_err(|_| {
            AppError::InvalidInput(format!(
                "unknown rate type '{rate_type}' for employee {employee_id}"
            ))
        })?;

        Ok(Some(CompensationConfig { rate, rate_type }))
    }

    async fn list_active_employees(&self, org: OrgId) -> Result<Vec<u64>, AppError> {
        let ids = sqlx::query_scalar::<_, u64>(
            "SELECT id FROM employees WHERE org_id = ? AND status = 'active' ORDER BY id",
        )
        .bind(org)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }
}
