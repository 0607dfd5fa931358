use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

/// Upper bound of hours recorded for a single day.
pub const MAX_WORKING_HOURS: Decimal = dec!(24);

/// Hours are stored with two decimals.
pub const HOURS_SCALE: u32 = 2;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, EnumString, Display, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum AttendanceStatus {
    Present,
    Absent,
    SickLeave,
    PaidLeave,
    UnpaidLeave,
}

impl AttendanceStatus {
    /// Leave that is paid as a regular day.
    pub fn is_paid_leave(self) -> bool {
        matches!(self, AttendanceStatus::SickLeave | AttendanceStatus::PaidLeave)
    }
}

/// Device location attached to an attendance event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LocationClaim {
    #[schema(example = 23.8103)]
    pub latitude: f64,
    #[schema(example = 90.4125)]
    pub longitude: f64,
    /// Set by the client when the OS reports a mock location provider.
    #[serde(default)]
    pub is_mock: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AttendanceRecord {
    pub id: u64,
    pub employee_id: u64,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[schema(example = "8.5", value_type = String)]
    pub working_hours: Decimal,
    #[schema(example = "2026-01-05T09:00:00Z", format = "date-time", value_type = String)]
    pub check_in: Option<DateTime<Utc>>,
    #[schema(example = "2026-01-05T17:30:00Z", format = "date-time", value_type = String)]
    pub check_out: Option<DateTime<Utc>>,
    pub location: Option<LocationClaim>,
}

/// Inbound attendance event, already resolved to an employee and a day.
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceEvent {
    pub employee_id: u64,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub working_hours: Option<Decimal>,
    pub check_in: Option<DateTime<Utc>>,
    pub check_out: Option<DateTime<Utc>>,
    pub location: Option<LocationClaim>,
}

/// Partial update applied to the `(employee_id, date)` row.
///
/// `status` always overwrites. `working_hours` and `check_out` overwrite only
/// when present. `check_in` and `location` are written on insert only.
#[derive(Debug, Clone, PartialEq)]
pub struct AttendancePatch {
    pub status: AttendanceStatus,
    pub working_hours: Option<Decimal>,
    pub check_in: Option<DateTime<Utc>>,
    pub check_out: Option<DateTime<Utc>>,
    pub location: Option<LocationClaim>,
}

impl AttendancePatch {
    /// Builds the row written when no record exists yet for the key.
    pub fn into_new_record(self, id: u64, employee_id: u64, date: NaiveDate) -> AttendanceRecord {
        AttendanceRecord {
            id,
            employee_id,
            date,
            status: self.status,
            working_hours: self.working_hours.unwrap_or(Decimal::ZERO),
            check_in: self.check_in,
            check_out: self.check_out,
            location: self.location,
        }
    }

    /// Merges into an existing row without blanking fields the event left out.
    pub fn apply_to(&self, record: &mut AttendanceRecord) {
        record.status = self.status;
        if let Some(hours) = self.working_hours {
            record.working_hours = hours;
        }
        if let Some(check_out) = self.check_out {
            record.check_out = Some(check_out);
        }
    }
}

/// Shape used for listing and export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AttendanceSummary {
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub date: NaiveDate,
    pub employee_id: u64,
    pub status: AttendanceStatus,
    #[schema(example = "8", value_type = String)]
    pub working_hours: Decimal,
}

impl From<&AttendanceRecord> for AttendanceSummary {
    fn from(record: &AttendanceRecord) -> Self {
        Self {
            date: record.date,
            employee_id: record.employee_id,
            status: record.status,
            working_hours: record.working_hours,
        }
    }
}
