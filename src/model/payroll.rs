use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;

/// Closed `[start, end]` range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Period {
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub start: NaiveDate,
    #[schema(example = "2026-01-31", format = "date", value_type = String)]
    pub end: NaiveDate,
}

impl Period {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, AppError> {
        if start > end {
            return Err(AppError::InvalidInput(format!(
                "period start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// The whole calendar month.
    pub fn month(year: i32, month: u32) -> Result<Self, AppError> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| AppError::InvalidInput(format!("invalid month {year}-{month:02}")))?;
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        };
        let end = next
            .and_then(|d| d.pred_opt())
            .ok_or_else(|| AppError::InvalidInput(format!("invalid month {year}-{month:02}")))?;
        Ok(Self { start, end })
    }

    /// Parses `YYYY-MM`.
    pub fn parse_month(value: &str) -> Result<Self, AppError> {
        let invalid = || AppError::InvalidInput(format!("month must be YYYY-MM, got '{value}'"));
        let (year, month) = value.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::month(year, month)
    }

    /// Month label used in event payloads, e.g. `2026-01`.
    pub fn label(&self) -> String {
        if self.start.day() == 1 && Self::month(self.start.year(), self.start.month()).ok() == Some(*self) {
            format!("{}-{:02}", self.start.year(), self.start.month())
        } else {
            format!("{}..{}", self.start, self.end)
        }
    }
}

/// Computed compensation of one employee for one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "employee_id": 1001,
    "present_days": 1,
    "paid_leave_days": 0,
    "total_hours": "10",
    "overtime_hours": "2",
    "base_salary": "1600",
    "overtime_pay": "600",
    "total_advance": "0",
    "total_earnings": "2200",
    "final_payable": "2200"
}))]
pub struct PayrollLine {
    pub employee_id: u64,
    pub present_days: u32,
    pub paid_leave_days: u32,
    #[schema(value_type = String)]
    pub total_hours: Decimal,
    #[schema(value_type = String)]
    pub overtime_hours: Decimal,
    #[schema(value_type = String)]
    pub base_salary: Decimal,
    #[schema(value_type = String)]
    pub overtime_pay: Decimal,
    #[schema(value_type = String)]
    pub total_advance: Decimal,
    #[schema(value_type = String)]
    pub total_earnings: Decimal,
    /// Negative when advances exceed earnings.
    #[schema(value_type = String)]
    pub final_payable: Decimal,
}

/// Employee whose line could not be produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReportFailure {
    pub employee_id: u64,
    #[schema(example = "employee 1002 not found")]
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PayrollReport {
    pub period: Period,
    pub lines: Vec<PayrollLine>,
    pub failures: Vec<ReportFailure>,
}
