//! Persistence seams consumed by the ledgers and the payroll aggregator.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::AppError;
use crate::model::OrgId;
use crate::model::advance::{AdvanceRecord, NewAdvance};
use crate::model::attendance::{AttendancePatch, AttendanceRecord};
use crate::model::employee::CompensationConfig;

#[cfg(test)]
pub mod memory;
pub mod mysql;

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// Inserts or merges the row keyed by `(org, employee_id, date)`.
    ///
    /// Concurrent calls for one key must end up as a single row; a
    /// duplicate-key conflict is merged into the existing row.
    async fn upsert(
        &self,
        org: OrgId,
        employee_id: u64,
        date: NaiveDate,
        patch: &AttendancePatch,
    ) -> Result<AttendanceRecord, AppError>;

    async fn find(
        &self,
        org: OrgId,
        employee_id: u64,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, AppError>;

    async fn by_date(&self, org: OrgId, date: NaiveDate) -> Result<Vec<AttendanceRecord>, AppError>;

    /// Records in `[start, end]`, ordered by date ascending.
    async fn by_employee_range(
        &self,
        org: OrgId,
        employee_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, AppError>;
}

#[async_trait]
pub trait AdvanceStore: Send + Sync {
    async fn insert(&self, org: OrgId, advance: NewAdvance) -> Result<AdvanceRecord, AppError>;

    /// Advances in `[start, end]`, ordered by date ascending.
    async fn by_employee_range(
        &self,
        org: OrgId,
        employee_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AdvanceRecord>, AppError>;
}

/// Read-only view of the employee directory.
#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    async fn compensation_config(
        &self,
        org: OrgId,
        employee_id: u64,
    ) -> Result<Option<CompensationConfig>, AppError>;

    async fn list_active_employees(&self, org: OrgId) -> Result<Vec<u64>, AppError>;
}
