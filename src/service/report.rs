use std::sync::Arc;

use futures::{StreamExt, stream};
use serde_json::json;
use tracing::{debug, info, warn};

use super::calculator;
use super::notification::{NotificationPort, SALARY_UPDATE, publish_best_effort};
use crate::error::AppError;
use crate::model::OrgId;
use crate::model::payroll::{PayrollLine, PayrollReport, Period, ReportFailure};
use crate::store::{AdvanceStore, AttendanceStore, EmployeeDirectory};

/// Runs the payroll calculator across employees for a period.
pub struct PayrollReportAggregator {
    attendance: Arc<dyn AttendanceStore>,
    advances: Arc<dyn AdvanceStore>,
    directory: Arc<dyn EmployeeDirectory>,
    notifier: Arc<dyn NotificationPort>,
    workers: usize,
}

impl PayrollReportAggregator {
    pub fn new(
        attendance: Arc<dyn AttendanceStore>,
        advances: Arc<dyn AdvanceStore>,
        directory: Arc<dyn EmployeeDirectory>,
        notifier: Arc<dyn NotificationPort>,
        workers: usize,
    ) -> Self {
        Self {
            attendance,
            advances,
            directory,
            notifier,
            workers: workers.max(1),
        }
    }

    async fn line_for(&self, org: OrgId, period: Period, employee_id: u64) -> Result<PayrollLine, AppError> {
        let config = self
            .directory
            .compensation_config(org, employee_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("employee {employee_id}")))?;

        let (attendance, advances) = futures::try_join!(
            self.attendance
                .by_employee_range(org, employee_id, period.start, period.end),
            self.advances
                .by_employee_range(org, employee_id, period.start, period.end),
        )?;

        debug!(
            org,
            employee_id,
            attendance = attendance.len(),
            advances = advances.len(),
            "Computing payroll line"
        );

        calculator::calculate(employee_id, &config, &attendance, &advances)
    }

    /// One line per employee, in the order given. Employees whose line
    /// cannot be computed are listed in `failures` instead.
    pub async fn build_report(&self, org: OrgId, period: Period, employees: &[u64]) -> PayrollReport {
        let results: Vec<Result<PayrollLine, AppError>> = stream::iter(employees.iter().copied())
            .map(|employee_id| self.line_for(org, period, employee_id))
            .buffered(self.workers)
            .collect()
            .await;

        let mut lines = Vec::with_capacity(employees.len());
        let mut failures = Vec::new();
        for (&employee_id, result) in employees.iter().zip(results) {
            match result {
                Ok(line) => lines.push(line),
                Err(e) => {
                    warn!(org, employee_id, error = %e, "Payroll line failed");
                    failures.push(ReportFailure {
                        employee_id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            org,
            period = %period.label(),
            lines = lines.len(),
            failures = failures.len(),
            "Payroll report generated"
        );

        publish_best_effort(
            self.notifier.clone(),
            org,
            SALARY_UPDATE,
            json!({
                "period": period.label(),
                "lines": lines.len(),
                "failures": failures.len(),
            }),
        );

        PayrollReport {
            period,
            lines,
            failures,
        }
    }

    /// Report over every active employee of the organization.
    pub async fn build_org_report(&self, org: OrgId, period: Period) -> Result<PayrollReport, AppError> {
        let employees = self.directory.list_active_employees(org).await?;
        Ok(self.build_report(org, period, &employees).await)
    }

    /// Pay slip of one employee; any failure fails the call.
    pub async fn build_slip(&self, org: OrgId, period: Period, employee_id: u64) -> Result<PayrollLine, AppError> {
        let line = self.line_for(org, period, employee_id).await?;

        publish_best_effort(
            self.notifier.clone(),
            org,
            SALARY_UPDATE,
            json!({
                "period": period.label(),
                "employee_id": employee_id,
                "final_payable": line.final_payable,
            }),
        );

        Ok(line)
    }
}
