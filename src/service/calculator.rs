//! Payroll arithmetic for one employee and one period.
//!
//! Everything here is a pure function of its arguments: the same attendance
//! and advance slices always produce the same [`PayrollLine`].

use rust_decimal::Decimal;

use crate::error::AppError;
use crate::model::advance::AdvanceRecord;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::employee::{CompensationConfig, OVERTIME_MULTIPLIER, RateType, STANDARD_DAY_HOURS};
use crate::model::payroll::PayrollLine;

/// Day and hour counts derived from an attendance slice.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AttendanceTally {
    pub present_days: u32,
    pub paid_leave_days: u32,
    pub total_hours: Decimal,
    pub overtime_hours: Decimal,
}

fn add(a: Decimal, b: Decimal, what: &'static str) -> Result<Decimal, AppError> {
    a.checked_add(b).ok_or(AppError::Overflow(what))
}

fn sub(a: Decimal, b: Decimal, what: &'static str) -> Result<Decimal, AppError> {
    a.checked_sub(b).ok_or(AppError::Overflow(what))
}

fn mul(a: Decimal, b: Decimal, what: &'static str) -> Result<Decimal, AppError> {
    a.checked_mul(b).ok_or(AppError::Overflow(what))
}

fn increment(n: u32, what: &'static str) -> Result<u32, AppError> {
    n.checked_add(1).ok_or(AppError::Overflow(what))
}

pub fn tally(records: &[AttendanceRecord]) -> Result<AttendanceTally, AppError> {
    let mut tally = AttendanceTally::default();

    for record in records {
        match record.status {
            AttendanceStatus::Present => {
                if record.working_hours < Decimal::ZERO {
                    return Err(AppError::InvalidInput(format!(
                        "negative working hours on {} for employee {}",
                        record.date, record.employee_id
                    )));
                }
                tally.present_days = increment(tally.present_days, "present_days")?;
                tally.total_hours = add(tally.total_hours, record.working_hours, "total_hours")?;
                if record.working_hours > STANDARD_DAY_HOURS {
                    tally.overtime_hours = add(
                        tally.overtime_hours,
                        record.working_hours - STANDARD_DAY_HOURS,
                        "overtime_hours",
                    )?;
                }
            }
            status if status.is_paid_leave() => {
                tally.paid_leave_days = increment(tally.paid_leave_days, "paid_leave_days")?;
            }
            // unpaid leave and absence earn nothing
            _ => {}
        }
    }

    Ok(tally)
}

/// Base salary under the employee's rate type.
///
/// Per-hour leave days are paid as a flat standard day.
pub fn base_salary(rate_type: RateType, rate: Decimal, tally: &AttendanceTally) -> Result<Decimal, AppError> {
    match rate_type {
        RateType::PerDay => {
            let days = Decimal::from(tally.present_days) + Decimal::from(tally.paid_leave_days);
            mul(days, rate, "base_salary")
        }
        RateType::PerHour => {
            let regular_hours = sub(tally.total_hours, tally.overtime_hours, "regular_hours")?;
            let worked = mul(regular_hours, rate, "base_salary")?;
            let leave_hours = mul(
                Decimal::from(tally.paid_leave_days),
                STANDARD_DAY_HOURS,
                "leave_hours",
            )?;
            let leave = mul(leave_hours, rate, "base_salary")?;
            add(worked, leave, "base_salary")
        }
    }
}

pub fn calculate(
    employee_id: u64,
    config: &CompensationConfig,
    attendance: &[AttendanceRecord],
    advances: &[AdvanceRecord],
) -> Result<PayrollLine, AppError> {
    if config.rate < Decimal::ZERO {
        return Err(AppError::InvalidInput(format!(
            "negative rate {} for employee {employee_id}",
            config.rate
        )));
    }
    if let Some(stray) = attendance.iter().find(|r| r.employee_id != employee_id) {
        return Err(AppError::InvalidInput(format!(
            "attendance record {} belongs to employee {}, not {employee_id}",
            stray.id, stray.employee_id
        )));
    }
    if let Some(stray) = advances.iter().find(|a| a.employee_id != employee_id) {
        return Err(AppError::InvalidInput(format!(
            "advance {} belongs to employee {}, not {employee_id}",
            stray.id, stray.employee_id
        )));
    }

    let tally = tally(attendance)?;

    let hourly_rate = config.rate_type.hourly_rate(config.rate);
    let base_salary = base_salary(config.rate_type, config.rate, &tally)?;
    let overtime_pay = mul(
        mul(tally.overtime_hours, hourly_rate, "overtime_pay")?,
        OVERTIME_MULTIPLIER,
        "overtime_pay",
    )?;

    let mut total_advance = Decimal::ZERO;
    for advance in advances {
        if advance.amount < Decimal::ZERO {
            return Err(AppError::InvalidInput(format!(
                "negative advance {} on record {}",
                advance.amount, advance.id
            )));
        }
        total_advance = add(total_advance, advance.amount, "total_advance")?;
    }

    let total_earnings = add(base_salary, overtime_pay, "total_earnings")?;
    let final_payable = sub(total_earnings, total_advance, "final_payable")?;

    Ok(PayrollLine {
        employee_id,
        present_days: tally.present_days,
        paid_leave_days: tally.paid_leave_days,
        total_hours: tally.total_hours,
        overtime_hours: tally.overtime_hours,
        base_salary,
        overtime_pay,
        total_advance,
        total_earnings,
        final_payable,
    })
}
