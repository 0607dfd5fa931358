pub mod advance_ledger;
pub mod attendance_ledger;
pub mod calculator;
pub mod fraud_guard;
pub mod notification;
pub mod report;
