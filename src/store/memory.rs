//! In-process stores backing the unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;

use super::{AdvanceStore, AttendanceStore, EmployeeDirectory};
use crate::error::AppError;
use crate::model::OrgId;
use crate::model::advance::{AdvanceRecord, NewAdvance};
use crate::model::attendance::{AttendancePatch, AttendanceRecord};
use crate::model::employee::CompensationConfig;

#[derive(Default)]
pub struct MemoryStore {
    next_id: AtomicU64,
    attendance: Mutex<HashMap<(OrgId, u64, NaiveDate), AttendanceRecord>>,
    advances: Mutex<Vec<(OrgId, AdvanceRecord)>>,
    employees: Mutex<Vec<(OrgId, u64, CompensationConfig, bool)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_employee(&self, org: OrgId, employee_id: u64, config: CompensationConfig) {
        self.employees
            .lock()
            .unwrap()
            .push((org, employee_id, config, true));
    }

    pub fn deactivate_employee(&self, org: OrgId, employee_id: u64) {
        for entry in self.employees.lock().unwrap().iter_mut() {
            if entry.0 == org && entry.1 == employee_id {
                entry.3 = false;
            }
        }
    }

    pub fn attendance_count(&self) -> usize {
        self.attendance.lock().unwrap().len()
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }
}

#[async_trait]
impl AttendanceStore for MemoryStore {
    async fn upsert(
        &self,
        org: OrgId,
        employee_id: u64,
        date: NaiveDate,
        patch: &AttendancePatch,
    ) -> Result<AttendanceRecord, AppError> {
        let mut rows = self.attendance.lock().unwrap();
        let record = match rows.get_mut(&(org, employee_id, date)) {
            Some(existing) => {
                patch.apply_to(existing);
                existing.clone()
            }
            None => {
                let record = patch.clone().into_new_record(self.next_id(), employee_id, date);
                rows.insert((org, employee_id, date), record.clone());
                record
            }
        };
        Ok(record)
    }

    async fn find(
        &self,
        org: OrgId,
        employee_id: u64,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, AppError> {
        Ok(self
            .attendance
            .lock()
            .unwrap()
            .get(&(org, employee_id, date))
            .cloned())
    }

    async fn by_date(&self, org: OrgId, date: NaiveDate) -> Result<Vec<AttendanceRecord>, AppError> {
        let mut records: Vec<_> = self
            .attendance
            .lock()
            .unwrap()
            .iter()
            .filter(|((o, _, d), _)| *o == org && *d == date)
            .map(|(_, r)| r.clone())
            .collect();
        records.sort_by_key(|r| r.employee_id);
        Ok(records)
    }

    async fn by_employee_range(
        &self,
        org: OrgId,
        employee_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, AppError> {
        let mut records: Vec<_> = self
            .attendance
            .lock()
            .unwrap()
            .iter()
            .filter(|((o, e, d), _)| *o == org && *e == employee_id && start <= *d && *d <= end)
            .map(|(_, r)| r.clone())
            .collect();
        records.sort_by_key(|r| r.date);
        Ok(records)
    }
}

#[async_trait]
impl AdvanceStore for MemoryStore {
    async fn insert(&self, org: OrgId, advance: NewAdvance) -> Result<AdvanceRecord, AppError> {
        let record = AdvanceRecord {
            id: self.next_id(),
            employee_id: advance.employee_id,
            amount: advance.amount,
            date: advance.date,
            description: advance.description,
        };
        self.advances.lock().unwrap().push((org, record.clone()));
        Ok(record)
    }

    async fn by_employee_range(
        &self,
        org: OrgId,
        employee_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AdvanceRecord>, AppError> {
        let mut records: Vec<_> = self
            .advances
            .lock()
            .unwrap()
            .iter()
            .filter(|(o, a)| {
                *o == org && a.employee_id == employee_id && start <= a.date && a.date <= end
            })
            .map(|(_, a)| a.clone())
            .collect();
        records.sort_by_key(|a| (a.date, a.id));
        Ok(records)
    }
}

#[async_trait]
impl EmployeeDirectory for MemoryStore {
    async fn compensation_config(
        &self,
        org: OrgId,
        employee_id: u64,
    ) -> Result<Option<CompensationConfig>, AppError> {
        Ok(self
            .employees
            .lock()
            .unwrap()
            .iter()
            .find(|(o, id, _, _)| *o == org && *id == employee_id)
            .map(|(_, _, config, _)| *config))
    }

    async fn list_active_employees(&self, org: OrgId) -> Result<Vec<u64>, AppError> {
        Ok(self
            .employees
            .lock()
            .unwrap()
            .iter()
            .filter(|(o, _, _, active)| *o == org && *active)
            .map(|(_, id, _, _)| *id)
            .collect())
    }
}
