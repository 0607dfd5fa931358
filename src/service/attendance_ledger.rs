use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use tracing::{info, warn};

use super::fraud_guard::{self, FraudVerdict};
use super::notification::{ATTENDANCE_UPDATE, NotificationPort, publish_best_effort};
use crate::error::AppError;
use crate::model::OrgId;
use crate::model::attendance::{
    AttendanceEvent, AttendancePatch, AttendanceRecord, AttendanceStatus, HOURS_SCALE, LocationClaim,
    MAX_WORKING_HOURS,
};
use crate::model::payroll::Period;
use crate::store::AttendanceStore;

const SECONDS_PER_HOUR: i64 = 3600;

pub struct AttendanceLedger {
    store: Arc<dyn AttendanceStore>,
    notifier: Arc<dyn NotificationPort>,
}

fn validate_event(event: &AttendanceEvent) -> Result<(), AppError> {
    if let Some(hours) = event.working_hours {
        if hours < Decimal::ZERO {
            return Err(AppError::InvalidInput(format!(
                "working_hours must not be negative, got {hours}"
            )));
        }
        if hours > MAX_WORKING_HOURS {
            return Err(AppError::InvalidInput(format!(
                "working_hours must not exceed {MAX_WORKING_HOURS}, got {hours}"
            )));
        }
        if hours.normalize().scale() > HOURS_SCALE {
            return Err(AppError::InvalidInput(format!(
                "working_hours allows at most {HOURS_SCALE} decimals, got {hours}"
            )));
        }
    }

    if let Some(location) = event.location {
        if !(-90.0..=90.0).contains(&location.latitude)
            || !(-180.0..=180.0).contains(&location.longitude)
        {
            return Err(AppError::InvalidInput(format!(
                "coordinates out of range: {}, {}",
                location.latitude, location.longitude
            )));
        }
    }

    if let (Some(check_in), Some(check_out)) = (event.check_in, event.check_out) {
        if check_out < check_in {
            return Err(AppError::InvalidInput(
                "check_out is earlier than check_in".to_string(),
            ));
        }
    }

    Ok(())
}

/// Hours between check-in and check-out, rounded to two decimals.
fn hours_between(check_in: DateTime<Utc>, check_out: DateTime<Utc>) -> Decimal {
    let seconds = (check_out - check_in).num_seconds().max(0);
    (Decimal::from(seconds) / Decimal::from(SECONDS_PER_HOUR)).round_dp(2)
}

impl AttendanceLedger {
    pub fn new(store: Arc<dyn AttendanceStore>, notifier: Arc<dyn NotificationPort>) -> Self {
        Self { store, notifier }
    }

    /// Records one attendance event, creating or merging the day's row.
    pub async fn record_attendance(
        &self,
        org: OrgId,
        event: AttendanceEvent,
        now: DateTime<Utc>,
    ) -> Result<AttendanceRecord, AppError> {
        validate_event(&event)?;

        if let FraudVerdict::Rejected(reason) = fraud_guard::validate(&event) {
            warn!(
                org,
                employee_id = event.employee_id,
                date = %event.date,
                %reason,
                "Attendance event rejected"
            );
            return Err(AppError::LocationFraudDetected(reason));
        }

        let patch = AttendancePatch {
            status: event.status,
            working_hours: event.working_hours,
            check_in: Some(event.check_in.unwrap_or(now)),
            check_out: event.check_out,
            location: event.location,
        };

        let record = self
            .store
            .upsert(org, event.employee_id, event.date, &patch)
            .await?;

        info!(
            org,
            employee_id = record.employee_id,
            date = %record.date,
            status = %record.status,
            "Attendance recorded"
        );

        publish_best_effort(
            self.notifier.clone(),
            org,
            ATTENDANCE_UPDATE,
            json!({
                "employee_id": record.employee_id,
                "date": record.date,
                "status": record.status,
                "working_hours": record.working_hours,
            }),
        );

        Ok(record)
    }

    /// Marks the employee present from `now`.
    pub async fn check_in(
        &self,
        org: OrgId,
        employee_id: u64,
        now: DateTime<Utc>,
        location: Option<LocationClaim>,
    ) -> Result<AttendanceRecord, AppError> {
        let event = AttendanceEvent {
            employee_id,
            date: now.date_naive(),
            status: AttendanceStatus::Present,
            working_hours: None,
            check_in: Some(now),
            check_out: None,
            location,
        };
        self.record_attendance(org, event, now).await
    }

    /// Closes the open row and derives working hours from the stored check-in.
    ///
    /// Only rows marked present can be checked out.
    pub async fn check_out(
        &self,
        org: OrgId,
        employee_id: u64,
        now: DateTime<Utc>,
        location: Option<LocationClaim>,
    ) -> Result<AttendanceRecord, AppError> {
        let today = now.date_naive();
        let existing = match self.store.find(org, employee_id, today).await? {
            Some(record) => Some(record),
            // shift opened before midnight UTC and still running
            None => match today.pred_opt() {
                Some(yesterday) => self
                    .store
                    .find(org, employee_id, yesterday)
                    .await?
                    .filter(|r| r.status == AttendanceStatus::Present && r.check_out.is_none()),
                None => None,
            },
        };
        let existing = existing
            .ok_or_else(|| AppError::NotFound(format!("check-in of employee {employee_id} on {today}")))?;

        if existing.status != AttendanceStatus::Present {
            return Err(AppError::InvalidInput(format!(
                "employee {employee_id} is recorded as {} on {}, nothing to check out",
                existing.status, existing.date
            )));
        }

        let event = AttendanceEvent {
            employee_id,
            date: existing.date,
            status: AttendanceStatus::Present,
            working_hours: existing.check_in.map(|check_in| hours_between(check_in, now)),
            check_in: None,
            check_out: Some(now),
            location,
        };
        self.record_attendance(org, event, now).await
    }

    pub async fn query_by_date(&self, org: OrgId, date: NaiveDate) -> Result<Vec<AttendanceRecord>, AppError> {
        self.store.by_date(org, date).await
    }

    /// Rows of one employee in `[start, end]`, oldest first.
    pub async fn query_by_employee_range(
        &self,
        org: OrgId,
        employee_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, AppError> {
        let period = Period::new(start, end)?;
        self.store
            .by_employee_range(org, employee_id, period.start, period.end)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::notification::testing::{BrokenPort, RecordingPort, StalledPort};
    use std::time::Duration;
    use crate::store::memory::MemoryStore;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    const ORG: OrgId = 1;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
    }

    fn at(d: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, d, h, m, 0).unwrap()
    }

    fn event(employee_id: u64, date: NaiveDate, status: AttendanceStatus) -> AttendanceEvent {
        AttendanceEvent {
            employee_id,
            date,
            status,
            working_hours: None,
            check_in: None,
            check_out: None,
            location: None,
        }
    }

    fn ledger() -> (Arc<MemoryStore>, Arc<RecordingPort>, AttendanceLedger) {
        let store = Arc::new(MemoryStore::new());
        let port = Arc::new(RecordingPort::default());
        let ledger = AttendanceLedger::new(store.clone(), port.clone());
        (store, port, ledger)
    }

    #[actix_web::test]
    async fn same_day_events_merge_into_one_row() {
        let (store, port, ledger) = ledger();

        let first = ledger
            .record_attendance(
                ORG,
                AttendanceEvent {
                    working_hours: Some(dec!(9)),
                    ..event(7, day(5), AttendanceStatus::Present)
                },
                at(5, 9, 0),
            )
            .await
            .unwrap();
        assert_eq!(first.check_in, Some(at(5, 9, 0)));

        let second = ledger
            .record_attendance(ORG, event(7, day(5), AttendanceStatus::SickLeave), at(5, 12, 0))
            .await
            .unwrap();

        assert_eq!(store.attendance_count(), 1);
        assert_eq!(second.id, first.id);
        assert_eq!(second.status, AttendanceStatus::SickLeave);
        assert_eq!(second.working_hours, dec!(9));
        assert_eq!(second.check_in, Some(at(5, 9, 0)));
        assert_eq!(port.wait_for(2).await, vec![ATTENDANCE_UPDATE, ATTENDANCE_UPDATE]);
    }

    #[actix_web::test]
    async fn concurrent_events_for_one_key_leave_one_row() {
        let (store, _, ledger) = ledger();
        let (a, b) = futures::join!(
            ledger.record_attendance(ORG, event(3, day(6), AttendanceStatus::Present), at(6, 9, 0)),
            ledger.record_attendance(ORG, event(3, day(6), AttendanceStatus::Absent), at(6, 9, 0)),
        );
        assert_eq!(a.unwrap().id, b.unwrap().id);
        assert_eq!(store.attendance_count(), 1);
        assert_eq!(ledger.query_by_date(ORG, day(6)).await.unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn mock_location_leaves_ledger_untouched() {
        let (store, port, ledger) = ledger();
        ledger
            .record_attendance(
                ORG,
                AttendanceEvent {
                    working_hours: Some(dec!(4)),
                    ..event(7, day(5), AttendanceStatus::Present)
                },
                at(5, 9, 0),
            )
            .await
            .unwrap();

        let spoofed = AttendanceEvent {
            working_hours: Some(dec!(12)),
            location: Some(LocationClaim {
                latitude: 1.0,
                longitude: 2.0,
                is_mock: true,
            }),
            ..event(7, day(5), AttendanceStatus::Absent)
        };
        let err = ledger.record_attendance(ORG, spoofed.clone(), at(5, 10, 0)).await;
        assert!(matches!(err, Err(AppError::LocationFraudDetected(_))));

        let fresh_day = AttendanceEvent { date: day(8), ..spoofed };
        assert!(ledger.record_attendance(ORG, fresh_day, at(8, 10, 0)).await.is_err());

        let rows = ledger.query_by_employee_range(ORG, 7, day(1), day(31)).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, AttendanceStatus::Present);
        assert_eq!(rows[0].working_hours, dec!(4));
        assert_eq!(store.attendance_count(), 1);
        assert_eq!(port.wait_for(1).await.len(), 1);
    }

    #[actix_web::test]
    async fn rejects_negative_hours_before_writing() {
        let (store, _, ledger) = ledger();
        let err = ledger
            .record_attendance(
                ORG,
                AttendanceEvent {
                    working_hours: Some(dec!(-1)),
                    ..event(7, day(5), AttendanceStatus::Present)
                },
                at(5, 9, 0),
            )
            .await;
        assert!(matches!(err, Err(AppError::InvalidInput(_))));
        assert_eq!(store.attendance_count(), 0);
    }

    #[actix_web::test]
    async fn hours_the_ledger_cannot_store_are_rejected() {
        let (store, _, ledger) = ledger();
        for hours in [dec!(8.005), dec!(24.01), dec!(10000)] {
            let err = ledger
                .record_attendance(
                    ORG,
                    AttendanceEvent {
                        working_hours: Some(hours),
                        ..event(7, day(5), AttendanceStatus::Present)
                    },
                    at(5, 9, 0),
                )
                .await;
            assert!(matches!(err, Err(AppError::InvalidInput(_))), "{hours} accepted");
        }
        assert_eq!(store.attendance_count(), 0);

        ledger
            .record_attendance(
                ORG,
                AttendanceEvent {
                    working_hours: Some(dec!(8.250)),
                    ..event(7, day(5), AttendanceStatus::Present)
                },
                at(5, 9, 0),
            )
            .await
            .unwrap();
        assert_eq!(store.attendance_count(), 1);
    }

    #[actix_web::test]
    async fn check_out_derives_hours_from_check_in() {
        let (_, _, ledger) = ledger();
        ledger.check_in(ORG, 11, at(9, 8, 30), None).await.unwrap();
        let record = ledger.check_out(ORG, 11, at(9, 18, 15), None).await.unwrap();

        assert_eq!(record.status, AttendanceStatus::Present);
        assert_eq!(record.working_hours, dec!(9.75));
        assert_eq!(record.check_in, Some(at(9, 8, 30)));
        assert_eq!(record.check_out, Some(at(9, 18, 15)));
    }

    #[actix_web::test]
    async fn check_out_is_refused_on_leave_days() {
        let (_, _, ledger) = ledger();
        ledger
            .record_attendance(ORG, event(11, day(9), AttendanceStatus::SickLeave), at(9, 7, 0))
            .await
            .unwrap();

        let err = ledger.check_out(ORG, 11, at(9, 18, 0), None).await;
        assert!(matches!(err, Err(AppError::InvalidInput(_))));

        let row = ledger.query_by_date(ORG, day(9)).await.unwrap().remove(0);
        assert_eq!(row.status, AttendanceStatus::SickLeave);
        assert_eq!(row.working_hours, Decimal::ZERO);
        assert_eq!(row.check_out, None);
    }

    #[actix_web::test]
    async fn overnight_check_out_closes_previous_day() {
        let (store, _, ledger) = ledger();
        ledger.check_in(ORG, 11, at(9, 22, 0), None).await.unwrap();

        let record = ledger.check_out(ORG, 11, at(10, 6, 30), None).await.unwrap();
        assert_eq!(record.date, day(9));
        assert_eq!(record.working_hours, dec!(8.5));
        assert_eq!(store.attendance_count(), 1);

        // once closed, the next morning has nothing open
        let err = ledger.check_out(ORG, 11, at(10, 7, 0), None).await;
        assert!(matches!(err, Err(AppError::NotFound(_))));
    }

    #[actix_web::test]
    async fn check_out_without_check_in_is_not_found() {
        let (_, _, ledger) = ledger();
        let err = ledger.check_out(ORG, 11, at(9, 18, 0), None).await;
        assert!(matches!(err, Err(AppError::NotFound(_))));
    }

    #[actix_web::test]
    async fn broken_notifier_does_not_fail_recording() {
        let store = Arc::new(MemoryStore::new());
        let ledger = AttendanceLedger::new(store.clone(), Arc::new(BrokenPort));
        ledger
            .record_attendance(ORG, event(2, day(3), AttendanceStatus::PaidLeave), at(3, 9, 0))
            .await
            .unwrap();
        assert_eq!(store.attendance_count(), 1);
    }

    #[actix_web::test]
    async fn stalled_notifier_does_not_block_recording() {
        let store = Arc::new(MemoryStore::new());
        let ledger = AttendanceLedger::new(store.clone(), Arc::new(StalledPort));

        let recorded = actix_web::rt::time::timeout(
            Duration::from_secs(2),
            ledger.record_attendance(ORG, event(2, day(3), AttendanceStatus::Present), at(3, 9, 0)),
        )
        .await;

        assert!(recorded.is_ok(), "recording waited on the notifier");
        assert!(recorded.unwrap().is_ok());
        assert_eq!(store.attendance_count(), 1);
    }

    #[actix_web::test]
    async fn range_query_is_ordered_and_scoped() {
        let (_, _, ledger) = ledger();
        for d in [20, 3, 11] {
            ledger
                .record_attendance(ORG, event(5, day(d), AttendanceStatus::Present), at(d, 9, 0))
                .await
                .unwrap();
        }
        ledger
            .record_attendance(2, event(5, day(4), AttendanceStatus::Present), at(4, 9, 0))
            .await
            .unwrap();

        let dates: Vec<_> = ledger
            .query_by_employee_range(ORG, 5, day(1), day(15))
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.date)
            .collect();
        assert_eq!(dates, vec![day(3), day(11)]);

        assert!(matches!(
            ledger.query_by_employee_range(ORG, 5, day(15), day(1)).await,
            Err(AppError::InvalidInput(_))
        ));
    }
}
