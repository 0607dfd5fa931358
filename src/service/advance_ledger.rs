use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::json;
use tracing::info;

use super::notification::{ADVANCE_UPDATE, NotificationPort, publish_best_effort};
use crate::error::AppError;
use crate::model::OrgId;
use crate::model::advance::{AMOUNT_SCALE, AdvanceRecord, MAX_ADVANCE_AMOUNT, NewAdvance};
use crate::model::payroll::Period;
use crate::store::AdvanceStore;

/// Append-only log of cash advances.
pub struct AdvanceLedger {
    store: Arc<dyn AdvanceStore>,
    notifier: Arc<dyn NotificationPort>,
}

impl AdvanceLedger {
    pub fn new(store: Arc<dyn AdvanceStore>, notifier: Arc<dyn NotificationPort>) -> Self {
        Self { store, notifier }
    }

    pub async fn record(
        &self,
        org: OrgId,
        employee_id: u64,
        amount: Decimal,
        date: NaiveDate,
        description: String,
    ) -> Result<AdvanceRecord, AppError> {
        if amount < Decimal::ZERO {
            return Err(AppError::InvalidInput(format!(
                "advance amount must not be negative, got {amount}"
            )));
        }
        if amount > MAX_ADVANCE_AMOUNT {
            return Err(AppError::InvalidInput(format!(
                "advance amount must not exceed {MAX_ADVANCE_AMOUNT}, got {amount}"
            )));
        }
        if amount.normalize().scale() > AMOUNT_SCALE {
            return Err(AppError::InvalidInput(format!(
                "advance amount allows at most {AMOUNT_SCALE} decimals, got {amount}"
            )));
        }

        let record = self
            .store
            .insert(
                org,
                NewAdvance {
                    employee_id,
                    amount,
                    date,
                    description: description.trim().to_string(),
                },
            )
            .await?;

        info!(org, employee_id, advance_id = record.id, %amount, "Advance recorded");

        publish_best_effort(
            self.notifier.clone(),
            org,
            ADVANCE_UPDATE,
            json!({
                "employee_id": employee_id,
                "amount": record.amount,
                "date": record.date,
            }),
        );

        Ok(record)
    }

    pub async fn query_by_employee_range(
        &self,
        org: OrgId,
        employee_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AdvanceRecord>, AppError> {
        let period = Period::new(start, end)?;
        self.store
            .by_employee_range(org, employee_id, period.start, period.end)
            .await
    }
}
