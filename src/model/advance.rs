use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Largest amount the `DECIMAL(14, 2)` column holds.
pub const MAX_ADVANCE_AMOUNT: Decimal = dec!(999999999999.99);

/// Amounts are stored in cents.
pub const AMOUNT_SCALE: u32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "employee_id": 1001,
    "amount": "1500",
    "date": "2026-01-10",
    "description": "Medical emergency"
}))]
pub struct AdvanceRecord {
    pub id: u64,
    pub employee_id: u64,
    #[schema(value_type = String)]
    pub amount: Decimal,
    #[schema(format = "date", value_type = String)]
    pub date: NaiveDate,
    pub description: String,
}

/// Advance as handed to the ledger, before it has an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAdvance {
    pub employee_id: u64,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub description: String,
}
