use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

/// Hours that make up one paid working day.
pub const STANDARD_DAY_HOURS: Decimal = dec!(8);

/// Overtime premium applied to the effective hourly rate.
pub const OVERTIME_MULTIPLIER: Decimal = dec!(1.5);

/// Compensation basis of an employee.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, EnumString, Display, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum RateType {
    PerDay,
    PerHour,
}

impl RateType {
    /// Effective hourly rate used for overtime.
    pub fn hourly_rate(self, rate: Decimal) -> Decimal {
        match self {
            RateType::PerDay => rate / STANDARD_DAY_HOURS,
            RateType::PerHour => rate,
        }
    }
}

/// Compensation settings read from the employee directory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({ "rate": "1000", "rate_type": "per_day" }))]
pub struct CompensationConfig {
    #[schema(value_type = String, example = "1000")]
    pub rate: Decimal,
    pub rate_type: RateType,
}

#[cfg(test)]
impl CompensationConfig {
    pub fn per_day(rate: Decimal) -> Self {
        Self {
            rate,
            rate_type: RateType::PerDay,
        }
    }

    pub fn per_hour(rate: Decimal) -> Self {
        Self {
            rate,
            rate_type: RateType::PerHour,
        }
    }
}
