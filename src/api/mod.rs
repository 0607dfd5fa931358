pub mod advance;
pub mod attendance;
pub mod events;
pub mod payroll;

use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::AppError;
use crate::model::payroll::Period;

/// Period selector shared by range endpoints: `month` wins over `start`/`end`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PeriodQuery {
    /// Calendar month, YYYY-MM
    #[param(example = "2026-01")]
    pub month: Option<String>,
    /// First day of a custom range
    #[param(value_type = Option<String>, example = "2026-01-01")]
    pub start: Option<NaiveDate>,
    /// Last day of a custom range (inclusive)
    #[param(value_type = Option<String>, example = "2026-01-31")]
    pub end: Option<NaiveDate>,
}

impl PeriodQuery {
    pub fn period(&self) -> Result<Period, AppError> {
        if let Some(month) = self.month.as_deref() {
            return Period::parse_month(month);
        }
        match (self.start, self.end) {
            (Some(start), Some(end)) => Period::new(start, end),
            _ => Err(AppError::InvalidInput(
                "either month or both start and end are required".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_takes_precedence_over_range() {
        let query = PeriodQuery {
            month: Some("2026-02".into()),
            start: NaiveDate::from_ymd_opt(2026, 1, 1),
            end: NaiveDate::from_ymd_opt(2026, 1, 2),
        };
        assert_eq!(query.period().unwrap(), Period::month(2026, 2).unwrap());
    }

    #[test]
    fn half_open_range_is_rejected() {
        let query = PeriodQuery {
            start: NaiveDate::from_ymd_opt(2026, 1, 1),
            ..Default::default()
        };
        assert!(matches!(query.period(), Err(AppError::InvalidInput(_))));
    }
}
