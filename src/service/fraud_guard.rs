use crate::model::attendance::AttendanceEvent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FraudVerdict {
    Accepted,
    Rejected(String),
}

/// Screens attendance events before they reach the ledger.
///
/// Only an explicit mock-location flag rejects; events without location
/// data pass.
pub fn validate(event: &AttendanceEvent) -> FraudVerdict {
    match event.location {
        Some(location) if location.is_mock => FraudVerdict::Rejected(format!(
            "mock location reported for employee {} on {}",
            event.employee_id, event.date
        )),
        _ => FraudVerdict::Accepted,
    }
}
