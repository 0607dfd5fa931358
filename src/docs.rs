use crate::api::advance::CreateAdvance;
use crate::api::attendance::{PunchRequest, RecordAttendance};
use crate::model::advance::AdvanceRecord;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus, AttendanceSummary, LocationClaim};
use crate::model::employee::{CompensationConfig, RateType};
use crate::model::payroll::{PayrollLine, PayrollReport, Period, ReportFailure};
use crate::utils::event_feed::DomainEvent;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Payroll API",
        version = "1.0.0",
        description = r#"
## Attendance & Payroll

Attendance ledger, salary advances and payroll computation for an organization.

### 🔹 Key Features
- **Attendance**
  - Record a day's attendance, device check-in and check-out
  - Mock GPS locations are rejected
- **Advances**
  - Record salary advances, deducted from the period's payable
- **Payroll**
  - Per-employee slips and organization reports for a month or a date range
  - Overtime above 8 hours a day paid at 1.5×
- **Events**
  - Recent attendance, advance and salary updates

### 🔐 Security
All endpoints are protected using **JWT Bearer authentication**.
Reports, advances and the event feed require the **Admin** or **HR** role;
employees may only read their own records.

### 💰 Amounts
Money and hours are exact decimals serialized as strings (e.g. `"1500.50"`).
"#,
    ),
    paths(
        crate::api::attendance::record_attendance,
        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::list_by_date,
        crate::api::attendance::list_for_employee,

        crate::api::advance::create_advance,
        crate::api::advance::list_for_employee,

        crate::api::payroll::get_report,
        crate::api::payroll::get_slip,
        crate::api::payroll::get_own_slip,

        crate::api::events::recent_events
    ),
    components(
        schemas(
            RecordAttendance,
            PunchRequest,
            AttendanceRecord,
            AttendanceSummary,
            AttendanceStatus,
            LocationClaim,
            CreateAdvance,
            AdvanceRecord,
            CompensationConfig,
            RateType,
            Period,
            PayrollLine,
            PayrollReport,
            ReportFailure,
            DomainEvent
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Attendance", description = "Attendance ledger APIs"),
        (name = "Advance", description = "Salary advance APIs"),
        (name = "Payroll", description = "Payroll computation APIs"),
        (name = "Events", description = "Recent domain events"),
    )
)]
pub struct ApiDoc;
