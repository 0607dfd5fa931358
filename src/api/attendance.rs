use std::str::FromStr;

use crate::api::PeriodQuery;
use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::model::attendance::{
    AttendanceEvent, AttendanceStatus, AttendanceSummary, LocationClaim,
};
use crate::service::attendance_ledger::AttendanceLedger;
use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct RecordAttendance {
    /// Defaults to the caller's own employee profile
    #[schema(example = 1001)]
    pub employee_id: Option<u64>,
    /// Defaults to today (UTC)
    #[schema(example = "2026-01-05", format = "date", value_type = Option<String>)]
    pub date: Option<NaiveDate>,
    #[schema(example = "present")]
    pub status: String,
    #[schema(example = "8.5", value_type = Option<String>)]
    pub working_hours: Option<Decimal>,
    #[schema(example = "2026-01-05T09:00:00Z", format = "date-time", value_type = Option<String>)]
    pub check_in: Option<DateTime<Utc>>,
    #[schema(example = "2026-01-05T17:30:00Z", format = "date-time", value_type = Option<String>)]
    pub check_out: Option<DateTime<Utc>>,
    pub location: Option<LocationClaim>,
}

#[derive(Deserialize, ToSchema)]
pub struct PunchRequest {
    pub location: Option<LocationClaim>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DateQuery {
    /// Defaults to today (UTC)
    #[param(value_type = Option<String>, example = "2026-01-05")]
    pub date: Option<NaiveDate>,
}

/// Record attendance for a day (create or merge)
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = RecordAttendance,
    responses(
        (status = 200, description = "Attendance recorded", body = crate::model::attendance::AttendanceRecord),
        (status = 400, description = "Invalid input", body = Object, example = json!({
            "message": "Invalid input: unknown attendance status 'holiday'"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 422, description = "Mock location detected", body = Object, example = json!({
            "message": "Location fraud detected: mock location reported for employee 1001 on 2026-01-05"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn record_attendance(
    auth: AuthUser,
    ledger: web::Data<AttendanceLedger>,
    payload: web::Json<RecordAttendance>,
) -> actix_web::Result<impl Responder> {
    let payload = payload.into_inner();

    let employee_id = match payload.employee_id {
        Some(id) => {
            auth.require_self_or_hr(id)?;
            id
        }
        None => auth.own_employee_id()?,
    };

    let status = AttendanceStatus::from_str(&payload.status).map_err(|_| {
        AppError::InvalidInput(format!("unknown attendance status '{}'", payload.status))
    })?;

    let now = Utc::now();
    let event = AttendanceEvent {
        employee_id,
        date: payload.date.unwrap_or_else(|| now.date_naive()),
        status,
        working_hours: payload.working_hours,
        check_in: payload.check_in,
        check_out: payload.check_out,
        location: payload.location,
    };

    let record = ledger.record_attendance(auth.org_id, event, now).await?;
    Ok(HttpResponse::Ok().json(record))
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/check-in",
    request_body(content = PunchRequest, description = "Optional device location"),
    responses(
        (status = 200, description = "Checked in successfully", body = crate::model::attendance::AttendanceRecord),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 422, description = "Mock location detected")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    ledger: web::Data<AttendanceLedger>,
    body: Option<web::Json<PunchRequest>>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.own_employee_id()?;
    let location = body.and_then(|b| b.into_inner().location);

    let record = ledger
        .check_in(auth.org_id, employee_id, Utc::now(), location)
        .await?;
    Ok(HttpResponse::Ok().json(record))
}

/// Check-out endpoint
#[utoipa::path(
    put,
    path = "/api/attendance/check-out",
    request_body(content = PunchRequest, description = "Optional device location"),
    responses(
        (status = 200, description = "Checked out successfully", body = crate::model::attendance::AttendanceRecord),
        (status = 404, description = "No check-in found for today", body = Object, example = json!({
            "message": "check-in of employee 1001 on 2026-01-05 not found"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    ledger: web::Data<AttendanceLedger>,
    body: Option<web::Json<PunchRequest>>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.own_employee_id()?;
    let location = body.and_then(|b| b.into_inner().location);

    let record = ledger
        .check_out(auth.org_id, employee_id, Utc::now(), location)
        .await?;
    Ok(HttpResponse::Ok().json(record))
}

/// Daily attendance view (HR/Admin)
#[utoipa::path(
    get,
    path = "/api/attendance",
    params(DateQuery),
    responses(
        (status = 200, description = "All records of the day", body = [crate::model::attendance::AttendanceRecord]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn list_by_date(
    auth: AuthUser,
    ledger: web::Data<AttendanceLedger>,
    query: web::Query<DateQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let records = ledger.query_by_date(auth.org_id, date).await?;
    Ok(HttpResponse::Ok().json(records))
}

/// Attendance of one employee over a period
#[utoipa::path(
    get,
    path = "/api/attendance/employee/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID"),
        PeriodQuery
    ),
    responses(
        (status = 200, description = "Records ordered by date", body = [AttendanceSummary]),
        (status = 400, description = "Invalid period"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn list_for_employee(
    auth: AuthUser,
    ledger: web::Data<AttendanceLedger>,
    path: web::Path<u64>,
    query: web::Query<PeriodQuery>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    auth.require_self_or_hr(employee_id)?;

    let period = query.period()?;
    let records = ledger
        .query_by_employee_range(auth.org_id, employee_id, period.start, period.end)
        .await?;

    let summaries: Vec<AttendanceSummary> = records.iter().map(AttendanceSummary::from).collect();
    Ok(HttpResponse::Ok().json(summaries))
}
