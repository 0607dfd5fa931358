use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::api::PeriodQuery;
use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::service::report::PayrollReportAggregator;

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReportQuery {
    /// Comma separated employee ids; report order follows this list.
    /// Defaults to every active employee.
    #[param(example = "1001,1002")]
    pub employee_ids: Option<String>,
}

fn parse_employee_ids(raw: &str) -> Result<Vec<u64>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u64>()
                .map_err(|_| AppError::InvalidInput(format!("invalid employee id '{s}'")))
        })
        .collect()
}

/// Payroll report for a period (HR/Admin)
#[utoipa::path(
    get,
    path = "/api/payroll/report",
    params(PeriodQuery, ReportQuery),
    responses(
        (status = 200, description = "Lines in employee order plus failures", body = crate::model::payroll::PayrollReport),
        (status = 400, description = "Invalid period or employee list"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn get_report(
    auth: AuthUser,
    aggregator: web::Data<PayrollReportAggregator>,
    period: web::Query<PeriodQuery>,
    query: web::Query<ReportQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let period = period.period()?;
    let report = match query.employee_ids.as_deref() {
        Some(raw) => {
            let employees = parse_employee_ids(raw)?;
            aggregator.build_report(auth.org_id, period, &employees).await
        }
        None => aggregator.build_org_report(auth.org_id, period).await?,
    };

    Ok(HttpResponse::Ok().json(report))
}

/// Pay slip of one employee (self or HR/Admin)
#[utoipa::path(
    get,
    path = "/api/payroll/slip/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID"),
        PeriodQuery
    ),
    responses(
        (status = 200, body = crate::model::payroll::PayrollLine),
        (status = 403),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "employee 1001 not found"
        }))
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn get_slip(
    auth: AuthUser,
    aggregator: web::Data<PayrollReportAggregator>,
    path: web::Path<u64>,
    query: web::Query<PeriodQuery>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    auth.require_self_or_hr(employee_id)?;

    let line = aggregator
        .build_slip(auth.org_id, query.period()?, employee_id)
        .await?;
    Ok(HttpResponse::Ok().json(line))
}

/// Pay slip of the calling employee
#[utoipa::path(
    get,
    path = "/api/payroll/slip",
    params(PeriodQuery),
    responses(
        (status = 200, body = crate::model::payroll::PayrollLine),
        (status = 403, description = "No employee profile")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn get_own_slip(
    auth: AuthUser,
    aggregator: web::Data<PayrollReportAggregator>,
    query: web::Query<PeriodQuery>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.own_employee_id()?;

    let line = aggregator
        .build_slip(auth.org_id, query.period()?, employee_id)
        .await?;
    Ok(HttpResponse::Ok().json(line))
}
