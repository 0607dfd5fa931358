use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::api::PeriodQuery;
use crate::auth::auth::AuthUser;
use crate::service::advance_ledger::AdvanceLedger;

#[derive(Deserialize, ToSchema)]
pub struct CreateAdvance {
    #[schema(example = 1001)]
    pub employee_id: u64,

    #[schema(example = "1500", value_type = String)]
    pub amount: Decimal,

    /// Defaults to today (UTC)
    #[schema(example = "2026-01-10", value_type = Option<String>, format = "date")]
    pub date: Option<NaiveDate>,

    #[schema(example = "Medical emergency")]
    #[serde(default)]
    pub description: String,
}

#[utoipa::path(
    post,
    path = "/api/advance",
    request_body = CreateAdvance,
    responses(
        (status = 201, description = "Advance recorded", body = crate::model::advance::AdvanceRecord),
        (status = 400, description = "Negative, over-precise or out-of-range amount", body = Object, example = json!({
            "message": "Invalid input: advance amount must not be negative, got -10"
        })),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Advance"
)]
pub async fn create_advance(
    auth: AuthUser,
    ledger: web::Data<AdvanceLedger>,
    payload: web::Json<CreateAdvance>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let payload = payload.into_inner();
    let record = ledger
        .record(
            auth.org_id,
            payload.employee_id,
            payload.amount,
            payload.date.unwrap_or_else(|| Utc::now().date_naive()),
            payload.description,
        )
        .await?;

    Ok(HttpResponse::Created().json(record))
}

#[utoipa::path(
    get,
    path = "/api/advance/employee/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID"),
        PeriodQuery
    ),
    responses(
        (status = 200, body = [crate::model::advance::AdvanceRecord]),
        (status = 400, description = "Invalid period"),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Advance"
)]
pub async fn list_for_employee(
    auth: AuthUser,
    ledger: web::Data<AdvanceLedger>,
    path: web::Path<u64>,
    query: web::Query<PeriodQuery>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    auth.require_self_or_hr(employee_id)?;

    let period = query.period()?;
    let records = ledger
        .query_by_employee_range(auth.org_id, employee_id, period.start, period.end)
        .await?;

    Ok(HttpResponse::Ok().json(records))
}
