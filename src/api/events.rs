use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::auth::auth::AuthUser;
use crate::utils::event_feed::{DomainEvent, EventFeed};

const DEFAULT_LIMIT: usize = 50;
const MAX_LIMIT: usize = 200;

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EventQuery {
    /// Number of events, newest first (1..=200)
    #[param(example = 50)]
    pub limit: Option<usize>,
}

/// Recent attendance, advance and salary events of the caller's organization
#[utoipa::path(
    get,
    path = "/api/events",
    params(EventQuery),
    responses(
        (status = 200, body = [DomainEvent]),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Events"
)]
pub async fn recent_events(
    auth: AuthUser,
    feed: web::Data<EventFeed>,
    query: web::Query<EventQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    Ok(HttpResponse::Ok().json(feed.recent(auth.org_id, limit)))
}

#[cfg(test)]
mod tests {
    use crate::api::testing::{Harness, bearer};
    use crate::model::role::Role;
    use actix_web::{App, http::StatusCode, test};
    use serde_json::{Value, json};
    use std::time::Duration;

    #[actix_web::test]
    async fn ledger_writes_show_up_newest_first() {
        let harness = Harness::new();
        let app = test::init_service(App::new().configure(|cfg| harness.configure(cfg))).await;

        let req = test::TestRequest::post()
            .uri("/attendance")
            .insert_header(("Authorization", bearer(Role::Employee, Some(7))))
            .set_json(json!({ "date": "2026-01-05", "status": "present", "working_hours": "8" }))
            .to_request();
        assert!(test::call_service(&app, req).await.status().is_success());

        let req = test::TestRequest::post()
            .uri("/advance")
            .insert_header(("Authorization", bearer(Role::Hr, None)))
            .set_json(json!({ "employee_id": 7, "amount": "250" }))
            .to_request();
        assert!(test::call_service(&app, req).await.status().is_success());

        // events are delivered on detached tasks
        actix_web::rt::time::sleep(Duration::from_millis(50)).await;

        let req = test::TestRequest::get()
            .uri("/events?limit=10")
            .insert_header(("Authorization", bearer(Role::Hr, None)))
            .to_request();
        let events: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(events[0]["event"], "advance_update");
        assert_eq!(events[1]["event"], "attendance_update");
        assert_eq!(events.as_array().unwrap().len(), 2);

        let req = test::TestRequest::get()
            .uri("/events?limit=0")
            .insert_header(("Authorization", bearer(Role::Admin, None)))
            .to_request();
        let events: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(events.as_array().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn employees_cannot_read_the_feed() {
        let harness = Harness::new();
        let app = test::init_service(App::new().configure(|cfg| harness.configure(cfg))).await;

        let req = test::TestRequest::get()
            .uri("/events")
            .insert_header(("Authorization", bearer(Role::Employee, Some(7))))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
    }
}
