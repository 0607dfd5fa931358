use crate::{
    api::{advance, attendance, events, payroll},
    auth::middleware::auth_middleware,
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

// Helper to build per-route limiter
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .expect("limiter period and burst are non-zero");
    Governor::new(&cfg)
}

/// Ledger and payroll routes, relative to the API prefix.
pub fn api_routes(cfg: &mut web::ServiceConfig) {
    api_routes_with(cfg, None);
}

fn api_routes_with(
    cfg: &mut web::ServiceConfig,
    punch_limiter: Option<Arc<Governor<PeerIpKeyExtractor, NoOpMiddleware>>>,
) {
    let mut attendance_scope = web::scope("/attendance")
        // /attendance
        .service(
            web::resource("")
                .route(web::post().to(attendance::record_attendance))
                .route(web::get().to(attendance::list_by_date)),
        )
        // /attendance/employee/{employee_id}
        .service(
            web::resource("/employee/{employee_id}")
                .route(web::get().to(attendance::list_for_employee)),
        );

    // check-in/out are the hot path for devices, limited separately
    attendance_scope = match punch_limiter {
        Some(limiter) => attendance_scope
            .service(
                web::resource("/check-in")
                    .wrap(limiter.clone())
                    .route(web::post().to(attendance::check_in)),
            )
            .service(
                web::resource("/check-out")
                    .wrap(limiter)
                    .route(web::put().to(attendance::check_out)),
            ),
        None => attendance_scope
            .service(web::resource("/check-in").route(web::post().to(attendance::check_in)))
            .service(web::resource("/check-out").route(web::put().to(attendance::check_out))),
    };

    cfg.service(attendance_scope)
        .service(
            web::scope("/advance")
                // /advance
                .service(web::resource("").route(web::post().to(advance::create_advance)))
                // /advance/employee/{employee_id}
                .service(
                    web::resource("/employee/{employee_id}")
                        .route(web::get().to(advance::list_for_employee)),
                ),
        )
        .service(
            web::scope("/payroll")
                .service(web::resource("/report").route(web::get().to(payroll::get_report)))
                // /payroll/slip is the caller's own slip
                .service(web::resource("/slip").route(web::get().to(payroll::get_own_slip)))
                .service(
                    web::resource("/slip/{employee_id}").route(web::get().to(payroll::get_slip)),
                ),
        )
        .service(web::resource("/events").route(web::get().to(events::recent_events)));
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));
    let punch_limiter = Arc::new(build_limiter(config.rate_attendance_per_min));

    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .configure(|cfg| api_routes_with(cfg, Some(punch_limiter))),
    );
}
