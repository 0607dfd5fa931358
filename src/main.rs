use std::sync::Arc;

use actix_web::middleware::{Logger, NormalizePath};
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};

mod api;
mod auth;
mod config;
mod db;
mod docs;
mod error;
mod model;
mod models;
mod routes;
mod service;
mod store;
mod utils;

use config::Config;
use db::init_db;

use crate::docs::ApiDoc;
use crate::service::advance_ledger::AdvanceLedger;
use crate::service::attendance_ledger::AttendanceLedger;
use crate::service::report::PayrollReportAggregator;
use crate::store::mysql::MySqlStore;
use crate::utils::event_feed::EventFeed;
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi; // needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Payroll service"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!(addr = %config.server_addr, "Server starting...");

    let pool = init_db(&config.database_url).await?;
    let store = Arc::new(MySqlStore::new(pool));
    let feed = Arc::new(EventFeed::new(
        config.event_feed_capacity,
        config.event_feed_ttl,
    ));

    let attendance = Data::new(AttendanceLedger::new(store.clone(), feed.clone()));
    let advances = Data::new(AdvanceLedger::new(store.clone(), feed.clone()));
    let payroll = Data::new(PayrollReportAggregator::new(
        store.clone(),
        store.clone(),
        store,
        feed.clone(),
        config.payroll_workers,
    ));
    let feed = Data::from(feed);

    info!(
        workers = config.payroll_workers,
        prefix = %config.api_prefix,
        "Services ready"
    );

    let server_addr = config.server_addr.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(config.clone()))
            .app_data(attendance.clone())
            .app_data(advances.clone())
            .app_data(payroll.clone())
            .app_data(feed.clone())
            .service(index)
            // Authenticated, rate limited API
            .configure(|cfg| routes::configure(cfg, &config))
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}
