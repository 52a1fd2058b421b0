#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web REST service for the crime browser.
//!
//! Exposes the reference catalog and incident queries under `/api`, plus
//! incident creation (`PUT /api/new-incident`) and removal
//! (`DELETE /api/remove-incident`). A single `DuckDB` connection behind a
//! `Mutex` serializes all store access. The frontend build is served from
//! the static directory at `/`.

pub mod config;
mod handlers;
pub mod interactive;

use std::sync::{Arc, Mutex};

use actix_cors::Cors;
use actix_files::Files;
use actix_web::error::InternalError;
use actix_web::{App, HttpResponse, HttpServer, middleware, web};
use crime_browser_database::db;
use crime_browser_server_models::ApiErrorBody;

pub use config::ServerConfig;

/// Shared application state.
pub struct AppState {
    /// `DuckDB` connection. `duckdb::Connection` is `Send` but not `Sync`,
    /// so a `Mutex` is needed.
    pub db: Arc<Mutex<duckdb::Connection>>,
}

impl AppState {
    /// Wraps an open connection.
    #[must_use]
    pub fn new(conn: duckdb::Connection) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
        }
    }
}

fn bad_request(message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiErrorBody { error: message })
}

/// Registers the `/api` routes and extractor error handlers.
///
/// Malformed JSON bodies and query strings are answered with a 400 and an
/// `{"error": ...}` body like every other failure.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        let response = bad_request(err.to_string());
        InternalError::from_response(err, response).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        let response = bad_request(err.to_string());
        InternalError::from_response(err, response).into()
    }))
    .service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/codes", web::get().to(handlers::codes))
            .route("/neighborhoods", web::get().to(handlers::neighborhoods))
            .route("/incidents", web::get().to(handlers::incidents))
            .route("/new-incident", web::put().to(handlers::new_incident))
            .route("/remove-incident", web::delete().to(handlers::remove_incident)),
    );
}

/// Starts the crime browser API server.
///
/// Opens (creating and seeding if needed) the database at
/// `config.database_path`, then serves until shut down. The caller owns
/// logger setup and the async runtime (e.g. `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the database cannot be opened,
/// or the HTTP server fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> std::io::Result<()> {
    log::info!("Opening database at {}...", config.database_path.display());
    let conn = db::open(&config.database_path).map_err(std::io::Error::other)?;
    let state = web::Data::new(AppState::new(conn));

    let static_dir = config.static_dir.clone();
    if !static_dir.is_dir() {
        log::warn!(
            "Static directory {} does not exist; only /api will be served",
            static_dir.display()
        );
    }

    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure_api)
            // Serve frontend static files (production)
            .service(Files::new("/", static_dir.clone()).index_file("index.html"))
    })
    .bind((config.bind_addr, config.port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test;
    use crime_browser_incident_models::{IncidentCode, IncidentRecord, IncidentSubmission};
    use crime_browser_server_models::{ApiHealth, ApiMutation};
    use serde_json::json;

    use super::*;

    fn state() -> web::Data<AppState> {
        web::Data::new(AppState::new(db::open_in_memory().unwrap()))
    }

    fn submission(case_number: &str, date: &str, neighborhood: i32) -> IncidentSubmission {
        IncidentSubmission {
            case_number: Some(case_number.to_string()),
            date: Some(date.to_string()),
            time: Some("12:30:00".to_string()),
            code: Some(600),
            incident: Some("Theft".to_string()),
            police_grid: Some(87),
            neighborhood_number: Some(neighborhood),
            block: Some("17XX GRAND AV".to_string()),
        }
    }

    macro_rules! app {
        ($state:expr) => {
            test::init_service(App::new().app_data($state.clone()).configure(configure_api)).await
        };
    }

    #[actix_web::test]
    async fn health_reports_version() {
        let state = state();
        let app = app!(state);
        let req = test::TestRequest::get().uri("/api/health").to_request();
        let health: ApiHealth = test::call_and_read_body_json(&app, req).await;
        assert!(health.healthy);
        assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
    }

    #[actix_web::test]
    async fn codes_filter_by_list() {
        let state = state();
        let app = app!(state);

        let req = test::TestRequest::get()
            .uri("/api/codes?code=600,110")
            .to_request();
        let codes: Vec<IncidentCode> = test::call_and_read_body_json(&app, req).await;
        let got: Vec<i32> = codes.iter().map(|c| c.code).collect();
        assert_eq!(got, vec![110, 600]);

        let req = test::TestRequest::get().uri("/api/codes").to_request();
        let all: Vec<IncidentCode> = test::call_and_read_body_json(&app, req).await;
        assert!(all.len() > 2);
    }

    #[actix_web::test]
    async fn malformed_list_is_a_bad_request() {
        let state = state();
        let app = app!(state);
        let req = test::TestRequest::get()
            .uri("/api/neighborhoods?id=11,abc")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("abc"));
    }

    #[actix_web::test]
    async fn create_query_delete_round_trip() {
        let state = state();
        let app = app!(state);

        for (case, date, nbhd) in [
            ("23000001", "2023-01-05", 11),
            ("23000002", "2023-01-20", 14),
            ("23000003", "2023-02-02", 14),
            ("23000004", "2023-01-10", 5),
        ] {
            let req = test::TestRequest::put()
                .uri("/api/new-incident")
                .set_json(submission(case, date, nbhd))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::CREATED, "creating {case}");
        }

        let req = test::TestRequest::get()
            .uri("/api/incidents?start_date=2023-01-01&end_date=2023-01-31&neighborhood=11,14")
            .to_request();
        let rows: Vec<IncidentRecord> = test::call_and_read_body_json(&app, req).await;
        let cases: Vec<&str> = rows.iter().map(|r| r.case_number.as_str()).collect();
        assert_eq!(cases, vec!["23000002", "23000001"]);

        let req = test::TestRequest::delete()
            .uri("/api/remove-incident")
            .set_json(json!({ "case_number": "23000002" }))
            .to_request();
        let removed: ApiMutation = test::call_and_read_body_json(&app, req).await;
        assert_eq!(removed.case_number, "23000002");

        let req = test::TestRequest::get()
            .uri("/api/incidents?neighborhood=14&limit=abc")
            .to_request();
        let rows: Vec<IncidentRecord> = test::call_and_read_body_json(&app, req).await;
        let cases: Vec<&str> = rows.iter().map(|r| r.case_number.as_str()).collect();
        assert_eq!(cases, vec!["23000003"]);
    }

    #[actix_web::test]
    async fn duplicate_create_is_a_conflict() {
        let state = state();
        let app = app!(state);

        let first = test::TestRequest::put()
            .uri("/api/new-incident")
            .set_json(submission("23000010", "2023-01-05", 11))
            .to_request();
        assert_eq!(test::call_service(&app, first).await.status(), StatusCode::CREATED);

        let mut changed = submission("23000010", "2023-03-01", 14);
        changed.incident = Some("Burglary".to_string());
        let second = test::TestRequest::put()
            .uri("/api/new-incident")
            .set_json(changed)
            .to_request();
        assert_eq!(test::call_service(&app, second).await.status(), StatusCode::CONFLICT);

        let req = test::TestRequest::get().uri("/api/incidents").to_request();
        let rows: Vec<IncidentRecord> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].incident, "Theft");
    }

    #[actix_web::test]
    async fn missing_field_is_rejected_without_insert() {
        let state = state();
        let app = app!(state);

        let mut incomplete = submission("23000020", "2023-01-05", 11);
        incomplete.block = Some(String::new());
        let req = test::TestRequest::put()
            .uri("/api/new-incident")
            .set_json(incomplete)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("block"));

        let req = test::TestRequest::get().uri("/api/incidents").to_request();
        let rows: Vec<IncidentRecord> = test::call_and_read_body_json(&app, req).await;
        assert!(rows.is_empty());
    }

    #[actix_web::test]
    async fn removing_unknown_case_is_not_found() {
        let state = state();
        let app = app!(state);

        let req = test::TestRequest::delete()
            .uri("/api/remove-incident")
            .set_json(json!({ "case_number": "nope" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::delete()
            .uri("/api/remove-incident")
            .set_json(json!({}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn malformed_json_gets_error_body() {
        let state = state();
        let app = app!(state);

        let req = test::TestRequest::put()
            .uri("/api/new-incident")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body["error"].is_string());
    }
}
