//! HTTP handler functions for the crime browser API.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use crime_browser_database::{DbError, catalog, queries};
use crime_browser_incident_models::{IncidentSubmission, ValidationError};
use crime_browser_server_models::{
    ApiErrorBody, ApiHealth, ApiMutation, CodesQueryParams, DeleteIncidentRequest,
    IncidentQueryParams, NeighborhoodsQueryParams,
};

use crate::AppState;

/// Maps a [`DbError`] to its HTTP status with a `{"error": ...}` body.
///
/// Store failures are reported with `context` only; the underlying error
/// is logged.
fn error_response(context: &str, e: &DbError) -> HttpResponse {
    let status = match e {
        DbError::Validation(_) => StatusCode::BAD_REQUEST,
        DbError::NotFound { .. } => StatusCode::NOT_FOUND,
        DbError::DuplicateKey { .. } => StatusCode::CONFLICT,
        _ => {
            log::error!("{context}: {e}");
            return HttpResponse::InternalServerError().json(ApiErrorBody {
                error: context.to_string(),
            });
        }
    };

    log::warn!("{context}: {e}");
    HttpResponse::build(status).json(ApiErrorBody {
        error: e.to_string(),
    })
}

fn validation_response(context: &str, e: ValidationError) -> HttpResponse {
    error_response(context, &DbError::Validation(e))
}

/// Runs `f` with the shared connection locked.
fn with_conn<T>(
    state: &AppState,
    f: impl FnOnce(&duckdb::Connection) -> Result<T, DbError>,
) -> Result<T, DbError> {
    let conn = state.db.lock().map_err(|_| DbError::Conversion {
        message: "database mutex poisoned".to_string(),
    })?;
    f(&conn)
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/codes?code=110,600`
///
/// Lists incident codes ascending. Without `code`, returns all of them.
pub async fn codes(
    state: web::Data<AppState>,
    params: web::Query<CodesQueryParams>,
) -> HttpResponse {
    let filter = match params.codes() {
        Ok(filter) => filter,
        Err(e) => return validation_response("Invalid code filter", e),
    };

    match with_conn(&state, |conn| catalog::list_codes(conn, &filter)) {
        Ok(codes) => HttpResponse::Ok().json(codes),
        Err(e) => error_response("Failed to list codes", &e),
    }
}

/// `GET /api/neighborhoods?id=11,14`
///
/// Lists neighborhoods ascending. Without `id`, returns all of them.
pub async fn neighborhoods(
    state: web::Data<AppState>,
    params: web::Query<NeighborhoodsQueryParams>,
) -> HttpResponse {
    let filter = match params.ids() {
        Ok(filter) => filter,
        Err(e) => return validation_response("Invalid neighborhood filter", e),
    };

    match with_conn(&state, |conn| catalog::list_neighborhoods(conn, &filter)) {
        Ok(neighborhoods) => HttpResponse::Ok().json(neighborhoods),
        Err(e) => error_response("Failed to list neighborhoods", &e),
    }
}

/// `GET /api/incidents`
///
/// Filters by `start_date`, `end_date`, `code`, `grid`, `neighborhood`,
/// and `limit`; returns the newest matching records first.
pub async fn incidents(
    state: web::Data<AppState>,
    params: web::Query<IncidentQueryParams>,
) -> HttpResponse {
    let query = match params.to_query() {
        Ok(query) => query,
        Err(e) => return validation_response("Invalid incident query", e),
    };

    match with_conn(&state, |conn| queries::fetch_incidents(conn, &query)) {
        Ok(rows) => HttpResponse::Ok().json(rows),
        Err(e) => error_response("Failed to query incidents", &e),
    }
}

/// `PUT /api/new-incident`
///
/// Creates an incident. Every field is required.
pub async fn new_incident(
    state: web::Data<AppState>,
    body: web::Json<IncidentSubmission>,
) -> HttpResponse {
    match with_conn(&state, |conn| queries::create_incident(conn, &body)) {
        Ok(record) => {
            log::debug!("PUT new-incident {}", record.case_number);
            HttpResponse::Created().json(ApiMutation {
                case_number: record.case_number,
            })
        }
        Err(e) => error_response("Failed to create incident", &e),
    }
}

/// `DELETE /api/remove-incident`
///
/// Removes the incident named by `case_number` in the JSON body.
pub async fn remove_incident(
    state: web::Data<AppState>,
    body: web::Json<DeleteIncidentRequest>,
) -> HttpResponse {
    let case_number = body.case_number.clone().unwrap_or_default();

    match with_conn(&state, |conn| queries::delete_incident(conn, &case_number)) {
        Ok(()) => {
            log::debug!("DELETE remove-incident {case_number}");
            HttpResponse::Ok().json(ApiMutation { case_number })
        }
        Err(e) => error_response("Failed to remove incident", &e),
    }
}
