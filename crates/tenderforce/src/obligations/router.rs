use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::json;

use super::domain::Obligation;
use super::service::{ObligationService, ServiceError};

/// HTTP endpoints over the resolution service.
pub fn obligation_router(service: Arc<ObligationService>) -> Router {
    Router::new()
        .route("/api/v1/cpv/:cpv/obligations", get(obligations_handler))
        .route("/api/v1/cpv/:cpv/summary", get(summary_handler))
        .route("/api/v1/cpv/:cpv/exists", get(exists_handler))
        .route("/api/v1/obligations/:obligation_id", get(obligation_handler))
        .with_state(service)
}

pub(crate) async fn obligations_handler(
    State(service): State<Arc<ObligationService>>,
    Path(cpv): Path<String>,
) -> Response {
    match service.obligations_by_cpv(&cpv) {
        Ok(obligations) => {
            let body: Vec<&Obligation> = obligations.iter().map(AsRef::as_ref).collect();
            (StatusCode::OK, axum::Json(body)).into_response()
        }
        Err(err) => unavailable(err),
    }
}

pub(crate) async fn summary_handler(
    State(service): State<Arc<ObligationService>>,
    Path(cpv): Path<String>,
) -> Response {
    match service.obligations_summary(&cpv) {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(err) => unavailable(err),
    }
}

pub(crate) async fn exists_handler(
    State(service): State<Arc<ObligationService>>,
    Path(cpv): Path<String>,
) -> Response {
    match service.has_obligations(&cpv) {
        Ok(has_obligations) => {
            let payload = json!({
                "cpv": cpv,
                "has_obligations": has_obligations,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(err) => unavailable(err),
    }
}

pub(crate) async fn obligation_handler(
    State(service): State<Arc<ObligationService>>,
    Path(obligation_id): Path<String>,
) -> Response {
    match service.obligation_by_id(&obligation_id) {
        Ok(Some(obligation)) => (StatusCode::OK, axum::Json(obligation.as_ref())).into_response(),
        Ok(None) => {
            let payload = json!({
                "error": "obligation not found",
                "obligation_id": obligation_id,
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(err) => unavailable(err),
    }
}

fn unavailable(err: ServiceError) -> Response {
    let payload = json!({
        "error": err.to_string(),
    });
    (StatusCode::SERVICE_UNAVAILABLE, axum::Json(payload)).into_response()
}
