use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Extension;
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use tenderforce::obligations::{obligation_router, ObligationService};

pub(crate) fn with_obligation_routes(service: Arc<ObligationService>) -> axum::Router {
    obligation_router(service)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/catalog", get(catalog_status_endpoint))
        .route("/api/v1/catalog/reload", post(catalog_reload_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    if state.is_ready() {
        return (StatusCode::OK, Json(json!({ "status": "ready" })));
    }

    let status = if state.service.is_ready() {
        "initializing"
    } else {
        "catalog_unavailable"
    };
    (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "status": status })))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn catalog_status_endpoint(
    Extension(state): Extension<AppState>,
) -> impl IntoResponse {
    Json(state.service.status())
}

pub(crate) async fn catalog_reload_endpoint(
    Extension(state): Extension<AppState>,
) -> impl IntoResponse {
    let service = Arc::clone(&state.service);
    let source = Arc::clone(&state.source);
    let outcome = tokio::task::spawn_blocking(move || service.reload(source.as_ref())).await;

    match outcome {
        Ok(Ok(_)) => (StatusCode::OK, Json(json!(state.service.status()))),
        Ok(Err(err)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": err.to_string(),
                "policy": state.service.policy().label(),
                "catalog": state.service.status(),
            })),
        ),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": err.to_string() })),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use serde_json::Value;
    use std::sync::atomic::AtomicBool;
    use tenderforce::obligations::{
        BaselinePolicy, BundledSource, CatalogData, CatalogError, CatalogSource, ReloadPolicy,
    };
    use tower::ServiceExt;

    struct BrokenSource;

    impl CatalogSource for BrokenSource {
        fn describe(&self) -> String {
            "broken".to_string()
        }

        fn load(&self) -> Result<CatalogData, CatalogError> {
            Err(CatalogError::NoObligations {
                path: "broken/obligations".into(),
            })
        }
    }

    fn state(policy: ReloadPolicy, source: Arc<dyn CatalogSource>, ready: bool) -> AppState {
        let service = ObligationService::load(&BundledSource, BaselinePolicy::disabled(), policy)
            .expect("bundled catalog loads");
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
            service: Arc::new(service),
            source,
        }
    }

    fn app(state: AppState) -> axum::Router {
        with_obligation_routes(Arc::clone(&state.service)).layer(Extension(state))
    }

    async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.expect("router responds");
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), 256 * 1024)
            .await
            .expect("read body");
        (status, serde_json::from_slice(&body).expect("json payload"))
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).expect("request builds")
    }

    fn post_request(uri: &str) -> Request<Body> {
        Request::post(uri).body(Body::empty()).expect("request builds")
    }

    #[tokio::test]
    async fn lookup_routes_serve_bundled_data() {
        let app = app(state(ReloadPolicy::KeepLastGood, Arc::new(BundledSource), true));

        let (status, body) = send(app.clone(), get_request("/api/v1/cpv/45000000-7/summary")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["obligationIds"], json!(["buildings"]));
        assert_eq!(body["hasEED"], json!(true));

        let (status, body) = send(app, get_request("/api/v1/obligations/buildings")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["obligation_id"], "buildings");
    }

    #[tokio::test]
    async fn readiness_waits_for_the_listener() {
        let app = app(state(ReloadPolicy::KeepLastGood, Arc::new(BundledSource), false));
        let (status, body) = send(app, get_request("/ready")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "initializing");
    }

    #[tokio::test]
    async fn failed_reload_keeps_serving_under_keep_last_good() {
        let app = app(state(ReloadPolicy::KeepLastGood, Arc::new(BrokenSource), true));

        let (status, body) = send(app.clone(), post_request("/api/v1/catalog/reload")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["policy"], "keep-last-good");
        assert_eq!(body["catalog"]["status"], "ready");

        let (status, _) = send(app.clone(), get_request("/ready")).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(app, get_request("/api/v1/cpv/34350000-5/obligations")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn failed_reload_closes_the_catalog_under_fail_closed() {
        let app = app(state(ReloadPolicy::FailClosed, Arc::new(BrokenSource), true));

        let (status, body) = send(app.clone(), post_request("/api/v1/catalog/reload")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["catalog"]["status"], "closed");

        let (status, body) = send(app.clone(), get_request("/ready")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "catalog_unavailable");

        let (status, _) = send(app.clone(), get_request("/api/v1/cpv/34350000-5/summary")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let (status, body) = send(app, get_request("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn catalog_status_reports_the_origin() {
        let app = app(state(ReloadPolicy::KeepLastGood, Arc::new(BundledSource), true));
        let (status, body) = send(app, get_request("/api/v1/catalog")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ready");
        assert_eq!(body["origin"], "bundled");
        assert_eq!(body["obligations"], 21);
    }
}
