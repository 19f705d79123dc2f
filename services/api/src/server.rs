use crate::cli::ServeArgs;
use crate::infra::{catalog_source, load_service, AppState};
use crate::routes::with_obligation_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tenderforce::config::AppConfig;
use tenderforce::error::AppError;
use tenderforce::telemetry;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    args.catalog.apply(&mut config.catalog);

    telemetry::init(&config.telemetry)?;

    let source = catalog_source(&config.catalog);
    let service = Arc::new(load_service(&config.catalog, source.as_ref())?);

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        service: Arc::clone(&service),
        source,
    };

    let app = with_obligation_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        reload_policy = config.catalog.reload_policy.label(),
        baseline = config.catalog.baseline,
        "obligation service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
