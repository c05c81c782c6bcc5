use crate::auth::AuthState;
use crate::cli::ServeArgs;
use crate::infra::{seed_demo_school, AppState};
use crate::routes::with_clearance_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use school_clearance::clearance::{ClearanceService, InMemoryClearanceStore};
use school_clearance::config::AppConfig;
use school_clearance::error::AppError;
use school_clearance::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(InMemoryClearanceStore::new());
    let clearance_service = Arc::new(ClearanceService::with_lookup(
        store.clone(),
        config.clearance.lookup,
    ));
    if args.seed_demo {
        let school = seed_demo_school(&store, &clearance_service)?;
        info!(students = school.students.len(), "seeded demo school");
    }
    if !config.auth.is_configured() {
        warn!("ADMIN_EMAIL / ADMIN_PASSWORD unset; admin login is disabled");
    }

    let app = with_clearance_routes(clearance_service, AuthState::new(config.auth.clone()))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        lookup = ?config.clearance.lookup,
        %addr,
        "school clearance service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
