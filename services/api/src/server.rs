use crate::cli::ServeArgs;
use crate::infra::{
    default_eligibility_config, seed_demo_directory, AppState, ConsoleMailer, InMemoryRecordStore,
};
use crate::routes::with_coop_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use coop_portal::config::AppConfig;
use coop_portal::error::AppError;
use coop_portal::telemetry;
use coop_portal::workflows::coop::CoopProgramService;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

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

    let store = Arc::new(InMemoryRecordStore::default());
    seed_demo_directory(&store);
    let mailer = Arc::new(ConsoleMailer);
    let coop_service = Arc::new(CoopProgramService::new(
        store,
        mailer,
        default_eligibility_config(),
    ));

    let app = with_coop_routes(coop_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "co-op portal workflow engine ready");

    axum::serve(listener, app).await?;
    Ok(())
}
