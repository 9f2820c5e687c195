use crate::cli::ServeArgs;
use crate::infra::{build_register, seed_demo_owners, AppState};
use crate::routes::with_service_routes;
use crate::scheduler::spawn_recount_scheduler;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use property_register::config::AppConfig;
use property_register::error::AppError;
use property_register::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if args.seed_demo {
        config.register.seed_demo = true;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let (register, channel) = build_register(&config.register);
    if config.register.seed_demo {
        let seeded = seed_demo_owners(&register)?;
        info!(owners = seeded.len(), "demo owners seeded");
    }

    let shutdown = CancellationToken::new();
    let scheduler = config.register.recount_interval.map(|period| {
        info!(period_secs = period.as_secs(), "debt recount scheduler enabled");
        spawn_recount_scheduler(Arc::clone(&register), period, shutdown.clone())
    });

    let app = with_service_routes(register)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, topic = %config.register.email_topic, "property register ready");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await?;

    readiness_flag.store(false, Ordering::Release);
    shutdown.cancel();
    if let Some(handle) = scheduler {
        if let Err(error) = handle.await {
            warn!(%error, "debt recount scheduler did not stop cleanly");
        }
    }
    info!(
        retained_events = channel.messages().len(),
        "property register stopped"
    );
    Ok(())
}

async fn shutdown_signal(shutdown: CancellationToken) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(error) = result {
                warn!(%error, "unable to listen for shutdown signal");
                shutdown.cancelled().await;
                return;
            }
            info!("shutdown signal received");
        }
        _ = shutdown.cancelled() => {}
    }
    shutdown.cancel();
}
