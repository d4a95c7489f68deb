use daybreak_dashboard::{client::HttpDaybreakApi, controller::local_today, router, AppState, Config, PageSessions};
use std::{net::SocketAddr, sync::Arc};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env()?;
    let api = HttpDaybreakApi::new(&config)?;
    let pages = PageSessions::new(
        Arc::new(api),
        config.refetch_on_change,
        config.page_idle_timeout,
        Arc::new(local_today),
    );

    info!("daybreak summaries come from {}", config.api_root);
    if !config.refetch_on_change {
        warn!("range changes will not re-fetch; POST {} to reload", config.route("/api/daybreak/refresh"));
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let report_path = config.route("/report");
    let app = router(AppState::new(config, pages));

    info!("listening on http://{addr}{report_path}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
