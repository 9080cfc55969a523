use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Result;
use axum::{
    Router,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::get,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

use super::{default_routers, routers};
use crate::{
    config::config_model::DotEnvyConfig, domain::clock::Clock,
    infrastructure::in_memory::InMemoryDatabase,
};

pub fn build_router(
    config: &DotEnvyConfig,
    db: Arc<InMemoryDatabase>,
    clock: Arc<dyn Clock>,
) -> Result<Router> {
    let app = Router::new()
        .fallback(default_routers::not_found)
        .nest(
            "/api/v1/plans",
            routers::plans::routes(Arc::clone(&db), Arc::clone(&clock)),
        )
        .nest(
            "/api/v1/subscriptions",
            routers::subscriptions::routes(Arc::clone(&db), Arc::clone(&clock)),
        )
        .nest(
            "/api/v1/migrations",
            routers::migrations::routes(Arc::clone(&db), Arc::clone(&clock)),
        )
        .nest(
            "/api/v1/quotas",
            routers::quotas::routes(Arc::clone(&db), Arc::clone(&clock)),
        )
        .nest(
            "/api/v1/features",
            routers::features::routes(Arc::clone(&db), Arc::clone(&clock)),
        )
        .nest(
            "/api/v1/tenants",
            routers::features::tenant_routes(Arc::clone(&db), Arc::clone(&clock)),
        )
        .nest(
            "/api/v1/transactions",
            routers::transactions::routes(Arc::clone(&db), clock),
        )
        .route("/api/v1/health-check", get(default_routers::health_check))
        .layer(TimeoutLayer::new(Duration::from_secs(config.server.timeout)))
        .layer(RequestBodyLimitLayer::new(
            (config.server.body_limit * 1024 * 1024).try_into()?,
        ))
        .layer(
            CorsLayer::new()
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PATCH,
                    Method::PUT,
                    Method::DELETE,
                ])
                .allow_headers([AUTHORIZATION, CONTENT_TYPE])
                .allow_origin(Any),
        )
        .layer(TraceLayer::new_for_http());

    Ok(app)
}

pub async fn start(
    config: Arc<DotEnvyConfig>,
    db: Arc<InMemoryDatabase>,
    clock: Arc<dyn Clock>,
) -> Result<()> {
    let app = build_router(&config, db, clock)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = TcpListener::bind(addr).await?;

    info!("Server is running on port {}", config.server.port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install CTRL+C signal handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received ctrl+C signal"),
        _ = terminate => info!("Received terminate signal"),
    }
}
