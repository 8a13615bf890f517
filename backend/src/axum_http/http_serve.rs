use crate::{
    axum_http::{default_routers, routers},
    background_worker::enrichment_queue::EnrichmentQueue,
    config::config_model::DotEnvyConfig,
};
use anyhow::Result;
use axum::{
    Router,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::get,
};
use crates::{
    ai::anthropic_client::AnthropicClient,
    domain::value_objects::subscriptions::PriceCatalog,
    infra::db::postgres::postgres_connection::PgPoolSquad,
    payments::stripe_client::StripeClient, research::company_research_client::CompanyResearchClient,
    scraping::job_scraper::JobScraper,
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

/// Long-lived clients shared by every router.
#[derive(Clone)]
pub struct AppContext {
    pub db_pool: Arc<PgPoolSquad>,
    pub ai: Arc<AnthropicClient>,
    pub scraper: Arc<JobScraper>,
    pub research: Arc<CompanyResearchClient>,
    pub stripe: Arc<StripeClient>,
    pub enrichment: Arc<EnrichmentQueue>,
    pub price_catalog: PriceCatalog,
    pub research_timeout: Duration,
}

pub fn build_router(config: &DotEnvyConfig, ctx: &AppContext) -> Result<Router> {
    let api = Router::new()
        .nest("/applications", routers::applications::routes(ctx))
        .nest("/companies", routers::companies::routes(ctx))
        .nest("/profile", routers::profile::routes(ctx))
        .nest("/subscriptions", routers::subscriptions::routes(ctx))
        .nest("/webhooks", routers::stripe_webhook::routes(ctx))
        .route("/health-check", get(default_routers::health_check));

    let app = Router::new()
        .fallback(default_routers::not_found)
        .nest("/api/v1", api)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.backend_server.timeout,
        )))
        .layer(RequestBodyLimitLayer::new(
            (config.backend_server.body_limit * 1024 * 1024).try_into()?,
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

pub async fn start(config: Arc<DotEnvyConfig>, ctx: AppContext) -> Result<()> {
    let app = build_router(&config, &ctx)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.backend_server.port));
    let listener = TcpListener::bind(addr).await?;

    info!(port = config.backend_server.port, "http: server is running");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "http: failed to install CTRL+C handler");
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
                tracing::error!(error = %err, "http: failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("http: received ctrl+C signal"),
        _ = terminate => info!("http: received terminate signal"),
    }
}
