pub mod auth;
pub mod axum_http;
pub mod background_worker;
pub mod config;
pub mod usecases;

use std::{sync::Arc, time::Duration};

use anyhow::Result;
use crates::{
    ai::anthropic_client::AnthropicClient,
    domain::value_objects::subscriptions::PriceCatalog,
    infra::db::{
        postgres::postgres_connection,
        repositories::{applications::ApplicationPostgres, companies::CompanyPostgres},
    },
    payments::stripe_client::StripeClient,
    research::company_research_client::CompanyResearchClient,
    scraping::job_scraper::JobScraper,
};
use tracing::info;

use crate::{
    axum_http::http_serve::{self, AppContext},
    background_worker::enrichment_queue::{EnrichmentQueue, EnrichmentWorker},
    usecases::{company_research::CompanyResearchUseCase, interview_prep::InterviewPrepUseCase},
};

pub async fn run() -> Result<()> {
    let dotenvy_env = Arc::new(config::config_loader::load()?);
    info!(stage = %config::config_loader::get_stage(), "ENV has been loaded");

    let postgres_pool = Arc::new(postgres_connection::establish_connection(
        &dotenvy_env.database.url,
        dotenvy_env.database.pool_max_size,
    )?);
    info!("Postgres connection has been established");

    let ai = Arc::new(AnthropicClient::new(
        dotenvy_env.ai.api_key.clone(),
        dotenvy_env.ai.model.clone(),
        dotenvy_env.ai.base_url.clone(),
        dotenvy_env.ai.max_tokens,
    ));
    let scraper = Arc::new(JobScraper::new(Duration::from_secs(
        dotenvy_env.scraper.timeout_secs,
    ))?);
    let research_timeout = Duration::from_secs(dotenvy_env.research.timeout_secs);
    let research = Arc::new(CompanyResearchClient::new(
        &dotenvy_env.research.service_url,
        research_timeout,
    )?);
    let stripe = Arc::new(StripeClient::new(
        dotenvy_env.stripe.secret_key.clone(),
        dotenvy_env.stripe.webhook_secret.clone(),
        dotenvy_env.stripe.success_url.clone(),
        dotenvy_env.stripe.cancel_url.clone(),
    ));
    let price_catalog = PriceCatalog::new(
        dotenvy_env.stripe.price_premium_monthly.clone(),
        dotenvy_env.stripe.price_premium_yearly.clone(),
    );

    let application_repository = Arc::new(ApplicationPostgres::new(Arc::clone(&postgres_pool)));
    let company_repository = Arc::new(CompanyPostgres::new(Arc::clone(&postgres_pool)));
    let enrichment_worker = EnrichmentWorker::new(
        Arc::new(CompanyResearchUseCase::new(
            Arc::clone(&company_repository),
            Arc::clone(&application_repository),
            Arc::clone(&research),
            research_timeout,
        )),
        Arc::new(InterviewPrepUseCase::new(
            application_repository,
            company_repository,
            Arc::clone(&ai),
        )),
    );
    let enrichment = Arc::new(EnrichmentQueue::spawn(
        dotenvy_env.enrichment.queue_capacity,
        dotenvy_env.enrichment.max_concurrency,
        Arc::new(enrichment_worker),
    ));
    info!(
        queue_capacity = dotenvy_env.enrichment.queue_capacity,
        max_concurrency = dotenvy_env.enrichment.max_concurrency,
        "Enrichment worker has been started"
    );

    let ctx = AppContext {
        db_pool: postgres_pool,
        ai,
        scraper,
        research,
        stripe,
        enrichment,
        price_catalog,
        research_timeout,
    };

    http_serve::start(dotenvy_env, ctx).await
}
