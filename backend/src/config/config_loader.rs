use std::str::FromStr;

use anyhow::{Context, Result};
use crates::ai::anthropic_client::DEFAULT_MESSAGES_URL;

use super::config_model::{
    Ai, BackendServer, Database, DotEnvyConfig, Enrichment, Research, Scraper, Stripe, Supabase,
};
use super::stage::Stage;

fn required(key: &str) -> Result<String> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .with_context(|| format!("{key} is missing"))
}

fn required_parsed<T>(key: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    required(key)?
        .trim()
        .parse()
        .with_context(|| format!("{key} is invalid"))
}

fn optional_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} is invalid")),
        _ => Ok(default),
    }
}

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let backend_server = BackendServer {
        port: required_parsed("SERVER_PORT_BACKEND")?,
        body_limit: required_parsed("SERVER_BODY_LIMIT")?,
        timeout: required_parsed("SERVER_TIMEOUT")?,
    };

    let database = Database {
        url: required("DATABASE_URL")?,
        pool_max_size: optional_or("DATABASE_POOL_MAX_SIZE", 10)?,
    };

    let supabase = Supabase {
        jwt_secret: required("SUPABASE_JWT_SECRET")?,
    };

    let stripe = Stripe {
        secret_key: required("STRIPE_SECRET_KEY")?,
        webhook_secret: required("STRIPE_WEBHOOK_SECRET")?,
        success_url: required("STRIPE_SUCCESS_URL")?,
        cancel_url: required("STRIPE_CANCEL_URL")?,
        price_premium_monthly: required("STRIPE_PRICE_PREMIUM_MONTHLY")?,
        price_premium_yearly: required("STRIPE_PRICE_PREMIUM_YEARLY")?,
    };

    let ai = Ai {
        api_key: required("AI_API_KEY")?,
        model: optional_or("AI_MODEL", "claude-sonnet-4-5".to_string())?,
        base_url: optional_or("AI_BASE_URL", DEFAULT_MESSAGES_URL.to_string())?,
        max_tokens: optional_or("AI_MAX_TOKENS", 2048)?,
    };

    let research = Research {
        service_url: required("RESEARCH_SERVICE_URL")?,
        timeout_secs: optional_or("RESEARCH_TIMEOUT_SECS", 30)?,
    };

    let scraper = Scraper {
        timeout_secs: optional_or("SCRAPER_TIMEOUT_SECS", 30)?,
    };

    let enrichment = Enrichment {
        queue_capacity: optional_or("ENRICHMENT_QUEUE_CAPACITY", 256)?,
        max_concurrency: optional_or("ENRICHMENT_MAX_CONCURRENCY", 4)?,
    };

    Ok(DotEnvyConfig {
        backend_server,
        database,
        supabase,
        stripe,
        ai,
        research,
        scraper,
        enrichment,
    })
}

pub fn get_stage() -> Stage {
    dotenvy::dotenv().ok();

    let stage_str = std::env::var("STAGE").unwrap_or_default();
    Stage::try_from(&stage_str).unwrap_or_default()
}

/// The auth extractor only needs the JWT secret, not the full config.
pub fn get_supabase_jwt_secret() -> Result<String> {
    dotenvy::dotenv().ok();

    required("SUPABASE_JWT_SECRET")
}
