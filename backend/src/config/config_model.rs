#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub backend_server: BackendServer,
    pub database: Database,
    pub supabase: Supabase,
    pub stripe: Stripe,
    pub ai: Ai,
    pub research: Research,
    pub scraper: Scraper,
    pub enrichment: Enrichment,
}

#[derive(Debug, Clone)]
pub struct BackendServer {
    pub port: u16,
    /// MiB
    pub body_limit: u64,
    /// Seconds
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
    pub pool_max_size: u32,
}

#[derive(Debug, Clone)]
pub struct Supabase {
    pub jwt_secret: String,
}

#[derive(Debug, Clone)]
pub struct Stripe {
    pub secret_key: String,
    pub webhook_secret: String,
    pub success_url: String,
    pub cancel_url: String,
    pub price_premium_monthly: String,
    pub price_premium_yearly: String,
}

#[derive(Debug, Clone)]
pub struct Ai {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub max_tokens: u32,
}

#[derive(Debug, Clone)]
pub struct Research {
    pub service_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct Scraper {
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct Enrichment {
    pub queue_capacity: usize,
    pub max_concurrency: usize,
}
