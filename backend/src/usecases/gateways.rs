use anyhow::Result as AnyResult;
use async_trait::async_trait;
use crates::{
    ai::{anthropic_client::AnthropicClient, prompts::JSON_ONLY_SYSTEM},
    domain::value_objects::{companies::CompanyResearchData, scraping::ScrapedJob},
    research::company_research_client::CompanyResearchClient,
    scraping::job_scraper::JobScraper,
};

/// Prompt in, raw model text out. Callers own the JSON contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerativeAiGateway: Send + Sync {
    async fn complete_json(&self, prompt: String) -> AnyResult<String>;
}

#[async_trait]
impl GenerativeAiGateway for AnthropicClient {
    async fn complete_json(&self, prompt: String) -> AnyResult<String> {
        self.complete(Some(JSON_ONLY_SYSTEM), &prompt).await
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobScraperGateway: Send + Sync {
    async fn scrape(&self, url: String) -> ScrapedJob;
}

#[async_trait]
impl JobScraperGateway for JobScraper {
    async fn scrape(&self, url: String) -> ScrapedJob {
        JobScraper::scrape(self, &url).await
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompanyResearchGateway: Send + Sync {
    async fn research(
        &self,
        company_name: String,
        website: Option<String>,
    ) -> AnyResult<CompanyResearchData>;
}

#[async_trait]
impl CompanyResearchGateway for CompanyResearchClient {
    async fn research(
        &self,
        company_name: String,
        website: Option<String>,
    ) -> AnyResult<CompanyResearchData> {
        CompanyResearchClient::research(self, &company_name, website.as_deref()).await
    }
}
