use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use tracing::warn;
use url::Url;

use crate::domain::value_objects::companies::CompanyResearchData;

#[derive(Debug, Deserialize)]
struct ResearchEnvelope {
    success: Option<bool>,
    data: Option<CompanyResearchData>,
    error: Option<String>,
}

/// Client for the external company-research service.
pub struct CompanyResearchClient {
    http: reqwest::Client,
    base_url: Url,
}

impl CompanyResearchClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url).context("invalid research service url")?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build research http client")?;

        Ok(Self { http, base_url })
    }

    pub fn request_url(&self, company_name: &str, website: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("company", company_name);
            if let Some(website) = website.filter(|w| !w.trim().is_empty()) {
                query.append_pair("website", website);
            }
        }
        url
    }

    pub async fn research(
        &self,
        company_name: &str,
        website: Option<&str>,
    ) -> Result<CompanyResearchData> {
        let url = self.request_url(company_name, website);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .context("research request failed")?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), company = company_name, "research: non-success status");
            return Err(anyhow!("research service returned {status}"));
        }

        let body = response.text().await.context("failed to read research body")?;
        parse_envelope(&body)
    }
}

fn parse_envelope(body: &str) -> Result<CompanyResearchData> {
    let envelope: ResearchEnvelope =
        serde_json::from_str(body).context("research response is not valid JSON")?;

    match (envelope.success, envelope.data) {
        (Some(true), Some(data)) => Ok(data),
        (Some(false), _) => Err(anyhow!(
            "research service reported failure: {}",
            envelope.error.unwrap_or_else(|| "no detail".to_string())
        )),
        (None, _) => Err(anyhow!("research response is missing `success`")),
        (Some(true), None) => Err(anyhow!("research response is missing `data`")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_query_with_optional_website() {
        let client =
            CompanyResearchClient::new("https://research.test/api/company", Duration::from_secs(1))
                .unwrap();

        assert_eq!(
            client.request_url("Acme & Co", None).as_str(),
            "https://research.test/api/company?company=Acme+%26+Co"
        );
        assert_eq!(
            client
                .request_url("Acme", Some("https://acme.test"))
                .query(),
            Some("company=Acme&website=https%3A%2F%2Facme.test")
        );
    }

    #[test]
    fn envelope_requires_success_and_data() {
        assert!(parse_envelope(r#"{"success": true, "data": {"name": "Acme"}}"#).is_ok());
        assert!(
            parse_envelope(r#"{"success": true, "data": {"name": "Acme", "pros": null, "cons": null}}"#)
                .is_ok()
        );
        assert!(parse_envelope(r#"{"success": false, "error": "blocked"}"#).is_err());
        assert!(parse_envelope(r#"{"data": {"name": "Acme"}}"#).is_err());
        assert!(parse_envelope(r#"{"success": true}"#).is_err());
        assert!(parse_envelope("not json").is_err());
    }
}
