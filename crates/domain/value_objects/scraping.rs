use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct ScrapeRequest {
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ScrapedJob {
    pub job_title: String,
    pub company_name: String,
    pub location: String,
    pub description: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScrapedJob {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }

    /// A scrape that found neither a title nor a description is reported as a
    /// failure so the client falls back to manual entry.
    pub fn from_fields(
        job_title: String,
        company_name: String,
        location: String,
        description: String,
    ) -> Self {
        if job_title.is_empty() && description.is_empty() {
            return Self::failed("could not extract job details from the page");
        }
        Self {
            job_title,
            company_name,
            location,
            description,
            success: true,
            error: None,
        }
    }
}
