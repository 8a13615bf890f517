use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use scraper::{Html, Selector};
use tracing::{info, warn};
use url::Url;

use crate::domain::value_objects::scraping::ScrapedJob;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

const MAX_DESCRIPTION_CHARS: usize = 20_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobSite {
    LinkedIn,
    Indeed,
    Glassdoor,
    Generic,
}

impl JobSite {
    pub fn detect(url: &Url) -> Self {
        let host = url.host_str().unwrap_or_default().to_ascii_lowercase();

        if host.contains("linkedin.") {
            JobSite::LinkedIn
        } else if host.contains("indeed.") {
            JobSite::Indeed
        } else if host.contains("glassdoor.") {
            JobSite::Glassdoor
        } else {
            JobSite::Generic
        }
    }
}

struct SiteSelectors {
    title: &'static [&'static str],
    company: &'static [&'static str],
    location: &'static [&'static str],
    description: &'static [&'static str],
}

const LINKEDIN: SiteSelectors = SiteSelectors {
    title: &["h1.top-card-layout__title", "h1.topcard__title", "h1"],
    company: &[
        "a.topcard__org-name-link",
        ".topcard__org-name-link",
        ".top-card-layout__second-subline a",
    ],
    location: &[".topcard__flavor--bullet", ".top-card-layout__second-subline .topcard__flavor--bullet"],
    description: &[".show-more-less-html__markup", ".description__text"],
};

const INDEED: SiteSelectors = SiteSelectors {
    title: &[
        "[data-testid=\"jobsearch-JobInfoHeader-title\"]",
        "h1.jobsearch-JobInfoHeader-title",
        "h1",
    ],
    company: &[
        "[data-testid=\"inlineHeader-companyName\"]",
        "[data-company-name]",
        ".jobsearch-CompanyInfoContainer a",
    ],
    location: &[
        "[data-testid=\"inlineHeader-companyLocation\"]",
        "[data-testid=\"job-location\"]",
    ],
    description: &["#jobDescriptionText", ".jobsearch-jobDescriptionText"],
};

const GLASSDOOR: SiteSelectors = SiteSelectors {
    title: &["[data-test=\"job-title\"]", "h1"],
    company: &["[data-test=\"employer-name\"]", "[data-test=\"employerName\"]"],
    location: &["[data-test=\"location\"]", "[data-test=\"emp-location\"]"],
    description: &[
        ".jobDescriptionContent",
        "[class*=\"JobDetails_jobDescription\"]",
        "#JobDescriptionContainer",
    ],
};

/// Fetches job postings over plain HTTP. No JavaScript rendering.
pub struct JobScraper {
    client: reqwest::Client,
}

impl JobScraper {
    pub fn new(timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(BROWSER_USER_AGENT)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .context("failed to build scraper http client")?;

        Ok(Self { client })
    }

    /// Never fails; problems come back as `success = false`.
    pub async fn scrape(&self, raw_url: &str) -> ScrapedJob {
        let url = match Url::parse(raw_url.trim()) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => url,
            _ => return ScrapedJob::failed("invalid job URL"),
        };

        let html = match self.fetch_html(&url).await {
            Ok(html) => html,
            Err(err) => {
                warn!(url = %url, error = ?err, "scraper: fetch failed");
                return ScrapedJob::failed("could not fetch the job page");
            }
        };

        let job = extract_job_posting(&url, &html);
        info!(
            url = %url,
            site = ?JobSite::detect(&url),
            success = job.success,
            "scraper: extracted job posting"
        );
        job
    }

    async fn fetch_html(&self, url: &Url) -> Result<String> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .context("HTTP request failed")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("HTTP {status} for {url}");
        }

        response.text().await.context("failed to read response body")
    }
}

/// Pure extraction step, split out so it can run against stored HTML.
pub fn extract_job_posting(url: &Url, html: &str) -> ScrapedJob {
    let document = Html::parse_document(html);

    let site = JobSite::detect(url);
    let selectors = match site {
        JobSite::LinkedIn => Some(&LINKEDIN),
        JobSite::Indeed => Some(&INDEED),
        JobSite::Glassdoor => Some(&GLASSDOOR),
        JobSite::Generic => None,
    };

    let (mut title, mut company, mut location, mut description) = match selectors {
        Some(s) => (
            first_text(&document, s.title),
            first_text(&document, s.company),
            first_text(&document, s.location),
            first_text(&document, s.description),
        ),
        None => (None, None, None, None),
    };

    if let Some(posting) = json_ld_job_posting(&document) {
        title = title.or(posting.title);
        company = company.or(posting.company);
        location = location.or(posting.location);
        description = description.or(posting.description);
    }

    let title = title
        .or_else(|| meta_content(&document, "meta[property=\"og:title\"]"))
        .or_else(|| first_text(&document, &["h1"]))
        .or_else(|| first_text(&document, &["title"]).map(|t| strip_site_suffix(&t)));
    let company = company
        .or_else(|| first_text(&document, &["[class*=\"company\"]", "[class*=\"employer\"]"]))
        .or_else(|| meta_content(&document, "meta[property=\"og:site_name\"]"));
    let location = location.or_else(|| first_text(&document, &["[class*=\"location\"]"]));
    let description = description
        .or_else(|| first_text(&document, &["[class*=\"job-description\"]", "[class*=\"jobDescription\"]", "[class*=\"description\"]"]))
        .or_else(|| meta_content(&document, "meta[name=\"description\"]"))
        .or_else(|| meta_content(&document, "meta[property=\"og:description\"]"));

    ScrapedJob::from_fields(
        title.unwrap_or_default(),
        company.unwrap_or_default(),
        location.unwrap_or_default(),
        truncate_chars(description.unwrap_or_default(), MAX_DESCRIPTION_CHARS),
    )
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn first_text(document: &Html, selectors: &[&str]) -> Option<String> {
    selectors.iter().find_map(|raw| {
        let selector = Selector::parse(raw).ok()?;
        document
            .select(&selector)
            .map(|el| normalize_whitespace(&el.text().collect::<Vec<_>>().join(" ")))
            .find(|text| !text.is_empty())
    })
}

fn meta_content(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .filter_map(|el| el.value().attr("content"))
        .map(normalize_whitespace)
        .find(|text| !text.is_empty())
}

/// "Platform Engineer | Acme Careers" -> "Platform Engineer".
fn strip_site_suffix(title: &str) -> String {
    let cut = [" | ", " - ", " – "]
        .iter()
        .filter_map(|sep| title.find(sep))
        .min()
        .unwrap_or(title.len());
    title[..cut].trim().to_string()
}

fn truncate_chars(text: String, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text,
    }
}

#[derive(Default)]
struct JsonLdPosting {
    title: Option<String>,
    company: Option<String>,
    location: Option<String>,
    description: Option<String>,
}

/// Reads the schema.org `JobPosting` block many career sites embed.
fn json_ld_job_posting(document: &Html) -> Option<JsonLdPosting> {
    let selector = Selector::parse("script[type=\"application/ld+json\"]").ok()?;

    document.select(&selector).find_map(|script| {
        let raw = script.text().collect::<String>();
        let value: serde_json::Value = serde_json::from_str(raw.trim()).ok()?;
        let candidates = match value {
            serde_json::Value::Array(items) => items,
            other => vec![other],
        };
        candidates
            .into_iter()
            .find(|item| item.get("@type").and_then(|t| t.as_str()) == Some("JobPosting"))
            .map(|posting| {
                let text = |v: Option<&serde_json::Value>| {
                    v.and_then(|v| v.as_str())
                        .map(|s| normalize_whitespace(&strip_tags(s)))
                        .filter(|s| !s.is_empty())
                };
                JsonLdPosting {
                    title: text(posting.get("title")),
                    company: text(posting.pointer("/hiringOrganization/name")),
                    location: text(posting.pointer("/jobLocation/address/addressLocality"))
                        .or_else(|| text(posting.pointer("/jobLocation/0/address/addressLocality"))),
                    description: text(posting.get("description")),
                }
            })
    })
}

fn strip_tags(fragment: &str) -> String {
    if !fragment.contains('<') {
        return fragment.to_string();
    }
    Html::parse_fragment(fragment)
        .root_element()
        .text()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(raw: &str) -> Url {
        Url::parse(raw).unwrap()
    }

    #[test]
    fn detects_site_by_host() {
        assert_eq!(JobSite::detect(&url("https://www.linkedin.com/jobs/view/1")), JobSite::LinkedIn);
        assert_eq!(JobSite::detect(&url("https://uk.indeed.com/viewjob?jk=1")), JobSite::Indeed);
        assert_eq!(JobSite::detect(&url("https://www.glassdoor.co.uk/job/1")), JobSite::Glassdoor);
        assert_eq!(JobSite::detect(&url("https://jobs.acme.test/1")), JobSite::Generic);
    }

    #[test]
    fn linkedin_rules_extract_fields() {
        let html = r#"<html><body>
            <h1 class="top-card-layout__title">Senior   Rust Engineer</h1>
            <a class="topcard__org-name-link">Acme</a>
            <span class="topcard__flavor--bullet"> Berlin, Germany </span>
            <div class="show-more-less-html__markup"><p>Build</p><p>systems</p></div>
        </body></html>"#;

        let job = extract_job_posting(&url("https://www.linkedin.com/jobs/view/1"), html);

        assert!(job.success);
        assert_eq!(job.job_title, "Senior Rust Engineer");
        assert_eq!(job.company_name, "Acme");
        assert_eq!(job.location, "Berlin, Germany");
        assert_eq!(job.description, "Build systems");
    }

    #[test]
    fn generic_fallback_uses_title_and_meta_description() {
        let html = r#"<html><head>
            <title>Platform Engineer | Acme Careers</title>
            <meta name="description" content="Join our platform team.">
        </head><body><div class="company-name">Acme</div></body></html>"#;

        let job = extract_job_posting(&url("https://careers.acme.test/jobs/9"), html);

        assert!(job.success);
        assert_eq!(job.job_title, "Platform Engineer");
        assert_eq!(job.company_name, "Acme");
        assert_eq!(job.description, "Join our platform team.");
    }

    #[test]
    fn json_ld_posting_fills_missing_fields() {
        let html = r#"<html><head><script type="application/ld+json">
            {"@type": "JobPosting", "title": "Data Engineer",
             "hiringOrganization": {"name": "Globex"},
             "jobLocation": {"address": {"addressLocality": "Austin"}},
             "description": "<p>Pipelines &amp; more</p>"}
        </script></head><body></body></html>"#;

        let job = extract_job_posting(&url("https://boards.example.test/j/1"), html);

        assert_eq!(job.job_title, "Data Engineer");
        assert_eq!(job.company_name, "Globex");
        assert_eq!(job.location, "Austin");
        assert_eq!(job.description, "Pipelines & more");
    }

    #[test]
    fn empty_page_is_reported_as_failure() {
        let job = extract_job_posting(&url("https://x.test/"), "<html><body></body></html>");
        assert!(!job.success);
        assert!(job.error.is_some());
        assert!(job.job_title.is_empty());
    }

    #[tokio::test]
    async fn invalid_url_fails_without_fetching() {
        let scraper = JobScraper::new(Duration::from_secs(1)).unwrap();
        let job = scraper.scrape("ftp://nope").await;
        assert!(!job.success);
    }
}
