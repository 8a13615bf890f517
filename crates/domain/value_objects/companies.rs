use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::companies::{CompanyEntity, UpsertCompanyEntity};

pub const RESEARCH_FRESHNESS_DAYS: i64 = 30;

/// Lowercase, collapse every run of non-alphanumerics into `-`, trim `-`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for ch in name.chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }

    slug
}

pub fn is_research_fresh(last_researched_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match last_researched_at {
        Some(at) => now.signed_duration_since(at) < Duration::days(RESEARCH_FRESHNESS_DAYS),
        None => false,
    }
}

/// The `data` object returned by the research service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CompanyResearchData {
    pub name: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub industry: Option<String>,
    #[serde(alias = "size", alias = "sizeBucket", alias = "company_size")]
    pub size_bucket: Option<String>,
    pub headquarters: Option<String>,
    #[serde(alias = "foundedYear", alias = "founded")]
    pub founded_year: Option<i32>,
    #[serde(alias = "cultureSummary", alias = "culture")]
    pub culture_summary: Option<String>,
    pub pros: Option<Vec<String>>,
    pub cons: Option<Vec<String>>,
    #[serde(alias = "overallRating", alias = "rating")]
    pub overall_rating: Option<f64>,
    #[serde(alias = "linkedinUrl")]
    pub linkedin_url: Option<String>,
    #[serde(alias = "glassdoorUrl")]
    pub glassdoor_url: Option<String>,
    #[serde(alias = "careersUrl")]
    pub careers_url: Option<String>,
}

impl CompanyResearchData {
    /// Ratings outside 0.0..=5.0 are dropped rather than stored.
    pub fn into_upsert(
        self,
        slug: String,
        fallback_name: &str,
        fallback_website: Option<&str>,
        now: DateTime<Utc>,
    ) -> UpsertCompanyEntity {
        let overall_rating = self
            .overall_rating
            .filter(|rating| rating.is_finite() && (0.0..=5.0).contains(rating));

        UpsertCompanyEntity {
            slug,
            name: non_blank(self.name).unwrap_or_else(|| fallback_name.trim().to_string()),
            website: non_blank(self.website).or_else(|| fallback_website.map(str::to_string)),
            description: non_blank(self.description),
            industry: non_blank(self.industry),
            size_bucket: non_blank(self.size_bucket),
            headquarters: non_blank(self.headquarters),
            founded_year: self.founded_year,
            culture_summary: non_blank(self.culture_summary),
            pros: self.pros.unwrap_or_default(),
            cons: self.cons.unwrap_or_default(),
            overall_rating,
            linkedin_url: non_blank(self.linkedin_url),
            glassdoor_url: non_blank(self.glassdoor_url),
            careers_url: non_blank(self.careers_url),
            last_researched_at: Some(now),
            updated_at: now,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CompanyDto {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub website: Option<String>,
    pub description: Option<String>,
    pub industry: Option<String>,
    pub size_bucket: Option<String>,
    pub headquarters: Option<String>,
    pub founded_year: Option<i32>,
    pub culture_summary: Option<String>,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub overall_rating: Option<f64>,
    pub linkedin_url: Option<String>,
    pub glassdoor_url: Option<String>,
    pub careers_url: Option<String>,
    pub last_researched_at: Option<DateTime<Utc>>,
}

impl From<CompanyEntity> for CompanyDto {
    fn from(value: CompanyEntity) -> Self {
        Self {
            id: value.id,
            slug: value.slug,
            name: value.name,
            website: value.website,
            description: value.description,
            industry: value.industry,
            size_bucket: value.size_bucket,
            headquarters: value.headquarters,
            founded_year: value.founded_year,
            culture_summary: value.culture_summary,
            pros: value.pros,
            cons: value.cons,
            overall_rating: value.overall_rating,
            linkedin_url: value.linkedin_url,
            glassdoor_url: value.glassdoor_url,
            careers_url: value.careers_url,
            last_researched_at: value.last_researched_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_collapses_punctuation_and_spaces() {
        assert_eq!(slugify("Acme, Inc."), "acme-inc");
        assert_eq!(slugify("  Foo & Bar -- Baz  "), "foo-bar-baz");
        assert_eq!(slugify("AT&T"), "at-t");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn name_variants_share_one_slug() {
        assert_eq!(slugify("Acme Inc"), slugify("ACME   inc."));
    }

    #[test]
    fn freshness_window_is_thirty_days() {
        let now = Utc::now();
        assert!(is_research_fresh(Some(now - Duration::days(29)), now));
        assert!(!is_research_fresh(Some(now - Duration::days(30)), now));
        assert!(!is_research_fresh(None, now));
    }

    #[test]
    fn out_of_range_rating_is_dropped() {
        let now = Utc::now();
        let data = CompanyResearchData {
            overall_rating: Some(7.5),
            name: Some("  ".into()),
            ..Default::default()
        };

        let upsert = data.into_upsert("acme".into(), "Acme", Some("https://acme.test"), now);

        assert_eq!(upsert.overall_rating, None);
        assert_eq!(upsert.name, "Acme");
        assert_eq!(upsert.website.as_deref(), Some("https://acme.test"));
        assert_eq!(upsert.last_researched_at, Some(now));
    }

    #[test]
    fn research_payload_accepts_camel_case_keys() {
        let data: CompanyResearchData = serde_json::from_value(serde_json::json!({
            "name": "Acme",
            "foundedYear": 1999,
            "overallRating": 4.2,
            "pros": ["pay"]
        }))
        .unwrap();

        assert_eq!(data.founded_year, Some(1999));
        assert_eq!(data.overall_rating, Some(4.2));
        assert_eq!(data.cons, None);
    }

    #[test]
    fn null_lists_are_stored_as_empty() {
        let data: CompanyResearchData = serde_json::from_value(serde_json::json!({
            "name": "Acme",
            "pros": null,
            "cons": ["hours"]
        }))
        .unwrap();

        let upsert = data.into_upsert("acme".into(), "Acme", None, Utc::now());

        assert!(upsert.pros.is_empty());
        assert_eq!(upsert.cons, vec!["hours".to_string()]);
    }
}
