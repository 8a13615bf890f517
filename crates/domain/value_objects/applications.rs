use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::entities::applications::ApplicationEntity;
use crate::domain::value_objects::enums::{
    application_statuses::ApplicationStatus, research_statuses::ResearchStatus,
};
use crate::domain::value_objects::match_analysis::MatchAnalysis;

pub const MIN_DESCRIPTION_CHARS: usize = 100;

pub const SET_PREFERENCES_MESSAGE: &str =
    "Set your preferences in your profile to get a personalized match score.";
pub const FULLER_DESCRIPTION_MESSAGE: &str =
    "Add a fuller job description (at least 100 characters) to get a match score.";
pub const MISSING_BASICS_MESSAGE: &str =
    "Add the job title and company name to get a match score.";

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeMatchRequest {
    pub job_title: String,
    pub company_name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub job_description: Option<String>,
}

impl AnalyzeMatchRequest {
    pub fn trimmed_description(&self) -> &str {
        self.job_description.as_deref().map(str::trim).unwrap_or("")
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MatchAnalysisResult {
    pub match_score: Option<i32>,
    pub analysis: Option<MatchAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl MatchAnalysisResult {
    pub fn skipped(message: &str) -> Self {
        Self {
            match_score: None,
            analysis: None,
            message: Some(message.to_string()),
        }
    }

    pub fn scored(analysis: MatchAnalysis) -> Self {
        Self {
            match_score: Some(analysis.score()),
            analysis: Some(analysis),
            message: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateApplicationRequest {
    pub job_title: String,
    pub company_name: String,
    #[serde(default)]
    pub company_website: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub job_url: Option<String>,
    #[serde(default)]
    pub job_description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub applied_date: Option<NaiveDate>,
    #[serde(default)]
    pub match_score: Option<i32>,
    #[serde(default)]
    pub match_analysis: Option<Value>,
    #[serde(default)]
    pub interview_prep_enabled: bool,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateApplicationRequest {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub job_description: Option<String>,
    #[serde(default)]
    pub applied_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub interview_prep_enabled: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ApplicationDto {
    pub id: Uuid,
    pub company_id: Option<Uuid>,
    pub job_title: String,
    pub company_name: String,
    pub location: Option<String>,
    pub job_url: Option<String>,
    pub job_description: Option<String>,
    pub status: ApplicationStatus,
    pub applied_date: Option<NaiveDate>,
    pub match_score: Option<i32>,
    pub match_analysis: Option<Value>,
    pub interview_prep_enabled: bool,
    pub interview_questions: Option<Value>,
    pub interview_prep_generated_at: Option<DateTime<Utc>>,
    pub research_status: ResearchStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ApplicationEntity> for ApplicationDto {
    fn from(value: ApplicationEntity) -> Self {
        Self {
            id: value.id,
            company_id: value.company_id,
            job_title: value.job_title,
            company_name: value.company_name,
            location: value.location,
            job_url: value.job_url,
            job_description: value.job_description,
            status: ApplicationStatus::from_str(&value.status).unwrap_or_default(),
            applied_date: value.applied_date,
            match_score: value.match_score,
            match_analysis: value.match_analysis,
            interview_prep_enabled: value.interview_prep_enabled,
            interview_questions: value.interview_questions,
            interview_prep_generated_at: value.interview_prep_generated_at,
            research_status: ResearchStatus::from_str(&value.research_status),
            notes: value.notes,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// Whether a status change should kick off interview prep generation.
pub fn triggers_interview_prep(
    previous: Option<ApplicationStatus>,
    next: ApplicationStatus,
    prep_enabled: bool,
) -> bool {
    prep_enabled
        && next == ApplicationStatus::Interviewing
        && previous != Some(ApplicationStatus::Interviewing)
}
