use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AiContractError {
    #[error("response did not contain a JSON object")]
    NoJsonObject,
    #[error("response JSON did not match the expected shape: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: i64 },
    #[error("{0} is empty")]
    Empty(&'static str),
}

/// Strips ```json / ``` fences and returns the span from the first `{` to the
/// last `}`.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let mut body = text.trim();
    if let Some(rest) = body.strip_prefix("```json") {
        body = rest;
    } else if let Some(rest) = body.strip_prefix("```") {
        body = rest;
    }
    if let Some(rest) = body.trim_end().strip_suffix("```") {
        body = rest;
    }

    let start = body.find('{')?;
    let end = body.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&body[start..=end])
}

pub(crate) fn check_range(
    field: &'static str,
    value: i64,
    max: i64,
) -> Result<(), AiContractError> {
    if (0..=max).contains(&value) {
        Ok(())
    } else {
        Err(AiContractError::OutOfRange { field, value })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryScores {
    pub values_alignment: i64,
    pub deal_breakers: i64,
    pub location_fit: i64,
    pub company_fit: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchAnalysis {
    pub match_score: i64,
    pub category_scores: CategoryScores,
    pub strengths: Vec<String>,
    pub concerns: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    pub interview_question: String,
    pub summary: String,
}

impl MatchAnalysis {
    pub fn parse(text: &str) -> Result<Self, AiContractError> {
        let json = extract_json_object(text).ok_or(AiContractError::NoJsonObject)?;
        let analysis: MatchAnalysis = serde_json::from_str(json)?;
        analysis.validate()?;
        Ok(analysis)
    }

    fn validate(&self) -> Result<(), AiContractError> {
        check_range("match_score", self.match_score, 100)?;
        let scores = &self.category_scores;
        check_range("values_alignment", scores.values_alignment, 100)?;
        check_range("deal_breakers", scores.deal_breakers, 100)?;
        check_range("location_fit", scores.location_fit, 100)?;
        check_range("company_fit", scores.company_fit, 100)?;
        if self.summary.trim().is_empty() {
            return Err(AiContractError::Empty("summary"));
        }
        Ok(())
    }

    /// Safe after `parse`, which bounds the score to 0..=100.
    pub fn score(&self) -> i32 {
        self.match_score as i32
    }
}
