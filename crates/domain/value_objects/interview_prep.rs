use serde::{Deserialize, Serialize};

use super::match_analysis::{AiContractError, check_range, extract_json_object};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InterviewQuestion {
    pub question: String,
    #[serde(default)]
    pub tip: Option<String>,
}

impl InterviewQuestion {
    fn new(question: impl Into<String>, tip: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            tip: Some(tip.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InterviewQuestions {
    pub behavioral: Vec<InterviewQuestion>,
    pub technical: Vec<InterviewQuestion>,
    pub company_specific: Vec<InterviewQuestion>,
    #[serde(default)]
    pub questions_to_ask: Vec<String>,
}

impl InterviewQuestions {
    pub fn parse(text: &str) -> Result<Self, AiContractError> {
        let json = extract_json_object(text).ok_or(AiContractError::NoJsonObject)?;
        let bundle: InterviewQuestions = serde_json::from_str(json)?;
        if bundle.behavioral.is_empty()
            && bundle.technical.is_empty()
            && bundle.company_specific.is_empty()
        {
            return Err(AiContractError::Empty("questions"));
        }
        Ok(bundle)
    }

    pub fn fallback(job_title: &str, company_name: &str) -> Self {
        Self {
            behavioral: vec![
                InterviewQuestion::new(
                    "Tell me about a time you handled a difficult challenge at work.",
                    "Use the STAR method: situation, task, action, result.",
                ),
                InterviewQuestion::new(
                    "Describe a project you are most proud of.",
                    "Pick something relevant to this role and quantify the outcome.",
                ),
            ],
            technical: vec![InterviewQuestion::new(
                format!("What skills make you a strong fit for the {job_title} role?"),
                "Tie each skill back to a requirement in the job description.",
            )],
            company_specific: vec![InterviewQuestion::new(
                format!("Why do you want to work at {company_name}?"),
                format!("Research {company_name}'s mission and recent news beforehand."),
            )],
            questions_to_ask: vec![
                "What does success look like in the first 90 days?".to_string(),
                format!("How would you describe the team culture at {company_name}?"),
            ],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnswerFeedbackRequest {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InterviewFeedback {
    pub score: i64,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    #[serde(default)]
    pub suggested_answer: Option<String>,
}

impl InterviewFeedback {
    pub fn parse(text: &str) -> Result<Self, AiContractError> {
        let json = extract_json_object(text).ok_or(AiContractError::NoJsonObject)?;
        let feedback: InterviewFeedback = serde_json::from_str(json)?;
        check_range("score", feedback.score, 10)?;
        Ok(feedback)
    }

    pub fn fallback() -> Self {
        Self {
            score: 5,
            strengths: vec!["You gave an answer to practice with.".to_string()],
            improvements: vec![
                "Structure the answer as situation, task, action, result.".to_string(),
                "Add a concrete, measurable outcome.".to_string(),
            ],
            suggested_answer: None,
        }
    }
}
