use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Progress of the detached company research for one application.
#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResearchStatus {
    #[default]
    Pending,
    Done,
    Failed,
    Skipped,
}

impl Display for ResearchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            ResearchStatus::Pending => "pending",
            ResearchStatus::Done => "done",
            ResearchStatus::Failed => "failed",
            ResearchStatus::Skipped => "skipped",
        };
        write!(f, "{}", status)
    }
}

impl ResearchStatus {
    pub fn from_str(value: &str) -> Self {
        match value {
            "done" => ResearchStatus::Done,
            "failed" => ResearchStatus::Failed,
            "skipped" => ResearchStatus::Skipped,
            _ => ResearchStatus::Pending,
        }
    }
}
