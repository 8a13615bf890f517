use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    NotApplied,
    Applied,
    Interviewing,
    Offer,
    Rejected,
    Withdrawn,
}

impl Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            ApplicationStatus::NotApplied => "not_applied",
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Interviewing => "interviewing",
            ApplicationStatus::Offer => "offer",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Withdrawn => "withdrawn",
        };
        write!(f, "{}", status)
    }
}

impl ApplicationStatus {
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "not_applied" => Some(ApplicationStatus::NotApplied),
            "applied" => Some(ApplicationStatus::Applied),
            "interviewing" => Some(ApplicationStatus::Interviewing),
            "offer" => Some(ApplicationStatus::Offer),
            "rejected" => Some(ApplicationStatus::Rejected),
            "withdrawn" => Some(ApplicationStatus::Withdrawn),
            _ => None,
        }
    }
}
