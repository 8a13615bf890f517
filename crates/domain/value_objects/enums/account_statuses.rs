use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    #[default]
    Active,
    Hibernated,
    Deleted,
}

impl Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            AccountStatus::Active => "active",
            AccountStatus::Hibernated => "hibernated",
            AccountStatus::Deleted => "deleted",
        };
        write!(f, "{}", status)
    }
}

impl AccountStatus {
    pub fn from_str(value: &str) -> Self {
        match value {
            "hibernated" => AccountStatus::Hibernated,
            "deleted" => AccountStatus::Deleted,
            _ => AccountStatus::Active,
        }
    }
}
