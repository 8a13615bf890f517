use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::profiles::ProfileEntity;
use crate::domain::value_objects::enums::{
    account_statuses::AccountStatus, subscription_tiers::SubscriptionTier,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserPreferences {
    #[serde(default)]
    pub core_values: Vec<String>,
    #[serde(default)]
    pub deal_breakers: Vec<String>,
    #[serde(default)]
    pub preferred_locations: Vec<String>,
    #[serde(default)]
    pub preferred_company_sizes: Vec<String>,
    #[serde(default)]
    pub preferred_industries: Vec<String>,
}

impl UserPreferences {
    /// Blank entries do not count as a preference.
    pub fn is_empty(&self) -> bool {
        [
            &self.core_values,
            &self.deal_breakers,
            &self.preferred_locations,
            &self.preferred_company_sizes,
            &self.preferred_industries,
        ]
        .iter()
        .all(|list| list.iter().all(|item| item.trim().is_empty()))
    }

    pub fn normalized(self) -> Self {
        fn clean(list: Vec<String>) -> Vec<String> {
            let mut out: Vec<String> = Vec::with_capacity(list.len());
            for item in list {
                let item = item.trim().to_string();
                if !item.is_empty() && !out.contains(&item) {
                    out.push(item);
                }
            }
            out
        }

        Self {
            core_values: clean(self.core_values),
            deal_breakers: clean(self.deal_breakers),
            preferred_locations: clean(self.preferred_locations),
            preferred_company_sizes: clean(self.preferred_company_sizes),
            preferred_industries: clean(self.preferred_industries),
        }
    }
}

impl From<&ProfileEntity> for UserPreferences {
    fn from(value: &ProfileEntity) -> Self {
        Self {
            core_values: value.core_values.clone(),
            deal_breakers: value.deal_breakers.clone(),
            preferred_locations: value.preferred_locations.clone(),
            preferred_company_sizes: value.preferred_company_sizes.clone(),
            preferred_industries: value.preferred_industries.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileDto {
    pub id: Uuid,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub preferences: UserPreferences,
    pub onboarding_completed: bool,
    pub account_status: AccountStatus,
    pub deletion_scheduled_at: Option<DateTime<Utc>>,
    pub subscription_tier: SubscriptionTier,
    pub is_admin: bool,
}

impl ProfileDto {
    /// `tier` comes from the subscription row, not the profile mirror.
    pub fn from_entity(profile: ProfileEntity, tier: SubscriptionTier) -> Self {
        Self {
            preferences: UserPreferences::from(&profile),
            id: profile.id,
            email: profile.email,
            full_name: profile.full_name,
            onboarding_completed: profile.onboarding_completed,
            account_status: AccountStatus::from_str(&profile.account_status),
            deletion_scheduled_at: profile.deletion_scheduled_at,
            subscription_tier: tier,
            is_admin: profile.is_admin,
        }
    }
}
