use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::profiles;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable, PartialEq)]
#[diesel(table_name = profiles)]
pub struct ProfileEntity {
    pub id: Uuid,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub core_values: Vec<String>,
    pub deal_breakers: Vec<String>,
    pub preferred_locations: Vec<String>,
    pub preferred_company_sizes: Vec<String>,
    pub preferred_industries: Vec<String>,
    pub onboarding_completed: bool,
    pub account_status: String,
    pub deletion_scheduled_at: Option<DateTime<Utc>>,
    pub subscription_tier: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, AsChangeset, PartialEq)]
#[diesel(table_name = profiles)]
pub struct UpdatePreferencesEntity {
    pub core_values: Vec<String>,
    pub deal_breakers: Vec<String>,
    pub preferred_locations: Vec<String>,
    pub preferred_company_sizes: Vec<String>,
    pub preferred_industries: Vec<String>,
    pub onboarding_completed: bool,
    pub updated_at: DateTime<Utc>,
}
