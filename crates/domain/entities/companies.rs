use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::companies;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable, PartialEq)]
#[diesel(table_name = companies)]
pub struct CompanyEntity {
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Used both as the insert row and the conflict changeset, so a re-research
/// overwrites stale columns with NULL when the service no longer reports them.
#[derive(Debug, Clone, Insertable, AsChangeset, PartialEq)]
#[diesel(table_name = companies)]
#[diesel(treat_none_as_null = true)]
pub struct UpsertCompanyEntity {
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
    pub updated_at: DateTime<Utc>,
}
