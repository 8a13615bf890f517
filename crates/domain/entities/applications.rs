use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use crate::infra::db::postgres::schema::applications;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable, PartialEq)]
#[diesel(table_name = applications)]
pub struct ApplicationEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_id: Option<Uuid>,
    pub job_title: String,
    pub company_name: String,
    pub location: Option<String>,
    pub job_url: Option<String>,
    pub job_description: Option<String>,
    pub status: String,
    pub applied_date: Option<NaiveDate>,
    pub match_score: Option<i32>,
    pub match_analysis: Option<Value>,
    pub interview_prep_enabled: bool,
    pub interview_questions: Option<Value>,
    pub interview_prep_generated_at: Option<DateTime<Utc>>,
    pub research_status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, PartialEq)]
#[diesel(table_name = applications)]
pub struct InsertApplicationEntity {
    pub user_id: Uuid,
    pub company_id: Option<Uuid>,
    pub job_title: String,
    pub company_name: String,
    pub location: Option<String>,
    pub job_url: Option<String>,
    pub job_description: Option<String>,
    pub status: String,
    pub applied_date: Option<NaiveDate>,
    pub match_score: Option<i32>,
    pub match_analysis: Option<Value>,
    pub interview_prep_enabled: bool,
    pub research_status: String,
    pub notes: Option<String>,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default, AsChangeset, PartialEq)]
#[diesel(table_name = applications)]
pub struct UpdateApplicationEntity {
    pub location: Option<String>,
    pub job_description: Option<String>,
    pub applied_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub interview_prep_enabled: Option<bool>,
    pub updated_at: Option<DateTime<Utc>>,
}
