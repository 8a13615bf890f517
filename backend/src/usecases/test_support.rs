use chrono::{Duration, Utc};
use crates::domain::entities::{
    applications::ApplicationEntity, companies::CompanyEntity, profiles::ProfileEntity,
    subscriptions::SubscriptionEntity,
};
use uuid::Uuid;

pub(crate) fn sample_subscription(
    user_id: Uuid,
    tier: &str,
    stripe_subscription_id: Option<&str>,
) -> SubscriptionEntity {
    let now = Utc::now();
    SubscriptionEntity {
        id: Uuid::new_v4(),
        user_id,
        tier: tier.to_string(),
        status: "active".to_string(),
        stripe_customer_id: Some("cus_1".to_string()),
        stripe_subscription_id: stripe_subscription_id.map(str::to_string),
        billing_cycle: Some("monthly".to_string()),
        current_period_start: Some(now - Duration::days(1)),
        current_period_end: Some(now + Duration::days(29)),
        cancel_at_period_end: false,
        created_at: now,
        updated_at: now,
    }
}

pub(crate) fn sample_application(user_id: Uuid, id: Uuid) -> ApplicationEntity {
    let now = Utc::now();
    ApplicationEntity {
        id,
        user_id,
        company_id: None,
        job_title: "Backend Engineer".to_string(),
        company_name: "Acme Inc".to_string(),
        location: Some("Remote".to_string()),
        job_url: None,
        job_description: Some("Build reliable services in Rust.".to_string()),
        status: "applied".to_string(),
        applied_date: None,
        match_score: None,
        match_analysis: None,
        interview_prep_enabled: false,
        interview_questions: None,
        interview_prep_generated_at: None,
        research_status: "pending".to_string(),
        notes: None,
        created_at: now - Duration::days(20),
        updated_at: now,
    }
}

pub(crate) fn sample_profile(user_id: Uuid) -> ProfileEntity {
    let now = Utc::now();
    ProfileEntity {
        id: user_id,
        email: Some("jo@example.com".to_string()),
        full_name: Some("Jo Doe".to_string()),
        core_values: vec!["ownership".to_string()],
        deal_breakers: vec!["relocation".to_string()],
        preferred_locations: vec!["Remote".to_string()],
        preferred_company_sizes: vec![],
        preferred_industries: vec![],
        onboarding_completed: true,
        account_status: "active".to_string(),
        deletion_scheduled_at: None,
        subscription_tier: "free".to_string(),
        is_admin: false,
        created_at: now,
        updated_at: now,
    }
}

pub(crate) fn sample_company(slug: &str, days_since_research: i64) -> CompanyEntity {
    let now = Utc::now();
    CompanyEntity {
        id: Uuid::new_v4(),
        slug: slug.to_string(),
        name: "Acme Inc".to_string(),
        website: None,
        description: Some("Makes anvils.".to_string()),
        industry: None,
        size_bucket: None,
        headquarters: None,
        founded_year: None,
        culture_summary: Some("Fast-paced".to_string()),
        pros: vec![],
        cons: vec![],
        overall_rating: Some(4.1),
        linkedin_url: None,
        glassdoor_url: None,
        careers_url: None,
        last_researched_at: Some(now - Duration::days(days_since_research)),
        created_at: now,
        updated_at: now,
    }
}
