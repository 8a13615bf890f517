use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const FREE_TIER_MIN_AGE_DAYS: i64 = 14;
pub const FREE_TIER_DELETIONS_PER_WINDOW: i64 = 10;
pub const FREE_TIER_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Deserialize)]
pub struct DeleteApplicationsRequest {
    pub application_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DeletionResult {
    pub deleted: usize,
    /// `None` for premium users, who have no quota.
    pub remaining_quota: Option<i64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DeletionQuotaDto {
    pub unlimited: bool,
    pub used: i64,
    pub limit: i64,
    pub remaining: Option<i64>,
    pub window_days: i64,
    pub min_age_days: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FreeTierViolation {
    TooRecent { application_id: Uuid },
    QuotaExceeded { requested: i64, remaining: i64 },
}

pub fn window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(FREE_TIER_WINDOW_DAYS)
}

pub fn min_age_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(FREE_TIER_MIN_AGE_DAYS)
}

pub fn remaining_quota(used_in_window: i64) -> i64 {
    (FREE_TIER_DELETIONS_PER_WINDOW - used_in_window).max(0)
}

/// Checks a whole free-tier batch. Any violation rejects the batch.
pub fn check_free_tier_batch(
    batch: &[(Uuid, DateTime<Utc>)],
    used_in_window: i64,
    now: DateTime<Utc>,
) -> Result<(), FreeTierViolation> {
    let cutoff = min_age_cutoff(now);
    if let Some((application_id, _)) = batch.iter().find(|(_, created_at)| *created_at > cutoff) {
        return Err(FreeTierViolation::TooRecent {
            application_id: *application_id,
        });
    }

    let requested = batch.len() as i64;
    let remaining = remaining_quota(used_in_window);
    if requested > remaining {
        return Err(FreeTierViolation::QuotaExceeded {
            requested,
            remaining,
        });
    }

    Ok(())
}
