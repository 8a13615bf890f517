use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::value_objects::deletion::FreeTierViolation;

#[derive(Debug, Clone, PartialEq)]
pub enum FreeTierDeletionOutcome {
    Deleted { deleted: usize, used_in_window: i64 },
    Rejected(FreeTierViolation),
    /// At least one id is not an application owned by the user.
    NotFound,
}

#[automock]
#[async_trait]
pub trait DeletionLogRepository {
    async fn count_since(&self, user_id: Uuid, since: DateTime<Utc>) -> Result<i64>;

    /// Re-checks age and quota under a row lock on the user's profile, deletes
    /// the batch and appends one log row per deleted id, all in one
    /// transaction.
    async fn delete_with_audit(
        &self,
        user_id: Uuid,
        application_ids: Vec<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<FreeTierDeletionOutcome>;
}
