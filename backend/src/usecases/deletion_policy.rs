use std::sync::Arc;

use chrono::Utc;
use crates::domain::{
    repositories::{
        applications::ApplicationRepository,
        deletion_log::{DeletionLogRepository, FreeTierDeletionOutcome},
        subscriptions::SubscriptionRepository,
    },
    value_objects::deletion::{
        DeletionQuotaDto, DeletionResult, FREE_TIER_DELETIONS_PER_WINDOW,
        FREE_TIER_MIN_AGE_DAYS, FREE_TIER_WINDOW_DAYS, FreeTierViolation, remaining_quota,
        window_start,
    },
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::tier_resolver::TierResolver;

#[derive(Debug, Error)]
pub enum DeletionError {
    #[error("no applications selected")]
    EmptyBatch,
    #[error("applications must be at least 14 days old to delete on the free plan")]
    TooRecent { application_id: Uuid },
    #[error("deletion limit reached: {remaining} of 10 left in the last 30 days, {requested} requested")]
    QuotaExceeded { requested: i64, remaining: i64 },
    #[error("one or more applications were not found")]
    NotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl DeletionError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            DeletionError::EmptyBatch => StatusCode::BAD_REQUEST,
            DeletionError::TooRecent { .. } => StatusCode::FORBIDDEN,
            DeletionError::QuotaExceeded { .. } => StatusCode::CONFLICT,
            DeletionError::NotFound => StatusCode::NOT_FOUND,
            DeletionError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<FreeTierViolation> for DeletionError {
    fn from(value: FreeTierViolation) -> Self {
        match value {
            FreeTierViolation::TooRecent { application_id } => {
                DeletionError::TooRecent { application_id }
            }
            FreeTierViolation::QuotaExceeded {
                requested,
                remaining,
            } => DeletionError::QuotaExceeded {
                requested,
                remaining,
            },
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, DeletionError>;

pub struct DeletionPolicyUseCase<A, L, S>
where
    A: ApplicationRepository + Send + Sync + 'static,
    L: DeletionLogRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    application_repo: Arc<A>,
    deletion_log_repo: Arc<L>,
    tier_resolver: TierResolver<S>,
}

impl<A, L, S> DeletionPolicyUseCase<A, L, S>
where
    A: ApplicationRepository + Send + Sync + 'static,
    L: DeletionLogRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    pub fn new(
        application_repo: Arc<A>,
        deletion_log_repo: Arc<L>,
        tier_resolver: TierResolver<S>,
    ) -> Self {
        Self {
            application_repo,
            deletion_log_repo,
            tier_resolver,
        }
    }

    pub async fn delete(
        &self,
        user_id: Uuid,
        application_ids: Vec<Uuid>,
    ) -> UseCaseResult<DeletionResult> {
        if application_ids.is_empty() {
            return Err(DeletionError::EmptyBatch);
        }

        let tier = self.tier_resolver.resolve_tier_for_user(user_id).await?;
        let requested = application_ids.len();

        if tier.is_premium() {
            let deleted = self
                .application_repo
                .delete_for_user(user_id, application_ids)
                .await
                .map_err(|err| {
                    error!(%user_id, db_error = ?err, "deletion: premium delete failed");
                    DeletionError::Internal(err)
                })?;
            info!(%user_id, requested, deleted, "deletion: premium batch deleted");
            return Ok(DeletionResult {
                deleted,
                remaining_quota: None,
            });
        }

        let outcome = self
            .deletion_log_repo
            .delete_with_audit(user_id, application_ids, Utc::now())
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "deletion: free-tier delete failed");
                DeletionError::Internal(err)
            })?;

        match outcome {
            FreeTierDeletionOutcome::Deleted {
                deleted,
                used_in_window,
            } => {
                let remaining = remaining_quota(used_in_window);
                info!(%user_id, deleted, remaining, "deletion: free-tier batch deleted");
                Ok(DeletionResult {
                    deleted,
                    remaining_quota: Some(remaining),
                })
            }
            FreeTierDeletionOutcome::Rejected(violation) => {
                let err = DeletionError::from(violation);
                warn!(
                    %user_id,
                    requested,
                    status = err.status_code().as_u16(),
                    "deletion: free-tier batch rejected"
                );
                Err(err)
            }
            FreeTierDeletionOutcome::NotFound => Err(DeletionError::NotFound),
        }
    }

    pub async fn quota(&self, user_id: Uuid) -> UseCaseResult<DeletionQuotaDto> {
        let tier = self.tier_resolver.resolve_tier_for_user(user_id).await?;
        if tier.is_premium() {
            return Ok(DeletionQuotaDto {
                unlimited: true,
                used: 0,
                limit: FREE_TIER_DELETIONS_PER_WINDOW,
                remaining: None,
                window_days: FREE_TIER_WINDOW_DAYS,
                min_age_days: FREE_TIER_MIN_AGE_DAYS,
            });
        }

        let used = self
            .deletion_log_repo
            .count_since(user_id, window_start(Utc::now()))
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "deletion: failed to count recent deletions");
                DeletionError::Internal(err)
            })?;

        Ok(DeletionQuotaDto {
            unlimited: false,
            used,
            limit: FREE_TIER_DELETIONS_PER_WINDOW,
            remaining: Some(remaining_quota(used)),
            window_days: FREE_TIER_WINDOW_DAYS,
            min_age_days: FREE_TIER_MIN_AGE_DAYS,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::test_support::sample_subscription;
    use crates::domain::repositories::{
        applications::MockApplicationRepository, deletion_log::MockDeletionLogRepository,
        subscriptions::MockSubscriptionRepository,
    };
    use mockall::predicate::eq;

    fn subscriptions_for(tier: &'static str, sub_id: Option<&'static str>) -> MockSubscriptionRepository {
        let mut repo = MockSubscriptionRepository::new();
        repo.expect_find_by_user()
            .returning(move |user_id| Ok(Some(sample_subscription(user_id, tier, sub_id))));
        repo
    }

    fn usecase(
        application_repo: MockApplicationRepository,
        deletion_log_repo: MockDeletionLogRepository,
        subscription_repo: MockSubscriptionRepository,
    ) -> DeletionPolicyUseCase<MockApplicationRepository, MockDeletionLogRepository, MockSubscriptionRepository>
    {
        DeletionPolicyUseCase::new(
            Arc::new(application_repo),
            Arc::new(deletion_log_repo),
            TierResolver::new(Arc::new(subscription_repo)),
        )
    }

    #[tokio::test]
    async fn premium_deletes_without_logging() {
        let user_id = Uuid::new_v4();
        let ids = vec![Uuid::new_v4(), Uuid::new_v4()];

        let mut application_repo = MockApplicationRepository::new();
        application_repo
            .expect_delete_for_user()
            .with(eq(user_id), eq(ids.clone()))
            .times(1)
            .returning(|_, ids| Ok(ids.len()));

        let mut deletion_log_repo = MockDeletionLogRepository::new();
        deletion_log_repo.expect_delete_with_audit().never();

        let result = usecase(
            application_repo,
            deletion_log_repo,
            subscriptions_for("premium", Some("sub_123")),
        )
        .delete(user_id, ids)
        .await
        .unwrap();

        assert_eq!(
            result,
            DeletionResult {
                deleted: 2,
                remaining_quota: None
            }
        );
    }

    #[tokio::test]
    async fn free_tier_goes_through_the_audited_path() {
        let user_id = Uuid::new_v4();
        let ids = vec![Uuid::new_v4()];

        let mut application_repo = MockApplicationRepository::new();
        application_repo.expect_delete_for_user().never();

        let mut deletion_log_repo = MockDeletionLogRepository::new();
        deletion_log_repo
            .expect_delete_with_audit()
            .times(1)
            .returning(|_, ids, _| {
                Ok(FreeTierDeletionOutcome::Deleted {
                    deleted: ids.len(),
                    used_in_window: 4,
                })
            });

        let result = usecase(
            application_repo,
            deletion_log_repo,
            subscriptions_for("free", None),
        )
        .delete(user_id, ids)
        .await
        .unwrap();

        assert_eq!(result.remaining_quota, Some(6));
    }

    #[tokio::test]
    async fn premium_row_without_stripe_subscription_is_treated_as_free() {
        let mut deletion_log_repo = MockDeletionLogRepository::new();
        deletion_log_repo
            .expect_delete_with_audit()
            .times(1)
            .returning(|_, _, _| {
                Ok(FreeTierDeletionOutcome::Rejected(FreeTierViolation::QuotaExceeded {
                    requested: 1,
                    remaining: 0,
                }))
            });

        let err = usecase(
            MockApplicationRepository::new(),
            deletion_log_repo,
            subscriptions_for("premium", None),
        )
        .delete(Uuid::new_v4(), vec![Uuid::new_v4()])
        .await
        .unwrap_err();

        assert!(matches!(err, DeletionError::QuotaExceeded { .. }));
        assert_eq!(err.status_code(), axum::http::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn too_recent_is_forbidden() {
        let young = Uuid::new_v4();
        let mut deletion_log_repo = MockDeletionLogRepository::new();
        deletion_log_repo
            .expect_delete_with_audit()
            .returning(move |_, _, _| {
                Ok(FreeTierDeletionOutcome::Rejected(FreeTierViolation::TooRecent {
                    application_id: young,
                }))
            });

        let err = usecase(
            MockApplicationRepository::new(),
            deletion_log_repo,
            subscriptions_for("free", None),
        )
        .delete(Uuid::new_v4(), vec![young])
        .await
        .unwrap_err();

        assert_eq!(err.status_code(), axum::http::StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn empty_batch_is_rejected_before_any_lookup() {
        let err = usecase(
            MockApplicationRepository::new(),
            MockDeletionLogRepository::new(),
            MockSubscriptionRepository::new(),
        )
        .delete(Uuid::new_v4(), vec![])
        .await
        .unwrap_err();

        assert!(matches!(err, DeletionError::EmptyBatch));
    }

    #[tokio::test]
    async fn quota_reports_remaining_for_free_users() {
        let user_id = Uuid::new_v4();
        let mut deletion_log_repo = MockDeletionLogRepository::new();
        deletion_log_repo
            .expect_count_since()
            .returning(|_, _| Ok(3));

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo.expect_find_by_user().returning(|_| Ok(None));

        let quota = usecase(
            MockApplicationRepository::new(),
            deletion_log_repo,
            subscription_repo,
        )
        .quota(user_id)
        .await
        .unwrap();

        assert!(!quota.unlimited);
        assert_eq!(quota.remaining, Some(7));
    }
}
