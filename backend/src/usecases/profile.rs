use std::sync::Arc;

use chrono::{Duration, Utc};
use crates::domain::{
    entities::profiles::{ProfileEntity, UpdatePreferencesEntity},
    repositories::{profiles::ProfileRepository, subscriptions::SubscriptionRepository},
    value_objects::{
        enums::account_statuses::AccountStatus,
        preferences::{ProfileDto, UserPreferences},
    },
};
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use super::tier_resolver::TierResolver;

pub const ACCOUNT_DELETION_GRACE_DAYS: i64 = 30;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("profile not found")]
    NotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ProfileError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            ProfileError::NotFound => StatusCode::NOT_FOUND,
            ProfileError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, ProfileError>;

pub struct ProfileUseCase<P, S>
where
    P: ProfileRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    profile_repo: Arc<P>,
    tier_resolver: TierResolver<S>,
}

impl<P, S> ProfileUseCase<P, S>
where
    P: ProfileRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    pub fn new(profile_repo: Arc<P>, tier_resolver: TierResolver<S>) -> Self {
        Self {
            profile_repo,
            tier_resolver,
        }
    }

    pub async fn get(&self, user_id: Uuid) -> UseCaseResult<ProfileDto> {
        let profile = self
            .profile_repo
            .find(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "profile: failed to load profile");
                ProfileError::Internal(err)
            })?
            .ok_or(ProfileError::NotFound)?;

        self.to_dto(profile).await
    }

    pub async fn update_preferences(
        &self,
        user_id: Uuid,
        preferences: UserPreferences,
    ) -> UseCaseResult<ProfileDto> {
        let preferences = preferences.normalized();
        let changes = UpdatePreferencesEntity {
            core_values: preferences.core_values,
            deal_breakers: preferences.deal_breakers,
            preferred_locations: preferences.preferred_locations,
            preferred_company_sizes: preferences.preferred_company_sizes,
            preferred_industries: preferences.preferred_industries,
            onboarding_completed: true,
            updated_at: Utc::now(),
        };

        let profile = self
            .profile_repo
            .update_preferences(user_id, changes)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "profile: failed to update preferences");
                ProfileError::Internal(err)
            })?
            .ok_or(ProfileError::NotFound)?;

        info!(%user_id, "profile: preferences updated");
        self.to_dto(profile).await
    }

    pub async fn hibernate(&self, user_id: Uuid) -> UseCaseResult<ProfileDto> {
        self.set_account_status(user_id, AccountStatus::Hibernated, None)
            .await
    }

    pub async fn reactivate(&self, user_id: Uuid) -> UseCaseResult<ProfileDto> {
        self.set_account_status(user_id, AccountStatus::Active, None)
            .await
    }

    pub async fn schedule_deletion(&self, user_id: Uuid) -> UseCaseResult<ProfileDto> {
        let deletion_at = Utc::now() + Duration::days(ACCOUNT_DELETION_GRACE_DAYS);
        self.set_account_status(user_id, AccountStatus::Deleted, Some(deletion_at))
            .await
    }

    async fn set_account_status(
        &self,
        user_id: Uuid,
        status: AccountStatus,
        deletion_scheduled_at: Option<chrono::DateTime<Utc>>,
    ) -> UseCaseResult<ProfileDto> {
        let profile = self
            .profile_repo
            .set_account_status(user_id, status, deletion_scheduled_at)
            .await
            .map_err(|err| {
                error!(%user_id, account_status = %status, db_error = ?err, "profile: failed to change account status");
                ProfileError::Internal(err)
            })?
            .ok_or(ProfileError::NotFound)?;

        info!(%user_id, account_status = %status, ?deletion_scheduled_at, "profile: account status changed");
        self.to_dto(profile).await
    }

    async fn to_dto(&self, profile: ProfileEntity) -> UseCaseResult<ProfileDto> {
        let tier = self.tier_resolver.resolve_tier_for_user(profile.id).await?;
        Ok(ProfileDto::from_entity(profile, tier))
    }
}
