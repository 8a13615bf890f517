use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use crates::{
    domain::{
        repositories::{profiles::ProfileRepository, subscriptions::SubscriptionRepository},
        value_objects::preferences::UserPreferences,
    },
    infra::db::repositories::{profiles::ProfilePostgres, subscriptions::SubscriptionPostgres},
};

use crate::{
    auth::AuthUser,
    axum_http::{error_responses::map_error, http_serve::AppContext},
    usecases::{profile::ProfileUseCase, tier_resolver::TierResolver},
};

pub fn routes(ctx: &AppContext) -> Router {
    let profile_repository = ProfilePostgres::new(Arc::clone(&ctx.db_pool));
    let subscription_repository = SubscriptionPostgres::new(Arc::clone(&ctx.db_pool));
    let profile_usecase = ProfileUseCase::new(
        Arc::new(profile_repository),
        TierResolver::new(Arc::new(subscription_repository)),
    );

    Router::new()
        .route("/", get(get_profile))
        .route("/preferences", put(update_preferences))
        .route("/hibernate", post(hibernate))
        .route("/reactivate", post(reactivate))
        .route("/schedule-deletion", post(schedule_deletion))
        .with_state(Arc::new(profile_usecase))
}

pub async fn get_profile<P, S>(
    State(profile_usecase): State<Arc<ProfileUseCase<P, S>>>,
    auth: AuthUser,
) -> Response
where
    P: ProfileRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    match profile_usecase.get(auth.user_id).await {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(err) => map_error("get_profile", err),
    }
}

pub async fn update_preferences<P, S>(
    State(profile_usecase): State<Arc<ProfileUseCase<P, S>>>,
    auth: AuthUser,
    Json(preferences): Json<UserPreferences>,
) -> Response
where
    P: ProfileRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    match profile_usecase
        .update_preferences(auth.user_id, preferences)
        .await
    {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(err) => map_error("update_preferences", err),
    }
}

pub async fn hibernate<P, S>(
    State(profile_usecase): State<Arc<ProfileUseCase<P, S>>>,
    auth: AuthUser,
) -> Response
where
    P: ProfileRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    match profile_usecase.hibernate(auth.user_id).await {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(err) => map_error("hibernate", err),
    }
}

pub async fn reactivate<P, S>(
    State(profile_usecase): State<Arc<ProfileUseCase<P, S>>>,
    auth: AuthUser,
) -> Response
where
    P: ProfileRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    match profile_usecase.reactivate(auth.user_id).await {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(err) => map_error("reactivate", err),
    }
}

pub async fn schedule_deletion<P, S>(
    State(profile_usecase): State<Arc<ProfileUseCase<P, S>>>,
    auth: AuthUser,
) -> Response
where
    P: ProfileRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    match profile_usecase.schedule_deletion(auth.user_id).await {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(err) => map_error("schedule_deletion", err),
    }
}
