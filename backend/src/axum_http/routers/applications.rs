use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use crates::{
    ai::anthropic_client::AnthropicClient,
    domain::value_objects::{
        applications::{
            AnalyzeMatchRequest, CreateApplicationRequest, UpdateApplicationRequest,
            UpdateStatusRequest,
        },
        deletion::DeleteApplicationsRequest,
        interview_prep::AnswerFeedbackRequest,
        scraping::ScrapeRequest,
    },
    infra::db::repositories::{
        applications::ApplicationPostgres, companies::CompanyPostgres,
        deletion_log::DeletionLogPostgres, profiles::ProfilePostgres,
        subscriptions::SubscriptionPostgres,
    },
    scraping::job_scraper::JobScraper,
};
use tracing::info;
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    axum_http::{error_responses::map_error, http_serve::AppContext},
    background_worker::enrichment_queue::EnrichmentQueue,
    usecases::{
        applications::ApplicationUseCase, deletion_policy::DeletionPolicyUseCase,
        interview_prep::InterviewPrepUseCase, tier_resolver::TierResolver,
    },
};

type Applications = ApplicationUseCase<
    ApplicationPostgres,
    ProfilePostgres,
    AnthropicClient,
    JobScraper,
    EnrichmentQueue,
>;
type Deletions = DeletionPolicyUseCase<ApplicationPostgres, DeletionLogPostgres, SubscriptionPostgres>;
type InterviewPrep = InterviewPrepUseCase<ApplicationPostgres, CompanyPostgres, AnthropicClient>;

#[derive(Clone)]
pub struct ApplicationsState {
    applications: Arc<Applications>,
    deletions: Arc<Deletions>,
    interview_prep: Arc<InterviewPrep>,
}

pub fn routes(ctx: &AppContext) -> Router {
    let application_repository = Arc::new(ApplicationPostgres::new(Arc::clone(&ctx.db_pool)));
    let profile_repository = Arc::new(ProfilePostgres::new(Arc::clone(&ctx.db_pool)));
    let company_repository = Arc::new(CompanyPostgres::new(Arc::clone(&ctx.db_pool)));
    let deletion_log_repository = Arc::new(DeletionLogPostgres::new(Arc::clone(&ctx.db_pool)));
    let subscription_repository = Arc::new(SubscriptionPostgres::new(Arc::clone(&ctx.db_pool)));

    let state = ApplicationsState {
        applications: Arc::new(ApplicationUseCase::new(
            Arc::clone(&application_repository),
            profile_repository,
            Arc::clone(&ctx.ai),
            Arc::clone(&ctx.scraper),
            Arc::clone(&ctx.enrichment),
        )),
        deletions: Arc::new(DeletionPolicyUseCase::new(
            Arc::clone(&application_repository),
            deletion_log_repository,
            TierResolver::new(subscription_repository),
        )),
        interview_prep: Arc::new(InterviewPrepUseCase::new(
            application_repository,
            company_repository,
            Arc::clone(&ctx.ai),
        )),
    };

    Router::new()
        .route("/", post(create).get(list))
        .route("/scrape", post(scrape))
        .route("/analyze", post(analyze))
        .route("/delete", post(delete_batch))
        .route("/deletion-quota", get(deletion_quota))
        .route("/:id", get(get_one).patch(update))
        .route("/:id/status", patch(update_status))
        .route("/:id/research", post(retry_research))
        .route("/:id/interview-prep", post(regenerate_interview_prep))
        .route("/:id/interview-prep/feedback", post(answer_feedback))
        .with_state(state)
}

pub async fn scrape(
    State(state): State<ApplicationsState>,
    auth: AuthUser,
    Json(request): Json<ScrapeRequest>,
) -> Response {
    info!(user_id = %auth.user_id, "applications: scrape requested");
    match state.applications.scrape(&request.url).await {
        Ok(job) => (StatusCode::OK, Json(job)).into_response(),
        Err(err) => map_error("scrape", err),
    }
}

pub async fn analyze(
    State(state): State<ApplicationsState>,
    auth: AuthUser,
    Json(request): Json<AnalyzeMatchRequest>,
) -> Response {
    match state.applications.analyze_match(auth.user_id, request).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(err) => map_error("analyze", err),
    }
}

pub async fn create(
    State(state): State<ApplicationsState>,
    auth: AuthUser,
    Json(request): Json<CreateApplicationRequest>,
) -> Response {
    match state.applications.create(auth.user_id, request).await {
        Ok(application) => (StatusCode::CREATED, Json(application)).into_response(),
        Err(err) => map_error("create", err),
    }
}

pub async fn list(State(state): State<ApplicationsState>, auth: AuthUser) -> Response {
    match state.applications.list(auth.user_id).await {
        Ok(applications) => (StatusCode::OK, Json(applications)).into_response(),
        Err(err) => map_error("list", err),
    }
}

pub async fn get_one(
    State(state): State<ApplicationsState>,
    auth: AuthUser,
    Path(application_id): Path<Uuid>,
) -> Response {
    match state.applications.get(auth.user_id, application_id).await {
        Ok(application) => (StatusCode::OK, Json(application)).into_response(),
        Err(err) => map_error("get", err),
    }
}

pub async fn update(
    State(state): State<ApplicationsState>,
    auth: AuthUser,
    Path(application_id): Path<Uuid>,
    Json(request): Json<UpdateApplicationRequest>,
) -> Response {
    match state
        .applications
        .update(auth.user_id, application_id, request)
        .await
    {
        Ok(application) => (StatusCode::OK, Json(application)).into_response(),
        Err(err) => map_error("update", err),
    }
}

pub async fn update_status(
    State(state): State<ApplicationsState>,
    auth: AuthUser,
    Path(application_id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Response {
    match state
        .applications
        .update_status(auth.user_id, application_id, &request.status)
        .await
    {
        Ok(application) => (StatusCode::OK, Json(application)).into_response(),
        Err(err) => map_error("update_status", err),
    }
}

pub async fn retry_research(
    State(state): State<ApplicationsState>,
    auth: AuthUser,
    Path(application_id): Path<Uuid>,
) -> Response {
    match state
        .applications
        .retry_research(auth.user_id, application_id)
        .await
    {
        Ok(application) => (StatusCode::ACCEPTED, Json(application)).into_response(),
        Err(err) => map_error("retry_research", err),
    }
}

pub async fn regenerate_interview_prep(
    State(state): State<ApplicationsState>,
    auth: AuthUser,
    Path(application_id): Path<Uuid>,
) -> Response {
    match state
        .interview_prep
        .regenerate(auth.user_id, application_id)
        .await
    {
        Ok(questions) => (StatusCode::OK, Json(questions)).into_response(),
        Err(err) => map_error("interview_prep", err),
    }
}

pub async fn answer_feedback(
    State(state): State<ApplicationsState>,
    auth: AuthUser,
    Path(application_id): Path<Uuid>,
    Json(request): Json<AnswerFeedbackRequest>,
) -> Response {
    match state
        .interview_prep
        .answer_feedback(auth.user_id, application_id, request)
        .await
    {
        Ok(feedback) => (StatusCode::OK, Json(feedback)).into_response(),
        Err(err) => map_error("answer_feedback", err),
    }
}

pub async fn delete_batch(
    State(state): State<ApplicationsState>,
    auth: AuthUser,
    Json(request): Json<DeleteApplicationsRequest>,
) -> Response {
    match state
        .deletions
        .delete(auth.user_id, request.application_ids)
        .await
    {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(err) => map_error("delete", err),
    }
}

pub async fn deletion_quota(State(state): State<ApplicationsState>, auth: AuthUser) -> Response {
    match state.deletions.quota(auth.user_id).await {
        Ok(quota) => (StatusCode::OK, Json(quota)).into_response(),
        Err(err) => map_error("deletion_quota", err),
    }
}
