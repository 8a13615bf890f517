use std::sync::Arc;

use chrono::Utc;
use crates::{
    ai::prompts::{self, JobContext},
    domain::{
        entities::applications::{InsertApplicationEntity, UpdateApplicationEntity},
        repositories::{applications::ApplicationRepository, profiles::ProfileRepository},
        value_objects::{
            applications::{
                AnalyzeMatchRequest, ApplicationDto, CreateApplicationRequest,
                FULLER_DESCRIPTION_MESSAGE, MIN_DESCRIPTION_CHARS, MISSING_BASICS_MESSAGE,
                MatchAnalysisResult, SET_PREFERENCES_MESSAGE, UpdateApplicationRequest,
                triggers_interview_prep,
            },
            enums::{application_statuses::ApplicationStatus, research_statuses::ResearchStatus},
            match_analysis::MatchAnalysis,
            preferences::UserPreferences,
            scraping::ScrapedJob,
        },
    },
};
use thiserror::Error;
use tracing::{error, info, warn};
use url::Url;
use uuid::Uuid;

use super::gateways::{GenerativeAiGateway, JobScraperGateway};
use crate::background_worker::enrichment_queue::{EnrichmentDispatcher, EnrichmentTask};

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("application not found")]
    NotFound,
    #[error("match analysis failed: {0}")]
    AnalysisFailed(String),
    #[error("background queue is full, try again shortly")]
    Busy,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApplicationError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            ApplicationError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApplicationError::NotFound => StatusCode::NOT_FOUND,
            ApplicationError::AnalysisFailed(_) => StatusCode::BAD_GATEWAY,
            ApplicationError::Busy => StatusCode::SERVICE_UNAVAILABLE,
            ApplicationError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, ApplicationError>;

pub struct ApplicationUseCase<A, P, G, J, D>
where
    A: ApplicationRepository + Send + Sync + 'static,
    P: ProfileRepository + Send + Sync + 'static,
    G: GenerativeAiGateway + 'static,
    J: JobScraperGateway + 'static,
    D: EnrichmentDispatcher + 'static,
{
    application_repo: Arc<A>,
    profile_repo: Arc<P>,
    ai: Arc<G>,
    scraper: Arc<J>,
    dispatcher: Arc<D>,
}

impl<A, P, G, J, D> ApplicationUseCase<A, P, G, J, D>
where
    A: ApplicationRepository + Send + Sync + 'static,
    P: ProfileRepository + Send + Sync + 'static,
    G: GenerativeAiGateway + 'static,
    J: JobScraperGateway + 'static,
    D: EnrichmentDispatcher + 'static,
{
    pub fn new(
        application_repo: Arc<A>,
        profile_repo: Arc<P>,
        ai: Arc<G>,
        scraper: Arc<J>,
        dispatcher: Arc<D>,
    ) -> Self {
        Self {
            application_repo,
            profile_repo,
            ai,
            scraper,
            dispatcher,
        }
    }

    /// Never fails once the URL parses; a failed scrape comes back with
    /// `success=false` so the client can fall back to manual entry.
    pub async fn scrape(&self, url: &str) -> UseCaseResult<ScrapedJob> {
        let parsed = Url::parse(url.trim()).map_err(|_| {
            ApplicationError::InvalidInput("url must be an absolute http(s) URL".to_string())
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApplicationError::InvalidInput(
                "url must be an absolute http(s) URL".to_string(),
            ));
        }

        let scraped = self.scraper.scrape(parsed.to_string()).await;
        info!(
            host = parsed.host_str().unwrap_or_default(),
            success = scraped.success,
            "applications: scrape finished"
        );
        Ok(scraped)
    }

    pub async fn analyze_match(
        &self,
        user_id: Uuid,
        request: AnalyzeMatchRequest,
    ) -> UseCaseResult<MatchAnalysisResult> {
        if request.job_title.trim().is_empty() || request.company_name.trim().is_empty() {
            return Ok(MatchAnalysisResult::skipped(MISSING_BASICS_MESSAGE));
        }

        let description = request.trimmed_description();
        if description.chars().count() < MIN_DESCRIPTION_CHARS {
            info!(%user_id, "applications: description too short, skipping match analysis");
            return Ok(MatchAnalysisResult::skipped(FULLER_DESCRIPTION_MESSAGE));
        }

        let profile = self
            .profile_repo
            .find(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "applications: failed to load profile for analysis");
                ApplicationError::Internal(err)
            })?;
        let preferences = profile
            .as_ref()
            .map(UserPreferences::from)
            .unwrap_or_default();
        if preferences.is_empty() {
            info!(%user_id, "applications: no preferences, skipping match analysis");
            return Ok(MatchAnalysisResult::skipped(SET_PREFERENCES_MESSAGE));
        }

        let job = JobContext {
            job_title: request.job_title.trim(),
            company_name: request.company_name.trim(),
            location: request.location.as_deref(),
            description,
        };
        let prompt = prompts::match_analysis(&job, &preferences);

        let text = self.ai.complete_json(prompt).await.map_err(|err| {
            warn!(%user_id, error = ?err, "applications: match analysis call failed");
            ApplicationError::AnalysisFailed("the AI service is unavailable".to_string())
        })?;
        let analysis = MatchAnalysis::parse(&text).map_err(|err| {
            warn!(%user_id, error = %err, "applications: match analysis response rejected");
            ApplicationError::AnalysisFailed(err.to_string())
        })?;

        info!(%user_id, match_score = analysis.match_score, "applications: match analysis scored");
        Ok(MatchAnalysisResult::scored(analysis))
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        request: CreateApplicationRequest,
    ) -> UseCaseResult<ApplicationDto> {
        let job_title = request.job_title.trim().to_string();
        let company_name = request.company_name.trim().to_string();
        if job_title.is_empty() || company_name.is_empty() {
            return Err(ApplicationError::InvalidInput(
                "job_title and company_name are required".to_string(),
            ));
        }

        let status = match request.status.as_deref() {
            Some(raw) => ApplicationStatus::from_str(raw).ok_or_else(|| {
                ApplicationError::InvalidInput(format!("unknown status: {raw}"))
            })?,
            None => ApplicationStatus::default(),
        };

        if let Some(score) = request.match_score {
            if !(0..=100).contains(&score) {
                return Err(ApplicationError::InvalidInput(
                    "match_score must be between 0 and 100".to_string(),
                ));
            }
        }

        let insert = InsertApplicationEntity {
            user_id,
            company_id: None,
            job_title,
            company_name,
            location: request.location,
            job_url: request.job_url,
            job_description: request.job_description,
            status: status.to_string(),
            applied_date: request.applied_date,
            match_score: request.match_score,
            match_analysis: request.match_analysis,
            interview_prep_enabled: request.interview_prep_enabled,
            research_status: ResearchStatus::Pending.to_string(),
            notes: request.notes,
        };

        let mut application = self.application_repo.insert(insert).await.map_err(|err| {
            error!(%user_id, db_error = ?err, "applications: failed to insert application");
            ApplicationError::Internal(err)
        })?;
        info!(%user_id, application_id = %application.id, "applications: application created");

        let queued = self.dispatcher.dispatch(EnrichmentTask::ResearchCompany {
            company_name: application.company_name.clone(),
            website: request.company_website,
            application_id: Some(application.id),
        });
        if !queued {
            self.mark_research_failed(application.id).await;
            application.research_status = ResearchStatus::Failed.to_string();
        }

        if triggers_interview_prep(None, status, application.interview_prep_enabled) {
            self.dispatch_interview_prep(application.id);
        }

        Ok(ApplicationDto::from(application))
    }

    pub async fn list(&self, user_id: Uuid) -> UseCaseResult<Vec<ApplicationDto>> {
        let applications = self
            .application_repo
            .list_for_user(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "applications: failed to list applications");
                ApplicationError::Internal(err)
            })?;

        Ok(applications.into_iter().map(ApplicationDto::from).collect())
    }

    pub async fn get(&self, user_id: Uuid, application_id: Uuid) -> UseCaseResult<ApplicationDto> {
        let application = self
            .application_repo
            .find_by_id_for_user(user_id, application_id)
            .await
            .map_err(|err| {
                error!(%user_id, %application_id, db_error = ?err, "applications: failed to load application");
                ApplicationError::Internal(err)
            })?
            .ok_or(ApplicationError::NotFound)?;

        Ok(ApplicationDto::from(application))
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        application_id: Uuid,
        request: UpdateApplicationRequest,
    ) -> UseCaseResult<ApplicationDto> {
        let before = self.get(user_id, application_id).await?;

        let changes = UpdateApplicationEntity {
            location: request.location,
            job_description: request.job_description,
            applied_date: request.applied_date,
            notes: request.notes,
            interview_prep_enabled: request.interview_prep_enabled,
            updated_at: Some(Utc::now()),
        };

        let updated = self
            .application_repo
            .update(user_id, application_id, changes)
            .await
            .map_err(|err| {
                error!(%user_id, %application_id, db_error = ?err, "applications: failed to update application");
                ApplicationError::Internal(err)
            })?
            .ok_or(ApplicationError::NotFound)?;

        let prep_switched_on = !before.interview_prep_enabled && updated.interview_prep_enabled;
        let interviewing =
            ApplicationStatus::from_str(&updated.status) == Some(ApplicationStatus::Interviewing);
        if prep_switched_on && interviewing {
            self.dispatch_interview_prep(application_id);
        }

        Ok(ApplicationDto::from(updated))
    }

    pub async fn update_status(
        &self,
        user_id: Uuid,
        application_id: Uuid,
        raw_status: &str,
    ) -> UseCaseResult<ApplicationDto> {
        let next = ApplicationStatus::from_str(raw_status.trim()).ok_or_else(|| {
            ApplicationError::InvalidInput(format!("unknown status: {raw_status}"))
        })?;

        let before = self.get(user_id, application_id).await?;

        let updated = self
            .application_repo
            .update_status(user_id, application_id, next)
            .await
            .map_err(|err| {
                error!(%user_id, %application_id, db_error = ?err, "applications: failed to update status");
                ApplicationError::Internal(err)
            })?
            .ok_or(ApplicationError::NotFound)?;

        info!(
            %user_id,
            %application_id,
            from = %before.status,
            to = %next,
            "applications: status changed"
        );

        if triggers_interview_prep(Some(before.status), next, updated.interview_prep_enabled) {
            self.dispatch_interview_prep(application_id);
        }

        Ok(ApplicationDto::from(updated))
    }

    /// Manual retry for research that failed or was dropped.
    pub async fn retry_research(
        &self,
        user_id: Uuid,
        application_id: Uuid,
    ) -> UseCaseResult<ApplicationDto> {
        let mut application = self.get(user_id, application_id).await?;
        let previous = application.research_status;

        // Pending must be written before the task can race to done/failed.
        self.application_repo
            .set_research_status(application_id, ResearchStatus::Pending)
            .await
            .map_err(|err| {
                error!(%application_id, db_error = ?err, "applications: failed to reset research status");
                ApplicationError::Internal(err)
            })?;

        let queued = self.dispatcher.dispatch(EnrichmentTask::ResearchCompany {
            company_name: application.company_name.clone(),
            website: None,
            application_id: Some(application_id),
        });
        if !queued {
            if let Err(err) = self
                .application_repo
                .set_research_status(application_id, previous)
                .await
            {
                warn!(%application_id, db_error = ?err, "applications: failed to restore research status");
            }
            return Err(ApplicationError::Busy);
        }

        application.research_status = ResearchStatus::Pending;

        Ok(application)
    }

    fn dispatch_interview_prep(&self, application_id: Uuid) {
        let queued = self
            .dispatcher
            .dispatch(EnrichmentTask::GenerateInterviewPrep { application_id });
        if queued {
            info!(%application_id, "applications: interview prep queued");
        }
    }

    async fn mark_research_failed(&self, application_id: Uuid) {
        if let Err(err) = self
            .application_repo
            .set_research_status(application_id, ResearchStatus::Failed)
            .await
        {
            error!(%application_id, db_error = ?err, "applications: failed to mark research failed");
        }
    }
}
