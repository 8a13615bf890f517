use std::{sync::Arc, time::Duration};

use chrono::Utc;
use crates::domain::{
    repositories::{applications::ApplicationRepository, companies::CompanyRepository},
    value_objects::{
        companies::{CompanyDto, is_research_fresh, slugify},
        enums::research_statuses::ResearchStatus,
    },
};
use thiserror::Error;
use tokio::time::timeout;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::gateways::CompanyResearchGateway;

pub const DEFAULT_RESEARCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq)]
pub enum ResearchOutcome {
    /// Fresh cached row reused without calling the research service.
    Cached { company_id: Uuid },
    Researched { company_id: Uuid },
    /// The name produced an empty slug.
    Skipped,
    Failed { reason: String },
}

#[derive(Debug, Error)]
pub enum CompanyError {
    #[error("company not found")]
    NotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CompanyError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            CompanyError::NotFound => StatusCode::NOT_FOUND,
            CompanyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub struct CompanyResearchUseCase<C, A, R>
where
    C: CompanyRepository + Send + Sync + 'static,
    A: ApplicationRepository + Send + Sync + 'static,
    R: CompanyResearchGateway + 'static,
{
    company_repo: Arc<C>,
    application_repo: Arc<A>,
    research_client: Arc<R>,
    research_timeout: Duration,
}

impl<C, A, R> CompanyResearchUseCase<C, A, R>
where
    C: CompanyRepository + Send + Sync + 'static,
    A: ApplicationRepository + Send + Sync + 'static,
    R: CompanyResearchGateway + 'static,
{
    pub fn new(
        company_repo: Arc<C>,
        application_repo: Arc<A>,
        research_client: Arc<R>,
        research_timeout: Duration,
    ) -> Self {
        Self {
            company_repo,
            application_repo,
            research_client,
            research_timeout,
        }
    }

    pub async fn get_company(&self, slug: &str) -> Result<CompanyDto, CompanyError> {
        let company = self
            .company_repo
            .find_by_slug(slug)
            .await
            .map_err(|err| {
                error!(slug, db_error = ?err, "companies: failed to load company");
                CompanyError::Internal(err)
            })?
            .ok_or(CompanyError::NotFound)?;

        Ok(CompanyDto::from(company))
    }

    /// Background task body. Every failure is logged and folded into the
    /// outcome; this never returns an error.
    pub async fn research_and_link(
        &self,
        company_name: &str,
        website: Option<&str>,
        application_id: Option<Uuid>,
    ) -> ResearchOutcome {
        let slug = slugify(company_name);
        if slug.is_empty() {
            info!(company_name, "company_research: empty slug, skipping");
            self.mark(application_id, ResearchStatus::Skipped).await;
            return ResearchOutcome::Skipped;
        }

        let now = Utc::now();
        match self.company_repo.find_by_slug(&slug).await {
            Ok(Some(company)) if is_research_fresh(company.last_researched_at, now) => {
                info!(%slug, company_id = %company.id, "company_research: using cached research");
                if let Some(application_id) = application_id {
                    if let Err(err) = self
                        .application_repo
                        .link_company(application_id, company.id)
                        .await
                    {
                        return self.fail(Some(application_id), &slug, "link failed", err).await;
                    }
                }
                self.mark(application_id, ResearchStatus::Done).await;
                return ResearchOutcome::Cached {
                    company_id: company.id,
                };
            }
            Ok(_) => {}
            Err(err) => {
                warn!(%slug, db_error = ?err, "company_research: cache lookup failed, researching anyway");
            }
        }

        let call = self
            .research_client
            .research(company_name.to_string(), website.map(str::to_string));

        let data = match timeout(self.research_timeout, call).await {
            Err(_) => {
                warn!(
                    %slug,
                    timeout_secs = self.research_timeout.as_secs(),
                    "company_research: research service timed out"
                );
                self.mark(application_id, ResearchStatus::Failed).await;
                return ResearchOutcome::Failed {
                    reason: "timeout".to_string(),
                };
            }
            Ok(Err(err)) => {
                return self.fail(application_id, &slug, "research service failed", err).await;
            }
            Ok(Ok(data)) => data,
        };

        let upsert = data.into_upsert(slug.clone(), company_name, website, Utc::now());
        let company = match self.company_repo.upsert_by_slug(upsert).await {
            Ok(company) => company,
            Err(err) => return self.fail(application_id, &slug, "company upsert failed", err).await,
        };

        if let Some(application_id) = application_id {
            if let Err(err) = self
                .application_repo
                .link_company(application_id, company.id)
                .await
            {
                return self.fail(Some(application_id), &slug, "link failed", err).await;
            }
        }

        self.mark(application_id, ResearchStatus::Done).await;
        info!(%slug, company_id = %company.id, ?application_id, "company_research: researched and linked");

        ResearchOutcome::Researched {
            company_id: company.id,
        }
    }

    async fn fail(
        &self,
        application_id: Option<Uuid>,
        slug: &str,
        reason: &str,
        err: anyhow::Error,
    ) -> ResearchOutcome {
        warn!(slug, ?application_id, error = ?err, "company_research: {reason}");
        self.mark(application_id, ResearchStatus::Failed).await;
        ResearchOutcome::Failed {
            reason: reason.to_string(),
        }
    }

    async fn mark(&self, application_id: Option<Uuid>, status: ResearchStatus) {
        let Some(application_id) = application_id else {
            return;
        };
        if let Err(err) = self
            .application_repo
            .set_research_status(application_id, status)
            .await
        {
            error!(
                %application_id,
                research_status = %status,
                db_error = ?err,
                "company_research: failed to record research status"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::{gateways::MockCompanyResearchGateway, test_support::sample_company};
    use crates::domain::{
        repositories::{
            applications::MockApplicationRepository, companies::MockCompanyRepository,
        },
        value_objects::companies::CompanyResearchData,
    };
    use mockall::predicate::eq;

    fn usecase(
        company_repo: MockCompanyRepository,
        application_repo: MockApplicationRepository,
        research: MockCompanyResearchGateway,
        research_timeout: Duration,
    ) -> CompanyResearchUseCase<MockCompanyRepository, MockApplicationRepository, MockCompanyResearchGateway>
    {
        CompanyResearchUseCase::new(
            Arc::new(company_repo),
            Arc::new(application_repo),
            Arc::new(research),
            research_timeout,
        )
    }

    #[tokio::test]
    async fn fresh_cache_links_without_calling_the_service() {
        let application_id = Uuid::new_v4();
        let cached = sample_company("acme-inc", 5);
        let cached_id = cached.id;

        let mut company_repo = MockCompanyRepository::new();
        company_repo
            .expect_find_by_slug()
            .times(1)
            .returning(move |slug| {
                assert_eq!(slug, "acme-inc");
                Ok(Some(cached.clone()))
            });

        let mut application_repo = MockApplicationRepository::new();
        application_repo
            .expect_link_company()
            .with(eq(application_id), eq(cached_id))
            .times(1)
            .returning(|_, _| Ok(()));
        application_repo
            .expect_set_research_status()
            .with(eq(application_id), eq(ResearchStatus::Done))
            .times(1)
            .returning(|_, _| Ok(()));

        // No expectation set: any call panics.
        let research = MockCompanyResearchGateway::new();

        let outcome = usecase(company_repo, application_repo, research, DEFAULT_RESEARCH_TIMEOUT)
            .research_and_link("Acme, Inc.", None, Some(application_id))
            .await;

        assert_eq!(outcome, ResearchOutcome::Cached { company_id: cached_id });
    }

    #[tokio::test]
    async fn stale_cache_is_refreshed_through_upsert() {
        let application_id = Uuid::new_v4();
        let refreshed = sample_company("acme-inc", 0);
        let refreshed_id = refreshed.id;

        let mut company_repo = MockCompanyRepository::new();
        company_repo
            .expect_find_by_slug()
            .returning(|_| Ok(Some(sample_company("acme-inc", 45))));
        company_repo
            .expect_upsert_by_slug()
            .times(1)
            .returning(move |upsert| {
                assert_eq!(upsert.slug, "acme-inc");
                assert!(upsert.last_researched_at.is_some());
                Ok(refreshed.clone())
            });

        let mut research = MockCompanyResearchGateway::new();
        research
            .expect_research()
            .times(1)
            .returning(|name, website| {
                assert_eq!(name, "Acme Inc");
                assert_eq!(website.as_deref(), Some("https://acme.test"));
                Ok(CompanyResearchData {
                    name: Some("Acme Inc".into()),
                    ..Default::default()
                })
            });

        let mut application_repo = MockApplicationRepository::new();
        application_repo
            .expect_link_company()
            .with(eq(application_id), eq(refreshed_id))
            .times(1)
            .returning(|_, _| Ok(()));
        application_repo
            .expect_set_research_status()
            .with(eq(application_id), eq(ResearchStatus::Done))
            .times(1)
            .returning(|_, _| Ok(()));

        let outcome = usecase(company_repo, application_repo, research, DEFAULT_RESEARCH_TIMEOUT)
            .research_and_link("Acme Inc", Some("https://acme.test"), Some(application_id))
            .await;

        assert_eq!(outcome, ResearchOutcome::Researched { company_id: refreshed_id });
    }

    struct SlowResearch;

    #[async_trait::async_trait]
    impl CompanyResearchGateway for SlowResearch {
        async fn research(
            &self,
            _company_name: String,
            _website: Option<String>,
        ) -> anyhow::Result<CompanyResearchData> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(CompanyResearchData::default())
        }
    }

    #[tokio::test]
    async fn timeout_leaves_company_unlinked_and_returns_no_error() {
        let application_id = Uuid::new_v4();

        let mut company_repo = MockCompanyRepository::new();
        company_repo.expect_find_by_slug().returning(|_| Ok(None));
        company_repo.expect_upsert_by_slug().never();

        let mut application_repo = MockApplicationRepository::new();
        application_repo.expect_link_company().never();
        application_repo
            .expect_set_research_status()
            .with(eq(application_id), eq(ResearchStatus::Failed))
            .times(1)
            .returning(|_, _| Ok(()));

        let usecase = CompanyResearchUseCase::new(
            Arc::new(company_repo),
            Arc::new(application_repo),
            Arc::new(SlowResearch),
            Duration::from_millis(20),
        );

        let outcome = usecase
            .research_and_link("Acme Inc", None, Some(application_id))
            .await;

        assert_eq!(
            outcome,
            ResearchOutcome::Failed {
                reason: "timeout".to_string()
            }
        );
    }

    #[tokio::test]
    async fn service_failure_is_swallowed() {
        let mut company_repo = MockCompanyRepository::new();
        company_repo.expect_find_by_slug().returning(|_| Ok(None));
        company_repo.expect_upsert_by_slug().never();

        let mut research = MockCompanyResearchGateway::new();
        research
            .expect_research()
            .returning(|_, _| Err(anyhow::anyhow!("success=false")));

        let application_repo = MockApplicationRepository::new();

        let outcome = usecase(company_repo, application_repo, research, DEFAULT_RESEARCH_TIMEOUT)
            .research_and_link("Acme Inc", None, None)
            .await;

        assert_eq!(
            outcome,
            ResearchOutcome::Failed {
                reason: "research service failed".to_string()
            }
        );
    }

    #[tokio::test]
    async fn blank_name_is_skipped() {
        let application_id = Uuid::new_v4();
        let company_repo = MockCompanyRepository::new();
        let research = MockCompanyResearchGateway::new();
        let mut application_repo = MockApplicationRepository::new();
        application_repo
            .expect_set_research_status()
            .with(eq(application_id), eq(ResearchStatus::Skipped))
            .times(1)
            .returning(|_, _| Ok(()));

        let outcome = usecase(company_repo, application_repo, research, DEFAULT_RESEARCH_TIMEOUT)
            .research_and_link(" -- ", None, Some(application_id))
            .await;

        assert_eq!(outcome, ResearchOutcome::Skipped);
    }
}
