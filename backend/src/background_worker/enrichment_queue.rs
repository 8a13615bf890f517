use std::sync::Arc;

use async_trait::async_trait;
use crates::domain::repositories::{
    applications::ApplicationRepository, companies::CompanyRepository,
};
use tokio::sync::{Semaphore, mpsc};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::usecases::{
    company_research::{CompanyResearchUseCase, ResearchOutcome},
    gateways::{CompanyResearchGateway, GenerativeAiGateway},
    interview_prep::InterviewPrepUseCase,
};

#[derive(Debug, Clone, PartialEq)]
pub enum EnrichmentTask {
    ResearchCompany {
        company_name: String,
        website: Option<String>,
        application_id: Option<Uuid>,
    },
    GenerateInterviewPrep {
        application_id: Uuid,
    },
}

impl EnrichmentTask {
    fn kind(&self) -> &'static str {
        match self {
            EnrichmentTask::ResearchCompany { .. } => "research_company",
            EnrichmentTask::GenerateInterviewPrep { .. } => "generate_interview_prep",
        }
    }
}

/// Hands a task to the background. `false` means it was dropped.
#[cfg_attr(test, mockall::automock)]
pub trait EnrichmentDispatcher: Send + Sync {
    fn dispatch(&self, task: EnrichmentTask) -> bool;
}

#[async_trait]
pub trait EnrichmentHandler: Send + Sync {
    async fn handle(&self, task: EnrichmentTask);
}

#[derive(Clone)]
pub struct EnrichmentQueue {
    tx: mpsc::Sender<EnrichmentTask>,
}

impl EnrichmentQueue {
    pub fn spawn(
        capacity: usize,
        max_concurrency: usize,
        handler: Arc<dyn EnrichmentHandler>,
    ) -> Self {
        let (tx, rx) = mpsc::channel::<EnrichmentTask>(capacity.max(1));
        tokio::spawn(run_enrichment_loop(rx, max_concurrency.max(1), handler));
        Self { tx }
    }
}

impl EnrichmentDispatcher for EnrichmentQueue {
    fn dispatch(&self, task: EnrichmentTask) -> bool {
        let kind = task.kind();
        match self.tx.try_send(task) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(task = kind, "enrichment: queue full, dropping task");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!(task = kind, "enrichment: queue closed, dropping task");
                false
            }
        }
    }
}

async fn run_enrichment_loop(
    mut rx: mpsc::Receiver<EnrichmentTask>,
    max_concurrency: usize,
    handler: Arc<dyn EnrichmentHandler>,
) {
    info!(max_concurrency, "enrichment: worker loop started");
    let limiter = Arc::new(Semaphore::new(max_concurrency));

    while let Some(task) = rx.recv().await {
        let permit = match limiter.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(err) => {
                error!(error = %err, "enrichment: limiter closed, stopping loop");
                break;
            }
        };
        let handler = Arc::clone(&handler);
        tokio::spawn(async move {
            handler.handle(task).await;
            drop(permit);
        });
    }

    info!("enrichment: worker loop stopped");
}

/// Routes queued tasks to the research and interview-prep usecases.
pub struct EnrichmentWorker<A, C, R, G>
where
    A: ApplicationRepository + Send + Sync + 'static,
    C: CompanyRepository + Send + Sync + 'static,
    R: CompanyResearchGateway + 'static,
    G: GenerativeAiGateway + 'static,
{
    research: Arc<CompanyResearchUseCase<C, A, R>>,
    interview_prep: Arc<InterviewPrepUseCase<A, C, G>>,
}

impl<A, C, R, G> EnrichmentWorker<A, C, R, G>
where
    A: ApplicationRepository + Send + Sync + 'static,
    C: CompanyRepository + Send + Sync + 'static,
    R: CompanyResearchGateway + 'static,
    G: GenerativeAiGateway + 'static,
{
    pub fn new(
        research: Arc<CompanyResearchUseCase<C, A, R>>,
        interview_prep: Arc<InterviewPrepUseCase<A, C, G>>,
    ) -> Self {
        Self {
            research,
            interview_prep,
        }
    }
}

#[async_trait]
impl<A, C, R, G> EnrichmentHandler for EnrichmentWorker<A, C, R, G>
where
    A: ApplicationRepository + Send + Sync + 'static,
    C: CompanyRepository + Send + Sync + 'static,
    R: CompanyResearchGateway + 'static,
    G: GenerativeAiGateway + 'static,
{
    async fn handle(&self, task: EnrichmentTask) {
        match task {
            EnrichmentTask::ResearchCompany {
                company_name,
                website,
                application_id,
            } => {
                let outcome = self
                    .research
                    .research_and_link(&company_name, website.as_deref(), application_id)
                    .await;
                match outcome {
                    ResearchOutcome::Failed { reason } => {
                        warn!(%company_name, ?application_id, %reason, "enrichment: research task failed");
                    }
                    outcome => {
                        info!(%company_name, ?application_id, ?outcome, "enrichment: research task finished");
                    }
                }
            }
            EnrichmentTask::GenerateInterviewPrep { application_id } => {
                let stored = self
                    .interview_prep
                    .generate_for_application(application_id)
                    .await;
                info!(%application_id, stored, "enrichment: interview prep task finished");
            }
        }
    }
}
