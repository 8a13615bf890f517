use std::sync::Arc;

use chrono::Utc;
use crates::{
    ai::prompts::{self, JobContext},
    domain::{
        entities::applications::ApplicationEntity,
        repositories::{applications::ApplicationRepository, companies::CompanyRepository},
        value_objects::{
            companies::slugify,
            interview_prep::{AnswerFeedbackRequest, InterviewFeedback, InterviewQuestions},
        },
    },
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::gateways::GenerativeAiGateway;

#[derive(Debug, Error)]
pub enum InterviewPrepError {
    #[error("application not found")]
    NotFound,
    #[error("{0}")]
    InvalidInput(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl InterviewPrepError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            InterviewPrepError::NotFound => StatusCode::NOT_FOUND,
            InterviewPrepError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            InterviewPrepError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub struct InterviewPrepUseCase<A, C, G>
where
    A: ApplicationRepository + Send + Sync + 'static,
    C: CompanyRepository + Send + Sync + 'static,
    G: GenerativeAiGateway + 'static,
{
    application_repo: Arc<A>,
    company_repo: Arc<C>,
    ai: Arc<G>,
}

impl<A, C, G> InterviewPrepUseCase<A, C, G>
where
    A: ApplicationRepository + Send + Sync + 'static,
    C: CompanyRepository + Send + Sync + 'static,
    G: GenerativeAiGateway + 'static,
{
    pub fn new(application_repo: Arc<A>, company_repo: Arc<C>, ai: Arc<G>) -> Self {
        Self {
            application_repo,
            company_repo,
            ai,
        }
    }

    /// Detached generation. Returns whether a bundle was stored.
    pub async fn generate_for_application(&self, application_id: Uuid) -> bool {
        let application = match self.application_repo.find_by_id(application_id).await {
            Ok(Some(application)) => application,
            Ok(None) => {
                warn!(%application_id, "interview_prep: application vanished before generation");
                return false;
            }
            Err(err) => {
                error!(%application_id, db_error = ?err, "interview_prep: failed to load application");
                return false;
            }
        };

        match self.generate_and_store(&application).await {
            Ok(_) => true,
            Err(err) => {
                error!(%application_id, db_error = ?err, "interview_prep: failed to store questions");
                false
            }
        }
    }

    pub async fn regenerate(
        &self,
        user_id: Uuid,
        application_id: Uuid,
    ) -> Result<InterviewQuestions, InterviewPrepError> {
        let application = self.load_owned(user_id, application_id).await?;
        let questions = self.generate_and_store(&application).await?;
        Ok(questions)
    }

    pub async fn answer_feedback(
        &self,
        user_id: Uuid,
        application_id: Uuid,
        request: AnswerFeedbackRequest,
    ) -> Result<InterviewFeedback, InterviewPrepError> {
        if request.question.trim().is_empty() || request.answer.trim().is_empty() {
            return Err(InterviewPrepError::InvalidInput(
                "question and answer are required".to_string(),
            ));
        }

        let application = self.load_owned(user_id, application_id).await?;
        let prompt = prompts::answer_feedback(
            &application.job_title,
            &application.company_name,
            request.question.trim(),
            request.answer.trim(),
        );

        let feedback = match self.ai.complete_json(prompt).await {
            Ok(text) => InterviewFeedback::parse(&text).unwrap_or_else(|err| {
                warn!(%application_id, error = %err, "interview_prep: malformed feedback, using fallback");
                InterviewFeedback::fallback()
            }),
            Err(err) => {
                warn!(%application_id, error = ?err, "interview_prep: feedback call failed, using fallback");
                InterviewFeedback::fallback()
            }
        };

        Ok(feedback)
    }

    async fn load_owned(
        &self,
        user_id: Uuid,
        application_id: Uuid,
    ) -> Result<ApplicationEntity, InterviewPrepError> {
        self.application_repo
            .find_by_id_for_user(user_id, application_id)
            .await
            .map_err(|err| {
                error!(%user_id, %application_id, db_error = ?err, "interview_prep: failed to load application");
                InterviewPrepError::Internal(err)
            })?
            .ok_or(InterviewPrepError::NotFound)
    }

    async fn generate_and_store(
        &self,
        application: &ApplicationEntity,
    ) -> anyhow::Result<InterviewQuestions> {
        let company_summary = self.company_summary(&application.company_name).await;
        let job = JobContext {
            job_title: &application.job_title,
            company_name: &application.company_name,
            location: application.location.as_deref(),
            description: application.job_description.as_deref().unwrap_or_default(),
        };
        let prompt = prompts::interview_questions(&job, company_summary.as_deref());

        let questions = match self.ai.complete_json(prompt).await {
            Ok(text) => InterviewQuestions::parse(&text).unwrap_or_else(|err| {
                warn!(application_id = %application.id, error = %err, "interview_prep: malformed questions, using fallback");
                InterviewQuestions::fallback(&application.job_title, &application.company_name)
            }),
            Err(err) => {
                warn!(application_id = %application.id, error = ?err, "interview_prep: generation failed, using fallback");
                InterviewQuestions::fallback(&application.job_title, &application.company_name)
            }
        };

        self.application_repo
            .save_interview_questions(application.id, serde_json::to_value(&questions)?, Utc::now())
            .await?;

        info!(application_id = %application.id, "interview_prep: questions stored");
        Ok(questions)
    }

    async fn company_summary(&self, company_name: &str) -> Option<String> {
        let slug = slugify(company_name);
        if slug.is_empty() {
            return None;
        }
        match self.company_repo.find_by_slug(&slug).await {
            Ok(company) => company.and_then(|c| c.culture_summary.or(c.description)),
            Err(err) => {
                warn!(%slug, db_error = ?err, "interview_prep: company lookup failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::{
        gateways::MockGenerativeAiGateway,
        test_support::{sample_application, sample_company},
    };
    use crates::domain::repositories::{
        applications::MockApplicationRepository, companies::MockCompanyRepository,
    };
    use mockall::predicate::eq;

    #[tokio::test]
    async fn generation_falls_back_on_malformed_ai_output() {
        let user_id = Uuid::new_v4();
        let application_id = Uuid::new_v4();
        let application = sample_application(user_id, application_id);

        let mut application_repo = MockApplicationRepository::new();
        application_repo
            .expect_find_by_id()
            .with(eq(application_id))
            .returning(move |_| Ok(Some(application.clone())));
        application_repo
            .expect_save_interview_questions()
            .times(1)
            .returning(move |id, questions, _| {
                assert_eq!(id, application_id);
                let stored: InterviewQuestions = serde_json::from_value(questions).unwrap();
                assert_eq!(stored, InterviewQuestions::fallback("Backend Engineer", "Acme Inc"));
                Ok(())
            });

        let mut company_repo = MockCompanyRepository::new();
        company_repo.expect_find_by_slug().returning(|_| Ok(None));

        let mut ai = MockGenerativeAiGateway::new();
        ai.expect_complete_json()
            .times(1)
            .returning(|_| Ok("I cannot help with that.".to_string()));

        let usecase =
            InterviewPrepUseCase::new(Arc::new(application_repo), Arc::new(company_repo), Arc::new(ai));

        assert!(usecase.generate_for_application(application_id).await);
    }

    #[tokio::test]
    async fn generation_uses_cached_company_notes() {
        let user_id = Uuid::new_v4();
        let application_id = Uuid::new_v4();
        let application = sample_application(user_id, application_id);

        let mut application_repo = MockApplicationRepository::new();
        application_repo
            .expect_find_by_id_for_user()
            .with(eq(user_id), eq(application_id))
            .returning(move |_, _| Ok(Some(application.clone())));
        application_repo
            .expect_save_interview_questions()
            .times(1)
            .returning(|_, _, _| Ok(()));

        let mut company_repo = MockCompanyRepository::new();
        company_repo
            .expect_find_by_slug()
            .returning(|_| Ok(Some(sample_company("acme-inc", 3))));

        let mut ai = MockGenerativeAiGateway::new();
        ai.expect_complete_json().times(1).returning(|prompt| {
            assert!(prompt.contains("Fast-paced"));
            Ok(r#"{"behavioral": [{"question": "Tell me about a outage.", "tip": "Be specific."}],
                   "technical": [], "company_specific": [], "questions_to_ask": ["Team size?"]}"#
                .to_string())
        });

        let usecase =
            InterviewPrepUseCase::new(Arc::new(application_repo), Arc::new(company_repo), Arc::new(ai));

        let questions = usecase.regenerate(user_id, application_id).await.unwrap();
        assert_eq!(questions.behavioral.len(), 1);
        assert_eq!(questions.questions_to_ask, vec!["Team size?".to_string()]);
    }

    #[tokio::test]
    async fn feedback_never_fails_for_ai_reasons() {
        let user_id = Uuid::new_v4();
        let application_id = Uuid::new_v4();
        let application = sample_application(user_id, application_id);

        let mut application_repo = MockApplicationRepository::new();
        application_repo
            .expect_find_by_id_for_user()
            .returning(move |_, _| Ok(Some(application.clone())));

        let mut ai = MockGenerativeAiGateway::new();
        ai.expect_complete_json()
            .returning(|_| Err(anyhow::anyhow!("overloaded")));

        let usecase = InterviewPrepUseCase::new(
            Arc::new(application_repo),
            Arc::new(MockCompanyRepository::new()),
            Arc::new(ai),
        );

        let feedback = usecase
            .answer_feedback(
                user_id,
                application_id,
                AnswerFeedbackRequest {
                    question: "Why us?".to_string(),
                    answer: "Because.".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(feedback, InterviewFeedback::fallback());
    }

    #[tokio::test]
    async fn feedback_for_someone_elses_application_is_not_found() {
        let mut application_repo = MockApplicationRepository::new();
        application_repo
            .expect_find_by_id_for_user()
            .returning(|_, _| Ok(None));

        let usecase = InterviewPrepUseCase::new(
            Arc::new(application_repo),
            Arc::new(MockCompanyRepository::new()),
            Arc::new(MockGenerativeAiGateway::new()),
        );

        let result = usecase
            .answer_feedback(
                Uuid::new_v4(),
                Uuid::new_v4(),
                AnswerFeedbackRequest {
                    question: "Why us?".to_string(),
                    answer: "Because.".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(InterviewPrepError::NotFound)));
    }
}
