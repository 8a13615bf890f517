use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::usecases::{
    applications::ApplicationError, company_research::CompanyError,
    deletion_policy::DeletionError, interview_prep::InterviewPrepError, profile::ProfileError,
    subscriptions::SubscriptionError,
};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
}

pub fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    let body = Json(ErrorResponse {
        code: status.as_u16(),
        message: message.into(),
    });
    (status, body).into_response()
}

/// Router-level failures that happen before a usecase runs.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest(msg) => json_error(StatusCode::BAD_REQUEST, msg),
            AppError::Internal(err) => {
                error!(error = ?err, "http: internal error");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

/// Usecase errors that know their HTTP status.
pub trait HttpError: std::error::Error {
    fn status(&self) -> StatusCode;
}

macro_rules! impl_http_error {
    ($($ty:ty),+ $(,)?) => {
        $(impl HttpError for $ty {
            fn status(&self) -> StatusCode {
                self.status_code()
            }
        })+
    };
}

impl_http_error!(
    ApplicationError,
    CompanyError,
    DeletionError,
    InterviewPrepError,
    ProfileError,
    SubscriptionError,
);

/// Maps a usecase error to `{code, message}`. 500s never carry the detail.
pub fn map_error<E: HttpError>(operation: &str, err: E) -> Response {
    let status = err.status();
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!(operation, error = ?err, "http: request failed");
        return json_error(status, "Internal server error");
    }

    warn!(operation, status = status.as_u16(), error = %err, "http: request rejected");
    json_error(status, err.to_string())
}
