use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    response::{IntoResponse, Response},
    http::StatusCode,
};
use serde::Serialize;
use std::time::Duration;

use crate::api::response;

/// Pipeline stage an error is attributed to when reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Input,
    Extraction,
    Translation,
    Summarization,
    Request,
    Config,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    ValidationError(String),

    #[error("Failed to fetch article: {0}")]
    FetchError(String),

    #[error("Error parsing article: {0}")]
    ParseError(String),

    #[error("Translation failed: {0}")]
    TranslationError(String),

    #[error("Summarization failed: {0}")]
    SummarizationError(String),

    #[error("Request timed out after {0:?}")]
    TimeoutError(Duration),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AppError {
    pub fn stage(&self) -> Stage {
        match self {
            AppError::ValidationError(_) => Stage::Input,
            AppError::FetchError(_) | AppError::ParseError(_) => Stage::Extraction,
            AppError::TranslationError(_) => Stage::Translation,
            AppError::SummarizationError(_) => Stage::Summarization,
            AppError::TimeoutError(_) => Stage::Request,
            AppError::ConfigError(_) => Stage::Config,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::FetchError(_) => StatusCode::BAD_GATEWAY,
            AppError::ParseError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::TranslationError(_) => StatusCode::BAD_GATEWAY,
            AppError::SummarizationError(_) => StatusCode::BAD_GATEWAY,
            AppError::TimeoutError(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        response::error(status, self.stage(), self.to_string()).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::FetchError(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_failures_share_a_stage_but_not_a_status() {
        let fetch = AppError::FetchError("connection refused".into());
        let parse = AppError::ParseError("no article body".into());

        assert_eq!(fetch.stage(), Stage::Extraction);
        assert_eq!(parse.stage(), Stage::Extraction);
        assert_eq!(fetch.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(parse.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn timeout_maps_to_gateway_timeout() {
        let err = AppError::TimeoutError(Duration::from_secs(90));
        assert_eq!(err.status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(err.stage(), Stage::Request);
        assert_eq!(err.to_string(), "Request timed out after 90s");
    }

    #[test]
    fn validation_is_the_callers_fault() {
        let err = AppError::ValidationError("Text cannot be empty".into());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.stage(), Stage::Input);
    }
}
