use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::catalogue::DataLoadError;
use crate::workflows::recommendation::{
    EmbeddingError, ReasoningError, RecommendationError, ReportStoreError,
};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Data(DataLoadError),
    Embedding(EmbeddingError),
    Reasoning(ReasoningError),
    Recommendation(RecommendationError),
    Report(ReportStoreError),
    BadRequest(String),
    NotFound(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Data(err) => write!(f, "data error: {}", err),
            AppError::Embedding(err) => write!(f, "embedding error: {}", err),
            AppError::Reasoning(err) => write!(f, "reasoning error: {}", err),
            AppError::Recommendation(err) => write!(f, "{}", err),
            AppError::Report(err) => write!(f, "report error: {}", err),
            AppError::BadRequest(message) => write!(f, "invalid request: {}", message),
            AppError::NotFound(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Data(err) => Some(err),
            AppError::Embedding(err) => Some(err),
            AppError::Reasoning(err) => Some(err),
            AppError::Recommendation(err) => Some(err),
            AppError::Report(err) => Some(err),
            AppError::BadRequest(_) | AppError::NotFound(_) => None,
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Recommendation(RecommendationError::CustomerNotFound(_))
            | AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Embedding(_) | AppError::Reasoning(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Data(_)
            | AppError::Recommendation(_)
            | AppError::Report(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<DataLoadError> for AppError {
    fn from(value: DataLoadError) -> Self {
        Self::Data(value)
    }
}

impl From<EmbeddingError> for AppError {
    fn from(value: EmbeddingError) -> Self {
        Self::Embedding(value)
    }
}

impl From<ReasoningError> for AppError {
    fn from(value: ReasoningError) -> Self {
        Self::Reasoning(value)
    }
}

impl From<RecommendationError> for AppError {
    fn from(value: RecommendationError) -> Self {
        Self::Recommendation(value)
    }
}

impl From<ReportStoreError> for AppError {
    fn from(value: ReportStoreError) -> Self {
        Self::Report(value)
    }
}
