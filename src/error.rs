use http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FacetError {
    #[error("Field not configured in corpus: {0}")]
    FieldNotConfigured(String),

    #[error("Invalid corpus: {0}")]
    InvalidCorpus(String),

    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, FacetError>;

impl From<std::io::Error> for FacetError {
    fn from(e: std::io::Error) -> Self {
        FacetError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for FacetError {
    fn from(e: serde_json::Error) -> Self {
        FacetError::Json(e.to_string())
    }
}

impl FacetError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            FacetError::FieldNotConfigured(_) => StatusCode::INTERNAL_SERVER_ERROR,
            FacetError::InvalidCorpus(_) => StatusCode::BAD_REQUEST,
            FacetError::InvalidCatalog(_) => StatusCode::BAD_REQUEST,
            FacetError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            FacetError::Json(_) => StatusCode::BAD_REQUEST,
            FacetError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            FacetError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code used in error bodies and metric labels.
    pub fn error_code(&self) -> &'static str {
        match self {
            FacetError::FieldNotConfigured(_) => "field_not_configured",
            FacetError::InvalidCorpus(_) => "invalid_corpus",
            FacetError::InvalidCatalog(_) => "invalid_catalog",
            FacetError::Io(_) => "io_error",
            FacetError::Json(_) => "json_error",
            FacetError::Config(_) => "config_error",
            FacetError::Internal(_) => "internal_error",
        }
    }
}


// Axum IntoResponse implementation (feature-gated)
#[cfg(feature = "axum-support")]
use axum::response::{IntoResponse, Json, Response};
#[cfg(feature = "axum-support")]
use serde::Serialize;

#[cfg(feature = "axum-support")]
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

#[cfg(feature = "axum-support")]
impl IntoResponse for FacetError {
    fn into_response(self) -> Response {
        let suggestion = match &self {
            FacetError::InvalidCorpus(_) => Some(
                "Send a JSON array of items or an object with an `items` array".to_string(),
            ),
            FacetError::InvalidCatalog(_) => Some(
                "Send an object with `makes`, `models`, `fuelTypes`, `transmissionTypes` and `bodyTypes` arrays"
                    .to_string(),
            ),
            FacetError::Json(_) => Some("Check the request body is valid JSON".to_string()),
            _ => None,
        };

        let error_response = ErrorResponse {
            error: self.error_code().to_string(),
            message: self.to_string(),
            request_id: format!("req_cf_{}", uuid::Uuid::new_v4()),
            suggestion,
        };

        (self.status_code(), Json(error_response)).into_response()
    }
}
