use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use docchat::errors::{AgentError, TranslationError};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::store::StoreError;

pub const ENV_PREFIX: &str = "DOCCHAT";

/// Environment variable that sets a dotted configuration key
pub fn to_env_var(field: &str) -> String {
    format!("{}_{}", ENV_PREFIX, field.to_uppercase().replace('.', "__"))
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required configuration, set {env_var}")]
    MissingEnvVar { env_var: String },

    #[error("Invalid server address: {0}")]
    InvalidAddress(String),

    #[error(transparent)]
    Other(#[from] config::ConfigError),
}

/// Errors a request handler can end with
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("translation error: {0}")]
    Translation(#[from] TranslationError),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, client_message) = match &self {
            ServerError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
            ServerError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
            ServerError::Translation(e) => {
                error!(error = %e, "conversation could not be persisted");
                (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
            }
            ServerError::Provider(m) => {
                error!(message = %m, "model provider error");
                (StatusCode::BAD_GATEWAY, "model provider error".to_owned())
            }
            ServerError::Store(e) => {
                error!(error = %e, "store error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_owned(),
                )
            }
            ServerError::Internal(m) => {
                error!(message = %m, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_owned(),
                )
            }
        };
        (status, Json(json!({ "error": client_message }))).into_response()
    }
}

impl From<AgentError> for ServerError {
    fn from(e: AgentError) -> Self {
        match e {
            AgentError::Translation(e) => ServerError::Translation(e),
            AgentError::Provider(e) => ServerError::Provider(format!("{:#}", e)),
            other => ServerError::Internal(other.to_string()),
        }
    }
}
