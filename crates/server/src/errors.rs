use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use models::errors::ModelError;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::error;

/// Request-level failures, rendered as `{"error": <reason>, "message": <detail>}`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    MethodNotAllowed(String),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(errs) => AppError::BadRequest(errs.to_string()),
            ServiceError::NotFound(m) => AppError::NotFound(m),
            ServiceError::Forbidden(m) => AppError::Forbidden(m),
            ServiceError::Model(ModelError::Validation(m)) => AppError::BadRequest(m),
            ServiceError::Db(m) | ServiceError::Model(ModelError::Db(m)) => AppError::Internal(m),
        }
    }
}

impl From<askama::Error> for AppError {
    fn from(e: askama::Error) -> Self { AppError::Internal(format!("template rendering failed: {e}")) }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self { AppError::Internal(format!("page serialization failed: {e}")) }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Internal(detail) => {
                error!(error = %detail, "request failed");
                "Something went wrong on our side.".to_string()
            }
            other => other.to_string(),
        };
        let reason = status.canonical_reason().unwrap_or("Error");
        (status, Json(serde_json::json!({"error": reason, "message": message}))).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("runtime check failed: {0}")]
    Runtime(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::product::FieldErrors;

    #[test]
    fn service_errors_map_to_statuses() {
        assert_eq!(AppError::from(ServiceError::not_found("product", 3)).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::from(ServiceError::Forbidden("no".into())).status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::from(ServiceError::Db("down".into())).status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(AppError::from(ServiceError::Validation(FieldErrors::default())).status(), StatusCode::BAD_REQUEST);
        let model = ServiceError::Model(ModelError::Validation("invalid email".into()));
        assert_eq!(AppError::from(model).status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_keeps_its_message() {
        let e = AppError::from(ServiceError::not_found("product", 9));
        assert_eq!(e.to_string(), "product 9 not found");
    }
}
