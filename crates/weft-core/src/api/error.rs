//! CoreError → HTTP status / envelope.
//!
//! The only place that decides status codes and how much detail leaves the
//! process.

use http::StatusCode;
use tracing::error;

use super::response::{ApiReply, ApiResponse};
use crate::config::Environment;
use crate::domain::{CoreError, FieldErrors};

const INTERNAL_ERROR_MESSAGE: &str = "Internal server error. Please try again later";

#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub errors: Option<FieldErrors>,
}

pub fn status_for(err: &CoreError) -> StatusCode {
    match err {
        CoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        CoreError::Forbidden(_) => StatusCode::FORBIDDEN,
        CoreError::ValidationFailed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        CoreError::BusinessRuleViolation(_) => StatusCode::BAD_REQUEST,
        CoreError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ApiError {
    pub fn from_core(err: CoreError, environment: Environment) -> Self {
        let status = status_for(&err);
        match err {
            CoreError::ValidationFailed { message, fields } => Self {
                status,
                message,
                errors: Some(fields),
            },
            CoreError::Unexpected(detail) => {
                error!(%detail, "unexpected failure");
                let message = if environment.is_production() {
                    INTERNAL_ERROR_MESSAGE.to_string()
                } else {
                    detail
                };
                Self {
                    status,
                    message,
                    errors: None,
                }
            }
            other => Self {
                status,
                message: other.to_string(),
                errors: None,
            },
        }
    }

    pub fn into_reply(self) -> ApiReply {
        let mut body = ApiResponse::failure(self.message);
        if let Some(errors) = self.errors {
            body = body.with_errors(errors);
        }
        ApiReply::new(self.status, body)
    }
}
