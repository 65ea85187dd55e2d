// SPDX-License-Identifier: GPL-3.0-only
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, warn};

use crate::registry::{ConflictKind, RegistryError};
use crate::validation::{FieldError, ValidationErrors};

/// Failure returned by every API route, rendered as [`ErrorBody`]
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: &'static str,
    message: String,
    kind: Option<ConflictKind>,
    errors: Vec<FieldError>,
    path: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub timestamp: DateTime<Utc>,
    pub status: u16,
    pub error: &'static str,
    pub message: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ConflictKind>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

impl ApiError {
    fn new(status: StatusCode, error: &'static str, message: String) -> Self {
        Self {
            status,
            error,
            message,
            kind: None,
            errors: Vec::new(),
            path: String::new(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Bad Request", message.into())
    }

    /// Record the request path the error is reported for
    pub fn at(mut self, uri: &Uri) -> Self {
        self.path = uri.path().to_string();
        self
    }

    #[cfg(test)]
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        let message = err.to_string();
        match err {
            RegistryError::NotFound { .. } => {
                Self::new(StatusCode::NOT_FOUND, "Object not found", message)
            }
            RegistryError::Conflict(conflict) => {
                let mut api_error = Self::new(StatusCode::CONFLICT, "Conflict", message);
                api_error.kind = Some(conflict.kind());
                api_error
            }
            RegistryError::Store(e) => {
                // Store details stay in the log
                error!(error = %e, "Spot store failure");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error",
                    "An unexpected error occurred".to_string(),
                )
            }
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(err: ValidationErrors) -> Self {
        let mut api_error = Self::bad_request(err.to_string());
        api_error.errors = err.0;
        api_error
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = self.status.as_u16(), path = %self.path, "Request failed");
        } else {
            warn!(
                status = self.status.as_u16(),
                path = %self.path,
                message = %self.message,
                "Request rejected"
            );
        }

        let body = ErrorBody {
            timestamp: Utc::now(),
            status: self.status.as_u16(),
            error: self.error,
            message: self.message,
            path: self.path,
            kind: self.kind,
            errors: self.errors,
        };

        (self.status, Json(body)).into_response()
    }
}
