// Copyright 2025 Marquee Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! HTTP error bodies.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use marquee_common::{FieldViolation, ReviewError};
use serde::{Deserialize, Serialize};

pub const UNAVAILABLE_MESSAGE: &str = "Movie service is currently unavailable. Please try again later.";
pub const INTERNAL_MESSAGE: &str = "An unexpected error occurred. Please try again later.";

/// JSON body of every non-2xx API response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub message: String,
    pub error_code: String,
    pub status: u16,
    pub path: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_errors: Option<Vec<String>>,
}

/// A [`ReviewError`] bound to the request path it occurred on.
#[derive(Debug)]
pub struct ApiError {
    error: ReviewError,
    path: String,
}

impl ApiError {
    pub fn new(error: ReviewError, path: impl Into<String>) -> Self {
        Self {
            error,
            path: path.into(),
        }
    }

    /// A 400 for a request that could not be decoded at all.
    pub fn malformed(field: &str, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(
            ReviewError::Validation(vec![FieldViolation::new(field, message)]),
            path,
        )
    }

    pub fn status(&self) -> StatusCode {
        match &self.error {
            ReviewError::MovieNotFound(_) | ReviewError::ReviewNotFound(_) => StatusCode::NOT_FOUND,
            ReviewError::MovieServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ReviewError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> ErrorResponse {
        let (message, validation_errors) = match &self.error {
            ReviewError::MovieNotFound(_) | ReviewError::ReviewNotFound(_) => (self.error.to_string(), None),
            ReviewError::MovieServiceUnavailable(_) => (UNAVAILABLE_MESSAGE.to_string(), None),
            ReviewError::Validation(violations) => (
                "Validation failed".to_string(),
                Some(violations.iter().map(ToString::to_string).collect()),
            ),
            _ => (INTERNAL_MESSAGE.to_string(), None),
        };

        ErrorResponse {
            message,
            error_code: self.error.error_code().to_string(),
            status: self.status().as_u16(),
            path: self.path.clone(),
            timestamp: Utc::now(),
            validation_errors,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{} on {}", self.error, self.path);
        } else {
            tracing::warn!("{} on {}", self.error, self.path);
        }
        (status, Json(self.body())).into_response()
    }
}
