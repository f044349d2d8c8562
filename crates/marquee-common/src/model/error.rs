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

//! Error type shared by every Marquee crate.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A single rejected field from boundary validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// Wire name of the field (`movieId`, `userName`, ...)
    pub field: String,
    /// Human readable reason
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("Movie not found with ID: {0}")]
    MovieNotFound(i64),

    #[error("Movie service unavailable: {0}")]
    MovieServiceUnavailable(String),

    #[error("Review not found with ID: {0}")]
    ReviewNotFound(i64),

    #[error("Validation failed: {}", join_violations(.0))]
    Validation(Vec<FieldViolation>),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Rating cache update failed: {0}")]
    CacheUpdate(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl ReviewError {
    /// Returns true when the catalog did not answer correctly, as opposed to
    /// answering that the movie does not exist.
    pub fn is_availability_fault(&self) -> bool {
        matches!(self, ReviewError::MovieServiceUnavailable(_))
    }

    /// Stable code rendered in HTTP error bodies.
    pub fn error_code(&self) -> &'static str {
        match self {
            ReviewError::MovieNotFound(_) => "MOVIE_NOT_FOUND",
            ReviewError::ReviewNotFound(_) => "REVIEW_NOT_FOUND",
            ReviewError::MovieServiceUnavailable(_) => "MOVIE_SERVICE_UNAVAILABLE",
            ReviewError::Validation(_) => "VALIDATION_ERROR",
            _ => "INTERNAL_SERVER_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, ReviewError>;
