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

//! Review rows and their display projection.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Store-assigned review identifier.
pub type ReviewId = i64;

/// Catalog movie identifier. Not validated at storage level.
pub type MovieId = i64;

/// A persisted review.
///
/// Immutable once created apart from `updated_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub movie_id: MovieId,
    pub user_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub rating: Decimal,
    pub comment: Option<String>,
    pub review_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Review {
    /// Materialises a validated draft under the given identifier.
    pub fn from_draft(id: ReviewId, draft: ReviewDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            movie_id: draft.movie_id,
            user_name: draft.user_name,
            rating: draft.rating,
            comment: draft.comment,
            review_date: now,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A submission that passed boundary validation.
///
/// Only [`crate::validation::ReviewSubmission::validate`] produces one, so
/// every draft that reaches the store is known to be in range.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewDraft {
    movie_id: MovieId,
    user_name: String,
    rating: Decimal,
    comment: Option<String>,
}

impl ReviewDraft {
    pub(crate) fn new(
        movie_id: MovieId,
        user_name: String,
        rating: Decimal,
        comment: Option<String>,
    ) -> Self {
        Self {
            movie_id,
            user_name,
            rating,
            comment,
        }
    }

    pub fn movie_id(&self) -> MovieId {
        self.movie_id
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn rating(&self) -> Decimal {
        self.rating
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }
}

/// A review enriched with the (possibly placeholder) movie title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewView {
    pub id: ReviewId,
    pub movie_id: MovieId,
    pub movie_title: String,
    pub user_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub rating: Decimal,
    pub comment: Option<String>,
    pub review_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReviewView {
    pub fn new(review: Review, movie_title: impl Into<String>) -> Self {
        Self {
            id: review.id,
            movie_id: review.movie_id,
            movie_title: movie_title.into(),
            user_name: review.user_name,
            rating: review.rating,
            comment: review.comment,
            review_date: review.review_date,
            created_at: review.created_at,
            updated_at: review.updated_at,
        }
    }
}
