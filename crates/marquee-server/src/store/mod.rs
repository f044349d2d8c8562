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

//! Persistence seams for reviews and the per-movie rating cache.
//!
//! Both stores are async traits so a database-backed implementation can be
//! swapped in without touching the aggregator or the service. The in-memory
//! implementations in [`memory`] back the server binary and the tests.

pub mod memory;

use async_trait::async_trait;
use marquee_common::{MovieId, MovieRating, Page, PageRequest, Result, Review, ReviewDraft, ReviewId};
use rust_decimal::Decimal;

pub use memory::{InMemoryRatingCacheStore, InMemoryReviewStore};

/// Durable review records.
///
/// Reviews are immutable once saved; the store assigns ids and timestamps.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Persists a validated draft and returns the stored review.
    async fn save(&self, draft: ReviewDraft) -> Result<Review>;

    async fn find_by_id(&self, id: ReviewId) -> Result<Option<Review>>;

    /// All reviews of a movie, newest first.
    async fn find_by_movie(&self, movie_id: MovieId) -> Result<Vec<Review>>;

    /// One page of a movie's reviews, newest first.
    async fn page_by_movie(&self, movie_id: MovieId, request: PageRequest) -> Result<Page<Review>>;

    async fn count_by_movie(&self, movie_id: MovieId) -> Result<u64>;

    async fn exists_by_movie(&self, movie_id: MovieId) -> Result<bool>;

    /// Raw sum and count of a movie's ratings, `None` when it has no reviews.
    async fn rating_totals(&self, movie_id: MovieId) -> Result<Option<(Decimal, u64)>>;
}

/// Derived per-movie rating rows.
///
/// The cache is rebuildable from [`ReviewStore`] at any time.
#[async_trait]
pub trait RatingCacheStore: Send + Sync {
    async fn find(&self, movie_id: MovieId) -> Result<Option<MovieRating>>;

    async fn exists(&self, movie_id: MovieId) -> Result<bool>;

    /// Inserts or replaces the row for `rating.movie_id`.
    async fn upsert(&self, rating: MovieRating) -> Result<()>;

    /// Inserts the row only when none exists. Returns whether it was inserted.
    async fn insert_if_absent(&self, rating: MovieRating) -> Result<bool>;

    /// Removes the row. Removing a missing row is not an error.
    async fn delete(&self, movie_id: MovieId) -> Result<()>;
}
