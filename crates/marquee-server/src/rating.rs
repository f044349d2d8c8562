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

//! Rating aggregation.
//!
//! The rating cache holds one [`MovieRating`] row per movie. Rows are always
//! rebuilt from the full review set, never adjusted incrementally, so the
//! cache converges to the review store even after a failed update:
//!
//! ```text
//! write path:  save review ──> recompute(movie) ──> upsert row | delete row
//! read path:   cache hit ──> summary
//!              cache miss ──> recompute(movie) ──> summary | empty summary
//! ```
//!
//! Recomputations for the same movie are serialised by a keyed async mutex;
//! different movies proceed in parallel.

use crate::store::{RatingCacheStore, ReviewStore};
use chrono::{DateTime, Utc};
use marquee_client::MovieServiceClient;
use marquee_common::model::rating::{rounded_average, star_bucket};
use marquee_common::{MovieId, MovieRating, RatingSummary, Result, Review, ReviewError};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OwnedMutexGuard;

/// Builds the cache row for a movie from its complete review set.
///
/// Returns `None` when there are no reviews: such a movie has no row.
pub fn compute_rating(movie_id: MovieId, reviews: &[Review], now: DateTime<Utc>) -> Option<MovieRating> {
    if reviews.is_empty() {
        return None;
    }

    let mut row = MovieRating::new(movie_id, now);
    let mut sum = Decimal::ZERO;
    for review in reviews {
        sum += review.rating;
        if let Some(stars) = star_bucket(review.rating) {
            row.increment(stars);
        }
    }
    row.total_reviews = reviews.len() as u32;
    row.average_rating = rounded_average(sum, reviews.len() as u64);
    Some(row)
}

/// Rows agree on everything but `last_updated`.
fn same_aggregate(a: &MovieRating, b: &MovieRating) -> bool {
    a.average_rating == b.average_rating
        && a.total_reviews == b.total_reviews
        && a.distribution() == b.distribution()
}

/// Per-movie async locks. Idle entries are pruned on every acquisition.
#[derive(Default)]
struct MovieLocks {
    slots: parking_lot::Mutex<HashMap<MovieId, Arc<tokio::sync::Mutex<()>>>>,
}

impl MovieLocks {
    async fn lock(&self, movie_id: MovieId) -> OwnedMutexGuard<()> {
        let slot = {
            let mut slots = self.slots.lock();
            // a slot only referenced by the map is idle
            slots.retain(|_, slot| Arc::strong_count(slot) > 1);
            slots.entry(movie_id).or_default().clone()
        };
        slot.lock_owned().await
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.slots.lock().len()
    }
}

/// Maintains the rating cache and answers rating summaries.
pub struct RatingAggregator {
    reviews: Arc<dyn ReviewStore>,
    cache: Arc<dyn RatingCacheStore>,
    catalog: MovieServiceClient,
    locks: MovieLocks,
}

impl RatingAggregator {
    pub fn new(
        reviews: Arc<dyn ReviewStore>,
        cache: Arc<dyn RatingCacheStore>,
        catalog: MovieServiceClient,
    ) -> Self {
        Self {
            reviews,
            cache,
            catalog,
            locks: MovieLocks::default(),
        }
    }

    /// Rating summary for a movie.
    ///
    /// The title comes from the catalog's primary read path, so a fallback
    /// title is served while the catalog is unavailable. A cache miss
    /// triggers a recomputation; a movie without reviews gets
    /// [`RatingSummary::empty`].
    ///
    /// # Errors
    /// [`ReviewError::MovieNotFound`] when the catalog does not know the
    /// movie, or a store error.
    pub async fn get_summary(&self, movie_id: MovieId) -> Result<RatingSummary> {
        let movie = self.catalog.get_movie(movie_id).await?;

        let row = match self.cache.find(movie_id).await? {
            Some(row) => Some(row),
            None => {
                tracing::debug!("Rating cache miss for movie {}", movie_id);
                self.recompute(movie_id).await?
            }
        };

        Ok(match row {
            Some(row) => RatingSummary::from_cache(&row, movie.title),
            None => RatingSummary::empty(movie_id, movie.title),
        })
    }

    /// Folds a newly saved review into its movie's cache row.
    ///
    /// # Errors
    /// [`ReviewError::CacheUpdate`] wrapping the store failure.
    pub async fn apply_new_review(&self, review: &Review) -> Result<()> {
        self.recompute(review.movie_id)
            .await
            .map(|_| ())
            .map_err(|e| ReviewError::CacheUpdate(format!("movie {}: {}", review.movie_id, e)))
    }

    /// Rebuilds a movie's row from its reviews, deleting it when there are
    /// none. Returns the row now in the cache.
    pub async fn recompute(&self, movie_id: MovieId) -> Result<Option<MovieRating>> {
        let _guard = self.locks.lock(movie_id).await;

        let reviews = self.reviews.find_by_movie(movie_id).await?;
        match compute_rating(movie_id, &reviews, Utc::now()) {
            Some(row) => {
                if let Some(current) = self.cache.find(movie_id).await? {
                    if same_aggregate(&current, &row) {
                        return Ok(Some(current));
                    }
                }
                self.cache.upsert(row.clone()).await?;
                tracing::info!(
                    "Updated rating for movie {}: avg={}, total={}",
                    movie_id,
                    row.average_rating,
                    row.total_reviews
                );
                Ok(Some(row))
            }
            None => {
                self.cache.delete(movie_id).await?;
                Ok(None)
            }
        }
    }

    /// Creates a zero row for a movie that has none. Existing rows are left
    /// untouched.
    pub async fn initialize(&self, movie_id: MovieId) -> Result<()> {
        let _guard = self.locks.lock(movie_id).await;
        if self.cache.insert_if_absent(MovieRating::new(movie_id, Utc::now())).await? {
            tracing::info!("Initialized rating for movie {}", movie_id);
        }
        Ok(())
    }

    /// Drops a movie's row.
    pub async fn delete(&self, movie_id: MovieId) -> Result<()> {
        let _guard = self.locks.lock(movie_id).await;
        self.cache.delete(movie_id).await?;
        tracing::info!("Deleted rating for movie {}", movie_id);
        Ok(())
    }
}
