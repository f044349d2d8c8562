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

//! In-memory store implementations.

use super::{RatingCacheStore, ReviewStore};
use async_trait::async_trait;
use chrono::Utc;
use marquee_common::{MovieId, MovieRating, Page, PageRequest, Result, Review, ReviewDraft, ReviewId};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

#[derive(Default)]
struct ReviewTable {
    rows: BTreeMap<ReviewId, Review>,
    by_movie: HashMap<MovieId, Vec<ReviewId>>,
}

impl ReviewTable {
    /// Reviews of one movie, newest first. Ties on the review date fall back
    /// to the id so the order is stable across calls.
    fn newest_first(&self, movie_id: MovieId) -> Vec<&Review> {
        let mut reviews: Vec<&Review> = self
            .by_movie
            .get(&movie_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.rows.get(id))
            .collect();
        reviews.sort_by(|a, b| b.review_date.cmp(&a.review_date).then(b.id.cmp(&a.id)));
        reviews
    }
}

/// Review store backed by a map behind an async `RwLock`.
pub struct InMemoryReviewStore {
    table: RwLock<ReviewTable>,
    next_id: AtomicI64,
}

impl InMemoryReviewStore {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(ReviewTable::default()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Total number of stored reviews across all movies.
    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for InMemoryReviewStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReviewStore for InMemoryReviewStore {
    async fn save(&self, draft: ReviewDraft) -> Result<Review> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let review = Review::from_draft(id, draft, Utc::now());

        let mut table = self.table.write().await;
        table.by_movie.entry(review.movie_id).or_default().push(id);
        table.rows.insert(id, review.clone());
        Ok(review)
    }

    async fn find_by_id(&self, id: ReviewId) -> Result<Option<Review>> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn find_by_movie(&self, movie_id: MovieId) -> Result<Vec<Review>> {
        let table = self.table.read().await;
        Ok(table.newest_first(movie_id).into_iter().cloned().collect())
    }

    async fn page_by_movie(&self, movie_id: MovieId, request: PageRequest) -> Result<Page<Review>> {
        let table = self.table.read().await;
        let all = table.newest_first(movie_id);
        let total = all.len() as u64;
        let items = all
            .into_iter()
            .skip(request.offset())
            .take(request.size as usize)
            .cloned()
            .collect();
        Ok(Page::new(items, request, total))
    }

    async fn count_by_movie(&self, movie_id: MovieId) -> Result<u64> {
        let table = self.table.read().await;
        Ok(table.by_movie.get(&movie_id).map_or(0, |ids| ids.len() as u64))
    }

    async fn exists_by_movie(&self, movie_id: MovieId) -> Result<bool> {
        Ok(self.count_by_movie(movie_id).await? > 0)
    }

    async fn rating_totals(&self, movie_id: MovieId) -> Result<Option<(Decimal, u64)>> {
        let table = self.table.read().await;
        let Some(ids) = table.by_movie.get(&movie_id).filter(|ids| !ids.is_empty()) else {
            return Ok(None);
        };
        let sum: Decimal = ids
            .iter()
            .filter_map(|id| table.rows.get(id))
            .map(|review| review.rating)
            .sum();
        Ok(Some((sum, ids.len() as u64)))
    }
}

/// Rating cache backed by a map behind an async `RwLock`.
#[derive(Default)]
pub struct InMemoryRatingCacheStore {
    rows: RwLock<HashMap<MovieId, MovieRating>>,
}

impl InMemoryRatingCacheStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RatingCacheStore for InMemoryRatingCacheStore {
    async fn find(&self, movie_id: MovieId) -> Result<Option<MovieRating>> {
        Ok(self.rows.read().await.get(&movie_id).cloned())
    }

    async fn exists(&self, movie_id: MovieId) -> Result<bool> {
        Ok(self.rows.read().await.contains_key(&movie_id))
    }

    async fn upsert(&self, rating: MovieRating) -> Result<()> {
        self.rows.write().await.insert(rating.movie_id, rating);
        Ok(())
    }

    async fn insert_if_absent(&self, rating: MovieRating) -> Result<bool> {
        let mut rows = self.rows.write().await;
        if rows.contains_key(&rating.movie_id) {
            return Ok(false);
        }
        rows.insert(rating.movie_id, rating);
        Ok(true)
    }

    async fn delete(&self, movie_id: MovieId) -> Result<()> {
        self.rows.write().await.remove(&movie_id);
        Ok(())
    }
}
