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

//! Review submission and queries.

use crate::rating::RatingAggregator;
use crate::store::{RatingCacheStore, ReviewStore};
use marquee_client::MovieServiceClient;
use marquee_common::model::rating::rounded_average;
use marquee_common::{
    MovieId, MovieReviewsPage, PageRequest, RatingSummary, Result, ReviewDraft, ReviewError, ReviewId,
    ReviewView, UNKNOWN_MOVIE_TITLE,
};
use marquee_metrics::{Counter, MetricsCollector};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Coordinates the review store, the rating cache and the movie catalog.
///
/// A submission is accepted once the review row is saved. Updating the
/// rating cache afterwards is best effort: a failure is logged and counted
/// but never undoes the save or fails the request.
pub struct ReviewService {
    reviews: Arc<dyn ReviewStore>,
    aggregator: Arc<RatingAggregator>,
    catalog: MovieServiceClient,
    metrics: Option<Arc<dyn MetricsCollector>>,
}

impl ReviewService {
    pub fn new(
        reviews: Arc<dyn ReviewStore>,
        cache: Arc<dyn RatingCacheStore>,
        catalog: MovieServiceClient,
    ) -> Self {
        let aggregator = Arc::new(RatingAggregator::new(reviews.clone(), cache, catalog.clone()));
        Self {
            reviews,
            aggregator,
            catalog,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn aggregator(&self) -> &Arc<RatingAggregator> {
        &self.aggregator
    }

    pub fn catalog(&self) -> &MovieServiceClient {
        &self.catalog
    }

    /// Stores a validated review and refreshes its movie's rating.
    ///
    /// The movie is looked up first. While the catalog is unavailable the
    /// fallback movie is accepted, so reviews keep flowing and carry the
    /// placeholder title in the response.
    ///
    /// # Errors
    /// [`ReviewError::MovieNotFound`] before anything is written, or a store
    /// error from the save itself.
    pub async fn submit(&self, draft: ReviewDraft) -> Result<ReviewView> {
        let movie_id = draft.movie_id();
        let movie = match self.catalog.get_movie(movie_id).await {
            Ok(movie) => movie,
            Err(err) => {
                tracing::warn!("Rejecting review for movie {}: {}", movie_id, err);
                return Err(err);
            }
        };

        let saved = self.reviews.save(draft).await?;
        tracing::info!(
            "Saved review {} for movie {} by {}",
            saved.id,
            movie_id,
            saved.user_name
        );

        if let Err(err) = self.aggregator.apply_new_review(&saved).await {
            tracing::error!("Rating cache update failed for movie {}: {}", movie_id, err);
            if let Some(metrics) = &self.metrics {
                metrics.increment(Counter::CacheUpdateFailures);
            }
        }

        Ok(ReviewView::new(saved, movie.title))
    }

    /// One page of a movie's reviews, newest first, with the movie-wide
    /// average rating.
    pub async fn reviews_for_movie(&self, movie_id: MovieId, request: PageRequest) -> Result<MovieReviewsPage> {
        let movie = self.catalog.get_movie(movie_id).await?;
        let page = self.reviews.page_by_movie(movie_id, request).await?;
        let average = self
            .reviews
            .rating_totals(movie_id)
            .await?
            .map_or(Decimal::ZERO, |(sum, count)| rounded_average(sum, count));

        let title = movie.title;
        Ok(MovieReviewsPage::new(
            page.map(|review| ReviewView::new(review, title.clone())),
            average,
        ))
    }

    /// A single review. The title degrades to a placeholder whenever the
    /// catalog cannot supply it.
    pub async fn review_by_id(&self, id: ReviewId) -> Result<ReviewView> {
        let review = self
            .reviews
            .find_by_id(id)
            .await?
            .ok_or(ReviewError::ReviewNotFound(id))?;

        let title = match self.catalog.get_movie(review.movie_id).await {
            Ok(movie) => movie.title,
            Err(err) => {
                tracing::warn!("No title for movie {} of review {}: {}", review.movie_id, id, err);
                UNKNOWN_MOVIE_TITLE.to_string()
            }
        };
        Ok(ReviewView::new(review, title))
    }

    pub async fn has_reviews(&self, movie_id: MovieId) -> Result<bool> {
        self.reviews.exists_by_movie(movie_id).await
    }

    pub async fn review_count(&self, movie_id: MovieId) -> Result<u64> {
        self.reviews.count_by_movie(movie_id).await
    }

    pub async fn rating_summary(&self, movie_id: MovieId) -> Result<RatingSummary> {
        self.aggregator.get_summary(movie_id).await
    }
}
