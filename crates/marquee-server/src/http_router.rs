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

//! REST routes of the review service.
//!
//! | Method | Path | Handler |
//! |---|---|---|
//! | POST | `/api/v1/reviews` | submit a review (201) |
//! | GET | `/api/v1/reviews/{reviewId}` | one review |
//! | GET | `/api/v1/reviews/movie/{movieId}?page=&size=` | page of a movie's reviews |
//! | GET | `/api/v1/reviews/movie/{movieId}/rating` | rating summary |
//! | GET | `/api/v1/reviews/movie/{movieId}/has-reviews` | `true` / `false` |
//! | GET | `/api/v1/reviews/movie/{movieId}/count` | review count |
//! | GET | `/__health`, `/__metrics`, `/__info` | diagnostics |
//!
//! Every failure is rendered as an [`ErrorResponse`](crate::error::ErrorResponse),
//! including undecodable bodies, paths and query strings.

use crate::error::ApiError;
use crate::service::ReviewService;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, Uri};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use marquee_client::BreakerSnapshot;
use marquee_common::model::page::DEFAULT_PAGE_SIZE;
use marquee_common::{
    MovieId, MovieReviewsPage, PageRequest, RatingSummary, Result, ReviewId, ReviewSubmission, ReviewView,
};
use marquee_metrics::{MetricsCollector, MetricsSnapshot, Operation, ServerInfo};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

pub const REVIEWS_PATH: &str = "/api/v1/reviews";

type ApiResult<T> = std::result::Result<T, ApiError>;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ReviewService>,
    pub metrics: Arc<dyn MetricsCollector>,
}

impl AppState {
    pub fn new(service: Arc<ReviewService>, metrics: Arc<dyn MetricsCollector>) -> Self {
        Self { service, metrics }
    }

    /// Records the call and binds a failure to the request path.
    fn finish<T>(&self, operation: Operation, start: Instant, uri: &Uri, result: Result<T>) -> ApiResult<T> {
        self.metrics.record_call(operation, start, result.is_ok());
        result.map_err(|err| ApiError::new(err, uri.path()))
    }
}

/// Query string of the paged reviews endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl PageParams {
    fn into_request(self) -> Result<PageRequest> {
        PageRequest::new(self.page.unwrap_or(0), self.size.unwrap_or(DEFAULT_PAGE_SIZE))
    }
}

/// `/__info` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfoResponse {
    #[serde(flatten)]
    pub server: ServerInfo,
    pub breaker: BreakerSnapshot,
}

/// Builds the axum router over `state`.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(REVIEWS_PATH, post(submit_review))
        .route("/api/v1/reviews/{review_id}", get(review_by_id))
        .route("/api/v1/reviews/movie/{movie_id}", get(movie_reviews))
        .route("/api/v1/reviews/movie/{movie_id}/rating", get(rating_summary))
        .route("/api/v1/reviews/movie/{movie_id}/has-reviews", get(has_reviews))
        .route("/api/v1/reviews/movie/{movie_id}/count", get(review_count))
        .route("/__health", get(health_check))
        .route("/__metrics", get(metrics))
        .route("/__info", get(info))
        .with_state(state)
}

async fn submit_review(
    State(state): State<AppState>,
    uri: Uri,
    body: std::result::Result<Json<ReviewSubmission>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ReviewView>)> {
    let start = Instant::now();
    let Json(submission) = body.map_err(|rejection| ApiError::malformed("body", rejection.body_text(), uri.path()))?;

    let result = match submission.validate() {
        Ok(draft) => state.service.submit(draft).await,
        Err(err) => Err(err),
    };
    let view = state.finish(Operation::ReviewRequest, start, &uri, result)?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn review_by_id(
    State(state): State<AppState>,
    uri: Uri,
    path: std::result::Result<Path<ReviewId>, PathRejection>,
) -> ApiResult<Json<ReviewView>> {
    let start = Instant::now();
    let Path(review_id) = path.map_err(|rejection| ApiError::malformed("reviewId", rejection.body_text(), uri.path()))?;

    let result = state.service.review_by_id(review_id).await;
    state.finish(Operation::ReviewLookup, start, &uri, result).map(Json)
}

async fn movie_reviews(
    State(state): State<AppState>,
    uri: Uri,
    path: std::result::Result<Path<MovieId>, PathRejection>,
    query: std::result::Result<Query<PageParams>, QueryRejection>,
) -> ApiResult<Json<MovieReviewsPage>> {
    let start = Instant::now();
    let movie_id = movie_id(path, &uri)?;
    let Query(params) = query.map_err(|rejection| ApiError::malformed("query", rejection.body_text(), uri.path()))?;

    let result = match params.into_request() {
        Ok(request) => state.service.reviews_for_movie(movie_id, request).await,
        Err(err) => Err(err),
    };
    state.finish(Operation::ReviewsQuery, start, &uri, result).map(Json)
}

async fn rating_summary(
    State(state): State<AppState>,
    uri: Uri,
    path: std::result::Result<Path<MovieId>, PathRejection>,
) -> ApiResult<Json<RatingSummary>> {
    let start = Instant::now();
    let movie_id = movie_id(path, &uri)?;

    let result = state.service.rating_summary(movie_id).await;
    state.finish(Operation::RatingRequest, start, &uri, result).map(Json)
}

async fn has_reviews(
    State(state): State<AppState>,
    uri: Uri,
    path: std::result::Result<Path<MovieId>, PathRejection>,
) -> ApiResult<Json<bool>> {
    let start = Instant::now();
    let movie_id = movie_id(path, &uri)?;

    let result = state.service.has_reviews(movie_id).await;
    state.finish(Operation::ReviewsQuery, start, &uri, result).map(Json)
}

async fn review_count(
    State(state): State<AppState>,
    uri: Uri,
    path: std::result::Result<Path<MovieId>, PathRejection>,
) -> ApiResult<Json<u64>> {
    let start = Instant::now();
    let movie_id = movie_id(path, &uri)?;

    let result = state.service.review_count(movie_id).await;
    state.finish(Operation::ReviewsQuery, start, &uri, result).map(Json)
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn metrics(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

async fn info(State(state): State<AppState>) -> Json<InfoResponse> {
    Json(InfoResponse {
        server: state.metrics.info(),
        breaker: state.service.catalog().breaker_snapshot(),
    })
}

fn movie_id(path: std::result::Result<Path<MovieId>, PathRejection>, uri: &Uri) -> ApiResult<MovieId> {
    path.map(|Path(id)| id)
        .map_err(|rejection| ApiError::malformed("movieId", rejection.body_text(), uri.path()))
}
