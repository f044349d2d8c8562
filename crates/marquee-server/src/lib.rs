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

//! Marquee review service
//!
//! Stores user reviews of movies, keeps a per-movie rating cache in step
//! with them and serves both over a REST API. Movie existence and titles
//! come from the external catalog through [`marquee_client::MovieServiceClient`].
//!
//! - [`store`]: review and rating-cache persistence seams
//! - [`rating`]: cache recomputation and rating summaries
//! - [`service`]: submission coordination and review queries
//! - [`http_router`] / [`http_server`]: the axum surface

pub mod config;
pub mod error;
pub mod http_router;
pub mod http_server;
pub mod rating;
pub mod service;
pub mod store;

pub use config::ServerConfig;
pub use error::{ApiError, ErrorResponse};
pub use http_router::{build_router, AppState};
pub use http_server::HttpServer;
pub use rating::RatingAggregator;
pub use service::ReviewService;

#[cfg(test)]
pub(crate) mod test_support {
    use async_trait::async_trait;
    use marquee_client::{CatalogClientConfig, CatalogTransport, MovieServiceClient, RetryConfig};
    use marquee_common::{MovieId, MovieSummary, Result, ReviewDraft, ReviewError, ReviewSubmission};
    use rust_decimal::Decimal;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    /// In-process catalog with a switch to simulate an outage.
    pub struct FakeCatalog {
        movies: parking_lot::Mutex<HashMap<MovieId, String>>,
        down: AtomicBool,
    }

    impl FakeCatalog {
        pub fn with_movies(movies: &[(MovieId, &str)]) -> Self {
            Self {
                movies: parking_lot::Mutex::new(
                    movies.iter().map(|(id, title)| (*id, title.to_string())).collect(),
                ),
                down: AtomicBool::new(false),
            }
        }

        pub fn set_down(&self, down: bool) {
            self.down.store(down, Ordering::SeqCst);
        }

        pub fn remove(&self, id: MovieId) {
            self.movies.lock().remove(&id);
        }

        /// A client without retries over this catalog.
        pub fn client(self: &Arc<Self>) -> MovieServiceClient {
            let config = CatalogClientConfig::default().with_retry(RetryConfig::no_retry());
            MovieServiceClient::with_transport(self.clone(), config)
        }
    }

    #[async_trait]
    impl CatalogTransport for FakeCatalog {
        async fn get_movie(&self, id: MovieId) -> Result<MovieSummary> {
            if self.down.load(Ordering::SeqCst) {
                return Err(ReviewError::MovieServiceUnavailable("catalog is down".into()));
            }
            let title = self.movies.lock().get(&id).cloned();
            match title {
                Some(title) => Ok(MovieSummary {
                    id,
                    title,
                    ..MovieSummary::default()
                }),
                None => Err(ReviewError::MovieNotFound(id)),
            }
        }
    }

    pub fn draft(movie_id: MovieId, user: &str, rating: Decimal) -> ReviewDraft {
        ReviewSubmission {
            movie_id: Some(movie_id),
            user_name: Some(user.to_string()),
            rating: Some(rating),
            comment: None,
        }
        .validate()
        .unwrap()
    }
}
