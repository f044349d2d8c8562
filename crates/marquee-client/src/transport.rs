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

//! One outbound attempt against the movie catalog.
//!
//! A transport performs exactly one request per call and classifies the
//! outcome. Timeout, retry and circuit breaking are layered on top by
//! [`crate::MovieServiceClient`], so tests can substitute a scripted
//! transport without touching the network.

use async_trait::async_trait;
use http_body_util::{BodyExt, Empty};
use hyper::body::Bytes;
use hyper::{Request, StatusCode, Uri};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use marquee_common::{MovieId, MovieSummary, Result, ReviewError};

use crate::config::validate_url;

/// Path prefix of the catalog movie resource.
pub const MOVIES_PATH: &str = "/api/v1/movies";

/// A single-attempt movie lookup.
///
/// # Errors
///
/// Implementations return [`ReviewError::MovieNotFound`] when the catalog
/// definitively has no such movie, and [`ReviewError::MovieServiceUnavailable`]
/// for every other failure.
#[async_trait]
pub trait CatalogTransport: Send + Sync {
    async fn get_movie(&self, id: MovieId) -> Result<MovieSummary>;
}

/// `GET {base_url}/api/v1/movies/{id}` over a pooled hyper client.
///
/// | Catalog answer | Outcome |
/// |---|---|
/// | 2xx with a movie body | `Ok(movie)` |
/// | 404, or 2xx with an empty / `null` body | `MovieNotFound` |
/// | any other status, connection error, malformed body | `MovieServiceUnavailable` |
#[derive(Clone)]
pub struct HttpCatalogTransport {
    base_url: String,
    client: Client<HttpConnector, Empty<Bytes>>,
}

impl HttpCatalogTransport {
    /// # Errors
    ///
    /// Fails for malformed URLs and for `https://` URLs, which need a
    /// TLS-terminating proxy in front of the catalog.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        validate_url(&base_url)?;
        if base_url.starts_with("https://") {
            return Err(ReviewError::Transport(format!(
                "TLS is not supported by the catalog transport: {}",
                base_url
            )));
        }
        let client = Client::builder(TokioExecutor::new()).build_http();
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn movie_uri(&self, id: MovieId) -> Result<Uri> {
        format!("{}{}/{}", self.base_url, MOVIES_PATH, id)
            .parse()
            .map_err(|e| ReviewError::Transport(format!("Invalid catalog URI: {}", e)))
    }
}

#[async_trait]
impl CatalogTransport for HttpCatalogTransport {
    async fn get_movie(&self, id: MovieId) -> Result<MovieSummary> {
        let request = Request::builder()
            .method("GET")
            .uri(self.movie_uri(id)?)
            .header("Accept", "application/json")
            .body(Empty::new())
            .map_err(|e| ReviewError::Transport(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| unavailable(format!("request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ReviewError::MovieNotFound(id));
        }
        if !status.is_success() {
            return Err(unavailable(format!("catalog responded with {}", status)));
        }

        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| unavailable(format!("failed to read response: {}", e)))?
            .to_bytes();

        decode_movie(id, &body)
    }
}

/// Decodes a successful catalog body. An empty or `null` body means the
/// catalog has no such movie.
pub(crate) fn decode_movie(id: MovieId, body: &[u8]) -> Result<MovieSummary> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ReviewError::MovieNotFound(id));
    }
    let movie: Option<MovieSummary> = serde_json::from_slice(body)
        .map_err(|e| unavailable(format!("malformed catalog response: {}", e)))?;
    movie.ok_or(ReviewError::MovieNotFound(id))
}

fn unavailable(detail: String) -> ReviewError {
    ReviewError::MovieServiceUnavailable(detail)
}
