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

//! HTTP client for the one-shot subcommands.

use anyhow::{anyhow, Result};
use marquee_client::config::validate_url;
use marquee_common::{MovieId, ReviewSubmission};
use serde_json::Value;

const REVIEWS_PATH: &str = "/api/v1/reviews";

/// Thin JSON client for a running review service.
pub struct ReviewApi {
    base_url: String,
    http: reqwest::Client,
}

impl ReviewApi {
    /// # Errors
    /// Returns an error if `base_url` lacks an `http://` or `https://` scheme.
    pub fn new(base_url: &str) -> Result<Self> {
        validate_url(base_url)?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn rating(&self, movie_id: MovieId) -> Result<Value> {
        let url = format!("{}{}/movie/{}/rating", self.base_url, REVIEWS_PATH, movie_id);
        read(self.http.get(url).send().await?).await
    }

    pub async fn reviews(&self, movie_id: MovieId, page: u32, size: u32) -> Result<Value> {
        let url = format!("{}{}/movie/{}", self.base_url, REVIEWS_PATH, movie_id);
        let request = self.http.get(url).query(&[("page", page), ("size", size)]);
        read(request.send().await?).await
    }

    pub async fn submit(&self, submission: &ReviewSubmission) -> Result<Value> {
        let url = format!("{}{}", self.base_url, REVIEWS_PATH);
        read(self.http.post(url).json(submission).send().await?).await
    }
}

/// Decodes a success body, or turns an error status into an error carrying
/// the response body.
async fn read(response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(anyhow!("{}: {}", status, body));
    }
    Ok(serde_json::from_str(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_requires_scheme() {
        assert!(ReviewApi::new("127.0.0.1:8082").is_err());
        assert!(ReviewApi::new("http://127.0.0.1:8082").is_ok());
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let api = ReviewApi::new("http://127.0.0.1:8082/").unwrap();
        assert_eq!(api.base_url(), "http://127.0.0.1:8082");
    }
}
