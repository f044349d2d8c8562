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

use crate::breaker::CircuitBreakerConfig;
use crate::retry::RetryConfig;
use marquee_common::{Result, ReviewError};
use std::time::Duration;

pub const DEFAULT_CATALOG_URL: &str = "http://127.0.0.1:8081";
pub const DEFAULT_TIMEOUT_MS: u64 = 3000;

/// Everything the catalog client needs to know.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogClientConfig {
    /// Catalog base URL, without a trailing `/api/v1/movies`
    pub base_url: String,
    /// Budget for each individual attempt
    pub timeout: Duration,
    pub retry: RetryConfig,
    pub breaker: CircuitBreakerConfig,
}

impl Default for CatalogClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CATALOG_URL.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            retry: RetryConfig::default(),
            breaker: CircuitBreakerConfig::default(),
        }
    }
}

impl CatalogClientConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_breaker(mut self, breaker: CircuitBreakerConfig) -> Self {
        self.breaker = breaker;
        self
    }

    /// Rejects settings the client cannot run with.
    pub fn validate(&self) -> Result<()> {
        validate_url(&self.base_url)?;
        if self.timeout.is_zero() {
            return Err(invalid("catalog timeout must be greater than zero"));
        }
        if self.retry.max_attempts == 0 {
            return Err(invalid("retry attempts must be at least 1"));
        }
        if self.breaker.sliding_window_size == 0 {
            return Err(invalid("breaker window must hold at least one call"));
        }
        if !(0.0..=100.0).contains(&self.breaker.failure_rate_threshold) {
            return Err(invalid("breaker failure rate must be between 0 and 100"));
        }
        Ok(())
    }
}

/// Validates that a URL carries an explicit `http://` or `https://` scheme.
///
/// # Example
///
/// ```
/// use marquee_client::config::validate_url;
///
/// assert!(validate_url("http://127.0.0.1:8081").is_ok());
/// assert!(validate_url("127.0.0.1:8081").is_err());
/// ```
pub fn validate_url(url: &str) -> Result<()> {
    let rest = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"))
        .ok_or_else(|| invalid(format!("URL must start with http:// or https://: {}", url)))?;
    if rest.is_empty() || rest.starts_with('/') {
        return Err(invalid(format!("URL has no host: {}", url)));
    }
    Ok(())
}

fn invalid(message: impl Into<String>) -> ReviewError {
    ReviewError::Transport(message.into())
}
