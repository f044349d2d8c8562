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

use std::time::Duration;

/// Retry configuration for catalog calls.
///
/// Only availability faults are retried. A not-found answer and a breaker
/// rejection end the attempt loop immediately.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total attempts, the first one included
    ///
    /// Default: 2
    pub max_attempts: usize,
    /// Delay before the first retry in milliseconds
    ///
    /// Default: 500ms
    pub initial_backoff_ms: u64,
    /// Upper bound on any single delay in milliseconds
    ///
    /// Default: 2000ms
    pub max_backoff_ms: u64,
    /// Growth factor applied after every retry
    ///
    /// Default: 1.0 (fixed delay)
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            initial_backoff_ms: 500,
            max_backoff_ms: 2000,
            backoff_multiplier: 1.0,
        }
    }
}

impl RetryConfig {
    /// A policy that never retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    pub fn backoff(&self) -> Backoff {
        Backoff {
            next_ms: self.initial_backoff_ms.min(self.max_backoff_ms),
            max_ms: self.max_backoff_ms,
            multiplier: self.backoff_multiplier.max(1.0),
        }
    }
}

/// Delay sequence between attempts, capped at `max_backoff_ms`.
#[derive(Debug, Clone)]
pub struct Backoff {
    next_ms: u64,
    max_ms: u64,
    multiplier: f64,
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let current = self.next_ms;
        self.next_ms = std::cmp::min((current as f64 * self.multiplier) as u64, self.max_ms);
        Some(Duration::from_millis(current))
    }
}
