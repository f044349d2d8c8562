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

//! Count-based circuit breaker guarding the catalog client.
//!
//! The breaker keeps the outcomes of the last `sliding_window_size` calls.
//! Once at least `minimum_number_of_calls` outcomes are buffered and the
//! failure rate reaches `failure_rate_threshold`, it opens. While OPEN every
//! call is refused without touching the network. After
//! `wait_duration_in_open_state` the next call moves it to HALF_OPEN, where
//! `permitted_calls_in_half_open_state` trial calls are let through: any
//! failure reopens it, that many successes close it with an empty window.
//!
//! All state sits behind one `parking_lot::Mutex`, so each permit check and
//! each recorded outcome is a single atomic step.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

/// Circuit breaker state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    /// Normal operation, calls flow through
    Closed,
    /// Tripped, calls fail fast without reaching the catalog
    Open,
    /// Probing whether the catalog has recovered
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CircuitState::Closed => "CLOSED",
            CircuitState::Open => "OPEN",
            CircuitState::HalfOpen => "HALF_OPEN",
        };
        f.write_str(name)
    }
}

/// Circuit breaker configuration
#[derive(Debug, Clone, PartialEq)]
pub struct CircuitBreakerConfig {
    /// Number of most recent outcomes kept in the window
    pub sliding_window_size: usize,
    /// Outcomes required before the failure rate is evaluated
    pub minimum_number_of_calls: usize,
    /// Failure percentage (0-100) at or above which the breaker opens
    pub failure_rate_threshold: f64,
    /// How long to stay OPEN before letting trial calls through
    pub wait_duration_in_open_state: Duration,
    /// Trial calls allowed (and successes required) in HALF_OPEN
    pub permitted_calls_in_half_open_state: usize,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            sliding_window_size: 10,
            minimum_number_of_calls: 5,
            failure_rate_threshold: 50.0,
            wait_duration_in_open_state: Duration::from_secs(30),
            permitted_calls_in_half_open_state: 3,
        }
    }
}

/// Point-in-time view of the breaker, served from `/__info`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakerSnapshot {
    pub state: CircuitState,
    pub buffered_calls: usize,
    pub failed_calls: usize,
    /// Failure percentage over the buffered calls, `None` until the minimum
    /// number of calls has been seen
    pub failure_rate: Option<f64>,
}

/// A state change caused by a permit request or a recorded outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: CircuitState,
    pub to: CircuitState,
}

#[derive(Debug)]
struct BreakerInner {
    state: CircuitState,
    /// Bumped on every transition; outcomes from an older generation are stale
    generation: u64,
    /// `true` marks a failed call
    window: VecDeque<bool>,
    opened_at: Option<Instant>,
    half_open_issued: usize,
    half_open_successes: usize,
}

/// The breaker itself. Share it by reference or inside an `Arc`.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerInner>,
}

/// Permission to make one call, granted by [`CircuitBreaker::try_acquire`].
///
/// Settle it with [`success`](Self::success) or [`failure`](Self::failure).
/// A permit dropped unsettled (the caller was cancelled) records nothing and
/// hands its HALF_OPEN trial slot back to the breaker.
#[derive(Debug)]
#[must_use = "an unsettled permit records no outcome"]
pub struct CallPermit<'a> {
    breaker: &'a CircuitBreaker,
    generation: u64,
    trial: bool,
    transition: Option<Transition>,
    settled: bool,
}

impl CallPermit<'_> {
    /// The transition caused by granting this permit, if any.
    pub fn transition(&self) -> Option<Transition> {
        self.transition
    }

    /// Records a call that the catalog answered correctly.
    pub fn success(mut self) -> Option<Transition> {
        self.settled = true;
        self.breaker.record(self.generation, false)
    }

    /// Records an availability fault.
    pub fn failure(mut self) -> Option<Transition> {
        self.settled = true;
        self.breaker.record(self.generation, true)
    }
}

impl Drop for CallPermit<'_> {
    fn drop(&mut self) {
        if !self.settled && self.trial {
            self.breaker.release_trial(self.generation);
        }
    }
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        let capacity = config.sliding_window_size.max(1);
        Self {
            config,
            inner: Mutex::new(BreakerInner {
                state: CircuitState::Closed,
                generation: 0,
                window: VecDeque::with_capacity(capacity),
                opened_at: None,
                half_open_issued: 0,
                half_open_successes: 0,
            }),
        }
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Current state, promoting OPEN to HALF_OPEN first when the wait is over.
    pub fn state(&self) -> CircuitState {
        let mut inner = self.inner.lock();
        self.promote_if_waited(&mut inner);
        inner.state
    }

    /// Asks for permission to make one call.
    ///
    /// # Returns
    /// A [`CallPermit`], or `None` when OPEN or when all HALF_OPEN trials are
    /// taken.
    pub fn try_acquire(&self) -> Option<CallPermit<'_>> {
        let mut inner = self.inner.lock();
        let transition = self.promote_if_waited(&mut inner);
        let trial = match inner.state {
            CircuitState::Closed => false,
            CircuitState::Open => return None,
            CircuitState::HalfOpen => {
                if inner.half_open_issued >= self.half_open_quota() {
                    return None;
                }
                inner.half_open_issued += 1;
                true
            }
        };
        Some(CallPermit {
            breaker: self,
            generation: inner.generation,
            trial,
            transition,
            settled: false,
        })
    }

    fn record(&self, generation: u64, failed: bool) -> Option<Transition> {
        let mut inner = self.inner.lock();
        // granted before the last transition; its outcome is stale
        if inner.generation != generation {
            return None;
        }
        match (inner.state, failed) {
            (CircuitState::Closed, false) => {
                self.push_outcome(&mut inner, false);
                None
            }
            (CircuitState::Closed, true) => {
                self.push_outcome(&mut inner, true);
                self.threshold_reached(&inner)
                    .then(|| Self::transition(&mut inner, CircuitState::Open))
            }
            (CircuitState::HalfOpen, false) => {
                inner.half_open_successes += 1;
                (inner.half_open_successes >= self.half_open_quota())
                    .then(|| Self::transition(&mut inner, CircuitState::Closed))
            }
            (CircuitState::HalfOpen, true) => Some(Self::transition(&mut inner, CircuitState::Open)),
            (CircuitState::Open, _) => None,
        }
    }

    fn release_trial(&self, generation: u64) {
        let mut inner = self.inner.lock();
        if inner.generation == generation && inner.state == CircuitState::HalfOpen {
            inner.half_open_issued = inner.half_open_issued.saturating_sub(1);
            tracing::debug!("Abandoned HALF_OPEN trial call released its slot");
        }
    }

    pub fn snapshot(&self) -> BreakerSnapshot {
        let mut inner = self.inner.lock();
        self.promote_if_waited(&mut inner);
        let buffered = inner.window.len();
        let failed = inner.window.iter().filter(|f| **f).count();
        BreakerSnapshot {
            state: inner.state,
            buffered_calls: buffered,
            failed_calls: failed,
            failure_rate: (buffered >= self.minimum_calls())
                .then(|| failed as f64 * 100.0 / buffered as f64),
        }
    }

    fn promote_if_waited(&self, inner: &mut BreakerInner) -> Option<Transition> {
        if inner.state != CircuitState::Open {
            return None;
        }
        let opened_at = inner.opened_at?;
        if opened_at.elapsed() >= self.config.wait_duration_in_open_state {
            Some(Self::transition(inner, CircuitState::HalfOpen))
        } else {
            None
        }
    }

    fn push_outcome(&self, inner: &mut BreakerInner, failed: bool) {
        if inner.window.len() >= self.config.sliding_window_size.max(1) {
            inner.window.pop_front();
        }
        inner.window.push_back(failed);
    }

    fn threshold_reached(&self, inner: &BreakerInner) -> bool {
        let buffered = inner.window.len();
        if buffered < self.minimum_calls() {
            return false;
        }
        let failed = inner.window.iter().filter(|f| **f).count();
        failed as f64 * 100.0 / buffered as f64 >= self.config.failure_rate_threshold
    }

    /// The minimum can never exceed what the window is able to hold.
    fn minimum_calls(&self) -> usize {
        self.config
            .minimum_number_of_calls
            .clamp(1, self.config.sliding_window_size.max(1))
    }

    fn half_open_quota(&self) -> usize {
        self.config.permitted_calls_in_half_open_state.max(1)
    }

    fn transition(inner: &mut BreakerInner, to: CircuitState) -> Transition {
        let from = inner.state;
        inner.state = to;
        inner.generation += 1;
        inner.half_open_issued = 0;
        inner.half_open_successes = 0;
        match to {
            CircuitState::Open => {
                inner.opened_at = Some(Instant::now());
                tracing::warn!("Circuit breaker {} -> {}", from, to);
            }
            CircuitState::HalfOpen => {
                inner.opened_at = None;
                tracing::info!("Circuit breaker {} -> {}", from, to);
            }
            CircuitState::Closed => {
                inner.opened_at = None;
                inner.window.clear();
                tracing::info!("Circuit breaker {} -> {}", from, to);
            }
        }
        Transition { from, to }
    }
}
