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

use crate::breaker::{BreakerSnapshot, CircuitBreaker, CircuitState, Transition};
use crate::config::CatalogClientConfig;
use crate::retry::RetryConfig;
use crate::transport::{CatalogTransport, HttpCatalogTransport};
use marquee_common::{
    MovieId, MovieSummary, Result, ReviewError, UNAVAILABLE_MOVIE_TITLE, UNKNOWN_MOVIE_TITLE,
};
use marquee_metrics::{Counter, MetricsCollector, Operation};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Resilient client for the movie catalog.
///
/// Every outbound attempt is bounded by a timeout, guarded by a circuit
/// breaker and retried on availability faults:
///
/// ```text
/// fetch_movie ─┬─ breaker permit? ── no ──> MovieServiceUnavailable (no request sent)
///              └─ yes ─> timeout(transport.get_movie)
///                          ├─ Ok / MovieNotFound ─> recorded as success, returned
///                          └─ fault ─> recorded as failure, retried after backoff
/// ```
///
/// The breaker state is shared by all clones of the client.
#[derive(Clone)]
pub struct MovieServiceClient {
    transport: Arc<dyn CatalogTransport>,
    breaker: Arc<CircuitBreaker>,
    retry: RetryConfig,
    timeout: Duration,
    metrics: Option<Arc<dyn MetricsCollector>>,
}

impl MovieServiceClient {
    /// Creates a client talking HTTP to `config.base_url`.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    ///
    /// # Example
    /// ```no_run
    /// # use marquee_client::{CatalogClientConfig, MovieServiceClient};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = CatalogClientConfig::default().with_base_url("http://127.0.0.1:8081");
    /// let client = MovieServiceClient::new(config)?;
    /// let movie = client.get_movie(1).await?;
    /// println!("{}", movie.title);
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(config: CatalogClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpCatalogTransport::new(config.base_url.clone())?;
        Ok(Self::with_transport(Arc::new(transport), config))
    }

    /// Creates a client over any transport. The base URL in `config` is
    /// ignored.
    pub fn with_transport(transport: Arc<dyn CatalogTransport>, config: CatalogClientConfig) -> Self {
        Self {
            transport,
            breaker: Arc::new(CircuitBreaker::new(config.breaker)),
            retry: config.retry,
            timeout: config.timeout,
            metrics: None,
        }
    }

    /// Attaches a metrics collector for catalog calls and breaker events.
    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Fetches a movie through the full timeout / breaker / retry pipeline.
    ///
    /// # Errors
    /// - [`ReviewError::MovieNotFound`] after exactly one request when the
    ///   catalog says the movie does not exist
    /// - [`ReviewError::MovieServiceUnavailable`] when the retry budget is
    ///   exhausted or the breaker refuses the call
    pub async fn fetch_movie(&self, id: MovieId) -> Result<MovieSummary> {
        let attempts = self.retry.max_attempts.max(1);
        let mut backoff = self.retry.backoff();
        let mut attempt = 0;

        loop {
            attempt += 1;

            // dropping an unsettled permit (caller cancelled) frees its trial slot
            let permit = match self.breaker.try_acquire() {
                Some(permit) => {
                    self.observe(permit.transition());
                    permit
                }
                None => {
                    self.count(Counter::BreakerRejections);
                    tracing::debug!("Catalog call for movie {} rejected by open breaker", id);
                    return Err(ReviewError::MovieServiceUnavailable(format!(
                        "circuit breaker is {}",
                        CircuitState::Open
                    )));
                }
            };

            let start = Instant::now();
            let outcome = match tokio::time::timeout(self.timeout, self.transport.get_movie(id)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(ReviewError::MovieServiceUnavailable(format!(
                    "timed out after {}ms",
                    self.timeout.as_millis()
                ))),
            };

            match outcome {
                Ok(movie) => {
                    self.record(start, true);
                    self.observe(permit.success());
                    return Ok(movie);
                }
                Err(ReviewError::MovieNotFound(missing)) => {
                    // the catalog answered; this is not an availability fault
                    self.record(start, true);
                    self.observe(permit.success());
                    return Err(ReviewError::MovieNotFound(missing));
                }
                Err(err) => {
                    let err = as_availability_fault(err);
                    self.record(start, false);
                    self.observe(permit.failure());

                    if attempt >= attempts {
                        return Err(err);
                    }
                    let delay = backoff.next().unwrap_or_default();
                    tracing::warn!(
                        "Catalog request for movie {} failed (attempt {}/{}): {}, retrying in {}ms",
                        id,
                        attempt,
                        attempts,
                        err,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Primary read path: like [`fetch_movie`](Self::fetch_movie) but
    /// availability faults are replaced by [`MovieSummary::fallback`].
    ///
    /// # Errors
    /// Only [`ReviewError::MovieNotFound`].
    pub async fn get_movie(&self, id: MovieId) -> Result<MovieSummary> {
        match self.fetch_movie(id).await {
            Ok(movie) => Ok(movie),
            Err(ReviewError::MovieNotFound(missing)) => Err(ReviewError::MovieNotFound(missing)),
            Err(err) => {
                tracing::error!("Serving fallback movie for {}: {}", id, err);
                self.count(Counter::FallbacksServed);
                Ok(MovieSummary::fallback(id))
            }
        }
    }

    /// Existence check. Unavailability is surfaced, never masked.
    pub async fn movie_exists(&self, id: MovieId) -> Result<bool> {
        match self.fetch_movie(id).await {
            Ok(_) => Ok(true),
            Err(ReviewError::MovieNotFound(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Display title that never fails.
    pub async fn movie_title(&self, id: MovieId) -> String {
        match self.fetch_movie(id).await {
            Ok(movie) => movie.title,
            Err(ReviewError::MovieNotFound(_)) => UNKNOWN_MOVIE_TITLE.to_string(),
            Err(err) => {
                tracing::warn!("Movie title unavailable for {}: {}", id, err);
                UNAVAILABLE_MOVIE_TITLE.to_string()
            }
        }
    }

    pub fn breaker_state(&self) -> CircuitState {
        self.breaker.state()
    }

    pub fn breaker_snapshot(&self) -> BreakerSnapshot {
        self.breaker.snapshot()
    }

    fn observe(&self, transition: Option<Transition>) {
        if let Some(Transition {
            to: CircuitState::Open,
            ..
        }) = transition
        {
            self.count(Counter::BreakerOpened);
        }
    }

    fn record(&self, start: Instant, success: bool) {
        if let Some(metrics) = &self.metrics {
            metrics.record_call(Operation::CatalogCall, start, success);
        }
    }

    fn count(&self, counter: Counter) {
        if let Some(metrics) = &self.metrics {
            metrics.increment(counter);
        }
    }
}

fn as_availability_fault(err: ReviewError) -> ReviewError {
    match err {
        ReviewError::MovieServiceUnavailable(_) => err,
        other => ReviewError::MovieServiceUnavailable(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breaker::CircuitBreakerConfig;
    use async_trait::async_trait;
    use marquee_metrics::ServiceMetricsCollector;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// What the scripted catalog does on one attempt.
    #[derive(Clone)]
    enum Step {
        Found,
        NotFound,
        Fail,
        Hang,
    }

    /// Replays queued steps; repeats the last one when the script runs out.
    struct ScriptedTransport {
        steps: Mutex<VecDeque<Step>>,
        last: Mutex<Step>,
        calls: AtomicUsize,
    }

    impl ScriptedTransport {
        fn new(steps: Vec<Step>) -> Arc<Self> {
            let last = steps.last().cloned().unwrap_or(Step::Found);
            Arc::new(Self {
                steps: Mutex::new(steps.into()),
                last: Mutex::new(last),
                calls: AtomicUsize::new(0),
            })
        }

        fn always(step: Step) -> Arc<Self> {
            Self::new(vec![step])
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CatalogTransport for ScriptedTransport {
        async fn get_movie(&self, id: MovieId) -> Result<MovieSummary> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let step = {
                let next = self.steps.lock().pop_front();
                next.unwrap_or_else(|| self.last.lock().clone())
            };
            match step {
                Step::Found => Ok(MovieSummary {
                    id,
                    title: "Inception".to_string(),
                    ..MovieSummary::default()
                }),
                Step::NotFound => Err(ReviewError::MovieNotFound(id)),
                Step::Fail => Err(ReviewError::MovieServiceUnavailable("503".to_string())),
                Step::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(MovieSummary::default())
                }
            }
        }
    }

    fn test_config() -> CatalogClientConfig {
        CatalogClientConfig::default()
            .with_timeout(Duration::from_millis(100))
            .with_retry(RetryConfig {
                max_attempts: 2,
                initial_backoff_ms: 500,
                max_backoff_ms: 500,
                backoff_multiplier: 1.0,
            })
            .with_breaker(CircuitBreakerConfig {
                sliding_window_size: 5,
                minimum_number_of_calls: 3,
                failure_rate_threshold: 60.0,
                wait_duration_in_open_state: Duration::from_secs(3),
                permitted_calls_in_half_open_state: 2,
            })
    }

    fn client(transport: Arc<ScriptedTransport>) -> MovieServiceClient {
        MovieServiceClient::with_transport(transport, test_config())
    }

    // ========================================================================
    // Classification and retry
    // ========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_found_on_first_attempt() {
        let transport = ScriptedTransport::always(Step::Found);
        let movie = client(transport.clone()).fetch_movie(1).await.unwrap();
        assert_eq!(movie.title, "Inception");
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_found_is_never_retried() {
        let transport = ScriptedTransport::always(Step::NotFound);
        let client = client(transport.clone());

        let err = client.fetch_movie(999).await.unwrap_err();
        assert!(matches!(err, ReviewError::MovieNotFound(999)));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_found_does_not_trip_breaker() {
        let transport = ScriptedTransport::always(Step::NotFound);
        let client = client(transport.clone());

        for _ in 0..10 {
            let _ = client.fetch_movie(999).await;
        }
        assert_eq!(client.breaker_state(), CircuitState::Closed);
        assert_eq!(client.breaker_snapshot().failed_calls, 0);
        assert_eq!(transport.calls(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fault_retried_then_succeeds() {
        let transport = ScriptedTransport::new(vec![Step::Fail, Step::Found]);
        let movie = client(transport.clone()).fetch_movie(1).await.unwrap();
        assert_eq!(movie.title, "Inception");
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_waits_between_attempts() {
        let transport = ScriptedTransport::always(Step::Fail);
        let started = tokio::time::Instant::now();
        let err = client(transport.clone()).fetch_movie(1).await.unwrap_err();
        assert!(err.is_availability_fault());
        assert_eq!(transport.calls(), 2);
        assert!(started.elapsed() >= Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_an_availability_fault() {
        let transport = ScriptedTransport::always(Step::Hang);
        let client = MovieServiceClient::with_transport(
            transport.clone(),
            test_config().with_retry(RetryConfig::no_retry()),
        );

        let err = client.fetch_movie(1).await.unwrap_err();
        match err {
            ReviewError::MovieServiceUnavailable(detail) => assert!(detail.contains("timed out")),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(client.breaker_snapshot().failed_calls, 1);
    }

    // ========================================================================
    // Fallback and helpers
    // ========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_get_movie_falls_back_on_fault() {
        let transport = ScriptedTransport::always(Step::Fail);
        let movie = client(transport).get_movie(4).await.unwrap();
        assert!(movie.is_fallback());
        assert_eq!(movie.id, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_movie_propagates_not_found() {
        let transport = ScriptedTransport::always(Step::NotFound);
        let err = client(transport).get_movie(4).await.unwrap_err();
        assert!(matches!(err, ReviewError::MovieNotFound(4)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_movie_exists() {
        assert!(client(ScriptedTransport::always(Step::Found)).movie_exists(1).await.unwrap());
        assert!(!client(ScriptedTransport::always(Step::NotFound)).movie_exists(1).await.unwrap());
        let err = client(ScriptedTransport::always(Step::Fail))
            .movie_exists(1)
            .await
            .unwrap_err();
        assert!(err.is_availability_fault());
    }

    #[tokio::test(start_paused = true)]
    async fn test_movie_title() {
        assert_eq!(client(ScriptedTransport::always(Step::Found)).movie_title(1).await, "Inception");
        assert_eq!(
            client(ScriptedTransport::always(Step::NotFound)).movie_title(1).await,
            "Unknown Movie"
        );
        assert_eq!(
            client(ScriptedTransport::always(Step::Fail)).movie_title(1).await,
            "Movie Title Unavailable"
        );
    }

    // ========================================================================
    // Breaker integration
    // ========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_breaker_opens_and_short_circuits() {
        let transport = ScriptedTransport::always(Step::Fail);
        let client = MovieServiceClient::with_transport(
            transport.clone(),
            test_config().with_retry(RetryConfig::no_retry()),
        );

        for _ in 0..5 {
            let movie = client.get_movie(1).await.unwrap();
            assert!(movie.is_fallback());
        }

        // opened after the third fault; calls four and five never left
        assert_eq!(client.breaker_state(), CircuitState::Open);
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_breaker_rejection_stops_retry_loop() {
        let transport = ScriptedTransport::always(Step::Fail);
        let client = client(transport.clone());

        // two attempts per call: call one buffers 2 faults, call two opens on
        // its first attempt and its retry is refused by the breaker
        let _ = client.fetch_movie(1).await;
        let _ = client.fetch_movie(1).await;
        assert_eq!(client.breaker_state(), CircuitState::Open);
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_breaker_recovers_through_half_open() {
        let transport = ScriptedTransport::new(vec![Step::Fail, Step::Fail, Step::Fail, Step::Found]);
        let client = MovieServiceClient::with_transport(
            transport.clone(),
            test_config().with_retry(RetryConfig::no_retry()),
        );

        for _ in 0..3 {
            let _ = client.fetch_movie(1).await;
        }
        assert_eq!(client.breaker_state(), CircuitState::Open);
        assert!(client.fetch_movie(1).await.is_err());
        assert_eq!(transport.calls(), 3);

        tokio::time::advance(Duration::from_secs(3)).await;
        assert!(client.fetch_movie(1).await.is_ok());
        assert_eq!(client.breaker_state(), CircuitState::HalfOpen);
        assert!(client.fetch_movie(1).await.is_ok());
        assert_eq!(client.breaker_state(), CircuitState::Closed);
        assert_eq!(transport.calls(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_half_open_trial_failure_reopens() {
        let transport = ScriptedTransport::always(Step::Fail);
        let client = MovieServiceClient::with_transport(
            transport.clone(),
            test_config().with_retry(RetryConfig::no_retry()),
        );
        for _ in 0..3 {
            let _ = client.fetch_movie(1).await;
        }
        tokio::time::advance(Duration::from_secs(3)).await;

        assert!(client.fetch_movie(1).await.is_err());
        assert_eq!(client.breaker_state(), CircuitState::Open);
        assert_eq!(transport.calls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_trial_calls_do_not_wedge_half_open() {
        let transport = ScriptedTransport::new(vec![
            Step::Fail,
            Step::Fail,
            Step::Fail,
            Step::Hang,
            Step::Hang,
            Step::Found,
        ]);
        let client = MovieServiceClient::with_transport(
            transport.clone(),
            test_config().with_retry(RetryConfig::no_retry()),
        );
        for _ in 0..3 {
            let _ = client.fetch_movie(1).await;
        }
        tokio::time::advance(Duration::from_secs(3)).await;

        // both trial slots are taken by callers that go away mid-request
        let trials: Vec<_> = (0..2)
            .map(|_| {
                let client = client.clone();
                tokio::spawn(async move { client.fetch_movie(1).await })
            })
            .collect();
        while transport.calls() < 5 {
            tokio::task::yield_now().await;
        }
        for trial in &trials {
            trial.abort();
        }
        for trial in trials {
            assert!(trial.await.unwrap_err().is_cancelled());
        }
        assert_eq!(client.breaker_state(), CircuitState::HalfOpen);

        tokio::time::advance(Duration::from_secs(3600)).await;
        let movie = client.get_movie(1).await.unwrap();
        assert!(!movie.is_fallback());
        assert!(client.fetch_movie(1).await.is_ok());
        assert_eq!(client.breaker_state(), CircuitState::Closed);
        assert_eq!(transport.calls(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_metrics_recorded() {
        let metrics = Arc::new(ServiceMetricsCollector::new());
        let transport = ScriptedTransport::always(Step::Fail);
        let client = MovieServiceClient::with_transport(
            transport,
            test_config().with_retry(RetryConfig::no_retry()),
        )
        .with_metrics(metrics.clone());

        for _ in 0..4 {
            let _ = client.get_movie(1).await;
        }

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.operations["catalog_call"].failure_count, 3);
        assert_eq!(snapshot.counters["breaker_opened"], 1);
        assert_eq!(snapshot.counters["breaker_rejections"], 1);
        assert_eq!(snapshot.counters["fallbacks_served"], 4);
    }
}
