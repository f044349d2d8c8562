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

//! # Marquee CLI Entry Point
//!
//! ## Usage
//!
//! ```bash
//! # Start the review service against a catalog
//! marquee serve -b 0.0.0.0:8082 --catalog-url http://127.0.0.1:8081
//!
//! # Rating summary (outputs raw JSON)
//! marquee rating http://127.0.0.1:8082 42
//!
//! # Second page of reviews, 5 per page
//! marquee reviews http://127.0.0.1:8082 42 --page 1 --size 5
//!
//! # Submit a review
//! marquee submit http://127.0.0.1:8082 --movie-id 42 --user ana --rating 4.5 --comment "Loved it"
//! ```
//!
//! All server URLs must include the `http://` or `https://` prefix.

use anyhow::Result;
use argh::FromArgs;
use marquee_cli::settings::{self, BIND_ENV, CATALOG_TIMEOUT_ENV, CATALOG_URL_ENV};
use marquee_cli::ReviewApi;
use marquee_client::config::{DEFAULT_CATALOG_URL, DEFAULT_TIMEOUT_MS};
use marquee_client::{CatalogClientConfig, CircuitBreakerConfig, RetryConfig};
use marquee_common::{MovieId, ReviewSubmission};
use marquee_server::config::DEFAULT_PORT;
use marquee_server::{HttpServer, ServerConfig};
use rust_decimal::Decimal;
use serde_json::Value;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(FromArgs)]
/// Marquee - movie review and rating service
struct Cli {
    #[argh(subcommand)]
    command: Commands,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Commands {
    Serve(ServeArgs),
    Rating(RatingArgs),
    Reviews(ReviewsArgs),
    Submit(SubmitArgs),
}

/// Arguments for running the review service.
///
/// Settings without a flag fall back to `MARQUEE_BIND`,
/// `MARQUEE_CATALOG_URL` and `MARQUEE_CATALOG_TIMEOUT_MS`.
#[derive(FromArgs)]
#[argh(subcommand, name = "serve")]
/// start the review service
struct ServeArgs {
    /// address to bind the HTTP server to (default 0.0.0.0:8082)
    #[argh(option, short = 'b')]
    bind: Option<SocketAddr>,

    /// base URL of the movie catalog, with http:// prefix
    #[argh(option, long = "catalog-url")]
    catalog_url: Option<String>,

    /// per-attempt catalog timeout in milliseconds (default 3000)
    #[argh(option, long = "catalog-timeout-ms")]
    catalog_timeout_ms: Option<u64>,

    /// catalog attempts per lookup, first call included
    #[argh(option, long = "retry-attempts", default = "2")]
    retry_attempts: usize,

    /// wait between catalog attempts in milliseconds
    #[argh(option, long = "retry-wait-ms", default = "500")]
    retry_wait_ms: u64,

    /// number of recent catalog calls the breaker evaluates
    #[argh(option, long = "breaker-window", default = "10")]
    breaker_window: usize,

    /// calls required before the breaker may open
    #[argh(option, long = "breaker-min-calls", default = "5")]
    breaker_min_calls: usize,

    /// failure percentage that opens the breaker
    #[argh(option, long = "breaker-failure-rate", default = "50.0")]
    breaker_failure_rate: f64,

    /// seconds the breaker stays open before probing
    #[argh(option, long = "breaker-wait-secs", default = "30")]
    breaker_wait_secs: u64,

    /// probe calls allowed while half-open
    #[argh(option, long = "breaker-half-open-calls", default = "3")]
    breaker_half_open_calls: usize,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "rating")]
/// print a movie's rating summary
struct RatingArgs {
    /// address of the review service
    #[argh(positional)]
    server_address: String,

    /// movie identifier
    #[argh(positional)]
    movie_id: MovieId,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "reviews")]
/// print a page of a movie's reviews, newest first
struct ReviewsArgs {
    /// address of the review service
    #[argh(positional)]
    server_address: String,

    /// movie identifier
    #[argh(positional)]
    movie_id: MovieId,

    /// zero-based page number
    #[argh(option, default = "0")]
    page: u32,

    /// page size, 1 to 100
    #[argh(option, default = "10")]
    size: u32,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "submit")]
/// submit a review
struct SubmitArgs {
    /// address of the review service
    #[argh(positional)]
    server_address: String,

    /// movie identifier
    #[argh(option, long = "movie-id")]
    movie_id: MovieId,

    /// reviewer name
    #[argh(option)]
    user: String,

    /// rating between 1.0 and 5.0, one decimal place
    #[argh(option)]
    rating: Decimal,

    /// optional review text
    #[argh(option)]
    comment: Option<String>,
}

impl ServeArgs {
    fn into_config(self) -> Result<ServerConfig> {
        let default_bind = SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT));
        let bind = settings::resolve(self.bind, BIND_ENV, default_bind)?;
        let catalog_url = settings::resolve(self.catalog_url, CATALOG_URL_ENV, DEFAULT_CATALOG_URL.to_string())?;
        let timeout_ms = settings::resolve(self.catalog_timeout_ms, CATALOG_TIMEOUT_ENV, DEFAULT_TIMEOUT_MS)?;

        let catalog = CatalogClientConfig::default()
            .with_base_url(catalog_url)
            .with_timeout(Duration::from_millis(timeout_ms))
            .with_retry(RetryConfig {
                max_attempts: self.retry_attempts,
                initial_backoff_ms: self.retry_wait_ms,
                max_backoff_ms: self.retry_wait_ms,
                backoff_multiplier: 1.0,
            })
            .with_breaker(CircuitBreakerConfig {
                sliding_window_size: self.breaker_window,
                minimum_number_of_calls: self.breaker_min_calls,
                failure_rate_threshold: self.breaker_failure_rate,
                wait_duration_in_open_state: Duration::from_secs(self.breaker_wait_secs),
                permitted_calls_in_half_open_state: self.breaker_half_open_calls,
            });

        let config = ServerConfig::default().with_bind(bind).with_catalog(catalog);
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli: Cli = argh::from_env();

    // one-shot commands keep stdout clean for piping into jq and friends
    if matches!(cli.command, Commands::Serve(_)) {
        let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    match cli.command {
        Commands::Serve(args) => run_serve(args).await,
        Commands::Rating(args) => {
            let api = ReviewApi::new(&args.server_address)?;
            print_json(&api.rating(args.movie_id).await?)
        }
        Commands::Reviews(args) => {
            let api = ReviewApi::new(&args.server_address)?;
            print_json(&api.reviews(args.movie_id, args.page, args.size).await?)
        }
        Commands::Submit(args) => {
            let api = ReviewApi::new(&args.server_address)?;
            let submission = ReviewSubmission {
                movie_id: Some(args.movie_id),
                user_name: Some(args.user),
                rating: Some(args.rating),
                comment: args.comment,
            };
            print_json(&api.submit(&submission).await?)
        }
    }
}

async fn run_serve(args: ServeArgs) -> Result<()> {
    let config = args.into_config()?;
    tracing::info!("Starting Marquee review service");
    tracing::info!("Catalog: {} (timeout {}ms)", config.catalog.base_url, config.catalog.timeout.as_millis());

    let bind = config.bind;
    HttpServer::new(config)?.run(bind).await?;
    Ok(())
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}
