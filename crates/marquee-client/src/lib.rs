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

//! Marquee catalog client
//!
//! Resilient access to the external movie catalog: a per-attempt timeout, a
//! count-based circuit breaker, bounded retries and a placeholder movie for
//! read paths that tolerate degraded display.

pub mod breaker;
pub mod client;
pub mod config;
pub mod retry;
pub mod transport;

pub use breaker::{BreakerSnapshot, CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use client::MovieServiceClient;
pub use config::CatalogClientConfig;
pub use retry::RetryConfig;
pub use transport::{CatalogTransport, HttpCatalogTransport};
