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

//! Marquee Common Types
//!
//! This crate holds the domain model shared by every Marquee component:
//!
//! - **Model**: reviews, the per-movie rating cache row, catalog movie
//!   summaries, rating summaries and pagination
//! - **Errors**: [`ReviewError`], the single error enum used across crates
//! - **Validation**: the boundary checks applied to incoming submissions
//!
//! # Example
//!
//! ```
//! use marquee_common::{MovieRating, RatingSummary};
//! use chrono::Utc;
//!
//! let mut row = MovieRating::new(1, Utc::now());
//! row.increment(5);
//! row.total_reviews = 1;
//! assert!(row.is_consistent());
//!
//! let summary = RatingSummary::from_cache(&row, "Inception");
//! assert_eq!(summary.rating_distribution[&5], 1);
//! ```

pub mod model;
pub mod validation;

pub use model::*;
pub use validation::ReviewSubmission;
