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

//! Per-movie rating cache row and the summary served to callers.
//!
//! The cache is derived data. The review set is authoritative and a
//! [`MovieRating`] can always be rebuilt by recomputation.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::review::MovieId;

/// Lowest star bucket.
pub const MIN_STARS: u8 = 1;
/// Highest star bucket.
pub const MAX_STARS: u8 = 5;

/// Decimal places kept on averages.
pub const AVERAGE_SCALE: u32 = 2;

/// Rounds `sum / count` half-up to two decimal places.
///
/// Returns zero for an empty set.
///
/// # Example
///
/// ```
/// use marquee_common::model::rating::rounded_average;
/// use rust_decimal::Decimal;
///
/// let sum = Decimal::new(140, 1); // 14.0
/// assert_eq!(rounded_average(sum, 3).to_string(), "4.67");
/// ```
pub fn rounded_average(sum: Decimal, count: u64) -> Decimal {
    if count == 0 {
        return Decimal::ZERO;
    }
    (sum / Decimal::from(count))
        .round_dp_with_strategy(AVERAGE_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Star bucket for a rating: its integer part, truncated.
///
/// Returns `None` for values outside `1..=5`.
pub fn star_bucket(rating: Decimal) -> Option<u8> {
    let stars = rating.trunc().to_u8()?;
    (MIN_STARS..=MAX_STARS).contains(&stars).then_some(stars)
}

/// The cache row for one movie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieRating {
    pub movie_id: MovieId,
    pub average_rating: Decimal,
    pub total_reviews: u32,
    counts: [u32; MAX_STARS as usize],
    pub last_updated: DateTime<Utc>,
}

impl MovieRating {
    /// A zero-valued row.
    pub fn new(movie_id: MovieId, now: DateTime<Utc>) -> Self {
        Self {
            movie_id,
            average_rating: Decimal::ZERO,
            total_reviews: 0,
            counts: [0; MAX_STARS as usize],
            last_updated: now,
        }
    }

    /// Count for one star bucket, zero for out-of-range stars.
    pub fn bucket(&self, stars: u8) -> u32 {
        Self::slot(stars).map(|i| self.counts[i]).unwrap_or(0)
    }

    /// Bumps a star bucket. Out-of-range stars are ignored.
    pub fn increment(&mut self, stars: u8) {
        if let Some(i) = Self::slot(stars) {
            self.counts[i] += 1;
        }
    }

    /// Bucket counts keyed `1..=5`, zeros included.
    pub fn distribution(&self) -> BTreeMap<u8, u32> {
        (MIN_STARS..=MAX_STARS)
            .map(|stars| (stars, self.bucket(stars)))
            .collect()
    }

    /// Bucket counts sum to the total.
    pub fn is_consistent(&self) -> bool {
        self.counts.iter().map(|&c| u64::from(c)).sum::<u64>() == u64::from(self.total_reviews)
    }

    fn slot(stars: u8) -> Option<usize> {
        (MIN_STARS..=MAX_STARS)
            .contains(&stars)
            .then(|| usize::from(stars - MIN_STARS))
    }
}

/// Aggregated rating information for one movie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub movie_id: MovieId,
    pub movie_title: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub average_rating: Decimal,
    pub total_reviews: u32,
    pub rating_distribution: BTreeMap<u8, u32>,
}

impl RatingSummary {
    /// Summary for a movie without reviews: average 0, total 0, no buckets.
    pub fn empty(movie_id: MovieId, movie_title: impl Into<String>) -> Self {
        Self {
            movie_id,
            movie_title: movie_title.into(),
            average_rating: Decimal::ZERO,
            total_reviews: 0,
            rating_distribution: BTreeMap::new(),
        }
    }

    pub fn from_cache(row: &MovieRating, movie_title: impl Into<String>) -> Self {
        Self {
            movie_id: row.movie_id,
            movie_title: movie_title.into(),
            average_rating: row.average_rating,
            total_reviews: row.total_reviews,
            rating_distribution: row.distribution(),
        }
    }
}
