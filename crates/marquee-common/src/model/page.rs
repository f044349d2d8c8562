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

//! Offset pagination over newest-first review listings.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::{FieldViolation, Result, ReviewError};
use super::review::ReviewView;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// A zero-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Builds a request, rejecting sizes outside `1..=100`.
    pub fn new(page: u32, size: u32) -> Result<Self> {
        if size == 0 || size > MAX_PAGE_SIZE {
            return Err(ReviewError::Validation(vec![FieldViolation::new(
                "size",
                format!("must be between 1 and {}", MAX_PAGE_SIZE),
            )]));
        }
        Ok(Self { page, size })
    }

    /// Number of rows skipped before this page.
    pub fn offset(&self) -> usize {
        self.page as usize * self.size as usize
    }
}

/// One page of results plus the total row count.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub request: PageRequest,
    pub total_elements: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total_elements: u64) -> Self {
        Self {
            items,
            request,
            total_elements,
        }
    }

    pub fn total_pages(&self) -> u32 {
        let size = u64::from(self.request.size.max(1));
        u32::try_from(self.total_elements.div_ceil(size)).unwrap_or(u32::MAX)
    }

    pub fn is_first(&self) -> bool {
        self.request.page == 0
    }

    /// True when no page follows this one (also for an empty listing).
    pub fn is_last(&self) -> bool {
        self.request.page.saturating_add(1) >= self.total_pages()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            request: self.request,
            total_elements: self.total_elements,
        }
    }
}

/// Review listing for one movie with movie-wide rating figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieReviewsPage {
    pub reviews: Vec<ReviewView>,
    #[serde(with = "rust_decimal::serde::float")]
    pub average_rating: Decimal,
    pub total_reviews: u64,
    pub page: u32,
    pub total_pages: u32,
    pub size: u32,
    pub first: bool,
    pub last: bool,
}

impl MovieReviewsPage {
    pub fn new(page: Page<ReviewView>, average_rating: Decimal) -> Self {
        let total_pages = page.total_pages();
        let first = page.is_first();
        let last = page.is_last();
        Self {
            average_rating,
            total_reviews: page.total_elements,
            page: page.request.page,
            total_pages,
            size: page.request.size,
            first,
            last,
            reviews: page.items,
        }
    }
}
