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

pub mod error;
pub mod movie;
pub mod page;
pub mod rating;
pub mod review;


pub use error::{FieldViolation, Result, ReviewError};
pub use movie::{MovieSummary, UNAVAILABLE_MOVIE_TITLE, UNKNOWN_MOVIE_TITLE};
pub use page::{MovieReviewsPage, Page, PageRequest};
pub use rating::{MovieRating, RatingSummary};
pub use review::{MovieId, Review, ReviewDraft, ReviewId, ReviewView};
