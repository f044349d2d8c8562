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

//! Movie metadata as served by the catalog service.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::review::MovieId;

/// Title used when the catalog cannot describe a movie.
pub const UNKNOWN_MOVIE_TITLE: &str = "Unknown Movie";

/// Title used by display helpers when the catalog is unreachable.
pub const UNAVAILABLE_MOVIE_TITLE: &str = "Movie Title Unavailable";

const FALLBACK_DESCRIPTION: &str = "Movie details temporarily unavailable";
const FALLBACK_LABEL: &str = "Unknown";

/// Read-only movie projection fetched from the catalog.
///
/// Never persisted. Unknown fields in catalog responses are ignored and
/// missing ones default, so older catalog builds still decode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MovieSummary {
    pub id: MovieId,
    pub title: String,
    pub description: String,
    pub duration_minutes: u32,
    pub genre: String,
    pub language: String,
    pub release_date: Option<NaiveDate>,
}

impl MovieSummary {
    /// Placeholder returned in place of an error when the catalog is
    /// unavailable on a read path that tolerates degraded display.
    ///
    /// # Example
    ///
    /// ```
    /// use marquee_common::MovieSummary;
    ///
    /// let movie = MovieSummary::fallback(7);
    /// assert_eq!(movie.title, "Unknown Movie");
    /// assert!(movie.is_fallback());
    /// ```
    pub fn fallback(id: MovieId) -> Self {
        Self {
            id,
            title: UNKNOWN_MOVIE_TITLE.to_string(),
            description: FALLBACK_DESCRIPTION.to_string(),
            duration_minutes: 0,
            genre: FALLBACK_LABEL.to_string(),
            language: FALLBACK_LABEL.to_string(),
            release_date: None,
        }
    }

    /// Whether this summary was synthesized rather than fetched.
    pub fn is_fallback(&self) -> bool {
        self.title == UNKNOWN_MOVIE_TITLE && self.description == FALLBACK_DESCRIPTION
    }
}
