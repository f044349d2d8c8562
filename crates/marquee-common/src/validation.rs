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

//! Boundary validation for incoming review submissions.
//!
//! Every field of [`ReviewSubmission`] is optional so that a missing field is
//! reported as a violation instead of failing the JSON decoder. All problems
//! are collected before returning, one [`FieldViolation`] per rule broken.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::model::{FieldViolation, MovieId, Result, ReviewDraft, ReviewError};

pub const MAX_USER_NAME_CHARS: usize = 100;
pub const MAX_COMMENT_CHARS: usize = 1000;

const MIN_RATING: Decimal = Decimal::ONE;
const MAX_RATING: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// Wire shape of a review submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSubmission {
    #[serde(default)]
    pub movie_id: Option<MovieId>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(
        default,
        serialize_with = "rust_decimal::serde::float_option::serialize"
    )]
    pub rating: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl ReviewSubmission {
    /// Checks every field and converts into a [`ReviewDraft`].
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::Validation`] listing each violated rule.
    ///
    /// # Example
    ///
    /// ```
    /// use marquee_common::validation::ReviewSubmission;
    /// use rust_decimal::Decimal;
    ///
    /// let submission = ReviewSubmission {
    ///     movie_id: Some(1),
    ///     user_name: Some("Ada".into()),
    ///     rating: Some(Decimal::new(45, 1)),
    ///     comment: None,
    /// };
    /// let draft = submission.validate().unwrap();
    /// assert_eq!(draft.movie_id(), 1);
    /// ```
    pub fn validate(self) -> Result<ReviewDraft> {
        let mut violations = Vec::new();

        match self.movie_id {
            None => violations.push(FieldViolation::new("movieId", "Movie ID is required")),
            Some(id) if id <= 0 => {
                violations.push(FieldViolation::new("movieId", "Movie ID must be positive"))
            }
            Some(_) => {}
        }

        match self.user_name.as_deref() {
            None => violations.push(FieldViolation::new("userName", "User name is required")),
            Some(name) if name.trim().is_empty() => {
                violations.push(FieldViolation::new("userName", "User name is required"))
            }
            Some(name) if name.chars().count() > MAX_USER_NAME_CHARS => {
                violations.push(FieldViolation::new(
                    "userName",
                    format!("User name must not exceed {} characters", MAX_USER_NAME_CHARS),
                ))
            }
            Some(_) => {}
        }

        match self.rating {
            None => violations.push(FieldViolation::new("rating", "Rating is required")),
            Some(r) if r < MIN_RATING => {
                violations.push(FieldViolation::new("rating", "Rating must be at least 1.0"))
            }
            Some(r) if r > MAX_RATING => {
                violations.push(FieldViolation::new("rating", "Rating must not exceed 5.0"))
            }
            Some(r) if r.normalize().scale() > 1 => violations.push(FieldViolation::new(
                "rating",
                "Rating must have at most one decimal place",
            )),
            Some(_) => {}
        }

        if let Some(comment) = self.comment.as_deref() {
            if comment.chars().count() > MAX_COMMENT_CHARS {
                violations.push(FieldViolation::new(
                    "comment",
                    format!("Comment must not exceed {} characters", MAX_COMMENT_CHARS),
                ));
            }
        }

        match (self.movie_id, self.user_name, self.rating) {
            (Some(movie_id), Some(user_name), Some(rating)) if violations.is_empty() => {
                let comment = self.comment.filter(|c| !c.trim().is_empty());
                Ok(ReviewDraft::new(movie_id, user_name, rating, comment))
            }
            _ => Err(ReviewError::Validation(violations)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn submission(rating: Decimal) -> ReviewSubmission {
        ReviewSubmission {
            movie_id: Some(1),
            user_name: Some("John Doe".to_string()),
            rating: Some(rating),
            comment: Some("Great movie!".to_string()),
        }
    }

    fn violations(result: Result<ReviewDraft>) -> Vec<String> {
        match result {
            Err(ReviewError::Validation(v)) => v.iter().map(ToString::to_string).collect(),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_submission() {
        let draft = submission(dec!(4.5)).validate().unwrap();
        assert_eq!(draft.movie_id(), 1);
        assert_eq!(draft.user_name(), "John Doe");
        assert_eq!(draft.rating(), dec!(4.5));
        assert_eq!(draft.comment(), Some("Great movie!"));
    }

    #[test]
    fn test_rating_bounds_are_inclusive() {
        assert!(submission(dec!(1.0)).validate().is_ok());
        assert!(submission(dec!(5.0)).validate().is_ok());
        assert!(submission(dec!(5)).validate().is_ok());
    }

    #[test]
    fn test_rating_above_maximum_rejected() {
        assert_eq!(
            violations(submission(dec!(6.0)).validate()),
            vec!["rating: Rating must not exceed 5.0"]
        );
    }

    #[test]
    fn test_rating_below_minimum_rejected() {
        assert_eq!(
            violations(submission(dec!(0.5)).validate()),
            vec!["rating: Rating must be at least 1.0"]
        );
    }

    #[test]
    fn test_rating_with_two_fraction_digits_rejected() {
        assert_eq!(
            violations(submission(dec!(4.25)).validate()),
            vec!["rating: Rating must have at most one decimal place"]
        );
        // trailing zeros are not extra precision
        assert!(submission(dec!(4.50)).validate().is_ok());
    }

    #[test]
    fn test_missing_fields_all_reported() {
        let got = violations(ReviewSubmission::default().validate());
        assert_eq!(
            got,
            vec![
                "movieId: Movie ID is required",
                "userName: User name is required",
                "rating: Rating is required",
            ]
        );
    }

    #[test]
    fn test_blank_user_name_rejected() {
        let mut s = submission(dec!(3.0));
        s.user_name = Some("   ".to_string());
        assert_eq!(violations(s.validate()), vec!["userName: User name is required"]);
    }

    #[test]
    fn test_length_limits() {
        let mut s = submission(dec!(3.0));
        s.user_name = Some("a".repeat(MAX_USER_NAME_CHARS));
        s.comment = Some("c".repeat(MAX_COMMENT_CHARS));
        assert!(s.clone().validate().is_ok());

        s.user_name = Some("a".repeat(MAX_USER_NAME_CHARS + 1));
        s.comment = Some("c".repeat(MAX_COMMENT_CHARS + 1));
        assert_eq!(
            violations(s.validate()),
            vec![
                "userName: User name must not exceed 100 characters",
                "comment: Comment must not exceed 1000 characters",
            ]
        );
    }

    #[test]
    fn test_non_positive_movie_id_rejected() {
        let mut s = submission(dec!(3.0));
        s.movie_id = Some(0);
        assert_eq!(violations(s.validate()), vec!["movieId: Movie ID must be positive"]);
    }

    #[test]
    fn test_blank_comment_becomes_none() {
        let mut s = submission(dec!(3.0));
        s.comment = Some("  ".to_string());
        assert_eq!(s.validate().unwrap().comment(), None);
    }

    #[test]
    fn test_deserialize_accepts_json_numbers() {
        let s: ReviewSubmission = serde_json::from_str(
            r#"{"movieId": 3, "userName": "Ana", "rating": 4.5, "unknown": true}"#,
        )
        .unwrap();
        assert_eq!(s.rating, Some(dec!(4.5)));
        assert_eq!(s.comment, None);
        assert!(s.validate().is_ok());
    }
}
