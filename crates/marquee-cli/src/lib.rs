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

//! # Marquee CLI
//!
//! Command-line interface for the Marquee review service.
//!
//! - `marquee serve`: run the review service
//! - `marquee rating`: print a movie's rating summary
//! - `marquee reviews`: print a page of a movie's reviews
//! - `marquee submit`: submit a review
//!
//! The one-shot commands talk to a running service over HTTP and print raw
//! JSON so their output can be piped into other tools.

pub mod remote;
pub mod settings;

pub use remote::ReviewApi;
