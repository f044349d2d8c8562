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

//! Flag, environment and default resolution for `serve`.
//!
//! Precedence is command-line flag, then environment variable, then the
//! built-in default.

use anyhow::{anyhow, Result};
use std::fmt::Display;
use std::str::FromStr;

pub const BIND_ENV: &str = "MARQUEE_BIND";
pub const CATALOG_URL_ENV: &str = "MARQUEE_CATALOG_URL";
pub const CATALOG_TIMEOUT_ENV: &str = "MARQUEE_CATALOG_TIMEOUT_MS";

/// Resolves one setting, reading `env_key` from the process environment.
pub fn resolve<T>(flag: Option<T>, env_key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    pick(flag, env_key, std::env::var(env_key).ok(), default)
}

/// Resolution without touching the process environment.
pub fn pick<T>(flag: Option<T>, env_key: &str, env_value: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    if let Some(value) = flag {
        return Ok(value);
    }
    match env_value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        Some(raw) => raw
            .parse()
            .map_err(|e| anyhow!("Invalid value '{}' in {}: {}", raw, env_key, e)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;

    #[test]
    fn test_flag_wins() {
        let value = pick(Some(5u64), CATALOG_TIMEOUT_ENV, Some("9".into()), 3000).unwrap();
        assert_eq!(value, 5);
    }

    #[test]
    fn test_env_over_default() {
        let value = pick(None, CATALOG_TIMEOUT_ENV, Some("1500".into()), 3000u64).unwrap();
        assert_eq!(value, 1500);
    }

    #[test]
    fn test_default_when_unset_or_blank() {
        assert_eq!(pick(None, CATALOG_TIMEOUT_ENV, None, 3000u64).unwrap(), 3000);
        assert_eq!(pick(None, CATALOG_TIMEOUT_ENV, Some("  ".into()), 3000u64).unwrap(), 3000);
    }

    #[test]
    fn test_invalid_env_value() {
        let err = pick::<SocketAddr>(None, BIND_ENV, Some("not-an-addr".into()), "0.0.0.0:8082".parse().unwrap())
            .unwrap_err();
        assert!(err.to_string().contains(BIND_ENV));
    }
}
